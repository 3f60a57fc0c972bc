//! 教学用操作系统模拟器的内存管理与 CPU 调度核心
//!
//! - [`mm`]：多个进程共享的两级分页虚拟内存
//! - [`task`]：多级队列 (MLQ) 调度器与模拟 CPU
//!
//! 两个子系统互不共享状态，由外部的执行器分别调用。使用全局接口前需先调用
//! [`mm::init`] 和 [`task::init_scheduler`]。

#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod logging;
pub mod mm;
pub mod task;

pub use error::{MemError, SchedError};

// 进程调度实现
// 全局唯一的 [`MlqScheduler`] 实例 `SCHEDULER` 管理所有就绪进程，
// 多个模拟 CPU 线程并发地从中取出进程运行、再放回。
// 全局唯一的 `PID_ALLOCATOR` 实例用于为进程分配 PID。

mod id; // PID 分配模块
mod manager; // 就绪队列与 MLQ 调度器
pub(crate) mod processor; // 模拟 CPU
#[allow(clippy::module_inception)]
mod task; // 任务控制块

use crate::error::SchedError;
use lazy_static::*;
use std::sync::Arc;

pub use id::{pid_alloc, PidHandle, RecycleAllocator};
pub use manager::{MlqScheduler, ReadyQueue};
pub use processor::{run_cpus, Processor, SliceOutcome};
pub use task::{TaskControlBlock, TaskControlBlockInner, TaskStatus};

lazy_static! {
    /// 全局唯一的 `SCHEDULER` 实例
    pub static ref SCHEDULER: MlqScheduler = MlqScheduler::new();
}

/// 清空所有就绪队列并重置配额，需在其他接口之前调用
pub fn init_scheduler() {
    SCHEDULER.init();
    info!("scheduler initialized");
}

/// 所有就绪队列是否都为空
pub fn queue_empty() -> bool {
    SCHEDULER.is_empty()
}

/// 取出下一个要运行的进程
pub fn get_proc() -> Option<Arc<TaskControlBlock>> {
    let proc = SCHEDULER.fetch();
    if let Some(proc) = &proc {
        trace!("get_proc: pid {} from prio {}", proc.getpid(), proc.prio);
    }
    proc
}

/// 将用完时间片的进程放回就绪队列
pub fn put_proc(proc: Arc<TaskControlBlock>) -> Result<(), SchedError> {
    let pid = proc.getpid();
    SCHEDULER.enqueue(proc).map_err(|e| {
        warn!("put_proc: pid {}: {}", pid, e);
        e
    })
}

/// 将新创建的进程加入就绪队列
pub fn add_proc(proc: Arc<TaskControlBlock>) -> Result<(), SchedError> {
    let pid = proc.getpid();
    SCHEDULER.enqueue(proc).map_err(|e| {
        warn!("add_proc: pid {}: {}", pid, e);
        e
    })?;
    debug!("add_proc: pid {} admitted", pid);
    Ok(())
}

//! 进程控制块中与内存管理和调度相关的部分
use super::{pid_alloc, PidHandle};
use crate::mm::AddressSpace;
use spin::{Mutex, MutexGuard};

/// 任务控制块结构体
///
/// 直接保存运行期间不会改变的内容
pub struct TaskControlBlock {
    /// 进程标识符
    pub pid: PidHandle,
    /// 所在的 MLQ 层，0 为最高
    pub prio: usize,
    /// 同一层内的出队优先级，数值越大越先出队
    pub priority: u32,
    /// 可变部分
    inner: Mutex<TaskControlBlockInner>,
}

/// 任务控制块内部结构
pub struct TaskControlBlockInner {
    /// 维护当前进程的执行状态
    pub task_status: TaskStatus,
    /// 进程的地址空间
    pub address_space: AddressSpace,
}

impl TaskControlBlock {
    /// 创建新的进程控制块，分配 PID 和空地址空间
    pub fn new(prio: usize, priority: u32) -> Self {
        let pid = pid_alloc();
        let address_space = AddressSpace::new(pid.0);
        Self {
            pid,
            prio,
            priority,
            inner: Mutex::new(TaskControlBlockInner {
                task_status: TaskStatus::Ready,
                address_space,
            }),
        }
    }
    /// 获取内部可变部分的独占访问
    pub fn inner_exclusive_access(&self) -> MutexGuard<'_, TaskControlBlockInner> {
        self.inner.lock()
    }
    /// 获取 PID
    pub fn getpid(&self) -> u32 {
        self.pid.0
    }
    /// 当前状态
    pub fn status(&self) -> TaskStatus {
        self.inner.lock().task_status
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// 任务状态
pub enum TaskStatus {
    /// 就绪
    Ready,
    /// 运行中
    Running,
    /// 已退出
    Exited,
}

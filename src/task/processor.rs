// 模拟 CPU 的调度循环
// 每个 CPU 是一个线程，循环地从调度器取出进程、运行一个时间片、再放回就绪队列，
// 直到调度器中没有进程为止。时间片内具体做什么由调用者决定。

use super::{MlqScheduler, TaskControlBlock, TaskStatus};
use std::sync::Arc;
use std::thread;

/// 一个时间片结束后进程的去向
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SliceOutcome {
    /// 时间片用完，回到就绪队列
    Yield,
    /// 进程已结束
    Exit,
}

/// 处理器管理结构
pub struct Processor {
    id: usize,
}

impl Processor {
    /// 创建一个空的处理器
    pub fn new(id: usize) -> Self {
        Self { id }
    }

    /// 处理器编号
    pub fn id(&self) -> usize {
        self.id
    }

    /// 处理器的调度循环
    pub fn run_tasks<F>(&self, scheduler: &MlqScheduler, run_slice: &F)
    where
        F: Fn(usize, &Arc<TaskControlBlock>) -> SliceOutcome,
    {
        // 就绪队列为空即停止，其他 CPU 上仍在运行的进程由它们自己放回并继续调度
        while let Some(task) = scheduler.fetch() {
            task.inner_exclusive_access().task_status = TaskStatus::Running;
            trace!("cpu {}: dispatch pid {} (prio {})", self.id(), task.getpid(), task.prio);
            match run_slice(self.id(), &task) {
                SliceOutcome::Yield => {
                    task.inner_exclusive_access().task_status = TaskStatus::Ready;
                    if let Err(e) = scheduler.enqueue(task) {
                        warn!("cpu {}: put back failed: {}", self.id(), e);
                    }
                }
                SliceOutcome::Exit => {
                    task.inner_exclusive_access().task_status = TaskStatus::Exited;
                    debug!("cpu {}: pid {} exited", self.id(), task.getpid());
                }
            }
        }
        trace!("cpu {}: no more tasks, stopped", self.id());
    }
}

/// 启动 `num_cpus` 个模拟 CPU，直到所有进程结束才返回
pub fn run_cpus<F>(scheduler: &MlqScheduler, num_cpus: usize, run_slice: F)
where
    F: Fn(usize, &Arc<TaskControlBlock>) -> SliceOutcome + Sync,
{
    thread::scope(|s| {
        for id in 0..num_cpus {
            let run_slice = &run_slice;
            s.spawn(move || Processor::new(id).run_tasks(scheduler, run_slice));
        }
    });
}

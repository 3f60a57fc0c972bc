//! [`MlqScheduler`] 的实现
//!
//! 多级队列调度：每个优先级层一个有界就绪队列。第 `i` 层在一轮中最多连续获得
//! `MAX_PRIO - i` 次调度，所有非空层的配额都用完后重置配额开始新的一轮。

use super::TaskControlBlock;
use crate::config::{MAX_PRIO, MAX_QUEUE_SIZE};
use crate::error::SchedError;
use spin::Mutex;
use std::sync::Arc;

/// 容量固定的就绪队列
#[derive(Default)]
pub struct ReadyQueue {
    procs: Vec<Arc<TaskControlBlock>>,
}

impl ReadyQueue {
    /// 创建一个空队列
    pub fn new() -> Self {
        Self {
            procs: Vec::with_capacity(MAX_QUEUE_SIZE),
        }
    }
    /// 队列长度
    pub fn len(&self) -> usize {
        self.procs.len()
    }
    /// 队列是否为空
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
    /// 将进程追加到队尾，队列已满时不做修改
    pub fn enqueue(&mut self, proc: Arc<TaskControlBlock>) -> Result<(), SchedError> {
        if self.procs.len() >= MAX_QUEUE_SIZE {
            return Err(SchedError::QueueOverflow);
        }
        self.procs.push(proc);
        Ok(())
    }
    /// 取出 `priority` 最大的进程，相同时取最靠前的
    pub fn dequeue(&mut self) -> Option<Arc<TaskControlBlock>> {
        let first = self.procs.first()?;
        let mut id = 0;
        let mut max = first.priority;
        for (i, proc) in self.procs.iter().enumerate().skip(1) {
            if proc.priority > max {
                id = i;
                max = proc.priority;
            }
        }
        // 其余进程保持原有顺序
        Some(self.procs.remove(id))
    }
    /// 清空队列
    pub fn clear(&mut self) {
        self.procs.clear();
    }
}

struct MlqInner {
    ready_queues: [ReadyQueue; MAX_PRIO],
    /// 每层在本轮中已用掉的调度次数
    slot_used: [usize; MAX_PRIO],
}

impl MlqInner {
    fn new() -> Self {
        Self {
            ready_queues: core::array::from_fn(|_| ReadyQueue::new()),
            slot_used: [0; MAX_PRIO],
        }
    }

    fn is_empty(&self) -> bool {
        self.ready_queues.iter().all(ReadyQueue::is_empty)
    }

    /// 选出本次调度的层
    fn choose_queue(&mut self) -> Option<usize> {
        for prio in 0..MAX_PRIO {
            if !self.ready_queues[prio].is_empty() && self.slot_used[prio] < MAX_PRIO - prio {
                self.slot_used[prio] += 1;
                return Some(prio);
            }
        }
        // 所有非空层的配额都已用完，开始新的一轮
        self.slot_used = [0; MAX_PRIO];
        let prio = (0..MAX_PRIO).find(|&prio| !self.ready_queues[prio].is_empty())?;
        self.slot_used[prio] = 1;
        Some(prio)
    }
}

/// 多级队列调度器
pub struct MlqScheduler {
    inner: Mutex<MlqInner>,
}

impl MlqScheduler {
    /// 创建所有队列为空、配额为零的调度器
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MlqInner::new()),
        }
    }
    /// 清空所有队列并重置配额
    pub fn init(&self) {
        let mut inner = self.inner.lock();
        for queue in inner.ready_queues.iter_mut() {
            queue.clear();
        }
        inner.slot_used = [0; MAX_PRIO];
    }
    /// 将进程放入其 `prio` 对应的就绪队列
    pub fn enqueue(&self, proc: Arc<TaskControlBlock>) -> Result<(), SchedError> {
        let prio = proc.prio;
        if prio >= MAX_PRIO {
            return Err(SchedError::InvalidPriority(prio));
        }
        self.inner.lock().ready_queues[prio].enqueue(proc)
    }
    /// 按 MLQ 策略取出下一个要运行的进程
    pub fn fetch(&self) -> Option<Arc<TaskControlBlock>> {
        let mut inner = self.inner.lock();
        let prio = inner.choose_queue()?;
        inner.ready_queues[prio].dequeue()
    }
    /// 所有层的队列是否都为空
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
    /// 就绪进程总数
    pub fn len(&self) -> usize {
        self.inner.lock().ready_queues.iter().map(ReadyQueue::len).sum()
    }
    /// 某一层的队列长度
    pub fn queue_len(&self, prio: usize) -> usize {
        self.inner
            .lock()
            .ready_queues
            .get(prio)
            .map_or(0, ReadyQueue::len)
    }
    /// 各层在本轮中已用掉的调度次数
    pub fn slot_used(&self) -> [usize; MAX_PRIO] {
        self.inner.lock().slot_used
    }
}

impl Default for MlqScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(prio: usize, priority: u32) -> Arc<TaskControlBlock> {
        Arc::new(TaskControlBlock::new(prio, priority))
    }

    #[test]
    fn test_dequeue_highest_priority_first_occurrence() {
        let mut queue = ReadyQueue::new();
        let tasks: Vec<_> = [3, 5, 5, 2].iter().map(|&p| task(0, p)).collect();
        for t in &tasks {
            queue.enqueue(t.clone()).unwrap();
        }
        let picked = queue.dequeue().unwrap();
        assert!(Arc::ptr_eq(&picked, &tasks[1]));
        // 剩余顺序不变
        let rest: Vec<u32> = core::iter::from_fn(|| queue.dequeue())
            .map(|t| t.getpid())
            .collect();
        assert_eq!(
            rest,
            vec![tasks[2].getpid(), tasks[0].getpid(), tasks[3].getpid()]
        );
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_enqueue_overflow_leaves_queue_unchanged() {
        let mut queue = ReadyQueue::new();
        for _ in 0..MAX_QUEUE_SIZE {
            queue.enqueue(task(0, 1)).unwrap();
        }
        let extra = task(0, 100);
        assert_eq!(queue.enqueue(extra.clone()), Err(SchedError::QueueOverflow));
        assert_eq!(queue.len(), MAX_QUEUE_SIZE);
        // 溢出的进程不在队列里
        assert_eq!(Arc::strong_count(&extra), 1);
        assert_eq!(queue.dequeue().unwrap().priority, 1);
    }

    #[test]
    fn test_invalid_prio_rejected() {
        let sched = MlqScheduler::new();
        assert_eq!(
            sched.enqueue(task(MAX_PRIO, 0)),
            Err(SchedError::InvalidPriority(MAX_PRIO))
        );
        assert!(sched.is_empty());
    }

    #[test]
    fn test_empty_scheduler_returns_none() {
        let sched = MlqScheduler::new();
        assert!(sched.fetch().is_none());
        assert_eq!(sched.slot_used(), [0; MAX_PRIO]);
    }

    #[test]
    fn test_mlq_budget_per_level() {
        let sched = MlqScheduler::new();
        for prio in 0..MAX_PRIO {
            for _ in 0..MAX_QUEUE_SIZE {
                sched.enqueue(task(prio, 0)).unwrap();
            }
        }
        // 第 i 层连续获得 MAX_PRIO - i 次调度
        let order: Vec<usize> = (0..15).map(|_| sched.fetch().unwrap().prio).collect();
        assert_eq!(
            order,
            vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 4]
        );
        assert_eq!(sched.slot_used(), [5, 4, 3, 2, 1]);

        // 新的一轮又从第 0 层开始
        assert_eq!(sched.fetch().unwrap().prio, 0);
        assert_eq!(sched.slot_used(), [1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_exhausted_level_yields_to_next() {
        let sched = MlqScheduler::new();
        for _ in 0..8 {
            sched.enqueue(task(3, 0)).unwrap();
        }
        sched.enqueue(task(4, 0)).unwrap();
        let order: Vec<usize> = (0..4).map(|_| sched.fetch().unwrap().prio).collect();
        // 第 3 层配额为 2，第 4 层配额为 1，之后重置
        assert_eq!(order, vec![3, 3, 4, 3]);
        assert_eq!(sched.slot_used(), [0, 0, 0, 1, 0]);
    }

    #[test]
    fn test_reset_when_only_exhausted_levels_remain() {
        let sched = MlqScheduler::new();
        for _ in 0..3 {
            sched.enqueue(task(4, 0)).unwrap();
        }
        let order: Vec<usize> = (0..3).map(|_| sched.fetch().unwrap().prio).collect();
        assert_eq!(order, vec![4, 4, 4]);
        assert_eq!(sched.slot_used(), [0, 0, 0, 0, 1]);
        assert!(sched.fetch().is_none());
    }

    #[test]
    fn test_init_clears_queues_and_slots() {
        let sched = MlqScheduler::new();
        sched.enqueue(task(1, 0)).unwrap();
        sched.enqueue(task(2, 0)).unwrap();
        sched.fetch().unwrap();
        assert_eq!(sched.len(), 1);
        sched.init();
        assert!(sched.is_empty());
        assert_eq!(sched.queue_len(2), 0);
        assert_eq!(sched.slot_used(), [0; MAX_PRIO]);
    }
}

//! 进程 PID 的分配
//!
//! PID 从 1 开始分配，0 保留给页帧状态表表示“空闲”。

use lazy_static::*;
use spin::Mutex;

/// 回收分配器结构体，用于分配和回收 PID
pub struct RecycleAllocator {
    current: u32, // 下一个从未分配过的 PID
    recycled: Vec<u32>, // 存储被回收的 PID
}

impl RecycleAllocator {
    /// 创建一个新的回收分配器
    pub fn new() -> Self {
        RecycleAllocator {
            current: 1,
            recycled: Vec::new(),
        }
    }
    /// 分配一个新的 PID
    pub fn alloc(&mut self) -> u32 {
        if let Some(id) = self.recycled.pop() {
            // 优先使用回收的 PID
            id
        } else {
            self.current += 1;
            self.current - 1
        }
    }
    /// 回收指定的 PID
    pub fn dealloc(&mut self, id: u32) {
        assert!(id != 0 && id < self.current);
        assert!(
            !self.recycled.iter().any(|i| *i == id),
            "id {} has been deallocated!",
            id
        );
        self.recycled.push(id);
    }
}

impl Default for RecycleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// 全局 PID 分配器
    static ref PID_ALLOCATOR: Mutex<RecycleAllocator> = Mutex::new(RecycleAllocator::new());
}

/// PID 抽象结构，释放时自动回收 PID
#[derive(Debug)]
pub struct PidHandle(pub u32);

impl Drop for PidHandle {
    fn drop(&mut self) {
        PID_ALLOCATOR.lock().dealloc(self.0);
    }
}

/// 分配一个新的 PID
pub fn pid_alloc() -> PidHandle {
    PidHandle(PID_ALLOCATOR.lock().alloc())
}

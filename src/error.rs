//! 内存管理与调度的错误类型
//!
//! 所有错误均由调用者在本地处理，出错的操作不会修改任何状态。

use core::fmt::{self, Display, Formatter};

/// 虚拟内存管理器返回的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemError {
    /// 空闲页帧不足，或分配后会越过地址空间上界
    OutOfMemory,
    /// 申请的大小为 0
    InvalidSize,
    /// 地址没有映射到该进程的任何页帧
    Unmapped,
}

impl MemError {
    /// 用于日志的数字错误码
    pub const fn code(&self) -> u16 {
        match self {
            MemError::OutOfMemory => 0x0101,
            MemError::InvalidSize => 0x0102,
            MemError::Unmapped => 0x0103,
        }
    }
}

impl Display for MemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let desc = match self {
            MemError::OutOfMemory => "out of memory",
            MemError::InvalidSize => "allocation size must be non-zero",
            MemError::Unmapped => "virtual address is not mapped",
        };
        write!(f, "E{:04X}: {}", self.code(), desc)
    }
}

impl std::error::Error for MemError {}

/// 调度器返回的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// 就绪队列已满
    QueueOverflow,
    /// 进程的优先级层超出 `MAX_PRIO`
    InvalidPriority(usize),
}

impl SchedError {
    /// 用于日志的数字错误码
    pub const fn code(&self) -> u16 {
        match self {
            SchedError::QueueOverflow => 0x0201,
            SchedError::InvalidPriority(_) => 0x0202,
        }
    }
}

impl Display for SchedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::QueueOverflow => write!(f, "E{:04X}: queue is overflow", self.code()),
            SchedError::InvalidPriority(prio) => {
                write!(f, "E{:04X}: no ready queue for prio {}", self.code(), prio)
            }
        }
    }
}

impl std::error::Error for SchedError {}

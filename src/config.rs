//! 模拟器的配置常量
//!
//! 所有常量在编译期确定，运行时不可修改。

/// 虚拟地址和物理地址的位宽
pub const ADDRESS_SIZE: usize = 20;

/// 页内偏移的位宽
pub const OFFSET_LEN: usize = 10;

/// 段号（第一级索引）的位宽
pub const SEGMENT_LEN: usize = 5;

/// 页号（第二级索引）的位宽
pub const PAGE_LEN: usize = 5;

/// 页面大小 (1KB)
pub const PAGE_SIZE: usize = 1 << OFFSET_LEN;

/// 模拟物理内存的大小 (1MB)
pub const RAM_SIZE: usize = 1 << ADDRESS_SIZE;

/// 物理页帧的总数
pub const NUM_PAGES: usize = RAM_SIZE / PAGE_SIZE;

/// 段表最多容纳的表项数
pub const SEGMENT_TABLE_SIZE: usize = 1 << SEGMENT_LEN;

/// 每张页表最多容纳的表项数
pub const PAGE_TABLE_SIZE: usize = 1 << PAGE_LEN;

/// MLQ 的优先级层数，0 为最高优先级
pub const MAX_PRIO: usize = 5;

/// 每个就绪队列的容量
pub const MAX_QUEUE_SIZE: usize = 10;

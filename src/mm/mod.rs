// 内存管理实现
// 两级页表的虚拟内存：段表 -> 页表 -> 页帧。
// 所有进程共享一块模拟物理内存，页帧按进程独占，同一次分配的页帧串成链。
// 每个进程持有一个 `AddressSpace` 记录断点和页表。

mod address; // 地址相关模块
mod frame_allocator; // 页帧状态表
mod manager; // 虚拟内存管理器
mod memory_set; // 进程地址空间
pub(crate) mod page_table; // 两级页表
mod ram; // 模拟物理内存

pub use address::VPNRange;
pub use address::{PhysAddr, PhysPageNum, StepByOne, VirtAddr, VirtPageNum};
pub use frame_allocator::{FrameAllocator, FrameStatus, FrameTable};
pub use manager::MemoryManager;
pub use memory_set::AddressSpace;
pub use page_table::{PageTable, PageTableEntry, SegmentTable, SegmentTableEntry};
pub use ram::Ram;

use crate::error::MemError;
use lazy_static::*;

lazy_static! {
    /// 全局唯一的 `MemoryManager` 实例
    pub static ref MEMORY_MANAGER: MemoryManager = MemoryManager::new();
}

/// 清零物理内存和页帧状态表，需在其他接口之前调用
pub fn init() {
    MEMORY_MANAGER.init();
    info!("memory initialized, {} frames free", MEMORY_MANAGER.free_frame_count());
}

/// 分配 `size` 字节，返回起始虚拟地址，失败时返回 0
pub fn alloc_mem(size: usize, space: &mut AddressSpace) -> usize {
    match MEMORY_MANAGER.alloc(size, space) {
        Ok(va) => va.into(),
        Err(e) => {
            warn!("pid {}: alloc {} bytes: {}", space.pid(), size, e);
            0
        }
    }
}

/// 释放以 `address` 开头的内存块
pub fn free_mem(address: usize, space: &mut AddressSpace) -> Result<(), MemError> {
    MEMORY_MANAGER
        .free(VirtAddr(address), space)
        .map_err(|e| {
            warn!("pid {}: free {:#x}: {}", space.pid(), address, e);
            e
        })
}

/// 读取一个字节
pub fn read_mem(address: usize, space: &AddressSpace) -> Result<u8, MemError> {
    MEMORY_MANAGER.read(VirtAddr(address), space)
}

/// 写入一个字节
pub fn write_mem(address: usize, space: &AddressSpace, data: u8) -> Result<(), MemError> {
    MEMORY_MANAGER.write(VirtAddr(address), space, data)
}

/// 以 debug 级别输出内存占用情况，并返回同样的文本
pub fn dump() -> String {
    let text = MEMORY_MANAGER.dump();
    for line in text.lines() {
        debug!("{}", line);
    }
    text
}

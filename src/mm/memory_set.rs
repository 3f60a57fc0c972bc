//! [`AddressSpace`] 的实现
//!
//! 进程的内存状态：断点 `bp` 与两级页表。由进程控制块持有，
//! 分配与释放都通过 [`super::MemoryManager`] 完成。
use super::page_table::SegmentTable;
use super::{PhysAddr, PhysPageNum, VirtAddr, VirtPageNum};
use crate::config::PAGE_SIZE;

/// 地址空间
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressSpace {
    pid: u32,
    /// 下一次分配的起始虚拟地址
    pub(super) bp: usize,
    pub(super) segment_table: SegmentTable,
}

impl AddressSpace {
    /// 创建一个新的空地址空间，第 0 页保留不用，因此 0 不会是合法的分配结果
    pub fn new(pid: u32) -> Self {
        assert_ne!(pid, 0, "pid 0 marks a free frame");
        Self {
            pid,
            bp: PAGE_SIZE,
            segment_table: SegmentTable::new(),
        }
    }
    /// 所属进程
    pub fn pid(&self) -> u32 {
        self.pid
    }
    /// 当前断点
    pub fn bp(&self) -> VirtAddr {
        VirtAddr(self.bp)
    }
    /// 段表项个数
    pub fn segment_count(&self) -> usize {
        self.segment_table.len()
    }
    /// 段表
    pub fn segment_table(&self) -> &SegmentTable {
        &self.segment_table
    }
    /// 从虚拟地址获取物理地址
    pub fn translate(&self, va: VirtAddr) -> Option<PhysAddr> {
        self.segment_table.translate_va(va)
    }
    /// 所有已映射的页及其页帧
    pub fn mapped_pages(&self) -> Vec<(VirtPageNum, PhysPageNum)> {
        let mut pages: Vec<_> = self.segment_table.mappings().collect();
        pages.sort();
        pages
    }
}

//! 实现两级页表：段表 [`SegmentTable`] 与页表 [`PageTable`]。
//!
//! 两级表都是按需创建的小数组，查找采用线性扫描，删除采用与末项交换的方式，
//! 表内顺序没有意义。

use super::{PhysAddr, PhysPageNum, VirtAddr, VirtPageNum};
use crate::config::{PAGE_TABLE_SIZE, SEGMENT_TABLE_SIZE};

/// 页表项：段内页号 -> 页帧号
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PageTableEntry {
    /// 段内页号
    pub page_index: usize,
    /// 映射到的物理页帧
    pub ppn: PhysPageNum,
}

/// 第二级页表
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageTable {
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    /// 创建空页表
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(PAGE_TABLE_SIZE),
        }
    }
    /// 表项个数
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// 页表是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// 查找段内页号对应的页帧
    pub fn find(&self, page_index: usize) -> Option<PhysPageNum> {
        self.entries
            .iter()
            .find(|pte| pte.page_index == page_index)
            .map(|pte| pte.ppn)
    }
    fn insert(&mut self, page_index: usize, ppn: PhysPageNum) {
        assert!(
            self.find(page_index).is_none(),
            "page {} 在映射之前已经映射",
            page_index
        );
        assert!(self.entries.len() < PAGE_TABLE_SIZE, "page table is full");
        self.entries.push(PageTableEntry { page_index, ppn });
    }
    fn remove(&mut self, page_index: usize) -> Option<PhysPageNum> {
        let idx = self
            .entries
            .iter()
            .position(|pte| pte.page_index == page_index)?;
        Some(self.entries.swap_remove(idx).ppn)
    }
    /// 遍历表项
    pub fn iter(&self) -> impl Iterator<Item = &PageTableEntry> {
        self.entries.iter()
    }
}

/// 段表项：段号 -> 第二级页表
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentTableEntry {
    /// 段号
    pub segment_index: usize,
    /// 该段的页表，随段表项一起释放
    pub page_table: Box<PageTable>,
}

/// 进程的第一级页表
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentTable {
    entries: Vec<SegmentTableEntry>,
}

impl SegmentTable {
    /// 创建空段表
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(SEGMENT_TABLE_SIZE),
        }
    }
    /// 段表项个数
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// 段表是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// 根据段号查找页表
    pub fn find_page_table(&self, segment_index: usize) -> Option<&PageTable> {
        self.entries
            .iter()
            .find(|ste| ste.segment_index == segment_index)
            .map(|ste| ste.page_table.as_ref())
    }
    /// 根据段号查找页表，不存在时创建新的段表项
    fn find_page_table_create(&mut self, segment_index: usize) -> &mut PageTable {
        let idx = match self
            .entries
            .iter()
            .position(|ste| ste.segment_index == segment_index)
        {
            Some(idx) => idx,
            None => {
                assert!(
                    self.entries.len() < SEGMENT_TABLE_SIZE,
                    "segment table is full"
                );
                self.entries.push(SegmentTableEntry {
                    segment_index,
                    page_table: Box::new(PageTable::new()),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].page_table
    }
    /// 设置虚拟页号与物理页号之间的映射
    pub fn map(&mut self, vpn: VirtPageNum, ppn: PhysPageNum) {
        let [segment_index, page_index] = vpn.indexes();
        self.find_page_table_create(segment_index)
            .insert(page_index, ppn);
    }
    /// 移除虚拟页号的映射，页表因此变空时一并移除段表项
    pub fn unmap(&mut self, vpn: VirtPageNum) -> Option<PhysPageNum> {
        let [segment_index, page_index] = vpn.indexes();
        let idx = self
            .entries
            .iter()
            .position(|ste| ste.segment_index == segment_index)?;
        let ppn = self.entries[idx].page_table.remove(page_index);
        if self.entries[idx].page_table.is_empty() {
            self.entries.swap_remove(idx);
        }
        ppn
    }
    /// 从虚拟页号获取页帧号
    pub fn translate(&self, vpn: VirtPageNum) -> Option<PhysPageNum> {
        let [segment_index, page_index] = vpn.indexes();
        self.find_page_table(segment_index)?.find(page_index)
    }
    /// 从虚拟地址获取物理地址
    pub fn translate_va(&self, va: VirtAddr) -> Option<PhysAddr> {
        let ppn = self
            .find_page_table(va.segment_index())?
            .find(va.page_index())?;
        Some(PhysAddr::new(ppn, va.page_offset()))
    }
    /// 遍历全部映射
    pub fn mappings(&self) -> impl Iterator<Item = (VirtPageNum, PhysPageNum)> + '_ {
        self.entries.iter().flat_map(|ste| {
            ste.page_table
                .iter()
                .map(move |pte| (VirtPageNum::from_indexes(ste.segment_index, pte.page_index), pte.ppn))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_and_translate() {
        let mut st = SegmentTable::new();
        st.map(VirtPageNum::from_indexes(6, 5), PhysPageNum(9));

        let va = VirtAddr((6 << 15) | (5 << 10) | 439);
        assert_eq!(st.translate_va(va), Some(PhysAddr(9 * 1024 + 439)));
        assert_eq!(st.translate(VirtPageNum::from_indexes(6, 5)), Some(PhysPageNum(9)));
    }

    #[test]
    fn test_translate_misses() {
        let mut st = SegmentTable::new();
        st.map(VirtPageNum::from_indexes(6, 5), PhysPageNum(9));
        // 段不存在
        assert_eq!(st.translate_va(VirtAddr(7 << 15)), None);
        // 段存在，页不存在
        assert_eq!(st.translate_va(VirtAddr(6 << 15)), None);
    }

    #[test]
    fn test_segments_created_lazily() {
        let mut st = SegmentTable::new();
        for page in 30..34 {
            st.map(VirtPageNum(page), PhysPageNum(page));
        }
        // 页 30、31 属于段 0，页 32、33 属于段 1
        assert_eq!(st.len(), 2);
        assert_eq!(st.find_page_table(0).map(PageTable::len), Some(2));
        assert_eq!(st.find_page_table(1).map(PageTable::len), Some(2));
    }

    #[test]
    fn test_unmap_swaps_with_last() {
        let mut st = SegmentTable::new();
        for page in 0..3 {
            st.map(VirtPageNum(page), PhysPageNum(10 + page));
        }
        assert_eq!(st.unmap(VirtPageNum(0)), Some(PhysPageNum(10)));
        let order: Vec<usize> = st
            .find_page_table(0)
            .unwrap()
            .iter()
            .map(|pte| pte.page_index)
            .collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(st.unmap(VirtPageNum(0)), None);
    }

    #[test]
    fn test_unmap_last_page_removes_segment() {
        let mut st = SegmentTable::new();
        st.map(VirtPageNum::from_indexes(0, 1), PhysPageNum(1));
        st.map(VirtPageNum::from_indexes(2, 0), PhysPageNum(2));
        st.map(VirtPageNum::from_indexes(3, 0), PhysPageNum(3));

        st.unmap(VirtPageNum::from_indexes(0, 1));
        assert_eq!(st.len(), 2);
        assert!(st.find_page_table(0).is_none());
        // 段 3 被换到了原先段 0 的位置
        let segments: Vec<usize> = st.mappings().map(|(vpn, _)| vpn.indexes()[0]).collect();
        assert_eq!(segments, vec![3, 2]);
    }

    #[test]
    fn test_mappings_enumerates_everything() {
        let mut st = SegmentTable::new();
        st.map(VirtPageNum(1), PhysPageNum(4));
        st.map(VirtPageNum(40), PhysPageNum(5));
        let mut all: Vec<_> = st.mappings().collect();
        all.sort();
        assert_eq!(
            all,
            vec![(VirtPageNum(1), PhysPageNum(4)), (VirtPageNum(40), PhysPageNum(5))]
        );
        assert!(!st.is_empty());
    }
}

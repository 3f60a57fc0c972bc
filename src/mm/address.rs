//! 物理地址和虚拟地址及页号的实现
use crate::config::{OFFSET_LEN, PAGE_LEN, PAGE_SIZE, SEGMENT_LEN};
use core::fmt::{self, Debug, Formatter};

/// 地址总线宽度
const ADDR_WIDTH: usize = SEGMENT_LEN + PAGE_LEN + OFFSET_LEN;
/// 页号位宽
const PN_WIDTH: usize = ADDR_WIDTH - OFFSET_LEN;

/// 物理地址结构体
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct PhysAddr(pub usize);

/// 虚拟地址结构体
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct VirtAddr(pub usize);

/// 物理页号（页帧编号）
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct PhysPageNum(pub usize);

/// 虚拟页号
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct VirtPageNum(pub usize);

impl Debug for VirtAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("VA:{:#07x}", self.0))
    }
}
impl Debug for VirtPageNum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("VPN:{:#x}", self.0))
    }
}
impl Debug for PhysAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("PA:{:#07x}", self.0))
    }
}
impl Debug for PhysPageNum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("PPN:{:#x}", self.0))
    }
}

/// 从 usize 转换时截断到地址总线宽度
impl From<usize> for PhysAddr {
    fn from(v: usize) -> Self {
        Self(v & ((1 << ADDR_WIDTH) - 1))
    }
}
impl From<usize> for PhysPageNum {
    fn from(v: usize) -> Self {
        Self(v & ((1 << PN_WIDTH) - 1))
    }
}
impl From<usize> for VirtAddr {
    fn from(v: usize) -> Self {
        Self(v & ((1 << ADDR_WIDTH) - 1))
    }
}
impl From<usize> for VirtPageNum {
    fn from(v: usize) -> Self {
        Self(v & ((1 << PN_WIDTH) - 1))
    }
}
impl From<PhysAddr> for usize {
    fn from(v: PhysAddr) -> Self {
        v.0
    }
}
impl From<PhysPageNum> for usize {
    fn from(v: PhysPageNum) -> Self {
        v.0
    }
}
impl From<VirtAddr> for usize {
    fn from(v: VirtAddr) -> Self {
        v.0
    }
}
impl From<VirtPageNum> for usize {
    fn from(v: VirtPageNum) -> Self {
        v.0
    }
}

impl VirtAddr {
    /// 虚拟地址所在的页号（下取整）
    pub fn floor(&self) -> VirtPageNum {
        VirtPageNum(self.0 / PAGE_SIZE)
    }

    /// 页内偏移，即地址的低 `OFFSET_LEN` 位
    pub fn page_offset(&self) -> usize {
        self.0 & (PAGE_SIZE - 1)
    }

    /// 第一级索引（段号）
    pub fn segment_index(&self) -> usize {
        self.0 >> (OFFSET_LEN + PAGE_LEN)
    }

    /// 第二级索引（段内页号）
    pub fn page_index(&self) -> usize {
        (self.0 >> OFFSET_LEN) & ((1 << PAGE_LEN) - 1)
    }
}
impl From<VirtPageNum> for VirtAddr {
    fn from(v: VirtPageNum) -> Self {
        Self(v.0 << OFFSET_LEN)
    }
}

impl PhysAddr {
    /// 由页帧号与页内偏移拼接出物理地址
    pub fn new(ppn: PhysPageNum, offset: usize) -> Self {
        Self((ppn.0 << OFFSET_LEN) | (offset & (PAGE_SIZE - 1)))
    }

    /// 物理地址所在的页帧号
    pub fn floor(&self) -> PhysPageNum {
        PhysPageNum(self.0 >> OFFSET_LEN)
    }

    /// 页内偏移
    pub fn page_offset(&self) -> usize {
        self.0 & (PAGE_SIZE - 1)
    }
}
impl From<PhysPageNum> for PhysAddr {
    fn from(v: PhysPageNum) -> Self {
        Self(v.0 << OFFSET_LEN)
    }
}

impl VirtPageNum {
    /// 两级页表的索引：`[段号, 段内页号]`
    pub fn indexes(&self) -> [usize; 2] {
        [self.0 >> PAGE_LEN, self.0 & ((1 << PAGE_LEN) - 1)]
    }

    /// 由两级索引拼出虚拟页号
    pub fn from_indexes(segment_index: usize, page_index: usize) -> Self {
        Self((segment_index << PAGE_LEN) | (page_index & ((1 << PAGE_LEN) - 1)))
    }
}

/// 用于遍历虚拟页号的迭代器
pub trait StepByOne {
    /// 前进一页
    fn step(&mut self);
}
impl StepByOne for VirtPageNum {
    fn step(&mut self) {
        self.0 += 1;
    }
}

#[derive(Copy, Clone)]
/// 左闭右开的页号区间
pub struct SimpleRange<T>
where
    T: StepByOne + Copy + PartialEq + PartialOrd + Debug,
{
    l: T,
    r: T,
}
impl<T> SimpleRange<T>
where
    T: StepByOne + Copy + PartialEq + PartialOrd + Debug,
{
    pub fn new(start: T, end: T) -> Self {
        assert!(start <= end, "start {:?} > end {:?}!", start, end);
        Self { l: start, r: end }
    }
}
impl<T> IntoIterator for SimpleRange<T>
where
    T: StepByOne + Copy + PartialEq + PartialOrd + Debug,
{
    type Item = T;
    type IntoIter = SimpleRangeIterator<T>;
    fn into_iter(self) -> Self::IntoIter {
        SimpleRangeIterator::new(self.l, self.r)
    }
}

/// [`SimpleRange`] 的迭代器
pub struct SimpleRangeIterator<T>
where
    T: StepByOne + Copy + PartialEq + PartialOrd + Debug,
{
    current: T,
    end: T,
}
impl<T> SimpleRangeIterator<T>
where
    T: StepByOne + Copy + PartialEq + PartialOrd + Debug,
{
    pub fn new(l: T, r: T) -> Self {
        Self { current: l, end: r }
    }
}
impl<T> Iterator for SimpleRangeIterator<T>
where
    T: StepByOne + Copy + PartialEq + PartialOrd + Debug,
{
    type Item = T;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.end {
            None
        } else {
            let t = self.current;
            self.current.step();
            Some(t)
        }
    }
}

/// 虚拟页号区间
pub type VPNRange = SimpleRange<VirtPageNum>;

//! 虚拟内存管理器 [`MemoryManager`]
//!
//! 一把互斥锁同时保护页帧状态表和被操作进程的页表，分配和释放的
//! 检查与提交在同一个临界区内完成。读写单个字节只做地址转换，不持锁。

use super::frame_allocator::{FrameAllocator, FrameStatus, FrameTable};
use super::ram::Ram;
use super::{AddressSpace, PhysAddr, PhysPageNum, VPNRange, VirtAddr, VirtPageNum};
use crate::config::{OFFSET_LEN, PAGE_SIZE, RAM_SIZE};
use crate::error::MemError;
use spin::Mutex;

/// 物理内存与页帧状态表
pub struct MemoryManager {
    ram: Ram,
    frames: Mutex<FrameTable>,
}

impl MemoryManager {
    /// 创建全零的物理内存，所有页帧空闲
    pub fn new() -> Self {
        Self {
            ram: Ram::new(),
            frames: Mutex::new(FrameTable::new()),
        }
    }

    /// 清零物理内存并释放所有页帧
    pub fn init(&self) {
        let mut frames = self.frames.lock();
        frames.reset();
        self.ram.clear();
    }

    /// 为进程分配 `size` 字节，返回这段内存的起始虚拟地址
    pub fn alloc(&self, size: usize, space: &mut AddressSpace) -> Result<VirtAddr, MemError> {
        if size == 0 {
            return Err(MemError::InvalidSize);
        }
        let num_pages = size.div_ceil(PAGE_SIZE);
        let len = num_pages
            .checked_mul(PAGE_SIZE)
            .ok_or(MemError::OutOfMemory)?;
        let mut frames = self.frames.lock();
        // 虚拟断点以物理空间大小为上界
        let fits = space
            .bp
            .checked_add(len)
            .map_or(false, |end| end < RAM_SIZE);
        if !fits || frames.free_count() < num_pages {
            trace!(
                "alloc {} bytes for pid {} failed, free frames {}",
                size,
                space.pid(),
                frames.free_count()
            );
            return Err(MemError::OutOfMemory);
        }
        let start = VirtAddr(space.bp);
        let start_vpn = start.floor();
        let range = VPNRange::new(start_vpn, VirtPageNum(start_vpn.0 + num_pages));
        // 乱序释放后断点之上可能仍有映射
        if let Some(vpn) = range
            .into_iter()
            .find(|&vpn| space.segment_table.translate(vpn).is_some())
        {
            trace!(
                "alloc {} bytes for pid {} failed, {:?} above bp still mapped",
                size,
                space.pid(),
                vpn
            );
            return Err(MemError::OutOfMemory);
        }
        let chain = frames
            .alloc(space.pid(), num_pages)
            .ok_or(MemError::OutOfMemory)?;
        for (vpn, ppn) in range.into_iter().zip(chain) {
            space.segment_table.map(vpn, ppn);
        }
        space.bp += len;
        trace!(
            "pid {} alloc {} pages at {:?}, bp -> {:#x}",
            space.pid(),
            num_pages,
            start,
            space.bp
        );
        Ok(start)
    }

    /// 释放以 `va` 开头的内存块
    pub fn free(&self, va: VirtAddr, space: &mut AddressSpace) -> Result<(), MemError> {
        let mut frames = self.frames.lock();
        let pa = space.translate(va).ok_or(MemError::Unmapped)?;
        let num_pages = frames.dealloc(pa.floor());

        let start_vpn = va.floor();
        for vpn in VPNRange::new(start_vpn, VirtPageNum(start_vpn.0 + num_pages)) {
            space.segment_table.unmap(vpn);
        }
        // 假定按后进先出的顺序释放，断点不低于第一页
        space.bp = space
            .bp
            .saturating_sub(num_pages * PAGE_SIZE)
            .max(PAGE_SIZE);
        trace!(
            "pid {} free {} pages at {:?}, bp -> {:#x}",
            space.pid(),
            num_pages,
            va,
            space.bp
        );
        Ok(())
    }

    /// 从进程的虚拟地址读取一个字节
    pub fn read(&self, va: VirtAddr, space: &AddressSpace) -> Result<u8, MemError> {
        let pa = self.translate(va, space).ok_or(MemError::Unmapped)?;
        Ok(self.ram.read(pa))
    }

    /// 向进程的虚拟地址写入一个字节
    pub fn write(&self, va: VirtAddr, space: &AddressSpace, data: u8) -> Result<(), MemError> {
        let pa = self.translate(va, space).ok_or(MemError::Unmapped)?;
        self.ram.write(pa, data);
        Ok(())
    }

    /// 将虚拟地址转换为物理地址
    pub fn translate(&self, va: VirtAddr, space: &AddressSpace) -> Option<PhysAddr> {
        space.translate(va)
    }

    /// 空闲页帧数
    pub fn free_frame_count(&self) -> usize {
        self.frames.lock().free_count()
    }

    /// 被 `pid` 占用的页帧
    pub fn frames_owned_by(&self, pid: u32) -> Vec<PhysPageNum> {
        self.frames.lock().owned_by(pid)
    }

    /// 某个页帧的状态
    pub fn frame_status(&self, ppn: PhysPageNum) -> Option<FrameStatus> {
        self.frames.lock().status(ppn)
    }

    /// 页帧状态表的副本
    pub fn frame_table_snapshot(&self) -> FrameTable {
        self.frames.lock().clone()
    }

    /// 列出所有被占用的页帧及其中的非零字节
    pub fn dump(&self) -> String {
        let frames = self.frames.lock();
        let mut lines = Vec::new();
        for (ppn, status) in frames.occupied() {
            let start = ppn.0 << OFFSET_LEN;
            let end = ((ppn.0 + 1) << OFFSET_LEN) - 1;
            let next = status.next.map_or(-1, |n| n.0 as isize);
            lines.push(format!(
                "{:03}: {:05x}-{:05x} - PID: {:02} (idx {:03}, nxt: {:03})",
                ppn.0, start, end, status.owner, status.index, next
            ));
            for (pa, byte) in self.ram.non_zero_bytes(ppn) {
                lines.push(format!("\t{:05x}: {:02x}", pa.0, byte));
            }
        }
        lines.iter().map(|line| format!("{}\n", line)).collect()
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

//! 实现 [`FrameTable`]，记录所有物理页帧的归属。
//!
//! 每次分配得到的页帧通过 `next` 串成一条链，释放时沿链回收。
use super::PhysPageNum;
use crate::config::NUM_PAGES;
use core::fmt::{self, Debug, Formatter};

/// 单个物理页帧的状态
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct FrameStatus {
    /// 占用该页帧的进程 pid，0 表示空闲
    pub owner: u32,
    /// 该页帧在所属分配块中的序号
    pub index: usize,
    /// 同一分配块中的下一个页帧，`None` 表示链尾
    pub next: Option<PhysPageNum>,
}

impl FrameStatus {
    /// 页帧是否空闲
    pub fn is_free(&self) -> bool {
        self.owner == 0
    }
}

impl Debug for FrameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.next {
            Some(next) => f.write_fmt(format_args!(
                "Frame(pid={}, idx={}, nxt={})",
                self.owner, self.index, next.0
            )),
            None => f.write_fmt(format_args!(
                "Frame(pid={}, idx={}, nxt=-)",
                self.owner, self.index
            )),
        }
    }
}

/// 物理页帧分配器的接口
pub trait FrameAllocator {
    fn new() -> Self;
    /// 为 `pid` 分配 `count` 个页帧并串成链，页帧不足时不做任何修改
    fn alloc(&mut self, pid: u32, count: usize) -> Option<Vec<PhysPageNum>>;
    /// 从 `head` 开始沿链释放，返回释放的页帧数；`head` 空闲时返回 0
    fn dealloc(&mut self, head: PhysPageNum) -> usize;
}

/// 页帧状态表，每个物理页帧一项
#[derive(Clone, PartialEq, Eq)]
pub struct FrameTable {
    frames: Vec<FrameStatus>,
}

impl FrameTable {
    /// 将所有页帧标记为空闲
    pub fn reset(&mut self) {
        self.frames.fill(FrameStatus::default());
    }

    /// 空闲页帧数
    pub fn free_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_free()).count()
    }

    /// 查询某个页帧的状态
    pub fn status(&self, ppn: PhysPageNum) -> Option<FrameStatus> {
        self.frames.get(ppn.0).copied()
    }

    /// 所有被 `pid` 占用的页帧
    pub fn owned_by(&self, pid: u32) -> Vec<PhysPageNum> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, f)| pid != 0 && f.owner == pid)
            .map(|(i, _)| PhysPageNum(i))
            .collect()
    }

    /// 按页帧号顺序遍历被占用的页帧
    pub fn occupied(&self) -> impl Iterator<Item = (PhysPageNum, &FrameStatus)> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_free())
            .map(|(i, f)| (PhysPageNum(i), f))
    }
}

impl FrameAllocator for FrameTable {
    fn new() -> Self {
        Self {
            frames: vec![FrameStatus::default(); NUM_PAGES],
        }
    }

    fn alloc(&mut self, pid: u32, count: usize) -> Option<Vec<PhysPageNum>> {
        assert_ne!(pid, 0, "pid 0 marks a free frame");
        if count == 0 || self.free_count() < count {
            return None;
        }
        // 按页帧号顺序取前 count 个空闲页帧
        let mut chain: Vec<PhysPageNum> = Vec::with_capacity(count);
        for i in 0..NUM_PAGES {
            if chain.len() == count {
                break;
            }
            if !self.frames[i].is_free() {
                continue;
            }
            if let Some(last) = chain.last() {
                self.frames[last.0].next = Some(PhysPageNum(i));
            }
            self.frames[i] = FrameStatus {
                owner: pid,
                index: chain.len(),
                next: None,
            };
            chain.push(PhysPageNum(i));
        }
        Some(chain)
    }

    fn dealloc(&mut self, head: PhysPageNum) -> usize {
        let owner = match self.frames.get(head.0) {
            Some(frame) if !frame.is_free() => frame.owner,
            _ => return 0,
        };
        // 从块中间释放时，前一个页帧成为新的链尾
        if let Some(prev) = self.frames.iter_mut().find(|f| f.next == Some(head)) {
            prev.next = None;
        }
        let mut count = 0;
        let mut cur = Some(head);
        while let Some(ppn) = cur {
            let frame = &mut self.frames[ppn.0];
            if frame.owner != owner {
                break;
            }
            cur = frame.next;
            *frame = FrameStatus::default();
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_chains_first_free_frames() {
        let mut table = FrameTable::new();
        let a = table.alloc(1, 2).unwrap();
        let b = table.alloc(2, 3).unwrap();
        assert_eq!(a, vec![PhysPageNum(0), PhysPageNum(1)]);
        assert_eq!(b, vec![PhysPageNum(2), PhysPageNum(3), PhysPageNum(4)]);

        let head = table.status(PhysPageNum(2)).unwrap();
        assert_eq!((head.owner, head.index, head.next), (2, 0, Some(PhysPageNum(3))));
        let tail = table.status(PhysPageNum(4)).unwrap();
        assert_eq!((tail.owner, tail.index, tail.next), (2, 2, None));
        assert_eq!(table.free_count(), NUM_PAGES - 5);
    }

    #[test]
    fn test_alloc_fills_holes() {
        let mut table = FrameTable::new();
        table.alloc(1, 1).unwrap();
        table.alloc(2, 2).unwrap();
        table.alloc(3, 1).unwrap();
        assert_eq!(table.dealloc(PhysPageNum(1)), 2);

        // 空洞 1、2 先被使用，再接着用 4
        let c = table.alloc(4, 3).unwrap();
        assert_eq!(c, vec![PhysPageNum(1), PhysPageNum(2), PhysPageNum(4)]);
        assert_eq!(table.status(PhysPageNum(2)).unwrap().next, Some(PhysPageNum(4)));
    }

    #[test]
    fn test_alloc_insufficient_is_noop() {
        let mut table = FrameTable::new();
        table.alloc(1, NUM_PAGES - 2).unwrap();
        let before = table.clone();
        assert!(table.alloc(2, 3).is_none());
        assert!(table == before);
        assert!(table.alloc(2, 0).is_none());
    }

    #[test]
    fn test_dealloc_returns_chain_length() {
        let mut table = FrameTable::new();
        let frames = table.alloc(7, 4).unwrap();
        assert_eq!(table.owned_by(7), frames);
        assert_eq!(table.dealloc(frames[0]), 4);
        assert!(table.owned_by(7).is_empty());
        assert_eq!(table.free_count(), NUM_PAGES);
        assert_eq!(table.occupied().count(), 0);
    }

    #[test]
    fn test_dealloc_mid_chain_cuts_predecessor() {
        let mut table = FrameTable::new();
        let frames = table.alloc(1, 3).unwrap();
        assert_eq!(table.dealloc(frames[1]), 2);
        assert_eq!(table.status(frames[0]).unwrap().next, None);

        // 被释放的页帧交给其他进程后，释放链头不会波及它
        assert_eq!(table.alloc(2, 1).unwrap(), vec![frames[1]]);
        assert_eq!(table.dealloc(frames[0]), 1);
        assert_eq!(table.status(frames[1]).unwrap().owner, 2);
        assert_eq!(table.free_count(), NUM_PAGES - 1);
    }

    #[test]
    fn test_dealloc_free_frame_is_noop() {
        let mut table = FrameTable::new();
        table.alloc(1, 2).unwrap();
        let before = table.clone();
        assert_eq!(table.dealloc(PhysPageNum(5)), 0);
        assert_eq!(table.dealloc(PhysPageNum(NUM_PAGES)), 0);
        assert!(table == before);
    }
}

//! 模拟的物理内存
//!
//! 字节以原子量保存，读写单个字节不需要持有内存锁。

use super::{PhysAddr, PhysPageNum};
use crate::config::{PAGE_SIZE, RAM_SIZE};
use core::sync::atomic::{AtomicU8, Ordering};

/// 大小为 `RAM_SIZE` 的字节数组
pub struct Ram {
    bytes: Box<[AtomicU8]>,
}

impl Ram {
    /// 创建全零的物理内存
    pub fn new() -> Self {
        Self {
            bytes: (0..RAM_SIZE).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    /// 将所有字节清零
    pub fn clear(&self) {
        for byte in self.bytes.iter() {
            byte.store(0, Ordering::Relaxed);
        }
    }

    /// 读取一个字节
    #[inline]
    pub fn read(&self, pa: PhysAddr) -> u8 {
        self.bytes[pa.0].load(Ordering::Acquire)
    }

    /// 写入一个字节
    #[inline]
    pub fn write(&self, pa: PhysAddr, value: u8) {
        self.bytes[pa.0].store(value, Ordering::Release);
    }

    /// 页帧内所有非零字节及其物理地址
    pub fn non_zero_bytes(&self, ppn: PhysPageNum) -> impl Iterator<Item = (PhysAddr, u8)> + '_ {
        let base: PhysAddr = ppn.into();
        self.bytes[base.0..base.0 + PAGE_SIZE]
            .iter()
            .enumerate()
            .filter_map(move |(i, byte)| match byte.load(Ordering::Acquire) {
                0 => None,
                v => Some((PhysAddr(base.0 + i), v)),
            })
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_initialization() {
        let ram = Ram::new();
        assert_eq!(ram.read(PhysAddr(0)), 0);
        assert_eq!(ram.read(PhysAddr(RAM_SIZE - 1)), 0);
    }

    #[test]
    fn test_ram_read_write_clear() {
        let ram = Ram::new();
        ram.write(PhysAddr(2048 + 5), 0x2a);
        assert_eq!(ram.read(PhysAddr(2048 + 5)), 0x2a);

        let found: Vec<_> = ram.non_zero_bytes(PhysPageNum(2)).collect();
        assert_eq!(found, vec![(PhysAddr(2053), 0x2a)]);
        assert_eq!(ram.non_zero_bytes(PhysPageNum(3)).count(), 0);

        ram.clear();
        assert_eq!(ram.read(PhysAddr(2053)), 0);
    }
}

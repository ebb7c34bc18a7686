// ============================================================================
// src/mmio.rs - Register Access Layer
// ============================================================================
//!
//! メモリマップド 8/16/32-bit レジスタへのアクセスと
//! read-modify-write ヘルパー。
//!
//! キャッシュは持たない。直列化は呼び出し側の責任。

#![allow(dead_code)]

use core::ptr::{read_volatile, write_volatile};

// ============================================================================
// RegisterSpace trait
// ============================================================================

/// バイトアドレスで参照するレジスタ領域
///
/// 実機では [`MmioRegion`]、テストでは記録付きの偽領域が実装する。
/// アクセス失敗は想定しない (ハードウェア状態が不定になった時点で
/// 呼び出し元の操作ごと破綻する)。
pub trait RegisterSpace: Send + Sync {
    fn read8(&self, offset: u32) -> u8;
    fn read16(&self, offset: u32) -> u16;
    fn read32(&self, offset: u32) -> u32;
    fn write8(&self, offset: u32, value: u8);
    fn write16(&self, offset: u32, value: u16);
    fn write32(&self, offset: u32, value: u32);

    /// 8-bit レジスタのビットを立てる
    #[inline]
    fn set_bits8(&self, offset: u32, bits: u8) {
        let value = self.read8(offset);
        self.write8(offset, value | bits);
    }

    /// 8-bit レジスタのビットを落とす
    #[inline]
    fn clear_bits8(&self, offset: u32, bits: u8) {
        let value = self.read8(offset);
        self.write8(offset, value & !bits);
    }

    #[inline]
    fn set_bits16(&self, offset: u32, bits: u16) {
        let value = self.read16(offset);
        self.write16(offset, value | bits);
    }

    #[inline]
    fn clear_bits16(&self, offset: u32, bits: u16) {
        let value = self.read16(offset);
        self.write16(offset, value & !bits);
    }

    #[inline]
    fn set_bits32(&self, offset: u32, bits: u32) {
        let value = self.read32(offset);
        self.write32(offset, value | bits);
    }

    #[inline]
    fn clear_bits32(&self, offset: u32, bits: u32) {
        let value = self.read32(offset);
        self.write32(offset, value & !bits);
    }

    /// `shift` から `width` ビットのフィールドだけを書き換える
    fn write_field8(&self, offset: u32, shift: u32, width: u32, value: u8) {
        let mask = field_mask(shift, width) as u8;
        let current = self.read8(offset);
        self.write8(offset, (current & !mask) | ((value << shift) & mask));
    }

    fn write_field16(&self, offset: u32, shift: u32, width: u32, value: u16) {
        let mask = field_mask(shift, width) as u16;
        let current = self.read16(offset);
        self.write16(offset, (current & !mask) | ((value << shift) & mask));
    }

    fn write_field32(&self, offset: u32, shift: u32, width: u32, value: u32) {
        let mask = field_mask(shift, width);
        let current = self.read32(offset);
        self.write32(offset, (current & !mask) | ((value << shift) & mask));
    }
}

/// `shift` 位置から `width` ビット分のマスク
#[inline]
pub const fn field_mask(shift: u32, width: u32) -> u32 {
    if width >= 32 {
        u32::MAX << shift
    } else {
        ((1u32 << width) - 1) << shift
    }
}

// ============================================================================
// MmioRegion
// ============================================================================

/// PCI BAR をマップした MMIO 領域
pub struct MmioRegion {
    base: usize,
    len: u32,
}

// SAFETY: MmioRegion はハードウェアレジスタのアドレスのみを保持し、
// 全アクセスは volatile で行う。同時アクセスの整合性は呼び出し側が保証する。
unsafe impl Send for MmioRegion {}
unsafe impl Sync for MmioRegion {}

impl MmioRegion {
    /// Create a region over an already-mapped BAR.
    ///
    /// # Safety
    ///
    /// `base` must point to a mapping of at least `len` bytes of device
    /// registers that stays valid for the lifetime of the region.
    pub const unsafe fn new(base: usize, len: u32) -> Self {
        Self { base, len }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn addr(&self, offset: u32) -> usize {
        debug_assert!(offset < self.len);
        self.base + offset as usize
    }
}

impl RegisterSpace for MmioRegion {
    #[inline]
    fn read8(&self, offset: u32) -> u8 {
        // SAFETY: new() の契約によりマップ済みのレジスタ領域
        unsafe { read_volatile(self.addr(offset) as *const u8) }
    }

    #[inline]
    fn read16(&self, offset: u32) -> u16 {
        // SAFETY: 同上
        unsafe { read_volatile(self.addr(offset) as *const u16) }
    }

    #[inline]
    fn read32(&self, offset: u32) -> u32 {
        // SAFETY: 同上
        unsafe { read_volatile(self.addr(offset) as *const u32) }
    }

    #[inline]
    fn write8(&self, offset: u32, value: u8) {
        // SAFETY: 同上
        unsafe { write_volatile(self.addr(offset) as *mut u8, value) }
    }

    #[inline]
    fn write16(&self, offset: u32, value: u16) {
        // SAFETY: 同上
        unsafe { write_volatile(self.addr(offset) as *mut u16, value) }
    }

    #[inline]
    fn write32(&self, offset: u32, value: u32) {
        // SAFETY: 同上
        unsafe { write_volatile(self.addr(offset) as *mut u32, value) }
    }
}

// ============================================================================
// Tests
// ============================================================================

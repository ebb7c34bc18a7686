// ============================================================================
// src/testing.rs - Test Fixtures
// ============================================================================
//!
//! テスト専用の偽レジスタ領域と偽プラットフォーム。
//!
//! - `FakeRegion`: メモリ配列 + アクセス記録 + EEPROM モデル
//! - `FakePlatform`: 遅延とタイムスタンプの記録
//! - `serial_bits`: GPIO 履歴からシリアルビット列を復元する

#![allow(dead_code)]

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use spin::Mutex;

use crate::chip::Chip;
use crate::config::DriverConfig;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

// ============================================================================
// FakeRegion
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read { offset: u32, width: u8 },
    Write { offset: u32, width: u8, value: u32 },
}

struct Inner {
    mem: Vec<u8>,
    trace: Vec<Access>,
    gpio_history: Vec<u32>,
    eeprom: Option<[u8; 4]>,
}

pub struct FakeRegion {
    inner: Mutex<Inner>,
}

impl FakeRegion {
    pub fn new(size: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                mem: vec![0; size],
                trace: Vec::new(),
                gpio_history: Vec::new(),
                eeprom: None,
            }),
        }
    }

    /// CCS 領域: EEPROM に識別子を置き、EEPROM 存在ビットを立てる
    pub fn ccs_with_eeprom(id: [u8; 4]) -> Self {
        let region = Self::new(CCS_REGION_SIZE as usize);
        region.inner.lock().eeprom = Some(id);
        region.poke8(CCS_I2C_STATUS, CCS_I2C_EPROM);
        region
    }

    pub fn mt() -> Self {
        Self::new(MT_REGION_SIZE as usize)
    }

    /// 記録を残さずに書き込む
    pub fn poke8(&self, offset: u32, value: u8) {
        self.inner.lock().mem[offset as usize] = value;
    }

    pub fn poke32(&self, offset: u32, value: u32) {
        let mut inner = self.inner.lock();
        let at = offset as usize;
        inner.mem[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn peek8(&self, offset: u32) -> u8 {
        self.inner.lock().mem[offset as usize]
    }

    pub fn peek16(&self, offset: u32) -> u16 {
        let inner = self.inner.lock();
        let at = offset as usize;
        u16::from_le_bytes([inner.mem[at], inner.mem[at + 1]])
    }

    pub fn trace(&self) -> Vec<Access> {
        self.inner.lock().trace.clone()
    }

    /// 書き込みだけを (offset, value) で返す
    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.trace()
            .into_iter()
            .filter_map(|access| match access {
                Access::Write { offset, value, .. } => Some((offset, value)),
                Access::Read { .. } => None,
            })
            .collect()
    }

    /// 指定オフセットへの書き込み値
    pub fn writes_to(&self, target: u32) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|(offset, _)| *offset == target)
            .map(|(_, value)| value)
            .collect()
    }

    /// GPIO_DATA2 書き込みごとの 24-bit GPIO 値
    pub fn gpio_history(&self) -> Vec<u32> {
        self.inner.lock().gpio_history.clone()
    }

    pub fn clear_trace(&self) {
        let mut inner = self.inner.lock();
        inner.trace.clear();
        inner.gpio_history.clear();
    }

    fn load(&self, offset: u32, width: u8) -> u32 {
        let mut inner = self.inner.lock();
        inner.trace.push(Access::Read { offset, width });
        let at = offset as usize;
        let mut value = 0u32;
        for i in 0..width as usize {
            value |= (inner.mem[at + i] as u32) << (8 * i);
        }
        value
    }

    fn store(&self, offset: u32, width: u8, value: u32) {
        let mut inner = self.inner.lock();
        inner.trace.push(Access::Write {
            offset,
            width,
            value,
        });
        let at = offset as usize;
        for i in 0..width as usize {
            inner.mem[at + i] = (value >> (8 * i)) as u8;
        }

        if let Some(eeprom) = inner.eeprom {
            if offset == CCS_I2C_DEV_ADDRESS && value as u8 == EEPROM_DEV_ADDRESS {
                let addr = inner.mem[CCS_I2C_ADDR as usize] as usize;
                inner.mem[CCS_I2C_DATA as usize] = eeprom.get(addr).copied().unwrap_or(0xFF);
            }
        }
        if offset == CCS_GPIO_DATA2 && width == 1 && inner.mem.len() >= CCS_REGION_SIZE as usize {
            let gpio = u16::from_le_bytes([
                inner.mem[CCS_GPIO_DATA as usize],
                inner.mem[CCS_GPIO_DATA as usize + 1],
            ]) as u32
                | (inner.mem[CCS_GPIO_DATA2 as usize] as u32) << 16;
            inner.gpio_history.push(gpio);
        }
    }
}

impl RegisterSpace for FakeRegion {
    fn read8(&self, offset: u32) -> u8 {
        self.load(offset, 1) as u8
    }
    fn read16(&self, offset: u32) -> u16 {
        self.load(offset, 2) as u16
    }
    fn read32(&self, offset: u32) -> u32 {
        self.load(offset, 4)
    }
    fn write8(&self, offset: u32, value: u8) {
        self.store(offset, 1, value as u32)
    }
    fn write16(&self, offset: u32, value: u16) {
        self.store(offset, 2, value as u32)
    }
    fn write32(&self, offset: u32, value: u32) {
        self.store(offset, 4, value)
    }
}

// ============================================================================
// FakePlatform
// ============================================================================

pub struct FakePlatform {
    pub delays: AtomicU64,
    pub delay_calls: AtomicU32,
    pub timestamps: Mutex<Vec<bool>>,
    pub clears: AtomicU32,
    /// 成功させるアドレス変換の回数 (u32::MAX = 無制限)
    pub translations_left: AtomicU32,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            delays: AtomicU64::new(0),
            delay_calls: AtomicU32::new(0),
            timestamps: Mutex::new(Vec::new()),
            clears: AtomicU32::new(0),
            translations_left: AtomicU32::new(u32::MAX),
        }
    }

    pub fn timestamps(&self) -> Vec<bool> {
        self.timestamps.lock().clone()
    }
}

impl Platform for FakePlatform {
    fn delay_us(&self, us: u32) {
        self.delays.fetch_add(us as u64, Ordering::Relaxed);
        self.delay_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn virt_to_phys(&self, virt: usize) -> Option<u32> {
        let left = self.translations_left.load(Ordering::Relaxed);
        if left == 0 {
            return None;
        }
        if left != u32::MAX {
            self.translations_left.store(left - 1, Ordering::Relaxed);
        }
        // 下位 31 bit を疑似物理アドレスとして使う
        Some(virt as u32 & 0x7FFF_FFFF)
    }

    fn take_timestamp(&self, increment_loop: bool) {
        self.timestamps.lock().push(increment_loop);
    }

    fn clear_sample_buffers(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}

pub type FakeChip = Chip<FakeRegion, FakePlatform>;

/// EEPROM なしの CCS と空の MT を持つチップ
pub fn bare_chip() -> Arc<FakeChip> {
    Arc::new(Chip::new(
        FakeRegion::new(CCS_REGION_SIZE as usize),
        FakeRegion::mt(),
        FakePlatform::new(),
        DriverConfig::default(),
    ))
}

/// EEPROM に識別子を持つチップ
pub fn chip_with_id(id: u32) -> Arc<FakeChip> {
    Arc::new(Chip::new(
        FakeRegion::ccs_with_eeprom(id.to_le_bytes()),
        FakeRegion::mt(),
        FakePlatform::new(),
        DriverConfig::default(),
    ))
}

// ============================================================================
// Serial trace decoding
// ============================================================================

/// Clock rising edges while chip select is low; returns the sampled data bits.
pub fn serial_bits(history: &[u32], clk: u32, data: u32, cs: u32) -> Vec<bool> {
    let mut bits = Vec::new();
    for pair in history.windows(2) {
        let (prev, now) = (pair[0], pair[1]);
        let rising = prev & clk == 0 && now & clk != 0;
        if rising && now & cs == 0 {
            bits.push(now & data != 0);
        }
    }
    bits
}

pub fn bits_to_u32(bits: &[bool]) -> u32 {
    bits.iter().fold(0, |acc, bit| (acc << 1) | *bit as u32)
}

/// 履歴を `bits` ビットずつのワードに区切る
pub fn serial_words(history: &[u32], clk: u32, data: u32, cs: u32, bits: usize) -> Vec<u32> {
    serial_bits(history, clk, data, cs)
        .chunks(bits)
        .filter(|chunk| chunk.len() == bits)
        .map(bits_to_u32)
        .collect()
}

// ============================================================================
// src/chip.rs - VT1724 Chip Access
// ============================================================================
//!
//! Envy24HT チップ本体へのアクセス。
//!
//! - CCS / MT の 2 領域
//! - GPIO データ・マスク・方向の操作
//! - ホストサービス (遅延など) への委譲
//!
//! コマンド経路と割り込み経路の両方が `Arc<Chip>` を共有する。

#![allow(dead_code)]

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::DriverConfig;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

// ============================================================================
// GPIO configuration snapshot
// ============================================================================

/// GPIO 方向とマスクの退避値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioConfig {
    pub direction: u32,
    pub mask: u16,
}

// ============================================================================
// Chip
// ============================================================================

/// Envy24HT controller: both register regions plus host services.
pub struct Chip<R, P> {
    ccs: R,
    mt: R,
    platform: P,
    config: DriverConfig,
    /// 2 線式バスのタイムアウト累計
    pub(crate) i2c_timeouts: AtomicU32,
}

impl<R: RegisterSpace, P: Platform> Chip<R, P> {
    pub fn new(ccs: R, mt: R, platform: P, config: DriverConfig) -> Self {
        Self {
            ccs,
            mt,
            platform,
            config,
            i2c_timeouts: AtomicU32::new(0),
        }
    }

    /// Control/status region (BAR0)
    #[inline]
    pub fn ccs(&self) -> &R {
        &self.ccs
    }

    /// Multi-track region (BAR1)
    #[inline]
    pub fn mt(&self) -> &R {
        &self.mt
    }

    #[inline]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[inline]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    #[inline]
    pub fn delay_us(&self, us: u32) {
        self.platform.delay_us(us);
    }

    /// これまでに発生した 2 線式バスのタイムアウト回数
    pub fn i2c_timeouts(&self) -> u32 {
        self.i2c_timeouts.load(Ordering::Relaxed)
    }

    // ========================================================================
    // GPIO
    // ========================================================================

    /// 24-bit GPIO データを読む
    pub fn gpio_data(&self) -> u32 {
        let high = self.ccs.read8(CCS_GPIO_DATA2) as u32;
        (high << 16) | self.ccs.read16(CCS_GPIO_DATA) as u32
    }

    /// 24-bit GPIO データを書く (PCI ポスティング用のダミーリード付き)
    pub fn set_gpio_data(&self, data: u32) {
        self.ccs.write16(CCS_GPIO_DATA, (data & 0xFFFF) as u16);
        self.ccs.write8(CCS_GPIO_DATA2, ((data & 0xFF_0000) >> 16) as u8);
        let _ = self.ccs.read16(CCS_GPIO_DATA);
    }

    /// 24-bit GPIO 書き込みマスク (1 = 書き込み禁止)
    ///
    /// 下位ワードは 12 bit 分だけ書く。
    pub fn set_gpio_mask(&self, mask: u32) {
        self.ccs.write16(CCS_GPIO_MASK, (mask & 0xFFF) as u16);
        self.ccs.write8(CCS_GPIO_MASK2, ((mask & 0xFF_0000) >> 16) as u8);
        let _ = self.ccs.read16(CCS_GPIO_MASK);
    }

    /// GPIO 方向 (1 = 出力)
    pub fn set_gpio_dir(&self, dir: u32) {
        self.ccs.write32(CCS_GPIO_DIR, dir);
        let _ = self.ccs.read16(CCS_GPIO_DIR);
    }

    /// `bits` を立てる/落とす read-modify-write
    pub fn set_gpio_bits(&self, bits: u32, high: bool) {
        let data = self.gpio_data();
        self.set_gpio_data(if high { data | bits } else { data & !bits });
    }

    /// ピン番号指定の read-modify-write
    #[inline]
    pub fn write_gpio_pin(&self, pin: u32, high: bool) {
        self.set_gpio_bits(1 << pin, high);
    }

    /// 現在の方向とマスクを退避
    pub fn save_gpio(&self) -> GpioConfig {
        GpioConfig {
            direction: self.ccs.read32(CCS_GPIO_DIR) & 0x7F_FFFF,
            mask: self.ccs.read16(CCS_GPIO_MASK),
        }
    }

    /// 退避した方向とマスクを戻す
    pub fn restore_gpio(&self, saved: GpioConfig) {
        self.ccs.write32(CCS_GPIO_DIR, saved.direction);
        self.ccs.write16(CCS_GPIO_MASK, saved.mask);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bare_chip, Access};

    #[test]
    fn test_gpio_data_split_across_registers() {
        let chip = bare_chip();
        chip.set_gpio_data(0x00AB_CDEF);
        assert_eq!(chip.ccs().peek16(CCS_GPIO_DATA), 0xCDEF);
        assert_eq!(chip.ccs().peek8(CCS_GPIO_DATA2), 0xAB);
        assert_eq!(chip.gpio_data(), 0x00AB_CDEF);

        // 最後はポスティング用のダミーリード
        let trace = chip.ccs().trace();
        assert_eq!(
            trace[2],
            Access::Read {
                offset: CCS_GPIO_DATA,
                width: 2
            }
        );
    }

    #[test]
    fn test_gpio_mask_low_word_keeps_twelve_bits() {
        let chip = bare_chip();
        chip.set_gpio_mask(!(AUREON_WM_CS | AUREON_WM_RESET));
        assert_eq!(chip.ccs().peek16(CCS_GPIO_MASK), 0x0FFF);
        assert_eq!(chip.ccs().peek8(CCS_GPIO_MASK2), !0x10u8);

        chip.set_gpio_mask(0x00BF_FF05);
        assert_eq!(chip.ccs().peek16(CCS_GPIO_MASK), 0x0F05);
        assert_eq!(chip.ccs().peek8(CCS_GPIO_MASK2), 0xBF);
    }

    #[test]
    fn test_save_restore_gpio() {
        let chip = bare_chip();
        chip.set_gpio_dir(0x00DF_FFFF);
        chip.set_gpio_mask(0x0000_0234);
        let saved = chip.save_gpio();
        assert_eq!(saved.direction, 0x005F_FFFF);
        assert_eq!(saved.mask, 0x0234);

        chip.set_gpio_dir(0x700);
        chip.restore_gpio(saved);
        assert_eq!(chip.ccs().peek16(CCS_GPIO_MASK), 0x0234);
        assert_eq!(chip.save_gpio(), saved);
    }

    #[test]
    fn test_pin_read_modify_write() {
        let chip = bare_chip();
        chip.set_gpio_data(0x0000_0001);
        chip.write_gpio_pin(22, true);
        chip.write_gpio_pin(0, false);
        assert_eq!(chip.gpio_data(), 1 << 22);
    }
}

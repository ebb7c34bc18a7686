// ============================================================================
// src/boards/ap192.rs - M-Audio Audiophile 192
// ============================================================================
//!
//! AK4358 DAC と AK4114 S/PDIF レシーバを GPIO の SPI で駆動する。
//!
//! ## レートモード
//! | レート | I2S MCLK | DAC DFS | GPIO 8/9/10 |
//! |--------|----------|---------|-------------|
//! | ≤ 48k  | 256x     | normal  | 0 / 0 / 0   |
//! | ≤ 96k  | 256x     | double  | 0 / 1 / 0   |
//! | 192k   | 128x     | quad    | 1 / 0 / 1   |

use log::debug;

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;
use crate::spi::{Ap192Device, Ap192Spi};

/// DAC の減衰レジスタ最大値
pub const DAC_MAX: u8 = 0x7F;

/// ADC 制御ピン
const PIN_ADC_CKS0: u32 = 8;
const PIN_ADC_DFS0: u32 = 9;
const PIN_ADC_DFS1: u32 = 10;
const PIN_ADC_RESET: u32 = 11;

const SYSTEM_CONFIG: u8 = 0x68;
const I2S_FEATURES: u8 = CCS_I2S_VOLMUTE | CCS_I2S_96KHZ | CCS_I2S_24BIT | CCS_I2S_192KHZ;
const SPDIF_CONFIG: u8 =
    CCS_SPDIF_INTEGRATED | CCS_SPDIF_INTERNAL_OUT | CCS_SPDIF_IN_PRESENT | CCS_SPDIF_EXTERNAL_OUT;

/// クロックモード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMode {
    Single,
    Double,
    Quad,
}

impl RateMode {
    pub const fn for_rate(rate: u32) -> Self {
        if rate <= 48_000 {
            RateMode::Single
        } else if rate <= 96_000 {
            RateMode::Double
        } else {
            RateMode::Quad
        }
    }

    /// DAC レジスタ 2 の値 (リセット中, 通常動作)
    const fn dac_dfs(self) -> (u8, u8) {
        match self {
            RateMode::Single => (0x4E, 0x4F),
            RateMode::Double => (0x5E, 0x5F),
            RateMode::Quad => (0x6E, 0x6F),
        }
    }

    /// ADC ピン (CKS0, DFS0, DFS1)
    const fn adc_pins(self) -> (bool, bool, bool) {
        match self {
            RateMode::Single => (false, false, false),
            RateMode::Double => (false, true, false),
            RateMode::Quad => (true, false, true),
        }
    }
}

/// Write a DAC attenuation register; `level` is clamped to 0..=0x7F.
pub fn set_dac<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, reg: u8, level: u8) -> u8 {
    let level = level.min(DAC_MAX);
    Ap192Spi::write(chip, Ap192Device::Dac, reg, level | 0x80);
    level
}

pub fn set_mute<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, mute: bool) {
    if mute {
        Ap192Spi::write(chip, Ap192Device::Dac, 0x01, 0x03);
        chip.write_gpio_pin(AP192_MUTE_PIN, false);
    } else {
        chip.write_gpio_pin(AP192_MUTE_PIN, true);
        Ap192Spi::write(chip, Ap192Device::Dac, 0x01, 0x01);
    }
}

/// Switch the DAC, receiver and ADC into the clock mode for `mode`.
pub fn set_rate_mode<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, mode: RateMode) {
    if mode == RateMode::Quad {
        chip.mt().set_bits8(MT_I2S_FORMAT, MT_CLOCK_128X);
    } else {
        chip.mt().clear_bits8(MT_I2S_FORMAT, MT_CLOCK_128X);
    }

    let (reset, run) = mode.dac_dfs();
    Ap192Spi::write(chip, Ap192Device::Dac, 0x02, reset);
    Ap192Spi::write(chip, Ap192Device::Dac, 0x02, run);

    if mode == RateMode::Quad {
        Ap192Spi::write(chip, Ap192Device::Receiver, 0x00, 0x0D);
        Ap192Spi::write(chip, Ap192Device::Receiver, 0x00, 0x0F);
    }

    let (cks0, dfs0, dfs1) = mode.adc_pins();
    chip.write_gpio_pin(PIN_ADC_CKS0, cks0);
    chip.write_gpio_pin(PIN_ADC_DFS0, dfs0);
    chip.write_gpio_pin(PIN_ADC_DFS1, dfs1);

    // ADC タイミングのリセット
    chip.write_gpio_pin(PIN_ADC_RESET, false);
    chip.write_gpio_pin(PIN_ADC_RESET, true);
}

/// Pick the clock mode for a sample rate.
pub fn set_rate<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, rate: u32) -> RateMode {
    let mode = RateMode::for_rate(rate);
    set_rate_mode(chip, mode);
    debug!("[ENVY24HT] AP192 rate {} -> {:?}", rate, mode);
    mode
}

fn dac_init<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) {
    // power down, reset
    Ap192Spi::write(chip, Ap192Device::Dac, 0x02, 0x00);
    Ap192Spi::write(chip, Ap192Device::Dac, 0x02, 0x4E);
    // 24bit I2S
    Ap192Spi::write(chip, Ap192Device::Dac, 0x00, 0x06);
    // soft mute
    Ap192Spi::write(chip, Ap192Device::Dac, 0x01, 0x02);
    // de-emphasis off
    Ap192Spi::write(chip, Ap192Device::Dac, 0x03, 0x01);

    for reg in [0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0B, 0x0C] {
        set_dac(chip, reg, DAC_MAX);
    }

    for reg in [0x0A, 0x0D, 0x0E, 0x0F] {
        Ap192Spi::write(chip, Ap192Device::Dac, reg, 0x00);
    }
    Ap192Spi::write(chip, Ap192Device::Dac, 0x02, 0x4F);
}

pub fn init<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) {
    let ccs = chip.ccs();
    ccs.write8(CCS_SYSTEM_CONFIG, SYSTEM_CONFIG);
    ccs.write8(CCS_ACLINK_CONFIG, CCS_ACLINK_I2S);
    ccs.write8(CCS_I2S_FEATURES, I2S_FEATURES);
    ccs.write8(CCS_SPDIF_CONFIG, SPDIF_CONFIG);

    dac_init(chip);
    set_rate_mode(chip, RateMode::Single);
    set_mute(chip, false);

    // S/PDIF 出力マルチプレクサ
    chip.write_gpio_pin(AP192_GPIO5_PIN, false);
    chip.write_gpio_pin(AP192_GPIO5_PIN, false);

    debug!("[ENVY24HT] Audiophile 192 codecs ready");
}

// ============================================================================
// src/boards/aureon.rs - Terratec Aureon Sky / Space and Phase 28
// ============================================================================
//!
//! WM8770 codec (SPI)、CS8415 S/PDIF レシーバ (SPI)、
//! Xilinx CPLD 経由の STAC9744 AC'97 codec。
//! Phase 28 は CS8415 と AC'97 を持たない。

use log::debug;

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;
use crate::spi::{AureonSpi, XilinxAc97};
use crate::types::Variant;

// ============================================================================
// Register defaults
// ============================================================================

/// AC'97 register offsets used by the defaults table.
mod ac97 {
    pub const RESET: u8 = 0x00;
    pub const MASTER_VOL_STEREO: u8 = 0x02;
    pub const AUXOUT_VOL: u8 = 0x04;
    pub const MASTER_VOL_MONO: u8 = 0x06;
    pub const PHONE_VOL: u8 = 0x0C;
    pub const MIC_VOL: u8 = 0x0E;
    pub const LINEIN_VOL: u8 = 0x10;
    pub const CD_VOL: u8 = 0x12;
    pub const VIDEO_VOL: u8 = 0x14;
    pub const AUX_VOL: u8 = 0x16;
    pub const PCMOUT_VOL: u8 = 0x18;
    pub const PCM_FRONT_DAC_RATE: u8 = 0x2C;
    pub const PCM_LR_ADC_RATE: u8 = 0x32;
}

static AC97_DEFAULTS: &[(u8, u16)] = &[
    (ac97::RESET, 0x6940),
    (ac97::MASTER_VOL_STEREO, 0x0101), // 0dB, 0x0101 を超えないこと
    (ac97::AUXOUT_VOL, 0x8808),
    (ac97::MASTER_VOL_MONO, 0x8000),
    (ac97::PHONE_VOL, 0x8008),
    (ac97::MIC_VOL, 0x8008),
    (ac97::LINEIN_VOL, 0x8808),
    (ac97::CD_VOL, 0x0808),
    (ac97::VIDEO_VOL, 0x8808),
    (ac97::AUX_VOL, 0x8808),
    (ac97::PCMOUT_VOL, 0x8808),
    (ac97::PCM_FRONT_DAC_RATE, 0xAC44),
    (ac97::PCM_LR_ADC_RATE, 0xAC44),
];

/// WM8770 defaults for Aureon Sky/Space.
static WM_INITS: &[(u16, u16)] = &[
    (0x18, 0x000), // all power-up
    (0x1B, 0x022), // ADC mux: AIN1 = CD-in
    (0x1C, 0x00B), // out1 = DAC + aux (AC'97 mix), out2 = DAC
    (0x1D, 0x009), // out3+4 = DAC
    (0x16, 0x122), // I2S, normal polarity, 24bit
    (0x17, 0x022), // 256fs, slave
    (0x00, 0x17F), // DAC1..4 analog mute
    (0x01, 0x17F),
    (0x02, 0x17F),
    (0x03, 0x17F),
    (0x04, 0x07F), // DAC5..8 analog mute
    (0x05, 0x07F),
    (0x06, 0x07F),
    (0x07, 0x07F),
    (0x08, 0x17F), // master analog mute
    (0x09, 0x1FF), // DAC1..8 digital full
    (0x0A, 0x1FF),
    (0x0B, 0x0FF),
    (0x0C, 0x0FF),
    (0x0D, 0x0FF),
    (0x0E, 0x0FF),
    (0x0F, 0x0FF),
    (0x10, 0x0FF),
    (0x11, 0x1FF), // master digital full
    (0x12, 0x000), // phase normal
    (0x13, 0x090), // unmute DAC L/R
    (0x14, 0x000), // all unmute
    (0x15, 0x000), // no de-emphasis
    (0x19, 0x00C), // ADC 0dB
    (0x1A, 0x00C),
];

/// WM8770 defaults for the Phase 28 (line-in only).
static WM_INITS_PHASE28: &[(u16, u16)] = &[
    (0x18, 0x000),
    (0x1B, 0x000), // ADC mux: AIN1 = line-in
    (0x1C, 0x009),
    (0x1D, 0x009),
    (0x16, 0x122),
    (0x17, 0x022),
    (0x00, 0x000),
    (0x01, 0x000),
    (0x02, 0x07F),
    (0x03, 0x07F),
    (0x04, 0x07F),
    (0x05, 0x07F),
    (0x06, 0x07F),
    (0x07, 0x07F),
    (0x08, 0x17F),
    (0x09, 0x0FF),
    (0x0A, 0x0FF),
    (0x0B, 0x0FF),
    (0x0C, 0x0FF),
    (0x0D, 0x0FF),
    (0x0E, 0x0FF),
    (0x0F, 0x0FF),
    (0x10, 0x0FF),
    (0x11, 0x1FF),
    (0x12, 0x000),
    (0x13, 0x090),
    (0x14, 0x000),
    (0x15, 0x000),
    (0x19, 0x00C),
    (0x1A, 0x00C),
];

/// CS8415 defaults
static CS8415_INITS: &[u16] = &[
    0x0441, // RUN
    0x0180, // no mute
    0x0201,
    0x0605, // master, 16-bit slave, 24bit
];

// ============================================================================
// Bring-up
// ============================================================================

/// SPI bus wiring for the given board.
pub const fn spi_for(variant: Variant) -> AureonSpi {
    AureonSpi::new(!matches!(variant, Variant::Phase28))
}

/// AC'97 cold reset and defaults through the Xilinx bridge.
pub fn ac97_init<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) {
    XilinxAc97::cold_reset(chip);
    for &(reg, value) in AC97_DEFAULTS {
        XilinxAc97::write(chip, reg, value);
    }
}

pub fn init<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, variant: Variant) {
    let spi = spi_for(variant);

    let selects = if spi.has_receiver {
        ac97_init(chip);
        AUREON_WM_CS | AUREON_CS8415_CS
    } else {
        AUREON_WM_CS
    };
    chip.set_gpio_mask(!(AUREON_WM_RESET | selects));

    // WM8770 リセットパルス (CS は非選択)
    let mut tmp = chip.gpio_data();
    tmp &= !AUREON_WM_RESET;
    chip.set_gpio_data(tmp);
    chip.delay_us(1);
    tmp |= selects;
    chip.set_gpio_data(tmp);
    chip.delay_us(1);
    tmp |= AUREON_WM_RESET;
    chip.set_gpio_data(tmp);
    chip.delay_us(1);

    let table = if spi.has_receiver {
        WM_INITS
    } else {
        WM_INITS_PHASE28
    };
    for &(reg, value) in table {
        spi.wm_put(chip, reg, value);
    }

    if spi.has_receiver {
        for &word in CS8415_INITS {
            spi.cs8415_put(chip, word);
        }
    }

    debug!("[ENVY24HT] {} codec init done", variant);
}

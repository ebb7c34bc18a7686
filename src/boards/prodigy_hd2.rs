// ============================================================================
// src/boards/prodigy_hd2.rs - AudioTrak Prodigy HD2
// ============================================================================
//!
//! 単一の AK4396 DAC (3 線式、書き込みのみ)。

use log::debug;

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;
use crate::spi::Ak4396Bus;

pub const AK4396_CTRL1: u8 = 0x00;
pub const AK4396_CTRL2: u8 = 0x01;
pub const AK4396_CTRL3: u8 = 0x02;
pub const AK4396_LCH_ATT: u8 = 0x03;
pub const AK4396_RCH_ATT: u8 = 0x04;

static AK4396_INITS: &[(u8, u8)] = &[
    (AK4396_CTRL1, 0x87), // I2S, 24bit
    (AK4396_CTRL2, 0x02),
    (AK4396_CTRL3, 0x00),
    (AK4396_LCH_ATT, 0xFF),
    (AK4396_RCH_ATT, 0xFF),
];

const SYSTEM_CONFIG: u8 = 0x28;
const I2S_FEATURES: u8 = CCS_I2S_96KHZ | CCS_I2S_24BIT | CCS_I2S_192KHZ;
const SPDIF_CONFIG: u8 =
    CCS_SPDIF_INTEGRATED | CCS_SPDIF_INTERNAL_OUT | CCS_SPDIF_IN_PRESENT | CCS_SPDIF_EXTERNAL_OUT;

pub fn init<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) {
    let ccs = chip.ccs();
    ccs.write8(CCS_SYSTEM_CONFIG, SYSTEM_CONFIG);
    ccs.write8(CCS_ACLINK_CONFIG, CCS_ACLINK_I2S);
    ccs.write8(CCS_I2S_FEATURES, I2S_FEATURES);
    ccs.write8(CCS_SPDIF_CONFIG, SPDIF_CONFIG);

    // codec リセット
    Ak4396Bus::write(chip, AK4396_CTRL1, 0x86);
    chip.delay_us(100);
    Ak4396Bus::write(chip, AK4396_CTRL1, 0x87);

    for &(reg, value) in AK4396_INITS {
        Ak4396Bus::write(chip, reg, value);
    }
    debug!("[ENVY24HT] Prodigy HD2 DAC ready");
}

// ============================================================================
// src/boards/julia.rs - ESI Juli@
// ============================================================================
//!
//! AK4358 DAC と AK4114 S/PDIF トランシーバはどちらも 2 線式バス上にある。

use log::debug;

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

/// AK4358 の初期値 (1 書き込みごとに 5µs)
static AK4358_INITS: &[(u8, u8)] = &[
    (0x01, 0x02), // reset
    (0x00, 0x87), // I2S, auto clock
    (0x01, 0x01), // release reset
    (0x02, 0x4F),
    (0x03, 0x01),
    (0x04, 0xFF), // front L
    (0x05, 0xFF), // front R
    (0x06, 0x00),
    (0x07, 0x00),
    (0x08, 0x00),
    (0x09, 0x00),
    (0x0A, 0x00),
    (0x0B, 0xFF),
    (0x0C, 0xFF),
    (0x0D, 0xFF),
    (0x0E, 0x00),
    (0x0F, 0x00),
];

/// AK4114 の初期値 (1 書き込みごとに 100µs)
static AK4114_INITS: &[(u8, u8)] = &[
    (0x00, 0x00), // power down
    (0x00, 0x0F), // power up
    (0x01, 0x70),
    (0x02, 0x80),
    (0x03, 0x49),
    (0x04, 0x00),
    (0x05, 0x00),
    (0x0D, 0x41),
    (0x0E, 0x02),
    (0x0F, 0x2C),
    (0x10, 0x00),
    (0x11, 0x00),
];

const SYSTEM_CONFIG: u8 = 0x78;
const I2S_FEATURES: u8 = CCS_I2S_96KHZ | CCS_I2S_24BIT | CCS_I2S_192KHZ;
const SPDIF_CONFIG: u8 =
    CCS_SPDIF_INTEGRATED | CCS_SPDIF_INTERNAL_OUT | CCS_SPDIF_IN_PRESENT | CCS_SPDIF_EXTERNAL_OUT;

pub fn init<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) {
    let ccs = chip.ccs();
    ccs.write8(CCS_SYSTEM_CONFIG, SYSTEM_CONFIG);
    ccs.write8(CCS_ACLINK_CONFIG, CCS_ACLINK_I2S);
    ccs.write8(CCS_I2S_FEATURES, I2S_FEATURES);
    ccs.write8(CCS_SPDIF_CONFIG, SPDIF_CONFIG);

    for &(reg, value) in AK4358_INITS {
        chip.i2c_write(AK4358_I2C_ADDR, reg, value);
        chip.delay_us(5);
    }
    for &(reg, value) in AK4114_INITS {
        chip.i2c_write(AK4114_I2C_ADDR, reg, value);
        chip.delay_us(100);
    }

    chip.mt().write8(MT_SAMPLERATE, MT_CLOCK_128X);
    debug!("[ENVY24HT] Juli@ codecs ready");
}

// ============================================================================
// src/spi.rs - Bit-Banged Serial Buses
// ============================================================================
//!
//! GPIO をトグルして実装するシリアルプロトコル群。
//!
//! | バス | 用途 |
//! |------|------|
//! | Aureon SPI | WM8770 codec 書き込み、CS8415 レシーバの読み書き |
//! | Xilinx AC'97 ブリッジ | Aureon の STAC9744 への AC'97 レジスタ書き込み |
//! | AK4396 3 線式 | Prodigy HD2 の DAC |
//! | AP192 SPI | Audiophile 192 の AK4358 DAC / AK4114 レシーバ |
//!
//! どのプロトコルも「クロック Low の間にデータを変え、立ち上がりでラッチ」。

#![allow(dead_code)]

#[cfg(feature = "verbose_logging")]
use log::trace;

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

// ============================================================================
// Aureon SPI (WM8770 / CS8415)
// ============================================================================

/// CS8415 のチップアドレス (書き込み)
const CS8415_ADDR_WRITE: u8 = 0x20;
/// CS8415 のチップアドレス (読み出し)
const CS8415_ADDR_READ: u8 = 0x21;
/// CS8415 への書き込みワードに付くチップアドレス
pub const CS8415_WRITE_PREFIX: u32 = 0x20_0000;
/// WM8770 の音量レジスタ更新ビット
pub const WM_VOLUME_UPDATE: u16 = 0x100;

/// SPI bus shared by the WM8770 codec and the CS8415 receiver on Aureon boards.
#[derive(Debug, Clone, Copy)]
pub struct AureonSpi {
    /// CS8415 が実装されている (Phase 28 にはない)
    pub has_receiver: bool,
}

impl AureonSpi {
    pub const fn new(has_receiver: bool) -> Self {
        Self { has_receiver }
    }

    fn bus_lines(&self) -> u32 {
        let lines = AUREON_WM_RW | AUREON_SPI_MOSI | AUREON_SPI_CLK | AUREON_WM_CS;
        if self.has_receiver {
            lines | AUREON_CS8415_CS
        } else {
            lines
        }
    }

    /// Shift `bits` bits of `data` MSB-first to the device selected by `cs`.
    pub fn write<R: RegisterSpace, P: Platform>(
        &self,
        chip: &Chip<R, P>,
        cs: u32,
        data: u32,
        bits: u32,
    ) {
        let mut tmp = chip.gpio_data();

        chip.set_gpio_mask(!self.bus_lines());
        chip.set_gpio_mask(0);

        tmp |= AUREON_WM_RW;
        tmp &= !cs;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);

        tmp = shift_out(chip, tmp, data, bits);

        tmp &= !AUREON_SPI_CLK;
        tmp |= cs;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
        tmp |= AUREON_SPI_CLK;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
    }

    /// WM8770 register write (`reg << 9 | val`, 16 bits)
    pub fn wm_put<R: RegisterSpace, P: Platform>(&self, chip: &Chip<R, P>, reg: u16, val: u16) {
        #[cfg(feature = "verbose_logging")]
        trace!("[ENVY24HT] WM8770 reg {:#04x} <- {:#05x}", reg, val);
        self.write(chip, AUREON_WM_CS, ((reg as u32) << 9) | (val as u32 & 0x1FF), 16);
    }

    /// CS8415 register write (24 bits including the chip address byte)
    pub fn cs8415_put<R: RegisterSpace, P: Platform>(&self, chip: &Chip<R, P>, word: u16) {
        self.write(chip, AUREON_CS8415_CS, word as u32 | CS8415_WRITE_PREFIX, 24);
    }

    /// Read one CS8415 register.
    ///
    /// The register index is written first, then chip-select is cycled to
    /// restart the transfer as a read and eight bits are clocked in from
    /// `SPI_MISO`.
    pub fn cs8415_read<R: RegisterSpace, P: Platform>(&self, chip: &Chip<R, P>, reg: u8) -> u8 {
        let cs = AUREON_CS8415_CS;
        let mut tmp = chip.gpio_data();

        chip.set_gpio_mask(
            !(AUREON_WM_RW
                | AUREON_SPI_MOSI
                | AUREON_SPI_CLK
                | AUREON_WM_CS
                | AUREON_CS8415_CS
                | AUREON_SPI_MISO),
        );
        tmp |= AUREON_WM_RW;
        tmp &= !cs;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);

        tmp = shift_out(chip, tmp, CS8415_ADDR_WRITE as u32, 8);
        tmp = shift_out(chip, tmp, reg as u32, 8);

        // CS を一度上げてリードとして再開
        tmp &= !AUREON_SPI_CLK;
        tmp |= cs;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
        tmp &= !cs;
        tmp |= AUREON_SPI_CLK;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);

        tmp = shift_out(chip, tmp, CS8415_ADDR_READ as u32, 8);

        tmp &= !AUREON_SPI_CLK;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
        tmp |= AUREON_SPI_CLK;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);

        let mut value = 0u8;
        for bit in (0..8).rev() {
            tmp &= !AUREON_SPI_CLK;
            chip.set_gpio_data(tmp);
            chip.delay_us(1);

            let gpio = chip.gpio_data();
            chip.delay_us(1);
            value |= (((gpio >> AUREON_SPI_MISO_BIT) & 1) as u8) << bit;
            chip.delay_us(1);

            tmp |= AUREON_SPI_CLK;
            chip.set_gpio_data(tmp);
            chip.delay_us(1);
        }

        tmp &= !AUREON_SPI_CLK;
        tmp |= cs;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
        tmp |= AUREON_SPI_CLK;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);

        value
    }
}

/// Clock `bits` bits of `data` out on the Aureon MOSI line; returns the GPIO image.
fn shift_out<R: RegisterSpace, P: Platform>(
    chip: &Chip<R, P>,
    mut tmp: u32,
    data: u32,
    bits: u32,
) -> u32 {
    for bit in (0..bits).rev() {
        tmp &= !AUREON_SPI_CLK;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
        if data & (1 << bit) != 0 {
            tmp |= AUREON_SPI_MOSI;
        } else {
            tmp &= !AUREON_SPI_MOSI;
        }
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
        tmp |= AUREON_SPI_CLK;
        chip.set_gpio_data(tmp);
        chip.delay_us(1);
    }
    tmp
}

// ============================================================================
// Xilinx AC'97 bridge (Aureon)
// ============================================================================

/// GPIO 経由で Xilinx CPLD に AC'97 レジスタ書き込みを渡す
pub struct XilinxAc97;

impl XilinxAc97 {
    /// ストローブ 1 フェーズの長さ (µs)
    const STROBE_US: u32 = 10;

    /// Cold reset of the AC'97 codec behind the bridge.
    pub fn cold_reset<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) {
        let mut tmp = (chip.gpio_data() | AUREON_AC97_RESET) & !AUREON_AC97_DATA_MASK;
        chip.set_gpio_data(tmp);
        chip.delay_us(3);
        tmp &= !AUREON_AC97_RESET;
        chip.set_gpio_data(tmp);
        chip.delay_us(3);
        tmp |= AUREON_AC97_RESET;
        chip.set_gpio_data(tmp);
        chip.delay_us(3);
    }

    pub fn write<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, reg: u8, val: u16) {
        let mut tmp = (chip.gpio_data() & !0xFF) | (reg as u32 & 0x7F);
        chip.set_gpio_data(tmp);
        chip.delay_us(Self::STROBE_US);
        tmp = Self::strobe(chip, tmp, AUREON_AC97_ADDR);

        tmp = (tmp & !AUREON_AC97_DATA_MASK) | (val as u32 & AUREON_AC97_DATA_MASK);
        chip.set_gpio_data(tmp);
        chip.delay_us(Self::STROBE_US);
        tmp = Self::strobe(chip, tmp, AUREON_AC97_DATA_LOW);

        tmp = (tmp & !AUREON_AC97_DATA_MASK) | ((val as u32 >> 8) & AUREON_AC97_DATA_MASK);
        chip.set_gpio_data(tmp);
        chip.delay_us(Self::STROBE_US);
        tmp = Self::strobe(chip, tmp, AUREON_AC97_DATA_HIGH);

        Self::strobe(chip, tmp, AUREON_AC97_COMMIT);
    }

    fn strobe<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, mut tmp: u32, line: u32) -> u32 {
        tmp |= line;
        chip.set_gpio_data(tmp);
        chip.delay_us(Self::STROBE_US);
        tmp &= !line;
        chip.set_gpio_data(tmp);
        chip.delay_us(Self::STROBE_US);
        tmp
    }
}

// ============================================================================
// 3-wire DAC interfaces
// ============================================================================

/// 3 線式の送信ワード: `addr[1:0] | W | reg[4:0] | data[7:0]`
#[inline]
pub const fn three_wire_word(chip_addr: u8, reg: u8, data: u8) -> u16 {
    ((chip_addr as u16 & 0x03) << 14) | (1 << 13) | ((reg as u16 & 0x1F) << 8) | data as u16
}

/// AK4396 on the Prodigy HD2.
///
/// The DAC shares its GPIO lines, so direction and mask are saved before
/// each transfer and restored afterwards.
pub struct Ak4396Bus;

impl Ak4396Bus {
    pub const CHIP_ADDR: u8 = 0x00;
    const LINES: u32 = HD2_AK4396_CSN | HD2_AK4396_CCLK | HD2_AK4396_CDTI;

    pub fn write<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, reg: u8, data: u8) {
        let saved = chip.save_gpio();
        chip.set_gpio_dir(Self::LINES);
        chip.set_gpio_mask(!Self::LINES);

        chip.set_gpio_bits(HD2_AK4396_CSN, false);
        let mut word = three_wire_word(Self::CHIP_ADDR, reg, data);
        for _ in 0..16 {
            chip.set_gpio_bits(HD2_AK4396_CCLK, false);
            chip.delay_us(1);
            chip.set_gpio_bits(HD2_AK4396_CDTI, word & 0x8000 != 0);
            chip.delay_us(1);
            chip.set_gpio_bits(HD2_AK4396_CCLK, true);
            chip.delay_us(1);
            word <<= 1;
        }
        chip.set_gpio_bits(HD2_AK4396_CSN, true);
        chip.delay_us(1);

        chip.restore_gpio(saved);
    }
}

/// AP192 のシリアルデバイス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ap192Device {
    /// AK4358 DAC
    Dac,
    /// AK4114 S/PDIF receiver
    Receiver,
}

impl Ap192Device {
    const fn select(self) -> u32 {
        match self {
            Ap192Device::Dac => AP192_CS_AK4358,
            Ap192Device::Receiver => AP192_CS_AK4114,
        }
    }
}

/// SPI to the AK4358 and AK4114 on the Audiophile 192.
///
/// Every line change is a GPIO read-modify-write; the bus needs no extra
/// settling delay between phases.
pub struct Ap192Spi;

impl Ap192Spi {
    pub const CHIP_ADDR: u8 = 0x02;
    const SELECTS: u32 = AP192_CS_AK4358 | AP192_CS_AK4114;

    pub fn write<R: RegisterSpace, P: Platform>(
        chip: &Chip<R, P>,
        device: Ap192Device,
        reg: u8,
        data: u8,
    ) {
        chip.write_gpio_pin(AP192_SPI_DOUT, false);
        chip.write_gpio_pin(AP192_SPI_CLK, true);

        let selected = (chip.gpio_data() | Self::SELECTS) & !device.select();
        chip.set_gpio_data(selected);

        let word = three_wire_word(Self::CHIP_ADDR, reg, data);
        Self::send_byte(chip, (word >> 8) as u8);
        Self::send_byte(chip, word as u8);

        let idle = chip.gpio_data() | Self::SELECTS;
        chip.set_gpio_data(idle);
    }

    fn send_byte<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, byte: u8) {
        for bit in (0..8).rev() {
            chip.write_gpio_pin(AP192_SPI_CLK, false);
            chip.write_gpio_pin(AP192_SPI_DOUT, byte & (1 << bit) != 0);
            chip.write_gpio_pin(AP192_SPI_CLK, true);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

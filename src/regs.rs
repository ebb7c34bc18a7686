// ============================================================================
// src/regs.rs - Envy24HT Register Definitions
// ============================================================================
//!
//! VT1724 (Envy24HT) のレジスタオフセットとビット定義。
//!
//! 2 つの独立した MMIO 領域を持つ:
//! - CCS (Controller Control/Status): PCI BAR0
//! - MT (Multi-Track): PCI BAR1
//!
//! ボード固有の GPIO 配線もここにまとめる。

#![allow(dead_code)]

// ============================================================================
// CCS Registers (BAR0)
// ============================================================================

/// Control/Status (8-bit)
pub const CCS_CTRL: u32 = 0x00;
/// Interrupt Mask (8-bit)
pub const CCS_INTR_MASK: u32 = 0x01;
/// Interrupt Status (8-bit)
pub const CCS_INTR_STATUS: u32 = 0x02;
/// System Configuration (8-bit)
pub const CCS_SYSTEM_CONFIG: u32 = 0x04;
/// AC-Link Configuration (8-bit)
pub const CCS_ACLINK_CONFIG: u32 = 0x05;
/// I2S Features (8-bit)
pub const CCS_I2S_FEATURES: u32 = 0x06;
/// S/PDIF Configuration (8-bit)
pub const CCS_SPDIF_CONFIG: u32 = 0x07;
/// I2C Device Address (8-bit)
pub const CCS_I2C_DEV_ADDRESS: u32 = 0x10;
/// I2C Byte Address (8-bit)
pub const CCS_I2C_ADDR: u32 = 0x11;
/// I2C Data (8-bit)
pub const CCS_I2C_DATA: u32 = 0x12;
/// I2C Status (8-bit)
pub const CCS_I2C_STATUS: u32 = 0x13;
/// GPIO Data bits 0-15 (16-bit)
pub const CCS_GPIO_DATA: u32 = 0x14;
/// GPIO Write Mask bits 0-15 (16-bit)
pub const CCS_GPIO_MASK: u32 = 0x16;
/// GPIO Direction (32-bit, bits 0-23 used)
pub const CCS_GPIO_DIR: u32 = 0x18;
/// Power Down (8-bit)
pub const CCS_POWER_DOWN: u32 = 0x1C;
/// GPIO Data bits 16-23 (8-bit)
pub const CCS_GPIO_DATA2: u32 = 0x1E;
/// GPIO Write Mask bits 16-23 (8-bit)
pub const CCS_GPIO_MASK2: u32 = 0x1F;

/// CCS 領域のサイズ
pub const CCS_REGION_SIZE: u32 = 0x20;

// CCS_CTRL bits
pub const CCS_RESET_ALL: u8 = 0x80;

// CCS_INTR_MASK / CCS_INTR_STATUS bits
pub const CCS_INTR_PLAYREC: u8 = 0x10;

// CCS_ACLINK_CONFIG bits
pub const CCS_ACLINK_I2S: u8 = 0x80;

// CCS_I2S_FEATURES bits
pub const CCS_I2S_VOLMUTE: u8 = 0x80;
pub const CCS_I2S_96KHZ: u8 = 0x40;
pub const CCS_I2S_24BIT: u8 = 0x30;
pub const CCS_I2S_192KHZ: u8 = 0x08;

// CCS_SPDIF_CONFIG bits
pub const CCS_SPDIF_INTEGRATED: u8 = 0x80;
pub const CCS_SPDIF_INTERNAL_OUT: u8 = 0x40;
pub const CCS_SPDIF_IN_PRESENT: u8 = 0x02;
pub const CCS_SPDIF_EXTERNAL_OUT: u8 = 0x01;

// CCS_I2C_DEV_ADDRESS bits
pub const CCS_ADDRESS_WRITE: u8 = 0x01;

// CCS_I2C_STATUS bits
pub const CCS_I2C_EPROM: u8 = 0x80;
pub const CCS_I2C_BUSY: u8 = 0x01;

/// ブート EEPROM の I2C デバイスアドレス
pub const EEPROM_DEV_ADDRESS: u8 = 0xA0;

// ============================================================================
// MT Registers (BAR1)
// ============================================================================

/// DMA Interrupt Status (8-bit)
pub const MT_INTR_STATUS: u32 = 0x00;
/// Sampling Rate Select (8-bit)
pub const MT_SAMPLERATE: u32 = 0x01;
/// I2S Data Format (8-bit)
pub const MT_I2S_FORMAT: u32 = 0x02;
/// DMA Interrupt Mask (8-bit)
pub const MT_INTR_MASK: u32 = 0x03;
/// AC'97 Index (8-bit)
pub const MT_AC97_INDEX: u32 = 0x04;
/// AC'97 Command/Status (8-bit)
pub const MT_AC97_CMD_STATUS: u32 = 0x05;
/// AC'97 Data (16-bit)
pub const MT_AC97_DATA: u32 = 0x06;
/// Playback DMA (PDMA0) Base Address (32-bit)
pub const MT_DMAI_PB_ADDRESS: u32 = 0x10;
/// Playback DMA Length, 24-bit split 16+8
pub const MT_DMAI_PB_LENGTH: u32 = 0x14;
/// DMA Start/Stop Control (8-bit)
pub const MT_DMA_CONTROL: u32 = 0x18;
/// Playback Burst Size (8-bit)
pub const MT_DMAI_BURSTSIZE: u32 = 0x19;
/// DMA Underrun Detail (8-bit)
pub const MT_DMA_UNDERRUN: u32 = 0x1A;
/// Playback Interrupt Length, 24-bit split 16+8
pub const MT_DMAI_INTLEN: u32 = 0x1C;
/// Record DMA (RDMA0) Base Address (32-bit)
pub const MT_RDMA0_ADDRESS: u32 = 0x20;
/// Record DMA Length (16-bit)
pub const MT_RDMA0_LENGTH: u32 = 0x24;
/// Record DMA Interrupt Length (16-bit)
pub const MT_RDMA0_INTLEN: u32 = 0x26;
/// S/PDIF Transmit Control (16-bit)
pub const MT_SPDIF_TRANSMIT: u32 = 0x3C;
/// S/PDIF Playback DMA (PDMA4) Base Address (32-bit)
pub const MT_PDMA4_ADDRESS: u32 = 0x40;
/// S/PDIF Playback DMA Length (16-bit)
pub const MT_PDMA4_LENGTH: u32 = 0x44;
/// S/PDIF Playback DMA Interrupt Length (16-bit)
pub const MT_PDMA4_INTLEN: u32 = 0x46;

/// MT 領域のサイズ
pub const MT_REGION_SIZE: u32 = 0x80;

// MT_AC97_CMD_STATUS bits
pub const MT_AC97_RESET: u8 = 0x80;

// MT_I2S_FORMAT bits
pub const MT_CLOCK_128X: u8 = 0x08;

// MT_DMA_CONTROL start bits
pub const MT_PDMA0_START: u8 = 0x01;
pub const MT_RDMA0_START: u8 = 0x02;
pub const MT_RDMA1_START: u8 = 0x04;
pub const MT_PDMA4_START: u8 = 0x10;

// MT_INTR_STATUS bits
pub const MT_DMA_PDMA0: u8 = 0x01;
pub const MT_DMA_RDMA0: u8 = 0x02;
pub const MT_DMA_RDMA1: u8 = 0x04;
pub const MT_DMA_PDMA4: u8 = 0x08;
pub const MT_DMA_FIFO: u8 = 0x20;

// MT_INTR_MASK bits (1 = masked)
pub const MT_PDMA0_MASK: u8 = 0x01;
pub const MT_RDMA0_MASK: u8 = 0x02;
pub const MT_RDMA1_MASK: u8 = 0x04;
pub const MT_PDMA4_MASK: u8 = 0x08;
pub const MT_DMA_FIFO_MASK: u8 = 0x20;

// MT_SPDIF_TRANSMIT fields
pub const MT_SPDIF_RATE_SHIFT: u16 = 12;
pub const MT_SPDIF_RATE_MASK: u16 = 0x7000;

// ============================================================================
// Board GPIO wiring: Terratec Aureon / Phase 28
// ============================================================================

pub const AUREON_CS8415_CS: u32 = 1 << 22;
pub const AUREON_SPI_MISO: u32 = 1 << 21;
pub const AUREON_WM_RESET: u32 = 1 << 20;
pub const AUREON_SPI_CLK: u32 = 1 << 19;
pub const AUREON_SPI_MOSI: u32 = 1 << 18;
pub const AUREON_WM_RW: u32 = 1 << 17;
pub const AUREON_AC97_RESET: u32 = 1 << 16;
pub const AUREON_WM_CS: u32 = 1 << 12;
pub const AUREON_AC97_COMMIT: u32 = 1 << 11;
pub const AUREON_AC97_ADDR: u32 = 1 << 10;
pub const AUREON_AC97_DATA_LOW: u32 = 1 << 9;
pub const AUREON_AC97_DATA_HIGH: u32 = 1 << 8;
pub const AUREON_AC97_DATA_MASK: u32 = 0xFF;

/// CS8415 の応答ビット位置 (SPI_MISO)
pub const AUREON_SPI_MISO_BIT: u32 = 21;

// ============================================================================
// Board GPIO wiring: M-Audio Revolution 5.1 / 7.1
// ============================================================================

pub const REVO_CCLK: u32 = 0x02;
pub const REVO_CDIN: u32 = 0x04;
pub const REVO_CDOUT: u32 = 0x08;
pub const REVO_CS0: u32 = 0x10;
pub const REVO_CS1: u32 = 0x20;
pub const REVO_CS2: u32 = 0x40;
pub const REVO_MUTE: u32 = 1 << 22;

// ============================================================================
// Board GPIO wiring: Terratec Phase 22
// ============================================================================

pub const PHASE22_AK4524_CS: u32 = 1 << 10;
pub const PHASE22_AK4524_CCLK: u32 = 1 << 5;
pub const PHASE22_AK4524_CDTI: u32 = 1 << 4;
pub const PHASE22_AK4524_EXTRA: u32 = 1 << 3;

// ============================================================================
// Board GPIO wiring: M-Audio Audiophile 192
// ============================================================================

/// GPIO ビット位置 (番号)
pub const AP192_SPI_CLK: u32 = 1;
pub const AP192_SPI_DIN: u32 = 2;
pub const AP192_SPI_DOUT: u32 = 3;
pub const AP192_MUTE_PIN: u32 = 22;
pub const AP192_GPIO5_PIN: u32 = 5;
/// AK4358 DAC chip select (active low)
pub const AP192_CS_AK4358: u32 = 1 << 4;
/// AK4114 receiver chip select (active low)
pub const AP192_CS_AK4114: u32 = 1 << 5;

// ============================================================================
// Board GPIO wiring: AudioTrak Prodigy HD2
// ============================================================================

pub const HD2_AK4396_CSN: u32 = 1 << 8;
pub const HD2_AK4396_CCLK: u32 = 1 << 9;
pub const HD2_AK4396_CDTI: u32 = 1 << 10;

// ============================================================================
// Two-wire (I2C) chip addresses
// ============================================================================

/// ESI Juli@ AK4358 DAC
pub const AK4358_I2C_ADDR: u8 = 0x22;
/// ESI Juli@ AK4114 S/PDIF transceiver
pub const AK4114_I2C_ADDR: u8 = 0x20;

/// GPIO として使用可能なビット
pub const GPIO_VALID_MASK: u32 = 0x00FF_FFFF;

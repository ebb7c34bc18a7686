// ============================================================================
// src/types.rs - Card Variants and Hardware Tables
// ============================================================================
//!
//! 対応ボードの一覧と、識別子・GPIO・システム設定の定数テーブル。

#![allow(dead_code)]

use crate::regs::*;

// ============================================================================
// Variant
// ============================================================================

/// Supported board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Terratec Aureon 5.1 Sky
    AureonSky,
    /// Terratec Aureon 7.1 Space / AudioTrak Prodigy 7.1
    AureonSpace,
    /// Terratec Phase 28
    Phase28,
    /// M-Audio Revolution 5.1
    Revo51,
    /// M-Audio Revolution 7.1
    Revo71,
    /// ESI Juli@
    Julia,
    /// Terratec Phase 22 / TerraSoniq TS22
    Phase22,
    /// M-Audio Audiophile 192
    Ap192,
    /// AudioTrak Prodigy HD2
    ProdigyHd2,
    /// Cantatis
    Cantatis,
}

impl Variant {
    pub const ALL: [Variant; 10] = [
        Variant::AureonSky,
        Variant::AureonSpace,
        Variant::Phase28,
        Variant::Revo51,
        Variant::Revo71,
        Variant::Julia,
        Variant::Phase22,
        Variant::Ap192,
        Variant::ProdigyHd2,
        Variant::Cantatis,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Variant::AureonSky => "Terratec Aureon 5.1 Sky",
            Variant::AureonSpace => "Terratec Aureon 7.1 Space",
            Variant::Phase28 => "Terratec Phase 28",
            Variant::Revo51 => "M-Audio Revolution 5.1",
            Variant::Revo71 => "M-Audio Revolution 7.1",
            Variant::Julia => "ESI Juli@",
            Variant::Phase22 => "Terratec Phase 22",
            Variant::Ap192 => "M-Audio Audiophile 192",
            Variant::ProdigyHd2 => "AudioTrak Prodigy HD2",
            Variant::Cantatis => "Cantatis",
        }
    }

    /// 再生チャンネル数
    pub const fn channels(self) -> u32 {
        match self {
            Variant::AureonSky | Variant::Revo51 => 6,
            Variant::AureonSpace | Variant::Phase28 | Variant::Revo71 => 8,
            Variant::Julia
            | Variant::Phase22
            | Variant::Ap192
            | Variant::ProdigyHd2
            | Variant::Cantatis => 2,
        }
    }

    pub const fn has_spdif(self) -> bool {
        true
    }

    /// Aureon 系 (WM8770 + Xilinx/CS8415)
    pub const fn is_aureon(self) -> bool {
        matches!(
            self,
            Variant::AureonSky | Variant::AureonSpace | Variant::Phase28
        )
    }

    pub const fn is_revolution(self) -> bool {
        matches!(self, Variant::Revo51 | Variant::Revo71)
    }

    /// ビルドする制御ディスクリプタ数
    pub const fn control_count(self) -> usize {
        match self {
            Variant::AureonSky | Variant::AureonSpace | Variant::Phase28 => 4,
            Variant::Revo51 | Variant::Revo71 => 8,
            Variant::Phase22 => 4,
            Variant::Julia | Variant::Ap192 | Variant::ProdigyHd2 => 2,
            Variant::Cantatis => 0,
        }
    }

    /// 初期 GPIO 方向 (1 = 出力)
    pub const fn gpio_direction(self) -> u32 {
        GPIO_DIRECTIONS[self as usize]
    }

    /// 書き込み禁止にする GPIO ビット
    pub const fn gpio_write_mask(self) -> u32 {
        match self {
            Variant::Revo71 => 0x00BF_FF85,
            Variant::Revo51 => 0x00BF_FF05,
            _ => 0,
        }
    }

    /// Initial GPIO data. `None` in the high byte leaves bits 16-23 untouched.
    pub const fn gpio_initial(self) -> GpioInit {
        match self {
            Variant::Revo51 | Variant::Revo71 => GpioInit {
                low: 0x0072,
                high: Some(0x00),
            },
            Variant::Julia => GpioInit {
                low: 0x3819,
                high: None,
            },
            Variant::Ap192 => GpioInit {
                low: 0xFFFF,
                high: None,
            },
            Variant::Phase22 => GpioInit {
                low: 0x0000,
                high: None,
            },
            _ => GpioInit {
                low: 0x0000,
                high: Some(0x00),
            },
        }
    }

    /// 識別直後に書くシステム設定
    pub const fn system_profile(self) -> SystemProfile {
        const I2S_FULL: u8 = CCS_I2S_VOLMUTE | CCS_I2S_96KHZ | CCS_I2S_24BIT | CCS_I2S_192KHZ;
        const SPDIF_FULL: u8 = CCS_SPDIF_INTEGRATED
            | CCS_SPDIF_INTERNAL_OUT
            | CCS_SPDIF_IN_PRESENT
            | CCS_SPDIF_EXTERNAL_OUT;
        const SPDIF_REVO: u8 =
            CCS_SPDIF_INTEGRATED | CCS_SPDIF_INTERNAL_OUT | CCS_SPDIF_EXTERNAL_OUT;

        match self {
            Variant::Phase22 => SystemProfile {
                system_config: Some(0x28),
                aclink: 0x80,
                i2s_features: Some(0x70),
                spdif: 0xC3,
            },
            Variant::Phase28 => SystemProfile::standard(Some(0x2B), Some(I2S_FULL), SPDIF_FULL),
            Variant::AureonSpace => {
                SystemProfile::standard(Some(0x0B), Some(I2S_FULL), SPDIF_FULL)
            }
            Variant::AureonSky => SystemProfile::standard(Some(0x0A), Some(I2S_FULL), SPDIF_FULL),
            Variant::Revo71 => SystemProfile::standard(Some(0x43), Some(I2S_FULL), SPDIF_REVO),
            Variant::Revo51 => SystemProfile::standard(Some(0x42), Some(I2S_FULL), SPDIF_REVO),
            Variant::Julia => SystemProfile::standard(None, None, SPDIF_FULL),
            Variant::Ap192 | Variant::ProdigyHd2 | Variant::Cantatis => {
                SystemProfile::standard(None, Some(I2S_FULL), SPDIF_FULL)
            }
        }
    }
}

impl core::fmt::Display for Variant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tables
// ============================================================================

/// `Variant` の並び順に対応する GPIO 方向
static GPIO_DIRECTIONS: [u32; 10] = [
    0x005F_FFFF, // Aureon Sky
    0x005F_FFFF, // Aureon Space
    0x001E_FFF7, // Phase 28
    0x0040_00FA, // Revolution 5.1
    0x0040_00FA, // Revolution 7.1
    0x007F_FF9F, // Juli@
    0x00FF_FFFF, // Phase 22
    0x00FF_FFFF, // Audiophile 192
    0x00DF_FFFF, // Prodigy HD2
    0x0000_0000, // Cantatis
];

/// Subsystem ids read from the boot EEPROM.
pub mod subvendor {
    pub const AUREON_SKY: u32 = 0x1009_0027;
    pub const AUREON_SPACE: u32 = 0x3B15_4511;
    pub const PRODIGY71: u32 = 0x3349_5345;
    pub const PHASE28: u32 = 0x3B15_4911;
    pub const REVOLUTION51: u32 = 0x1214_3136;
    pub const REVOLUTION71: u32 = 0x1214_3036;
    pub const JULIA: u32 = 0x3130_5345;
    pub const PHASE22: u32 = 0x3B15_5B11;
    pub const FAME22: u32 = 0x3B15_5E11;
    pub const AUDIOPHILE192: u32 = 0x1214_3236;
    pub const PRODIGY_HD2: u32 = 0x3713_7625;
    pub const CANTATIS: u32 = 0x2619_3416;
}

/// 識別子テーブル
static ID_TABLE: &[(u32, Variant)] = &[
    (subvendor::AUREON_SKY, Variant::AureonSky),
    (subvendor::PRODIGY71, Variant::AureonSpace),
    (subvendor::AUREON_SPACE, Variant::AureonSpace),
    (subvendor::PHASE28, Variant::Phase28),
    (subvendor::REVOLUTION51, Variant::Revo51),
    (subvendor::REVOLUTION71, Variant::Revo71),
    (subvendor::JULIA, Variant::Julia),
    (subvendor::PHASE22, Variant::Phase22),
    (subvendor::FAME22, Variant::Phase22),
    (subvendor::AUDIOPHILE192, Variant::Ap192),
    (subvendor::PRODIGY_HD2, Variant::ProdigyHd2),
    (subvendor::CANTATIS, Variant::Cantatis),
];

/// Look up a board by its raw subsystem id.
pub fn lookup_variant(subvendor: u32) -> Option<Variant> {
    ID_TABLE
        .iter()
        .find(|(id, _)| *id == subvendor)
        .map(|(_, variant)| *variant)
}

/// Representative subsystem id of a board (first table entry).
pub fn subvendor_of(variant: Variant) -> u32 {
    ID_TABLE
        .iter()
        .find(|(_, v)| *v == variant)
        .map(|(id, _)| *id)
        .unwrap_or(0)
}

// ============================================================================
// Profiles
// ============================================================================

/// 識別後に書き込む CCS 設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemProfile {
    pub system_config: Option<u8>,
    pub aclink: u8,
    pub i2s_features: Option<u8>,
    pub spdif: u8,
}

impl SystemProfile {
    const fn standard(system_config: Option<u8>, i2s_features: Option<u8>, spdif: u8) -> Self {
        Self {
            system_config,
            aclink: CCS_ACLINK_I2S,
            i2s_features,
            spdif,
        }
    }
}

/// 初期 GPIO データ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioInit {
    pub low: u16,
    pub high: Option<u8>,
}

/// Identified card properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSpecific {
    pub variant: Variant,
    pub subvendor: u32,
    pub channels: u32,
    pub has_spdif: bool,
}

impl CardSpecific {
    pub const fn new(variant: Variant, subvendor: u32) -> Self {
        Self {
            variant,
            subvendor,
            channels: variant.channels(),
            has_spdif: variant.has_spdif(),
        }
    }
}

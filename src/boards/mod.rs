// ============================================================================
// src/boards/mod.rs - Per-Variant Codec Bring-Up
// ============================================================================
//!
//! ボードごとの codec 初期化。
//!
//! | ボード | codec | バス |
//! |--------|-------|------|
//! | Aureon Sky / Space / Phase 28 | WM8770 (+CS8415, AC'97) | Aureon SPI |
//! | Revolution 5.1 | AK4358 + AK5365 | AKM シリアル |
//! | Revolution 7.1 | AK4381 + AK4355 | AKM シリアル |
//! | Juli@ | AK4358 + AK4114 | 2 線式 |
//! | Phase 22 | AK4524 | AKM シリアル |
//! | Audiophile 192 | AK4358 + AK4114 | AP192 SPI |
//! | Prodigy HD2 | AK4396 | 3 線式 |
//! | Cantatis | なし | - |

pub mod ap192;
pub mod aureon;
pub mod julia;
pub mod phase22;
pub mod prodigy_hd2;
pub mod revolution;

use log::debug;

use crate::akm::CodecSet;
use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::types::Variant;

/// Run the codec bring-up for `variant`, registering any AKM codecs in `codecs`.
pub fn init_codecs<R: RegisterSpace, P: Platform>(
    variant: Variant,
    chip: &Chip<R, P>,
    codecs: &mut CodecSet,
) {
    match variant {
        Variant::AureonSky | Variant::AureonSpace | Variant::Phase28 => {
            aureon::init(chip, variant)
        }
        Variant::Revo51 => revolution::init_revo51(chip, codecs),
        Variant::Revo71 => revolution::init_revo71(chip, codecs),
        Variant::Julia => julia::init(chip),
        Variant::Phase22 => phase22::init(chip, codecs),
        Variant::Ap192 => ap192::init(chip),
        Variant::ProdigyHd2 => prodigy_hd2::init(chip),
        Variant::Cantatis => debug!("[ENVY24HT] {}: no codec to initialize", variant),
    }
}

// ============================================================================
// src/card.rs - Card Bring-Up
// ============================================================================
//!
//! # カード初期化
//!
//! チップのリセットから割り込み許可までを 1 本のシーケンスで行う。
//!
//! ```text
//! Reset → Identify → ConfigureSystemRegisters → ConfigureGpio
//!       → InitializeCodecs → BuildControlDescriptors
//!       → EnableInterruptSource → Ready
//! ```
//!
//! 失敗するのは Identify だけ。それ以外のステップはバスタイムアウトが
//! 起きても記録して続行する。

#![allow(dead_code)]

use alloc::sync::Arc;
use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::akm::CodecSet;
use crate::boards;
use crate::chip::Chip;
use crate::error::{Envy24Error, Envy24Result};
use crate::mmio::RegisterSpace;
use crate::parms::{build_controls, ControlDescriptor};
use crate::platform::Platform;
use crate::regs::*;
use crate::spi::AureonSpi;
use crate::types::{lookup_variant, CardSpecific, Variant};

// ============================================================================
// Bring-up state
// ============================================================================

/// 初期化シーケンスの進行状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BringUpState {
    Reset,
    Identify,
    ConfigureSystemRegisters,
    ConfigureGpio,
    InitializeCodecs,
    BuildControlDescriptors,
    EnableInterruptSource,
    Ready,
}

// ============================================================================
// Card context
// ============================================================================

/// Identified and initialized card.
pub struct CardContext<R, P> {
    chip: Arc<Chip<R, P>>,
    specific: CardSpecific,
    /// 再生バッファのバイト数
    pub playback_bytes: u32,
    /// 録音 / S/PDIF バッファのバイト数
    pub capture_bytes: u32,
    pub(crate) codecs: CodecSet,
    pub(crate) controls: Vec<ControlDescriptor>,
    state: BringUpState,
}

impl<R: RegisterSpace, P: Platform> CardContext<R, P> {
    /// Reset, identify and configure the card behind `chip`.
    pub fn bring_up(chip: Arc<Chip<R, P>>) -> Envy24Result<Self> {
        info!("[ENVY24HT] Initializing card");

        reset(&chip);

        let (variant, subvendor) = identify(&chip)?;
        let specific = CardSpecific::new(variant, subvendor);
        info!(
            "[ENVY24HT] Found {} (subvendor {:#010x}, {} channels)",
            variant, subvendor, specific.channels
        );

        let playback_bytes = chip.config().playback_bytes(specific.channels);
        let capture_bytes = chip.config().capture_bytes();
        let mut card = Self {
            playback_bytes,
            capture_bytes,
            chip,
            specific,
            codecs: CodecSet::new(),
            controls: Vec::new(),
            state: BringUpState::Identify,
        };
        card.configure();
        Ok(card)
    }

    /// Re-run the whole bring-up after a power transition.
    pub fn resume(&mut self) -> Envy24Result<()> {
        info!("[ENVY24HT] Resuming {}", self.specific.variant);
        let fresh = Self::bring_up(self.chip.clone())?;
        if fresh.specific.variant != self.specific.variant {
            warn!(
                "[ENVY24HT] Card identity changed across resume: {} -> {}",
                self.specific.variant, fresh.specific.variant
            );
        }
        *self = fresh;
        Ok(())
    }

    fn configure(&mut self) {
        let chip = self.chip.clone();
        let variant = self.specific.variant;

        self.advance(BringUpState::ConfigureSystemRegisters);
        let profile = variant.system_profile();
        let ccs = chip.ccs();
        if let Some(system) = profile.system_config {
            ccs.write8(CCS_SYSTEM_CONFIG, system);
        }
        ccs.write8(CCS_ACLINK_CONFIG, profile.aclink);
        if let Some(i2s) = profile.i2s_features {
            ccs.write8(CCS_I2S_FEATURES, i2s);
        }
        ccs.write8(CCS_SPDIF_CONFIG, profile.spdif);
        chip.mt().write8(MT_INTR_MASK, 0xFF);

        self.advance(BringUpState::ConfigureGpio);
        chip.set_gpio_mask(variant.gpio_write_mask());
        chip.set_gpio_dir(variant.gpio_direction());
        let gpio = variant.gpio_initial();
        ccs.write16(CCS_GPIO_DATA, gpio.low);
        if let Some(high) = gpio.high {
            ccs.write8(CCS_GPIO_DATA2, high);
        }
        let _ = ccs.read16(CCS_GPIO_DATA);
        chip.mt().write8(MT_I2S_FORMAT, 0);

        self.advance(BringUpState::InitializeCodecs);
        self.codecs.clear();
        boards::init_codecs(variant, &chip, &mut self.codecs);

        self.advance(BringUpState::BuildControlDescriptors);
        self.controls = build_controls(variant, &self.codecs);

        self.advance(BringUpState::EnableInterruptSource);
        ccs.clear_bits8(CCS_INTR_MASK, CCS_INTR_PLAYREC);

        self.advance(BringUpState::Ready);
        if chip.i2c_timeouts() > 0 {
            warn!(
                "[ENVY24HT] Card ready with {} two-wire bus timeouts",
                chip.i2c_timeouts()
            );
        } else {
            info!("[ENVY24HT] Card init done");
        }
    }

    fn advance(&mut self, next: BringUpState) {
        debug!("[ENVY24HT] {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn chip(&self) -> &Arc<Chip<R, P>> {
        &self.chip
    }

    #[inline]
    pub fn specific(&self) -> &CardSpecific {
        &self.specific
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.specific.variant
    }

    #[inline]
    pub fn state(&self) -> BringUpState {
        self.state
    }

    pub fn controls(&self) -> &[ControlDescriptor] {
        &self.controls
    }

    pub fn codecs(&self) -> &CodecSet {
        &self.codecs
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Read one register of the CS8415 S/PDIF receiver (Aureon Sky / Space only).
    pub fn spdif_receiver_register(&self, reg: u8) -> Option<u8> {
        match self.specific.variant {
            Variant::AureonSky | Variant::AureonSpace => {
                Some(AureonSpi::new(true).cs8415_read(&self.chip, reg))
            }
            _ => None,
        }
    }

    /// Log every CCS and MT register at debug level.
    pub fn dump_registers(&self) {
        dump_region("CCS", self.chip.ccs(), CCS_REGION_SIZE);
        dump_region("MT", self.chip.mt(), MT_REGION_SIZE);
    }
}

fn dump_region<R: RegisterSpace>(name: &str, region: &R, size: u32) {
    for row in (0..size).step_by(16) {
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = region.read8(row + i as u32);
        }
        debug!("[ENVY24HT] {} {:02x}: {:02x?}", name, row, bytes);
    }
}

// ============================================================================
// Steps
// ============================================================================

fn reset<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) {
    // AC'97 リンクのリセットパルス
    chip.mt().write8(MT_AC97_CMD_STATUS, MT_AC97_RESET);
    chip.delay_us(5);
    chip.mt().write8(MT_AC97_CMD_STATUS, 0);

    chip.ccs().write8(CCS_POWER_DOWN, 0);

    chip.ccs().write8(CCS_CTRL, CCS_RESET_ALL);
    chip.delay_us(100);
    chip.ccs().clear_bits8(CCS_CTRL, CCS_RESET_ALL);
    chip.delay_us(500);
}

/// Read the subsystem id from the boot EEPROM and map it to a board.
fn identify<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>) -> Envy24Result<(Variant, u32)> {
    if chip.ccs().read8(CCS_I2C_STATUS) & CCS_I2C_EPROM == 0 {
        warn!("[ENVY24HT] No boot EEPROM, cannot identify card");
        return Err(Envy24Error::NoEeprom);
    }

    let spins = chip.config().eeprom_read_spins;
    let read_id = || {
        let mut id = [0u8; 4];
        for (addr, byte) in id.iter_mut().enumerate() {
            *byte = chip.i2c_read_with_delay(addr as u8, spins);
        }
        u32::from_le_bytes(id)
    };

    let timeouts = chip.i2c_timeouts();
    // 最初の読み出しは安定しないので捨てる
    let _ = read_id();
    let subvendor = read_id();
    if chip.i2c_timeouts() != timeouts {
        warn!(
            "[ENVY24HT] Bus timeout while reading id, {:#010x} may be stale",
            subvendor
        );
    }

    match lookup_variant(subvendor) {
        Some(variant) => Ok((variant, subvendor)),
        None => {
            warn!(
                "[ENVY24HT] Envy24HT card with subvendor id {:#010x} is not supported",
                subvendor
            );
            Err(Envy24Error::UnsupportedHardware { subvendor })
        }
    }
}

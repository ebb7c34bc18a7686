// ============================================================================
// src/controls.rs - Control Dispatch
// ============================================================================
//!
//! ホストからの値変更 `(control_id, old, new)` をレジスタ書き込みに変換する。
//!
//! ## 音量
//! - 2 線式: `new | 0x80` をそのまま書く
//! - それ以外: codec ファミリーの癖 (最小値以下は 0、書き込み許可ビット) を
//!   反映してから、ボードごとの書き込み経路へ
//!
//! | ボード | 経路 |
//! |--------|------|
//! | Audiophile 192 | DAC 減衰レジスタ |
//! | Aureon / Phase 28 | WM8770 (`val | 0x100`) |
//! | Prodigy HD2 | AK4396 3 線式 |
//! | その他 | AKM シリアル (レジスタイメージと同じ値なら書かない) |
//!
//! ## ミュート
//! ディスクリプタの別ミュートレジスタに on/off 値を書く。
//!
//! ゲインと入力ミュートは受け付けるだけで何もしない。
//! 未知の ID も同様 (エラーにはしない)。

#![allow(dead_code)]

use log::debug;

use crate::akm::{ATTENUATION_ENABLE, CodecCaps};
use crate::boards::{ap192, aureon};
use crate::card::CardContext;
use crate::error::{Envy24Error, Envy24Result};
use crate::mmio::RegisterSpace;
use crate::parms::{channel, ControlDescriptor, Usage};
use crate::platform::Platform;
use crate::spi::{Ak4396Bus, WM_VOLUME_UPDATE};
use crate::types::Variant;

/// 2 線式の書き込み許可ビット
const TWO_WIRE_ENABLE: u8 = 0x80;

pub const NAME_ALL: &str = "All";

/// Which host control changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Volume,
    Mute,
    Gain,
    InputMute,
}

/// Host side that accepts published controls.
///
/// Each method returns `false` when the host refuses the control.
pub trait ControlSurface {
    /// 音量 (レベル) 制御
    fn add_level(&mut self, control: &ControlDescriptor) -> bool;

    /// 初期値オフのミュート制御
    fn add_mute(
        &mut self,
        control_id: u32,
        channel_id: u32,
        name: &'static str,
        usage: Usage,
    ) -> bool;
}

impl<R: RegisterSpace, P: Platform> CardContext<R, P> {
    /// Hand every descriptor, and its mute companion, to `surface`.
    pub fn publish_controls<S: ControlSurface>(&self, surface: &mut S) -> Envy24Result<()> {
        for control in &self.controls {
            if !surface.add_level(control) {
                return Err(Envy24Error::ControlRejected {
                    control_id: control.control_id,
                });
            }
            if control.has_mute()
                && !surface.add_mute(control.control_id, channel::ALL, NAME_ALL, Usage::Output)
            {
                return Err(Envy24Error::ControlRejected {
                    control_id: control.control_id,
                });
            }
        }
        debug!("[ENVY24HT] Published {} controls", self.controls.len());
        Ok(())
    }

    /// Apply a host value change to the hardware.
    pub fn apply_value(&mut self, kind: ControlKind, control_id: u32, old: i32, new: i32) {
        if old == new {
            return;
        }

        match kind {
            ControlKind::Volume | ControlKind::Mute => {}
            ControlKind::Gain | ControlKind::InputMute => {
                debug!(
                    "[ENVY24HT] {:?} {} -> {} on control {} ignored",
                    kind, old, new, control_id
                );
                return;
            }
        }

        let Some(control) = self
            .controls
            .iter()
            .find(|c| c.control_id == control_id)
            .cloned()
        else {
            return;
        };

        if kind == ControlKind::Volume {
            self.apply_volume(&control, new as u8);
        } else {
            self.apply_mute(&control, new > 0);
        }
    }

    fn apply_volume(&mut self, control: &ControlDescriptor, level: u8) {
        let chip = self.chip().clone();

        if let Some(address) = control.two_wire {
            chip.i2c_write(address, control.reg, level | TWO_WIRE_ENABLE);
            return;
        }

        let caps = control
            .codec
            .and_then(|id| self.codecs.get(id))
            .map(|codec| codec.caps());

        let mut val = level;
        if let Some(caps) = caps {
            if caps.contains(CodecCaps::CLAMP_BELOW_MIN_TO_ZERO) && val as i32 <= control.range.min
            {
                val = 0;
            }
            if caps.contains(CodecCaps::ATTENUATION_ENABLE_BIT) {
                val |= ATTENUATION_ENABLE;
            }
        }

        let variant = self.variant();
        match variant {
            Variant::Ap192 => {
                ap192::set_dac(&chip, control.reg, val);
            }
            Variant::AureonSky | Variant::AureonSpace | Variant::Phase28 => {
                aureon::spi_for(variant).wm_put(
                    &chip,
                    control.reg as u16,
                    val as u16 | WM_VOLUME_UPDATE,
                );
            }
            Variant::ProdigyHd2 => Ak4396Bus::write(&chip, control.reg, val),
            _ => match control.codec.and_then(|id| self.codecs.get_mut(id)) {
                Some(codec) => {
                    codec.update(&chip, control.reg, val);
                }
                None => debug!(
                    "[ENVY24HT] Control {} has no codec on {}",
                    control.control_id, variant
                ),
            },
        }
    }

    fn apply_mute(&mut self, control: &ControlDescriptor, muted: bool) {
        let Some(mute) = control.mute else {
            return;
        };
        let value = if muted { mute.on } else { mute.off };
        let chip = self.chip().clone();
        let variant = self.variant();

        if let Some(address) = control.two_wire {
            chip.i2c_write(address, mute.reg, value);
        } else if let Some(codec) = control.codec.and_then(|id| self.codecs.get_mut(id)) {
            codec.update(&chip, mute.reg, value);
        } else if variant.is_aureon() {
            aureon::spi_for(variant).wm_put(&chip, mute.reg as u16, value as u16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::akm::CodecRole;
    use crate::regs::*;
    use crate::testing::{chip_with_id, serial_words};
    use crate::types::subvendor;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        levels: Vec<u32>,
        mutes: Vec<(u32, u32, &'static str)>,
        reject: Option<u32>,
    }

    impl ControlSurface for Recorder {
        fn add_level(&mut self, control: &ControlDescriptor) -> bool {
            if self.reject == Some(control.control_id) {
                return false;
            }
            self.levels.push(control.control_id);
            true
        }

        fn add_mute(
            &mut self,
            control_id: u32,
            channel_id: u32,
            name: &'static str,
            _usage: Usage,
        ) -> bool {
            self.mutes.push((control_id, channel_id, name));
            true
        }
    }

    #[test]
    fn test_clamp_family_writes_zero_at_minimum() {
        let chip = chip_with_id(subvendor::PHASE22);
        let mut card = CardContext::bring_up(chip).unwrap();
        let front = card.codecs().role(CodecRole::Front).unwrap();

        card.apply_value(ControlKind::Volume, 0, 0x7E, 14);
        assert_eq!(card.codecs().get(front).unwrap().image(0x06), Some(0));

        card.apply_value(ControlKind::Volume, 0, 14, 15);
        assert_eq!(card.codecs().get(front).unwrap().image(0x06), Some(15));

        card.apply_value(ControlKind::Volume, 1, 0x7E, 0x40);
        assert_eq!(card.codecs().get(front).unwrap().image(0x07), Some(0x40));
    }

    #[test]
    fn test_clamped_repeat_skips_serial_write() {
        let chip = chip_with_id(subvendor::PHASE22);
        let mut card = CardContext::bring_up(chip.clone()).unwrap();

        card.apply_value(ControlKind::Volume, 0, 0x7E, 0x40);
        card.apply_value(ControlKind::Volume, 0, 0x40, 14);
        let front = card.codecs().role(CodecRole::Front).unwrap();
        assert_eq!(card.codecs().get(front).unwrap().image(0x06), Some(0));
        chip.ccs().clear_trace();
        // 13 も 0 に丸められ、イメージと一致する
        card.apply_value(ControlKind::Volume, 0, 14, 13);
        assert!(chip.ccs().writes().is_empty());

        card.apply_value(ControlKind::Volume, 0, 13, 20);
        assert!(!chip.ccs().writes().is_empty());
    }

    #[test]
    fn test_enable_bit_family() {
        let chip = chip_with_id(subvendor::REVOLUTION51);
        let mut card = CardContext::bring_up(chip).unwrap();
        let front = card.codecs().role(CodecRole::Front).unwrap();

        card.apply_value(ControlKind::Volume, 0, 0x7F, 0x50);
        assert_eq!(card.codecs().get(front).unwrap().image(0x04), Some(0xD0));
        // AK4358 は最小値でも 0 にしない
        card.apply_value(ControlKind::Volume, 0, 0x50, 0x43);
        assert_eq!(card.codecs().get(front).unwrap().image(0x04), Some(0xC3));
    }

    #[test]
    fn test_two_wire_volume_and_mute() {
        let chip = chip_with_id(subvendor::JULIA);
        let mut card = CardContext::bring_up(chip.clone()).unwrap();
        chip.ccs().clear_trace();

        card.apply_value(ControlKind::Volume, 1, 0x7F, 0x60);
        assert_eq!(
            chip.ccs().writes(),
            [
                (CCS_I2C_ADDR, 0x05),
                (CCS_I2C_DATA, 0xE0),
                (CCS_I2C_DEV_ADDRESS, (AK4358_I2C_ADDR | CCS_ADDRESS_WRITE) as u32),
            ]
        );

        chip.ccs().clear_trace();
        card.apply_value(ControlKind::Mute, 0, 0, 1);
        assert_eq!(chip.ccs().writes_to(CCS_I2C_ADDR), [0x01]);
        assert_eq!(chip.ccs().writes_to(CCS_I2C_DATA), [0x03]);

        chip.ccs().clear_trace();
        card.apply_value(ControlKind::Mute, 0, 1, 0);
        assert_eq!(chip.ccs().writes_to(CCS_I2C_DATA), [0x01]);
    }

    #[test]
    fn test_aureon_volume_goes_to_wm8770() {
        let chip = chip_with_id(subvendor::AUREON_SKY);
        let mut card = CardContext::bring_up(chip.clone()).unwrap();
        chip.ccs().clear_trace();

        card.apply_value(ControlKind::Volume, 0, 0xFF, 0xF0);
        let history = chip.ccs().gpio_history();
        let words = serial_words(&history, AUREON_SPI_CLK, AUREON_SPI_MOSI, AUREON_WM_CS, 16);
        assert_eq!(words, [(0x09 << 9) | 0x1F0]);
    }

    #[test]
    fn test_aureon_mute_has_no_update_bit() {
        let chip = chip_with_id(subvendor::AUREON_SPACE);
        let mut card = CardContext::bring_up(chip.clone()).unwrap();
        chip.ccs().clear_trace();

        card.apply_value(ControlKind::Mute, 1, 0, 1);
        let history = chip.ccs().gpio_history();
        let words = serial_words(&history, AUREON_SPI_CLK, AUREON_SPI_MOSI, AUREON_WM_CS, 16);
        assert_eq!(words, [(0x14 << 9) | 0x01]);
    }

    #[test]
    fn test_unchanged_unknown_and_unbound_do_nothing() {
        let chip = chip_with_id(subvendor::JULIA);
        let mut card = CardContext::bring_up(chip.clone()).unwrap();
        chip.ccs().clear_trace();
        chip.mt().clear_trace();

        card.apply_value(ControlKind::Volume, 0, 0x40, 0x40);
        card.apply_value(ControlKind::Volume, 99, 0x40, 0x41);
        card.apply_value(ControlKind::Gain, 0, 0, 5);
        card.apply_value(ControlKind::InputMute, 0, 0, 1);
        // 右チャンネルにはミュートがない
        card.apply_value(ControlKind::Mute, 1, 0, 1);

        assert!(chip.ccs().writes().is_empty());
        assert!(chip.mt().writes().is_empty());
    }

    #[test]
    fn test_publish_adds_mute_companions() {
        let chip = chip_with_id(subvendor::REVOLUTION51);
        let card = CardContext::bring_up(chip).unwrap();
        let mut surface = Recorder::default();
        card.publish_controls(&mut surface).unwrap();

        assert_eq!(surface.levels, (0..8).collect::<Vec<u32>>());
        assert_eq!(surface.mutes, [(0, channel::ALL, NAME_ALL)]);
    }

    #[test]
    fn test_publish_reports_rejection() {
        let chip = chip_with_id(subvendor::PHASE22);
        let card = CardContext::bring_up(chip).unwrap();
        let mut surface = Recorder {
            reject: Some(2),
            ..Recorder::default()
        };
        assert_eq!(
            card.publish_controls(&mut surface),
            Err(Envy24Error::ControlRejected { control_id: 2 })
        );
        assert_eq!(surface.levels, [0, 1]);
    }
}

// ============================================================================
// src/parms.rs - Control Descriptor Lists
// ============================================================================
//!
//! ボードごとに公開する音量/ミュート制御の宣言的な一覧。
//!
//! 各ディスクリプタは「どのバスの、どのレジスタに、どの範囲の値を書くか」を
//! 持つだけで、実際の書き込みは `controls::apply_value` が行う。
//! 制御 ID は 0 から連番で、リスト内の位置と一致する。

#![allow(dead_code)]

use alloc::vec::Vec;

use crate::akm::{CodecId, CodecRole, CodecSet};
use crate::regs::AK4358_I2C_ADDR;
use crate::types::Variant;

// ============================================================================
// Descriptor types
// ============================================================================

/// dB 値を 16.16 固定小数点に変換 (+0.5 の丸め込み込み)
#[inline]
pub const fn db(value: i32) -> i32 {
    (value << 16) + 32768
}

/// ホスト側のチャンネル ID
pub mod channel {
    pub const ALL: u32 = 0;
    pub const LEFT: u32 = 1;
    pub const RIGHT: u32 = 2;
}

pub const NAME_LEFT: &str = "Left";
pub const NAME_RIGHT: &str = "Right";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Output,
    Input,
}

/// ミュートレジスタとオン/オフ値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuteBinding {
    pub reg: u8,
    pub on: u8,
    pub off: u8,
}

/// 値域と dB 範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    pub initial: i32,
    pub min: i32,
    pub max: i32,
    pub min_db: i32,
    pub max_db: i32,
}

/// One host-visible volume control and the register it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub range: ValueRange,
    pub channel_id: u32,
    pub name: &'static str,
    /// 0 からの連番
    pub control_id: u32,
    pub usage: Usage,
    pub reg: u8,
    pub reverse: bool,
    /// 2 線式バス上のチップアドレス
    pub two_wire: Option<u8>,
    pub codec: Option<CodecId>,
    pub mute: Option<MuteBinding>,
}

impl ControlDescriptor {
    pub const fn new(
        range: ValueRange,
        usage: Usage,
        channel_id: u32,
        name: &'static str,
        reg: u8,
    ) -> Self {
        Self {
            range,
            channel_id,
            name,
            control_id: 0,
            usage,
            reg,
            reverse: false,
            two_wire: None,
            codec: None,
            mute: None,
        }
    }

    pub const fn over_two_wire(mut self, address: u8) -> Self {
        self.two_wire = Some(address);
        self
    }

    pub const fn on_codec(mut self, codec: Option<CodecId>) -> Self {
        self.codec = codec;
        self
    }

    pub const fn with_mute(mut self, reg: u8, on: u8, off: u8) -> Self {
        self.mute = Some(MuteBinding { reg, on, off });
        self
    }

    #[inline]
    pub fn has_mute(&self) -> bool {
        self.mute.is_some()
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.usage == Usage::Input
    }
}

/// 連番 ID を振りながら積むリスト
struct ControlList {
    controls: Vec<ControlDescriptor>,
}

impl ControlList {
    fn with_capacity(n: usize) -> Self {
        Self {
            controls: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, mut control: ControlDescriptor) {
        control.control_id = self.controls.len() as u32;
        self.controls.push(control);
    }

    fn finish(self) -> Vec<ControlDescriptor> {
        self.controls
    }
}

/// "Output N" の名前 (3 以降のチャンネル)
const OUTPUT_NAMES: [&str; 8] = [
    NAME_LEFT, NAME_RIGHT, "Output 3", "Output 4", "Output 5", "Output 6", "Output 7", "Output 8",
];

// ============================================================================
// Per-variant lists
// ============================================================================

/// Build the descriptor list for `variant`, binding codec-backed controls to `codecs`.
pub fn build_controls(variant: Variant, codecs: &CodecSet) -> Vec<ControlDescriptor> {
    let front = codecs.role(CodecRole::Front);
    let mut list = ControlList::with_capacity(variant.control_count());

    match variant {
        Variant::Julia => {
            let range = ValueRange {
                initial: 0x7F,
                min: 14,
                max: 0x7F,
                min_db: db(-49),
                max_db: 0,
            };
            list.push(
                ControlDescriptor::new(range, Usage::Output, channel::LEFT, NAME_LEFT, 0x04)
                    .over_two_wire(AK4358_I2C_ADDR)
                    .with_mute(0x01, 0x03, 0x01),
            );
            list.push(
                ControlDescriptor::new(range, Usage::Output, channel::RIGHT, NAME_RIGHT, 0x05)
                    .over_two_wire(AK4358_I2C_ADDR),
            );
        }
        Variant::Phase22 => {
            let out = ValueRange {
                initial: 0x7E,
                min: 14,
                max: 0x7E,
                min_db: db(-49),
                max_db: 0,
            };
            let input = ValueRange {
                initial: 128,
                min: 128,
                max: 164,
                min_db: db(0),
                max_db: db(18),
            };
            list.push(
                ControlDescriptor::new(out, Usage::Output, channel::LEFT, NAME_LEFT, 0x06)
                    .on_codec(front)
                    .with_mute(0x03, 0x99, 0x19),
            );
            list.push(
                ControlDescriptor::new(out, Usage::Output, channel::RIGHT, NAME_RIGHT, 0x07)
                    .on_codec(front),
            );
            list.push(
                ControlDescriptor::new(input, Usage::Input, channel::LEFT, NAME_LEFT, 0x04)
                    .on_codec(front),
            );
            list.push(
                ControlDescriptor::new(input, Usage::Input, channel::RIGHT, NAME_RIGHT, 0x05)
                    .on_codec(front),
            );
        }
        Variant::Revo71 => {
            let front_range = ValueRange {
                initial: 0xFF,
                min: 1,
                max: 0xFF,
                min_db: db(-48),
                max_db: 0,
            };
            let surround_range = ValueRange {
                min: 159,
                ..front_range
            };
            let surround = codecs.role(CodecRole::Surround);

            list.push(
                ControlDescriptor::new(front_range, Usage::Output, channel::LEFT, NAME_LEFT, 0x03)
                    .on_codec(front)
                    .with_mute(0x01, 0x0B, 0x0A),
            );
            list.push(
                ControlDescriptor::new(front_range, Usage::Output, channel::RIGHT, NAME_RIGHT, 0x04)
                    .on_codec(front),
            );
            // AK4355 の LOUT1..ROUT3 はレジスタ 4..9
            for (n, reg) in (2..8).zip(0x04u8..) {
                list.push(
                    ControlDescriptor::new(
                        surround_range,
                        Usage::Output,
                        channel::LEFT + n as u32,
                        OUTPUT_NAMES[n],
                        reg,
                    )
                    .on_codec(surround),
                );
            }
        }
        Variant::Revo51 => {
            let out = ValueRange {
                initial: 0x7F,
                min: 0x43,
                max: 0x7F,
                min_db: db(-30),
                max_db: 0,
            };
            let input = ValueRange {
                initial: 0x80,
                min: 0x80,
                max: 0x98,
                min_db: db(0),
                max_db: db(12),
            };
            let rec = codecs.role(CodecRole::Capture);

            for (n, reg) in (0..6).zip(0x04u8..) {
                let control = ControlDescriptor::new(
                    out,
                    Usage::Output,
                    channel::LEFT + n as u32,
                    OUTPUT_NAMES[n],
                    reg,
                )
                .on_codec(front);
                list.push(if n == 0 {
                    control.with_mute(0x01, 0x03, 0x01)
                } else {
                    control
                });
            }
            list.push(
                ControlDescriptor::new(input, Usage::Input, channel::LEFT, NAME_LEFT, 0x04)
                    .on_codec(rec),
            );
            list.push(
                ControlDescriptor::new(input, Usage::Input, channel::RIGHT, NAME_RIGHT, 0x05)
                    .on_codec(rec),
            );
        }
        Variant::Ap192 => {
            let range = ValueRange {
                initial: 0x7F,
                min: 0,
                max: 0x7F,
                min_db: db(-64),
                max_db: 0,
            };
            list.push(ControlDescriptor::new(range, Usage::Output, channel::LEFT, NAME_LEFT, 0x04));
            list.push(ControlDescriptor::new(range, Usage::Output, channel::RIGHT, NAME_RIGHT, 0x05));
        }
        Variant::AureonSky | Variant::AureonSpace | Variant::Phase28 => {
            let out = ValueRange {
                initial: 0xFF,
                min: 0xB9,
                max: 0xFF,
                min_db: db(-35),
                max_db: 0,
            };
            let input = ValueRange {
                initial: 0x0C,
                min: 0,
                max: 0x1F,
                min_db: db(-12),
                max_db: db(19),
            };
            list.push(
                ControlDescriptor::new(out, Usage::Output, channel::LEFT, NAME_LEFT, 0x09)
                    .with_mute(0x14, 0x01, 0x00),
            );
            list.push(
                ControlDescriptor::new(out, Usage::Output, channel::RIGHT, NAME_RIGHT, 0x0A)
                    .with_mute(0x14, 0x01, 0x00),
            );
            list.push(ControlDescriptor::new(input, Usage::Input, channel::LEFT, NAME_LEFT, 0x19));
            list.push(ControlDescriptor::new(input, Usage::Input, channel::RIGHT, NAME_RIGHT, 0x1A));
        }
        Variant::ProdigyHd2 => {
            let range = ValueRange {
                initial: 0xFF,
                min: 0,
                max: 0xFF,
                min_db: db(-48),
                max_db: 0,
            };
            list.push(ControlDescriptor::new(range, Usage::Output, channel::LEFT, NAME_LEFT, 0x03));
            list.push(ControlDescriptor::new(range, Usage::Output, channel::RIGHT, NAME_RIGHT, 0x04));
        }
        Variant::Cantatis => {}
    }

    list.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::akm::{AkmType, CodecContext};

    fn revo_codecs(variant: Variant) -> CodecSet {
        let mut codecs = CodecSet::new();
        match variant {
            Variant::Revo51 => {
                codecs.insert(CodecRole::Front, CodecContext::new(AkmType::Ak4358, 2));
                codecs.insert(CodecRole::Capture, CodecContext::new(AkmType::Ak5365, 2));
            }
            Variant::Revo71 => {
                codecs.insert(CodecRole::Front, CodecContext::new(AkmType::Ak4381, 1));
                codecs.insert(CodecRole::Surround, CodecContext::new(AkmType::Ak4355, 3));
            }
            Variant::Phase22 => {
                codecs.insert(CodecRole::Front, CodecContext::new(AkmType::Ak4524, 2));
            }
            _ => {}
        }
        codecs
    }

    #[test]
    fn test_counts_and_dense_ids() {
        for variant in Variant::ALL {
            let controls = build_controls(variant, &revo_codecs(variant));
            assert_eq!(controls.len(), variant.control_count(), "{}", variant);
            for (i, control) in controls.iter().enumerate() {
                assert_eq!(control.control_id, i as u32);
                assert!(control.range.min <= control.range.initial);
                assert!(control.range.initial <= control.range.max);
            }
        }
    }

    #[test]
    fn test_db_fixed_point() {
        assert_eq!(db(-49), (-49 << 16) + 32768);
        assert_eq!(db(0), 32768);
        assert!(db(-30) < 0);
    }

    #[test]
    fn test_julia_goes_over_two_wire() {
        let controls = build_controls(Variant::Julia, &CodecSet::new());
        assert!(controls.iter().all(|c| c.two_wire == Some(AK4358_I2C_ADDR)));
        assert_eq!(
            controls[0].mute,
            Some(MuteBinding {
                reg: 0x01,
                on: 0x03,
                off: 0x01
            })
        );
        assert!(!controls[1].has_mute());
    }

    #[test]
    fn test_revo71_channels_are_sequential() {
        let codecs = revo_codecs(Variant::Revo71);
        let controls = build_controls(Variant::Revo71, &codecs);
        let ids: Vec<u32> = controls.iter().map(|c| c.channel_id).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7, 8]);
        let regs: Vec<u8> = controls.iter().map(|c| c.reg).collect();
        assert_eq!(regs, [3, 4, 4, 5, 6, 7, 8, 9]);
        assert_eq!(controls[7].name, "Output 8");

        let surround = codecs.role(CodecRole::Surround);
        assert!(controls[2..].iter().all(|c| c.codec == surround && c.range.min == 159));
    }

    #[test]
    fn test_revo51_inputs_bind_capture_codec() {
        let codecs = revo_codecs(Variant::Revo51);
        let controls = build_controls(Variant::Revo51, &codecs);
        let rec = codecs.role(CodecRole::Capture);
        assert!(controls[6..].iter().all(|c| c.is_input() && c.codec == rec));
        assert_eq!(controls[5].reg, 0x09);
        assert_eq!(controls[5].name, "Output 6");
    }

    #[test]
    fn test_aureon_outputs_share_mute_register() {
        let controls = build_controls(Variant::AureonSpace, &CodecSet::new());
        assert_eq!(controls[0].mute, controls[1].mute);
        assert!(controls[0].codec.is_none());
        assert_eq!(controls[3].reg, 0x1A);
    }
}

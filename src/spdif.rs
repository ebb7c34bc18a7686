// ============================================================================
// src/spdif.rs - S/PDIF Transmitter
// ============================================================================
//!
//! 内蔵 S/PDIF 送信部のチャンネルステータス設定。
//!
//! `MT_SPDIF_TRANSMIT` はトランスミッタが有効な間は書き換えられないので、
//! `CCS_SPDIF_CONFIG` の INTEGRATED ビットを一時的に落としてから書く。

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

/// 送信ワードの固定部分 (コンシューマ、オリジナル)
const TRANSMIT_BASE: u16 = 0x04 | (1 << 5);

/// S/PDIF で送れるレートとその周波数コード
static SPDIF_RATES: [(u32, u16); 7] = [
    (32_000, 3),
    (44_100, 0),
    (48_000, 2),
    (88_200, 4),
    (96_000, 5),
    (176_400, 7),
    (192_000, 6),
];

/// Frequency code for `rate`, or `None` when S/PDIF cannot carry it.
pub fn spdif_rate_code(rate: u32) -> Option<u16> {
    SPDIF_RATES
        .iter()
        .find(|(r, _)| *r == rate)
        .map(|(_, code)| *code)
}

impl<R: RegisterSpace, P: Platform> Chip<R, P> {
    /// Write the channel-status word with the transmitter briefly disabled.
    pub fn update_spdif_bits(&self, value: u16) {
        let cbit = self.ccs().read8(CCS_SPDIF_CONFIG);
        let disabled = cbit & !CCS_SPDIF_INTEGRATED;
        let was_enabled = cbit != disabled;

        if was_enabled {
            self.ccs().write8(CCS_SPDIF_CONFIG, disabled);
        }
        self.mt().write16(MT_SPDIF_TRANSMIT, value);
        if was_enabled {
            self.ccs().write8(CCS_SPDIF_CONFIG, cbit);
        }
        // 有効化後にもう一度書かないと反映されないことがある
        self.mt().write16(MT_SPDIF_TRANSMIT, value);
    }

    /// Update the rate category bits (32k / 44.1k / 48k) if they differ.
    pub fn update_spdif_rate(&self, rate: u32) {
        let value = self.mt().read16(MT_SPDIF_TRANSMIT);
        let mut next = value & !MT_SPDIF_RATE_MASK;
        match rate {
            48_000 => next |= 2 << MT_SPDIF_RATE_SHIFT,
            32_000 => next |= 3 << MT_SPDIF_RATE_SHIFT,
            _ => {}
        }
        if next != value {
            self.update_spdif_bits(next);
        }
    }

    /// Program the transmitter for `rate`. Returns whether S/PDIF carries it.
    ///
    /// For unsupported rates the transmitter is left disabled.
    pub fn program_spdif_rate(&self, rate: u32) -> bool {
        self.ccs().clear_bits8(CCS_SPDIF_CONFIG, CCS_SPDIF_INTEGRATED);
        match spdif_rate_code(rate) {
            Some(code) => {
                self.mt()
                    .write16(MT_SPDIF_TRANSMIT, TRANSMIT_BASE | (code << MT_SPDIF_RATE_SHIFT));
                self.ccs().set_bits8(CCS_SPDIF_CONFIG, CCS_SPDIF_INTEGRATED);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::bare_chip;

    #[test]
    fn test_update_bits_double_write_and_restore() {
        let chip = bare_chip();
        chip.ccs().poke8(CCS_SPDIF_CONFIG, 0xC3);
        chip.update_spdif_bits(0x2024);

        assert_eq!(chip.ccs().writes_to(CCS_SPDIF_CONFIG), [0x43, 0xC3]);
        assert_eq!(chip.mt().writes_to(MT_SPDIF_TRANSMIT), [0x2024, 0x2024]);
        // MT 側の同オフセットは触らない
        assert!(chip.mt().writes_to(CCS_SPDIF_CONFIG).is_empty());
    }

    #[test]
    fn test_update_bits_when_disabled() {
        let chip = bare_chip();
        chip.ccs().poke8(CCS_SPDIF_CONFIG, 0x43);
        chip.update_spdif_bits(0x0024);
        assert!(chip.ccs().writes_to(CCS_SPDIF_CONFIG).is_empty());
        assert_eq!(chip.mt().writes_to(MT_SPDIF_TRANSMIT).len(), 2);
    }

    #[test]
    fn test_update_rate_only_on_change() {
        let chip = bare_chip();
        chip.update_spdif_rate(44_100);
        assert!(chip.mt().writes().is_empty());

        chip.update_spdif_rate(48_000);
        assert_eq!(chip.mt().peek16(MT_SPDIF_TRANSMIT), 2 << 12);
        chip.update_spdif_rate(32_000);
        assert_eq!(chip.mt().peek16(MT_SPDIF_TRANSMIT), 3 << 12);
    }

    #[test]
    fn test_program_rate() {
        let chip = bare_chip();
        assert!(chip.program_spdif_rate(44_100));
        assert_eq!(chip.mt().peek16(MT_SPDIF_TRANSMIT), 0x0024);
        assert_eq!(chip.ccs().peek8(CCS_SPDIF_CONFIG) & CCS_SPDIF_INTEGRATED, CCS_SPDIF_INTEGRATED);

        assert!(!chip.program_spdif_rate(22_050));
        assert_eq!(chip.ccs().peek8(CCS_SPDIF_CONFIG) & CCS_SPDIF_INTEGRATED, 0);
        assert_eq!(spdif_rate_code(192_000), Some(6));
    }
}

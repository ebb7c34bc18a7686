// ============================================================================
// src/akm.rs - AKM Serial Codec Support
// ============================================================================
//!
//! AKM 製マルチチャンネル codec (AK4524/4528/4529/4355/4358/4381/5365) の
//! GPIO ビットバンギングによるシリアル書き込み。
//!
//! ## プロトコル
//! ```text
//! CS   ‾‾\____________________________________/‾‾
//! CCLK ‾‾‾‾\_/‾\_/‾\_/‾ ... ‾\_/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! CDTI     <C1><C0><W ><A4>...<D1><D0>
//! ```
//! 16-bit ワード `(caddr << 6 | 0x20 | reg) << 8 | data` を MSB から送る。
//! データは CCLK が Low の間に変化させ、立ち上がりでラッチされる。
//! 各フェーズは 1µs。

#![allow(dead_code)]

use alloc::vec::Vec;

use bitflags::bitflags;
#[cfg(feature = "verbose_logging")]
use log::trace;

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;

// ============================================================================
// Codec family
// ============================================================================

bitflags! {
    /// codec ファミリーごとの振る舞いの違い
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CodecCaps: u8 {
        /// 最小値以下の音量は 0 を書いてミュートとする
        const CLAMP_BELOW_MIN_TO_ZERO = 1 << 0;
        /// 減衰レジスタに書き込み許可ビット (0x80) が必要
        const ATTENUATION_ENABLE_BIT = 1 << 1;
    }
}

/// 減衰レジスタの書き込み許可ビット
pub const ATTENUATION_ENABLE: u8 = 0x80;

/// AKM codec chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AkmType {
    Ak4524,
    Ak4528,
    Ak4529,
    Ak4355,
    Ak4358,
    Ak4381,
    Ak5365,
}

impl AkmType {
    pub const fn caps(self) -> CodecCaps {
        match self {
            AkmType::Ak4524 | AkmType::Ak4528 | AkmType::Ak4355 | AkmType::Ak4381 => {
                CodecCaps::CLAMP_BELOW_MIN_TO_ZERO
            }
            AkmType::Ak4358 => CodecCaps::ATTENUATION_ENABLE_BIT,
            AkmType::Ak4529 | AkmType::Ak5365 => CodecCaps::empty(),
        }
    }

    /// 初期化時に書くレジスタ列 (reg, value)
    pub const fn init_sequence(self) -> &'static [(u8, u8)] {
        match self {
            AkmType::Ak4524 => AK4524_INIT,
            AkmType::Ak4528 => AK4528_INIT,
            AkmType::Ak4529 => AK4529_INIT,
            AkmType::Ak4355 => AK4355_INIT,
            AkmType::Ak4358 => AK4358_INIT,
            AkmType::Ak4381 => AK4381_INIT,
            AkmType::Ak5365 => &[],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AkmType::Ak4524 => "AK4524",
            AkmType::Ak4528 => "AK4528",
            AkmType::Ak4529 => "AK4529",
            AkmType::Ak4355 => "AK4355",
            AkmType::Ak4358 => "AK4358",
            AkmType::Ak4381 => "AK4381",
            AkmType::Ak5365 => "AK5365",
        }
    }
}

// ============================================================================
// Register defaults
// ============================================================================

static AK4524_INIT: &[(u8, u8)] = &[
    (0x00, 0x07), // power down all
    (0x01, 0x00), // reset
    (0x02, 0x60), // 24bit I2S
    (0x03, 0x19), // de-emphasis off, mute on zero
    (0x01, 0x03), // release reset
    (0x04, 0x00), // ADC left
    (0x05, 0x00), // ADC right
    (0x06, 0x00), // DAC left
    (0x07, 0x00), // DAC right
];

static AK4528_INIT: &[(u8, u8)] = &[
    (0x00, 0x07),
    (0x01, 0x00),
    (0x02, 0x60),
    (0x03, 0x0D),
    (0x01, 0x03),
    (0x04, 0x00),
    (0x05, 0x00),
];

static AK4529_INIT: &[(u8, u8)] = &[
    (0x09, 0x01), // reset
    (0x0E, 0x00),
    (0x01, 0x00),
    (0x09, 0x0C), // release reset
];

static AK4355_INIT: &[(u8, u8)] = &[
    (0x01, 0x02), // un-reset, unmute
    (0x00, 0x06), // 24bit I2S, no TDM
    (0x02, 0x0E),
    (0x03, 0x01), // de-emphasis off
    (0x04, 0x00),
    (0x05, 0x00),
    (0x06, 0x00),
    (0x07, 0x00),
    (0x08, 0x00),
    (0x09, 0x00),
    (0x0A, 0x00),
    (0x01, 0x01), // normal operation
];

static AK4358_INIT: &[(u8, u8)] = &[
    (0x01, 0x02),
    (0x00, 0x06),
    (0x02, 0x4E),
    (0x03, 0x01),
    (0x04, 0x00),
    (0x05, 0x00),
    (0x06, 0x00),
    (0x07, 0x00),
    (0x08, 0x00),
    (0x09, 0x00),
    (0x0B, 0x00),
    (0x0C, 0x00),
    (0x0A, 0x00),
    (0x01, 0x01),
];

static AK4381_INIT: &[(u8, u8)] = &[
    (0x00, 0x0C), // reset
    (0x01, 0x02), // 24bit I2S
    (0x02, 0x00),
    (0x03, 0x00), // left attenuation
    (0x04, 0x00), // right attenuation
    (0x00, 0x0F), // release reset
];

// ============================================================================
// Codec context
// ============================================================================

/// Serial wiring and write state of one AKM codec.
#[derive(Debug, Clone)]
pub struct CodecContext {
    pub kind: AkmType,
    /// 2-bit chip address
    pub caddr: u8,
    pub data_mask: u32,
    pub clock_mask: u32,
    /// この codec の書き込みで触る chip-select ビット
    pub cs_mask: u32,
    /// 選択時の chip-select 値
    pub cs_addr: u32,
    /// 非選択時の chip-select 値
    pub cs_none: u32,
    /// CS をラッチとして使う (シフト中は High、最後に Low パルス)
    pub cif: bool,
    /// 書き込み中に常に立てておく追加信号
    pub add_flags: u32,
    /// 最後に書いた値
    images: [Option<u8>; 32],
}

impl CodecContext {
    pub const fn new(kind: AkmType, caddr: u8) -> Self {
        Self {
            kind,
            caddr,
            data_mask: 0,
            clock_mask: 0,
            cs_mask: 0,
            cs_addr: 0,
            cs_none: 0,
            cif: false,
            add_flags: 0,
            images: [None; 32],
        }
    }

    pub const fn with_lines(mut self, data: u32, clock: u32) -> Self {
        self.data_mask = data;
        self.clock_mask = clock;
        self
    }

    /// 専用の chip-select を 1 本だけ持つ配線
    pub const fn with_chip_select(mut self, cs: u32) -> Self {
        self.cs_mask = cs;
        self.cs_addr = cs;
        self.cs_none = cs;
        self
    }

    /// 複数 codec で chip-select 線を共有する配線
    pub const fn with_shared_select(mut self, mask: u32, addr: u32, none: u32) -> Self {
        self.cs_mask = mask;
        self.cs_addr = addr;
        self.cs_none = none;
        self
    }

    pub const fn with_cif(mut self, cif: bool) -> Self {
        self.cif = cif;
        self
    }

    pub const fn with_add_flags(mut self, flags: u32) -> Self {
        self.add_flags = flags;
        self
    }

    #[inline]
    pub fn caps(&self) -> CodecCaps {
        self.kind.caps()
    }

    /// 最後に書いた値
    pub fn image(&self, reg: u8) -> Option<u8> {
        self.images[(reg & 0x1F) as usize]
    }

    /// 16-bit 送信ワード
    #[inline]
    pub const fn command_word(&self, reg: u8, data: u8) -> u16 {
        let addr = ((self.caddr as u16 & 0x03) << 6) | 0x20 | (reg as u16 & 0x1F);
        (addr << 8) | data as u16
    }

    /// Shift one register write out over GPIO.
    pub fn write<R: RegisterSpace, P: Platform>(&mut self, chip: &Chip<R, P>, reg: u8, data: u8) {
        #[cfg(feature = "verbose_logging")]
        trace!("[ENVY24HT] {} reg {:#04x} <- {:#04x}", self.kind.name(), reg, data);

        let select_only = self.cs_mask == self.cs_addr;
        let mut tmp = chip.gpio_data() | self.add_flags;

        if select_only {
            if self.cif {
                tmp |= self.cs_mask;
            } else {
                tmp &= !self.cs_mask;
                chip.set_gpio_data(tmp);
                chip.delay_us(1);
            }
        } else {
            tmp &= !self.cs_mask;
            tmp |= self.cs_addr;
            chip.set_gpio_data(tmp);
            chip.delay_us(1);
        }

        let word = self.command_word(reg, data);
        for bit in (0..16).rev() {
            tmp &= !self.clock_mask;
            chip.set_gpio_data(tmp);
            chip.delay_us(1);
            if word & (1 << bit) != 0 {
                tmp |= self.data_mask;
            } else {
                tmp &= !self.data_mask;
            }
            chip.set_gpio_data(tmp);
            chip.delay_us(1);
            tmp |= self.clock_mask;
            chip.set_gpio_data(tmp);
            chip.delay_us(1);
        }

        if select_only {
            if self.cif {
                tmp &= !self.cs_mask;
                chip.set_gpio_data(tmp);
                chip.delay_us(1);
            }
            tmp |= self.cs_mask;
        } else {
            tmp &= !self.cs_mask;
            tmp |= self.cs_none;
        }
        chip.set_gpio_data(tmp);
        chip.delay_us(1);

        self.images[(reg & 0x1F) as usize] = Some(data);
    }

    /// Write only if the register does not already hold `data`.
    pub fn update<R: RegisterSpace, P: Platform>(
        &mut self,
        chip: &Chip<R, P>,
        reg: u8,
        data: u8,
    ) -> bool {
        if self.image(reg) == Some(data) {
            return false;
        }
        self.write(chip, reg, data);
        true
    }

    /// 既定値テーブルを書き込む
    pub fn init<R: RegisterSpace, P: Platform>(&mut self, chip: &Chip<R, P>) {
        for &(reg, value) in self.kind.init_sequence() {
            self.write(chip, reg, value);
        }
    }
}

// ============================================================================
// Codec set
// ============================================================================

/// `CodecSet` 内の codec を指すインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecId(pub usize);

/// codec の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecRole {
    Front,
    Surround,
    Capture,
}

/// The codecs owned by one card, with role lookup.
#[derive(Debug, Clone, Default)]
pub struct CodecSet {
    codecs: Vec<CodecContext>,
    front: Option<CodecId>,
    surround: Option<CodecId>,
    capture: Option<CodecId>,
}

impl CodecSet {
    pub const fn new() -> Self {
        Self {
            codecs: Vec::new(),
            front: None,
            surround: None,
            capture: None,
        }
    }

    /// codec を登録してインデックスを返す
    pub fn insert(&mut self, role: CodecRole, codec: CodecContext) -> CodecId {
        let id = CodecId(self.codecs.len());
        self.codecs.push(codec);
        match role {
            CodecRole::Front => self.front = Some(id),
            CodecRole::Surround => self.surround = Some(id),
            CodecRole::Capture => self.capture = Some(id),
        }
        id
    }

    pub fn role(&self, role: CodecRole) -> Option<CodecId> {
        match role {
            CodecRole::Front => self.front,
            CodecRole::Surround => self.surround,
            CodecRole::Capture => self.capture,
        }
    }

    pub fn get(&self, id: CodecId) -> Option<&CodecContext> {
        self.codecs.get(id.0)
    }

    pub fn get_mut(&mut self, id: CodecId) -> Option<&mut CodecContext> {
        self.codecs.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::*;
    use crate::testing::{bare_chip, serial_words};

    fn revo51_front() -> CodecContext {
        CodecContext::new(AkmType::Ak4358, 2)
            .with_lines(REVO_CDOUT, REVO_CCLK)
            .with_shared_select(REVO_CS0 | REVO_CS1, REVO_CS1, REVO_CS0 | REVO_CS1)
            .with_add_flags(REVO_CCLK)
    }

    #[test]
    fn test_caps_per_family() {
        for kind in [AkmType::Ak4528, AkmType::Ak4524, AkmType::Ak4355, AkmType::Ak4381] {
            assert!(kind.caps().contains(CodecCaps::CLAMP_BELOW_MIN_TO_ZERO));
            assert!(!kind.caps().contains(CodecCaps::ATTENUATION_ENABLE_BIT));
        }
        assert_eq!(AkmType::Ak4358.caps(), CodecCaps::ATTENUATION_ENABLE_BIT);
        assert!(AkmType::Ak5365.caps().is_empty());
    }

    #[test]
    fn test_command_word_packing() {
        let codec = revo51_front();
        assert_eq!(codec.command_word(0x04, 0xFF), 0xA4FF);
        let codec = CodecContext::new(AkmType::Ak4381, 1);
        assert_eq!(codec.command_word(0x23, 0x12), 0x6312);
    }

    #[test]
    fn test_shared_select_trace() {
        let chip = bare_chip();
        let mut codec = revo51_front();
        codec.write(&chip, 0x04, 0x7F);

        let history = chip.ccs().gpio_history();
        // CS0 が選択線 (CS1 は選択中 High)
        let words = serial_words(&history, REVO_CCLK, REVO_CDOUT, REVO_CS0, 16);
        assert_eq!(words, [0xA47F]);

        // 終了時は両方の CS が非選択
        let last = *history.last().unwrap();
        assert_eq!(last & (REVO_CS0 | REVO_CS1), REVO_CS0 | REVO_CS1);
        // 1 + 16*3 + 1 フェーズ
        assert_eq!(history.len(), 50);
        assert_eq!(codec.image(0x04), Some(0x7F));
    }

    #[test]
    fn test_dedicated_select_trace() {
        let chip = bare_chip();
        chip.set_gpio_data(REVO_CS1 | REVO_CCLK);
        chip.ccs().clear_trace();

        let mut codec = CodecContext::new(AkmType::Ak4381, 1)
            .with_lines(REVO_CDOUT, REVO_CCLK)
            .with_chip_select(REVO_CS1);
        codec.write(&chip, 0x03, 0xC0);

        let history = chip.ccs().gpio_history();
        assert_eq!(history[0] & REVO_CS1, 0);
        let words = serial_words(&history, REVO_CCLK, REVO_CDOUT, REVO_CS1, 16);
        assert_eq!(words, [0x63C0]);
        assert_ne!(history.last().unwrap() & REVO_CS1, 0);
    }

    #[test]
    fn test_cif_latches_on_trailing_pulse() {
        let chip = bare_chip();
        let mut codec = CodecContext::new(AkmType::Ak4524, 2)
            .with_lines(PHASE22_AK4524_CDTI, PHASE22_AK4524_CCLK)
            .with_chip_select(PHASE22_AK4524_CS)
            .with_cif(true)
            .with_add_flags(PHASE22_AK4524_EXTRA);
        codec.write(&chip, 0x06, 0x7E);

        let history = chip.ccs().gpio_history();
        // シフト中は CS High のまま
        assert!(history[..48].iter().all(|v| v & PHASE22_AK4524_CS != 0));
        assert!(history.iter().all(|v| v & PHASE22_AK4524_EXTRA != 0));
        let n = history.len();
        assert_eq!(history[n - 2] & PHASE22_AK4524_CS, 0);
        assert_ne!(history[n - 1] & PHASE22_AK4524_CS, 0);
    }

    #[test]
    fn test_update_skips_redundant_write() {
        let chip = bare_chip();
        let mut codec = revo51_front();
        assert!(codec.update(&chip, 0x05, 0x10));
        let writes = chip.ccs().writes().len();
        assert!(!codec.update(&chip, 0x05, 0x10));
        assert_eq!(chip.ccs().writes().len(), writes);
    }

    #[test]
    fn test_init_writes_whole_table() {
        let chip = bare_chip();
        let mut codec = revo51_front();
        codec.init(&chip);
        let history = chip.ccs().gpio_history();
        let words = serial_words(&history, REVO_CCLK, REVO_CDOUT, REVO_CS0, 16);
        assert_eq!(words.len(), AK4358_INIT.len());
        assert_eq!(words[0], 0xA102);
        assert_eq!(*words.last().unwrap(), 0xA101);
    }

    #[test]
    fn test_codec_set_roles() {
        let mut set = CodecSet::new();
        let front = set.insert(CodecRole::Front, revo51_front());
        let rec = set.insert(CodecRole::Capture, CodecContext::new(AkmType::Ak5365, 2));
        assert_eq!(set.role(CodecRole::Front), Some(front));
        assert_eq!(set.role(CodecRole::Capture), Some(rec));
        assert_eq!(set.role(CodecRole::Surround), None);
        assert_eq!(set.get(rec).map(|c| c.kind), Some(AkmType::Ak5365));
        set.clear();
        assert!(set.is_empty());
    }
}

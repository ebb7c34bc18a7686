// ============================================================================
// src/boards/revolution.rs - M-Audio Revolution 5.1 / 7.1
// ============================================================================
//!
//! Revolution 5.1: AK4358 DAC + AK5365 ADC (CS0/CS1 を共有する 2-bit 選択)
//! Revolution 7.1: AK4381 (front) + AK4355 (surround)、それぞれ専用 CS
//!
//! codec の初期化はミュート中に行う。

use log::debug;

use crate::akm::{AkmType, CodecContext, CodecRole, CodecSet};
use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

/// 5.1: 両 CS High = 非選択
const REVO51_CS_MASK: u32 = REVO_CS0 | REVO_CS1;

fn revo51_codecs() -> (CodecContext, CodecContext) {
    let front = CodecContext::new(AkmType::Ak4358, 2)
        .with_lines(REVO_CDOUT, REVO_CCLK)
        .with_shared_select(REVO51_CS_MASK, REVO_CS1, REVO51_CS_MASK)
        .with_add_flags(REVO_CCLK);
    let rec = CodecContext::new(AkmType::Ak5365, 2)
        .with_lines(REVO_CDOUT, REVO_CCLK)
        .with_shared_select(REVO51_CS_MASK, REVO_CS0, REVO51_CS_MASK)
        .with_add_flags(REVO_CCLK);
    (front, rec)
}

fn revo71_codecs() -> (CodecContext, CodecContext) {
    let front = CodecContext::new(AkmType::Ak4381, 1)
        .with_lines(REVO_CDOUT, REVO_CCLK)
        .with_chip_select(REVO_CS1);
    let surround = CodecContext::new(AkmType::Ak4355, 3)
        .with_lines(REVO_CDOUT, REVO_CCLK)
        .with_chip_select(REVO_CS2);
    (front, surround)
}

/// Mute or unmute the analog outputs.
pub fn set_mute<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, mute: bool) {
    // REVO_MUTE は Low でミュート
    chip.set_gpio_bits(REVO_MUTE, !mute);
}

/// Revolution 5.1 bring-up; registers the front DAC and capture ADC.
pub fn init_revo51<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, codecs: &mut CodecSet) {
    let (front, rec) = revo51_codecs();
    let front = codecs.insert(CodecRole::Front, front);
    let rec = codecs.insert(CodecRole::Capture, rec);
    bring_up(chip, codecs, [front, rec]);
    debug!("[ENVY24HT] Revolution 5.1 codecs ready");
}

/// Revolution 7.1 bring-up; registers the front and surround DACs.
pub fn init_revo71<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, codecs: &mut CodecSet) {
    let (front, surround) = revo71_codecs();
    let front = codecs.insert(CodecRole::Front, front);
    let surround = codecs.insert(CodecRole::Surround, surround);
    bring_up(chip, codecs, [front, surround]);
    debug!("[ENVY24HT] Revolution 7.1 codecs ready");
}

fn bring_up<R: RegisterSpace, P: Platform>(
    chip: &Chip<R, P>,
    codecs: &mut CodecSet,
    order: [crate::akm::CodecId; 2],
) {
    chip.mt().write8(MT_SAMPLERATE, MT_CLOCK_128X);

    set_mute(chip, true);
    for id in order {
        if let Some(codec) = codecs.get_mut(id) {
            codec.init(chip);
        }
    }
    set_mute(chip, false);
}

// ============================================================================
// src/boards/phase22.rs - Terratec Phase 22 / TerraSoniq TS22
// ============================================================================

use log::debug;

use crate::akm::{AkmType, CodecContext, CodecRole, CodecSet};
use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

/// AK4524 の配線。CS はシフト後のパルスでラッチする。
pub fn codec() -> CodecContext {
    CodecContext::new(AkmType::Ak4524, 2)
        .with_lines(PHASE22_AK4524_CDTI, PHASE22_AK4524_CCLK)
        .with_chip_select(PHASE22_AK4524_CS)
        .with_cif(true)
        .with_add_flags(PHASE22_AK4524_EXTRA)
}

pub fn init<R: RegisterSpace, P: Platform>(chip: &Chip<R, P>, codecs: &mut CodecSet) {
    let id = codecs.insert(CodecRole::Front, codec());
    if let Some(codec) = codecs.get_mut(id) {
        codec.init(chip);
    }
    debug!("[ENVY24HT] Phase 22 codec ready");
}

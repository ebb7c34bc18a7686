// ============================================================================
// src/interrupt.rs - Primary Interrupt Filter
// ============================================================================
//!
//! 割り込みの一次処理。
//!
//! ロックを取らず、ポーリングもしない。触るのはレジスタとアトミックだけ。
//! 二次処理 (deferred) が必要になることはない。
//!
//! FIFO アンダーランは一度発生すると割り込み源をマスクする。
//! マスクはカードが動いている間ずっと残る (`Engine::start` も解除しない)。

#[cfg(feature = "stats")]
use core::sync::atomic::{AtomicU64, Ordering};

use alloc::sync::Arc;

#[cfg(feature = "verbose_logging")]
use log::trace;

use crate::chip::Chip;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

/// 割り込みカウンタのスナップショット
#[cfg(feature = "stats")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptStats {
    /// ステータスが 0 でなかった割り込み
    pub interrupts: u64,
    pub underruns: u64,
    /// 再生ループ 1 周ごとの割り込み
    pub periods: u64,
}

#[cfg(feature = "stats")]
#[derive(Default)]
struct Counters {
    interrupts: AtomicU64,
    underruns: AtomicU64,
    periods: AtomicU64,
}

/// Interrupt filter for one card.
pub struct InterruptFilter<R, P> {
    chip: Arc<Chip<R, P>>,
    #[cfg(feature = "stats")]
    counters: Counters,
}

impl<R: RegisterSpace, P: Platform> InterruptFilter<R, P> {
    pub fn new(chip: Arc<Chip<R, P>>) -> Self {
        Self {
            chip,
            #[cfg(feature = "stats")]
            counters: Counters::default(),
        }
    }

    /// Acknowledge the card's interrupt sources.
    ///
    /// Returns whether secondary handling is needed, which is never the case.
    pub fn filter(&self) -> bool {
        let ccs = self.chip.ccs();
        let status = ccs.read8(CCS_INTR_STATUS);
        if status == 0 {
            return false;
        }
        ccs.write8(CCS_INTR_STATUS, status);

        #[cfg(feature = "stats")]
        self.counters.interrupts.fetch_add(1, Ordering::Relaxed);

        if status & CCS_INTR_PLAYREC != 0 {
            self.service_dma();
        }
        false
    }

    fn service_dma(&self) {
        let mt = self.chip.mt();
        let dma = mt.read8(MT_INTR_STATUS);

        if dma & MT_DMA_FIFO != 0 {
            let underrun = mt.read8(MT_DMA_UNDERRUN);
            mt.set_bits8(MT_INTR_STATUS, MT_DMA_FIFO);
            mt.write8(MT_DMA_UNDERRUN, underrun);
            // 再発しないようマスクしたままにする
            mt.set_bits8(MT_INTR_MASK, MT_DMA_FIFO_MASK);

            #[cfg(feature = "stats")]
            self.counters.underruns.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "verbose_logging")]
            trace!("[ENVY24HT] FIFO underrun {:#04x}", underrun);
        }

        mt.write8(MT_INTR_STATUS, dma);

        if dma & MT_DMA_PDMA0 != 0 {
            self.chip.platform().take_timestamp(true);

            #[cfg(feature = "stats")]
            self.counters.periods.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> InterruptStats {
        InterruptStats {
            interrupts: self.counters.interrupts.load(Ordering::Relaxed),
            underruns: self.counters.underruns.load(Ordering::Relaxed),
            periods: self.counters.periods.load(Ordering::Relaxed),
        }
    }
}

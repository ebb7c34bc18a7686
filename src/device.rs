// ============================================================================
// src/device.rs - Device Instance and Public API
// ============================================================================
//!
//! カード 1 枚分のドライバインスタンス。
//!
//! - コマンド経路 (制御変更、開始/停止、レート変更、スリープ復帰) は
//!   `spin::Mutex` の内側で直列化される
//! - 割り込み経路は `InterruptFilter` だけを使い、ロックを取らない

#![allow(dead_code)]

use alloc::sync::Arc;

use log::{info, warn};
use spin::Mutex;

use crate::card::CardContext;
use crate::chip::Chip;
use crate::config::DriverConfig;
use crate::controls::{ControlKind, ControlSurface};
use crate::engine::Engine;
use crate::error::{Envy24Error, Envy24Result, Resource};
use crate::interrupt::InterruptFilter;
use crate::mmio::{MmioRegion, RegisterSpace};
use crate::platform::Platform;
use crate::regs::*;
use crate::types::Variant;

/// One bound Envy24HT card.
pub struct Envy24Device<R, P> {
    chip: Arc<Chip<R, P>>,
    card: Mutex<CardContext<R, P>>,
    engine: Mutex<Engine<R, P>>,
    filter: InterruptFilter<R, P>,
}

impl<P: Platform> Envy24Device<MmioRegion, P> {
    /// Bind to a card whose two register BARs are already mapped.
    ///
    /// # Safety
    ///
    /// Both `(base, len)` pairs must describe live device register mappings
    /// that outlive the returned device.
    pub unsafe fn probe_mmio(
        ccs: (usize, u32),
        mt: (usize, u32),
        platform: P,
        config: DriverConfig,
    ) -> Envy24Result<Self> {
        if ccs.0 == 0 || ccs.1 < CCS_REGION_SIZE || mt.0 == 0 || mt.1 < MT_REGION_SIZE {
            warn!(
                "[ENVY24HT] Register map too small: CCS {:#x}+{:#x}, MT {:#x}+{:#x}",
                ccs.0, ccs.1, mt.0, mt.1
            );
            return Err(Envy24Error::ResourceExhausted(Resource::RegisterMap));
        }
        // SAFETY: 呼び出し側の契約
        let (ccs, mt) = unsafe { (MmioRegion::new(ccs.0, ccs.1), MmioRegion::new(mt.0, mt.1)) };
        Self::probe(Arc::new(Chip::new(ccs, mt, platform, config)))
    }
}

impl<R: RegisterSpace, P: Platform> Envy24Device<R, P> {
    /// Bring the card up and prepare its DMA engine.
    pub fn probe(chip: Arc<Chip<R, P>>) -> Envy24Result<Self> {
        let card = CardContext::bring_up(chip.clone())?;
        let mut engine = Engine::new(&card);
        if let Err(err) = engine.init_hardware() {
            chip.ccs().set_bits8(CCS_INTR_MASK, CCS_INTR_PLAYREC);
            warn!("[ENVY24HT] Probe failed after bring-up: {}", err);
            return Err(err);
        }

        info!("[ENVY24HT] {} ready", card.variant());
        Ok(Self {
            filter: engine.interrupt_filter(),
            chip,
            card: Mutex::new(card),
            engine: Mutex::new(engine),
        })
    }

    /// Interrupt entry point. Never blocks.
    #[inline]
    pub fn handle_interrupt(&self) -> bool {
        self.filter.filter()
    }

    pub fn filter(&self) -> &InterruptFilter<R, P> {
        &self.filter
    }

    pub fn chip(&self) -> &Arc<Chip<R, P>> {
        &self.chip
    }

    pub fn variant(&self) -> Variant {
        self.card.lock().variant()
    }

    /// Access the card context
    pub fn with_card<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut CardContext<R, P>) -> T,
    {
        f(&mut self.card.lock())
    }

    /// Access the engine
    pub fn with_engine<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Engine<R, P>) -> T,
    {
        f(&mut self.engine.lock())
    }

    pub fn publish_controls<S: ControlSurface>(&self, surface: &mut S) -> Envy24Result<()> {
        self.card.lock().publish_controls(surface)
    }

    pub fn set_control(&self, kind: ControlKind, control_id: u32, old: i32, new: i32) {
        self.card.lock().apply_value(kind, control_id, old, new);
    }

    pub fn start(&self) -> Envy24Result<()> {
        self.engine.lock().start()
    }

    pub fn stop(&self) {
        self.engine.lock().stop();
    }

    pub fn change_format(&self, rate: Option<u32>) {
        self.engine.lock().change_format(rate);
    }

    pub fn current_sample_frame(&self) -> u32 {
        self.engine.lock().current_sample_frame()
    }

    /// Re-run bring-up after wake and rebuild the engine.
    ///
    /// The sample rate in effect before sleep is restored.
    pub fn resume(&self) -> Envy24Result<()> {
        let mut card = self.card.lock();
        let mut engine = self.engine.lock();
        let rate = engine.sample_rate();

        engine.free_hardware();
        card.resume()?;

        *engine = Engine::new(&card);
        engine.init_hardware()?;
        if rate != 0 && rate != engine.sample_rate() {
            engine.change_format(Some(rate));
        }
        Ok(())
    }

    /// Stop DMA, release buffers and mask the card interrupt.
    pub fn shutdown(&self) {
        self.engine.lock().free_hardware();
        self.chip.ccs().set_bits8(CCS_INTR_MASK, CCS_INTR_PLAYREC);
        info!("[ENVY24HT] Shut down");
    }
}

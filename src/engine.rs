// ============================================================================
// src/engine.rs - DMA Streaming Engine
// ============================================================================
//!
//! # ストリーミングエンジン
//!
//! 再生 (PDMA0)、録音 (RDMA0)、S/PDIF ミラー (PDMA4) の 3 チャネルを管理する。
//!
//! ```text
//! Unprepared --init_hardware--> Stopped <--start/stop--> Started
//!                                  ^                        |
//!                                  +---- change_format -----+ (状態は変わらない)
//! ```
//!
//! 長さレジスタには「32-bit ワード数 - 1」を書く。再生チャネルだけ
//! 24 bit 幅なので 16 + 8 bit に分けて書き込む。

#![allow(dead_code)]

use alloc::sync::Arc;

use log::{debug, info, warn};

use crate::boards::ap192;
use crate::card::CardContext;
use crate::chip::Chip;
use crate::config::CAPTURE_CHANNELS;
use crate::convert;
use crate::dma::DmaBuffer;
use crate::error::{Envy24Error, Envy24Result, Resource};
use crate::interrupt::InterruptFilter;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;
use crate::types::Variant;

/// フォーマット未指定時のレート
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// 該当なしのときの MT_SAMPLERATE 値 (44.1 kHz)
const RATE_BITS_FALLBACK: u8 = 0x08;

/// MT_SAMPLERATE のレート → ビットパターン
static RATE_BITS: [(u32, u8); 15] = [
    (8_000, 6),
    (9_600, 3),
    (11_025, 10),
    (12_000, 2),
    (16_000, 5),
    (22_050, 9),
    (24_000, 1),
    (32_000, 4),
    (44_100, 8),
    (48_000, 0),
    (64_000, 15),
    (88_200, 11),
    (96_000, 7),
    (176_400, 12),
    (192_000, 14),
];

/// Bit pattern for the main rate register.
pub fn rate_bits(rate: u32) -> u8 {
    RATE_BITS
        .iter()
        .find(|(r, _)| *r == rate)
        .map(|(_, bits)| *bits)
        .unwrap_or(RATE_BITS_FALLBACK)
}

/// Streaming state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// バッファ未確保
    Unprepared,
    Stopped,
    Started,
}

/// 3 本の DMA バッファ
///
/// フィールド順は解放順の逆 (capture → spdif → playback の順に drop)。
#[derive(Debug)]
pub struct StreamBuffers {
    pub playback: DmaBuffer,
    pub spdif: DmaBuffer,
    pub capture: DmaBuffer,
}

impl StreamBuffers {
    fn allocate<P: Platform>(platform: &P, playback: u32, capture: u32) -> Envy24Result<Self> {
        let out = DmaBuffer::allocate(platform, playback, Resource::PlaybackBuffer)?;
        let spdif = DmaBuffer::allocate(platform, capture, Resource::SpdifBuffer)?;
        let input = DmaBuffer::allocate(platform, capture, Resource::CaptureBuffer)?;
        Ok(Self {
            playback: out,
            spdif,
            capture: input,
        })
    }
}

// ============================================================================
// Engine
// ============================================================================

/// DMA engine for one card.
pub struct Engine<R, P> {
    chip: Arc<Chip<R, P>>,
    variant: Variant,
    channels: u32,
    has_spdif: bool,
    playback_bytes: u32,
    capture_bytes: u32,
    buffers: Option<StreamBuffers>,
    sample_rate: u32,
    spdif_rate_supported: bool,
    state: EngineState,
}

impl<R: RegisterSpace, P: Platform> Engine<R, P> {
    pub fn new(card: &CardContext<R, P>) -> Self {
        let specific = card.specific();
        Self {
            chip: card.chip().clone(),
            variant: specific.variant,
            channels: specific.channels,
            has_spdif: specific.has_spdif,
            playback_bytes: card.playback_bytes,
            capture_bytes: card.capture_bytes,
            buffers: None,
            sample_rate: 0,
            spdif_rate_supported: false,
            state: EngineState::Unprepared,
        }
    }

    /// Allocate the stream buffers and program their DMA addresses.
    ///
    /// On failure nothing stays allocated and no address register is touched.
    pub fn init_hardware(&mut self) -> Envy24Result<()> {
        if self.state == EngineState::Started {
            return Err(Envy24Error::InvalidState);
        }
        // 再初期化なら古いバッファを先に返す
        self.buffers = None;

        let buffers = match StreamBuffers::allocate(
            self.chip.platform(),
            self.playback_bytes,
            self.capture_bytes,
        ) {
            Ok(buffers) => buffers,
            Err(err) => {
                warn!("[ENVY24HT] Stream buffer setup failed: {}", err);
                self.state = EngineState::Unprepared;
                return Err(err);
            }
        };

        let mt = self.chip.mt();
        mt.write32(MT_DMAI_PB_ADDRESS, buffers.playback.phys());
        mt.write32(MT_RDMA0_ADDRESS, buffers.capture.phys());
        mt.write32(MT_PDMA4_ADDRESS, buffers.spdif.phys());
        debug!("[ENVY24HT] Buffers: {:?}", buffers);

        mt.write8(MT_SAMPLERATE, RATE_BITS_FALLBACK);
        mt.write8(MT_DMAI_BURSTSIZE, ((8 - self.channels.min(8)) / 2) as u8);

        self.buffers = Some(buffers);
        self.state = EngineState::Stopped;

        let rate = self.chip.config().initial_sample_rate;
        self.change_format(Some(rate));
        info!(
            "[ENVY24HT] Engine ready: {} channels at {} Hz, offset {} frames",
            self.channels,
            self.sample_rate,
            self.sample_offset()
        );
        Ok(())
    }

    /// Stop streaming and release the buffers.
    pub fn free_hardware(&mut self) {
        if self.state == EngineState::Started {
            self.stop();
        }
        self.buffers = None;
        self.state = EngineState::Unprepared;
    }

    /// Start playback, capture and (when the rate allows) the S/PDIF mirror together.
    pub fn start(&mut self) -> Envy24Result<()> {
        let buffers = self.buffers.as_mut().ok_or(Envy24Error::InvalidState)?;
        let chip = &self.chip;
        let mt = chip.mt();

        mt.clear_bits8(
            MT_DMA_CONTROL,
            MT_PDMA0_START | MT_PDMA4_START | MT_RDMA0_START | MT_RDMA1_START,
        );
        mt.clear_bits8(MT_INTR_MASK, MT_PDMA0_MASK);
        // ステータスは 1 を書いてクリア
        mt.set_bits8(
            MT_INTR_STATUS,
            MT_DMA_FIFO | MT_DMA_PDMA0 | MT_DMA_PDMA4 | MT_DMA_RDMA0 | MT_DMA_RDMA1,
        );

        buffers.spdif.zero();
        chip.platform().clear_sample_buffers();

        let words = self.playback_bytes / 4 - 1;
        mt.write16(MT_DMAI_PB_LENGTH, words as u16);
        mt.write8(MT_DMAI_PB_LENGTH + 2, (words >> 16) as u8);
        mt.write16(MT_DMAI_INTLEN, words as u16);
        mt.write8(MT_DMAI_INTLEN + 2, (words >> 16) as u8);

        let rec_words = (self.capture_bytes / 4 - 1) as u16;
        mt.write16(MT_RDMA0_LENGTH, rec_words);
        mt.write16(MT_RDMA0_INTLEN, rec_words);

        let mut start = MT_PDMA0_START | MT_RDMA0_START;
        if self.spdif_rate_supported && self.has_spdif {
            mt.write16(MT_PDMA4_LENGTH, rec_words);
            start |= MT_PDMA4_START;
        }

        chip.platform().take_timestamp(false);
        mt.set_bits8(MT_DMA_CONTROL, start);

        self.state = EngineState::Started;
        debug!("[ENVY24HT] DMA started (control {:#04x})", start);
        Ok(())
    }

    /// Stop all DMA channels and mask their interrupt sources.
    pub fn stop(&mut self) {
        let mt = self.chip.mt();

        // 再生側
        mt.clear_bits8(MT_DMA_CONTROL, MT_PDMA0_START | MT_PDMA4_START);
        mt.set_bits8(
            MT_INTR_MASK,
            MT_DMA_FIFO_MASK | MT_PDMA0_MASK | MT_PDMA4_MASK,
        );

        // 録音側
        mt.clear_bits8(MT_DMA_CONTROL, MT_RDMA0_START | MT_RDMA1_START);
        mt.set_bits8(MT_INTR_MASK, MT_RDMA0_MASK | MT_RDMA1_MASK);

        if self.state == EngineState::Started {
            self.state = EngineState::Stopped;
        }
        debug!("[ENVY24HT] DMA stopped");
    }

    /// Reprogram the sample rate; `None` selects 44.1 kHz.
    pub fn change_format(&mut self, rate: Option<u32>) {
        let rate = rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        let bits = rate_bits(rate);
        self.chip.mt().write8(MT_SAMPLERATE, bits);

        self.spdif_rate_supported = self.chip.program_spdif_rate(rate);
        if self.variant == Variant::Ap192 {
            ap192::set_rate(&self.chip, rate);
        }
        self.sample_rate = rate;

        debug!(
            "[ENVY24HT] Rate {} Hz (bits {:#04x}), S/PDIF {}",
            rate,
            bits,
            if self.spdif_rate_supported { "on" } else { "off" }
        );
    }

    /// Frames the playback DMA has consumed since the buffer start.
    ///
    /// Reads the live address register, so the result can lag but never lead.
    pub fn current_sample_frame(&self) -> u32 {
        let Some(buffers) = self.buffers.as_ref() else {
            return 0;
        };
        let addr = self.chip.mt().read32(MT_DMAI_PB_ADDRESS);
        let offset = addr.wrapping_sub(buffers.playback.phys());
        if offset >= self.playback_bytes {
            // バッファ外を指しているときは先頭扱い
            return 0;
        }
        offset / (self.channels * 4)
    }

    // ========================================================================
    // Sample conversion
    // ========================================================================

    /// Clip host samples into the playback buffer and refresh the S/PDIF mirror.
    pub fn clip_output(&mut self, mix: &[f32], first_frame: usize, frames: usize) {
        let channels = self.channels as usize;
        if let Some(StreamBuffers {
            playback, spdif, ..
        }) = self.buffers.as_mut()
        {
            convert::clip_output_samples(
                mix,
                playback.as_mut_slice(),
                Some(spdif.as_mut_slice()),
                first_frame,
                frames,
                channels,
            );
        }
    }

    /// Convert captured samples into `dest`.
    pub fn convert_input(&self, dest: &mut [f32], first_frame: usize, frames: usize) {
        if let Some(buffers) = self.buffers.as_ref() {
            convert::convert_input_samples(
                buffers.capture.as_slice(),
                dest,
                first_frame,
                frames,
                CAPTURE_CHANNELS as usize,
            );
        }
    }

    /// Zero a played range, including its S/PDIF mirror.
    pub fn erase_output(&mut self, first_frame: usize, frames: usize) {
        let channels = self.channels as usize;
        if let Some(StreamBuffers {
            playback, spdif, ..
        }) = self.buffers.as_mut()
        {
            convert::erase_output_samples(
                playback.as_mut_slice(),
                Some(spdif.as_mut_slice()),
                first_frame,
                frames,
                channels,
            );
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Interrupt filter sharing this engine's register regions.
    pub fn interrupt_filter(&self) -> InterruptFilter<R, P> {
        InterruptFilter::new(self.chip.clone())
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn spdif_rate_supported(&self) -> bool {
        self.spdif_rate_supported
    }

    #[inline]
    pub fn sample_offset(&self) -> u32 {
        self.chip.config().sample_offset
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn buffers(&self) -> Option<&StreamBuffers> {
        self.buffers.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{chip_with_id, FakeChip, FakePlatform, FakeRegion};
    use crate::types::subvendor;
    use alloc::vec;
    use core::sync::atomic::Ordering;

    fn engine_for(id: u32) -> (Arc<FakeChip>, Engine<FakeRegion, FakePlatform>) {
        let chip = chip_with_id(id);
        let card = CardContext::bring_up(chip.clone()).unwrap();
        let engine = Engine::new(&card);
        chip.mt().clear_trace();
        (chip, engine)
    }

    const ALL_STARTS: u8 = MT_PDMA0_START | MT_PDMA4_START | MT_RDMA0_START | MT_RDMA1_START;

    #[test]
    fn test_rate_table() {
        assert_eq!(rate_bits(44_100), 8);
        assert_eq!(rate_bits(22_050), 9);
        assert_eq!(rate_bits(192_000), 14);
        assert_eq!(rate_bits(12_345), 0x08);
    }

    #[test]
    fn test_init_programs_addresses_and_burst() {
        let (chip, mut engine) = engine_for(subvendor::AUREON_SKY);
        engine.init_hardware().unwrap();

        let buffers = engine.buffers().unwrap();
        assert_eq!(buffers.playback.bytes(), 16384 * 6 * 4);
        assert_eq!(buffers.spdif.bytes(), 16384 * 2 * 4);
        assert_eq!(buffers.capture.bytes(), 16384 * 2 * 4);

        let mt = chip.mt();
        assert_eq!(mt.writes_to(MT_DMAI_PB_ADDRESS), [buffers.playback.phys()]);
        assert_eq!(mt.writes_to(MT_RDMA0_ADDRESS), [buffers.capture.phys()]);
        assert_eq!(mt.writes_to(MT_PDMA4_ADDRESS), [buffers.spdif.phys()]);
        assert_eq!(mt.writes_to(MT_DMAI_BURSTSIZE), [1]);
        assert_eq!(mt.writes_to(MT_SAMPLERATE)[0], 0x08);

        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(engine.sample_rate(), 44_100);
        assert_eq!(engine.sample_offset(), 32);
        assert!(engine.spdif_rate_supported());
    }

    #[test]
    fn test_failed_translation_releases_everything() {
        let (chip, mut engine) = engine_for(subvendor::JULIA);
        // 再生バッファだけ変換に成功する
        chip.platform().translations_left.store(1, Ordering::Relaxed);

        assert_eq!(engine.init_hardware(), Err(Envy24Error::AddressNotDmaVisible));
        assert!(engine.buffers().is_none());
        assert_eq!(engine.state(), EngineState::Unprepared);
        assert!(chip.mt().writes().is_empty());
        assert_eq!(engine.start(), Err(Envy24Error::InvalidState));
    }

    #[test]
    fn test_format_change_44100_and_22050() {
        let (chip, mut engine) = engine_for(subvendor::AUREON_SKY);
        engine.change_format(Some(44_100));
        assert_eq!(chip.mt().peek8(MT_SAMPLERATE), 8);
        assert_eq!(chip.mt().peek16(MT_SPDIF_TRANSMIT) >> MT_SPDIF_RATE_SHIFT, 0);
        assert!(engine.spdif_rate_supported());

        chip.mt().clear_trace();
        engine.change_format(Some(22_050));
        assert_eq!(chip.mt().peek8(MT_SAMPLERATE), 9);
        assert!(!engine.spdif_rate_supported());
        assert!(chip.mt().writes_to(MT_SPDIF_TRANSMIT).is_empty());

        engine.change_format(None);
        assert_eq!(engine.sample_rate(), 44_100);
    }

    #[test]
    fn test_start_programs_lengths() {
        let (chip, mut engine) = engine_for(subvendor::AUREON_SKY);
        engine.init_hardware().unwrap();
        chip.mt().clear_trace();
        engine.start().unwrap();

        let mt = chip.mt();
        // 16384 * 6 - 1 = 0x17FFF
        assert_eq!(mt.writes_to(MT_DMAI_PB_LENGTH), [0x7FFF]);
        assert_eq!(mt.writes_to(MT_DMAI_PB_LENGTH + 2), [0x01]);
        assert_eq!(mt.writes_to(MT_DMAI_INTLEN), [0x7FFF]);
        assert_eq!(mt.writes_to(MT_RDMA0_LENGTH), [0x7FFF]);
        assert_eq!(mt.writes_to(MT_PDMA4_LENGTH), [0x7FFF]);

        let control = mt.peek8(MT_DMA_CONTROL);
        assert_eq!(control, MT_PDMA0_START | MT_RDMA0_START | MT_PDMA4_START);
        assert_eq!(mt.peek8(MT_INTR_MASK) & MT_PDMA0_MASK, 0);
        assert_eq!(chip.platform().timestamps(), [false]);
        assert_eq!(chip.platform().clears.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_start_without_spdif_rate() {
        let (chip, mut engine) = engine_for(subvendor::AUREON_SKY);
        engine.init_hardware().unwrap();
        engine.change_format(Some(22_050));
        chip.mt().clear_trace();
        engine.start().unwrap();
        assert_eq!(chip.mt().peek8(MT_DMA_CONTROL) & MT_PDMA4_START, 0);
        assert!(chip.mt().writes_to(MT_PDMA4_LENGTH).is_empty());
    }

    #[test]
    fn test_start_then_stop_leaves_everything_off() {
        for rate in [44_100, 22_050] {
            let (chip, mut engine) = engine_for(subvendor::AUREON_SPACE);
            engine.init_hardware().unwrap();
            engine.change_format(Some(rate));
            engine.start().unwrap();
            engine.stop();

            let mt = chip.mt();
            assert_eq!(mt.peek8(MT_DMA_CONTROL) & ALL_STARTS, 0);
            let masked = MT_DMA_FIFO_MASK
                | MT_PDMA0_MASK
                | MT_PDMA4_MASK
                | MT_RDMA0_MASK
                | MT_RDMA1_MASK;
            assert_eq!(mt.peek8(MT_INTR_MASK) & masked, masked);
            assert_eq!(engine.state(), EngineState::Stopped);
        }
    }

    #[test]
    fn test_underrun_mask_survives_restart() {
        let (chip, mut engine) = engine_for(subvendor::AUREON_SKY);
        engine.init_hardware().unwrap();
        engine.start().unwrap();

        chip.ccs().poke8(CCS_INTR_STATUS, CCS_INTR_PLAYREC);
        chip.mt().poke8(MT_INTR_STATUS, MT_DMA_FIFO);
        engine.interrupt_filter().filter();

        engine.stop();
        engine.start().unwrap();
        assert_eq!(
            chip.mt().peek8(MT_INTR_MASK) & MT_DMA_FIFO_MASK,
            MT_DMA_FIFO_MASK
        );
    }

    #[test]
    fn test_position_tracks_dma_address() {
        let (chip, mut engine) = engine_for(subvendor::REVOLUTION71);
        engine.init_hardware().unwrap();
        engine.start().unwrap();
        let base = engine.buffers().unwrap().playback.phys();
        let frame_bytes = 8 * 4;

        assert_eq!(engine.current_sample_frame(), 0);

        let mut last = 0;
        for frame in [1u32, 100, 4096, 16383] {
            chip.mt().poke32(MT_DMAI_PB_ADDRESS, base + frame * frame_bytes + 3);
            let now = engine.current_sample_frame();
            assert_eq!(now, frame);
            assert!(now >= last);
            last = now;
        }

        // 折り返し
        chip.mt().poke32(MT_DMAI_PB_ADDRESS, base);
        assert_eq!(engine.current_sample_frame(), 0);
        // バッファ外
        chip.mt().poke32(MT_DMAI_PB_ADDRESS, base.wrapping_sub(4));
        assert_eq!(engine.current_sample_frame(), 0);
    }

    #[test]
    fn test_ap192_format_change_switches_mode() {
        let (chip, mut engine) = engine_for(subvendor::AUDIOPHILE192);
        engine.change_format(Some(192_000));
        assert_ne!(chip.mt().peek8(MT_I2S_FORMAT) & MT_CLOCK_128X, 0);
        engine.change_format(Some(48_000));
        assert_eq!(chip.mt().peek8(MT_I2S_FORMAT) & MT_CLOCK_128X, 0);
    }

    #[test]
    fn test_clip_and_erase_reach_buffers() {
        let (_chip, mut engine) = engine_for(subvendor::JULIA);
        engine.init_hardware().unwrap();

        let mix = vec![0.5f32; 8 * 2];
        engine.clip_output(&mix, 2, 4);
        {
            let buffers = engine.buffers().unwrap();
            let expected = convert::clip_sample(0.5);
            assert_eq!(buffers.playback.as_slice()[4], expected);
            assert_eq!(buffers.spdif.as_slice()[4], expected);
            assert_eq!(buffers.playback.as_slice()[3], 0);
        }

        engine.erase_output(2, 4);
        let buffers = engine.buffers().unwrap();
        assert!(buffers.playback.as_slice()[..16].iter().all(|&s| s == 0));
        assert!(buffers.spdif.as_slice()[..16].iter().all(|&s| s == 0));

        let mut dest = [1.0f32; 4];
        engine.convert_input(&mut dest, 0, 2);
        assert_eq!(dest, [0.0; 4]);
    }

    #[test]
    fn test_free_hardware_stops_first() {
        let (chip, mut engine) = engine_for(subvendor::PHASE22);
        engine.init_hardware().unwrap();
        engine.start().unwrap();
        engine.free_hardware();
        assert_eq!(chip.mt().peek8(MT_DMA_CONTROL) & ALL_STARTS, 0);
        assert!(engine.buffers().is_none());
        assert_eq!(engine.state(), EngineState::Unprepared);
    }
}

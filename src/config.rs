// ============================================================================
// src/config.rs - Driver Configuration
// ============================================================================
//!
//! ドライバの調整可能パラメータ。既定値はハードウェアで実績のある値。

/// 1 バッファあたりのフレーム数 (固定)
pub const FRAME_COUNT: u32 = 16384;

/// ハードウェアのサンプル幅 (bytes)
pub const SAMPLE_BYTES: u32 = 4;

/// 録音は常にステレオ
pub const CAPTURE_CHANNELS: u32 = 2;

/// DMA バッファのアライメント
pub const DMA_BUFFER_ALIGN: usize = 512;

/// Driver tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// 2 線式バスのビジー待ちポーリング回数上限
    pub i2c_poll_limit: u32,
    /// ポーリング 1 回あたりの遅延 (µs)
    pub i2c_poll_delay_us: u32,
    /// EEPROM 読み出し前に入れるダミーステータス読み出し回数
    pub eeprom_read_spins: u32,
    /// エンジン初期化時のサンプルレート
    pub initial_sample_rate: u32,
    /// ホストに報告するサンプルオフセット (frames)
    pub sample_offset: u32,
    /// バッファあたりのフレーム数
    pub frame_count: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            i2c_poll_limit: 10_000,
            i2c_poll_delay_us: 32,
            eeprom_read_spins: 0,
            initial_sample_rate: 44_100,
            sample_offset: 32,
            frame_count: FRAME_COUNT,
        }
    }
}

impl DriverConfig {
    /// 再生バッファのバイト数
    pub const fn playback_bytes(&self, channels: u32) -> u32 {
        self.frame_count * channels * SAMPLE_BYTES
    }

    /// 録音 (および S/PDIF ミラー) バッファのバイト数
    pub const fn capture_bytes(&self) -> u32 {
        self.frame_count * CAPTURE_CHANNELS * SAMPLE_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_geometry() {
        let config = DriverConfig::default();
        assert_eq!(config.playback_bytes(6), 16384 * 6 * 4);
        assert_eq!(config.playback_bytes(2), config.capture_bytes());
        assert_eq!(config.capture_bytes(), 131072);
    }
}

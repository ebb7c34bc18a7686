//! 統一エラーハンドリングモジュール
//!
//! ドライバ全体で使用するエラー型。
//! 致命的なものはブリングアップ失敗として呼び出し元に返し、
//! バスタイムアウトはソフト障害として記録だけ行う。

use core::fmt;

/// Driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envy24Error {
    /// 識別子がテーブルにない
    UnsupportedHardware {
        /// EEPROM から読んだ生のサブベンダ ID
        subvendor: u32,
    },
    /// ブート EEPROM が存在しない (識別不能)
    NoEeprom,
    /// 資源確保に失敗
    ResourceExhausted(Resource),
    /// 確保したバッファが 32-bit DMA 範囲外
    AddressNotDmaVisible,
    /// 状態遷移が不正
    InvalidState,
    /// ホストが制御の公開を拒否した
    ControlRejected {
        control_id: u32,
    },
}

/// 確保に失敗した資源の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    PlaybackBuffer,
    SpdifBuffer,
    CaptureBuffer,
    RegisterMap,
}

impl fmt::Display for Envy24Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Envy24Error::UnsupportedHardware { subvendor } => write!(
                f,
                "unsupported Envy24HT card (subvendor id {:#010x})",
                subvendor
            ),
            Envy24Error::NoEeprom => write!(f, "no boot EEPROM, cannot identify card"),
            Envy24Error::ResourceExhausted(resource) => {
                write!(f, "failed to allocate {}", resource)
            }
            Envy24Error::AddressNotDmaVisible => {
                write!(f, "buffer is outside the 32-bit DMA window")
            }
            Envy24Error::InvalidState => write!(f, "invalid driver state"),
            Envy24Error::ControlRejected { control_id } => {
                write!(f, "host rejected control {}", control_id)
            }
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::PlaybackBuffer => "playback buffer",
            Resource::SpdifBuffer => "S/PDIF buffer",
            Resource::CaptureBuffer => "capture buffer",
            Resource::RegisterMap => "register map",
        };
        f.write_str(name)
    }
}

/// Result type alias
pub type Envy24Result<T> = Result<T, Envy24Error>;

/// 2 線式バスのビジー待ちタイムアウト (ソフト障害)
///
/// 処理は継続される。直後の読み出し値は古い可能性がある。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusTimeout {
    /// タイムアウト時点のステータスレジスタ値
    pub status: u8,
}

impl fmt::Display for BusTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I2C bus stayed busy (status {:#04x})", self.status)
    }
}

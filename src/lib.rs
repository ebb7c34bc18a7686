// ============================================================================
// src/lib.rs - Envy24HT Driver Core
// ============================================================================
//!
//! # Envy24HT (VT1724) オーディオドライバ
//!
//! VIA Envy24HT を載せた各社ボードの制御面とデータ面。
//!
//! ## 構成
//! ```text
//! Envy24Device ─┬─ CardContext   (識別、codec 初期化、制御ディスクリプタ)
//!               ├─ Engine        (DMA バッファ、開始/停止、レート、変換)
//!               └─ InterruptFilter (ロックなしの一次割り込み処理)
//!                      │
//!                  Arc<Chip> ── CCS / MT レジスタ領域 + Platform
//! ```
//!
//! ホスト (OS のオーディオフレームワーク) は [`Platform`] と
//! [`ControlSurface`] を実装してドライバに渡す。

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod akm;
pub mod boards;
pub mod card;
pub mod chip;
pub mod config;
pub mod controls;
pub mod convert;
pub mod device;
pub mod dma;
pub mod engine;
pub mod error;
pub mod i2c;
pub mod interrupt;
pub mod mmio;
pub mod parms;
pub mod platform;
pub mod regs;
pub mod spdif;
pub mod spi;
pub mod types;

#[cfg(test)]
mod testing;

pub use card::{BringUpState, CardContext};
pub use chip::Chip;
pub use config::DriverConfig;
pub use controls::{ControlKind, ControlSurface};
pub use device::Envy24Device;
pub use engine::{Engine, EngineState};
pub use error::{BusTimeout, Envy24Error, Envy24Result, Resource};
pub use interrupt::InterruptFilter;
#[cfg(feature = "stats")]
pub use interrupt::InterruptStats;
pub use mmio::{MmioRegion, RegisterSpace};
pub use parms::ControlDescriptor;
pub use platform::Platform;
pub use types::Variant;

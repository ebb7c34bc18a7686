// ============================================================================
// src/platform.rs - Host Services
// ============================================================================
//!
//! ドライバコアがホスト側 (OS のオーディオフレームワーク) から受け取るサービス。

/// ホストが提供するサービス
///
/// 遅延、DMA アドレス変換、タイムスタンプ記録をまとめたもの。
/// 割り込みコンテキストからも呼ばれるので `take_timestamp` はブロックしないこと。
pub trait Platform: Send + Sync {
    /// マイクロ秒単位のビジーウェイト
    fn delay_us(&self, us: u32);

    /// 仮想アドレスをデバイスから見える 32-bit 物理アドレスへ変換
    ///
    /// 32-bit で表現できない場合は `None`。
    fn virt_to_phys(&self, virt: usize) -> Option<u32>;

    /// 再生ループのタイムスタンプを記録する
    ///
    /// `increment_loop == false` はループカウンタを進めずに t=0 を確定させる。
    fn take_timestamp(&self, increment_loop: bool);

    /// ホスト側の消去ヘッドなどサンプルバッファ周りの状態をリセットする
    fn clear_sample_buffers(&self) {}
}

/// Identity-mapped platform helper for kernels that run with a 1:1 low-memory map.
pub fn identity_phys(virt: usize) -> Option<u32> {
    u32::try_from(virt).ok()
}

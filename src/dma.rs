// ============================================================================
// src/dma.rs - DMA Sample Buffers
// ============================================================================
//!
//! # DMA サンプルバッファ
//!
//! 再生 / 録音 / S/PDIF の 3 本のバッファ。
//!
//! - 512 バイト境界、ゼロ初期化で確保
//! - デバイスから見える 32-bit 物理アドレスを確保時に確定
//! - Drop で解放するので、途中で失敗しても先に確保した分は逆順に返る

use alloc::alloc::{Layout, alloc_zeroed, dealloc};
use core::ptr::NonNull;

use crate::config::DMA_BUFFER_ALIGN;
use crate::error::{Envy24Error, Envy24Result, Resource};
use crate::platform::Platform;

/// 32-bit サンプルの DMA バッファ
pub struct DmaBuffer {
    ptr: NonNull<i32>,
    /// デバイス側アドレス
    phys: u32,
    layout: Layout,
    /// ログ / エラー用の種別
    kind: Resource,
}

// SAFETY: バッファは所有者 (Engine) からのみ触られる
unsafe impl Send for DmaBuffer {}

impl DmaBuffer {
    /// Allocate `bytes` zeroed bytes and resolve their device address.
    pub fn allocate<P: Platform>(platform: &P, bytes: u32, kind: Resource) -> Envy24Result<Self> {
        let layout = Layout::from_size_align(bytes.max(4) as usize, DMA_BUFFER_ALIGN)
            .map_err(|_| Envy24Error::ResourceExhausted(kind))?;

        // SAFETY: layout のサイズは 0 ではない
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut i32).ok_or(Envy24Error::ResourceExhausted(kind))?;

        let mut buffer = Self {
            ptr,
            phys: 0,
            layout,
            kind,
        };
        // 変換に失敗したら buffer の Drop で解放される
        buffer.phys = platform
            .virt_to_phys(raw as usize)
            .ok_or(Envy24Error::AddressNotDmaVisible)?;
        Ok(buffer)
    }

    #[inline]
    pub fn phys(&self) -> u32 {
        self.phys
    }

    #[inline]
    pub fn kind(&self) -> Resource {
        self.kind
    }

    #[inline]
    pub fn bytes(&self) -> usize {
        self.layout.size()
    }

    pub fn len(&self) -> usize {
        self.layout.size() / core::mem::size_of::<i32>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[i32] {
        // SAFETY: ptr は len() 要素分確保済みで初期化済み
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        // SAFETY: 同上。&mut self で排他
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) }
    }

    pub fn zero(&mut self) {
        self.as_mut_slice().fill(0);
    }
}

impl Drop for DmaBuffer {
    fn drop(&mut self) {
        // SAFETY: allocate と同じ layout で確保したポインタ
        unsafe {
            dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

impl core::fmt::Debug for DmaBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaBuffer")
            .field("kind", &self.kind)
            .field("phys", &format_args!("{:#010x}", self.phys))
            .field("bytes", &self.layout.size())
            .finish()
    }
}

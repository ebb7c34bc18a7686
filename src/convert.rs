// ============================================================================
// src/convert.rs - Sample Conversion Pipeline
// ============================================================================
//!
//! ホストの float ミックスバッファとハードウェアの 32-bit 整数サンプルの変換。
//!
//! ## スケーリング
//! 正側は `i32::MAX`、負側は `2^31` を掛ける (非対称)。
//! そのため +1.0 → `0x7FFF_FFFF`、-1.0 → `i32::MIN` がちょうど表現できる。
//!
//! ## S/PDIF ミラー
//! 再生バッファの各フレーム先頭 2 チャンネルを、2ch の S/PDIF バッファの
//! 同じフレーム位置へ複写する。
//!
//! 呼び出し側は範囲がバッファ末尾で折り返さないことを保証する。
//! はみ出した分は処理しない。

const POS_SCALE: f64 = 2147483647.0;
const NEG_SCALE: f64 = 2147483648.0;
const POS_RECIP: f64 = 1.0 / POS_SCALE;
const NEG_RECIP: f64 = 1.0 / NEG_SCALE;

/// Clip one float sample to [-1, 1] and scale it to the hardware format.
#[inline]
pub fn clip_sample(sample: f32) -> i32 {
    let x = sample.clamp(-1.0, 1.0) as f64;
    if x >= 0.0 {
        (x * POS_SCALE) as i32
    } else {
        (x * NEG_SCALE) as i32
    }
}

/// Scale one hardware sample back to [-1, 1].
#[inline]
pub fn input_sample(sample: i32) -> f32 {
    let x = sample as f64;
    if sample >= 0 {
        (x * POS_RECIP) as f32
    } else {
        (x * NEG_RECIP) as f32
    }
}

/// フレーム範囲をサンプル添字範囲に変換 (長さで切り詰め)
#[inline]
fn sample_range(first_frame: usize, frames: usize, channels: usize, len: usize) -> (usize, usize) {
    let start = (first_frame * channels).min(len);
    let end = ((first_frame + frames) * channels).min(len);
    (start, end)
}

/// Clip `frames` frames from `mix` into `out`, then mirror the first stereo
/// pair of each frame into `spdif`.
///
/// `mix` and `out` share the same interleaved layout of `channels` channels.
pub fn clip_output_samples(
    mix: &[f32],
    out: &mut [i32],
    spdif: Option<&mut [i32]>,
    first_frame: usize,
    frames: usize,
    channels: usize,
) {
    let (start, end) = sample_range(first_frame, frames, channels, out.len().min(mix.len()));
    for (dst, src) in out[start..end].iter_mut().zip(&mix[start..end]) {
        *dst = clip_sample(*src);
    }

    if let Some(spdif) = spdif {
        mirror_front_pair(out, spdif, first_frame, frames, channels);
    }
}

/// Convert `frames` captured frames starting at `first_frame` into `dest`.
///
/// `dest` starts at the first converted sample.
pub fn convert_input_samples(
    input: &[i32],
    dest: &mut [f32],
    first_frame: usize,
    frames: usize,
    channels: usize,
) {
    let (start, end) = sample_range(first_frame, frames, channels, input.len());
    for (dst, src) in dest.iter_mut().zip(&input[start..end]) {
        *dst = input_sample(*src);
    }
}

/// Zero the played range and its S/PDIF mirror.
pub fn erase_output_samples(
    out: &mut [i32],
    spdif: Option<&mut [i32]>,
    first_frame: usize,
    frames: usize,
    channels: usize,
) {
    let (start, end) = sample_range(first_frame, frames, channels, out.len());
    out[start..end].fill(0);

    if let Some(spdif) = spdif {
        let (start, end) = sample_range(first_frame, frames, 2, spdif.len());
        spdif[start..end].fill(0);
    }
}

fn mirror_front_pair(
    out: &[i32],
    spdif: &mut [i32],
    first_frame: usize,
    frames: usize,
    channels: usize,
) {
    if channels < 2 {
        return;
    }
    for frame in first_frame..first_frame + frames {
        let src = frame * channels;
        let dst = frame * 2;
        match (out.get(src..src + 2), spdif.get_mut(dst..dst + 2)) {
            (Some(pair), Some(mirror)) => mirror.copy_from_slice(pair),
            _ => break,
        }
    }
}

//! NEON base64 kernels
//!
//! NEON's `tbl` indexes at most 64 bytes across four registers and is slow
//! in that form, so characters are derived arithmetically and decode
//! classification uses ordered range tests instead of a table.
//!
//! Encoding: 12 input bytes -> 16 output chars
//! Decoding: 16 input chars -> 12 output bytes

// Allow unused_unsafe because we explicitly wrap NEON intrinsics for Rust 2024
// edition compatibility (unsafe_op_in_unsafe_fn lint). The intrinsics may be
// marked safe in some versions, but we maintain explicit blocks for portability.
#![allow(unused_unsafe)]

use std::arch::aarch64::*;

use crate::core::tables::PAD;
use crate::simd::common;

/// Raw bytes consumed per encode block.
pub const ENCODE_BLOCK: usize = 12;
/// Characters consumed per decode block.
pub const DECODE_BLOCK: usize = 16;

const ENCODE_SHUFFLE: [u8; 16] = common::encode_shuffle::<16>();
const DECODE_PACK: [u8; 16] = common::decode_pack::<16>();

/// Restores `[s0, s1, s2, s3]` order after the sextets were computed in
/// separate lanes.
const SEXTET_ORDER: [u8; 16] = [0, 1, 4, 5, 2, 3, 6, 7, 8, 9, 12, 13, 10, 11, 14, 15];

/// Encode whole 12-byte blocks, returning the number of input bytes consumed.
///
/// # Safety
///
/// The CPU must support NEON (always true on aarch64 targets Rust supports).
///
/// # Panics
///
/// If `output` cannot hold `16` bytes per whole input block.
#[target_feature(enable = "neon")]
pub unsafe fn encode(input: &[u8], output: &mut [u8]) -> usize {
    let blocks = common::checked_blocks(input.len(), output.len(), ENCODE_BLOCK, DECODE_BLOCK);

    for i in 0..blocks {
        let offset = i * ENCODE_BLOCK;

        // Load 16 bytes (only the first 12 are used) when the slice has them,
        // otherwise stage the final block so nothing past the input is read.
        let input_vec = if offset + 16 <= input.len() {
            unsafe { vld1q_u8(input.as_ptr().add(offset)) }
        } else {
            let mut staged = [0u8; 16];
            staged[..ENCODE_BLOCK].copy_from_slice(&input[offset..offset + ENCODE_BLOCK]);
            unsafe { vld1q_u8(staged.as_ptr()) }
        };

        let indices = unsafe { reshuffle(input_vec) };
        let encoded = unsafe { translate(indices) };

        // SAFETY: checked_blocks guarantees 16 writable bytes here.
        unsafe { vst1q_u8(output.as_mut_ptr().add(i * DECODE_BLOCK), encoded) };
    }

    blocks * ENCODE_BLOCK
}

/// Decode whole 16-character blocks, stopping before the first block that
/// holds padding or a character outside the alphabet.
///
/// Returns the number of input characters consumed (a multiple of 16).
///
/// # Safety
///
/// The CPU must support NEON.
///
/// # Panics
///
/// If `output` cannot hold `12` bytes per whole input block.
#[target_feature(enable = "neon")]
pub unsafe fn decode(input: &[u8], output: &mut [u8]) -> usize {
    let blocks = common::checked_blocks(input.len(), output.len(), DECODE_BLOCK, ENCODE_BLOCK);

    for i in 0..blocks {
        // SAFETY: checked_blocks guarantees 16 readable bytes here.
        let input_vec = unsafe { vld1q_u8(input.as_ptr().add(i * DECODE_BLOCK)) };

        let Some(values) = (unsafe { classify(input_vec) }) else {
            return i * DECODE_BLOCK;
        };

        let packed = unsafe { pack(values) };

        let mut output_buf = [0u8; 16];
        unsafe { vst1q_u8(output_buf.as_mut_ptr(), packed) };
        let dst = i * ENCODE_BLOCK;
        output[dst..dst + ENCODE_BLOCK].copy_from_slice(&output_buf[..ENCODE_BLOCK]);
    }

    blocks * DECODE_BLOCK
}

/// Reshuffle 4 triplets and split them into 16 sextets with shifts.
///
/// After the `[b1, b0, b2, b1]` shuffle the 16-bit lanes alternate between
/// `b0:b1` (even) and `b1:b2` (odd):
/// - even: s0 = bits [10:15], s1 = bits [4:9]
/// - odd:  s2 = bits [6:11],  s3 = bits [0:5]
#[inline]
#[target_feature(enable = "neon")]
unsafe fn reshuffle(input: uint8x16_t) -> uint8x16_t {
    unsafe {
        let shuffled = vqtbl1q_u8(input, vld1q_u8(ENCODE_SHUFFLE.as_ptr()));

        let in16 = vreinterpretq_u16_u8(shuffled);
        let even = vuzp1_u16(vget_low_u16(in16), vget_high_u16(in16));
        let odd = vuzp2_u16(vget_low_u16(in16), vget_high_u16(in16));

        let s0 = vshr_n_u16::<10>(even);
        let s1 = vand_u16(vshr_n_u16::<4>(even), vdup_n_u16(0x3F));
        let s2 = vand_u16(vshr_n_u16::<6>(odd), vdup_n_u16(0x3F));
        let s3 = vand_u16(odd, vdup_n_u16(0x3F));

        // Interleave back towards [s0, s1, s2, s3] per triplet
        let lo = vcombine_u16(vzip1_u16(s0, s1), vzip1_u16(s2, s3));
        let hi = vcombine_u16(vzip2_u16(s0, s1), vzip2_u16(s2, s3));
        let narrowed = vcombine_u8(vmovn_u16(lo), vmovn_u16(hi));

        vqtbl1q_u8(narrowed, vld1q_u8(SEXTET_ORDER.as_ptr()))
    }
}

/// Translate 6-bit indices (0-63) to base64 ASCII characters
///
/// Start from an offset of 65 ('A') and adjust per range:
/// - [26..51] -> +6   (net +71, 'a'..'z')
/// - [52..61] -> -75  (net -4,  '0'..'9')
/// - [62]     -> -15  (net -19, '+')
/// - [63]     -> -12  (net -16, '/')
#[inline]
#[target_feature(enable = "neon")]
unsafe fn translate(indices: uint8x16_t) -> uint8x16_t {
    unsafe {
        let mut offset = vdupq_n_u8(65);
        let ge26 = vcgeq_u8(indices, vdupq_n_u8(26));
        offset = vaddq_u8(offset, vandq_u8(ge26, vdupq_n_u8(6)));
        let ge52 = vcgeq_u8(indices, vdupq_n_u8(52));
        offset = vsubq_u8(offset, vandq_u8(ge52, vdupq_n_u8(75)));
        let eq62 = vceqq_u8(indices, vdupq_n_u8(62));
        offset = vsubq_u8(offset, vandq_u8(eq62, vdupq_n_u8(15)));
        let eq63 = vceqq_u8(indices, vdupq_n_u8(63));
        offset = vsubq_u8(offset, vandq_u8(eq63, vdupq_n_u8(12)));

        vaddq_u8(indices, offset)
    }
}

/// Map 16 characters to sextets, or `None` if the block must be rejected.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn classify(input: uint8x16_t) -> Option<uint8x16_t> {
    unsafe {
        // Padding ends the fast path before anything else
        if vmaxvq_u8(vceqq_u8(input, vdupq_n_u8(PAD))) != 0 {
            return None;
        }

        let mut values = vdupq_n_u8(0xFF);

        // 'A'-'Z' -> 0-25
        let is_upper = vandq_u8(
            vcgeq_u8(input, vdupq_n_u8(b'A')),
            vcleq_u8(input, vdupq_n_u8(b'Z')),
        );
        values = vbslq_u8(is_upper, vsubq_u8(input, vdupq_n_u8(b'A')), values);

        // 'a'-'z' -> 26-51
        let is_lower = vandq_u8(
            vcgeq_u8(input, vdupq_n_u8(b'a')),
            vcleq_u8(input, vdupq_n_u8(b'z')),
        );
        values = vbslq_u8(is_lower, vsubq_u8(input, vdupq_n_u8(b'a' - 26)), values);

        // '0'-'9' -> 52-61
        let is_digit = vandq_u8(
            vcgeq_u8(input, vdupq_n_u8(b'0')),
            vcleq_u8(input, vdupq_n_u8(b'9')),
        );
        values = vbslq_u8(is_digit, vaddq_u8(input, vdupq_n_u8(4)), values);

        // '+' -> 62, '/' -> 63
        values = vbslq_u8(vceqq_u8(input, vdupq_n_u8(b'+')), vdupq_n_u8(62), values);
        values = vbslq_u8(vceqq_u8(input, vdupq_n_u8(b'/')), vdupq_n_u8(63), values);

        // Anything still at the sentinel (including bytes >= 0x80) rejects
        if vmaxvq_u8(vcgeq_u8(values, vdupq_n_u8(64))) != 0 {
            return None;
        }

        Some(values)
    }
}

/// Merge 16 sextets into 12 bytes (in the low lanes of the result).
///
/// Step 1: m = s_even * 64 + s_odd (12 bits)
/// Step 2: word = m_even << 12 | m_odd (24 bits)
#[inline]
#[target_feature(enable = "neon")]
unsafe fn pack(values: uint8x16_t) -> uint8x16_t {
    unsafe {
        let pairs = vuzp_u8(vget_low_u8(values), vget_high_u8(values));
        let merged = vmlal_u8(vmovl_u8(pairs.1), pairs.0, vdup_n_u8(64));

        let m_even = vuzp1_u16(vget_low_u16(merged), vget_high_u16(merged));
        let m_odd = vuzp2_u16(vget_low_u16(merged), vget_high_u16(merged));
        let combined = vorrq_u32(vshlq_n_u32::<12>(vmovl_u16(m_even)), vmovl_u16(m_odd));

        // Each 32-bit word is [c, b, a, 0] little-endian
        vqtbl1q_u8(
            vreinterpretq_u8_u32(combined),
            vld1q_u8(DECODE_PACK.as_ptr()),
        )
    }
}

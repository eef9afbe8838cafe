//! SSSE3 base64 kernels
//!
//! Based on techniques from:
//! - https://github.com/aklomp/base64 (reference C implementation)
//! - Wojciech Muła's SIMD base64 work
//!
//! `pshufb` only indexes 16 bytes, too narrow for the 64-entry alphabet, so
//! characters are derived from sextets with a small offset table and
//! validated with a nibble-pair lookup.
//!
//! Encoding: 12 input bytes -> 16 output chars
//! Decoding: 16 input chars -> 12 output bytes

#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use crate::simd::common;

/// Raw bytes consumed per encode block.
pub const ENCODE_BLOCK: usize = 12;
/// Characters consumed per decode block.
pub const DECODE_BLOCK: usize = 16;

const ENCODE_SHUFFLE: [u8; 16] = common::encode_shuffle::<16>();
const DECODE_PACK: [u8; 16] = common::decode_pack::<16>();

/// Encode whole 12-byte blocks, returning the number of input bytes consumed.
///
/// # Safety
///
/// The CPU must support SSSE3.
///
/// # Panics
///
/// If `output` cannot hold `16` bytes per whole input block.
#[target_feature(enable = "ssse3")]
pub unsafe fn encode(input: &[u8], output: &mut [u8]) -> usize {
    let blocks = common::checked_blocks(input.len(), output.len(), ENCODE_BLOCK, DECODE_BLOCK);

    for i in 0..blocks {
        let offset = i * ENCODE_BLOCK;

        // A 128-bit load reads 4 bytes past the block; only do it when those
        // bytes belong to the slice, otherwise stage through a buffer.
        let input_vec = if offset + 16 <= input.len() {
            unsafe { _mm_loadu_si128(input.as_ptr().add(offset) as *const __m128i) }
        } else {
            let mut staged = [0u8; 16];
            staged[..ENCODE_BLOCK].copy_from_slice(&input[offset..offset + ENCODE_BLOCK]);
            unsafe { _mm_loadu_si128(staged.as_ptr() as *const __m128i) }
        };

        // Reshuffle bytes to extract 6-bit groups
        let indices = unsafe { reshuffle(input_vec) };

        // Translate 6-bit indices to ASCII
        let encoded = unsafe { translate(indices) };

        // SAFETY: checked_blocks guarantees 16 writable bytes here.
        unsafe {
            _mm_storeu_si128(
                output.as_mut_ptr().add(i * DECODE_BLOCK) as *mut __m128i,
                encoded,
            );
        }
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
/// The CPU must support SSSE3.
///
/// # Panics
///
/// If `output` cannot hold `12` bytes per whole input block.
#[target_feature(enable = "ssse3")]
pub unsafe fn decode(input: &[u8], output: &mut [u8]) -> usize {
    let blocks = common::checked_blocks(input.len(), output.len(), DECODE_BLOCK, ENCODE_BLOCK);

    for i in 0..blocks {
        // SAFETY: checked_blocks guarantees 16 readable bytes here.
        let input_vec =
            unsafe { _mm_loadu_si128(input.as_ptr().add(i * DECODE_BLOCK) as *const __m128i) };

        // Padding and invalid characters both end the fast path
        if unsafe { !validate(input_vec) } {
            return i * DECODE_BLOCK;
        }

        // Translate ASCII to 6-bit indices
        let indices = unsafe { translate_decode(input_vec) };

        // Reshuffle 6-bit to 8-bit
        let decoded = unsafe { reshuffle_decode(indices) };

        // Store 12 bytes
        let mut output_buf = [0u8; 16];
        unsafe { _mm_storeu_si128(output_buf.as_mut_ptr() as *mut __m128i, decoded) };
        let dst = i * ENCODE_BLOCK;
        output[dst..dst + ENCODE_BLOCK].copy_from_slice(&output_buf[..ENCODE_BLOCK]);
    }

    blocks * DECODE_BLOCK
}

/// Reshuffle bytes and extract 6-bit indices from 12 input bytes
///
/// This function takes 12 bytes and produces 16 6-bit values (0-63)
///
/// The algorithm uses multiply instructions to perform the bit extraction,
/// which is more efficient than multiple shift/mask operations.
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn reshuffle(input: __m128i) -> __m128i {
    unsafe {
        // Each group of 3 input bytes (24 bits) becomes 4 output bytes (4 x 6 bits)
        let shuffled = _mm_shuffle_epi8(
            input,
            _mm_loadu_si128(ENCODE_SHUFFLE.as_ptr() as *const __m128i),
        );

        // First extraction: get bits for positions 0 and 2 in each group of 4
        let t0 = _mm_and_si128(shuffled, _mm_set1_epi32(0x0FC0FC00));
        let t1 = _mm_mulhi_epu16(t0, _mm_set1_epi32(0x04000040));

        // Second extraction: get bits for positions 1 and 3 in each group of 4
        let t2 = _mm_and_si128(shuffled, _mm_set1_epi32(0x003F03F0));
        let t3 = _mm_mullo_epi16(t2, _mm_set1_epi32(0x01000010));

        // Combine the two results
        _mm_or_si128(t1, t3)
    }
}

/// Translate 6-bit indices (0-63) to base64 ASCII characters
///
/// Uses an offset-based lookup instead of direct table lookup:
/// - [0..25]  -> 'A'..'Z' (ASCII 65..90)   offset: +65
/// - [26..51] -> 'a'..'z' (ASCII 97..122)  offset: +71
/// - [52..61] -> '0'..'9' (ASCII 48..57)   offset: -4
/// - [62]     -> '+'      (ASCII 43)       offset: -19
/// - [63]     -> '/'      (ASCII 47)       offset: -16
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn translate(indices: __m128i) -> __m128i {
    unsafe {
        let lut = _mm_setr_epi8(
            65, // index 0: 'A' = 0 + 65
            71, // index 1: for values 26-51, add 71 (26 + 71 = 97 = 'a')
            -4, // indices 2-11: for values 52-61, add -4 (52 + -4 = 48 = '0')
            -4, -4, -4, -4, -4, -4, -4, -4, -4,
            -19, // index 12: for value 62, add -19 (62 + -19 = 43 = '+')
            -16, // index 13: for value 63, add -16 (63 + -16 = 47 = '/')
            0,   // unused
            0,   // unused
        );

        // 0 for [0..51], 1..12 for [52..63], then +1 for everything above 25
        let mut lut_indices = _mm_subs_epu8(indices, _mm_set1_epi8(51));
        let mask = _mm_cmpgt_epi8(indices, _mm_set1_epi8(25));
        lut_indices = _mm_sub_epi8(lut_indices, mask);

        // Look up the offsets and add to original indices
        let offsets = _mm_shuffle_epi8(lut, lut_indices);
        _mm_add_epi8(indices, offsets)
    }
}

/// Validate that all input bytes are alphabet characters
///
/// Every byte is classified by its low and high nibble; a byte is valid iff
/// the two class masks share no bit. `=` (0x3D) and all bytes >= 0x80 land
/// in a shared class and are rejected, so a block holding padding stops the
/// kernel without a separate check.
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn validate(input: __m128i) -> bool {
    unsafe {
        // Low nibble lookup - validates based on low 4 bits
        let lut_lo = _mm_setr_epi8(
            0x15, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x13, 0x1A, 0x1B, 0x1B,
            0x1B, 0x1A,
        );

        // High nibble lookup - validates based on high 4 bits
        let lut_hi = _mm_setr_epi8(
            0x10, 0x10, 0x01, 0x02, 0x04, 0x08, 0x04, 0x08, 0x10, 0x10, 0x10, 0x10, 0x10, 0x10,
            0x10, 0x10,
        );

        let lo_nibbles = _mm_and_si128(input, _mm_set1_epi8(0x0F));
        let hi_nibbles = _mm_and_si128(_mm_srli_epi32(input, 4), _mm_set1_epi8(0x0F));

        let lo_lookup = _mm_shuffle_epi8(lut_lo, lo_nibbles);
        let hi_lookup = _mm_shuffle_epi8(lut_hi, hi_nibbles);

        // Class bits live below 0x80, so compare against zero instead of
        // reading sign bits directly.
        let clash = _mm_and_si128(lo_lookup, hi_lookup);
        let clean = _mm_cmpeq_epi8(clash, _mm_setzero_si128());

        _mm_movemask_epi8(clean) == 0xFFFF
    }
}

/// Translate validated ASCII characters to 6-bit indices
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn translate_decode(input: __m128i) -> __m128i {
    unsafe {
        // Roll/offset lookup indexed by high nibble, with '/' pulled down one
        let lut_roll = _mm_setr_epi8(0, 16, 19, 4, -65, -65, -71, -71, 0, 0, 0, 0, 0, 0, 0, 0);

        let hi_nibbles = _mm_and_si128(_mm_srli_epi32(input, 4), _mm_set1_epi8(0x0F));
        let eq_2f = _mm_cmpeq_epi8(input, _mm_set1_epi8(0x2F));
        let roll_index = _mm_add_epi8(eq_2f, hi_nibbles);

        let offsets = _mm_shuffle_epi8(lut_roll, roll_index);
        _mm_add_epi8(input, offsets)
    }
}

/// Reshuffle 6-bit indices to packed 8-bit bytes
///
/// Converts 16 bytes of 6-bit values (0-63) to 12 bytes of 8-bit data
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn reshuffle_decode(indices: __m128i) -> __m128i {
    unsafe {
        // Stage 1: Merge adjacent pairs using multiply-add
        let merge_ab_and_bc = _mm_maddubs_epi16(indices, _mm_set1_epi32(0x01400140));

        // Stage 2: Combine 16-bit pairs into 32-bit values
        let final_32bit = _mm_madd_epi16(merge_ab_and_bc, _mm_set1_epi32(0x00011000));

        // Stage 3: Extract the valid bytes from each 32-bit group
        _mm_shuffle_epi8(
            final_32bit,
            _mm_loadu_si128(DECODE_PACK.as_ptr() as *const __m128i),
        )
    }
}

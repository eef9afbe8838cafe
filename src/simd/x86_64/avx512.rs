//! AVX-512 VBMI base64 kernels
//!
//! `vpermb` looks up 64 bytes from a 64-byte table in one instruction, which
//! is exactly the size of the base64 alphabet, so encoding needs no range
//! arithmetic at all. Decoding uses `vpermi2b` over the two halves of the
//! 128-entry ASCII table.
//!
//! Encoding: 48 input bytes -> 64 output chars
//! Decoding: 64 input chars -> 48 output bytes

// Most intrinsics are safe inside a matching `target_feature` function on
// current toolchains; the explicit blocks keep older ones compiling.
#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use crate::core::tables::{DECODE_TABLE, ENCODE_ALPHABET, PAD};
use crate::simd::common;

/// Raw bytes consumed per encode block.
pub const ENCODE_BLOCK: usize = 48;
/// Characters consumed per decode block.
pub const DECODE_BLOCK: usize = 64;

/// Lanes holding real data in a 48-byte block.
const LOW_48: __mmask64 = 0x0000_FFFF_FFFF_FFFF;

const ENCODE_SHUFFLE: [u8; 64] = common::encode_shuffle::<64>();
const DECODE_PACK: [u8; 64] = common::decode_pack::<64>();
const DECODE_LO: [u8; 64] = table_half(0);
const DECODE_HI: [u8; 64] = table_half(64);

const fn table_half(start: usize) -> [u8; 64] {
    let mut half = [0u8; 64];
    let mut i = 0;
    while i < 64 {
        half[i] = DECODE_TABLE[start + i];
        i += 1;
    }
    half
}

/// Encode whole 48-byte blocks, returning the number of input bytes consumed.
///
/// # Safety
///
/// The CPU must support AVX-512 F, BW and VBMI.
///
/// # Panics
///
/// If `output` cannot hold `64` bytes per whole input block.
#[target_feature(enable = "avx512f,avx512bw,avx512vbmi")]
pub unsafe fn encode(input: &[u8], output: &mut [u8]) -> usize {
    let blocks = common::checked_blocks(input.len(), output.len(), ENCODE_BLOCK, DECODE_BLOCK);

    let (shuffle, table) = unsafe { (load(&ENCODE_SHUFFLE), load(&ENCODE_ALPHABET)) };
    let src = input.as_ptr();
    let dst = output.as_mut_ptr();

    for i in 0..blocks {
        // SAFETY: checked_blocks guarantees both ranges are in bounds.
        unsafe {
            encode_block(
                src.add(i * ENCODE_BLOCK),
                dst.add(i * DECODE_BLOCK),
                shuffle,
                table,
            );
        }
    }

    blocks * ENCODE_BLOCK
}

/// Decode whole 64-character blocks, stopping before the first block that
/// holds padding or a character outside the alphabet.
///
/// Returns the number of input characters consumed (a multiple of 64).
///
/// # Safety
///
/// The CPU must support AVX-512 F, BW and VBMI.
///
/// # Panics
///
/// If `output` cannot hold `48` bytes per whole input block.
#[target_feature(enable = "avx512f,avx512bw,avx512vbmi")]
pub unsafe fn decode(input: &[u8], output: &mut [u8]) -> usize {
    let blocks = common::checked_blocks(input.len(), output.len(), DECODE_BLOCK, ENCODE_BLOCK);

    let (lo, hi, pack) = unsafe { (load(&DECODE_LO), load(&DECODE_HI), load(&DECODE_PACK)) };
    let src = input.as_ptr();
    let dst = output.as_mut_ptr();

    for i in 0..blocks {
        // SAFETY: checked_blocks guarantees both ranges are in bounds.
        let ok = unsafe {
            decode_block(
                src.add(i * DECODE_BLOCK),
                dst.add(i * ENCODE_BLOCK),
                lo,
                hi,
                pack,
            )
        };
        if !ok {
            return i * DECODE_BLOCK;
        }
    }

    blocks * DECODE_BLOCK
}

#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn load(bytes: &[u8; 64]) -> __m512i {
    unsafe { _mm512_loadu_epi8(bytes.as_ptr() as *const i8) }
}

/// Encode 48 bytes at `src` into 64 characters at `dst`.
#[inline]
#[target_feature(enable = "avx512f,avx512bw,avx512vbmi")]
unsafe fn encode_block(src: *const u8, dst: *mut u8, shuffle: __m512i, table: __m512i) {
    unsafe {
        // Masked load: the 16 bytes past the block are never touched.
        let input = _mm512_maskz_loadu_epi8(LOW_48, src as *const i8);

        // Spread 16 triplets to [b1, b0, b2, b1]; vpermb crosses 128-bit lanes.
        let triplets = _mm512_permutexvar_epi8(shuffle, input);

        // Each 32-bit word is now b0:b1 | b1:b2. Pull sextets [18:23] and
        // [6:11] down with mulhi, push [12:17] and [0:5] up with mullo.
        let t0 = _mm512_and_si512(triplets, _mm512_set1_epi32(0x0FC0FC00));
        let t0 = _mm512_mulhi_epu16(t0, _mm512_set1_epi32(0x04000040));
        let t1 = _mm512_and_si512(triplets, _mm512_set1_epi32(0x003F03F0));
        let t1 = _mm512_mullo_epi16(t1, _mm512_set1_epi32(0x01000010));
        let indices = _mm512_or_si512(t0, t1);

        // One lookup for all 64 characters.
        let chars = _mm512_permutexvar_epi8(indices, table);
        _mm512_storeu_epi8(dst as *mut i8, chars);
    }
}

/// Decode 64 characters at `src` into 48 bytes at `dst`.
///
/// Returns `false` without storing anything when the block contains padding,
/// a non-ASCII byte, or an ASCII byte outside the alphabet.
#[inline]
#[target_feature(enable = "avx512f,avx512bw,avx512vbmi")]
unsafe fn decode_block(
    src: *const u8,
    dst: *mut u8,
    lo: __m512i,
    hi: __m512i,
    pack: __m512i,
) -> bool {
    unsafe {
        let input = _mm512_loadu_epi8(src as *const i8);

        let padding = _mm512_cmpeq_epi8_mask(input, _mm512_set1_epi8(PAD as i8));

        // vpermi2b selects from lo/hi with the low 7 bits of each byte.
        // Non-ASCII input aliases into the table, so its own sign bit is
        // folded into the check alongside the 0xFF sentinel.
        let values = _mm512_permutex2var_epi8(lo, input, hi);
        let rejected = _mm512_movepi8_mask(_mm512_or_si512(input, values));
        if (padding | rejected) != 0 {
            return false;
        }

        // [a, b, c, d] -> a*64 + b, c*64 + d -> (ab << 12) | cd
        let merged = _mm512_maddubs_epi16(values, _mm512_set1_epi32(0x01400140));
        let merged = _mm512_madd_epi16(merged, _mm512_set1_epi32(0x00011000));

        // Compact 16 words of [c, b, a, 0] into 48 contiguous bytes.
        let packed = _mm512_permutexvar_epi8(pack, merged);
        _mm512_mask_storeu_epi8(dst as *mut i8, LOW_48, packed);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::detect;

    fn reference(data: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; data.len() / 3 * 4];
        crate::encoders::scalar::encode_into(data, &mut out);
        out
    }

    #[test]
    fn test_encode_matches_scalar() {
        if !detect::has_avx512_vbmi() {
            return;
        }
        let data: Vec<u8> = (0..480).map(|i| (i * 37 + 11) as u8).collect();
        let mut out = vec![0u8; 640];
        let consumed = unsafe { encode(&data, &mut out) };
        assert_eq!(consumed, 480);
        assert_eq!(out, reference(&data));
    }

    #[test]
    fn test_encode_zero_block() {
        if !detect::has_avx512_vbmi() {
            return;
        }
        let mut out = [0u8; 64];
        assert_eq!(unsafe { encode(&[0u8; 48], &mut out) }, 48);
        assert_eq!(out, [b'A'; 64]);
    }

    #[test]
    fn test_decode_round_trip() {
        if !detect::has_avx512_vbmi() {
            return;
        }
        let data: Vec<u8> = (0..=255u8).cycle().take(48 * 6).collect();
        let encoded = reference(&data);
        let mut out = vec![0u8; data.len()];
        assert_eq!(unsafe { decode(&encoded, &mut out) }, encoded.len());
        assert_eq!(out, data);
    }

    #[test]
    fn test_decode_rejects_padding_and_high_bytes() {
        if !detect::has_avx512_vbmi() {
            return;
        }
        let mut text = vec![b'Q'; 128];
        text[127] = b'=';
        let mut out = vec![0u8; 96];
        assert_eq!(unsafe { decode(&text, &mut out) }, 64);

        // 0xC1 aliases to 'A' in the low 7 bits; it must still be rejected.
        let mut text = vec![b'Q'; 64];
        text[5] = 0xC1;
        let mut out = [0xEEu8; 48];
        assert_eq!(unsafe { decode(&text, &mut out) }, 0);
        assert_eq!(out, [0xEE; 48], "rejected block must not be written");
    }
}

//! Vector-length-agnostic base64 kernels
//!
//! Block sizes follow a runtime vector width `w` (a multiple of 16 bytes up
//! to 256, the SVE architectural maximum): one encode block is `w * 3 / 4`
//! input bytes producing `w` characters, one decode block is `w` characters
//! producing `w * 3 / 4` bytes.
//!
//! The kernels are written lane-wise with branch-free select masks and no
//! table lookups, so they compile on every target. On aarch64 the `sve`
//! module instantiates them under `#[target_feature(enable = "sve")]`, where
//! the compiler vectorizes the lane loops with scalable vectors; elsewhere
//! they serve as the portable model of the width-variable path.

use crate::core::tables::PAD;
use crate::simd::common;

/// Smallest supported vector width in bytes.
pub const MIN_WIDTH: usize = 16;
/// Largest supported vector width in bytes (2048-bit SVE).
pub const MAX_WIDTH: usize = 256;

/// Whether `width` is a vector width these kernels accept.
#[inline]
pub const fn is_valid_width(width: usize) -> bool {
    width >= MIN_WIDTH && width <= MAX_WIDTH && width % MIN_WIDTH == 0
}

/// Raw bytes consumed per encode block at `width`.
#[inline]
pub const fn encode_block(width: usize) -> usize {
    width / 4 * 3
}

/// Characters consumed per decode block at `width`.
#[inline]
pub const fn decode_block(width: usize) -> usize {
    width
}

/// Encode whole `width * 3 / 4`-byte blocks, returning bytes consumed.
///
/// # Panics
///
/// If `width` is not a valid vector width or `output` cannot hold every
/// whole block.
#[inline(always)]
pub fn encode(input: &[u8], output: &mut [u8], width: usize) -> usize {
    assert!(is_valid_width(width), "unsupported vector width {}", width);
    let in_block = encode_block(width);
    let blocks = common::checked_blocks(input.len(), output.len(), in_block, width);

    for (src, dst) in input
        .chunks_exact(in_block)
        .zip(output.chunks_exact_mut(width))
        .take(blocks)
    {
        encode_one(src, dst);
    }

    blocks * in_block
}

/// Decode whole `width`-character blocks, stopping before the first block
/// holding padding or a character outside the alphabet.
///
/// # Panics
///
/// If `width` is not a valid vector width or `output` cannot hold every
/// whole block.
#[inline(always)]
pub fn decode(input: &[u8], output: &mut [u8], width: usize) -> usize {
    assert!(is_valid_width(width), "unsupported vector width {}", width);
    let out_block = encode_block(width);
    let blocks = common::checked_blocks(input.len(), output.len(), width, out_block);

    let mut sextets = [0u8; MAX_WIDTH];
    for (i, (src, dst)) in input
        .chunks_exact(width)
        .zip(output.chunks_exact_mut(out_block))
        .take(blocks)
        .enumerate()
    {
        if !classify(src, &mut sextets[..width]) {
            return i * width;
        }
        pack(&sextets[..width], dst);
    }

    blocks * width
}

/// One encode block: reshuffle, extract sextets, then translate in place.
#[inline(always)]
fn encode_one(src: &[u8], dst: &mut [u8]) {
    for (t, q) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
        // [b1, b0, b2, b1] as two 16-bit lanes: b0:b1 and b1:b2
        let even = u16::from_le_bytes([t[1], t[0]]);
        let odd = u16::from_le_bytes([t[2], t[1]]);
        q[0] = (even >> 10) as u8;
        q[1] = ((even >> 4) & 0x3F) as u8;
        q[2] = ((odd >> 6) & 0x3F) as u8;
        q[3] = (odd & 0x3F) as u8;
    }
    for c in dst.iter_mut() {
        *c = translate(*c);
    }
}

/// Branch-free sextet to ASCII: start at 'A' and adjust per range.
#[inline(always)]
fn translate(index: u8) -> u8 {
    let ge26 = mask(index >= 26);
    let ge52 = mask(index >= 52);
    let eq62 = mask(index == 62);
    let eq63 = mask(index == 63);
    let offset = 65u8
        .wrapping_add(ge26 & 6)
        .wrapping_sub(ge52 & 75)
        .wrapping_sub(eq62 & 15)
        .wrapping_sub(eq63 & 12);
    index.wrapping_add(offset)
}

/// Fill `out` with sextets for `src`; false if any lane is padding or
/// outside the alphabet. Every lane is evaluated before deciding.
#[inline(always)]
fn classify(src: &[u8], out: &mut [u8]) -> bool {
    let mut padding = 0u8;
    let mut invalid = 0u8;
    for (&c, v) in src.iter().zip(out.iter_mut()) {
        padding |= mask(c == PAD);

        let upper = mask(c.wrapping_sub(b'A') < 26);
        let lower = mask(c.wrapping_sub(b'a') < 26);
        let digit = mask(c.wrapping_sub(b'0') < 10);
        let plus = mask(c == b'+');
        let slash = mask(c == b'/');

        let mut value = 0xFFu8;
        value = select(upper, c.wrapping_sub(b'A'), value);
        value = select(lower, c.wrapping_sub(b'a' - 26), value);
        value = select(digit, c.wrapping_add(4), value);
        value = select(plus, 62, value);
        value = select(slash, 63, value);

        // Valid sextets never touch the top two bits
        invalid |= value & 0xC0;
        *v = value;
    }
    padding == 0 && invalid == 0
}

/// Merge groups of four sextets into three bytes with two multiply-adds.
#[inline(always)]
fn pack(sextets: &[u8], dst: &mut [u8]) {
    for (q, t) in sextets.chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
        let ab = q[0] as u32 * 64 + q[1] as u32;
        let cd = q[2] as u32 * 64 + q[3] as u32;
        let word = ab * 4096 + cd;
        t[0] = (word >> 16) as u8;
        t[1] = (word >> 8) as u8;
        t[2] = word as u8;
    }
}

#[inline(always)]
fn mask(cond: bool) -> u8 {
    (cond as u8).wrapping_neg()
}

#[inline(always)]
fn select(mask: u8, if_set: u8, otherwise: u8) -> u8 {
    (mask & if_set) | (!mask & otherwise)
}

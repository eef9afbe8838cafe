//! Shared scaffolding for the block kernels
//!
//! Block arithmetic and bounds checks live here; the hot path (reshuffle,
//! translate, pack) stays specialized per instruction set.

/// Calculate number of full blocks and the bytes they cover
///
/// Returns (num_full_blocks, block_bytes)
#[inline(always)]
pub fn calculate_blocks(data_len: usize, block_size: usize) -> (usize, usize) {
    let num_blocks = data_len / block_size;
    (num_blocks, num_blocks * block_size)
}

/// Number of whole blocks a kernel may process, after checking the output
/// slice can hold all of them.
///
/// An undersized output buffer is a caller bug; it panics like an
/// out-of-range slice index rather than writing out of bounds.
#[inline(always)]
pub fn checked_blocks(
    input_len: usize,
    output_len: usize,
    in_block: usize,
    out_block: usize,
) -> usize {
    let (num_blocks, _) = calculate_blocks(input_len, in_block);
    let needed = num_blocks * out_block;
    assert!(
        output_len >= needed,
        "output buffer too small: {} whole blocks need {} bytes, got {}",
        num_blocks,
        needed,
        output_len
    );
    num_blocks
}

/// Build a byte-permutation table that spreads each triplet `[b0, b1, b2]`
/// into `[b1, b0, b2, b1]`, for `N / 4` triplets.
///
/// Reading the four bytes as a little-endian `u32` gives the two 16-bit
/// halves `b0:b1` and `b1:b2` that the mask-and-multiply extraction expects.
pub const fn encode_shuffle<const N: usize>() -> [u8; N] {
    let mut table = [0u8; N];
    let mut n = 0;
    while n < N / 4 {
        let src = (3 * n) as u8;
        table[4 * n] = src + 1;
        table[4 * n + 1] = src;
        table[4 * n + 2] = src + 2;
        table[4 * n + 3] = src + 1;
        n += 1;
    }
    table
}

/// Build the table that compacts packed 24-bit words back to bytes.
///
/// Each 32-bit lane holds `[c, b, a, 0]` little-endian after the
/// multiply-add merge; output triplet `n` takes lane bytes `4n+2, 4n+1, 4n`.
/// Unused trailing entries are `0x80`, which zeroes the byte on `pshufb`
/// style shuffles and is never stored.
pub const fn decode_pack<const N: usize>() -> [u8; N] {
    let mut table = [0x80u8; N];
    let mut n = 0;
    while n < N / 4 {
        let src = (4 * n) as u8;
        table[3 * n] = src + 2;
        table[3 * n + 1] = src + 1;
        table[3 * n + 2] = src;
        n += 1;
    }
    table
}

//! Fixed lookup tables shared by every kernel.
//!
//! The encode alphabet is the RFC 4648 standard alphabet. The decode table
//! only covers ASCII; any byte with the high bit set is invalid by
//! construction, so kernels reject those before (or instead of) a lookup.

/// Padding character terminating a short final quad.
pub const PAD: u8 = b'=';

/// Sentinel stored in [`DECODE_TABLE`] for bytes outside the alphabet.
///
/// Every valid sextet is below 64, so any value `>= 64` means "reject".
/// `0xFF` also has the sign bit set, which lets vector kernels test the
/// whole block with a single movemask.
pub const INVALID: u8 = 0xFF;

/// Standard base64 alphabet indexed by sextet.
pub const ENCODE_ALPHABET: [u8; 64] =
    *b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// ASCII code point to sextet, or [`INVALID`].
///
/// `=` maps to [`INVALID`] as well: the vector paths treat padding exactly
/// like a malformed character and leave the distinction to the scalar codec.
pub const DECODE_TABLE: [u8; 128] = build_decode_table();

const fn build_decode_table() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < 64 {
        table[ENCODE_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Look up the sextet for `byte`, returning `None` for anything outside the
/// alphabet (including padding and non-ASCII bytes).
#[inline(always)]
pub fn sextet(byte: u8) -> Option<u8> {
    match DECODE_TABLE.get(byte as usize) {
        Some(&v) if v != INVALID => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table_inverts_alphabet() {
        for (i, &c) in ENCODE_ALPHABET.iter().enumerate() {
            assert_eq!(DECODE_TABLE[c as usize], i as u8, "char {}", c as char);
        }
    }

    #[test]
    fn test_decode_table_invalid_entries() {
        let valid = DECODE_TABLE.iter().filter(|&&v| v != INVALID).count();
        assert_eq!(valid, 64);
        assert_eq!(DECODE_TABLE[PAD as usize], INVALID);
        assert_eq!(DECODE_TABLE[b'\n' as usize], INVALID);
        assert_eq!(DECODE_TABLE[b'-' as usize], INVALID);
        assert_eq!(DECODE_TABLE[b'_' as usize], INVALID);
    }

    #[test]
    fn test_sextet_rejects_non_ascii() {
        assert_eq!(sextet(b'A'), Some(0));
        assert_eq!(sextet(b'/'), Some(63));
        assert_eq!(sextet(0x80), None);
        assert_eq!(sextet(0xFF), None);
        assert_eq!(sextet(PAD), None);
    }
}

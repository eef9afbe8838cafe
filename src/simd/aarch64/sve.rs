//! SVE base64 kernels
//!
//! SVE's vector length is implementation defined (128 to 2048 bits), so the
//! block size is only known at runtime. The width is read once by the
//! capability probe and the vector-length-agnostic kernels in
//! [`crate::simd::vla`] are instantiated here with SVE code generation
//! enabled.

use std::arch::asm;

use crate::simd::{detect, vla};

/// Read the SVE vector length in bytes.
///
/// # Safety
///
/// The CPU must support SVE.
#[target_feature(enable = "sve")]
pub unsafe fn read_vector_bytes() -> usize {
    let bytes: usize;
    // SAFETY: rdvl only reads the vector length register.
    unsafe {
        asm!("rdvl {0}, #1", out(reg) bytes, options(nomem, nostack, preserves_flags, pure));
    }
    bytes
}

/// Vector width the kernels run at; the probe only reports SVE above 16.
#[inline]
fn width() -> usize {
    detect::sve_vector_bytes()
        .filter(|&w| vla::is_valid_width(w))
        .unwrap_or(vla::MIN_WIDTH)
}

/// Encode whole `vl * 3 / 4`-byte blocks, returning bytes consumed.
///
/// # Safety
///
/// The CPU must support SVE.
#[target_feature(enable = "sve")]
pub unsafe fn encode(input: &[u8], output: &mut [u8]) -> usize {
    vla::encode(input, output, width())
}

/// Decode whole `vl`-character blocks, returning characters consumed.
///
/// # Safety
///
/// The CPU must support SVE.
#[target_feature(enable = "sve")]
pub unsafe fn decode(input: &[u8], output: &mut [u8]) -> usize {
    vla::decode(input, output, width())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_length_is_sane() {
        if !std::arch::is_aarch64_feature_detected!("sve") {
            return;
        }
        let bytes = unsafe { read_vector_bytes() };
        assert!(vla::is_valid_width(bytes), "vl = {}", bytes);
    }

    #[test]
    fn test_round_trip_at_hardware_width() {
        if !std::arch::is_aarch64_feature_detected!("sve") {
            return;
        }
        let w = width();
        let data: Vec<u8> = (0..vla::encode_block(w) * 2).map(|i| i as u8).collect();
        let mut encoded = vec![0u8; w * 2];
        assert_eq!(unsafe { encode(&data, &mut encoded) }, data.len());
        let mut decoded = vec![0u8; data.len()];
        assert_eq!(unsafe { decode(&encoded, &mut decoded) }, encoded.len());
        assert_eq!(decoded, data);
    }
}

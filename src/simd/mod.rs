//! SIMD-accelerated base64 block kernels
//!
//! This module provides platform-specific block kernels for the standard
//! base64 alphabet. Runtime CPU feature detection picks the best one; the
//! kernels only ever handle whole blocks and leave the remainder to
//! [`crate::encoders::scalar`].

pub mod common;
pub mod detect;
pub mod dispatch;
pub mod vla;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub mod x86_64;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
pub mod aarch64;

pub use detect::{
    Capabilities, SimdLevel, detect, has_avx512_vbmi, has_neon, has_ssse3, simd_level,
    sve_vector_bytes,
};
pub use dispatch::{Kernel, UnknownKernel, decode_blocks, encode_blocks};

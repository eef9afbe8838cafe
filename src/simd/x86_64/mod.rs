//! x86_64 SIMD implementations
//!
//! Two tiers, both exposing the same `encode`/`decode` block-kernel shape:
//! - `avx512`: AVX-512 VBMI, 48/64-byte blocks, full 64-entry table lookup
//! - `ssse3`: SSSE3, 12/16-byte blocks, offset arithmetic

pub mod avx512;
pub mod ssse3;

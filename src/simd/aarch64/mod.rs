//! aarch64 SIMD implementations
//!
//! - `neon`: Advanced SIMD, 12/16-byte blocks, arithmetic character mapping
//! - `sve`: scalable vectors, block size follows the runtime vector length
//!
//! NEON is part of the baseline architecture; SVE is probed at runtime.

pub mod neon;
pub mod sve;

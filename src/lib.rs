//! SIMD-accelerated base64 for the standard alphabet.
//!
//! Whole blocks go through the fastest vector kernel the CPU supports
//! (AVX-512 VBMI or SSSE3 on x86_64, SVE or NEON on aarch64); partial
//! blocks, padding and anything malformed are handled by a scalar codec
//! following RFC 4648, with a lenient default mode. Kernel selection
//! happens once per process.
//!
//! ```
//! let text = vbase64::encode(b"Man");
//! assert_eq!(text, "TWFu");
//! assert_eq!(vbase64::decode(text.as_bytes()).unwrap(), b"Man");
//! ```

pub mod bench;
mod core;
mod encoders;
pub mod simd;

pub use crate::core::config::{ConfigError, Settings, SettingsFile};
pub use crate::core::tables::{ENCODE_ALPHABET, PAD};
pub use encoders::scalar;
pub use encoders::{DecodeError, Engine, ScalarDecoder, StreamingDecoder, StreamingEncoder};
pub use simd::{Capabilities, Kernel, SimdLevel, UnknownKernel, detect};

/// Encode `data` with the best kernel for this CPU.
pub fn encode(data: &[u8]) -> String {
    Engine::detect().encode(data)
}

/// Leniently decode `encoded` with the best kernel for this CPU.
pub fn decode(encoded: &[u8]) -> Result<Vec<u8>, DecodeError> {
    Engine::detect().decode(encoded)
}

/// Strictly decode `encoded` with the best kernel for this CPU.
pub fn decode_strict(encoded: &[u8]) -> Result<Vec<u8>, DecodeError> {
    Engine::detect().decode_strict(encoded)
}

#[cfg(test)]
mod tests;

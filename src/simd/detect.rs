//! Runtime CPU capability detection
//!
//! Detection runs at most a handful of times per process (once in practice)
//! and is cached in two atomics. Both start at zero, meaning "not probed
//! yet". The probe is a pure function of the hardware, so threads racing on
//! first use compute and store the same value; a reader that observes zero
//! simply probes again. No lock is needed.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Instruction-set tier recorded by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SimdLevel {
    /// No usable vector path: callers go scalar.
    None = 1,
    /// x86_64 SSSE3 (`pshufb`, 16-byte vectors).
    Ssse3 = 2,
    /// x86_64 AVX-512 F + BW + VBMI (`vpermb`/`vpermi2b`, 64-byte vectors).
    Avx512Vbmi = 3,
    /// aarch64 Advanced SIMD (16-byte vectors, baseline on aarch64).
    Neon = 4,
    /// aarch64 SVE with a vector length above 16 bytes.
    Sve = 5,
}

impl SimdLevel {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(SimdLevel::None),
            2 => Some(SimdLevel::Ssse3),
            3 => Some(SimdLevel::Avx512Vbmi),
            4 => Some(SimdLevel::Neon),
            5 => Some(SimdLevel::Sve),
            _ => None,
        }
    }
}

/// 0 = unknown, otherwise a [`SimdLevel`] discriminant.
static SIMD_LEVEL: AtomicU8 = AtomicU8::new(0);

/// 0 = unknown or no SVE, otherwise the SVE vector length in bytes.
static SVE_VECTOR_BYTES: AtomicUsize = AtomicUsize::new(0);

/// Snapshot of everything the probe found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Best tier usable on this CPU.
    pub level: SimdLevel,
    /// SVE vector length in bytes, when SVE is present at all.
    pub sve_vector_bytes: Option<usize>,
}

/// Probe the CPU and cache the result.
///
/// Idempotent: calls after the first one are a single atomic load.
/// The CLI calls this eagerly at startup; library entry points call it
/// lazily.
pub fn detect() -> Capabilities {
    let level = simd_level();
    Capabilities {
        level,
        sve_vector_bytes: sve_vector_bytes(),
    }
}

/// Best available tier (cached after first call)
#[inline]
pub fn simd_level() -> SimdLevel {
    if let Some(level) = SimdLevel::from_u8(SIMD_LEVEL.load(Ordering::Acquire)) {
        return level;
    }
    let level = probe();
    // Release publishes the SVE width stored during the probe.
    SIMD_LEVEL.store(level as u8, Ordering::Release);
    log::debug!("vector capability probe selected {:?}", level);
    level
}

/// Check if AVX-512 VBMI is available (cached after first call)
#[inline]
pub fn has_avx512_vbmi() -> bool {
    simd_level() == SimdLevel::Avx512Vbmi
}

/// Check if SSSE3 is available (cached after first call)
///
/// True on every AVX-512 VBMI part as well.
#[inline]
pub fn has_ssse3() -> bool {
    matches!(simd_level(), SimdLevel::Ssse3 | SimdLevel::Avx512Vbmi)
}

/// Check if NEON is available (aarch64 only)
#[inline]
pub fn has_neon() -> bool {
    matches!(simd_level(), SimdLevel::Neon | SimdLevel::Sve)
}

/// SVE vector length in bytes, or `None` when SVE is absent.
#[inline]
pub fn sve_vector_bytes() -> Option<usize> {
    // The level probe also fills in the width.
    simd_level();
    match SVE_VECTOR_BYTES.load(Ordering::Relaxed) {
        0 => None,
        n => Some(n),
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
fn probe() -> SimdLevel {
    if is_x86_feature_detected!("avx512f")
        && is_x86_feature_detected!("avx512bw")
        && is_x86_feature_detected!("avx512vbmi")
    {
        SimdLevel::Avx512Vbmi
    } else if is_x86_feature_detected!("ssse3") {
        SimdLevel::Ssse3
    } else {
        SimdLevel::None
    }
}

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
fn probe() -> SimdLevel {
    if std::arch::is_aarch64_feature_detected!("sve") {
        // SAFETY: SVE support was just confirmed.
        let width = unsafe { super::aarch64::sve::read_vector_bytes() };
        SVE_VECTOR_BYTES.store(width, Ordering::Relaxed);
        // A 128-bit SVE unit is no wider than NEON; keep the fixed-width path.
        if width > super::aarch64::neon::DECODE_BLOCK {
            return SimdLevel::Sve;
        }
    }
    SimdLevel::Neon
}

#[cfg(not(all(
    feature = "simd",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
fn probe() -> SimdLevel {
    SimdLevel::None
}

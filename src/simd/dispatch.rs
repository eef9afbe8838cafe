//! Block dispatcher
//!
//! Every vector kernel is a free function of the same shape,
//! `unsafe fn(&[u8], &mut [u8]) -> usize`. A [`Kernel`] names one of them;
//! the best kernel for this CPU is resolved once from the cached
//! capability probe and never changes afterwards.

use std::fmt;
use std::str::FromStr;

use super::detect::{self, SimdLevel};

/// Shared signature of every block kernel.
///
/// Consumes whole blocks from the first slice, writes to the second, and
/// returns the number of input bytes consumed.
pub type BlockFn = unsafe fn(&[u8], &mut [u8]) -> usize;

/// Encode/decode entry points for one kernel.
#[derive(Clone, Copy)]
pub struct KernelFns {
    pub encode: BlockFn,
    pub decode: BlockFn,
}

/// A block-kernel implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// x86_64 AVX-512 VBMI, 48 → 64 byte blocks.
    Avx512Vbmi,
    /// x86_64 SSSE3, 12 → 16 byte blocks.
    Ssse3,
    /// aarch64 NEON, 12 → 16 byte blocks.
    Neon,
    /// aarch64 SVE; `width` is the vector length in bytes.
    Sve { width: usize },
    /// No vector path: consumes nothing, everything goes to the scalar codec.
    Scalar,
}

/// Error returned when a kernel name is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown kernel '{name}' (expected one of: auto, avx512vbmi, ssse3, neon, sve, scalar)")]
pub struct UnknownKernel {
    pub name: String,
}

impl Kernel {
    /// Fastest kernel usable on this CPU (cached after first call).
    ///
    /// Preference: AVX-512 VBMI > SSSE3 on x86_64, SVE wider than 16 bytes >
    /// NEON on aarch64, otherwise [`Kernel::Scalar`].
    pub fn best() -> Kernel {
        let caps = detect::detect();
        match caps.level {
            SimdLevel::Avx512Vbmi => Kernel::Avx512Vbmi,
            SimdLevel::Ssse3 => Kernel::Ssse3,
            SimdLevel::Sve => match caps.sve_vector_bytes {
                Some(width) => Kernel::Sve { width },
                None => Kernel::Neon,
            },
            SimdLevel::Neon => Kernel::Neon,
            SimdLevel::None => Kernel::Scalar,
        }
    }

    /// Every kernel this CPU can run, best first, ending with `Scalar`.
    pub fn available() -> Vec<Kernel> {
        let mut kernels = Vec::new();
        let caps = detect::detect();
        if caps.level == SimdLevel::Avx512Vbmi {
            kernels.push(Kernel::Avx512Vbmi);
        }
        if detect::has_ssse3() {
            kernels.push(Kernel::Ssse3);
        }
        if caps.level == SimdLevel::Sve
            && let Some(width) = caps.sve_vector_bytes
        {
            kernels.push(Kernel::Sve { width });
        }
        if detect::has_neon() {
            kernels.push(Kernel::Neon);
        }
        kernels.push(Kernel::Scalar);
        kernels
    }

    /// Whether this kernel can run on the current CPU.
    pub fn is_available(&self) -> bool {
        match self {
            Kernel::Avx512Vbmi => detect::has_avx512_vbmi(),
            Kernel::Ssse3 => detect::has_ssse3(),
            Kernel::Neon => detect::has_neon(),
            Kernel::Sve { width } => {
                detect::simd_level() == SimdLevel::Sve
                    && detect::sve_vector_bytes() == Some(*width)
            }
            Kernel::Scalar => true,
        }
    }

    /// Short lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Avx512Vbmi => "avx512vbmi",
            Kernel::Ssse3 => "ssse3",
            Kernel::Neon => "neon",
            Kernel::Sve { .. } => "sve",
            Kernel::Scalar => "scalar",
        }
    }

    /// Raw bytes per encode block (0 for `Scalar`).
    pub fn encode_block_len(&self) -> usize {
        match self {
            Kernel::Avx512Vbmi => 48,
            Kernel::Ssse3 | Kernel::Neon => 12,
            Kernel::Sve { width } => super::vla::encode_block(*width),
            Kernel::Scalar => 0,
        }
    }

    /// Characters per decode block (0 for `Scalar`).
    pub fn decode_block_len(&self) -> usize {
        match self {
            Kernel::Avx512Vbmi => 64,
            Kernel::Ssse3 | Kernel::Neon => 16,
            Kernel::Sve { width } => super::vla::decode_block(*width),
            Kernel::Scalar => 0,
        }
    }

    /// Entry points for this kernel, or `None` for `Scalar` and kernels
    /// not compiled for this target.
    fn fns(&self) -> Option<KernelFns> {
        match self {
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Kernel::Avx512Vbmi => Some(KernelFns {
                encode: super::x86_64::avx512::encode,
                decode: super::x86_64::avx512::decode,
            }),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Kernel::Ssse3 => Some(KernelFns {
                encode: super::x86_64::ssse3::encode,
                decode: super::x86_64::ssse3::decode,
            }),
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Kernel::Neon => Some(KernelFns {
                encode: super::aarch64::neon::encode,
                decode: super::aarch64::neon::decode,
            }),
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Kernel::Sve { .. } => Some(KernelFns {
                encode: super::aarch64::sve::encode,
                decode: super::aarch64::sve::decode,
            }),
            _ => None,
        }
    }

    /// Encode as many whole blocks as fit, returning input bytes consumed.
    ///
    /// Always `floor(input.len() / block) * block`, or 0 when this kernel is
    /// `Scalar` or not usable on this CPU.
    ///
    /// # Panics
    ///
    /// If `output` is shorter than `consumed * 4 / 3`.
    pub fn encode_blocks(&self, input: &[u8], output: &mut [u8]) -> usize {
        match self.fns() {
            // SAFETY: availability implies the CPU supports the kernel's features.
            Some(fns) if self.is_available() => unsafe { (fns.encode)(input, output) },
            _ => 0,
        }
    }

    /// Decode as many whole blocks as are clean, returning characters
    /// consumed.
    ///
    /// Stops before the first block containing `=` or a byte outside the
    /// alphabet; that block and everything after it is left to the scalar
    /// codec.
    ///
    /// # Panics
    ///
    /// If `output` cannot hold `3 / 4` of every whole input block.
    pub fn decode_blocks(&self, input: &[u8], output: &mut [u8]) -> usize {
        match self.fns() {
            // SAFETY: availability implies the CPU supports the kernel's features.
            Some(fns) if self.is_available() => unsafe { (fns.decode)(input, output) },
            _ => 0,
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Avx512Vbmi => write!(f, "AVX-512 VBMI"),
            Kernel::Ssse3 => write!(f, "SSSE3"),
            Kernel::Neon => write!(f, "NEON"),
            Kernel::Sve { width } => write!(f, "SVE ({}-bit)", width * 8),
            Kernel::Scalar => write!(f, "Scalar"),
        }
    }
}

impl FromStr for Kernel {
    type Err = UnknownKernel;

    /// Parse a kernel name. `sve` resolves to the probed vector length.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Kernel::best()),
            "avx512vbmi" | "avx512" => Ok(Kernel::Avx512Vbmi),
            "ssse3" => Ok(Kernel::Ssse3),
            "neon" => Ok(Kernel::Neon),
            "sve" => Ok(Kernel::Sve {
                width: detect::sve_vector_bytes().unwrap_or(super::vla::MIN_WIDTH),
            }),
            "scalar" | "none" => Ok(Kernel::Scalar),
            _ => Err(UnknownKernel {
                name: s.to_string(),
            }),
        }
    }
}

/// Encode whole blocks with the best kernel for this CPU.
pub fn encode_blocks(input: &[u8], output: &mut [u8]) -> usize {
    Kernel::best().encode_blocks(input, output)
}

/// Decode whole clean blocks with the best kernel for this CPU.
pub fn decode_blocks(input: &[u8], output: &mut [u8]) -> usize {
    Kernel::best().decode_blocks(input, output)
}

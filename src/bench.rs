//! Throughput measurement for comparing kernels.
//!
//! Every available [`Kernel`] (plus the scalar codec) can be timed on the
//! same random payloads:
//! - encode, with and without the trailing newline
//! - decode, lenient and strict
//!
//! Each measurement is calibrated to run for roughly a target duration, then
//! repeated after a few warmup rounds.
//!
//! # Example
//!
//! ```no_run
//! use vbase64::bench::{BenchConfig, Operation, measure};
//! use vbase64::{Engine, Kernel};
//!
//! let config = BenchConfig::quick();
//! for kernel in Kernel::available() {
//!     let m = measure(Engine::new(kernel), Operation::Encode, 65536, &config);
//!     println!("{} {}", kernel, m.throughput_display());
//! }
//! ```

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use rand::RngCore;

use crate::core::config::BenchSettings;
use crate::encoders::Engine;
use crate::simd::{self, Kernel, SimdLevel};

/// Operations timed by the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Encode,
    EncodeNewline,
    Decode,
    DecodeStrict,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Encode,
        Operation::EncodeNewline,
        Operation::Decode,
        Operation::DecodeStrict,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encode => write!(f, "encode"),
            Operation::EncodeNewline => write!(f, "encode(newline)"),
            Operation::Decode => write!(f, "decode"),
            Operation::DecodeStrict => write!(f, "decode(strict)"),
        }
    }
}

/// Platform capabilities for SIMD.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub arch: &'static str,
    pub simd_features: Vec<String>,
    pub selected: Kernel,
}

impl PlatformInfo {
    /// Detect current platform capabilities.
    pub fn detect() -> Self {
        let caps = simd::detect();
        let mut simd_features = Vec::new();

        match caps.level {
            SimdLevel::Avx512Vbmi => {
                simd_features.push("AVX-512 VBMI".to_string());
                simd_features.push("SSSE3".to_string());
            }
            SimdLevel::Ssse3 => simd_features.push("SSSE3".to_string()),
            SimdLevel::Neon | SimdLevel::Sve => simd_features.push("NEON".to_string()),
            SimdLevel::None => {}
        }
        if let Some(bytes) = caps.sve_vector_bytes {
            simd_features.push(format!("SVE {}-bit", bytes * 8));
        }

        PlatformInfo {
            arch: std::env::consts::ARCH,
            simd_features,
            selected: Kernel::best(),
        }
    }

    /// Format as display string.
    pub fn display(&self) -> String {
        if self.simd_features.is_empty() {
            self.arch.to_string()
        } else {
            format!("{} ({})", self.arch, self.simd_features.join(", "))
        }
    }
}

/// How long and how often to measure.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub sizes: Vec<usize>,
    pub iterations: usize,
    pub warmup: usize,
    pub target: Duration,
}

/// Lower bound on operations per timed run.
const MIN_OPS_PER_RUN: u64 = 100;

impl BenchConfig {
    /// Short run over a few representative sizes.
    pub fn quick() -> Self {
        BenchConfig {
            sizes: vec![64, 1024, 65536],
            iterations: 3,
            warmup: 1,
            target: Duration::from_millis(50),
        }
    }

    /// Powers of two from 16 bytes to 1 MiB, for scaling analysis.
    pub fn scaling_sizes() -> Vec<usize> {
        (4..=20).map(|shift| 1usize << shift).collect()
    }
}

impl From<&BenchSettings> for BenchConfig {
    fn from(settings: &BenchSettings) -> Self {
        BenchConfig {
            sizes: settings.sizes.clone(),
            iterations: settings.iterations,
            warmup: settings.warmup,
            target: Duration::from_millis(settings.target_ms),
        }
    }
}

/// Result of timing one operation at one size.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub operation: Operation,
    pub kernel: Kernel,
    /// Raw (decoded) payload size in bytes.
    pub size: usize,
    pub ops_per_run: u64,
    /// Mean time per operation.
    pub mean_ns: f64,
    /// Coefficient of variation across iterations, in percent.
    pub cv_percent: f64,
}

impl Measurement {
    /// Raw payload bytes processed per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.mean_ns > 0.0 {
            self.size as f64 / self.mean_ns * 1e9
        } else {
            0.0
        }
    }

    pub fn throughput_display(&self) -> String {
        format_throughput(self.bytes_per_second())
    }
}

/// Random payload and its encoding.
struct Payload {
    raw: Vec<u8>,
    encoded: Vec<u8>,
}

impl Payload {
    fn random(size: usize) -> Self {
        let mut raw = vec![0u8; size];
        rand::rng().fill_bytes(&mut raw);
        let encoded = crate::encoders::scalar::encode(&raw, false);
        Payload { raw, encoded }
    }
}

/// Run `op` `num_ops` times, returning the elapsed time.
fn run_ops(engine: Engine, op: Operation, payload: &Payload, num_ops: u64) -> Duration {
    let start = Instant::now();
    for _ in 0..num_ops {
        match op {
            Operation::Encode => {
                black_box(engine.encode_with_newline(black_box(&payload.raw), false));
            }
            Operation::EncodeNewline => {
                black_box(engine.encode_with_newline(black_box(&payload.raw), true));
            }
            Operation::Decode => {
                let _ = black_box(engine.decode(black_box(&payload.encoded)));
            }
            Operation::DecodeStrict => {
                let _ = black_box(engine.decode_strict(black_box(&payload.encoded)));
            }
        }
    }
    start.elapsed()
}

/// Determine how many operations fill roughly `target`.
fn calibrate_ops(engine: Engine, op: Operation, payload: &Payload, target: Duration) -> u64 {
    let mut num_ops = MIN_OPS_PER_RUN;
    let mut elapsed = run_ops(engine, op, payload, num_ops);

    if elapsed < Duration::from_millis(1) {
        // Too fast to extrapolate from; scale up and measure again
        let elapsed_ms = elapsed.as_secs_f64() * 1e3;
        num_ops = scale_ops(num_ops, target, elapsed_ms.max(0.1));
        elapsed = run_ops(engine, op, payload, num_ops);
    }

    let elapsed_ms = elapsed.as_secs_f64() * 1e3;
    if elapsed_ms > 0.0 {
        num_ops = scale_ops(num_ops, target, elapsed_ms);
    }
    num_ops
}

fn scale_ops(num_ops: u64, target: Duration, elapsed_ms: f64) -> u64 {
    let target_ms = target.as_secs_f64() * 1e3;
    ((num_ops as f64 * target_ms / elapsed_ms) as u64).max(MIN_OPS_PER_RUN)
}

/// Time `op` on a fresh random payload of `size` bytes.
pub fn measure(engine: Engine, op: Operation, size: usize, config: &BenchConfig) -> Measurement {
    let payload = Payload::random(size);
    measure_payload(engine, op, &payload, config)
}

fn measure_payload(
    engine: Engine,
    op: Operation,
    payload: &Payload,
    config: &BenchConfig,
) -> Measurement {
    let num_ops = calibrate_ops(engine, op, payload, config.target);

    for _ in 0..config.warmup {
        run_ops(engine, op, payload, num_ops);
    }

    let per_op: Vec<f64> = (0..config.iterations.max(1))
        .map(|_| run_ops(engine, op, payload, num_ops).as_nanos() as f64 / num_ops as f64)
        .collect();
    let (mean_ns, stdev_ns) = mean_stdev(&per_op);

    Measurement {
        operation: op,
        kernel: engine.kernel(),
        size: payload.raw.len(),
        ops_per_run: num_ops,
        mean_ns,
        cv_percent: if mean_ns > 0.0 {
            stdev_ns / mean_ns * 100.0
        } else {
            0.0
        },
    }
}

/// Time every operation at every configured size for each kernel.
///
/// Kernels share the same payload per size so results are comparable.
pub fn run_suite(kernels: &[Kernel], config: &BenchConfig) -> Vec<Measurement> {
    let mut results = Vec::new();
    for &size in &config.sizes {
        let payload = Payload::random(size);
        for &kernel in kernels {
            let engine = Engine::new(kernel);
            for op in Operation::ALL {
                log::debug!("measuring {} {} at {} bytes", kernel, op, size);
                results.push(measure_payload(engine, op, &payload, config));
            }
        }
    }
    results
}

/// Peak encode and decode rates (bytes/ns) per size for `kernel`.
pub fn scaling_analysis(kernel: Kernel, config: &BenchConfig) -> Vec<(usize, f64, f64)> {
    let engine = Engine::new(kernel);
    BenchConfig::scaling_sizes()
        .into_iter()
        .map(|size| {
            let payload = Payload::random(size);
            let encode = measure_payload(engine, Operation::Encode, &payload, config);
            let decode = measure_payload(engine, Operation::Decode, &payload, config);
            (size, size as f64 / encode.mean_ns, size as f64 / decode.mean_ns)
        })
        .collect()
}

fn mean_stdev(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if samples.len() < 2 {
        return (mean, 0.0);
    }
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Format throughput in human-readable units.
pub fn format_throughput(bytes_per_second: f64) -> String {
    if bytes_per_second >= 1e9 {
        format!("{:.2} GB/s", bytes_per_second / 1e9)
    } else if bytes_per_second >= 1e6 {
        format!("{:.2} MB/s", bytes_per_second / 1e6)
    } else if bytes_per_second >= 1e3 {
        format!("{:.2} KB/s", bytes_per_second / 1e3)
    } else {
        format!("{:.2} B/s", bytes_per_second)
    }
}

/// Format a byte count as `16`, `4K`, `1M`.
pub fn format_size(size: usize) -> String {
    if size >= 1 << 20 {
        format!("{}M", size >> 20)
    } else if size >= 1 << 10 {
        format!("{}K", size >> 10)
    } else {
        size.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> BenchConfig {
        BenchConfig {
            sizes: vec![48, 300],
            iterations: 2,
            warmup: 0,
            target: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_platform_info() {
        let info = PlatformInfo::detect();
        assert_eq!(info.arch, std::env::consts::ARCH);
        assert!(info.display().starts_with(info.arch));
        assert_eq!(info.selected, Kernel::best());
    }

    #[test]
    fn test_run_suite_covers_every_combination() {
        let kernels = Kernel::available();
        let results = run_suite(&kernels, &tiny());
        assert_eq!(results.len(), 2 * kernels.len() * Operation::ALL.len());
        for m in &results {
            assert!(m.ops_per_run >= MIN_OPS_PER_RUN);
            assert!(m.mean_ns > 0.0);
            assert!(m.bytes_per_second() > 0.0);
        }
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_size(16), "16");
        assert_eq!(format_size(4096), "4K");
        assert_eq!(format_size(1_048_576), "1M");
        assert_eq!(format_throughput(2.5e9), "2.50 GB/s");
        assert_eq!(format_throughput(1_500.0), "1.50 KB/s");
        assert_eq!(format_throughput(12.0), "12.00 B/s");
    }

    #[test]
    fn test_mean_stdev() {
        assert_eq!(mean_stdev(&[4.0]), (4.0, 0.0));
        let (mean, stdev) = mean_stdev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(mean, 5.0);
        assert!((stdev - 2.138).abs() < 1e-3);
    }

    #[test]
    fn test_scaling_sizes() {
        let sizes = BenchConfig::scaling_sizes();
        assert_eq!(sizes.first(), Some(&16));
        assert_eq!(sizes.last(), Some(&1_048_576));
        assert_eq!(sizes.len(), 17);
    }
}

use clap::Args;
use std::path::PathBuf;

/// Arguments for encoding data
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Do not append a newline to the output
    #[arg(short = 'n', long)]
    pub no_newline: bool,

    /// Wrap encoded lines after N characters (0 disables wrapping)
    #[arg(short = 'w', long, value_name = "N")]
    pub wrap: Option<usize>,
}

/// Arguments for decoding data
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Reject anything that is not canonical base64
    #[arg(short = 's', long)]
    pub strict: bool,
}

/// Arguments for reporting CPU capabilities
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the throughput benchmark
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Comma-separated payload sizes in bytes (e.g. 64,256,1024)
    #[arg(short = 's', long, value_delimiter = ',', value_name = "SIZES")]
    pub sizes: Option<Vec<usize>>,

    /// Number of timed iterations
    #[arg(short = 'i', long)]
    pub iterations: Option<usize>,

    /// Number of warmup iterations
    #[arg(short = 'w', long)]
    pub warmup: Option<usize>,

    /// Quick run with fewer iterations and sizes
    #[arg(long)]
    pub quick: bool,

    /// Also run a scaling analysis across powers of two
    #[arg(long)]
    pub scaling: bool,

    /// Only measure the selected kernel (skip the scalar comparison)
    #[arg(long)]
    pub selected_only: bool,
}

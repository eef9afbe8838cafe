mod args;
mod global;
mod handlers;

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use vbase64::Settings;

use args::{BenchArgs, DecodeArgs, DetectArgs, EncodeArgs};
use global::GlobalArgs;

#[derive(Parser)]
#[command(name = "vbase64")]
#[command(version)]
#[command(about = "SIMD-accelerated base64 encoder and decoder", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode binary data to base64
    Encode(EncodeArgs),
    /// Decode base64 to binary data
    Decode(DecodeArgs),
    /// Show CPU capabilities and the selected kernel
    Detect(DetectArgs),
    /// Measure encode/decode throughput per kernel
    Bench(BenchArgs),
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.global.log_level())
        .parse_default_env()
        .init();

    // Probe once up front so no later call pays for it
    let caps = vbase64::detect();
    log::debug!("capabilities: {:?}", caps);

    let mut settings = Settings::load_with_overrides(cli.global.config.as_deref())?;
    if let Some(kernel) = &cli.global.kernel {
        settings.codec.kernel = kernel.clone();
    }

    match cli.command {
        Commands::Encode(args) => handlers::encode::handle(args, &cli.global, &settings),
        Commands::Decode(args) => handlers::decode::handle(args, &cli.global, &settings),
        Commands::Detect(args) => handlers::detect::handle(args, &cli.global, &settings),
        Commands::Bench(args) => handlers::bench::handle(args, &cli.global, &settings),
    }
}

/// Open the input file, or stdin when none is given.
fn open_input(file: Option<&PathBuf>) -> io::Result<Box<dyn Read>> {
    Ok(match file {
        Some(path) => Box::new(io::BufReader::new(fs::File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    })
}

/// Create the output file, or stdout when none is given.
fn open_output(file: Option<&PathBuf>) -> io::Result<Box<dyn Write>> {
    Ok(match file {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::BufWriter::new(io::stdout().lock())),
    })
}

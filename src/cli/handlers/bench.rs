use crate::cli::{args::BenchArgs, global::GlobalArgs};
use vbase64::bench::{self, BenchConfig, Measurement, PlatformInfo};
use vbase64::{Kernel, Settings};

pub fn handle(
    args: BenchArgs,
    _global: &GlobalArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = if args.quick {
        BenchConfig::quick()
    } else {
        BenchConfig::from(&settings.bench)
    };
    if let Some(sizes) = args.sizes {
        config.sizes = sizes;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(warmup) = args.warmup {
        config.warmup = warmup;
    }
    if config.sizes.is_empty() {
        return Err("no benchmark sizes given".into());
    }

    let selected = settings.kernel()?;
    let mut kernels = vec![selected];
    if !args.selected_only && selected != Kernel::Scalar {
        kernels.push(Kernel::Scalar);
    }

    println!("vbase64 benchmark");
    println!("Platform: {}", PlatformInfo::detect().display());
    println!(
        "Iterations: {}, Warmup: {}",
        config.iterations, config.warmup
    );
    println!();
    println!(
        "{:<16} {:<14} {:>8}  {:>15}  {:>10}  {:>12}",
        "Benchmark", "Kernel", "Size", "Time/op", "Variance", "Throughput"
    );
    println!("{}", "-".repeat(84));

    let results = bench::run_suite(&kernels, &config);
    let mut last_size = None;
    for m in &results {
        if last_size.is_some_and(|size| size != m.size) {
            println!();
        }
        last_size = Some(m.size);
        print_measurement(m);
    }

    if args.scaling {
        print_scaling(selected, &config);
    }
    Ok(())
}

fn print_measurement(m: &Measurement) {
    println!(
        "{:<16} {:<14} {:>8}  {:>12.1} ns  (+/- {:>5.1}%)  {:>12}",
        m.operation.to_string(),
        m.kernel.to_string(),
        bench::format_size(m.size),
        m.mean_ns,
        m.cv_percent,
        m.throughput_display()
    );
}

fn print_scaling(kernel: Kernel, config: &BenchConfig) {
    println!();
    println!("Scaling Analysis ({})", kernel);
    println!("{}", "=".repeat(75));
    println!("Measuring bytes processed per nanosecond at different sizes");
    println!();
    println!("{:>10}  {:>15}  {:>15}", "Size", "Encode (B/ns)", "Decode (B/ns)");
    println!("{}", "-".repeat(45));

    let rates = bench::scaling_analysis(kernel, config);
    for (size, encode, decode) in &rates {
        println!(
            "{:>10}  {:>15.3}  {:>15.3}",
            bench::format_size(*size),
            encode,
            decode
        );
    }

    let peak_encode = rates.iter().map(|r| r.1).fold(0.0, f64::max);
    let peak_decode = rates.iter().map(|r| r.2).fold(0.0, f64::max);
    println!();
    println!("Peak encode rate: {}", bench::format_throughput(peak_encode * 1e9));
    println!("Peak decode rate: {}", bench::format_throughput(peak_decode * 1e9));
}

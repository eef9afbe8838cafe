use crate::cli::{args::DetectArgs, global::GlobalArgs};
use vbase64::bench::PlatformInfo;
use vbase64::{Kernel, Settings};

pub fn handle(
    args: DetectArgs,
    _global: &GlobalArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let caps = vbase64::detect();
    let platform = PlatformInfo::detect();
    let configured = settings.kernel()?;
    let available = Kernel::available();

    if args.json {
        let report = serde_json::json!({
            "arch": platform.arch,
            "level": format!("{:?}", caps.level),
            "features": platform.simd_features,
            "sve_vector_bytes": caps.sve_vector_bytes,
            "best": platform.selected.name(),
            "selected": {
                "name": configured.name(),
                "encode_block": configured.encode_block_len(),
                "decode_block": configured.decode_block_len(),
            },
            "available": available.iter().map(|k| k.name()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Platform:    {}", platform.display());
    match caps.sve_vector_bytes {
        Some(bytes) => println!("SVE vector:  {} bytes", bytes),
        None => println!("SVE vector:  n/a"),
    }
    println!("Best kernel: {}", platform.selected);
    if configured == Kernel::Scalar {
        println!("Selected:    {} (no vector blocks)", configured);
    } else {
        println!(
            "Selected:    {} ({} -> {} byte blocks)",
            configured,
            configured.encode_block_len(),
            configured.decode_block_len()
        );
    }
    let names: Vec<&str> = available.iter().map(|k| k.name()).collect();
    println!("Available:   {}", names.join(", "));
    Ok(())
}

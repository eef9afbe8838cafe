use crate::cli::{args::EncodeArgs, global::GlobalArgs, open_input, open_output};
use vbase64::{Engine, Settings, StreamingEncoder};

pub fn handle(
    args: EncodeArgs,
    global: &GlobalArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::from_settings(settings)?;
    let wrap = args.wrap.unwrap_or(settings.codec.wrap);
    let newline = settings.codec.newline && !args.no_newline;

    let mut input = open_input(args.file.as_ref())?;
    let output = open_output(args.output.as_ref())?;

    let mut encoder = StreamingEncoder::new(engine, output)
        .with_newline(newline)
        .with_wrap(wrap);
    let consumed = encoder.encode(&mut input)?;

    if !global.quiet {
        log::info!("encoded {} bytes with {}", consumed, engine.kernel());
    }
    Ok(())
}

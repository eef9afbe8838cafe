use crate::cli::{args::DecodeArgs, global::GlobalArgs, open_input, open_output};
use vbase64::{Engine, Settings, StreamingDecoder};

pub fn handle(
    args: DecodeArgs,
    global: &GlobalArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::from_settings(settings)?;
    let strict = args.strict || settings.codec.strict;

    let mut input = open_input(args.file.as_ref())?;
    let output = open_output(args.output.as_ref())?;

    // Trailing newline from `encode` must not trip strict mode
    let mut decoder = StreamingDecoder::new(engine, output)
        .with_strict(strict)
        .with_trim_end(true);
    let written = decoder.decode(&mut input)?;

    if !global.quiet {
        log::info!(
            "decoded {} bytes with {}{}",
            written,
            engine.kernel(),
            if strict { " (strict)" } else { "" }
        );
    }
    Ok(())
}

use std::io::{Read, Write};

use crate::encoders::engine::Engine;
use crate::encoders::scalar;

// 4K triplets; a multiple of every fixed encode block
const CHUNK_SIZE: usize = 12288;

/// Streaming encoder for processing large amounts of data efficiently.
///
/// Processes data in chunks to avoid loading entire files into memory.
/// Output is byte-identical to [`Engine::encode_with_newline`], optionally
/// wrapped into lines.
pub struct StreamingEncoder<W: Write> {
    engine: Engine,
    writer: W,
    newline: bool,
    wrap: usize,
    column: usize,
}

impl<W: Write> StreamingEncoder<W> {
    /// Creates a new streaming encoder.
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine doing the encoding
    /// * `writer` - The destination for encoded output
    pub fn new(engine: Engine, writer: W) -> Self {
        StreamingEncoder {
            engine,
            writer,
            newline: false,
            wrap: 0,
            column: 0,
        }
    }

    /// Append `\n` after the last line.
    pub fn with_newline(mut self, newline: bool) -> Self {
        self.newline = newline;
        self
    }

    /// Break output into lines of `width` characters (0 disables).
    pub fn with_wrap(mut self, width: usize) -> Self {
        self.wrap = width;
        self
    }

    /// Encodes everything `reader` yields.
    ///
    /// Returns the number of input bytes consumed.
    pub fn encode<R: Read>(&mut self, reader: &mut R) -> std::io::Result<u64> {
        let mut input = vec![0u8; CHUNK_SIZE];
        let mut output = vec![0u8; scalar::encoded_len(CHUNK_SIZE, false)];
        let mut pending = 0;
        let mut total = 0u64;

        loop {
            let bytes_read = match reader.read(&mut input[pending..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            total += bytes_read as u64;
            let filled = pending + bytes_read;

            // Only whole triplets until the end, so no padding mid-stream
            let whole = filled / 3 * 3;
            let written = self.engine.encode_into(&input[..whole], &mut output);
            self.write_wrapped(&output[..written])?;

            input.copy_within(whole..filled, 0);
            pending = filled - whole;
        }

        let written = self.engine.encode_into(&input[..pending], &mut output);
        self.write_wrapped(&output[..written])?;
        if self.newline {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;

        log::debug!("streamed {} bytes through {}", total, self.engine.kernel());
        Ok(total)
    }

    fn write_wrapped(&mut self, mut data: &[u8]) -> std::io::Result<()> {
        if self.wrap == 0 {
            return self.writer.write_all(data);
        }
        while !data.is_empty() {
            // Line breaks go in lazily so the last line never gets a stray one
            if self.column == self.wrap {
                self.writer.write_all(b"\n")?;
                self.column = 0;
            }
            let take = (self.wrap - self.column).min(data.len());
            self.writer.write_all(&data[..take])?;
            self.column += take;
            data = &data[take..];
        }
        Ok(())
    }

    /// Consumes the encoder, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

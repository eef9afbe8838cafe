use std::io::{Read, Write};

use crate::encoders::engine::Engine;
use crate::encoders::scalar::{self, ScalarDecoder};

const CHUNK_SIZE: usize = 4096; // 4KB chunks

/// Streaming decoder for processing large amounts of encoded data efficiently.
///
/// Processes data in chunks to avoid loading entire files into memory.
/// Decode errors are reported as [`std::io::ErrorKind::InvalidData`] wrapping
/// the underlying [`DecodeError`](crate::DecodeError).
pub struct StreamingDecoder<W: Write> {
    engine: Engine,
    writer: W,
    strict: bool,
    trim_end: bool,
}

impl<W: Write> StreamingDecoder<W> {
    /// Creates a new (lenient) streaming decoder.
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine doing the decoding
    /// * `writer` - The destination for decoded output
    pub fn new(engine: Engine, writer: W) -> Self {
        StreamingDecoder {
            engine,
            writer,
            strict: false,
            trim_end: false,
        }
    }

    /// Sets strict decoding.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Ignore trailing ASCII whitespace at the end of the input.
    pub fn with_trim_end(mut self, trim_end: bool) -> Self {
        self.trim_end = trim_end;
        self
    }

    /// Decodes everything `reader` yields.
    ///
    /// Returns the number of bytes written.
    pub fn decode<R: Read>(&mut self, reader: &mut R) -> std::io::Result<u64> {
        let mut decoder = ScalarDecoder::new(self.strict);
        let mut input = vec![0u8; CHUNK_SIZE];
        let mut output = vec![0u8; scalar::decoded_len_max(CHUNK_SIZE) + 1];
        // First byte of a whitespace run that may turn out to end the input
        let mut held: Option<u8> = None;
        let mut total = 0u64;

        loop {
            let bytes_read = match reader.read(&mut input) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let chunk = &input[..bytes_read];

            // Lenient decoding skips whitespace anyway, so only strict mode
            // has to hold it back.
            if !(self.trim_end && decoder.is_strict()) {
                total += self.feed(&mut decoder, chunk, &mut output)?;
                continue;
            }

            let trailing = chunk
                .iter()
                .rev()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            if trailing == chunk.len() {
                held = held.or(Some(chunk[0]));
                continue;
            }
            // Data follows the held run. Strict mode rejects whitespace, so
            // its first byte alone produces the error.
            if let Some(first) = held.take() {
                total += self.feed(&mut decoder, &[first], &mut output)?;
            }
            let ready = chunk.len() - trailing;
            total += self.feed(&mut decoder, &chunk[..ready], &mut output)?;
            if trailing > 0 {
                held = Some(chunk[ready]);
            }
        }

        decoder.finish().map_err(invalid_data)?;
        self.writer.flush()?;

        log::debug!(
            "streamed {} decoded bytes through {} ({})",
            total,
            self.engine.kernel(),
            if decoder.is_strict() { "strict" } else { "lenient" }
        );
        Ok(total)
    }

    fn feed(
        &mut self,
        decoder: &mut ScalarDecoder,
        chunk: &[u8],
        output: &mut [u8],
    ) -> std::io::Result<u64> {
        let written = self
            .engine
            .decode_feed(decoder, chunk, output)
            .map_err(invalid_data)?;
        self.writer.write_all(&output[..written])?;
        Ok(written as u64)
    }

    /// Consumes the decoder, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn invalid_data(err: crate::DecodeError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, err)
}

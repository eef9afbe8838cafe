//! Vector + scalar composition
//!
//! An [`Engine`] runs its block kernel over as much of the input as it can,
//! then hands the rest to the scalar codec, which gives control back at the
//! next quad boundary. Kernels only ever touch whole blocks, so the scalar
//! codec picks up at a block boundary with fresh state and never needs to
//! rewind.

use crate::core::config::{ConfigError, Settings};
use crate::simd::Kernel;

use super::errors::DecodeError;
use super::scalar::{self, ScalarDecoder};

/// Base64 codec bound to one block kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    kernel: Kernel,
}

impl Default for Engine {
    fn default() -> Self {
        Self::detect()
    }
}

impl Engine {
    /// Engine using `kernel`.
    ///
    /// A kernel the CPU cannot run is accepted but never used: every call
    /// goes straight to the scalar codec.
    pub fn new(kernel: Kernel) -> Self {
        if !kernel.is_available() {
            log::debug!("{} is not available, engine falls back to scalar", kernel);
        }
        Engine { kernel }
    }

    /// Engine using the best kernel for this CPU.
    pub fn detect() -> Self {
        Engine {
            kernel: Kernel::best(),
        }
    }

    /// Engine using the kernel named in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let kernel = settings.kernel()?;
        log::debug!("using {} kernel", kernel);
        Ok(Engine { kernel })
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Encode into `output`, returning characters written.
    ///
    /// # Panics
    ///
    /// If `output` is shorter than `scalar::encoded_len(input.len(), false)`.
    pub fn encode_into(&self, input: &[u8], output: &mut [u8]) -> usize {
        let consumed = self.kernel.encode_blocks(input, output);
        let written = consumed / 3 * 4;
        if consumed < input.len() {
            log::trace!(
                "{}: {} of {} bytes left to scalar encode",
                self.kernel,
                input.len() - consumed,
                input.len()
            );
        }
        written + scalar::encode_into(&input[consumed..], &mut output[written..])
    }

    /// Encode to a padded string without a trailing newline.
    pub fn encode(&self, input: &[u8]) -> String {
        let encoded = self.encode_with_newline(input, false);
        encoded.into_iter().map(char::from).collect()
    }

    /// Encode to bytes, optionally appending `\n`.
    pub fn encode_with_newline(&self, input: &[u8], newline: bool) -> Vec<u8> {
        let mut output = vec![0u8; scalar::encoded_len(input.len(), newline)];
        let written = self.encode_into(input, &mut output);
        if newline {
            output[written] = b'\n';
        }
        output
    }

    /// Lenient decode: bytes outside the alphabet are skipped and anything
    /// after completed padding is ignored.
    pub fn decode(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        self.decode_with(input, false)
    }

    /// Strict decode: only canonical, padded base64 is accepted.
    pub fn decode_strict(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        self.decode_with(input, true)
    }

    fn decode_with(&self, input: &[u8], strict: bool) -> Result<Vec<u8>, DecodeError> {
        let mut output = vec![0u8; scalar::decoded_len_max(input.len())];
        let mut decoder = ScalarDecoder::new(strict);
        let written = self.decode_feed(&mut decoder, input, &mut output)?;
        decoder.finish()?;
        output.truncate(written);
        Ok(output)
    }

    /// Decode the next piece of a stream, returning bytes written.
    ///
    /// The kernel runs whenever `decoder` sits between quads. After a
    /// rejected block the decoder takes over for at least one block's worth
    /// of input, then hands back to the kernel at the next quad boundary, so
    /// line-wrapped input keeps using the vector path between line breaks.
    /// `output` must hold `scalar::decoded_len_max(input.len()) + 1` bytes;
    /// the extra byte covers a quad left open by the previous piece.
    pub fn decode_feed(
        &self,
        decoder: &mut ScalarDecoder,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, DecodeError> {
        let block = if self.kernel.is_available() {
            self.kernel.decode_block_len()
        } else {
            0
        };
        let mut consumed = 0;
        let mut written = 0;

        loop {
            if block != 0 && decoder.at_quad_boundary() {
                let n = self
                    .kernel
                    .decode_blocks(&input[consumed..], &mut output[written..]);
                decoder.advance(n);
                consumed += n;
                written += n / 4 * 3;
            }
            if consumed == input.len() {
                return Ok(written);
            }

            log::trace!(
                "{}: scalar decode resumes at offset {}",
                self.kernel,
                decoder.position()
            );
            let rest = &input[consumed..];
            let min = if block == 0 { rest.len() } else { block };
            let (used, out) = decoder.feed_until_boundary(rest, &mut output[written..], min)?;
            consumed += used;
            written += out;
        }
    }
}

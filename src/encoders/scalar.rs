//! Scalar base64 codec
//!
//! The reference implementation every vector kernel must agree with, and the
//! path that finishes whatever the kernels leave behind: partial blocks,
//! padding, whitespace and malformed input.
//!
//! Decoding follows the classic permissive base64 rules. In the default
//! (lenient) mode bytes outside the alphabet are skipped and decoding stops
//! as soon as padding completes a quad. Strict mode rejects anything that is
//! not canonical base64.

use crate::core::tables::{ENCODE_ALPHABET, PAD, sextet};

use super::errors::DecodeError;

/// Length of the padded encoding of `len` bytes, plus one for the optional
/// trailing newline.
#[inline]
pub const fn encoded_len(len: usize, newline: bool) -> usize {
    len.div_ceil(3) * 4 + newline as usize
}

/// Upper bound on the bytes decoded from `len` characters.
#[inline]
pub const fn decoded_len_max(len: usize) -> usize {
    len / 4 * 3 + 2
}

/// Encode `input` into `output` with `=` padding and no newline.
///
/// Returns the number of characters written, always
/// `encoded_len(input.len(), false)`.
///
/// # Panics
///
/// If `output` is shorter than that.
pub fn encode_into(input: &[u8], output: &mut [u8]) -> usize {
    let needed = encoded_len(input.len(), false);
    assert!(
        output.len() >= needed,
        "output buffer too small: need {} bytes, got {}",
        needed,
        output.len()
    );

    let mut chunks = input.chunks_exact(3);
    let mut pos = 0;
    for triplet in &mut chunks {
        let word = u32::from_be_bytes([0, triplet[0], triplet[1], triplet[2]]);
        output[pos] = ENCODE_ALPHABET[(word >> 18) as usize & 0x3F];
        output[pos + 1] = ENCODE_ALPHABET[(word >> 12) as usize & 0x3F];
        output[pos + 2] = ENCODE_ALPHABET[(word >> 6) as usize & 0x3F];
        output[pos + 3] = ENCODE_ALPHABET[word as usize & 0x3F];
        pos += 4;
    }

    match *chunks.remainder() {
        [a] => {
            output[pos] = ENCODE_ALPHABET[(a >> 2) as usize];
            output[pos + 1] = ENCODE_ALPHABET[((a & 0x03) << 4) as usize];
            output[pos + 2] = PAD;
            output[pos + 3] = PAD;
            pos += 4;
        }
        [a, b] => {
            output[pos] = ENCODE_ALPHABET[(a >> 2) as usize];
            output[pos + 1] = ENCODE_ALPHABET[(((a & 0x03) << 4) | (b >> 4)) as usize];
            output[pos + 2] = ENCODE_ALPHABET[((b & 0x0F) << 2) as usize];
            output[pos + 3] = PAD;
            pos += 4;
        }
        _ => {}
    }

    pos
}

/// Encode `input`, optionally appending `\n`.
pub fn encode(input: &[u8], newline: bool) -> Vec<u8> {
    let mut output = vec![0u8; encoded_len(input.len(), newline)];
    let written = encode_into(input, &mut output);
    if newline {
        output[written] = b'\n';
    }
    output
}

/// Decode `input` in one go.
///
/// Returns the number of bytes written to `output`.
///
/// # Panics
///
/// If `output` is shorter than `decoded_len_max(input.len())` and the input
/// actually needs the room.
pub fn decode_into(input: &[u8], output: &mut [u8], strict: bool) -> Result<usize, DecodeError> {
    let mut decoder = ScalarDecoder::new(strict);
    let written = decoder.feed(input, output)?;
    decoder.finish()?;
    Ok(written)
}

/// Decode `input` into a new buffer.
pub fn decode(input: &[u8], strict: bool) -> Result<Vec<u8>, DecodeError> {
    let mut output = vec![0u8; decoded_len_max(input.len())];
    let written = decode_into(input, &mut output, strict)?;
    output.truncate(written);
    Ok(output)
}

/// Resumable decoder state.
///
/// Input may arrive in arbitrary pieces; feeding them one after another
/// gives the same result as decoding the concatenation. After an error the
/// decoder must be discarded.
#[derive(Debug, Clone)]
pub struct ScalarDecoder {
    strict: bool,
    /// Absolute offset of the next input byte.
    position: usize,
    /// Alphabet characters accepted so far.
    data_chars: usize,
    quad_pos: u8,
    leftchar: u8,
    pads: u8,
    padding_started: bool,
    done: bool,
}

impl ScalarDecoder {
    pub fn new(strict: bool) -> Self {
        Self::resume_at(strict, 0)
    }

    /// Start at absolute offset `position`, after `position` characters that
    /// formed whole quads of alphabet data.
    pub fn resume_at(strict: bool, position: usize) -> Self {
        ScalarDecoder {
            strict,
            position,
            data_chars: position,
            quad_pos: 0,
            leftchar: 0,
            pads: 0,
            padding_started: false,
            done: false,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Absolute offset of the next byte this decoder expects.
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once padding has completed the final quad.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// True when the state is between quads, so whole clean blocks can be
    /// decoded elsewhere and skipped with [`ScalarDecoder::advance`].
    pub fn at_quad_boundary(&self) -> bool {
        self.quad_pos == 0 && !self.done
    }

    /// Account for `chars` characters of whole alphabet quads decoded by
    /// someone else.
    pub fn advance(&mut self, chars: usize) {
        debug_assert!(self.at_quad_boundary());
        debug_assert_eq!(chars % 4, 0);
        self.position += chars;
        self.data_chars += chars;
    }

    /// Decode the next piece of input, returning bytes written to `output`.
    pub fn feed(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
        self.feed_until_boundary(input, output, input.len())
            .map(|(_, written)| written)
    }

    /// Like [`ScalarDecoder::feed`], but stop at the first quad boundary
    /// reached after at least `min` bytes.
    ///
    /// Returns `(consumed, written)`. Whatever is not consumed is left for
    /// the caller, typically a block kernel.
    pub fn feed_until_boundary(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        min: usize,
    ) -> Result<(usize, usize), DecodeError> {
        let mut written = 0;

        if self.done {
            if self.strict && !input.is_empty() {
                return Err(DecodeError::ExcessData {
                    position: self.position,
                });
            }
            self.position += input.len();
            return Ok((input.len(), 0));
        }

        for (i, &c) in input.iter().enumerate() {
            let position = self.position + i;

            if c == PAD {
                self.padding_started = true;

                if self.strict && self.quad_pos == 0 {
                    return Err(if position == 0 {
                        DecodeError::LeadingPadding
                    } else {
                        DecodeError::ExcessPadding { position }
                    });
                }
                if self.quad_pos >= 2 {
                    self.pads += 1;
                    if self.quad_pos + self.pads >= 4 {
                        if self.strict && i + 1 < input.len() {
                            return Err(DecodeError::ExcessData {
                                position: position + 1,
                            });
                        }
                        self.done = true;
                        self.quad_pos = 0;
                        self.position += input.len();
                        return Ok((input.len(), written));
                    }
                }
                continue;
            }

            let Some(value) = sextet(c) else {
                if self.strict {
                    return Err(DecodeError::InvalidCharacter { byte: c, position });
                }
                continue;
            };

            if self.strict && self.padding_started {
                return Err(DecodeError::DiscontinuousPadding { position });
            }
            self.pads = 0;
            self.data_chars += 1;

            match self.quad_pos {
                0 => {
                    self.quad_pos = 1;
                    self.leftchar = value;
                }
                1 => {
                    self.quad_pos = 2;
                    output[written] = (self.leftchar << 2) | (value >> 4);
                    written += 1;
                    self.leftchar = value & 0x0F;
                }
                2 => {
                    self.quad_pos = 3;
                    output[written] = (self.leftchar << 4) | (value >> 2);
                    written += 1;
                    self.leftchar = value & 0x03;
                }
                _ => {
                    self.quad_pos = 0;
                    output[written] = (self.leftchar << 6) | value;
                    written += 1;
                    self.leftchar = 0;
                    if i + 1 >= min {
                        self.position += i + 1;
                        return Ok((i + 1, written));
                    }
                }
            }
        }

        self.position += input.len();
        Ok((input.len(), written))
    }

    /// Check the state at end of input.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.quad_pos {
            0 => Ok(()),
            1 => Err(DecodeError::InvalidLength {
                data_chars: self.data_chars,
            }),
            _ => Err(DecodeError::IncorrectPadding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        decode(input, false)
    }

    fn strict(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        decode(input, true)
    }

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(b"", false), b"");
        assert_eq!(encode(b"", true), b"\n");
        assert_eq!(encode(b"M", false), b"TQ==");
        assert_eq!(encode(b"Ma", false), b"TWE=");
        assert_eq!(encode(b"Man", false), b"TWFu");
        assert_eq!(encode(b"Man", true), b"TWFu\n");
        assert_eq!(encode(&[0xFF, 0xEF, 0xBE], false), b"/+++");
        assert_eq!(encode(&[0u8; 48], false), vec![b'A'; 64]);
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(0, false), 0);
        assert_eq!(encoded_len(1, false), 4);
        assert_eq!(encoded_len(3, true), 5);
        assert_eq!(encoded_len(4, false), 8);
    }

    #[test]
    #[should_panic(expected = "output buffer too small")]
    fn test_encode_into_short_output_panics() {
        let mut out = [0u8; 3];
        encode_into(b"M", &mut out);
    }

    #[test]
    fn test_decode_known_values() {
        assert_eq!(lenient(b"TWFu").unwrap(), b"Man");
        assert_eq!(lenient(b"TWE=").unwrap(), b"Ma");
        assert_eq!(lenient(b"TQ==").unwrap(), b"M");
        assert_eq!(lenient(b"").unwrap(), b"");
        assert_eq!(strict(b"TWFuTWE=").unwrap(), b"ManMa");
    }

    #[test]
    fn test_lenient_skips_junk() {
        assert_eq!(lenient(b"TW\nFu\r\n").unwrap(), b"Man");
        assert_eq!(lenient(b" T*W-F#u ").unwrap(), b"Man");
        assert_eq!(lenient(&[b'T', 0x80, b'W', 0xFF, b'F', b'u']).unwrap(), b"Man");
    }

    #[test]
    fn test_lenient_stops_after_padding() {
        assert_eq!(lenient(b"TQ==TWFu").unwrap(), b"M");
        assert_eq!(lenient(b"TWE=garbage!").unwrap(), b"Ma");
    }

    #[test]
    fn test_lenient_tolerates_stray_padding() {
        assert_eq!(lenient(b"=TWFu").unwrap(), b"Man");
        assert_eq!(lenient(b"TWFu=TWFu").unwrap(), b"ManMan");
        // One '=' after two data chars is not enough; data resumes the quad
        assert_eq!(lenient(b"TQ=x=").unwrap(), vec![0x4D, 0x0C]);
    }

    #[test]
    fn test_end_of_input_errors() {
        assert_eq!(lenient(b"T"), Err(DecodeError::InvalidLength { data_chars: 1 }));
        assert_eq!(
            lenient(b"TWFuT"),
            Err(DecodeError::InvalidLength { data_chars: 5 })
        );
        assert_eq!(lenient(b"TQ"), Err(DecodeError::IncorrectPadding));
        assert_eq!(lenient(b"TWE"), Err(DecodeError::IncorrectPadding));
        assert_eq!(lenient(b"TQ="), Err(DecodeError::IncorrectPadding));
        assert_eq!(strict(b"TQ="), Err(DecodeError::IncorrectPadding));
    }

    #[test]
    fn test_strict_errors() {
        assert_eq!(strict(b"=TQ=="), Err(DecodeError::LeadingPadding));
        assert_eq!(
            strict(b"TWFu=="),
            Err(DecodeError::ExcessPadding { position: 4 })
        );
        assert_eq!(
            strict(b"TQ=x="),
            Err(DecodeError::DiscontinuousPadding { position: 3 })
        );
        assert_eq!(
            strict(b"TQ==x"),
            Err(DecodeError::ExcessData { position: 4 })
        );
        assert_eq!(
            strict(b"TW*u"),
            Err(DecodeError::InvalidCharacter {
                byte: b'*',
                position: 2
            })
        );
        assert_eq!(
            strict(b"TWFu\n"),
            Err(DecodeError::InvalidCharacter {
                byte: b'\n',
                position: 4
            })
        );
    }

    #[test]
    fn test_feeding_in_pieces_matches_one_shot() {
        let text = b"SGVsbG8sIFdvcmxkIQ==";
        for split in 0..=text.len() {
            let mut decoder = ScalarDecoder::new(true);
            let mut out = vec![0u8; 32];
            let mut written = decoder.feed(&text[..split], &mut out).unwrap();
            written += decoder.feed(&text[split..], &mut out[written..]).unwrap();
            decoder.finish().unwrap();
            assert_eq!(&out[..written], b"Hello, World!", "split at {}", split);
        }
    }

    #[test]
    fn test_excess_data_in_later_piece() {
        let mut decoder = ScalarDecoder::new(true);
        let mut out = [0u8; 8];
        decoder.feed(b"TQ==", &mut out).unwrap();
        assert!(decoder.is_done());
        assert_eq!(
            decoder.feed(b"x", &mut out),
            Err(DecodeError::ExcessData { position: 4 })
        );

        let mut decoder = ScalarDecoder::new(false);
        decoder.feed(b"TQ==", &mut out).unwrap();
        assert_eq!(decoder.feed(b"TWFu", &mut out), Ok(0));
    }

    #[test]
    fn test_resume_reports_absolute_positions() {
        let mut decoder = ScalarDecoder::resume_at(true, 16);
        let mut out = [0u8; 8];
        assert_eq!(
            decoder.feed(b"TW!u", &mut out),
            Err(DecodeError::InvalidCharacter {
                byte: b'!',
                position: 18
            })
        );

        let mut decoder = ScalarDecoder::resume_at(true, 16);
        assert_eq!(decoder.feed(b"=", &mut out), Err(DecodeError::ExcessPadding { position: 16 }));

        let mut decoder = ScalarDecoder::resume_at(false, 16);
        decoder.feed(b"T", &mut out).unwrap();
        assert_eq!(decoder.finish(), Err(DecodeError::InvalidLength { data_chars: 17 }));
    }

    #[test]
    fn test_strictness_survives_resume() {
        assert!(ScalarDecoder::new(true).is_strict());
        assert!(ScalarDecoder::resume_at(true, 64).is_strict());
        assert!(!ScalarDecoder::resume_at(false, 64).is_strict());
    }

    #[test]
    fn test_feed_until_boundary_stops_after_min() {
        let text = b"TW\nFuTWFuTWFu";
        let mut out = [0u8; 16];

        let mut decoder = ScalarDecoder::new(false);
        assert_eq!(decoder.feed_until_boundary(text, &mut out, 1), Ok((5, 3)));
        assert!(decoder.at_quad_boundary());
        assert_eq!(decoder.position(), 5);
        assert_eq!(&out[..3], b"Man");

        // The next boundary after six bytes is at nine
        let mut decoder = ScalarDecoder::new(false);
        assert_eq!(decoder.feed_until_boundary(text, &mut out, 6), Ok((9, 6)));

        // A min past the end consumes everything
        let mut decoder = ScalarDecoder::new(false);
        assert_eq!(decoder.feed_until_boundary(text, &mut out, 100), Ok((13, 9)));
        decoder.finish().unwrap();
    }

    #[test]
    fn test_feed_until_boundary_after_padding_consumes_rest() {
        let mut out = [0u8; 8];
        let mut decoder = ScalarDecoder::new(false);
        assert_eq!(decoder.feed_until_boundary(b"TQ==junk", &mut out, 1), Ok((8, 1)));
        assert!(decoder.is_done());
        assert!(!decoder.at_quad_boundary());
    }
}

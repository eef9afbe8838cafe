use thiserror::Error;

/// Errors raised while decoding base64 text.
///
/// The vector kernels never produce these: they stop short and leave the
/// offending block to the scalar codec, which decides what went wrong.
/// Positions are byte offsets into the full input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A byte outside the alphabet (strict mode only).
    #[error("only base64 data is allowed: invalid byte 0x{byte:02x} at position {position}")]
    InvalidCharacter { byte: u8, position: usize },

    /// Input starts with `=` (strict mode only).
    #[error("leading padding not allowed")]
    LeadingPadding,

    /// `=` where a quad starts (strict mode only).
    #[error("excess padding not allowed at position {position}")]
    ExcessPadding { position: usize },

    /// A data character after a `=` that did not complete the quad (strict
    /// mode only).
    #[error("discontinuous padding not allowed at position {position}")]
    DiscontinuousPadding { position: usize },

    /// Anything after the padding that completed the final quad (strict mode
    /// only).
    #[error("excess data after padding at position {position}")]
    ExcessData { position: usize },

    /// One data character left over after the last full quad.
    #[error(
        "invalid base64-encoded string: number of data characters ({data_chars}) cannot be 1 more than a multiple of 4"
    )]
    InvalidLength { data_chars: usize },

    /// Two or three data characters left over without enough padding.
    #[error("incorrect padding")]
    IncorrectPadding,
}

impl DecodeError {
    /// Whether this error can only occur in strict mode.
    pub fn is_strict_only(&self) -> bool {
        !matches!(
            self,
            DecodeError::InvalidLength { .. } | DecodeError::IncorrectPadding
        )
    }
}

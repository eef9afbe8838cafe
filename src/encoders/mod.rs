pub mod engine;
pub mod errors;
pub mod scalar;
pub mod streaming;

pub use engine::Engine;
pub use errors::DecodeError;
pub use scalar::ScalarDecoder;
pub use streaming::{StreamingDecoder, StreamingEncoder};

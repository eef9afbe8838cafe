mod decoder;
mod encoder;

pub use decoder::StreamingDecoder;
pub use encoder::StreamingEncoder;

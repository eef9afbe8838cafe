pub mod bench;
pub mod decode;
pub mod detect;
pub mod encode;

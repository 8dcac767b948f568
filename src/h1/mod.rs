//! HTTP/1.1 Protocol.
//!
//! - [`encode`] writes the request header block.
//! - [`parser`] locates the end of the response header block across reads and parses it.
mod error;
pub mod encode;
pub mod parser;

#[cfg(test)]
mod test;

pub use error::ProtoError;
pub use parser::{HeadBuffer, ResponseHead, MAX_HEAD_SIZE};

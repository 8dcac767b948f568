//! HTTP Header List.
//!
//! [`HeaderMap`] keeps fields in insertion order, which is also the order they are written on the
//! wire. Lookup by name is ASCII case-insensitive.
mod field;
mod map;
mod iter;
pub mod error;

#[cfg(test)]
mod test;

pub use field::HeaderField;
pub use map::HeaderMap;
pub use iter::{GetAll, Iter};
pub use error::HeaderError;

/// Header names with special meaning to the transport.
pub mod standard {
    pub const HOST: &str = "Host";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
    pub const SET_COOKIE: &str = "Set-Cookie";
}

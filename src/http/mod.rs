//! HTTP Protocol.
mod method;
mod version;
mod uri;
mod request;
mod response;
mod body;

#[cfg(test)]
mod test;

pub use method::{Method, UnknownMethod};
pub use version::Version;
pub use uri::{Uri, UriError};
pub use request::Request;
pub use response::Response;
pub use body::{RequestBody, SeekRead};

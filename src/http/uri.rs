//! Endpoint target.
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 80;

/// Target endpoint of a connection.
///
/// Only plain `http` targets are supported:
///
/// ```not_rust
///   http://example.com:8042/over/there?name=ferret
///   \__/   \_________/ \__/\_______________________/
///    |         |        |             |
/// scheme     host     port      path and query
/// ```
///
/// Fragment is dropped, userinfo is rejected. [`Uri`] is immutable once parsed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    host: String,
    port: u16,
    ipv6: bool,
    path: String,
}

impl Uri {
    /// Parse an `http` URI.
    ///
    /// # Errors
    ///
    /// Returns [`UriError`] if the input is not a valid `http` URI.
    pub fn parse(value: &str) -> Result<Uri, UriError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(UriError::Empty);
        }

        let Some((scheme, rest)) = value.split_once("://") else {
            return Err(UriError::MissingScheme);
        };
        if !scheme.eq_ignore_ascii_case("http") {
            return Err(UriError::UnsupportedScheme);
        }

        let rest = match rest.split_once('#') {
            Some((rest, _fragment)) => rest,
            None => rest,
        };

        let auth_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, path) = rest.split_at(auth_end);

        let (host, port, ipv6) = parse_authority(authority)?;

        let path = match path.as_bytes().first() {
            None => String::from("/"),
            Some(b'?') => format!("/{path}"),
            Some(_) => path.to_owned(),
        };

        if !path.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(UriError::InvalidPath);
        }

        Ok(Uri {
            host,
            port,
            ipv6,
            path,
        })
    }

    /// Returns the host, without brackets for IPv6 literals.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the path and query, e.g: `/over/there?name=ferret`.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the value of the `Host` header for this endpoint.
    ///
    /// The port is omitted when it is the default port.
    pub fn host_header(&self) -> String {
        let mut host = if self.ipv6 {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port != DEFAULT_PORT {
            host.push(':');
            host.push_str(itoa::Buffer::new().format(self.port));
        }
        host
    }
}

fn parse_authority(authority: &str) -> Result<(String, u16, bool), UriError> {
    if authority.is_empty() || authority.contains('@') {
        return Err(UriError::InvalidAuthority);
    }

    let (host, port, ipv6) = if let Some(rest) = authority.strip_prefix('[') {
        let Some((host, rest)) = rest.split_once(']') else {
            return Err(UriError::InvalidAuthority);
        };
        if host.parse::<Ipv6Addr>().is_err() {
            return Err(UriError::InvalidAuthority);
        }
        let port = match rest {
            "" => None,
            _ => match rest.strip_prefix(':') {
                Some(port) => Some(port),
                None => return Err(UriError::InvalidAuthority),
            },
        };
        (host, port, true)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port), false),
            None => (authority, None, false),
        }
    };

    if host.is_empty() {
        return Err(UriError::InvalidAuthority);
    }
    if !ipv6
        && !host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_'))
    {
        return Err(UriError::InvalidAuthority);
    }

    let port = match port {
        None | Some("") => DEFAULT_PORT,
        Some(port) => match port.parse::<u16>() {
            Ok(0) | Err(_) => return Err(UriError::InvalidPort),
            Ok(port) => port,
        },
    };

    Ok((host.to_ascii_lowercase(), port, ipv6))
}

impl FromStr for Uri {
    type Err = UriError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = UriError;

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uri::parse(value)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ipv6 {
            write!(f, "http://[{}]:{}{}", self.host, self.port, self.path)
        } else {
            write!(f, "http://{}:{}{}", self.host, self.port, self.path)
        }
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

// ===== Error =====

/// A possible error value when parsing [`Uri`].
#[derive(Clone, PartialEq, Eq)]
pub enum UriError {
    /// Input is empty.
    Empty,
    /// Input has no `scheme://` prefix.
    MissingScheme,
    /// Scheme other than `http`.
    UnsupportedScheme,
    /// Host is missing or contains invalid character.
    InvalidAuthority,
    /// Port is not a number in `1..=65535`.
    InvalidPort,
    /// Path contains whitespace, control or non-ASCII character.
    InvalidPath,
}

macro_rules! gen_error {
    ($($variant:pat => $msg:literal),* $(,)?) => {
        impl std::fmt::Display for UriError {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                use UriError::*;
                match self {
                    $($variant => f.write_str($msg),)*
                }
            }
        }
    };
}

gen_error! {
    Empty => "URI is empty",
    MissingScheme => "URI scheme is missing",
    UnsupportedScheme => "URI scheme is not supported, only `http` is",
    InvalidAuthority => "URI contains invalid authority",
    InvalidPort => "URI contains invalid port",
    InvalidPath => "URI contains invalid path",
}

impl std::error::Error for UriError { }

impl std::fmt::Debug for UriError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

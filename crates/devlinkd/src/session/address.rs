//! Controller address resolution.
//!
//! Controllers advertise themselves with `ws`/`wss` URLs, plain `http`/`https`
//! URLs, or the `xps`/`xpss` schemes used by older tooling. All of them map
//! onto a websocket URL.

use thiserror::Error;
use url::Url;

/// Errors raised while resolving a controller address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The address is not a URL.
    #[error("invalid controller address '{address}': {source}")]
    Parse {
        /// Address as given.
        address: String,
        /// Underlying parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The scheme has no websocket equivalent.
    #[error("unsupported scheme '{scheme}' in controller address '{address}'")]
    UnsupportedScheme {
        /// Address as given.
        address: String,
        /// Rejected scheme.
        scheme: String,
    },
}

/// Resolves `address` into the websocket URL to dial.
///
/// # Errors
///
/// Returns [`AddressError`] when the address does not parse or uses a scheme
/// other than `ws`, `wss`, `http`, `https`, `xps` or `xpss`.
pub fn resolve_address(address: &str) -> Result<Url, AddressError> {
    let trimmed = address.trim();
    let parse_error = |source| AddressError::Parse {
        address: address.to_owned(),
        source,
    };
    let url = Url::parse(trimmed).map_err(parse_error)?;
    let scheme = match url.scheme() {
        "ws" | "http" | "xps" => "ws",
        "wss" | "https" | "xpss" => "wss",
        other => {
            return Err(AddressError::UnsupportedScheme {
                address: address.to_owned(),
                scheme: other.to_owned(),
            });
        }
    };
    if url.scheme() == scheme {
        return Ok(url);
    }

    // `Url::set_scheme` refuses to move between special and custom schemes.
    let rest = trimmed
        .split_once(':')
        .map_or(trimmed, |(_, rest)| rest);
    Url::parse(&format!("{scheme}:{rest}")).map_err(parse_error)
}

//! Notification endpoint resolution.
//!
//! The channel lives on the same host as the page, using `wss` when the page
//! itself was loaded over `https`.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("page has no host to connect to")]
    MissingHost,

    #[error("invalid notification endpoint `{url}`")]
    Invalid {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Build the WebSocket URL for a page served from `host` over `page_protocol`.
///
/// `page_protocol` is in `Location.protocol` form (`"https:"`), `host`
/// includes the port when there is one.
pub fn endpoint_url(page_protocol: &str, host: &str, path: &str) -> Result<String, EndpointError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(EndpointError::MissingHost);
    }

    let scheme = if page_protocol.trim_end_matches(':').eq_ignore_ascii_case("https") {
        "wss"
    } else {
        "ws"
    };
    let path = if path.starts_with('/') { path } else { "/" };

    let raw = format!("{scheme}://{host}{path}");
    let url = Url::parse(&raw).map_err(|source| EndpointError::Invalid {
        url: raw.clone(),
        source,
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(EndpointError::MissingHost);
    }
    Ok(url.into())
}

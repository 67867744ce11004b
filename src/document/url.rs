//! Broker URL fallback
//!
//! An explicit URI property wins. Otherwise the URL is built from the broker
//! link: `https` when the broker serves TLS, the first instance's address and
//! the exported port.

use crate::config::links::Link;
use crate::config::tree::scalar_to_string;
use crate::error::ValidationError;

/// Resolve the broker URL
///
/// # Errors
///
/// Returns [`ValidationError::EmptyLink`] when no explicit URI is set and the
/// link lacks an instance address or a port.
#[inline]
pub fn broker_url(explicit: Option<&str>, link: Option<&Link>) -> Result<String, ValidationError> {
    if let Some(uri) = explicit.filter(|uri| !uri.is_empty()) {
        return Ok(uri.to_owned());
    }

    let endpoint = link.and_then(|link| {
        let address = link.peer_address()?;
        let port = link.properties.get("port").and_then(scalar_to_string)?;
        let scheme = if link.properties.is_blank("tls.certificate") {
            "http"
        } else {
            "https"
        };
        Some(format!("{scheme}://{address}:{port}"))
    });

    endpoint.ok_or_else(|| {
        ValidationError::empty_link(
            "Can't determine the broker URL - set broker_uri or provide a broker link with an instance address and port",
        )
    })
}

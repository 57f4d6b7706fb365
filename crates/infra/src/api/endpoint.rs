//! Endpoint address handling.

use url::Url;

use crate::errors::InfraError;

/// Join `base_url` and an absolute endpoint `path`.
///
/// Any path prefix on the base is kept (`http://host/v1` + `/api/chat` gives
/// `http://host/v1/api/chat`); a trailing slash on the base is ignored.
///
/// # Errors
///
/// Returns [`InfraError::Config`] unless `base_url` is an absolute `http` or
/// `https` URL without a query or fragment.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<String, InfraError> {
    let trimmed = base_url.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|err| InfraError::config(format!("invalid base_url '{trimmed}': {err}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(InfraError::config(format!(
            "unsupported base_url scheme '{}' (expected http or https)",
            parsed.scheme()
        )));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(InfraError::config("base_url must not carry a query or fragment"));
    }

    Ok(format!("{}{path}", trimmed.trim_end_matches('/')))
}

//! Base URL parsing and path building.

use url::Url;

use crate::error::{HttpSetupError, HttpSetupResult};

/// Parse a base URL that later receives appended path segments.
pub(crate) fn parse_base(value: &str) -> HttpSetupResult<Url> {
    let url = Url::parse(value).map_err(|source| HttpSetupError::InvalidBaseUrl {
        value: value.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(HttpSetupError::UnsupportedBaseUrl {
            value: value.to_string(),
        });
    }
    Ok(url)
}

/// Append percent-encoded `segments` to `base`, keeping any base path (e.g. `/api/v10`).
pub(crate) fn join(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

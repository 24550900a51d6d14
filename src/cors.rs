//! CORS layer built from the resolved origin list.
//!
//! Browsers send the `Origin` header as `scheme://host[:port]` with no path,
//! so each configured entry is reduced to that form before it is compared.
//! Credentials are allowed, which rules out wildcard methods and headers in
//! tower-http; requested methods and headers are mirrored instead.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use url::Url;

use crate::config::DEFAULT_CORS_ORIGINS;

/// Build the CORS layer for `origins`.
///
/// An entry of `*` allows every origin by mirroring the request origin.
/// Entries that are not valid http(s) origins are skipped with a warning;
/// if none survive, [`DEFAULT_CORS_ORIGINS`] are used instead.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow any origin");
        AllowOrigin::mirror_request()
    } else {
        let mut allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| {
                let normalized = normalize_origin(origin);
                if normalized.is_none() {
                    tracing::warn!(%origin, "Ignoring invalid CORS origin");
                }
                normalized
            })
            .collect();
        if allowed.is_empty() {
            tracing::warn!(
                origins = ?DEFAULT_CORS_ORIGINS,
                "No valid CORS origins configured, falling back to defaults"
            );
            allowed = DEFAULT_CORS_ORIGINS
                .iter()
                .filter_map(|origin| normalize_origin(origin))
                .collect();
        }
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// `https://app.example.com/` -> `https://app.example.com`
fn normalize_origin(origin: &str) -> Option<HeaderValue> {
    let url = Url::parse(origin).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    HeaderValue::from_str(&url.origin().ascii_serialization()).ok()
}

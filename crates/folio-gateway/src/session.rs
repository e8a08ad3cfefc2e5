// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use axum::http::HeaderMap;
use folio_core::{Session, SessionResolver};

/// Header carrying the site's anonymous visitor id.
pub const VISITOR_HEADER: &str = "x-visitor-id";

/// Resolves the acting user from the [`VISITOR_HEADER`] request header.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSessionResolver;

impl SessionResolver<HeaderMap> for HeaderSessionResolver {
    fn resolve_session(&self, headers: &HeaderMap) -> Session {
        match headers
            .get(VISITOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
        {
            Some(id) if !id.is_empty() => Session::anonymous(id),
            _ => Session::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_resolves_anonymous_visitor() {
        let mut headers = HeaderMap::new();
        headers.insert(VISITOR_HEADER, HeaderValue::from_static(" v-123 "));
        assert_eq!(
            HeaderSessionResolver.resolve_session(&headers),
            Session::anonymous("v-123")
        );
    }

    #[test]
    fn missing_or_blank_header_is_unresolved() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            HeaderSessionResolver.resolve_session(&headers),
            Session::Unresolved
        );
        headers.insert(VISITOR_HEADER, HeaderValue::from_static("   "));
        assert_eq!(
            HeaderSessionResolver.resolve_session(&headers),
            Session::Unresolved
        );
    }
}

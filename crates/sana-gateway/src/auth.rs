//! Caller identity.
//!
//! Token issuance (OAuth exchange, expiry, refresh) lives outside this
//! service; the gateway only consumes a verified user id. [`TokenVerifier`]
//! is that boundary, and [`StaticTokens`] is the shipped implementation: a
//! fixed bearer-token table loaded from configuration.

use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Resolves a bearer credential to the user id it was issued for.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<String>;
}

/// A fixed token → user-id table.
#[derive(Debug, Default, Clone)]
pub struct StaticTokens {
    tokens: HashMap<String, String>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    /// Parse a `token=user,token2=user2` spec (the `SANA_TOKENS` format).
    /// Malformed entries are skipped.
    pub fn parse(spec: &str) -> Self {
        let mut tokens = HashMap::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if let Some((token, user_id)) = entry.split_once('=')
                && !token.is_empty()
                && !user_id.is_empty()
            {
                tokens.insert(token.to_string(), user_id.to_string());
            }
        }
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenVerifier for StaticTokens {
    fn verify(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

/// Extract the bearer token from an `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;
    use axum::http::header::AUTHORIZATION;

    use super::{StaticTokens, TokenVerifier, bearer_token};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().expect("header value"));
        headers
    }

    #[test]
    fn bearer_token_is_extracted_case_insensitively() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn token_spec_parsing_skips_malformed_entries() {
        let tokens = StaticTokens::parse("tok1=alice, tok2=bob, =ghost, broken,");
        assert_eq!(tokens.verify("tok1").as_deref(), Some("alice"));
        assert_eq!(tokens.verify("tok2").as_deref(), Some("bob"));
        assert_eq!(tokens.verify("broken"), None);
        assert_eq!(tokens.verify("unknown"), None);
    }
}

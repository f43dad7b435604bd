//! # Metadata Resolution
//!
//! Turns a token identifier plus the contract's URI template into a
//! browsable image URL. Everything off-chain is best-effort: any failure
//! here downgrades one listing to "no image" and nothing else.

use std::time::Duration;

use alloy_primitives::U256;

use crate::bridge::MetadataFetcher;
use crate::error::MetadataError;

/// Literal placeholder the token contract leaves in its URI template.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Hex digits the substituted identifier is zero-padded to (the multi-token
/// metadata convention).
const ID_HEX_WIDTH: usize = 64;

/// Content-addressed scheme prefix rewritten to an HTTP gateway.
const IPFS_SCHEME: &str = "ipfs://";

/// Resolves token metadata through a pluggable fetcher.
pub struct MetadataResolver<F> {
    fetcher: F,
    gateway: String,
}

impl<F: MetadataFetcher> MetadataResolver<F> {
    /// Creates a resolver rewriting `ipfs://` to `gateway`.
    #[must_use]
    pub fn new(fetcher: F, gateway: impl Into<String>) -> Self {
        Self {
            fetcher,
            gateway: gateway.into(),
        }
    }

    /// Resolves the image URL for one token.
    ///
    /// Expands `{id}` in the template (lowercase hex, zero-padded to 64
    /// digits), rewrites the scheme, fetches the JSON document, and
    /// extracts its `image` field, rewritten the same way.
    ///
    /// Never fails. An unreachable endpoint, a non-JSON body, or a missing
    /// `image` field each yield `None`; the caller treats that as "no
    /// image available".
    pub async fn resolve_image(&self, token_id: U256, uri_template: &str) -> Option<String> {
        let url = self.rewrite_scheme(&expand_template(uri_template, token_id));
        let document = match self.fetcher.fetch_json(&url).await {
            Ok(document) => document,
            Err(error) => {
                tracing::debug!(url = %url, error = %error, "metadata fetch failed");
                return None;
            }
        };
        match document.get("image").and_then(serde_json::Value::as_str) {
            Some(image) => Some(self.rewrite_scheme(image)),
            None => {
                tracing::debug!(url = %url, "metadata document has no image field");
                None
            }
        }
    }

    /// Rewrites a content-addressed `ipfs://` prefix to the gateway prefix.
    /// Anything else passes through untouched.
    #[must_use]
    pub fn rewrite_scheme(&self, url: &str) -> String {
        match url.strip_prefix(IPFS_SCHEME) {
            Some(path) => format!("{}{path}", self.gateway),
            None => url.to_string(),
        }
    }
}

/// Substitutes the token identifier into the literal `{id}` placeholder.
fn expand_template(template: &str, token_id: U256) -> String {
    template.replace(ID_PLACEHOLDER, &format!("{token_id:0width$x}", width = ID_HEX_WIDTH))
}

/// Production fetcher backed by an HTTP client.
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

impl HttpMetadataFetcher {
    /// Creates a fetcher with the given per-request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("default TLS backend available");
        Self { client }
    }
}

impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, MetadataError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| MetadataError::Unreachable(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|error| MetadataError::NotJson(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{MockFetch, MockFetcher};
    use serde_json::json;

    const GATEWAY: &str = "https://ipfs.io/ipfs/";

    fn resolver(fetcher: &MockFetcher) -> MetadataResolver<MockFetcher> {
        MetadataResolver::new(fetcher.clone(), GATEWAY)
    }

    #[test]
    fn test_template_expansion_pads_to_64_hex_digits() {
        let expanded = expand_template("https://meta.example/{id}.json", U256::from(1));
        assert_eq!(
            expanded,
            format!("https://meta.example/{}1.json", "0".repeat(63))
        );

        let large = expand_template("{id}", U256::from(0xABCDu64));
        assert_eq!(large.len(), 64);
        assert!(large.ends_with("abcd"));
        // Templates without a placeholder pass through.
        assert_eq!(expand_template("static.json", U256::from(9)), "static.json");
    }

    #[tokio::test]
    async fn test_resolves_and_rewrites_image() {
        let fetcher = MockFetcher::new();
        let url = format!("{GATEWAY}QmMeta/{}7.json", "0".repeat(63));
        fetcher.set_json(&url, json!({ "image": "ipfs://QmImage/relic.png" }));

        let image = resolver(&fetcher)
            .resolve_image(U256::from(7), "ipfs://QmMeta/{id}.json")
            .await;
        assert_eq!(image.as_deref(), Some("https://ipfs.io/ipfs/QmImage/relic.png"));
    }

    #[tokio::test]
    async fn test_plain_http_image_passes_through() {
        let fetcher = MockFetcher::new();
        let url = format!("https://meta.example/{}2.json", "0".repeat(63));
        fetcher.set_json(&url, json!({ "image": "https://cdn.example/2.png" }));

        let image = resolver(&fetcher)
            .resolve_image(U256::from(2), "https://meta.example/{id}.json")
            .await;
        assert_eq!(image.as_deref(), Some("https://cdn.example/2.png"));
    }

    #[tokio::test]
    async fn test_never_raises() {
        let fetcher = MockFetcher::new();
        let r = resolver(&fetcher);

        // Unreachable endpoint.
        assert_eq!(r.resolve_image(U256::from(1), "https://down.example/{id}").await, None);

        // Non-JSON body.
        let garbage_url = format!("https://meta.example/{}3", "0".repeat(63));
        fetcher.set(&garbage_url, MockFetch::Garbage);
        assert_eq!(
            r.resolve_image(U256::from(3), "https://meta.example/{id}").await,
            None
        );

        // JSON body without an image field.
        let bare_url = format!("https://meta.example/{}4", "0".repeat(63));
        fetcher.set_json(&bare_url, json!({ "name": "relic" }));
        assert_eq!(
            r.resolve_image(U256::from(4), "https://meta.example/{id}").await,
            None
        );

        // Image field that is not a string.
        let typed_url = format!("https://meta.example/{}5", "0".repeat(63));
        fetcher.set_json(&typed_url, json!({ "image": 42 }));
        assert_eq!(
            r.resolve_image(U256::from(5), "https://meta.example/{id}").await,
            None
        );
    }
}

//! Configuration data structures for Rulegate.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files. They are
//! intentionally serde‑friendly and include defaults so that minimal configs remain concise.
//! The builder and the rule types here are considered part of the public API for embedding.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn default_base_path() -> String {
    "/".to_string()
}

/// Top-level server configuration: where to listen, the application-wide
/// base path stripped before rule matching, and the static rule table.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Leading path segment removed from every incoming path before matching.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Pattern string (e.g. `/blog/**`) to the rule applied under it.
    #[serde(default)]
    pub rules: HashMap<String, RouteRule>,
}

impl ServerConfig {
    /// Create a new server configuration builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            base_path: default_base_path(),
            rules: HashMap::new(),
        }
    }
}

/// Builder for ServerConfig to allow for cleaner configuration creation
#[derive(Default)]
pub struct ServerConfigBuilder {
    listen_addr: Option<String>,
    base_path: Option<String>,
    rules: HashMap<String, RouteRule>,
}

impl ServerConfigBuilder {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the application-wide base path
    pub fn base_path(mut self, base: impl Into<String>) -> Self {
        self.base_path = Some(base.into());
        self
    }

    /// Register a rule under the given pattern
    pub fn rule(mut self, pattern: impl Into<String>, rule: RouteRule) -> Self {
        self.rules.insert(pattern.into(), rule);
        self
    }

    /// Build the final ServerConfig
    pub fn build(self) -> Result<ServerConfig, String> {
        let listen_addr = self
            .listen_addr
            .ok_or_else(|| "listen_addr is required".to_string())?;

        Ok(ServerConfig {
            listen_addr,
            base_path: self.base_path.unwrap_or_else(default_base_path),
            rules: self.rules,
        })
    }
}

/// A sparse bag of directives applied to requests matching one pattern.
///
/// Any subset of directives may be absent. Keys this engine does not
/// interpret deserialize into `extra` and ride through the merge untouched,
/// available to downstream pipeline stages.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RouteRule {
    /// Response headers set unconditionally (overwriting existing values).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Redirect the request instead of serving it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectRule>,
    /// Forward the request to an upstream target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyRule>,
    /// Directives opaque to this engine, passed through the merge as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RouteRule {
    /// Whether no directive at all is set on this rule.
    pub fn is_empty(&self) -> bool {
        self.headers.is_none()
            && self.redirect.is_none()
            && self.proxy.is_none()
            && self.extra.is_empty()
    }

    /// Convenience constructor for a headers-only rule.
    pub fn with_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: Some(
                headers
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Convenience constructor for a redirect-only rule.
    pub fn with_redirect(to: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            redirect: Some(RedirectRule {
                to: to.into(),
                status_code,
                strip_base: None,
            }),
            ..Self::default()
        }
    }

    /// Convenience constructor for a proxy-only rule.
    pub fn with_proxy(to: impl Into<String>) -> Self {
        Self {
            proxy: Some(ProxyRule {
                to: to.into(),
                ..ProxyRule::default()
            }),
            ..Self::default()
        }
    }
}

/// Redirect directive: where to send the client and with which status code.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RedirectRule {
    /// Target path or URL; a trailing `/**` requests the wildcard rewrite.
    pub to: String,
    /// HTTP status code for the redirect response (307 when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Prefix stripped from the request path before the wildcard rewrite.
    /// Filled from the owning pattern when left unset on a wildcard rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_base: Option<String>,
}

/// Proxy directive: the upstream target plus options forwarded with the call.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProxyRule {
    /// Upstream target URL; a trailing `/**` requests the wildcard rewrite.
    pub to: String,
    /// Prefix stripped from the request path before the wildcard rewrite.
    /// Filled from the owning pattern when left unset on a wildcard rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_base: Option<String>,
    /// Extra headers attached to the outgoing proxied request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Transport options opaque to this engine, carried along for the client.
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_listen_addr() {
        let result = ServerConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_defaults_base_path() {
        let config = ServerConfig::builder()
            .listen_addr("127.0.0.1:0")
            .rule("/api/**", RouteRule::with_proxy("http://backend:8080/**"))
            .build()
            .unwrap();

        assert_eq!(config.base_path, "/");
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn test_sparse_rule_deserialization() {
        let rule: RouteRule = serde_json::from_str(r#"{"headers": {"x-robots-tag": "none"}}"#)
            .expect("headers-only rule should parse");
        assert!(rule.headers.is_some());
        assert!(rule.redirect.is_none());
        assert!(rule.proxy.is_none());
        assert!(!rule.is_empty());
    }

    #[test]
    fn test_unknown_directives_are_preserved() {
        let rule: RouteRule =
            serde_json::from_str(r#"{"cache": {"max_age": 60}, "cors": true}"#).unwrap();
        assert_eq!(rule.extra.len(), 2);
        assert_eq!(rule.extra["cors"], serde_json::json!(true));

        let round_trip = serde_json::to_value(&rule).unwrap();
        assert_eq!(round_trip["cache"]["max_age"], serde_json::json!(60));
    }

    #[test]
    fn test_redirect_rule_optional_fields() {
        let rule: RouteRule = serde_json::from_str(r#"{"redirect": {"to": "/modern"}}"#).unwrap();
        let redirect = rule.redirect.unwrap();
        assert_eq!(redirect.to, "/modern");
        assert!(redirect.status_code.is_none());
        assert!(redirect.strip_base.is_none());
    }
}

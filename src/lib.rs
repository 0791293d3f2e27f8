//! Rulegate - a route-rule resolution and application engine.
//!
//! Rulegate matches incoming request paths against a static table of route
//! rules (prefix patterns with an optional trailing `/**` wildcard), merges
//! every matching rule into one effective rule with most-specific-wins
//! precedence, and applies that rule to the in-flight exchange: response
//! header injection, redirect issuance, or upstream proxying. The crate
//! follows a **hexagonal architecture** so the engine can be embedded or
//! composed inside your own application.
//!
//! # Features
//! - Prefix/wildcard pattern table built once at startup, read-only afterwards
//! - Deterministic deep merge of all matching rules (specificity beats
//!   registration order at every nesting level)
//! - Exactly-once rule resolution per request via a request-scoped cache
//! - Response header injection, redirects, and streamed upstream proxying
//! - Loop-guard marker headers so a request is never redirected or proxied
//!   twice by the same engine, visible to fronting intermediaries
//! - Multi-format configuration (TOML / YAML / JSON) with startup validation
//! - Structured tracing via `tracing`
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use rulegate::{RouteRulesEngine, adapters::HttpClientAdapter, config::ServerConfig};
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let cfg: ServerConfig = rulegate::config::loader::load_config("config.toml").await?;
//! let client = Arc::new(HttpClientAdapter::new()?);
//! let engine = Arc::new(RouteRulesEngine::new(&cfg, client));
//! // Wire the engine into an Axum router via `create_route_rules_layer` (see binary crate)
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations)
//! while keeping the matching and merging logic inside `core`. End users
//! should prefer the re‑exports documented below instead of reaching into
//! internal modules directly.
//!
//! # Error Handling
//! All fallible APIs return `eyre::Result<T>` or a domain specific error type.
//! Rule resolution itself cannot fail: an unmatched path yields the empty
//! rule, and a malformed strip base degrades to the unstripped path.
//!
//! # Concurrency
//! The pattern table is built once and never mutated, so it is shared across
//! request handlers without synchronization. The per-request rule binding
//! lives in the request's extensions and dies with the request.
// Re-export public modules with explicit visibility controls
pub mod config;
pub mod ports;
pub mod tracing_setup;
pub mod utils;

// These modules are implementation details and should not be directly used by users
pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{
        HttpClientAdapter, PROXIED_HEADER, REDIRECTED_HEADER, RouteRulesEngine,
        create_route_rules_layer,
    },
    core::{RoutePattern, RuleTable, merge_rules},
    ports::http_client::HttpClient,
};

//! The request-time rule application layer.
//!
//! One Axum middleware layer owns the whole rule pipeline for a request:
//! resolve the effective rule once (cached in the request extensions), set
//! response headers, then either issue a redirect, forward to an upstream
//! target, or let the inner service run unaffected. Redirect and proxy are
//! mutually exclusive and each fires at most once per request, enforced by
//! loop-guard marker headers that other intermediaries can observe too.
use std::{pin::Pin, sync::Arc};

use axum::{
    body::Body as AxumBody,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, Uri, header},
    middleware::Next,
    response::Response,
};

use crate::{
    config::models::{ProxyRule, RouteRule, ServerConfig},
    core::RuleTable,
    ports::http_client::{HttpClient, HttpClientError, HttpClientResult},
    utils::url::{append_query, join_paths, split_query, strip_base},
};

/// Marker header set on redirect responses and honored on incoming requests:
/// a request already carrying it is never redirected again by this engine.
pub const REDIRECTED_HEADER: &str = "x-rulegate-redirect";

/// Marker header attached to forwarded upstream requests and honored on
/// incoming requests: a request already carrying it is never proxied again.
pub const PROXIED_HEADER: &str = "x-rulegate-proxy";

/// Per-request binding between one in-flight request and its effective rule.
///
/// Stored in the request's extensions, so it lives exactly as long as the
/// request and is never shared across requests.
#[derive(Clone)]
struct RequestRules(Arc<RouteRule>);

/// The rule engine shared by every request handler.
///
/// Owns the immutable pattern table, the application-wide base path, and the
/// upstream transport. Constructed once by the composition root and passed
/// into the layer via `Arc`; requires no synchronization since nothing here
/// mutates after construction.
pub struct RouteRulesEngine {
    table: RuleTable,
    base_path: String,
    http_client: Arc<dyn HttpClient>,
}

impl RouteRulesEngine {
    /// Build the engine from the static configuration and a transport.
    pub fn new(config: &ServerConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            table: RuleTable::new(&config.rules),
            base_path: config.base_path.clone(),
            http_client,
        }
    }

    /// The effective rule for a raw request path (with or without a query
    /// string): strip the application base, drop the query, match and merge.
    pub fn rules_for_path(&self, raw_path: &str) -> RouteRule {
        let stripped = strip_base(raw_path, &self.base_path);
        let (path, _) = split_query(&stripped);
        self.table.resolve(path)
    }

    /// Resolve the effective rule for `req`, computing it at most once per
    /// request. Repeated calls return the identical shared value.
    pub fn effective_rules(&self, req: &mut Request) -> Arc<RouteRule> {
        if let Some(bound) = req.extensions().get::<RequestRules>() {
            return bound.0.clone();
        }

        let rules = Arc::new(self.rules_for_path(req.uri().path()));
        req.extensions_mut().insert(RequestRules(rules.clone()));
        rules
    }

    async fn forward(
        &self,
        proxy: &ProxyRule,
        target: &str,
        req: Request,
    ) -> HttpClientResult<Response> {
        let uri: Uri = target
            .parse()
            .map_err(|e| HttpClientError::InvalidRequest(format!("Bad proxy target {target}: {e}")))?;

        let (mut parts, body) = req.into_parts();
        parts.uri = uri;
        parts.headers.insert(
            HeaderName::from_static(PROXIED_HEADER),
            HeaderValue::from_static("true"),
        );
        if let Some(extra) = &proxy.headers {
            for (name, value) in extra {
                match (name.parse::<HeaderName>(), HeaderValue::from_str(value)) {
                    (Ok(header_name), Ok(header_value)) => {
                        parts.headers.insert(header_name, header_value);
                    }
                    _ => tracing::warn!("Invalid proxy header: {} = {}", name, value),
                }
            }
        }

        self.http_client
            .send_request(Request::from_parts(parts, body))
            .await
    }
}

/// The middleware body: apply the matched rule set to one request.
pub async fn apply_route_rules(
    engine: Arc<RouteRulesEngine>,
    mut req: Request,
    next: Next,
) -> Response {
    let rules = engine.effective_rules(&mut req);

    // The rewrite operates on the raw path including the query string, so a
    // wildcard join carries the query through verbatim.
    let raw_path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    if !req.headers().contains_key(REDIRECTED_HEADER) {
        if let Some(redirect) = &rules.redirect {
            let target = rewrite_target(&redirect.to, redirect.strip_base.as_deref(), &raw_path);
            match HeaderValue::from_str(&target) {
                Ok(location) => {
                    let status = redirect
                        .status_code
                        .and_then(|code| StatusCode::from_u16(code).ok())
                        .unwrap_or(StatusCode::TEMPORARY_REDIRECT);
                    tracing::info!(target = %target, status = %status, "Redirecting request");

                    let mut response = Response::new(AxumBody::empty());
                    *response.status_mut() = status;
                    response.headers_mut().insert(header::LOCATION, location);
                    response.headers_mut().insert(
                        HeaderName::from_static(REDIRECTED_HEADER),
                        HeaderValue::from_static("true"),
                    );
                    apply_rule_headers(&rules, &mut response);
                    return response;
                }
                Err(e) => {
                    tracing::warn!("Redirect target is not a valid header value ({}), skipping: {}", target, e);
                }
            }
        }
    }

    if !req.headers().contains_key(PROXIED_HEADER) {
        if let Some(proxy) = rules.proxy.clone() {
            let target = rewrite_target(&proxy.to, proxy.strip_base.as_deref(), &raw_path);
            tracing::info!(target = %target, "Proxying request upstream");

            let mut response = match engine.forward(&proxy, &target, req).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("Upstream request failed: {}", e);
                    let mut response = Response::new(AxumBody::from("Upstream request failed"));
                    *response.status_mut() = StatusCode::BAD_GATEWAY;
                    response
                }
            };
            apply_rule_headers(&rules, &mut response);
            return response;
        }
    }

    let mut response = next.run(req).await;
    apply_rule_headers(&rules, &mut response);
    response
}

/// Create a cloneable closure wrapping [`apply_route_rules`], suitable for
/// `axum::middleware::from_fn`.
pub fn create_route_rules_layer(
    engine: Arc<RouteRulesEngine>,
) -> impl Fn(Request, Next) -> Pin<Box<dyn std::future::Future<Output = Response> + Send>> + Clone
{
    move |req, next| {
        let engine = engine.clone();
        Box::pin(async move { apply_route_rules(engine, req, next).await })
    }
}

/// Set every header the rule demands, overwriting existing values. Invalid
/// pairs are skipped with a warning.
fn apply_rule_headers(rules: &RouteRule, response: &mut Response) {
    if let Some(headers) = &rules.headers {
        for (name, value) in headers {
            match (name.parse::<HeaderName>(), HeaderValue::from_str(value)) {
                (Ok(header_name), Ok(header_value)) => {
                    response.headers_mut().insert(header_name, header_value);
                }
                _ => tracing::warn!("Invalid rule header: {} = {}", name, value),
            }
        }
    }
}

/// Compute the concrete redirect/proxy target for a request.
///
/// A target ending in the `/**` marker joins its literal part with the
/// request path (base-stripped first when a strip base is configured); any
/// other target is used as-is except that the request's query string is
/// re-attached through parse-and-serialize.
fn rewrite_target(to: &str, strip: Option<&str>, raw_path: &str) -> String {
    if let Some(stem) = to.strip_suffix("/**") {
        let target_path = match strip {
            Some(base) => strip_base(raw_path, base),
            None => raw_path.to_string(),
        };
        join_paths(stem, &target_path)
    } else if let (_, Some(query)) = split_query(raw_path) {
        append_query(to, query)
    } else {
        to.to_string()
    }
}

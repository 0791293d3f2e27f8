// Proxy behavior of the rule application layer, exercised against a real
// local upstream server: wildcard target rewrite, loop-guard marking,
// directive headers, and upstream failure handling.
#[cfg(test)]
mod test {
    use std::{net::SocketAddr, sync::Arc};

    use axum::{
        Router,
        body::Body,
        extract::Request,
        http::{StatusCode, header},
        middleware,
    };
    use http_body_util::BodyExt;
    use rulegate::{
        RouteRulesEngine, create_route_rules_layer,
        adapters::HttpClientAdapter,
        config::models::{RouteRule, ServerConfig},
    };
    use tower::ServiceExt;

    async fn fallthrough() -> &'static str {
        "fallthrough"
    }

    /// Upstream echo: reports the path it was asked for and the forwarded
    /// marker/extra headers, so assertions can see the outgoing request.
    async fn echo(req: Request) -> String {
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();
        let proxied = req.headers().contains_key("x-rulegate-proxy");
        let extra = req
            .headers()
            .get("x-proxy-extra")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        format!("path={path};proxied={proxied};extra={extra}")
    }

    async fn spawn_backend() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let backend = Router::new().fallback(echo);
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });
        addr
    }

    fn app(rules: Vec<(&str, RouteRule)>) -> Router {
        let mut config = ServerConfig::default();
        for (pattern, rule) in rules {
            config.rules.insert(pattern.to_string(), rule);
        }
        let client = Arc::new(HttpClientAdapter::new().unwrap());
        let engine = Arc::new(RouteRulesEngine::new(&config, client));

        Router::new()
            .fallback(fallthrough)
            .layer(middleware::from_fn(create_route_rules_layer(engine)))
    }

    async fn body_string(body: Body) -> String {
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).to_string()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wildcard_proxy_rewrites_target_and_marks_request() {
        let addr = spawn_backend().await;
        let app = app(vec![(
            "/old/**",
            RouteRule::with_proxy(format!("http://{addr}/new/**")),
        )]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/old/item/5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response.into_body()).await;
        assert!(body.contains("path=/new/item/5"), "unexpected body: {body}");
        assert!(body.contains("proxied=true"), "unexpected body: {body}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wildcard_proxy_preserves_query() {
        let addr = spawn_backend().await;
        let app = app(vec![(
            "/old/**",
            RouteRule::with_proxy(format!("http://{addr}/new/**")),
        )]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/old/item?x=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_string(response.into_body()).await;
        assert!(body.contains("path=/new/item?x=1"), "unexpected body: {body}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_proxy_directive_headers_are_forwarded() {
        let addr = spawn_backend().await;
        let mut rule = RouteRule::with_proxy(format!("http://{addr}/new/**"));
        rule.proxy.as_mut().unwrap().headers =
            Some([("x-proxy-extra".to_string(), "abc".to_string())].into());
        let app = app(vec![("/old/**", rule)]);

        let response = app
            .oneshot(Request::builder().uri("/old/x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_string(response.into_body()).await;
        assert!(body.contains("extra=abc"), "unexpected body: {body}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_already_proxied_request_is_not_proxied_again() {
        let addr = spawn_backend().await;
        let app = app(vec![(
            "/old/**",
            RouteRule::with_proxy(format!("http://{addr}/new/**")),
        )]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/old/item/5")
                    .header("x-rulegate-proxy", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response.into_body()).await;
        assert_eq!(body, "fallthrough");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_upstream_failure_surfaces_as_bad_gateway() {
        // Bind a port, learn its address, then drop the listener so the
        // upstream target refuses connections.
        let dead_addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let mut rule = RouteRule::with_proxy(format!("http://{dead_addr}/**"));
        rule.headers = Some([("x-observed".to_string(), "1".to_string())].into());
        let app = app(vec![("/old/**", rule)]);

        let response = app
            .oneshot(Request::builder().uri("/old/x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        // Header injection still runs on the failure response.
        assert_eq!(response.headers().get("x-observed").unwrap(), "1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_redirect_and_proxy_are_mutually_exclusive() {
        let addr = spawn_backend().await;
        let mut rule = RouteRule::with_redirect("/moved", Some(301));
        rule.proxy = RouteRule::with_proxy(format!("http://{addr}/new/**")).proxy;
        let app = app(vec![("/old/**", rule)]);

        let response = app
            .oneshot(Request::builder().uri("/old/x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // The redirect fires; the proxy never runs for the same request.
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/moved");
    }
}

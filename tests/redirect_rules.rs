// Redirect behavior of the rule application layer: wildcard rewrite, query
// preservation, loop guard, and directive merging across patterns.
#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        middleware,
    };
    use rulegate::{
        RouteRulesEngine, create_route_rules_layer,
        adapters::HttpClientAdapter,
        config::models::{RouteRule, ServerConfig},
    };
    use tower::ServiceExt;

    async fn fallthrough() -> &'static str {
        "fallthrough"
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

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wildcard_redirect_rewrites_path_and_keeps_query() {
        let app = app(vec![("/blog/**", RouteRule::with_redirect("/news/**", None))]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/blog/2024/post?x=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/news/2024/post?x=1"
        );
        // The marker is echoed on the response for fronting intermediaries.
        assert_eq!(response.headers().get("x-rulegate-redirect").unwrap(), "true");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_plain_redirect_reattaches_query() {
        let app = app(vec![("/legacy", RouteRule::with_redirect("/modern", Some(301)))]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/legacy?ref=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/modern?ref=x"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_headers_are_applied_on_redirect_responses() {
        let mut rule = RouteRule::with_redirect("/modern", Some(302));
        rule.headers = Some([("x-experiment".to_string(), "1".to_string())].into());
        let app = app(vec![("/legacy", rule)]);

        let response = app
            .oneshot(Request::builder().uri("/legacy").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get("x-experiment").unwrap(), "1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_already_redirected_request_is_not_redirected_again() {
        let app = app(vec![("/legacy", RouteRule::with_redirect("/modern", None))]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/legacy")
                    .header("x-rulegate-redirect", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_redirect_status_defaults_to_307() {
        let app = app(vec![("/legacy", RouteRule::with_redirect("/modern", None))]);

        let response = app
            .oneshot(Request::builder().uri("/legacy").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_redirect_directive_merges_across_patterns() {
        // The specific pattern supplies the target, the general one the code.
        let app = app(vec![
            ("/a/**", RouteRule::with_redirect("/general", Some(308))),
            ("/a/b", RouteRule::with_redirect("/specific", None)),
        ]);

        let response = app
            .oneshot(Request::builder().uri("/a/b").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/specific");
    }
}

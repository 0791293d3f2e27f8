pub mod http_client;
pub mod middleware;
pub mod rules_layer;

/// Re-export commonly used types from adapters
pub use http_client::HttpClientAdapter;
pub use middleware::*;
pub use rules_layer::{
    PROXIED_HEADER, REDIRECTED_HEADER, RouteRulesEngine, apply_route_rules,
    create_route_rules_layer,
};

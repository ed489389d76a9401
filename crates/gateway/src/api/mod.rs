pub mod run_agent;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use ra_domain::config::CorsConfig;

use crate::state::AppState;

/// Advertised on every response, not only on preflights.
const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Build the API router (unlayered, state not yet applied).
///
/// `/` is an alias of `/api/run-agent`.  `OPTIONS` has no route: the
/// CORS layer in [`app`] answers every `OPTIONS` request itself with an
/// empty 200.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/run-agent", post(run_agent::run_agent))
        .route("/", post(run_agent::run_agent))
        .route("/healthz", get(run_agent::healthz))
}

/// The full HTTP application: routes plus CORS, request tracing and the
/// concurrency limit, bound to `state`.
pub fn app(state: AppState) -> Router {
    let server = &state.config.server;
    tracing::info!(
        max_concurrent = server.max_concurrent_requests,
        "concurrency limit set"
    );

    router()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(build_cors_layer(&server.cors))
        .layer(TraceLayer::new_for_http())
        .layer(tower::limit::ConcurrencyLimitLayer::new(
            server.max_concurrent_requests,
        ))
        .with_state(state)
}

/// Build a [`CorsLayer`] from the configured allowed origins.
///
/// A list holding only `"*"` allows every origin.  Entries
/// ending in `:*` match any port on that host
/// (e.g. `http://localhost:*`).
pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if cors.is_wildcard() {
        tracing::warn!("CORS configured with wildcard \"*\"; all origins allowed");
        return base.allow_origin(Any);
    }

    let mut exact: Vec<HeaderValue> = Vec::new();
    let mut wildcard_prefixes: Vec<String> = Vec::new();

    for origin in &cors.allowed_origins {
        if origin.ends_with(":*") {
            wildcard_prefixes.push(origin.trim_end_matches('*').to_owned());
        } else if let Ok(hv) = origin.parse::<HeaderValue>() {
            exact.push(hv);
        } else {
            tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
        }
    }

    let allow_origin = if wildcard_prefixes.is_empty() {
        AllowOrigin::list(exact)
    } else {
        AllowOrigin::predicate(move |origin, _| {
            if exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
                return true;
            }
            let origin_str = origin.to_str().unwrap_or("");
            wildcard_prefixes.iter().any(|prefix| {
                origin_str
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
            })
        })
    };

    base.allow_origin(allow_origin)
}

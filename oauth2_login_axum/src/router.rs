//! Combined router for the login endpoints

use axum::Router;
use std::sync::Arc;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use oauth2_login::OAuthFlow;

use super::session::ActorResolver;

/// Create a router for all configured login flows, with HTTP tracing.
///
/// Mount it at `O2L_ROUTE_PREFIX` so each flow is reachable at
/// `{O2L_ROUTE_PREFIX}/{provider}`.
pub fn oauth2_login_router(
    flows: Vec<Arc<OAuthFlow>>,
    actors: Arc<dyn ActorResolver>,
) -> Router {
    oauth2_login_router_no_trace(flows, actors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`oauth2_login_router`] without the tracing middleware, for hosts
/// that bring their own.
pub fn oauth2_login_router_no_trace(
    flows: Vec<Arc<OAuthFlow>>,
    actors: Arc<dyn ActorResolver>,
) -> Router {
    super::oauth2::oauth2_router(flows, actors)
}

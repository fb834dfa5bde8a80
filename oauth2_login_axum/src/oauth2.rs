use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header::SET_COOKIE},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::{TypedHeader, headers};
use std::collections::HashMap;
use std::sync::Arc;

use oauth2_login::{CallbackQuery, FlowRequest, FlowResponse, OAuthFlow};

use super::error::error_response;
use super::session::{ActorResolver, session_id_from};

struct OAuth2State {
    flows: HashMap<String, Arc<OAuthFlow>>,
    actors: Arc<dyn ActorResolver>,
}

/// Router serving `GET /{provider}` for every configured flow.
///
/// Mount it under the configured route prefix so the resulting paths match
/// the redirect URIs registered with the providers.
pub fn oauth2_router(flows: Vec<Arc<OAuthFlow>>, actors: Arc<dyn ActorResolver>) -> Router {
    let flows = flows
        .into_iter()
        .map(|flow| (flow.provider_name().to_string(), flow))
        .collect();

    Router::new()
        .route("/{provider}", get(handle_flow))
        .with_state(Arc::new(OAuth2State { flows, actors }))
}

async fn handle_flow(
    Path(provider): Path<String>,
    State(state): State<Arc<OAuth2State>>,
    Query(query): Query<CallbackQuery>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Response {
    let Some(flow) = state.flows.get(&provider) else {
        return (StatusCode::NOT_FOUND, "Unknown provider").into_response();
    };

    let cookies = cookies.map(|TypedHeader(c)| c);

    let (session_id, set_cookie) = match session_id_from(cookies.as_ref()) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to establish flow session: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                .into_response();
        }
    };

    let actor = state.actors.resolve(cookies.as_ref()).await;

    match flow.handle(FlowRequest::new(session_id, query), &actor).await {
        Ok(response) => {
            let mut response = into_axum_response(response);
            if let Some(cookie) = set_cookie {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            response
        }
        Err(e) => error_response(e),
    }
}

fn into_axum_response(response: FlowResponse) -> Response {
    match response {
        FlowResponse::Redirect(url) => Redirect::to(&url).into_response(),
        FlowResponse::Html(body) => Html(body).into_response(),
    }
}

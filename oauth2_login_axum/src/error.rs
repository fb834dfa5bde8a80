use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use oauth2_login::OAuth2Error;

/// Maps flow errors onto HTTP responses.
///
/// Link precondition failures are reported the way a form validation error
/// would be, scoped to the `linkAccount` field, so the opener page can show
/// them inline. Anything unexpected becomes an opaque 500.
pub(super) fn error_response(err: OAuth2Error) -> Response {
    match &err {
        OAuth2Error::InvalidState => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        OAuth2Error::RegistrationRequired
        | OAuth2Error::AccountMismatch
        | OAuth2Error::AlreadyLinked => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"errors": {"linkAccount": err.to_string()}})),
        )
            .into_response(),
        _ => {
            tracing::error!("OAuth flow failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response()
        }
    }
}

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use inkwell_accounts::{SigninPayload, SignupPayload};

use crate::app::services::{AppServices, Session};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let request = match dto::parse_body::<SignupPayload>(&body) {
        Ok(v) => v,
        Err(e) => return errors::validation_error(e),
    };

    match services.signup(request).await {
        Ok(session) => session_response(session),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let request = match dto::parse_body::<SigninPayload>(&body) {
        Ok(v) => v,
        Err(e) => return errors::validation_error(e),
    };

    match services.signin(request).await {
        Ok(session) => session_response(session),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn session_response(session: Session) -> axum::response::Response {
    Json(dto::SessionResponse {
        user_id: session.user_id,
        token: session.token,
    })
    .into_response()
}

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mockable::Clock;
use tracing::{info, warn};

use inkwell_auth::JwtValidator;

use crate::app::errors::json_error;
use crate::context::AuthenticatedUser;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

/// Why a request was turned away before reaching a protected handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingHeader,
    MissingToken,
    InvalidToken,
    NoSubject,
}

impl AuthRejection {
    pub fn status(self) -> StatusCode {
        match self {
            Self::NoSubject => StatusCode::UNAUTHORIZED,
            _ => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header missing",
            Self::MissingToken => "Token missing from Authorization header",
            Self::InvalidToken => "Invalid or expired token",
            Self::NoSubject => "unauthorized",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let code = match self {
            Self::NoSubject => "unauthorized",
            _ => "forbidden",
        };
        json_error(self.status(), code, self.message())
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let token = extract_bearer(req.headers()).inspect_err(|rejection| {
        warn!(reason = rejection.message(), "rejected request without usable credentials");
    })?;

    let claims = state
        .jwt
        .validate(token, state.clock.utc())
        .map_err(|e| {
            warn!(error = %e, "token verification failed");
            AuthRejection::InvalidToken
        })?;

    let user_id = claims.subject().ok_or_else(|| {
        warn!("verified token carries no usable subject");
        AuthRejection::NoSubject
    })?;

    req.extensions_mut().insert(AuthenticatedUser::new(user_id));

    Ok(next.run(req).await)
}

/// One `info` line per request with its outcome and latency.
pub async fn trace_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = std::time::Instant::now();

    let res = next.run(req).await;

    info!(
        %method,
        %path,
        status = res.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );
    res
}

/// The second whitespace-separated segment of `Authorization: Bearer <token>`.
fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthRejection::MissingHeader)?;

    let header = header.to_str().map_err(|_| AuthRejection::MissingToken)?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthRejection::MissingToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(
                axum::http::header::AUTHORIZATION,
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers(Some("Bearer abc.def.ghi"))), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers(Some("bearer   tok"))), Ok("tok"));
    }

    #[test]
    fn missing_header_and_missing_token_are_distinct() {
        assert_eq!(extract_bearer(&headers(None)), Err(AuthRejection::MissingHeader));
        assert_eq!(extract_bearer(&headers(Some("Bearer"))), Err(AuthRejection::MissingToken));
        assert_eq!(extract_bearer(&headers(Some("Bearer   "))), Err(AuthRejection::MissingToken));
        assert_eq!(extract_bearer(&headers(Some("Basic abc"))), Err(AuthRejection::MissingToken));
    }

    #[test]
    fn only_missing_subject_maps_to_unauthorized() {
        assert_eq!(AuthRejection::MissingHeader.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthRejection::MissingToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthRejection::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthRejection::NoSubject.status(), StatusCode::UNAUTHORIZED);
    }
}

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use shopfront_core::{AppError, Subject, UserId};
use tower_sessions::Session;
use uuid::Uuid;

use crate::auth::SESSION_USER_KEY;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request subject resolved from the session, if any.
///
/// The account is re-read per request so role changes and blocks take
/// effect immediately instead of at next login.
#[derive(Clone)]
pub struct MaybeSubject(pub Option<Subject>);

/// Extractor for routes that require an authenticated subject.
pub struct CurrentSubject(pub Subject);

impl<S> FromRequestParts<S> for CurrentSubject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<MaybeSubject>()
            .and_then(|maybe| maybe.0.clone())
            .map(CurrentSubject)
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()).into())
    }
}

pub async fn load_subject(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user_id = session
        .get::<Uuid>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session: {error}")))?;

    let subject = match user_id {
        Some(id) => state
            .user_repository
            .find_by_id(UserId::from_uuid(id))
            .await?
            .map(|user| user.subject()),
        None => None,
    };

    request.extensions_mut().insert(MaybeSubject(subject));
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

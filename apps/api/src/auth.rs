//! Session login endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use shopfront_core::AppError;
use tower_sessions::Session;

use crate::dto::{LoginRequest, UserResponse};
use crate::error::ApiResult;
use crate::middleware::CurrentSubject;
use crate::state::AppState;

/// Session key holding the authenticated user identifier.
pub const SESSION_USER_KEY: &str = "user_id";

/// Development login: exchanges the bootstrap token and a known email for
/// a session. Blocked accounts are rejected at the door.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user = state
        .user_repository
        .find_by_email(payload.email.as_str())
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown account".to_owned()))?;

    if user.is_blocked {
        return Err(AppError::Forbidden("account is blocked".to_owned()).into());
    }

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, user.id.as_uuid())
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the caller's own account. Reading one's own profile needs no
/// rule-table decision.
pub async fn me_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_repository
        .find_by_id(subject.id())
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))?;

    Ok(Json(UserResponse::from(user)))
}

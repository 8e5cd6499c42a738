//! Authentication and session API endpoints.
//!
//! The presentation layer is contract-bound to hit `/auth/session` at
//! startup and `/auth/session/check` on every route change; stale verdicts
//! come back as blocking error envelopes after the local session record has
//! already been torn down, so no silent continuation is possible.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    LoginRequest, Session, SessionCheckRequest, SessionStatus, SignupRequest,
    UpdateProfileRequest,
};
use crate::AppState;

/// POST /api/auth/login - Authenticate and establish the one live session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Session> {
    let session = state.sessions.login(&request.email, &request.password).await?;
    success(session)
}

/// POST /api/auth/signup - Register a citizen account and log it in.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<Session> {
    let session = state.sessions.signup(request).await?;
    success(session)
}

/// GET /api/auth/session - Restore and validate the persisted session.
///
/// Returns the session, or null data when nobody is logged in here. A stale
/// session is destroyed before the blocking error is returned.
pub async fn current_session(State(state): State<AppState>) -> ApiResult<Option<Session>> {
    let Some(session) = state.sessions.restore().await? else {
        return success(None);
    };

    match state.sessions.check(&session).await? {
        SessionStatus::Valid => success(Some(session)),
        SessionStatus::Preempted => {
            state.sessions.logout().await?;
            Err(AppError::SessionPreempted)
        }
        SessionStatus::NotFound => {
            state.sessions.logout().await?;
            Err(AppError::SessionNotFound)
        }
    }
}

/// POST /api/auth/session/check - Validate a browser-held session copy.
///
/// On a stale verdict the singleton record is torn down only if it still
/// holds the same token that was presented.
pub async fn check_session(
    State(state): State<AppState>,
    Json(request): Json<SessionCheckRequest>,
) -> ApiResult<()> {
    let status = state
        .sessions
        .check_token(&request.email, &request.session_id)
        .await?;

    match status {
        SessionStatus::Valid => success(()),
        stale => {
            if let Some(stored) = state.sessions.restore().await? {
                if stored.user.session_id == request.session_id {
                    state.sessions.logout().await?;
                }
            }
            Err(match stale {
                SessionStatus::NotFound => AppError::SessionNotFound,
                _ => AppError::SessionPreempted,
            })
        }
    }
}

/// POST /api/auth/logout - Destroy the local session record.
///
/// Deliberately leaves the account's authoritative token alone; logging out
/// here says nothing about a session on another device.
pub async fn logout(State(state): State<AppState>) -> ApiResult<()> {
    state.sessions.logout().await?;
    success(())
}

/// PUT /api/auth/profile - Update the logged-in user's profile snapshot.
pub async fn update_profile(
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Session> {
    let session = state.sessions.update_profile(request).await?;
    success(session)
}

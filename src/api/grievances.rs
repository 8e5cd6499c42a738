//! Grievance API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    BulkTransitionOutcome, BulkTransitionRequest, CreateGrievanceRequest, Grievance,
    TransitionRequest,
};
use crate::AppState;

/// GET /api/grievances - List all grievances, newest first.
///
/// Public: outcomes are browsable without a login.
pub async fn list_grievances(State(state): State<AppState>) -> ApiResult<Vec<Grievance>> {
    success(state.grievances.list().await?)
}

/// GET /api/grievances/:id - Get a single grievance.
pub async fn get_grievance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Grievance> {
    success(state.grievances.get(&id).await?)
}

/// POST /api/grievances - File a new grievance as the logged-in citizen.
pub async fn create_grievance(
    State(state): State<AppState>,
    Json(request): Json<CreateGrievanceRequest>,
) -> ApiResult<Grievance> {
    let session = state.sessions.current().await?;
    success(state.grievances.create(request, &session.user).await?)
}

/// PUT /api/grievances/:id/status - Transition a grievance's status.
///
/// Staff-only: citizens file and delete, staff move status.
pub async fn transition_grievance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> ApiResult<Grievance> {
    let session = state.sessions.current().await?;
    if !session.user.role.is_management() {
        return Err(AppError::Forbidden(
            "Only municipal staff may update grievance status".to_string(),
        ));
    }

    let grievance = state
        .grievances
        .transition(
            &id,
            request.status,
            &session.user.name,
            request.note,
            request.resolution_image,
        )
        .await?;
    success(grievance)
}

/// PUT /api/grievances/batch/status - Transition several grievances.
///
/// Outcomes are reported per id; partial success is expected, not an error.
pub async fn bulk_transition_grievances(
    State(state): State<AppState>,
    Json(request): Json<BulkTransitionRequest>,
) -> ApiResult<Vec<BulkTransitionOutcome>> {
    let session = state.sessions.current().await?;
    if !session.user.role.is_management() {
        return Err(AppError::Forbidden(
            "Only municipal staff may update grievance status".to_string(),
        ));
    }
    if request.ids.is_empty() {
        return Err(AppError::Validation("No grievance ids provided".to_string()));
    }

    let outcomes = state
        .grievances
        .bulk_transition(
            &request.ids,
            request.status,
            &session.user.name,
            request.note,
            request.resolution_image,
        )
        .await;
    success(outcomes)
}

/// DELETE /api/grievances/:id - Delete a grievance as its original reporter.
pub async fn delete_grievance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let session = state.sessions.current().await?;
    state.grievances.remove(&id, &session.user).await?;
    success(())
}

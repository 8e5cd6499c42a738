//! Announcement API endpoints. Content records only; no state machine.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::db::Collection;
use crate::errors::AppError;
use crate::models::{Announcement, CreateAnnouncementRequest, UserRole};
use crate::AppState;

/// GET /api/announcements - List all announcements, newest first.
pub async fn list_announcements(State(state): State<AppState>) -> ApiResult<Vec<Announcement>> {
    let mut announcements: Vec<Announcement> =
        state.store.get_all(Collection::Announcements).await?;
    announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    success(announcements)
}

/// POST /api/announcements - Publish an announcement (admin only).
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> ApiResult<Announcement> {
    let session = state.sessions.current().await?;
    if session.user.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "Only administrators may publish announcements".to_string(),
        ));
    }
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let announcement = Announcement {
        id: Uuid::new_v4().to_string(),
        title: request.title,
        description: request.description,
        image_url: request.image_url,
        is_active: request.is_active,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state
        .store
        .put(Collection::Announcements, &announcement.id, &announcement)
        .await?;
    success(announcement)
}

/// DELETE /api/announcements/:id - Remove an announcement (admin only).
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let session = state.sessions.current().await?;
    if session.user.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "Only administrators may remove announcements".to_string(),
        ));
    }

    if !state.store.delete(Collection::Announcements, &id).await? {
        return Err(AppError::NotFound(format!("Announcement {} not found", id)));
    }
    success(())
}

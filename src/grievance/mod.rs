//! Grievance lifecycle: validated status transitions and the append-only
//! history ledger.
//!
//! Every transition does a fresh read of the record immediately before its
//! write; nothing here assumes atomicity across the read-write gap, and no
//! operation retries on store failure.

use std::sync::Arc;

use uuid::Uuid;

use crate::db::{Collection, RecordStore};
use crate::errors::AppError;
use crate::models::{
    BulkTransitionOutcome, CreateGrievanceRequest, Grievance, GrievanceStatus, SessionUser,
    StatusHistoryEntry, TransitionOrigin,
};
use crate::triage::TriageAdvisor;

/// Owns creation, status transitions, and removal of grievance records.
#[derive(Clone)]
pub struct GrievanceLifecycle {
    store: RecordStore,
    triage: Arc<TriageAdvisor>,
}

impl GrievanceLifecycle {
    pub fn new(store: RecordStore, triage: Arc<TriageAdvisor>) -> Self {
        Self { store, triage }
    }

    /// File a new grievance. The triage advisor is consulted once before
    /// persisting; its fallback classification is valid data, so creation
    /// never fails because triage did.
    pub async fn create(
        &self,
        request: CreateGrievanceRequest,
        reporter: &SessionUser,
    ) -> Result<Grievance, AppError> {
        if request.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if request.description.trim().is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }
        if request.landmark.trim().is_empty() || request.ward.trim().is_empty() {
            return Err(AppError::Validation(
                "Landmark and ward are required".to_string(),
            ));
        }

        let assessment = self
            .triage
            .classify(&request.title, &request.description)
            .await;

        let grievance = Grievance {
            id: Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            category: request.category,
            status: GrievanceStatus::Pending,
            reported_by: reporter.id.clone(),
            reported_by_name: reporter.name.clone(),
            location: format!("{}, {}, Puttur", request.landmark.trim(), request.ward.trim()),
            created_at: chrono::Utc::now().to_rfc3339(),
            ai_analysis: Some(assessment.summary),
            resolution_note: None,
            severity: Some(assessment.severity),
            priority: Some(assessment.priority),
            history: Vec::new(),
            report_image: request.report_image,
            resolution_image: None,
        };

        self.store
            .put(Collection::Grievances, &grievance.id, &grievance)
            .await?;

        tracing::info!(id = %grievance.id, category = ?grievance.category, "Grievance filed");
        Ok(grievance)
    }

    /// Apply a status transition and append its history entry.
    ///
    /// The entry is appended unconditionally, even when the new status equals
    /// the current one; the ledger records calls, not distinct states.
    /// Resolution fields are only written on a transition to Resolved; any
    /// other transition leaves them exactly as they were.
    pub async fn transition(
        &self,
        id: &str,
        new_status: GrievanceStatus,
        actor_name: &str,
        note: Option<String>,
        resolution_image: Option<String>,
    ) -> Result<Grievance, AppError> {
        let mut grievance: Grievance = self
            .store
            .get(Collection::Grievances, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Grievance {} not found", id)))?;

        grievance.history.push(StatusHistoryEntry {
            from: TransitionOrigin::Status(grievance.status),
            to: new_status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            updated_by: actor_name.to_string(),
        });

        if new_status == GrievanceStatus::Resolved {
            grievance.resolution_note = note;
            if resolution_image.is_some() {
                grievance.resolution_image = resolution_image;
            }
        }

        let from = grievance.status;
        grievance.status = new_status;

        self.store
            .put(Collection::Grievances, id, &grievance)
            .await?;

        tracing::info!(
            id = %grievance.id,
            from = from.as_str(),
            to = new_status.as_str(),
            by = %actor_name,
            "Status transition"
        );
        Ok(grievance)
    }

    /// Apply a transition to each id independently. One id's failure is
    /// reported in its own outcome and never aborts the rest of the batch.
    pub async fn bulk_transition(
        &self,
        ids: &[String],
        new_status: GrievanceStatus,
        actor_name: &str,
        note: Option<String>,
        resolution_image: Option<String>,
    ) -> Vec<BulkTransitionOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());

        for id in ids {
            let outcome = match self
                .transition(
                    id,
                    new_status,
                    actor_name,
                    note.clone(),
                    resolution_image.clone(),
                )
                .await
            {
                Ok(grievance) => BulkTransitionOutcome {
                    id: id.clone(),
                    success: true,
                    grievance: Some(grievance),
                    error: None,
                },
                Err(err) => {
                    tracing::warn!(id = %id, "Bulk transition entry failed: {}", err);
                    BulkTransitionOutcome {
                        id: id.clone(),
                        success: false,
                        grievance: None,
                        error: Some(err.error_code().to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Hard-delete a grievance. Only the original reporter may do this;
    /// staff transition status but never delete.
    pub async fn remove(&self, id: &str, requester: &SessionUser) -> Result<(), AppError> {
        let grievance: Grievance = self
            .store
            .get(Collection::Grievances, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Grievance {} not found", id)))?;

        if grievance.reported_by != requester.id {
            return Err(AppError::Forbidden(
                "Only the original reporter may delete a grievance".to_string(),
            ));
        }

        self.store.delete(Collection::Grievances, id).await?;
        Ok(())
    }

    /// All grievances, newest first.
    pub async fn list(&self) -> Result<Vec<Grievance>, AppError> {
        let mut grievances: Vec<Grievance> = self.store.get_all(Collection::Grievances).await?;
        grievances.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(grievances)
    }

    /// A single grievance by id.
    pub async fn get(&self, id: &str) -> Result<Grievance, AppError> {
        self.store
            .get(Collection::Grievances, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Grievance {} not found", id)))
    }
}

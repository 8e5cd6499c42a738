//! Grievance model matching the frontend Report interface.

use serde::{Deserialize, Serialize};

/// Category of a citizen-filed grievance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GrievanceCategory {
    #[serde(rename = "Waste Disposal")]
    Waste,
    #[serde(rename = "Social Issues")]
    Social,
    #[serde(rename = "Road Facility")]
    Roads,
    #[serde(rename = "Water Supply")]
    Water,
    Other,
}

/// Lifecycle status of a grievance.
///
/// Pending is initial; Resolved is terminal in the exposed surface (no
/// un-resolve operation). InProgress may revert to Pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GrievanceStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl GrievanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrievanceStatus::Pending => "Pending",
            GrievanceStatus::InProgress => "In Progress",
            GrievanceStatus::Resolved => "Resolved",
        }
    }
}

/// Triage severity: the degree of impact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Lenient parse for values produced by the triage advisor; anything
    /// unrecognized lands on Medium.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "high" => Severity::High,
            _ => Severity::Medium,
        }
    }
}

/// Triage priority: the suggested urgency level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl PriorityLevel {
    /// Lenient parse for values produced by the triage advisor; anything
    /// unrecognized lands on Medium.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => PriorityLevel::Low,
            "high" => PriorityLevel::High,
            "critical" => PriorityLevel::Critical,
            _ => PriorityLevel::Medium,
        }
    }
}

/// Predecessor state recorded in a history entry. The `CREATED` sentinel is
/// reserved for a conceptual first entry; current behavior never writes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransitionOrigin {
    #[serde(rename = "CREATED")]
    Created,
    #[serde(untagged)]
    Status(GrievanceStatus),
}

/// One entry of the append-only status history ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub from: TransitionOrigin,
    pub to: GrievanceStatus,
    pub timestamp: String,
    pub updated_by: String,
}

/// A citizen-filed issue record with a status lifecycle and audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grievance {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: GrievanceCategory,
    pub status: GrievanceStatus,
    /// Account id of the reporter (weak reference; no cascade on account deletion)
    pub reported_by: String,
    pub reported_by_name: String,
    pub location: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityLevel>,
    #[serde(default)]
    pub history: Vec<StatusHistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_image: Option<String>,
}

/// Request body for filing a new grievance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGrievanceRequest {
    pub title: String,
    pub description: String,
    pub category: GrievanceCategory,
    pub ward: String,
    pub landmark: String,
    #[serde(default)]
    pub report_image: Option<String>,
}

/// Request body for a status transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub status: GrievanceStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub resolution_image: Option<String>,
}

/// Request body for transitioning several grievances at once.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTransitionRequest {
    pub ids: Vec<String>,
    pub status: GrievanceStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub resolution_image: Option<String>,
}

/// Per-id outcome of a bulk transition. One id failing never aborts the rest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTransitionOutcome {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grievance: Option<Grievance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

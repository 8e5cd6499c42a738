//! Triage advisor: best-effort AI classification of new grievances.
//!
//! Wraps the Gemini generateContent API. The advisor is an untrusted oracle:
//! every failure mode — missing key, network error, overload, malformed
//! response — degrades to a fixed fallback classification. Grievance
//! creation never fails because triage failed.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::models::{PriorityLevel, Severity};

/// Classification attached to a freshly filed grievance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageAssessment {
    pub severity: Severity,
    pub priority: PriorityLevel,
    pub summary: String,
}

/// Internal failure modes; callers only ever see the fallback they map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriageFailure {
    MissingKey,
    Overloaded,
    Unavailable,
}

impl TriageFailure {
    fn diagnostic(&self) -> &'static str {
        match self {
            TriageFailure::MissingKey => "Disconnected: API key missing.",
            TriageFailure::Overloaded => "System overloaded. Priority default applied.",
            TriageFailure::Unavailable => "AI analysis unavailable.",
        }
    }
}

/// Shape of the JSON document the model is asked to produce.
#[derive(Debug, Deserialize)]
struct RawAssessment {
    severity: String,
    priority: String,
    summary: String,
}

/// Client for the external triage classification service.
pub struct TriageAdvisor {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl TriageAdvisor {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.triage_timeout_secs))
            .build()
            .expect("Failed to build triage HTTP client");

        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.triage_model.clone(),
        }
    }

    /// Classify a report. Infallible: any upstream failure yields the
    /// Medium/Medium fallback with a diagnostic summary.
    pub async fn classify(&self, title: &str, description: &str) -> TriageAssessment {
        match self.request_assessment(title, description).await {
            Ok(assessment) => assessment,
            Err(failure) => {
                tracing::warn!("Triage classification failed: {}", failure.diagnostic());
                TriageAssessment {
                    severity: Severity::Medium,
                    priority: PriorityLevel::Medium,
                    summary: failure.diagnostic().to_string(),
                }
            }
        }
    }

    async fn request_assessment(
        &self,
        title: &str,
        description: &str,
    ) -> Result<TriageAssessment, TriageFailure> {
        let api_key = self.api_key.as_ref().ok_or(TriageFailure::MissingKey)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let prompt = format!(
            "You are an expert municipal infrastructure auditor. Analyze this citizen report \
             from Puttur, Karnataka.\n\n\
             Title: {}\n\
             Description: {}\n\n\
             Tasks:\n\
             1. Determine Severity (Low, Medium, High) based on potential danger or environmental damage.\n\
             2. Suggest Priority (Low, Medium, High, Critical) based on immediate threat to public safety or core utilities.\n\
             3. Provide a concise action-oriented summary (max 50 words).\n\n\
             Strictly follow the JSON schema.",
            title, description
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "severity": {
                            "type": "STRING",
                            "description": "The degree of impact (Low, Medium, High)"
                        },
                        "priority": {
                            "type": "STRING",
                            "description": "The suggested urgency level (Low, Medium, High, Critical)"
                        },
                        "summary": {
                            "type": "STRING",
                            "description": "Executive summary for the municipal task force"
                        }
                    },
                    "required": ["severity", "priority", "summary"]
                }
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|_| TriageFailure::Unavailable)?;

        if response.status().as_u16() == 429 {
            return Err(TriageFailure::Overloaded);
        }
        if !response.status().is_success() {
            return Err(TriageFailure::Unavailable);
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|_| TriageFailure::Unavailable)?;

        parse_assessment(&envelope).ok_or(TriageFailure::Unavailable)
    }
}

/// Pull the model's JSON document out of the generateContent envelope.
fn parse_assessment(envelope: &serde_json::Value) -> Option<TriageAssessment> {
    let text = envelope["candidates"][0]["content"]["parts"][0]["text"].as_str()?;
    if text.is_empty() {
        return None;
    }

    let raw: RawAssessment = serde_json::from_str(text).ok()?;
    Some(TriageAssessment {
        severity: Severity::parse_lenient(&raw.severity),
        priority: PriorityLevel::parse_lenient(&raw.priority),
        summary: raw.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advisor_without_key() -> TriageAdvisor {
        let config = Config {
            db_path: "./unused.sqlite".into(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            triage_model: "gemini-3-flash-preview".to_string(),
            triage_timeout_secs: 1,
        };
        TriageAdvisor::new(&config)
    }

    #[tokio::test]
    async fn test_missing_key_falls_back() {
        let advisor = advisor_without_key();
        let assessment = advisor.classify("Pothole", "deep hole").await;

        assert_eq!(assessment.severity, Severity::Medium);
        assert_eq!(assessment.priority, PriorityLevel::Medium);
        assert_eq!(assessment.summary, "Disconnected: API key missing.");
    }

    #[test]
    fn test_parse_assessment_happy_path() {
        let envelope = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"severity\":\"High\",\"priority\":\"Critical\",\"summary\":\"Dispatch road crew.\"}"
                    }]
                }
            }]
        });

        let assessment = parse_assessment(&envelope).unwrap();
        assert_eq!(assessment.severity, Severity::High);
        assert_eq!(assessment.priority, PriorityLevel::Critical);
        assert_eq!(assessment.summary, "Dispatch road crew.");
    }

    #[test]
    fn test_parse_assessment_rejects_empty_and_malformed() {
        let empty = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] } }]
        });
        assert!(parse_assessment(&empty).is_none());

        let malformed = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "not json" }] } }]
        });
        assert!(parse_assessment(&malformed).is_none());

        assert!(parse_assessment(&serde_json::json!({})).is_none());
    }

    #[test]
    fn test_parse_assessment_unknown_levels_default_to_medium() {
        let envelope = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"severity\":\"Catastrophic\",\"priority\":\"Whenever\",\"summary\":\"ok\"}"
                    }]
                }
            }]
        });

        let assessment = parse_assessment(&envelope).unwrap();
        assert_eq!(assessment.severity, Severity::Medium);
        assert_eq!(assessment.priority, PriorityLevel::Medium);
    }
}

//! Request and response bodies of the generation endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A guest and their gift, as submitted by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThankYouRequest {
    pub gift_giver_name: String,
    pub gift_description: String,
    /// e.g. `family`, `friend`, `colleague`, `family friend`.
    pub relationship: String,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub next_meeting: Option<String>,
}

impl ThankYouRequest {
    /// Data used by the `/test-generate` smoke test.
    pub fn sample() -> Self {
        Self {
            gift_giver_name: "Aunt Sarah".into(),
            gift_description: "beautiful crystal vase".into(),
            relationship: "family".into(),
            additional_notes: Some("She helped plan our wedding ceremony".into()),
            next_meeting: Some("at Christmas dinner".into()),
        }
    }

    /// Trimmed notes, or `None` when absent or blank.
    pub fn additional_notes(&self) -> Option<&str> {
        non_blank(self.additional_notes.as_deref())
    }

    /// Trimmed next-meeting text, or `None` when absent or blank.
    pub fn next_meeting(&self) -> Option<&str> {
        non_blank(self.next_meeting.as_deref())
    }

    /// Reject blank required fields.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("gift_giver_name", &self.gift_giver_name),
            ("gift_description", &self.gift_description),
            ("relationship", &self.relationship),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationMetadata {
    pub provider: String,
    pub model_parameters: Map<String, Value>,
    pub ai_config_key: String,
    pub variation_name: String,
    pub config_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThankYouResponse {
    pub thank_you_note: String,
    /// `<provider>:<model>`.
    pub ai_model_used: String,
    /// Variation key served, or `fallback`.
    pub prompt_strategy: String,
    pub generation_metadata: GenerationMetadata,
}

/// Body of `GET /ai-config/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigStatus {
    pub status: &'static str,
    pub current_provider: String,
    pub current_model: String,
    pub prompt_strategy: String,
    pub ai_config_key: String,
    pub advanced_options_enabled: bool,
    pub config_enabled: bool,
    pub variation_name: String,
}

/// `ai_config_test` section of the `/test-generate` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSmokeTest {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub model_params: Map<String, Value>,
    pub messages_count: usize,
    pub tracker_available: bool,
    pub messages_built: usize,
    pub generation_test: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_default_to_none() {
        let req: ThankYouRequest = serde_json::from_value(json!({
            "gift_giver_name": "Bob",
            "gift_description": "toaster",
            "relationship": "friend"
        }))
        .unwrap();
        assert_eq!(req.additional_notes, None);
        assert_eq!(req.next_meeting(), None);
    }

    #[test]
    fn blank_optionals_read_as_none() {
        let mut req = ThankYouRequest::sample();
        req.additional_notes = Some("   ".into());
        req.next_meeting = Some(" soon ".into());
        assert_eq!(req.additional_notes(), None);
        assert_eq!(req.next_meeting(), Some("soon"));
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        assert!(ThankYouRequest::sample().validate().is_ok());
        let mut req = ThankYouRequest::sample();
        req.gift_description = "  ".into();
        assert_eq!(req.validate().unwrap_err(), "gift_description must not be empty");
    }
}

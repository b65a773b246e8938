//! Evaluation contexts for each endpoint.

use sha2::{Digest, Sha256};

use super::ThankYouRequest;
use crate::aiconfig::{AiConfigError, Context};

const GIFT_TYPE_CHARS: usize = 20;

/// Context for `/generate`.
///
/// The key is stable per request body, so identical submissions land in the
/// same variation.
pub fn generation(request: &ThankYouRequest) -> Result<Context, AiConfigError> {
    let canonical = serde_json::to_vec(request).map_err(|e| AiConfigError::InvalidContext(e.to_string()))?;
    let key = format!("generate-user-{}", hex::encode(Sha256::digest(&canonical)));

    let gift_type = if request.gift_description.is_empty() {
        "unknown".to_string()
    } else {
        request.gift_description.chars().take(GIFT_TYPE_CHARS).collect()
    };

    Context::builder(key)
        .set("requestType", "generation")
        .set("giftType", gift_type)
        .set("relationship", request.relationship.clone())
        .set("hasAdditionalNotes", request.additional_notes().is_some())
        .set("hasNextMeeting", request.next_meeting().is_some())
        .build()
}

/// Context for resolving the AI config in `/ai-config/status`.
pub fn status() -> Result<Context, AiConfigError> {
    Context::builder("status-user")
        .set("requestType", "status")
        .set("userType", "admin")
        .build()
}

/// Context for the advanced-options flag in `/ai-config/status`.
pub fn status_flag() -> Result<Context, AiConfigError> {
    Context::builder("status-user").set("requestType", "status").build()
}

pub fn anonymous() -> Result<Context, AiConfigError> {
    Context::builder("anonymous-user").build()
}

pub fn test_generate() -> Result<Context, AiConfigError> {
    Context::builder("test-generate-user")
        .set("requestType", "test")
        .set("userType", "developer")
        .set("testMode", true)
        .build()
}

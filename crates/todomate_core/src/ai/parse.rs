//! Reply parsing.
//!
//! Generators often wrap the requested JSON in prose or code fences, so the
//! object is taken from the first `{` through the last `}`.

use crate::ai::encouragement::TagSuggestionResult;
use crate::ai::prompt::UNKNOWN_AREA;
use serde::Deserialize;

const DEFAULT_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Deserialize)]
struct EncouragementReply {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagReply {
    area_name: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    reason: String,
}

fn default_confidence() -> f32 {
    DEFAULT_CONFIDENCE
}

/// Returns the text from the first `{` to the last `}` inclusive.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Returns the reply's `message`, or the trimmed raw text when the reply is
/// not the expected JSON.
pub fn parse_encouragement(text: &str) -> String {
    extract_json_object(text)
        .and_then(|json| serde_json::from_str::<EncouragementReply>(json).ok())
        .map_or_else(|| text.trim().to_string(), |reply| reply.message)
}

/// Maps a tag-suggestion reply onto one of `allowed_areas`.
pub fn parse_tag_suggestion(text: &str, allowed_areas: &[String]) -> TagSuggestionResult {
    let Some(json) = extract_json_object(text) else {
        return TagSuggestionResult::Error("reply contained no JSON object".to_string());
    };

    let reply = match serde_json::from_str::<TagReply>(json) {
        Ok(reply) => reply,
        Err(err) => return TagSuggestionResult::Error(format!("reply parse failed: {err}")),
    };

    if reply.area_name == UNKNOWN_AREA || !allowed_areas.contains(&reply.area_name) {
        return TagSuggestionResult::NoSuggestion;
    }

    TagSuggestionResult::Success {
        area_name: reply.area_name,
        confidence: reply.confidence,
        reason: reply.reason,
    }
}

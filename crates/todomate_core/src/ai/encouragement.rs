//! Encouragement and tag-suggestion use-cases over a [`TextGenerator`].
//!
//! # Invariants
//! - Every call returns exactly one outcome value; generator failures never
//!   escape as errors.
//! - Tag suggestions only ever name an area from the caller's list.

use crate::ai::generator::{GenerationError, TextGenerator};
use crate::ai::parse::{parse_encouragement, parse_tag_suggestion};
use crate::ai::prompt::{list_prompt, tag_prompt, weekly_prompt};
use crate::stats::summary::{AreaWeekStats, ListStats};
use log::{info, warn};

/// Outcome of an encouragement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncouragementResult {
    Success(String),
    /// Failure reason, suitable for display.
    Error(String),
}

/// Outcome of a life-area suggestion request.
#[derive(Debug, Clone, PartialEq)]
pub enum TagSuggestionResult {
    Success {
        area_name: String,
        confidence: f32,
        reason: String,
    },
    /// The generator was unsure or named an area outside the list.
    NoSuggestion,
    Error(String),
}

pub struct EncouragementService<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> EncouragementService<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn weekly_encouragement(&self, stats: &[AreaWeekStats]) -> EncouragementResult {
        self.encourage("weekly", &weekly_prompt(stats))
    }

    pub fn list_encouragement(&self, stats: &ListStats) -> EncouragementResult {
        self.encourage("list", &list_prompt(stats))
    }

    /// Suggests which of `allowed_areas` a task belongs to.
    pub fn suggest_life_area(
        &self,
        title: &str,
        description: &str,
        allowed_areas: &[String],
    ) -> TagSuggestionResult {
        match self.call(&tag_prompt(title, description, allowed_areas)) {
            Ok(text) => {
                let result = parse_tag_suggestion(&text, allowed_areas);
                info!(
                    "event=ai_tag_suggest module=ai status=ok suggested={}",
                    matches!(result, TagSuggestionResult::Success { .. })
                );
                result
            }
            Err(err) => {
                warn!("event=ai_tag_suggest module=ai status=error error={err}");
                TagSuggestionResult::Error(err.to_string())
            }
        }
    }

    fn encourage(&self, kind: &str, prompt: &str) -> EncouragementResult {
        match self.call(prompt) {
            Ok(text) => {
                info!("event=ai_encourage module=ai status=ok kind={kind}");
                EncouragementResult::Success(parse_encouragement(&text))
            }
            Err(err) => {
                warn!("event=ai_encourage module=ai status=error kind={kind} error={err}");
                EncouragementResult::Error(err.to_string())
            }
        }
    }

    fn call(&self, prompt: &str) -> Result<String, GenerationError> {
        let text = self.generator.generate(prompt)?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyReply);
        }
        Ok(text)
    }
}

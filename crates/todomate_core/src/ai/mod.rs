//! AI-assisted encouragement and life-area suggestions.
//!
//! The generator backend is a seam ([`generator::TextGenerator`]); everything
//! here degrades to rule-based text when it is missing or failing.

pub mod encouragement;
pub mod fallback;
pub mod generator;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod state;

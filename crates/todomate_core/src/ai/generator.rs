//! Text-generation seam.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No backend configured.
    Unavailable,
    /// Backend reached but the call failed.
    Transport(String),
    /// Backend returned no text.
    EmptyReply,
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "text generator is not configured"),
            Self::Transport(details) => write!(f, "text generation failed: {details}"),
            Self::EmptyReply => write!(f, "text generator returned an empty reply"),
        }
    }
}

impl Error for GenerationError {}

/// Produces free-form text for a prompt.
///
/// Implementations block; callers run them off the UI thread.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator used when no backend is wired in. Every call fails, which routes
/// callers onto their rule-based fallback text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

impl TextGenerator for UnconfiguredGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable)
    }
}

/// Generator that hands back a reply the host obtained on its own.
///
/// UI shells that call the model themselves pass the raw reply (or their
/// failure text) through this so parsing and fallbacks stay in the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReply(Result<String, GenerationError>);

impl HostReply {
    /// A non-blank `error` wins over `reply`.
    pub fn new(reply: impl Into<String>, error: &str) -> Self {
        let error = error.trim();
        if error.is_empty() {
            Self(Ok(reply.into()))
        } else {
            Self(Err(GenerationError::Transport(error.to_string())))
        }
    }
}

impl TextGenerator for HostReply {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationError, HostReply, TextGenerator, UnconfiguredGenerator};

    #[test]
    fn unconfigured_generator_always_fails() {
        assert_eq!(
            UnconfiguredGenerator.generate("anything"),
            Err(GenerationError::Unavailable)
        );
    }

    #[test]
    fn host_reply_prefers_reported_error() {
        assert_eq!(
            HostReply::new("{\"message\": \"hi\"}", "  ").generate("p"),
            Ok("{\"message\": \"hi\"}".to_string())
        );
        assert_eq!(
            HostReply::new("ignored", " quota exceeded ").generate("p"),
            Err(GenerationError::Transport("quota exceeded".to_string()))
        );
    }
}

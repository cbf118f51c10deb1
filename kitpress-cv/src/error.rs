//! Error types for the conversion pipeline
//!
//! Cancellation is a distinct variant, never folded into a generic failure:
//! a cancelled batch is reported as an informational outcome while every
//! other error stops the batch with a diagnostic.

use thiserror::Error;

/// Result type for conversion operations
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Conversion pipeline errors
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The user cancelled the batch at a conflict prompt or via Ctrl-C
    ///
    /// Not a fault: already-placed items stand, nothing is rolled back.
    #[error("Conversion cancelled by user.")]
    Cancelled,

    /// No usable conversion executable could be located
    ///
    /// Carries every attempted source with its individual failure reason.
    #[error("No usable conversion engine found. Tried: {}", attempts.join(" | "))]
    EngineUnavailable {
        /// One "candidate: reason" entry per probed source
        attempts: Vec<String>,
    },

    /// The engine ran but reported failure for the current item
    ///
    /// Fatal for the whole batch; there is no per-item retry or
    /// skip-and-continue.
    #[error("Engine conversion failed: {0}")]
    EngineFailed(String),

    /// Disambiguation could not find an unused name within the internal cap
    #[error("No free output name for '{stem}' within {limit} attempts")]
    NameSearchExhausted {
        /// Stem the search was derived from
        stem: String,
        /// Suffix cap that was exhausted
        limit: u32,
    },

    /// I/O error from a filesystem probe, move, or removal
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shared error (configuration, invalid input)
    #[error(transparent)]
    Common(#[from] kitpress_common::Error),
}

impl ConvertError {
    /// Whether this error is a clean user cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConvertError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinguishable() {
        assert!(ConvertError::Cancelled.is_cancelled());
        assert!(!ConvertError::EngineFailed("boom".to_string()).is_cancelled());
    }

    #[test]
    fn engine_unavailable_lists_attempts() {
        let err = ConvertError::EngineUnavailable {
            attempts: vec![
                "ffmpeg: not found".to_string(),
                "/usr/bin/ffmpeg: exit 1".to_string(),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("ffmpeg: not found"));
        assert!(text.contains("/usr/bin/ffmpeg: exit 1"));
    }
}

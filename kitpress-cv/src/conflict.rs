//! Conflict resolution for existing output names
//!
//! One prompt round-trip per conflicting name, with a batch-scoped sticky
//! "overwrite all" mode that short-circuits every later conflict in the
//! same batch.

use crate::error::{ConvertError, ConvertResult};
use crate::types::ConflictDecision;
use async_trait::async_trait;

/// The user prompt surface
///
/// Contract: one outstanding request at a time, answered exactly once. The
/// driver suspends the current item until the decision arrives.
#[async_trait]
pub trait ConflictPrompt: Send + Sync {
    /// Ask the user what to do about an existing output name
    async fn ask(&self, file_name: &str) -> ConvertResult<ConflictDecision>;
}

/// How the driver should proceed with the current item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Write over the candidate name
    Proceed,
    /// Keep the existing file; find a never-used name for this item
    Disambiguate,
}

/// Batch-scoped conflict state
///
/// Reset at batch start; the sticky flag is the only mutable state and is
/// written solely by the driver loop.
#[derive(Debug, Default)]
pub struct ConflictResolver {
    sticky_overwrite_all: bool,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a prior decision in this batch approved all overwrites
    pub fn is_sticky(&self) -> bool {
        self.sticky_overwrite_all
    }

    /// Resolve one candidate name
    ///
    /// A non-existent candidate resolves immediately with no prompt. When
    /// sticky overwrite-all is set, an existing candidate also resolves
    /// without a prompt. `Cancel` aborts the batch via
    /// [`ConvertError::Cancelled`]; completed items stand.
    pub async fn resolve(
        &mut self,
        exists: bool,
        file_name: &str,
        prompt: &dyn ConflictPrompt,
    ) -> ConvertResult<Resolution> {
        if !exists {
            return Ok(Resolution::Proceed);
        }
        if self.sticky_overwrite_all {
            return Ok(Resolution::Proceed);
        }

        match prompt.ask(file_name).await? {
            ConflictDecision::OverwriteCurrent => Ok(Resolution::Proceed),
            ConflictDecision::OverwriteAll => {
                self.sticky_overwrite_all = true;
                Ok(Resolution::Proceed)
            }
            ConflictDecision::Skip => Ok(Resolution::Disambiguate),
            ConflictDecision::Cancel => Err(ConvertError::Cancelled),
        }
    }
}

/// Prompt surface that always returns a fixed decision
///
/// Used for non-interactive runs (`--on-conflict` style policies) and in
/// tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticPrompt(pub ConflictDecision);

#[async_trait]
impl ConflictPrompt for StaticPrompt {
    async fn ask(&self, _file_name: &str) -> ConvertResult<ConflictDecision> {
        Ok(self.0)
    }
}

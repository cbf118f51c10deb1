//! Session-scoped state
//!
//! One session spans one process lifetime: the selection list and the
//! memoized engine handle live here, explicitly, instead of in globals.
//! Batch-scoped state (sticky overwrite-all, success counter) lives in the
//! driver, not here.

use crate::engine::ProcessEngine;
use crate::error::ConvertResult;
use crate::types::Selection;

/// State for one converter session
#[derive(Default)]
pub struct Session {
    /// The active selection list
    pub selection: Selection,
    engine: Option<ProcessEngine>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locate the conversion engine, at most once per session
    ///
    /// The first call probes the candidate list; later calls return the
    /// memoized handle without re-probing.
    pub async fn ensure_engine(&mut self, candidates: &[String]) -> ConvertResult<&ProcessEngine> {
        if self.engine.is_none() {
            self.engine = Some(ProcessEngine::locate(candidates).await?);
        }
        Ok(self.engine.as_ref().expect("engine just set"))
    }

    /// The memoized engine, if one has been located this session
    pub fn engine(&self) -> Option<&ProcessEngine> {
        self.engine.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_location_is_not_memoized() {
        let mut session = Session::new();
        let missing = vec!["/nonexistent/kitpress-session-ffmpeg".to_string()];
        assert!(session.ensure_engine(&missing).await.is_err());
        assert!(session.engine().is_none());
    }
}

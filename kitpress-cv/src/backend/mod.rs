//! Placement backends
//!
//! The driver is backend-agnostic: everything environment-specific — where
//! candidates live, how existence is probed, how bytes are placed — sits
//! behind this trait. Targets are opaque strings: full paths on the
//! persistent-path backend, bare names on the virtual-filesystem backend.

mod desktop;
mod memory;

pub use desktop::DesktopBackend;
pub use memory::{DownloadSink, FolderSink, OutputSink, VirtualBackend};

use crate::error::ConvertResult;
use crate::types::{ConversionOptions, FileItem};
use async_trait::async_trait;

/// Capability interface the batch driver sequences against
#[async_trait]
pub trait ConvertBackend: Send {
    /// Candidate output target for an item at a disambiguation suffix
    fn candidate(&self, item: &FileItem, suffix: u32) -> ConvertResult<String>;

    /// Whether content already exists at a target
    async fn probe(&self, target: &str) -> ConvertResult<bool>;

    /// Whether a target is the item's own input location
    ///
    /// Case sensitivity follows the environment: case-insensitive where the
    /// filesystem is, case-sensitive otherwise. Always false for ephemeral
    /// inputs — a fetched in-memory copy is never the user's original file.
    fn is_self_target(&self, item: &FileItem, target: &str) -> bool;

    /// Convert an item into a target that is distinct from its input
    async fn convert(
        &mut self,
        item: &FileItem,
        target: &str,
        options: &ConversionOptions,
    ) -> ConvertResult<()>;

    /// Convert an item whose target equals its own input
    ///
    /// Must route through a fresh temporary location and atomically replace
    /// the original afterwards; the engine reads its input incrementally
    /// while writing, so converting in place is never safe.
    async fn convert_replacing(
        &mut self,
        item: &FileItem,
        target: &str,
        options: &ConversionOptions,
    ) -> ConvertResult<()>;

    /// Target inside the kit destination folder, creating the folder if absent
    async fn kit_target(&mut self, folder: &str, name: &str) -> ConvertResult<String>;

    /// Whether an existing target should raise a user prompt
    ///
    /// Destinations with no inspectable content (download triggers) return
    /// false; collisions there are auto-disambiguated instead of prompted.
    fn prompts_on_conflict(&self) -> bool {
        true
    }
}

/// Last component of a target, for prompts and log events
pub fn display_name(target: &str) -> &str {
    target
        .rsplit(['/', '\\'])
        .next()
        .filter(|part| !part.is_empty())
        .unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_takes_the_last_component() {
        assert_eq!(display_name("/music/loops/break.wav"), "break.wav");
        assert_eq!(display_name("C:\\music\\break.wav"), "break.wav");
        assert_eq!(display_name("break.wav"), "break.wav");
        assert_eq!(display_name("H/0.wav"), "0.wav");
    }
}

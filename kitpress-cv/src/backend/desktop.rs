//! Persistent-path backend
//!
//! Outputs land beside each source file; kit exports go into a subfolder of
//! the configured kit base. Replacement of an input by its own conversion is
//! a remove + rename of a temp output, never an in-place write.

use super::ConvertBackend;
use crate::engine::ConversionEngine;
use crate::error::{ConvertError, ConvertResult};
use crate::naming;
use crate::types::{ConversionOptions, FileItem};
use async_trait::async_trait;
use kitpress_common::Error;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether this build targets a case-insensitive default filesystem
const CASE_INSENSITIVE_PATHS: bool = cfg!(any(target_os = "windows", target_os = "macos"));

/// Backend writing through a real filesystem
pub struct DesktopBackend<E: ConversionEngine> {
    engine: E,
    kit_base: Option<PathBuf>,
}

impl<E: ConversionEngine> DesktopBackend<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            kit_base: None,
        }
    }

    /// Set the directory kit export folders are created under
    pub fn with_kit_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.kit_base = Some(base.into());
        self
    }

    fn input_path<'a>(&self, item: &'a FileItem) -> ConvertResult<&'a Path> {
        item.path().ok_or_else(|| {
            ConvertError::Common(Error::InvalidInput(format!(
                "item '{}' has no filesystem path",
                item.name
            )))
        })
    }

    fn paths_equal(a: &str, b: &str) -> bool {
        if CASE_INSENSITIVE_PATHS {
            a.to_lowercase() == b.to_lowercase()
        } else {
            a == b
        }
    }
}

#[async_trait]
impl<E: ConversionEngine> ConvertBackend for DesktopBackend<E> {
    fn candidate(&self, item: &FileItem, suffix: u32) -> ConvertResult<String> {
        let input = self.input_path(item)?;
        Ok(naming::derive_output_path(input, suffix)
            .to_string_lossy()
            .into_owned())
    }

    async fn probe(&self, target: &str) -> ConvertResult<bool> {
        match tokio::fs::metadata(target).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn is_self_target(&self, item: &FileItem, target: &str) -> bool {
        match item.path() {
            Some(input) => Self::paths_equal(&input.to_string_lossy(), target),
            None => false,
        }
    }

    async fn convert(
        &mut self,
        item: &FileItem,
        target: &str,
        options: &ConversionOptions,
    ) -> ConvertResult<()> {
        let input = self.input_path(item)?;
        self.engine
            .convert_path(input, Path::new(target), options)
            .await
    }

    async fn convert_replacing(
        &mut self,
        item: &FileItem,
        target: &str,
        options: &ConversionOptions,
    ) -> ConvertResult<()> {
        let input = self.input_path(item)?.to_path_buf();
        let temp = naming::temp_output_path(&input);

        debug!(
            input = %input.display(),
            temp = %temp.display(),
            "Output equals input, converting via temp file"
        );

        self.engine.convert_path(&input, &temp, options).await?;

        // The engine finished reading the input; replace it atomically.
        if let Err(e) = tokio::fs::remove_file(target).await {
            // Clean the temp output up before surfacing the failure.
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&temp, target).await?;
        Ok(())
    }

    async fn kit_target(&mut self, folder: &str, name: &str) -> ConvertResult<String> {
        let base = self.kit_base.clone().ok_or_else(|| {
            ConvertError::Common(Error::InvalidInput(
                "kit export requires a destination base directory".to_string(),
            ))
        })?;
        let dir = base.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir.join(name).to_string_lossy().into_owned())
    }
}

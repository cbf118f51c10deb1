//! Conversion engine abstraction
//!
//! Two engine shapes share one argument-building contract: a process engine
//! driving an ffmpeg executable against real paths, and an embedded engine
//! driving an in-memory virtual filesystem. The argument order is part of
//! the external interface and must stay bit-exact for any ffmpeg-compatible
//! engine.

mod process;

pub use process::ProcessEngine;

use crate::error::ConvertResult;
use crate::types::{ConversionOptions, NORMALIZE_FILTER};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Build the engine argument vector for one conversion
///
/// `force_overwrite` inserts `-y`; the persistent-path backend forces
/// overwrite of its temp targets while virtual outputs are always fresh
/// names and omit it.
pub fn build_engine_args(
    input: &str,
    output: &str,
    options: &ConversionOptions,
    force_overwrite: bool,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
    if force_overwrite {
        args.push("-y".into());
    }
    args.extend([
        "-i".into(),
        input.to_string(),
        "-ac".into(),
        options.channels.to_string(),
        "-ar".into(),
        options.sample_rate.to_string(),
        "-sample_fmt".into(),
        options.sample_format.clone(),
    ]);
    if options.normalize {
        args.push("-af".into());
        args.push(NORMALIZE_FILTER.into());
    }
    args.push(output.to_string());
    args
}

/// Engine converting between real filesystem paths
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    /// Convert `input` into `output`, overwriting `output` if present
    async fn convert_path(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> ConvertResult<()>;
}

/// In-memory staging area for the embedded engine
///
/// Stands in for a real filesystem when inputs are ephemeral byte copies:
/// virtual names map to byte buffers, and staged entries are deleted after
/// each item to bound memory.
#[derive(Debug, Default)]
pub struct VirtualFs {
    files: HashMap<String, Vec<u8>>,
}

impl VirtualFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage bytes under a virtual name
    pub fn write_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    /// Read staged bytes back
    pub fn read_file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Remove a staged entry, returning whether it existed
    pub fn delete_file(&mut self, name: &str) -> bool {
        self.files.remove(name).is_some()
    }

    /// Probe a virtual name without creating it
    pub fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Number of staged entries
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Engine executing against a [`VirtualFs`]
///
/// The browser-sandboxed wasm engine implements this on the web shell side;
/// tests drive the same seam with stub implementations.
#[async_trait]
pub trait VirtualEngine: Send {
    /// Run one conversion over the staged virtual files
    ///
    /// `args` follow the shared [`build_engine_args`] contract; the final
    /// argument is the virtual output name the engine must produce.
    async fn exec(&mut self, fs: &mut VirtualFs, args: &[String]) -> ConvertResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_order_is_bit_exact() {
        let options = ConversionOptions::new(false);
        let args = build_engine_args("in.mp3", "out.wav", &options, true);
        assert_eq!(
            args,
            [
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-i",
                "in.mp3",
                "-ac",
                "1",
                "-ar",
                "48000",
                "-sample_fmt",
                "s16",
                "out.wav",
            ]
        );
    }

    #[test]
    fn normalize_appends_the_loudness_filter() {
        let options = ConversionOptions::new(true);
        let args = build_engine_args("in.flac", "out.wav", &options, false);
        // No -y without overwrite forcing.
        assert!(!args.contains(&"-y".to_string()));
        let af = args.iter().position(|a| a == "-af").unwrap();
        assert_eq!(args[af + 1], "loudnorm=I=-14:LRA=11:TP=-1.0");
        // Filter sits between the sample format and the output.
        assert_eq!(args.last().unwrap(), "out.wav");
    }

    #[test]
    fn virtual_fs_probe_does_not_create() {
        let mut fs = VirtualFs::new();
        assert!(!fs.exists("input_0_a.mp3"));
        fs.write_file("input_0_a.mp3", vec![1, 2, 3]);
        assert!(fs.exists("input_0_a.mp3"));
        assert_eq!(fs.read_file("input_0_a.mp3"), Some(&[1u8, 2, 3][..]));
        assert!(fs.delete_file("input_0_a.mp3"));
        assert!(!fs.delete_file("input_0_a.mp3"));
        assert!(fs.is_empty());
    }
}

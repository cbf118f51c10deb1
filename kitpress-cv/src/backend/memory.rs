//! Virtual-filesystem backend
//!
//! For environments where inputs are ephemeral byte copies: stages bytes
//! into a [`VirtualFs`], runs the embedded engine, reads the result back and
//! materializes it through an [`OutputSink`]. Staged virtual files are
//! deleted after every item to bound memory.

use super::ConvertBackend;
use crate::engine::{build_engine_args, VirtualEngine, VirtualFs};
use crate::error::{ConvertError, ConvertResult};
use crate::naming;
use crate::types::{ConversionOptions, FileItem};
use async_trait::async_trait;
use kitpress_common::Error;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Destination for materialized output bytes
///
/// Two shapes exist in practice: a writable directory handle, and a
/// download trigger that has no inspectable destination at all.
#[async_trait]
pub trait OutputSink: Send {
    /// Whether content already exists under a name
    async fn probe(&self, name: &str) -> ConvertResult<bool>;

    /// Place output bytes under a name
    async fn write(&mut self, name: &str, bytes: Vec<u8>) -> ConvertResult<()>;

    /// Create a folder if the destination supports folders
    async fn ensure_folder(&mut self, folder: &str) -> ConvertResult<()>;

    /// Whether an existing name should raise a user prompt
    fn prompts_on_conflict(&self) -> bool {
        true
    }
}

/// Directory-handle analog: named outputs in one writable folder
#[derive(Debug, Default)]
pub struct FolderSink {
    files: HashMap<String, Vec<u8>>,
}

impl FolderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a name, as if the folder already held content
    pub fn preload(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl OutputSink for FolderSink {
    async fn probe(&self, name: &str) -> ConvertResult<bool> {
        Ok(self.files.contains_key(name))
    }

    async fn write(&mut self, name: &str, bytes: Vec<u8>) -> ConvertResult<()> {
        self.files.insert(name.to_string(), bytes);
        Ok(())
    }

    async fn ensure_folder(&mut self, _folder: &str) -> ConvertResult<()> {
        // Folder paths are plain key prefixes here.
        Ok(())
    }
}

/// Download-trigger analog: each output is handed off, nothing is probeable
///
/// There is no destination to inspect, so conflicts never prompt; names
/// already handed off this batch are reserved and auto-disambiguated
/// against.
#[derive(Debug, Default)]
pub struct DownloadSink {
    delivered: Vec<(String, Vec<u8>)>,
    reserved: HashSet<String>,
}

impl DownloadSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outputs handed off so far, in order
    pub fn delivered(&self) -> &[(String, Vec<u8>)] {
        &self.delivered
    }
}

#[async_trait]
impl OutputSink for DownloadSink {
    async fn probe(&self, name: &str) -> ConvertResult<bool> {
        Ok(self.reserved.contains(name))
    }

    async fn write(&mut self, name: &str, bytes: Vec<u8>) -> ConvertResult<()> {
        self.reserved.insert(name.to_string());
        self.delivered.push((name.to_string(), bytes));
        Ok(())
    }

    async fn ensure_folder(&mut self, folder: &str) -> ConvertResult<()> {
        Err(ConvertError::Common(Error::InvalidInput(format!(
            "download destination cannot hold a '{}' folder",
            folder
        ))))
    }

    fn prompts_on_conflict(&self) -> bool {
        false
    }
}

/// Backend staging ephemeral inputs through a virtual filesystem
pub struct VirtualBackend<E: VirtualEngine, S: OutputSink> {
    engine: E,
    fs: VirtualFs,
    sink: S,
    seq: usize,
}

impl<E: VirtualEngine, S: OutputSink> VirtualBackend<E, S> {
    pub fn new(engine: E, sink: S) -> Self {
        Self {
            engine,
            fs: VirtualFs::new(),
            sink,
            seq: 0,
        }
    }

    /// The sink, for inspecting placed outputs
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Number of entries currently staged in the virtual filesystem
    pub fn staged_files(&self) -> usize {
        self.fs.len()
    }

    fn input_bytes<'a>(&self, item: &'a FileItem) -> ConvertResult<&'a [u8]> {
        item.bytes().ok_or_else(|| {
            ConvertError::Common(Error::InvalidInput(format!(
                "item '{}' has no in-memory bytes",
                item.name
            )))
        })
    }
}

#[async_trait]
impl<E: VirtualEngine + Sync, S: OutputSink + Sync> ConvertBackend for VirtualBackend<E, S> {
    fn candidate(&self, item: &FileItem, suffix: u32) -> ConvertResult<String> {
        Ok(naming::derive_output_name(&item.name, suffix))
    }

    async fn probe(&self, target: &str) -> ConvertResult<bool> {
        self.sink.probe(target).await
    }

    fn is_self_target(&self, _item: &FileItem, _target: &str) -> bool {
        // Inputs are fetched copies; the user's original file is never at
        // the destination.
        false
    }

    async fn convert(
        &mut self,
        item: &FileItem,
        target: &str,
        options: &ConversionOptions,
    ) -> ConvertResult<()> {
        let bytes = self.input_bytes(item)?.to_vec();

        let seq = self.seq;
        self.seq += 1;
        let virtual_input = format!("input_{}_{}", seq, item.name);
        let virtual_output = format!("output_{}.{}", seq, naming::TARGET_EXTENSION);

        debug!(
            input = %virtual_input,
            output = %virtual_output,
            "Staging item into virtual filesystem"
        );

        self.fs.write_file(&virtual_input, bytes);
        // Virtual outputs are always fresh names; no overwrite forcing.
        let args = build_engine_args(&virtual_input, &virtual_output, options, false);
        let run = self.engine.exec(&mut self.fs, &args).await;

        let outcome = match run {
            Ok(()) => match self.fs.read_file(&virtual_output) {
                Some(result) => self.sink.write(target, result.to_vec()).await,
                None => Err(ConvertError::EngineFailed(format!(
                    "engine produced no output for '{}'",
                    item.name
                ))),
            },
            Err(e) => Err(e),
        };

        // Staged entries are deleted regardless of outcome to bound memory.
        self.fs.delete_file(&virtual_input);
        self.fs.delete_file(&virtual_output);

        outcome
    }

    async fn convert_replacing(
        &mut self,
        item: &FileItem,
        target: &str,
        options: &ConversionOptions,
    ) -> ConvertResult<()> {
        // Replacement never arises for disposable in-memory inputs.
        self.convert(item, target, options).await
    }

    async fn kit_target(&mut self, folder: &str, name: &str) -> ConvertResult<String> {
        self.sink.ensure_folder(folder).await?;
        Ok(format!("{}/{}", folder, name))
    }

    fn prompts_on_conflict(&self) -> bool {
        self.sink.prompts_on_conflict()
    }
}

//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use kitpress_cv::conflict::ConflictPrompt;
use kitpress_cv::engine::ConversionEngine;
use kitpress_cv::error::ConvertResult;
use kitpress_cv::types::{ConflictDecision, ConversionOptions};
use kitpress_cv::ConvertError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Marker the stub engine prefixes onto converted bytes
pub const CONVERTED_PREFIX: &[u8] = b"CONV:";

/// Engine that "converts" by prefixing the input bytes
///
/// Reads the whole input before writing, like the real engine reads its
/// input incrementally while producing output.
pub struct StubPathEngine;

#[async_trait]
impl ConversionEngine for StubPathEngine {
    async fn convert_path(
        &self,
        input: &Path,
        output: &Path,
        _options: &ConversionOptions,
    ) -> ConvertResult<()> {
        let bytes = tokio::fs::read(input).await?;
        let mut converted = CONVERTED_PREFIX.to_vec();
        converted.extend_from_slice(&bytes);
        tokio::fs::write(output, converted).await?;
        Ok(())
    }
}

/// Engine that fails for inputs whose name contains "bad"
pub struct FailingPathEngine;

#[async_trait]
impl ConversionEngine for FailingPathEngine {
    async fn convert_path(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> ConvertResult<()> {
        if input.to_string_lossy().contains("bad") {
            return Err(ConvertError::EngineFailed(
                "Invalid data found when processing input".to_string(),
            ));
        }
        StubPathEngine.convert_path(input, output, options).await
    }
}

/// Prompt returning scripted decisions in order
///
/// Panics when asked more often than scripted, which doubles as a
/// "no prompt expected" assertion with an empty script.
pub struct ScriptedPrompt {
    decisions: Mutex<Vec<ConflictDecision>>,
    asked: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn new(mut decisions: Vec<ConflictDecision>) -> Self {
        decisions.reverse();
        Self {
            decisions: Mutex::new(decisions),
            asked: AtomicUsize::new(0),
        }
    }

    /// Prompt that must never be consulted
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConflictPrompt for ScriptedPrompt {
    async fn ask(&self, file_name: &str) -> ConvertResult<ConflictDecision> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.decisions
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| panic!("unexpected conflict prompt for '{}'", file_name))
    }
}

/// Write a small mono 48 kHz s16 WAV fixture
pub fn write_wav(path: &Path, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for sample in samples {
        writer.write_sample(*sample).unwrap();
    }
    writer.finalize().unwrap();
}

/// File names in a directory, sorted
pub fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

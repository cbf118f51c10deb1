//! Process-exec conversion engine
//!
//! Locates a usable ffmpeg executable from an ordered candidate list and
//! runs conversions through `std::process::Command` on the blocking pool.
//! Location happens at most once per session; the session object memoizes
//! the located engine.

use super::{build_engine_args, ConversionEngine};
use crate::error::{ConvertError, ConvertResult};
use crate::types::ConversionOptions;
use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Engine backed by an external ffmpeg-compatible executable
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
}

impl ProcessEngine {
    /// Probe candidates in order and return the first usable executable
    ///
    /// Each candidate is probed with `-version`; a failure records the
    /// candidate and its reason so an exhausted search reports every
    /// attempted source.
    pub async fn locate(candidates: &[String]) -> ConvertResult<Self> {
        let mut attempts = Vec::new();

        for candidate in candidates {
            let probe = tokio::task::spawn_blocking({
                let program = candidate.clone();
                move || Command::new(&program).arg("-version").output()
            })
            .await
            .map_err(|e| ConvertError::EngineFailed(format!("Task join error: {}", e)))?;

            match probe {
                Ok(output) if output.status.success() => {
                    info!(program = %candidate, "Conversion engine located");
                    return Ok(Self {
                        program: candidate.clone(),
                    });
                }
                Ok(output) => {
                    attempts.push(format!(
                        "{}: exit code {:?}",
                        candidate,
                        output.status.code()
                    ));
                }
                Err(e) => {
                    attempts.push(format!("{}: {}", candidate, e));
                }
            }
        }

        Err(ConvertError::EngineUnavailable { attempts })
    }

    /// The located executable
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl ConversionEngine for ProcessEngine {
    async fn convert_path(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> ConvertResult<()> {
        // The temp target is always overwrite-forced on this backend.
        let args = build_engine_args(
            &input.to_string_lossy(),
            &output.to_string_lossy(),
            options,
            true,
        );

        debug!(
            program = %self.program,
            input = %input.display(),
            output = %output.display(),
            "Running engine conversion"
        );

        let result = tokio::task::spawn_blocking({
            let program = self.program.clone();
            move || Command::new(&program).args(&args).output()
        })
        .await
        .map_err(|e| ConvertError::EngineFailed(format!("Task join error: {}", e)))?
        .map_err(|e| ConvertError::EngineFailed(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stdout = String::from_utf8_lossy(&result.stdout);
            let diagnostic = if !stderr.trim().is_empty() {
                stderr.trim().to_string()
            } else if !stdout.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                format!("engine exited with code {:?}", result.status.code())
            };
            return Err(ConvertError::EngineFailed(diagnostic));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exhausted_probe_reports_every_attempt() {
        let candidates = vec![
            "/nonexistent/kitpress-test-ffmpeg-a".to_string(),
            "/nonexistent/kitpress-test-ffmpeg-b".to_string(),
        ];
        let err = ProcessEngine::locate(&candidates).await.unwrap_err();
        match err {
            ConvertError::EngineUnavailable { attempts } => {
                assert_eq!(attempts.len(), 2);
                assert!(attempts[0].starts_with("/nonexistent/kitpress-test-ffmpeg-a:"));
                assert!(attempts[1].starts_with("/nonexistent/kitpress-test-ffmpeg-b:"));
            }
            other => panic!("Expected EngineUnavailable, got {:?}", other),
        }
    }
}

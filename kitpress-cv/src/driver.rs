//! Batch conversion driver
//!
//! One batch is one sequential stream of suspension points: engine
//! invocations, filesystem probes and moves, and conflict prompts. No two
//! items convert concurrently — the engine instance is not safe for
//! concurrent invocation and progress is defined as "items completed so
//! far". Cancellation is cooperative and observed at item boundaries only.

use crate::backend::{display_name, ConvertBackend};
use crate::conflict::{ConflictPrompt, ConflictResolver, Resolution};
use crate::error::{ConvertError, ConvertResult};
use crate::kit::KitPlan;
use crate::naming::{strip_extension, MAX_NAME_SUFFIX};
use crate::types::{BatchResult, ConversionOptions, FileItem};
use chrono::Utc;
use kitpress_common::events::{ConvertEvent, EventBus};
use kitpress_common::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Sequences one batch through a placement backend
pub struct BatchDriver<B: ConvertBackend> {
    backend: B,
    events: EventBus,
    cancel: CancellationToken,
}

impl<B: ConvertBackend> BatchDriver<B> {
    pub fn new(backend: B, events: EventBus) -> Self {
        Self {
            backend,
            events,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach an external cancellation token (e.g. wired to Ctrl-C)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The backend, for inspecting placed outputs after a run
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Convert the full selection, in selection order
    ///
    /// Selection order is meaningful here: it reflects user intent and
    /// drives progress reporting.
    pub async fn run(
        &mut self,
        items: &[FileItem],
        prompt: &dyn ConflictPrompt,
        options: &ConversionOptions,
    ) -> ConvertResult<BatchResult> {
        let start = std::time::Instant::now();
        let mut result = BatchResult::default();
        self.events.emit_lossy(ConvertEvent::BatchStarted {
            total: items.len(),
            kit: false,
            timestamp: Utc::now(),
        });

        // Conflict state is batch-scoped: the sticky flag resets here.
        let mut resolver = ConflictResolver::new();
        let run = self
            .run_items(items, prompt, options, &mut resolver, &mut result)
            .await;
        self.finish(run, result, start)
    }

    /// Convert a kit plan's entries into the kit destination folder
    ///
    /// Output names come from the plan unconditionally: the kit folder is
    /// assumed kit-private, so there is no probe and no prompt inside it.
    pub async fn run_kit(
        &mut self,
        plan: &KitPlan,
        options: &ConversionOptions,
    ) -> ConvertResult<BatchResult> {
        if plan.blocked {
            return Err(ConvertError::Common(Error::InvalidInput(
                if plan.warning.is_empty() {
                    "kit plan is empty".to_string()
                } else {
                    plan.warning.clone()
                },
            )));
        }

        let start = std::time::Instant::now();
        let mut result = BatchResult::default();
        self.events.emit_lossy(ConvertEvent::BatchStarted {
            total: plan.entries.len(),
            kit: true,
            timestamp: Utc::now(),
        });

        let run = self.run_kit_entries(plan, options, &mut result).await;
        self.finish(run, result, start)
    }

    async fn run_items(
        &mut self,
        items: &[FileItem],
        prompt: &dyn ConflictPrompt,
        options: &ConversionOptions,
        resolver: &mut ConflictResolver,
        result: &mut BatchResult,
    ) -> ConvertResult<()> {
        let total = items.len();

        for (index, item) in items.iter().enumerate() {
            self.check_cancelled()?;
            self.events.emit_lossy(ConvertEvent::ItemStarted {
                index,
                total,
                name: item.name.clone(),
                timestamp: Utc::now(),
            });
            info!(item = %item.name, index = index + 1, total, "Converting");

            let candidate = self.backend.candidate(item, 0)?;
            let target = if self.backend.is_self_target(item, &candidate) {
                // Never convert over the file being read: temp, then
                // remove + move into place.
                self.backend
                    .convert_replacing(item, &candidate, options)
                    .await?;
                candidate
            } else {
                let target = self
                    .resolve_target(item, candidate, prompt, resolver)
                    .await?;
                self.backend.convert(item, &target, options).await?;
                target
            };

            result.converted += 1;
            let output_name = display_name(&target).to_string();
            info!(output = %output_name, "Saved");
            self.events.emit_lossy(ConvertEvent::ItemCompleted {
                index,
                total,
                output_name,
                timestamp: Utc::now(),
            });
        }

        Ok(())
    }

    async fn run_kit_entries(
        &mut self,
        plan: &KitPlan,
        options: &ConversionOptions,
        result: &mut BatchResult,
    ) -> ConvertResult<()> {
        let total = plan.entries.len();

        for entry in &plan.entries {
            self.check_cancelled()?;
            self.events.emit_lossy(ConvertEvent::ItemStarted {
                index: entry.index,
                total,
                name: entry.item.name.clone(),
                timestamp: Utc::now(),
            });
            info!(
                item = %entry.item.name,
                output = %entry.output_name,
                "Converting kit entry"
            );

            let target = self
                .backend
                .kit_target(&plan.folder_name, &entry.output_name)
                .await?;
            self.backend.convert(&entry.item, &target, options).await?;

            result.converted += 1;
            self.events.emit_lossy(ConvertEvent::ItemCompleted {
                index: entry.index,
                total,
                output_name: entry.output_name.clone(),
                timestamp: Utc::now(),
            });
        }

        Ok(())
    }

    /// Resolve a non-self candidate into the target that will be written
    async fn resolve_target(
        &mut self,
        item: &FileItem,
        candidate: String,
        prompt: &dyn ConflictPrompt,
        resolver: &mut ConflictResolver,
    ) -> ConvertResult<String> {
        let exists = self.backend.probe(&candidate).await?;

        let resolution = if exists && !self.backend.prompts_on_conflict() {
            // No inspectable destination to overwrite; take a fresh name.
            Resolution::Disambiguate
        } else {
            if exists && !resolver.is_sticky() {
                self.events.emit_lossy(ConvertEvent::ConflictPrompted {
                    name: display_name(&candidate).to_string(),
                    timestamp: Utc::now(),
                });
            }
            resolver
                .resolve(exists, display_name(&candidate), prompt)
                .await?
        };

        match resolution {
            Resolution::Proceed => Ok(candidate),
            Resolution::Disambiguate => self.disambiguate(item).await,
        }
    }

    /// Find the first never-used name for this item
    async fn disambiguate(&mut self, item: &FileItem) -> ConvertResult<String> {
        for suffix in 1..=MAX_NAME_SUFFIX {
            let candidate = self.backend.candidate(item, suffix)?;
            if !self.backend.probe(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(ConvertError::NameSearchExhausted {
            stem: strip_extension(&item.name).to_string(),
            limit: MAX_NAME_SUFFIX,
        })
    }

    fn check_cancelled(&self) -> ConvertResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ConvertError::Cancelled);
        }
        Ok(())
    }

    fn finish(
        &mut self,
        run: ConvertResult<()>,
        result: BatchResult,
        start: std::time::Instant,
    ) -> ConvertResult<BatchResult> {
        match run {
            Ok(()) => {
                self.events.emit_lossy(ConvertEvent::BatchCompleted {
                    converted: result.converted,
                    duration_seconds: start.elapsed().as_secs(),
                    timestamp: Utc::now(),
                });
                Ok(result)
            }
            Err(ConvertError::Cancelled) => {
                self.events.emit_lossy(ConvertEvent::BatchCancelled {
                    converted: result.converted,
                    timestamp: Utc::now(),
                });
                Err(ConvertError::Cancelled)
            }
            Err(e) => {
                self.events.emit_lossy(ConvertEvent::BatchFailed {
                    converted: result.converted,
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }
}

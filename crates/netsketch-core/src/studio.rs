//! Diagram Studio orchestrator
//!
//! Drives the two workflows against the shared [`WorkflowState`]:
//! - Generation: one sketch, six styled variants, requested one at a time
//! - Edit: sketch + current render + instruction, replacing the selected image
//!
//! The state lock is never held across an await.

use crate::config::StudioConfig;
use crate::error::{StateError, StudioError};
use crate::generator::{CredentialProvider, ImageGenerator};
use crate::plan::GenerationPlan;
use crate::prompt::edit_prompt;
use crate::state::WorkflowState;
use crate::types::{BatchId, BatchReport, EditOutcome, GenerationRequest, VariantId};
use netsketch_imaging::{prepare_image, ImagePayload};
use parking_lot::Mutex;
use std::sync::Arc;

/// Workflow state shared between the studio and its presentation layer
pub type SharedState = Arc<Mutex<WorkflowState>>;

/// The generation/edit orchestrator
pub struct DiagramStudio {
    config: StudioConfig,
    state: SharedState,
    generator: Arc<dyn ImageGenerator>,
    credentials: Arc<dyn CredentialProvider>,
}

impl DiagramStudio {
    /// Create a studio with empty state
    #[must_use]
    pub fn new(
        config: StudioConfig,
        generator: Arc<dyn ImageGenerator>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(WorkflowState::new())),
            generator,
            credentials,
        }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Handle to the shared state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> WorkflowState {
        self.state.lock().clone()
    }

    /// Replace the source sketch, discarding all variants
    pub fn upload(&self, image: ImagePayload) {
        tracing::info!(media_type = %image.media_type, len = image.len(), "sketch uploaded");
        self.state.lock().set_source(image);
    }

    /// Select a ready variant for editing
    ///
    /// # Errors
    /// `StudioError::State` for unknown or not-ready variants.
    pub fn select(&self, id: VariantId) -> Result<(), StudioError> {
        self.state.lock().select_variant(id)?;
        tracing::info!(variant = %id, "variant selected");
        Ok(())
    }

    /// Run the key selection flow when no key is active
    ///
    /// # Errors
    /// `StudioError::Credential` when the provider cannot obtain a key.
    pub async fn ensure_credential(&self) -> Result<(), StudioError> {
        if self.credentials.has_active_credential().await {
            return Ok(());
        }
        tracing::info!("no active API key, starting key selection");
        self.credentials.prompt_for_credential().await?;
        if self.credentials.has_active_credential().await {
            Ok(())
        } else {
            Err(StudioError::MissingCredential)
        }
    }

    /// Generate every style variant of the current sketch
    ///
    /// Variants are requested strictly one after another in batch order. A
    /// failed variant is recorded and the batch moves on.
    ///
    /// # Returns
    /// `None` when there is no sketch or a batch is already running.
    ///
    /// # Errors
    /// `StudioError::MissingCredential` when no API key is active; no
    /// variant is created in that case.
    pub async fn generate_all(&self) -> Result<Option<BatchReport>, StudioError> {
        if !self.can_generate() {
            tracing::debug!("generation skipped: no sketch or batch already running");
            return Ok(None);
        }
        if !self.credentials.has_active_credential().await {
            return Err(StudioError::MissingCredential);
        }

        let started = self.state.lock().begin_generation();
        let batch = match started {
            Ok(batch) => batch,
            Err(e) => {
                tracing::debug!("generation skipped: {}", e);
                return Ok(None);
            }
        };
        let _running = GenerationGuard {
            state: Arc::clone(&self.state),
            batch,
        };

        let source = self.state.lock().source().cloned();
        let Some(source) = source else {
            return Ok(None);
        };

        tracing::info!(batch = %batch, "generation started");
        let prepared = self.prepare(source).await;

        let mut report = BatchReport {
            batch,
            succeeded: Vec::new(),
            failed: Vec::new(),
            discarded: 0,
        };

        for task in GenerationPlan::for_batch(batch) {
            let outcome = match &prepared {
                Ok(image) => self
                    .generator
                    .generate(GenerationRequest {
                        images: vec![image.clone()],
                        prompt: task.prompt,
                        options: self.config.render.clone(),
                    })
                    .await
                    .map_err(|e| e.detail()),
                Err(e) => Err(e.to_string()),
            };

            let failure = outcome.as_ref().err().cloned();
            let recorded = self
                .state
                .lock()
                .update_variant(task.batch, task.variant, outcome);

            match (recorded, failure) {
                (Ok(()), None) => {
                    tracing::info!(variant = %task.variant, "variant ready");
                    report.succeeded.push(task.variant);
                }
                (Ok(()), Some(message)) => {
                    tracing::warn!(variant = %task.variant, "variant failed: {}", message);
                    report.failed.push((task.variant, message));
                }
                (Err(e), _) => {
                    tracing::debug!(variant = %task.variant, "result discarded: {}", e);
                    report.discarded += 1;
                }
            }
        }

        tracing::info!(
            batch = %batch,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            discarded = report.discarded,
            "generation finished"
        );
        Ok(Some(report))
    }

    /// Apply a natural-language edit to the selected variant
    ///
    /// On success only the selected variant's image changes. On failure the
    /// prior image is kept and the error is returned to the caller.
    ///
    /// # Returns
    /// `None` when the instruction is blank, nothing is selected, there is
    /// no sketch, or another edit is running.
    ///
    /// # Errors
    /// - `StudioError::MissingCredential` when no API key is active
    /// - `StudioError::EditFailed` when the model call fails
    /// - `StudioError::State` when the variant was replaced mid-edit
    pub async fn edit(&self, instruction: &str) -> Result<Option<EditOutcome>, StudioError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Ok(None);
        }

        let begun = self.state.lock().begin_edit();
        let ticket = match begun {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::debug!("edit skipped: {}", e);
                return Ok(None);
            }
        };
        let _editing = EditGuard {
            state: Arc::clone(&self.state),
        };

        if !self.credentials.has_active_credential().await {
            return Err(StudioError::MissingCredential);
        }

        tracing::info!(variant = %ticket.variant, "edit started");
        let sketch = self.prepare(ticket.source.clone()).await?;
        let current = self.prepare(ticket.current.clone()).await?;

        let request = GenerationRequest {
            images: vec![sketch, current],
            prompt: edit_prompt(ticket.style(), instruction),
            options: self.config.render.clone(),
        };

        let image = self.generator.generate(request).await.map_err(|e| {
            tracing::warn!(variant = %ticket.variant, "edit failed: {}", e);
            StudioError::EditFailed(e)
        })?;

        self.state.lock().apply_edit(&ticket, image.clone())?;
        tracing::info!(variant = %ticket.variant, "edit applied");

        Ok(Some(EditOutcome {
            variant: ticket.variant,
            image,
        }))
    }

    fn can_generate(&self) -> bool {
        let state = self.state.lock();
        state.source().is_some() && !state.is_generating()
    }

    /// Bound and re-encode an image off the async executor
    async fn prepare(&self, image: ImagePayload) -> Result<ImagePayload, StudioError> {
        let options = self.config.prepare;
        tokio::task::spawn_blocking(move || prepare_image(&image, &options))
            .await
            .map_err(|e| StudioError::Preparation(e.to_string()))
    }
}

impl std::fmt::Debug for DiagramStudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramStudio")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

/// Clears the running flag of its batch when dropped
struct GenerationGuard {
    state: SharedState,
    batch: BatchId,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        if let Err(StateError::StaleBatch { .. }) = self.state.lock().end_generation(self.batch) {
            tracing::debug!(batch = %self.batch, "batch superseded before completion");
        }
    }
}

/// Clears the editing flag when dropped
struct EditGuard {
    state: SharedState,
}

impl Drop for EditGuard {
    fn drop(&mut self) {
        self.state.lock().end_edit();
    }
}

//! Workflow state machine
//!
//! `WorkflowState` is the single aggregate the orchestrator mutates. All
//! mutation goes through the named transitions below; each one either applies
//! completely or returns a [`StateError`] with the state untouched.
//!
//! Results are addressed by `(BatchId, VariantId)`, never by position, so a
//! result from a batch that was replaced by a new upload or a new generation
//! run cannot land in the fresh batch.

use crate::error::StateError;
use crate::types::{BatchId, DiagramVariant, StyleCategory, VariantId, VariantStatus};
use netsketch_imaging::ImagePayload;

/// Snapshot handed to the edit orchestrator by [`WorkflowState::begin_edit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTicket {
    /// Batch the edited variant belongs to
    pub batch: BatchId,
    /// Variant being edited
    pub variant: VariantId,
    /// Original sketch
    pub source: ImagePayload,
    /// Image being edited
    pub current: ImagePayload,
}

impl EditTicket {
    /// Style of the edited variant
    #[inline]
    #[must_use]
    pub fn style(&self) -> StyleCategory {
        self.variant.style
    }
}

/// Aggregate workflow state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    source: Option<ImagePayload>,
    batch: Option<BatchId>,
    variants: Vec<DiagramVariant>,
    selected: Option<VariantId>,
    generating: bool,
    editing: bool,
}

impl WorkflowState {
    /// Empty state: no source, no variants
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Accessors =====

    /// Uploaded sketch
    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<&ImagePayload> {
        self.source.as_ref()
    }

    /// Current batch, if generation has started since the last upload
    #[inline]
    #[must_use]
    pub fn batch(&self) -> Option<BatchId> {
        self.batch
    }

    /// Variants of the current batch, in generation order
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[DiagramVariant] {
        &self.variants
    }

    /// Look up a variant by id
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&DiagramVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Selected variant id
    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<VariantId> {
        self.selected
    }

    /// Selected variant
    #[must_use]
    pub fn selected_variant(&self) -> Option<&DiagramVariant> {
        self.selected.and_then(|id| self.variant(id))
    }

    /// True while a generation batch is running
    #[inline]
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// True while an edit request is in flight
    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    // ===== Transitions =====

    /// Replace the source image and reset everything derived from it
    pub fn set_source(&mut self, image: ImagePayload) {
        tracing::debug!(len = image.len(), "source image replaced, workflow reset");
        *self = Self {
            source: Some(image),
            ..Self::default()
        };
    }

    /// Start a new batch of pending variants
    ///
    /// # Errors
    /// - `StateError::NoSource` without an uploaded sketch
    /// - `StateError::GenerationInProgress` while a batch is running
    pub fn begin_generation(&mut self) -> Result<BatchId, StateError> {
        if self.source.is_none() {
            return Err(StateError::NoSource);
        }
        if self.generating {
            return Err(StateError::GenerationInProgress);
        }

        let batch = BatchId::new();
        self.batch = Some(batch);
        self.variants = VariantId::batch_order().map(DiagramVariant::pending).collect();
        self.selected = None;
        self.generating = true;
        Ok(batch)
    }

    /// Record the outcome of one variant
    ///
    /// # Errors
    /// - `StateError::StaleBatch` when `batch` is not the current batch
    /// - `StateError::UnknownVariant` when `id` is not in the batch
    /// - `StateError::AlreadyResolved` when `id` is no longer pending
    pub fn update_variant(
        &mut self,
        batch: BatchId,
        id: VariantId,
        result: Result<ImagePayload, String>,
    ) -> Result<(), StateError> {
        self.check_batch(batch)?;
        let variant = self
            .variants
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(StateError::UnknownVariant(id))?;
        if variant.status != VariantStatus::Pending {
            return Err(StateError::AlreadyResolved(id));
        }

        match result {
            Ok(image) => {
                variant.image = Some(image);
                variant.status = VariantStatus::Ready;
                variant.error = None;
            }
            Err(message) => {
                variant.image = None;
                variant.status = VariantStatus::Failed;
                variant.error = Some(message);
            }
        }
        Ok(())
    }

    /// Mark the batch as finished
    ///
    /// # Errors
    /// `StateError::StaleBatch` when `batch` is not the current batch; the
    /// running flag of the current batch is left alone.
    pub fn end_generation(&mut self, batch: BatchId) -> Result<(), StateError> {
        self.check_batch(batch)?;
        self.generating = false;
        Ok(())
    }

    /// Select a ready variant
    ///
    /// # Errors
    /// - `StateError::UnknownVariant` when `id` is not in the batch
    /// - `StateError::VariantNotReady` when it has no image
    pub fn select_variant(&mut self, id: VariantId) -> Result<(), StateError> {
        let variant = self.variant(id).ok_or(StateError::UnknownVariant(id))?;
        if !variant.is_ready() {
            return Err(StateError::VariantNotReady(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Start editing the selected variant
    ///
    /// # Errors
    /// - `StateError::NoSource` without an uploaded sketch
    /// - `StateError::NoSelection` when nothing is selected
    /// - `StateError::EditInProgress` while another edit runs
    pub fn begin_edit(&mut self) -> Result<EditTicket, StateError> {
        let source = self.source.clone().ok_or(StateError::NoSource)?;
        let selected = self.selected.ok_or(StateError::NoSelection)?;
        if self.editing {
            return Err(StateError::EditInProgress);
        }
        let batch = self.batch.ok_or(StateError::NoSelection)?;
        let current = self
            .variant(selected)
            .ok_or(StateError::UnknownVariant(selected))?
            .image
            .clone()
            .ok_or(StateError::VariantNotReady(selected))?;

        self.editing = true;
        Ok(EditTicket {
            batch,
            variant: selected,
            source,
            current,
        })
    }

    /// Replace the edited variant's image
    ///
    /// Only the image payload changes; identity, status and selection stay.
    ///
    /// # Errors
    /// - `StateError::StaleBatch` when the ticket's batch was replaced
    /// - `StateError::UnknownVariant` when the variant is gone
    pub fn apply_edit(&mut self, ticket: &EditTicket, image: ImagePayload) -> Result<(), StateError> {
        self.check_batch(ticket.batch)?;
        let variant = self
            .variants
            .iter_mut()
            .find(|v| v.id == ticket.variant)
            .ok_or(StateError::UnknownVariant(ticket.variant))?;
        variant.image = Some(image);
        Ok(())
    }

    /// Clear the editing flag
    pub fn end_edit(&mut self) {
        self.editing = false;
    }

    fn check_batch(&self, batch: BatchId) -> Result<(), StateError> {
        if self.batch == Some(batch) {
            Ok(())
        } else {
            Err(StateError::StaleBatch {
                got: batch,
                current: self.batch,
            })
        }
    }
}

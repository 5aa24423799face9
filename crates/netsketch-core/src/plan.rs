//! Generation planning
//!
//! A batch is decomposed up front into an explicit, ordered list of tasks,
//! one per variant. The orchestrator drains the list strictly in order.

use crate::prompt::generation_prompt;
use crate::types::{BatchId, VariantId};
use std::collections::VecDeque;

/// One variant request within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
    /// Batch the result belongs to
    pub batch: BatchId,
    /// Variant to produce
    pub variant: VariantId,
    /// Prompt for this variant
    pub prompt: String,
}

/// Ordered task list for one batch
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    batch: BatchId,
    tasks: VecDeque<GenerationTask>,
}

impl GenerationPlan {
    /// Decompose a batch into its variant tasks
    ///
    /// Order follows [`VariantId::batch_order`].
    #[must_use]
    pub fn for_batch(batch: BatchId) -> Self {
        let tasks = VariantId::batch_order()
            .map(|variant| GenerationTask {
                batch,
                variant,
                prompt: generation_prompt(variant.style, variant.index),
            })
            .collect();
        Self { batch, tasks }
    }

    /// Batch this plan belongs to
    #[inline]
    #[must_use]
    pub fn batch(&self) -> BatchId {
        self.batch
    }

    /// Tasks not yet taken
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tasks.len()
    }

    /// Take the next task
    pub fn next_task(&mut self) -> Option<GenerationTask> {
        self.tasks.pop_front()
    }
}

impl Iterator for GenerationPlan {
    type Item = GenerationTask;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_task()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StyleCategory, BATCH_SIZE};
    use pretty_assertions::assert_eq;

    #[test]
    fn plan_is_ordered_and_complete() {
        let batch = BatchId::new();
        let plan = GenerationPlan::for_batch(batch);
        assert_eq!(plan.remaining(), BATCH_SIZE);

        let tasks: Vec<GenerationTask> = plan.collect();
        let ids: Vec<VariantId> = tasks.iter().map(|t| t.variant).collect();
        assert_eq!(ids, VariantId::batch_order().collect::<Vec<_>>());
        assert!(tasks.iter().all(|t| t.batch == batch));
    }

    #[test]
    fn task_prompt_matches_variant() {
        let mut plan = GenerationPlan::for_batch(BatchId::new());
        let first = plan.next_task().unwrap();
        assert_eq!(first.variant, VariantId::new(StyleCategory::Flat2d, 1));
        assert!(first.prompt.contains("(Variant 1)"));

        let second = plan.next_task().unwrap();
        assert!(second.prompt.contains("(Variant 2)"));
        assert_eq!(plan.remaining(), BATCH_SIZE - 2);
    }
}

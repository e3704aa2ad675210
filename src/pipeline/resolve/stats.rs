//! Per-template success counters for off-line prompt effectiveness tuning.

use serde::Serialize;

/// Which resolution task a counter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Naming,
    Categorizing,
}

/// Counts successful resolutions per (task, template index).
///
/// Owned by the resolver instance rather than living in process-wide
/// state, so concurrent or test-isolated runs never cross-contaminate.
/// Diagnostic only; resolution logic never reads it.
#[derive(Debug, Clone, Serialize)]
pub struct PromptStats {
    pub name: Vec<u64>,
    pub category: Vec<u64>,
}

impl PromptStats {
    pub fn new(naming_templates: usize, categorizing_templates: usize) -> Self {
        Self {
            name: vec![0; naming_templates],
            category: vec![0; categorizing_templates],
        }
    }

    pub fn record_success(&mut self, task: Task, template_index: usize) {
        let counters = match task {
            Task::Naming => &mut self.name,
            Task::Categorizing => &mut self.category,
        };
        if let Some(count) = counters.get_mut(template_index) {
            *count += 1;
        }
    }

    /// Emit the end-of-run effectiveness report.
    pub fn report(&self) {
        for (idx, count) in self.name.iter().enumerate() {
            tracing::info!(prompt = idx + 1, count, "naming prompt valid results");
        }
        for (idx, count) in self.category.iter().enumerate() {
            tracing::info!(prompt = idx + 1, count, "categorizing prompt valid results");
        }
    }
}

//! Retry/template scanning loops for the naming and categorizing tasks.

use super::assemble::assemble;
use super::category::CategoryMatcher;
use super::consensus::VoteTally;
use super::extract::{find_candidate, is_valid};
use super::fragment::name_fragment;
use super::normalize::{append_date_suffix, tidy_candidate};
use super::prompts::{categorizing_bank, naming_bank, PromptBank};
use super::stats::{PromptStats, Task};
use super::types::{
    truncate_chars, FinalResult, LlmFailurePolicy, NameRegistry, ResolutionOutcome, ResolverPolicy,
};
use super::ResolveError;
use crate::pipeline::llm::LlmClient;

/// Drives both resolution tasks for one document at a time.
///
/// Holds only process-lifetime state: the LLM collaborator, the name
/// registry, the compiled label matcher, the policy constants and the
/// diagnostic counters. Everything per-document (tally, scan position)
/// lives on the stack of a single `resolve_document` call.
pub struct DocumentResolver {
    llm: Box<dyn LlmClient>,
    names: NameRegistry,
    labels: Vec<String>,
    matcher: CategoryMatcher,
    policy: ResolverPolicy,
    stats: PromptStats,
}

impl DocumentResolver {
    pub fn new(
        llm: Box<dyn LlmClient>,
        names: NameRegistry,
        labels: Vec<String>,
        policy: ResolverPolicy,
    ) -> Result<Self, ResolveError> {
        let matcher = CategoryMatcher::new(&labels)?;
        let stats = PromptStats::new(naming_bank().len(), categorizing_bank(&labels).len());
        Ok(Self {
            llm,
            names,
            labels,
            matcher,
            policy,
            stats,
        })
    }

    /// Diagnostic snapshot for end-of-run reporting. Never read by
    /// resolution logic.
    pub fn stats(&self) -> &PromptStats {
        &self.stats
    }

    /// Sole entry point: derive the final (filename, category) pair for
    /// one document's OCR text.
    ///
    /// Truncation happens here, once, before either task runs. Total LLM
    /// calls are bounded by templates × retries per task. The result is
    /// always fully populated; exhaustion triggers the documented
    /// fallback, never an error.
    pub fn resolve_document(
        &mut self,
        text: &str,
        extra_context: Option<&str>,
    ) -> Result<FinalResult, ResolveError> {
        let content = truncate_chars(text, self.policy.max_text_chars);

        let fragment = name_fragment(content, &self.names.first_names)?;
        let naming = self.resolve_name(content, extra_context)?;
        let categorizing = self.resolve_category(content, extra_context)?;

        Ok(assemble(&naming, &categorizing, &fragment))
    }

    /// Naming task: scan the template bank until a structurally valid
    /// filename candidate appears, then normalize it and stamp the
    /// processing date.
    pub fn resolve_name(
        &mut self,
        content: &str,
        extra_context: Option<&str>,
    ) -> Result<ResolutionOutcome, ResolveError> {
        let bank = with_context(naming_bank(), extra_context);

        for template_idx in 0..bank.len() {
            for _ in 0..self.policy.retries_per_template {
                let Some(output) = self.ask(&bank, template_idx, content)? else {
                    continue;
                };
                let candidate = find_candidate(&output);
                if is_valid(candidate.as_deref(), self.policy.min_candidate_len) {
                    let tidied = tidy_candidate(&candidate.unwrap_or_default(), &self.names);
                    self.stats.record_success(Task::Naming, template_idx);
                    return Ok(ResolutionOutcome::Resolved(append_date_suffix(&tidied)));
                }
            }
        }
        Ok(ResolutionOutcome::Exhausted)
    }

    /// Categorizing task: accumulate votes over unique label matches and
    /// check the tally after every vote. A lone observed label resolves
    /// immediately; with disagreement the top label must lead by the
    /// consensus margin.
    pub fn resolve_category(
        &mut self,
        content: &str,
        extra_context: Option<&str>,
    ) -> Result<ResolutionOutcome, ResolveError> {
        let bank = with_context(categorizing_bank(&self.labels), extra_context);
        let mut tally = VoteTally::new();

        for template_idx in 0..bank.len() {
            for _ in 0..self.policy.retries_per_template {
                let Some(output) = self.ask(&bank, template_idx, content)? else {
                    continue;
                };
                if let Some(label) = self.matcher.unique_match(&output) {
                    tally.record(&label);
                    if let Some(winner) = tally.winner(self.policy.consensus_margin) {
                        let winner = winner.to_string();
                        self.stats.record_success(Task::Categorizing, template_idx);
                        return Ok(ResolutionOutcome::Resolved(winner));
                    }
                }
            }
        }
        Ok(ResolutionOutcome::Exhausted)
    }

    /// One tick: render the active template, call the LLM, sanitize.
    ///
    /// `Ok(None)` means the collaborator failed and policy says the
    /// failure only consumes this attempt.
    fn ask(
        &self,
        bank: &PromptBank,
        template_idx: usize,
        content: &str,
    ) -> Result<Option<String>, ResolveError> {
        let prompt = bank.render(template_idx, content);
        match self.llm.complete(&prompt) {
            Ok(raw) => Ok(Some(sanitize_output(&raw))),
            Err(e) => match self.policy.llm_failure {
                LlmFailurePolicy::AbortDocument => Err(e.into()),
                LlmFailurePolicy::SkipAttempt => {
                    tracing::warn!(
                        template = template_idx,
                        error = %e,
                        "LLM call failed, attempt skipped"
                    );
                    Ok(None)
                }
            },
        }
    }
}

fn with_context(bank: PromptBank, extra_context: Option<&str>) -> PromptBank {
    match extra_context {
        Some(extra) => bank.with_extra_context(extra),
        None => bank,
    }
}

/// Strip model formatting artifacts: newlines become spaces, backslashes
/// disappear. Applied to every raw completion before extraction.
fn sanitize_output(raw: &str) -> String {
    raw.replace('\n', " ").replace('\\', "")
}

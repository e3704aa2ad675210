use serde::{Deserialize, Serialize};

/// Registry of configured person names, used only as a normalization
/// dictionary. Loaded once per process, never mutated at request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRegistry {
    pub first_names: Vec<String>,
    pub last_name: String,
}

impl NameRegistry {
    pub fn new(first_names: Vec<String>, last_name: &str) -> Self {
        Self {
            first_names,
            last_name: last_name.to_string(),
        }
    }
}

/// Terminal state of one resolution task for one document.
///
/// `Exhausted` means the full templates × retries budget was spent without
/// a structurally valid answer; a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(String),
    Exhausted,
}

impl ResolutionOutcome {
    pub fn resolved(&self) -> Option<&str> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Exhausted => None,
        }
    }
}

/// Final (filename, category) pair handed back to the caller.
///
/// Invariants: `category` is always a member of the configured label set
/// (with "Unsicher" as the designated fallback member) and `filename` is
/// never empty and always carries a document extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalResult {
    pub filename: String,
    pub category: String,
}

/// What to do when the LLM collaborator itself fails mid-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmFailurePolicy {
    /// Propagate the failure and abort the remaining attempts for this
    /// document. The per-document caller isolates the batch.
    AbortDocument,
    /// Count the failure as one spent attempt and keep scanning.
    SkipAttempt,
}

/// Tunable policy constants for the resolution orchestrator.
///
/// The observed production values are the defaults; none of them carries a
/// documented rationale, so they stay configurable rather than hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPolicy {
    /// Maximum document text length fed into prompts, in characters.
    pub max_text_chars: usize,
    /// Attempts per prompt template before advancing to the next one.
    pub retries_per_template: usize,
    /// Minimum accepted filename candidate length.
    pub min_candidate_len: usize,
    /// Vote lead the top category needs over the runner-up.
    pub consensus_margin: u32,
    pub llm_failure: LlmFailurePolicy,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            max_text_chars: 2000,
            retries_per_template: 3,
            min_candidate_len: 15,
            consensus_margin: 2,
            llm_failure: LlmFailurePolicy::AbortDocument,
        }
    }
}

/// Truncate to at most `max_chars` characters (not bytes; the OCR text is
/// German and regularly contains umlauts).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_shorter_text_is_identity() {
        assert_eq!(truncate_chars("kurz", 2000), "kurz");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("äöüß", 2), "äö");
    }

    #[test]
    fn truncate_at_exact_length() {
        assert_eq!(truncate_chars("abcd", 4), "abcd");
        assert_eq!(truncate_chars("abcd", 3), "abc");
    }

    #[test]
    fn default_policy_matches_production_values() {
        let policy = ResolverPolicy::default();
        assert_eq!(policy.max_text_chars, 2000);
        assert_eq!(policy.retries_per_template, 3);
        assert_eq!(policy.min_candidate_len, 15);
        assert_eq!(policy.consensus_margin, 2);
        assert_eq!(policy.llm_failure, LlmFailurePolicy::AbortDocument);
    }
}

//! Document identity resolution: OCR text in, validated (filename,
//! category) pair out.
//!
//! The pipeline derives both values through repeated templated LLM
//! queries: lexical candidate extraction and structural validation for
//! the filename, substring label matching plus margin-based voting for
//! the category, and a deterministic fallback when a task exhausts its
//! retry budget. Nothing here judges whether the model's answer is
//! semantically right; only structural validity and internal consistency
//! are enforced.

pub mod assemble;
pub mod category;
pub mod consensus;
pub mod extract;
pub mod fragment;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod stats;
pub mod types;

pub use assemble::FALLBACK_CATEGORY;
pub use category::CategoryMatcher;
pub use consensus::VoteTally;
pub use fragment::name_fragment;
pub use orchestrator::DocumentResolver;
pub use prompts::{categorizing_bank, naming_bank, PromptBank};
pub use stats::PromptStats;
pub use types::{
    FinalResult, LlmFailurePolicy, NameRegistry, ResolutionOutcome, ResolverPolicy,
};

use thiserror::Error;

use crate::pipeline::llm::LlmError;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid category label pattern: {0}")]
    LabelPattern(String),

    #[error("LLM collaborator failed: {0}")]
    Llm(#[from] LlmError),
}

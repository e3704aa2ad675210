//! aktenwart turns scanned PDFs into canonical filenames and storage
//! categories by combining OCR text extraction with repeated, templated
//! LLM queries.
//!
//! The interesting part lives in [`pipeline::resolve`]: templated retry
//! search over prompt banks, regex candidate extraction, name-stripping
//! normalization and vote-based category consensus, with deterministic
//! fallback when no consensus is reached. [`pipeline::extraction`],
//! [`pipeline::llm`] and [`kdrive`] are the I/O collaborators around it.

pub mod config;
pub mod kdrive;
pub mod pipeline;

pub use config::Config;
pub use pipeline::llm::{InfomaniakClient, LlmClient};
pub use pipeline::resolve::{
    DocumentResolver, FinalResult, LlmFailurePolicy, NameRegistry, PromptStats,
    ResolutionOutcome, ResolverPolicy,
};

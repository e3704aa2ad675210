pub mod extraction;
pub mod llm;
pub mod resolve;

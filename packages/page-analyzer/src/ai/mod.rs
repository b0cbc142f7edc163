//! Model implementations for the analyzer.
//!
//! A reference implementation of `VisionModel` backed by the OpenAI chat
//! completions API. Hosts can use it directly or implement their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAIVisionModel;

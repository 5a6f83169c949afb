//! Language model wrapper for the pharmacy chat assistant.
//!
//! Free-text questions that the deterministic intent pipeline cannot answer are
//! forwarded to a hosted generative model (Google Gemini) through the
//! [`LanguageModel`] trait, which also allows substituting a mock in tests.

pub mod client;
pub mod prompts;

pub use client::*;
pub use prompts::*;

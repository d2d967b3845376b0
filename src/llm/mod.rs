//! Completion client abstraction
//!
//! A single prompt-in, text-out contract used by the hybrid enhancer and the
//! AI generation mode. [`GenAIClient`] talks to a real provider through the
//! `genai` crate; [`MockLLMClient`] replays queued responses in tests.

mod client;
mod error;
mod genai;
mod mock;

pub use client::LLMClient;
pub use error::BackendError;
pub use self::genai::{parse_provider, GenAIClient};
pub use mock::{MockLLMClient, MockResponse};

//! Prompt module - Text model prompt synthesis

pub mod extract;
pub mod synthesizer;

pub use synthesizer::{fallback_prompt, PromptResult, PromptSource, PromptSynthesizer};

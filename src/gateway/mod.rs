//! Gateway module - Fallback orchestration, retry policy, classification, throttling

pub mod backoff;
pub mod classifier;
pub mod orchestrator;
pub mod throttle;

pub use orchestrator::{
    AttemptOutcome, Delivery, Exhaustion, GenerationRequest, GenerationResult, Orchestrator,
};

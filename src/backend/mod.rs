//! Backend module - Traits, Workers AI client, and registry

pub mod registry;
pub mod traits;
pub mod workers_ai;

pub use traits::{BackendDescriptor, BackendError, ImageBackend, RenderRequest, TextBackend};

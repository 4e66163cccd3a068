//! Configuration loading

pub mod settings;

pub use settings::{
    BackendConfig, ClassifierConfig, GenerationConfig, LoggingConfig, PromptConfig,
    ProviderConfig, ServerConfig, Settings,
};

use thiserror::Error;

use crate::core::io::phantom::PhantomLoadError;
use crate::core::materials::MaterialError;
use crate::engine::config::ConfigError;
use crate::engine::output::OutputError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Phantom load failed: {source}")]
    Phantom {
        #[from]
        source: PhantomLoadError,
    },

    #[error("Material construction failed: {source}")]
    Material {
        #[from]
        source: MaterialError,
    },

    #[error("Checkpoint output failed: {source}")]
    Output {
        #[from]
        source: OutputError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Transport engine failed on stream {stream}: {message}")]
    Transport { stream: usize, message: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

//! Configuration file loading for valgen
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `VALGEN_`-prefixed environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./valgen.toml` or `./.valgen.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/valgen/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuditConfig, FileClassificationConfig, FileConfig,
    FileCoordinationConfig, FileEscalationConfig, FileInferenceConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FileRetrievalConfig,
};
pub use loader::ConfigLoader;

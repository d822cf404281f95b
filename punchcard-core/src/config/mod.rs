//! Configuration management module.
//!
//! This module provides a flexible configuration system supporting:
//! - YAML and TOML configuration file formats
//! - Configuration validation with descriptive error messages
//! - Environment variable overrides for deployment-specific settings
//! - Type-safe configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! use punchcard_core::config::{ConfigLoader, PunchcardConfig};
//!
//! let mut config: PunchcardConfig = ConfigLoader::new()
//!     .with_env_prefix("PUNCHCARD")
//!     .load_file("config.yaml")?;
//! config.apply_env_overrides();
//! ```

mod loader;
mod punchcard_config;
mod traits;
pub mod validation;

pub use loader::{ConfigFormat, ConfigLoader};
pub use punchcard_config::{
    LoggingSection, PunchcardConfig, ServerSection, WebSocketSection,
};
pub use traits::Validatable;
pub use validation::{EnvOverride, ValidationContext, ValidationResult, Validator};

//! Configuration traits for validation.

use crate::error::ConfigError;

/// Trait for types that can be validated.
///
/// Implement this trait to add custom validation logic to configuration types.
///
/// # Example
///
/// ```rust
/// use punchcard_core::config::Validatable;
/// use punchcard_core::error::ConfigError;
///
/// struct ListenerConfig {
///     port: u16,
///     host: String,
/// }
///
/// impl Validatable for ListenerConfig {
///     fn validate(&self) -> Result<(), ConfigError> {
///         if self.port == 0 {
///             return Err(ConfigError::invalid_value("port", "Port cannot be 0"));
///         }
///         if self.host.is_empty() {
///             return Err(ConfigError::missing_field("host"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validates the configuration.
    ///
    /// Returns `Ok(())` if the configuration is valid, or a `ConfigError`
    /// describing what is invalid.
    fn validate(&self) -> Result<(), ConfigError>;
}

use thiserror::Error;

/// The error type for `fibre_registry` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  /// No factory or instance is registered under the requested name.
  #[error("Service {0} not found")]
  ServiceNotFound(String),

  /// The accessor was called outside of any mounted `ServiceProvider`.
  #[error("ServiceRegistry not found in context")]
  RegistryUnavailable,

  /// The service exists but was requested as a different type than it was registered with.
  #[error("Service {name} is not of type {expected}")]
  TypeMismatch {
    name: String,
    expected: &'static str,
  },
}

/// A specialized `Result` type for `fibre_registry` operations.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

//! Bulk construction of a registry from a name → factory mapping.

use crate::core::ServiceFactory;
use crate::registry::ServiceRegistry;

/// Creates a new registry and registers every `(name, factory)` pair against it.
///
/// Names may be anything convertible into a `String`, so both a [`ServiceMap`](crate::ServiceMap)
/// and a list of `(&str, ServiceFactory)` pairs are accepted.
///
/// Equivalent to [`ServiceRegistry::new`] followed by one
/// [`register_factory`](ServiceRegistry::register_factory) per entry. Nothing has been
/// built yet, so the order of entries does not matter.
///
/// # Examples
///
/// ```
/// use fibre_registry::{configure, services};
///
/// struct AuthService;
/// struct ApiClient { base_url: String }
///
/// let registry = configure(services! {
///   "authService" => || AuthService,
///   "apiClient" => || ApiClient { base_url: "https://example.com".into() },
/// });
///
/// let client = registry.get::<ApiClient>("apiClient").unwrap();
/// assert_eq!(client.base_url, "https://example.com");
/// assert!(registry.get::<AuthService>("authService").is_ok());
/// ```
pub fn configure<I, K>(services: I) -> ServiceRegistry
where
  I: IntoIterator<Item = (K, ServiceFactory)>,
  K: Into<String>,
{
  let registry = ServiceRegistry::new();
  for (name, factory) in services {
    let name: String = name.into();
    registry.register_factory(&name, factory);
  }
  registry
}

//! The `ServiceRegistry` struct and its associated methods.

use crate::core::{ServiceFactory, ServiceSlot, ServiceSource};
use crate::error::{RegistryError, Result};
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A registry of named, lazily-constructed singleton services.
///
/// Each name holds a factory and at most one instance. The factory runs on the first
/// [`get`](Self::get) for that name and the result is cached until [`reset`](Self::reset).
/// The registry is thread-safe, so it can be shared behind an `Arc` (see
/// [`ServiceProvider`](crate::ServiceProvider)).
#[derive(Default)]
pub struct ServiceRegistry {
  slots: DashMap<String, Arc<ServiceSlot>>,
}

impl ServiceRegistry {
  /// Creates a new, empty `ServiceRegistry`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  /// Installs `source` under `name`, returning the slot if the source was accepted.
  fn insert_source(&self, name: &str, source: ServiceSource) -> Option<Arc<ServiceSlot>> {
    let service_type = source.type_name();
    // A name keeps its slot for the whole epoch; only the slot's source changes.
    let slot = Arc::clone(
      self
        .slots
        .entry(name.to_owned())
        .or_insert_with(|| Arc::new(ServiceSlot::default()))
        .value(),
    );
    if !slot.replace(source) {
      // Once a service has been handed out it must never be swapped underneath its users.
      debug!(
        service = name,
        service_type, "Ignoring registration for an already built service"
      );
      return None;
    }
    trace!(service = name, service_type, "Registered service");
    Some(slot)
  }

  // --- PUBLIC API ---

  // --- Registration ---

  /// Registers a factory for a concrete service type under `name`.
  ///
  /// If an instance already exists for `name` this is a silent no-op and both the
  /// instance and its original factory are kept. Otherwise any earlier factory for
  /// `name` is replaced. A registration made while `name` is being constructed does
  /// not start a second construction; the instance being built is the one kept.
  pub fn register<T: Any + Send + Sync>(
    &self,
    name: &str,
    factory: impl Fn() -> T + Send + Sync + 'static,
  ) {
    self.register_factory(name, ServiceFactory::new(factory));
  }

  /// Registers a factory producing a shared trait object, resolvable as `get::<I>(name)`.
  ///
  /// Follows the same replacement rules as [`register`](Self::register).
  pub fn register_trait<I: ?Sized + Any + Send + Sync>(
    &self,
    name: &str,
    factory: impl Fn() -> Arc<I> + Send + Sync + 'static,
  ) {
    self.register_factory(name, ServiceFactory::shared(factory));
  }

  /// Registers an already constructed instance under `name`.
  ///
  /// The name counts as built immediately, so later registrations for it are ignored.
  /// Like [`get`](Self::get), it must not be called for a name from inside that
  /// name's own factory.
  pub fn register_instance<T: Any + Send + Sync>(&self, name: &str, instance: T) {
    if let Some(slot) = self.insert_source(name, ServiceSource::instance(instance)) {
      let _ = slot.instance(name);
    }
  }

  /// Registers a type-erased factory under `name`.
  pub fn register_factory(&self, name: &str, factory: ServiceFactory) {
    self.insert_source(name, ServiceSource::factory(factory));
  }

  // --- Resolution ---

  /// Resolves the service registered under `name`, constructing it on first use.
  ///
  /// Repeated calls return the same allocation until the registry is reset.
  ///
  /// # Errors
  ///
  /// - [`RegistryError::ServiceNotFound`] if nothing is registered under `name`.
  /// - [`RegistryError::TypeMismatch`] if the service is not a `T`. The cached
  ///   instance is left untouched.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    // Clone the slot out so no shard lock is held while the factory runs; factories
    // are free to resolve other services from this registry.
    let slot = self
      .slots
      .get(name)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or_else(|| RegistryError::ServiceNotFound(name.to_owned()))?;

    let instance = slot
      .instance(name)
      .ok_or_else(|| RegistryError::ServiceNotFound(name.to_owned()))?;

    let service = instance
      .downcast_ref::<Arc<T>>()
      .cloned()
      .ok_or_else(|| RegistryError::TypeMismatch {
        name: name.to_owned(),
        expected: type_name::<T>(),
      })?;

    trace!(service = name, "Resolved service");
    Ok(service)
  }

  // --- Lifecycle ---

  /// Removes every factory and instance, returning the registry to its empty state.
  ///
  /// Handles already given out stay valid; the registry simply forgets them.
  pub fn reset(&self) {
    let cleared = self.slots.len();
    self.slots.clear();
    debug!(cleared, "Service registry reset");
  }

  // --- Introspection ---

  /// Returns `true` if a factory or instance is registered under `name`.
  pub fn contains(&self, name: &str) -> bool {
    self.slots.contains_key(name)
  }

  /// Returns `true` if the service under `name` has been constructed.
  pub fn is_built(&self, name: &str) -> bool {
    self
      .slots
      .get(name)
      .map(|entry| entry.value().is_built())
      .unwrap_or(false)
  }

  /// The number of registered names.
  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// All registered names, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.slots.iter().map(|entry| entry.key().clone()).collect();
    names.sort_unstable();
    names
  }
}

impl fmt::Debug for ServiceRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceRegistry")
      .field("services", &self.names())
      .finish()
  }
}

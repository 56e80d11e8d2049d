//! Core data structures for the registry: erased factories and per-name slots.

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

// Every stored service is an `Arc<T>` boxed as `Any`, so `get::<T>` can hand out
// cheap clones of the same allocation and `T` may be an unsized trait object.
pub(crate) type ErasedService = Box<dyn Any + Send + Sync>;
type ErasedFactory = Box<dyn Fn() -> ErasedService + Send + Sync>;

/// A type-erased, zero-argument service constructor.
///
/// Erasing the produced type lets factories for unrelated services live in one
/// [`ServiceMap`] and be handed to [`configure`](crate::configure) together.
pub struct ServiceFactory {
  build: ErasedFactory,
  type_name: &'static str,
}

impl ServiceFactory {
  /// Wraps a factory for a concrete service type `T`.
  pub fn new<T: Any + Send + Sync>(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
    Self {
      build: Box::new(move || Box::new(Arc::new(factory()))),
      type_name: type_name::<T>(),
    }
  }

  /// Wraps a factory that already produces a shared handle, typically to a trait object.
  ///
  /// The service is later resolved as `I`, e.g. `get::<dyn Greeter>(..)`.
  pub fn shared<I: ?Sized + Any + Send + Sync>(
    factory: impl Fn() -> Arc<I> + Send + Sync + 'static,
  ) -> Self {
    Self {
      build: Box::new(move || Box::new(factory())),
      type_name: type_name::<I>(),
    }
  }

  /// The name of the service type this factory produces.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub(crate) fn build(&self) -> ErasedService {
    (self.build)()
  }
}

impl fmt::Debug for ServiceFactory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceFactory")
      .field("type_name", &self.type_name)
      .finish()
  }
}

/// A name → factory mapping accepted by [`configure`](crate::configure).
pub type ServiceMap = HashMap<String, ServiceFactory>;

/// Where a slot's instance comes from.
pub(crate) enum ServiceSource {
  Factory(Arc<ServiceFactory>),
  Instance {
    value: ErasedService,
    type_name: &'static str,
  },
}

impl ServiceSource {
  pub(crate) fn factory(factory: ServiceFactory) -> Self {
    Self::Factory(Arc::new(factory))
  }

  pub(crate) fn instance<T: Any + Send + Sync>(instance: T) -> Self {
    Self::Instance {
      value: Box::new(Arc::new(instance)),
      type_name: type_name::<T>(),
    }
  }

  pub(crate) fn type_name(&self) -> &'static str {
    match self {
      Self::Factory(factory) => factory.type_name(),
      Self::Instance { type_name, .. } => *type_name,
    }
  }
}

/// Everything the registry knows about one service name.
///
/// A name keeps the same slot until the registry is reset. Re-registration swaps
/// the slot's source, never the slot, so the instance is filled at most once.
#[derive(Default)]
pub(crate) struct ServiceSlot {
  source: Mutex<Option<ServiceSource>>,
  cell: OnceCell<ErasedService>,
}

impl ServiceSlot {
  pub(crate) fn is_built(&self) -> bool {
    self.cell.get().is_some()
  }

  /// Installs `source` unless the instance already exists. Returns whether it was installed.
  pub(crate) fn replace(&self, source: ServiceSource) -> bool {
    let mut current = self.source.lock();
    if self.is_built() {
      return false;
    }
    *current = Some(source);
    true
  }

  /// Returns the instance, building it from the current source on the first request.
  ///
  /// Concurrent callers block on the cell, so construction happens at most once.
  /// Returns `None` if the slot has no source.
  pub(crate) fn instance(&self, name: &str) -> Option<&ErasedService> {
    self
      .cell
      .get_or_try_init(|| {
        // The lock is released before the factory runs, so the factory may
        // re-register its own name without deadlocking.
        let factory = {
          let mut source = self.source.lock();
          match source.take() {
            Some(ServiceSource::Factory(factory)) => {
              *source = Some(ServiceSource::Factory(Arc::clone(&factory)));
              factory
            }
            Some(ServiceSource::Instance { value, .. }) => return Ok(value),
            None => return Err(()),
          }
        };
        trace!(
          service = name,
          service_type = factory.type_name(),
          "Constructing service"
        );
        Ok(factory.build())
      })
      .ok()
  }
}

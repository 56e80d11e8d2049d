//! Scoped, ambient distribution of a registry to everything running beneath a provider.

use crate::error::{RegistryError, Result};
use crate::registry::ServiceRegistry;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

thread_local! {
  // The registries bound by currently mounted providers on this thread, tagged with
  // their guard's id, in mounting order. The last entry is the one visible to
  // `use_service`.
  static BINDINGS: RefCell<Vec<(u64, Arc<ServiceRegistry>)>> = RefCell::new(Vec::new());
  static NEXT_BINDING_ID: Cell<u64> = Cell::new(0);
}

/// Binds a shared [`ServiceRegistry`] for a subtree of the application.
///
/// While a provider is mounted, [`use_service`] and [`current_registry`] on the same
/// thread see its registry. Providers nest: the innermost mounted one wins, and
/// unmounting it makes the outer binding visible again.
///
/// # Examples
///
/// ```
/// use fibre_registry::{use_service, ServiceProvider, ServiceRegistry};
/// use std::sync::Arc;
///
/// struct Theme { accent: &'static str }
///
/// let registry = Arc::new(ServiceRegistry::new());
/// registry.register("theme", || Theme { accent: "teal" });
///
/// let accent = ServiceProvider::new(registry).scope(|| {
///   use_service::<Theme>("theme").map(|theme| theme.accent)
/// });
/// assert_eq!(accent, Ok("teal"));
/// ```
#[derive(Debug, Clone)]
pub struct ServiceProvider {
  registry: Arc<ServiceRegistry>,
}

impl ServiceProvider {
  pub fn new(registry: Arc<ServiceRegistry>) -> Self {
    Self { registry }
  }

  /// The registry this provider binds.
  pub fn registry(&self) -> &Arc<ServiceRegistry> {
    &self.registry
  }

  /// Mounts the provider, keeping its registry bound until the returned guard is dropped.
  ///
  /// Dropping a guard removes only its own binding, so guards may be dropped in any
  /// order; the most recently mounted live binding stays visible.
  #[must_use = "the registry is unbound as soon as the guard is dropped"]
  pub fn mount(&self) -> ProviderGuard {
    let id = NEXT_BINDING_ID.with(|next| {
      let id = next.get();
      next.set(id + 1);
      id
    });
    let depth = BINDINGS.with(|bindings| {
      let mut bindings = bindings.borrow_mut();
      bindings.push((id, Arc::clone(&self.registry)));
      bindings.len()
    });
    debug!(binding = id, depth, "Mounted service provider");
    ProviderGuard {
      id,
      _not_send: PhantomData,
    }
  }

  /// Runs `subtree` with this provider mounted and returns its result.
  ///
  /// The binding is removed when `subtree` returns or unwinds.
  pub fn scope<R>(&self, subtree: impl FnOnce() -> R) -> R {
    let _guard = self.mount();
    subtree()
  }
}

impl From<Arc<ServiceRegistry>> for ServiceProvider {
  fn from(registry: Arc<ServiceRegistry>) -> Self {
    Self::new(registry)
  }
}

impl From<ServiceRegistry> for ServiceProvider {
  fn from(registry: ServiceRegistry) -> Self {
    Self::new(Arc::new(registry))
  }
}

/// An RAII guard representing a mounted [`ServiceProvider`].
///
/// Dropping it unbinds the provider's registry. The guard is tied to the thread that
/// mounted it.
#[derive(Debug)]
pub struct ProviderGuard {
  id: u64,
  _not_send: PhantomData<Rc<()>>,
}

impl Drop for ProviderGuard {
  fn drop(&mut self) {
    // `try_with` so a guard dropped during thread teardown does not panic.
    // The removed registry is released after the borrow ends, so services dropped
    // with it may still read the ambient binding.
    let _released = BINDINGS.try_with(|bindings| {
      let mut bindings = bindings.borrow_mut();
      let index = bindings.iter().rposition(|(id, _)| *id == self.id)?;
      let (_, registry) = bindings.remove(index);
      debug!(
        binding = self.id,
        depth = bindings.len(),
        "Unmounted service provider"
      );
      Some(registry)
    });
  }
}

/// Returns the registry bound by the innermost mounted provider on this thread.
///
/// # Errors
///
/// [`RegistryError::RegistryUnavailable`] if no provider is mounted.
pub fn current_registry() -> Result<Arc<ServiceRegistry>> {
  BINDINGS
    .with(|bindings| bindings.borrow().last().map(|(_, registry)| Arc::clone(registry)))
    .ok_or(RegistryError::RegistryUnavailable)
}

/// Resolves `name` from the ambient registry.
///
/// This is a plain forward to [`ServiceRegistry::get`] on [`current_registry`]; it
/// adds no caching of its own.
///
/// # Errors
///
/// [`RegistryError::RegistryUnavailable`] outside of any provider, otherwise whatever
/// [`ServiceRegistry::get`] returns.
pub fn use_service<T: ?Sized + Any + Send + Sync>(name: &str) -> Result<Arc<T>> {
  current_registry()?.get::<T>(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn depth() -> usize {
    BINDINGS.with(|bindings| bindings.borrow().len())
  }

  #[test]
  fn guard_pops_binding_on_drop() {
    let provider = ServiceProvider::from(ServiceRegistry::new());
    assert_eq!(depth(), 0);

    let guard = provider.mount();
    assert_eq!(depth(), 1);
    drop(guard);

    assert_eq!(depth(), 0);
    assert_eq!(current_registry().unwrap_err(), RegistryError::RegistryUnavailable);
  }

  #[test]
  fn dropping_outer_guard_keeps_inner_binding() {
    let outer = Arc::new(ServiceRegistry::new());
    let inner = Arc::new(ServiceRegistry::new());

    let outer_guard = ServiceProvider::new(Arc::clone(&outer)).mount();
    let inner_guard = ServiceProvider::new(Arc::clone(&inner)).mount();
    drop(outer_guard);

    assert_eq!(depth(), 1);
    assert!(Arc::ptr_eq(&current_registry().unwrap(), &inner));

    drop(inner_guard);
    assert_eq!(depth(), 0);
  }

  #[test]
  fn scope_unbinds_after_panic() {
    let provider = ServiceProvider::from(ServiceRegistry::new());

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
      provider.scope(|| panic!("component failed"))
    }));

    assert!(outcome.is_err());
    assert_eq!(depth(), 0);
  }
}

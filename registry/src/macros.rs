//! Public macros for building service maps and resolving ambient services.

/// Builds a [`ServiceMap`](crate::ServiceMap) from `name => factory` pairs.
///
/// Each factory is a closure returning a concrete service and is wrapped with
/// [`ServiceFactory::new`](crate::ServiceFactory::new).
///
/// # Examples
///
/// ```
/// use fibre_registry::services;
///
/// let map = services! {
///   "greeting" => || String::from("hello"),
///   "answer" => || 42_u32,
/// };
/// assert_eq!(map.len(), 2);
/// ```
#[macro_export]
macro_rules! services {
  ($($name:expr => $factory:expr),* $(,)?) => {{
    #[allow(unused_mut)]
    let mut map = $crate::ServiceMap::new();
    $(
      map.insert(
        ::std::string::String::from($name),
        $crate::ServiceFactory::new($factory),
      );
    )*
    map
  }};
}

/// Resolves a service from the ambient registry, panicking if it cannot be resolved.
///
/// This is the panicking counterpart of [`use_service`](fn@crate::use_service), for
/// components that treat a missing service as a wiring bug.
///
/// # Panics
///
/// If no provider is mounted, nothing is registered under the name, or the service has
/// a different type. The panic message carries the underlying error.
///
/// # Examples
///
/// ```
/// use fibre_registry::{use_service, ServiceProvider, ServiceRegistry};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
/// struct FixedClock;
/// impl Clock for FixedClock { fn now(&self) -> u64 { 1_700_000_000 } }
///
/// let registry = ServiceRegistry::new();
/// registry.register("label", || String::from("Now"));
/// registry.register_trait::<dyn Clock>("clock", || Arc::new(FixedClock));
///
/// ServiceProvider::from(registry).scope(|| {
///   let label = use_service!(String, "label");
///   let clock = use_service!(trait Clock, "clock");
///   assert_eq!(format!("{}: {}", label, clock.now()), "Now: 1700000000");
/// });
/// ```
#[macro_export]
macro_rules! use_service {
  (trait $trait_ident:ident, $name:expr) => {
    $crate::use_service::<dyn $trait_ident>($name).unwrap_or_else(|err| {
      panic!(
        "Failed to resolve required trait service '{}' ({}): {}",
        $name,
        ::std::any::type_name::<dyn $trait_ident>(),
        err
      )
    })
  };

  ($type:ty, $name:expr) => {
    $crate::use_service::<$type>($name).unwrap_or_else(|err| {
      panic!(
        "Failed to resolve required service '{}' ({}): {}",
        $name,
        ::std::any::type_name::<$type>(),
        err
      )
    })
  };
}

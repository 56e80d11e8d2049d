//! # Fibre Registry
//!
//! A named, lazily-constructed service registry with scoped ambient distribution,
//! built for component-tree applications such as UI frameworks.
//!
//! Services are registered under string names as factories. The first request for a
//! name runs its factory and caches the result; every later request returns that same
//! instance until the registry is reset. A [`ServiceProvider`] binds one shared
//! registry for a subtree so that any code beneath it can call [`use_service`] without
//! threading the registry through by hand.
//!
//! ## Core Concepts
//!
//! - **ServiceRegistry**: the lazy-singleton cache mapping names to instances.
//! - **configure**: builds a registry from a name → factory map in one call.
//! - **ServiceProvider**: binds a registry for everything run inside its scope.
//! - **use_service**: resolves a named service from the innermost bound registry.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_registry::{configure, services, use_service, ServiceProvider};
//! use std::sync::Arc;
//!
//! struct AuthService {
//!   user: String,
//! }
//!
//! struct Header;
//!
//! impl Header {
//!   fn render(&self) -> String {
//!     let auth = use_service::<AuthService>("authService").unwrap();
//!     format!("Signed in as {}", auth.user)
//!   }
//! }
//!
//! let registry = Arc::new(configure(services! {
//!   "authService" => || AuthService { user: "ada".to_string() },
//! }));
//!
//! let html = ServiceProvider::new(registry).scope(|| Header.render());
//! assert_eq!(html, "Signed in as ada");
//! ```

mod configure;
mod core;
mod error;
mod macros;
mod provider;
mod registry;

pub use configure::configure;
pub use crate::core::{ServiceFactory, ServiceMap};
pub use error::{RegistryError, Result};
pub use provider::{current_registry, use_service, ProviderGuard, ServiceProvider};
pub use registry::ServiceRegistry;

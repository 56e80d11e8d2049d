use fibre_registry::{use_service, RegistryError, ServiceProvider, ServiceRegistry};
use std::panic;

struct UnregisteredService;

fn main() {
  // --- Outside of any provider ---
  println!("Resolving a service with no provider mounted...");
  match use_service::<UnregisteredService>("unregistered") {
    Err(RegistryError::RegistryUnavailable) => println!("Correctly received RegistryUnavailable."),
    _ => panic!("Should not have found a registry!"),
  }

  let provider = ServiceProvider::from(ServiceRegistry::new());

  // --- Using the fallible accessor ---
  println!("\nResolving an unregistered service through the accessor...");
  let err = provider
    .scope(|| use_service::<UnregisteredService>("unregistered"))
    .err()
    .expect("the service was never registered");
  println!("Correctly received: {}", err);
  assert_eq!(err.to_string(), "Service unregistered not found");

  // --- Using the panicking `use_service!` macro ---
  println!("\nResolving the same service with use_service!...");
  let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
    provider.scope(|| {
      // This line will panic!
      let _service = fibre_registry::use_service!(UnregisteredService, "unregistered");
    })
  }));

  assert!(result.is_err(), "use_service! should have panicked.");
  println!("Successfully caught the expected panic from use_service!.");
}

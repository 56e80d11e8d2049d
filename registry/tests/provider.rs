use fibre_registry::{current_registry, use_service, RegistryError, ServiceProvider, ServiceRegistry};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

#[derive(Debug)]
struct MockService {
  value: String,
}

// A stand-in for a UI component: it reads its dependency from the ambient registry.
struct MockComponent;

impl MockComponent {
  fn render(&self) -> Result<(String, Arc<MockService>), RegistryError> {
    let service = use_service::<MockService>("mockService")?;
    Ok((format!("<div>{}</div>", service.value), service))
  }
}

fn registry_with_counter(calls: &Arc<AtomicUsize>) -> Arc<ServiceRegistry> {
  let registry = ServiceRegistry::new();
  let counter = Arc::clone(calls);
  registry.register("mockService", move || {
    counter.fetch_add(1, Ordering::SeqCst);
    MockService {
      value: "Mocked Service".to_string(),
    }
  });
  Arc::new(registry)
}

// --- Tests ---

#[test]
fn test_provider_exposes_registry_to_children() {
  let calls = Arc::new(AtomicUsize::new(0));
  let provider = ServiceProvider::new(registry_with_counter(&calls));

  let html = provider.scope(|| MockComponent.render().map(|(html, _)| html));

  assert_eq!(html.unwrap(), "<div>Mocked Service</div>");
}

#[test]
fn test_two_components_share_one_instance() {
  let calls = Arc::new(AtomicUsize::new(0));
  let provider = ServiceProvider::new(registry_with_counter(&calls));

  let (first, second) = provider.scope(|| {
    let (_, first) = MockComponent.render().unwrap();
    let (_, second) = MockComponent.render().unwrap();
    (first, second)
  });

  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_readers_observe_the_bound_registry_itself() {
  let registry = Arc::new(ServiceRegistry::new());
  let provider = ServiceProvider::new(Arc::clone(&registry));

  let _mounted = provider.mount();
  let ambient = current_registry().unwrap();

  assert!(Arc::ptr_eq(&ambient, &registry));
  assert!(Arc::ptr_eq(provider.registry(), &registry));

  // Writes through the application's handle are visible to readers.
  registry.register("late", || 5_u8);
  assert_eq!(*use_service::<u8>("late").unwrap(), 5);
}

#[test]
fn test_access_without_provider_fails() {
  let err = use_service::<MockService>("mockService").unwrap_err();

  assert_eq!(err, RegistryError::RegistryUnavailable);
  assert_eq!(err.to_string(), "ServiceRegistry not found in context");
}

#[test]
fn test_binding_ends_with_scope() {
  let calls = Arc::new(AtomicUsize::new(0));
  let provider = ServiceProvider::new(registry_with_counter(&calls));

  provider.scope(|| assert!(current_registry().is_ok()));

  assert_eq!(
    MockComponent.render().unwrap_err(),
    RegistryError::RegistryUnavailable
  );
}

#[test]
fn test_unknown_service_under_provider_fails() {
  let provider = ServiceProvider::from(ServiceRegistry::new());

  let err = provider.scope(|| use_service::<MockService>("missing").unwrap_err());

  assert_eq!(err, RegistryError::ServiceNotFound("missing".to_string()));
}

#[test]
fn test_nested_providers_shadow_and_restore() {
  let outer = ServiceRegistry::new();
  outer.register("theme", || "light".to_string());
  let inner = ServiceRegistry::new();
  inner.register("theme", || "dark".to_string());

  let outer = ServiceProvider::from(outer);
  let inner = ServiceProvider::from(inner);

  outer.scope(|| {
    assert_eq!(*use_service::<String>("theme").unwrap(), "light");

    inner.scope(|| {
      assert_eq!(*use_service::<String>("theme").unwrap(), "dark");
    });

    assert_eq!(*use_service::<String>("theme").unwrap(), "light");
  });
}

#[test]
fn test_bindings_are_per_thread() {
  let provider = ServiceProvider::from(ServiceRegistry::new());
  let _mounted = provider.mount();

  let other_thread = std::thread::spawn(current_registry).join().unwrap();

  assert_eq!(other_thread.unwrap_err(), RegistryError::RegistryUnavailable);
  assert!(current_registry().is_ok());
}

#[test]
fn test_reset_through_ambient_registry() {
  let calls = Arc::new(AtomicUsize::new(0));
  let provider = ServiceProvider::new(registry_with_counter(&calls));

  provider.scope(|| {
    assert!(MockComponent.render().is_ok());
    current_registry().unwrap().reset();
    assert_eq!(
      MockComponent.render().unwrap_err(),
      RegistryError::ServiceNotFound("mockService".to_string())
    );
  });
}

#[test]
fn test_guards_dropped_out_of_order_keep_live_binding() {
  let outer = ServiceRegistry::new();
  outer.register("theme", || "light".to_string());
  let inner = ServiceRegistry::new();
  inner.register("theme", || "dark".to_string());

  let outer_guard = ServiceProvider::from(outer).mount();
  let inner_guard = ServiceProvider::from(inner).mount();

  // Unmounting the outer provider first leaves the inner subtree bound.
  drop(outer_guard);
  assert_eq!(*use_service::<String>("theme").unwrap(), "dark");

  drop(inner_guard);
  assert_eq!(
    use_service::<String>("theme").unwrap_err(),
    RegistryError::RegistryUnavailable
  );
}

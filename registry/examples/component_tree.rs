use fibre_registry::{configure, services, use_service, ServiceProvider};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A service that gets a unique ID upon creation.
struct SessionStore {
  id: usize,
  user: String,
}

static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

// Two independent "components" that never receive the store as an argument.
fn navbar() -> String {
  let store = use_service::<SessionStore>("sessionStore").unwrap();
  format!("[navbar] {} (store #{})", store.user, store.id)
}

fn profile_page() -> String {
  let store = use_service::<SessionStore>("sessionStore").unwrap();
  format!("[profile] {} (store #{})", store.user, store.id)
}

fn main() {
  // --- Start-up ---
  let registry = Arc::new(configure(services! {
    "sessionStore" => || {
      println!("Creating SessionStore...");
      SessionStore {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
        user: "ada".to_string(),
      }
    },
  }));

  // --- Rendering ---
  let provider = ServiceProvider::new(Arc::clone(&registry));
  let page = provider.scope(|| vec![navbar(), profile_page()]);

  for line in &page {
    println!("{}", line);
  }

  // Both components saw the same store, built exactly once.
  assert_eq!(ID_COUNTER.load(Ordering::SeqCst), 1);
  assert!(page.iter().all(|line| line.ends_with("(store #0)")));

  // --- Teardown ---
  registry.reset();
  assert!(registry.is_empty());
  println!("Registry reset; {} services remain.", registry.len());
}

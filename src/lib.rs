//! # Beanwire - Field-Injection Object Graphs for Tests
//!
//! A small engine that builds fully initialized object graphs: it
//! constructs a concrete type, resolves an implementation for every
//! injection-marked field, and recurses until the whole tree is wired.
//! Built for test setups where hand-wiring a deep dependency tree (and
//! slipping mocks into the middle of it) is the real cost.
//!
//! ## Features
//!
//! - 🌳 **Whole-graph construction** - one call builds the root and every
//!   transitive dependency
//! - 🔎 **Scope-limited discovery** - implementations of an interface are
//!   found by module scope, with per-scope memoized indexes
//! - ♻️ **Shared instances** - one instance per concrete type per factory,
//!   so diamonds and cycles converge instead of exploding
//! - 🎭 **Override points** - bind an implementing class, a pre-built
//!   instance, or a mock; overrides always beat discovery
//! - 🛡️ **Contained failures** - a field that cannot be satisfied is
//!   logged and left unset; only configuration misuse is an error
//! - 📊 **Observable** - optional `tracing` integration with JSON or
//!   pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use beanwire::{InjectionFactory, TypeModel};
//! use std::sync::{Arc, RwLock};
//!
//! trait Repository: Send + Sync {
//!     fn count(&self) -> usize;
//! }
//!
//! #[derive(Default)]
//! struct InMemoryRepository;
//! impl Repository for InMemoryRepository {
//!     fn count(&self) -> usize {
//!         0
//!     }
//! }
//!
//! #[derive(Default)]
//! struct UserService {
//!     repository: Option<Arc<RwLock<dyn Repository>>>,
//! }
//!
//! // Describe the types once, up front.
//! let mut model = TypeModel::new();
//! model.interface::<dyn Repository>();
//! model
//!     .concrete::<InMemoryRepository>()
//!     .implements::<dyn Repository>(|r| r);
//! model
//!     .concrete::<UserService>()
//!     .inject::<dyn Repository>("repository", |s, dep| s.repository = Some(dep));
//!
//! // One call wires the whole graph.
//! let factory = InjectionFactory::new(Arc::new(model));
//! let service = factory.instance::<UserService>().unwrap().unwrap();
//! let repository = service.read().unwrap().repository.clone().unwrap();
//! assert_eq!(repository.read().unwrap().count(), 0);
//! ```
//!
//! ## Overrides and Mocks
//!
//! ```rust
//! use beanwire::{InjectionFactory, TypeModel};
//! use std::sync::{Arc, RwLock};
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! #[derive(Default)]
//! struct SystemClock;
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 {
//!         0
//!     }
//! }
//!
//! #[derive(Default)]
//! struct FrozenClock;
//! impl Clock for FrozenClock {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Scheduler {
//!     clock: Option<Arc<RwLock<dyn Clock>>>,
//! }
//!
//! let mut model = TypeModel::new();
//! model.interface::<dyn Clock>();
//! model.concrete::<SystemClock>().implements::<dyn Clock>(|c| c);
//! model.concrete::<FrozenClock>().implements::<dyn Clock>(|c| c);
//! model
//!     .concrete::<Scheduler>()
//!     .inject::<dyn Clock>("clock", |s, dep| s.clock = Some(dep));
//!
//! let factory = InjectionFactory::new(Arc::new(model));
//!
//! // Two implementations would be ambiguous; the mock decides it.
//! factory.set_mock::<dyn Clock, FrozenClock>(FrozenClock).unwrap();
//!
//! let scheduler = factory.instance::<Scheduler>().unwrap().unwrap();
//! let clock = scheduler.read().unwrap().clock.clone().unwrap();
//! assert_eq!(clock.read().unwrap().now(), 42);
//! ```
//!
//! ## Design Notes
//!
//! - Instances are `Arc<RwLock<T>>`; every handle to a type within one
//!   factory refers to the same object
//! - The [`TypeModel`] is a manually populated registry: registration
//!   sites capture the constructors, setters, and trait-object casts the
//!   engine needs, since there is no runtime reflection to fall back on
//! - Factories are isolated; parallel test cases each get their own

mod error;
mod factory;
mod key;
#[cfg(feature = "logging")]
pub mod logging;
mod model;
mod scope;
mod storage;

pub use error::*;
pub use factory::*;
pub use key::*;
pub use model::*;
pub use scope::*;
pub use storage::Instance;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Inject, InjectError, InjectionFactory, LookupScope, Marker, Result, TypeKey, TypeModel,
    };
    pub use std::sync::{Arc, RwLock};
}

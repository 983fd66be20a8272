//! Scope-limited implementation discovery
//!
//! Finding the implementations of an interface is a capability the engine
//! consumes, not something it owns: the [`Discover`] trait answers "which
//! concrete types are assignable to each interface, within this module
//! scope". The default adapter scans the [`TypeModel`]; tests can swap in
//! anything else.
//!
//! Preparing a scope is the potentially expensive step (the original
//! system paid a classpath scan per package), so the engine memoizes one
//! [`ScopeIndex`] per scope string and reuses it for every interface
//! resolved under that scope.

use crate::key::TypeKey;
use crate::model::TypeModel;
use ahash::RandomState;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Where to look for implementations of an interface.
///
/// The scope is a module-path boundary: a concrete type is in scope when
/// its declaring module equals the boundary or sits below it.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum LookupScope {
    /// The interface's own declaring module and its descendants (default).
    #[default]
    DeclaringModule,
    /// No boundary: every registered type is in scope.
    Everywhere,
    /// A fixed module path and its descendants.
    Module(String),
}

impl LookupScope {
    /// The scope prefix to search under for the given interface.
    pub(crate) fn prefix(&self, interface: TypeKey) -> &str {
        match self {
            LookupScope::DeclaringModule => interface.module(),
            LookupScope::Everywhere => "",
            LookupScope::Module(path) => path,
        }
    }
}

/// Whether `module` is `scope` itself or a descendant of it.
fn in_scope(module: &str, scope: &str) -> bool {
    if scope.is_empty() {
        return true;
    }
    match module.strip_prefix(scope) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// Prepared discovery results for one scope.
///
/// Maps each interface to the concrete types assignable to it within the
/// scope, ordered by type name so ambiguity reports are deterministic.
pub struct ScopeIndex {
    implementers: HashMap<TypeId, Vec<TypeKey>, RandomState>,
}

impl ScopeIndex {
    /// Build an index from per-interface candidate lists.
    pub fn new(mut implementers: HashMap<TypeId, Vec<TypeKey>, RandomState>) -> Self {
        for candidates in implementers.values_mut() {
            candidates.sort_by_key(|key| key.name());
        }
        Self { implementers }
    }

    /// An index with no implementations at all.
    pub fn empty() -> Self {
        Self {
            implementers: HashMap::default(),
        }
    }

    /// Concrete types assignable to the interface within this scope.
    pub fn implementers_of(&self, interface: TypeId) -> &[TypeKey] {
        self.implementers
            .get(&interface)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether no interface has an implementation in this scope.
    pub fn is_empty(&self) -> bool {
        self.implementers.is_empty()
    }
}

impl std::fmt::Debug for ScopeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeIndex")
            .field("interfaces", &self.implementers.len())
            .finish()
    }
}

/// Discovery capability: enumerate implementations within a scope.
///
/// `scope` is a module-path prefix; the empty string means "everywhere".
/// Implementations must treat "assignable to" transitively, so an
/// interface that is only reachable through interface inheritance still
/// lists the implementer.
pub trait Discover: Send + Sync {
    /// Prepare the index for one scope.
    fn index(&self, scope: &str) -> ScopeIndex;
}

/// Default discovery adapter backed by the [`TypeModel`].
pub struct ModelDiscovery {
    model: Arc<TypeModel>,
}

impl ModelDiscovery {
    pub fn new(model: Arc<TypeModel>) -> Self {
        Self { model }
    }
}

impl Discover for ModelDiscovery {
    fn index(&self, scope: &str) -> ScopeIndex {
        let mut implementers: HashMap<TypeId, Vec<TypeKey>, RandomState> = HashMap::default();
        for interface in self.model.interface_keys() {
            let candidates: Vec<TypeKey> = self
                .model
                .concrete_keys()
                .filter(|concrete| in_scope(concrete.module(), scope))
                .filter(|concrete| self.model.is_assignable(concrete.id(), interface.id()))
                .collect();
            if !candidates.is_empty() {
                implementers.insert(interface.id(), candidates);
            }
        }
        ScopeIndex::new(implementers)
    }
}

//! Engine-owned mutable state: instance cache, negative-result cache,
//! binding registry
//!
//! Uses DashMap/DashSet with `ahash` keys. All of this state is created
//! empty with the engine and lives for the engine's lifetime; independent
//! engines never share it.

use crate::key::TypeKey;
use ahash::RandomState;
use dashmap::{DashMap, DashSet};
use std::any::{Any, TypeId};
use std::sync::{Arc, RwLock};

/// Type-erased shared instance payload. The erased value is always the
/// `RwLock<C>` of the concrete type `C` the instance was built from.
pub(crate) type Shared = Arc<dyn Any + Send + Sync>;

/// Type-erased value ready to be assigned into a field. The box always
/// holds an `Arc<RwLock<D>>` where `D` is the field's declared type
/// (possibly a `dyn Trait`).
pub(crate) type FieldValue = Box<dyn Any + Send + Sync>;

/// A constructed instance of a concrete type.
///
/// Cheap to clone; all clones refer to the same underlying object, and
/// [`Instance::ptr_eq`] tells whether two handles do.
#[derive(Clone)]
pub struct Instance {
    key: TypeKey,
    shared: Shared,
    /// Rebuilds the typed `Arc<RwLock<C>>` from the erased payload, for
    /// assignment into fields declared with the concrete type itself.
    as_field_value: Arc<dyn Fn(&Shared) -> Option<FieldValue> + Send + Sync>,
}

impl Instance {
    /// Wrap a value in a new shared instance.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        let shared: Shared = Arc::new(RwLock::new(value));
        Self {
            key: TypeKey::of::<T>(),
            shared,
            as_field_value: Arc::new(|shared: &Shared| {
                shared
                    .clone()
                    .downcast::<RwLock<T>>()
                    .ok()
                    .map(|arc| Box::new(arc) as FieldValue)
            }),
        }
    }

    /// The concrete type this instance was built from.
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Whether the instance is of concrete type `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.key.id() == TypeId::of::<T>()
    }

    /// The typed handle, if `T` is the instance's concrete type.
    #[inline]
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<RwLock<T>>> {
        self.shared.clone().downcast::<RwLock<T>>().ok()
    }

    /// Whether two handles refer to the same underlying object.
    #[inline]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    #[inline]
    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    /// The instance as a value assignable into a field declared with the
    /// instance's own concrete type.
    #[inline]
    pub(crate) fn concrete_field_value(&self) -> Option<FieldValue> {
        (self.as_field_value)(&self.shared)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").field("key", &self.key).finish()
    }
}

/// One cached instance per concrete type.
///
/// Instances are inserted before their fields are populated, which is what
/// lets diamond-shaped graphs converge on a single shared node.
pub(crate) struct InstanceCache {
    map: DashMap<TypeId, Instance, RandomState>,
}

impl InstanceCache {
    /// Create empty cache.
    ///
    /// 8 shards: engines hold a handful of instances, the DashMap default
    /// shard count is sized for much larger maps.
    pub fn new() -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
        }
    }

    /// Cached instance for a type id, if any.
    ///
    /// Returns a clone so no shard lock is held while the caller recurses.
    #[inline]
    pub fn get(&self, id: &TypeId) -> Option<Instance> {
        self.map.get(id).map(|entry| entry.value().clone())
    }

    #[inline]
    pub fn insert(&self, id: TypeId, instance: Instance) {
        self.map.insert(id, instance);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Interface types for which discovery already came up empty.
///
/// Membership means "do not scan again"; adding a binding for the interface
/// removes it.
pub(crate) struct NegativeCache {
    set: DashSet<TypeId, RandomState>,
}

impl NegativeCache {
    pub fn new() -> Self {
        Self {
            set: DashSet::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    pub fn contains(&self, id: &TypeId) -> bool {
        self.set.contains(id)
    }

    #[inline]
    pub fn insert(&self, id: TypeId) {
        self.set.insert(id);
    }

    #[inline]
    pub fn remove(&self, id: &TypeId) {
        self.set.remove(id);
    }
}

/// User-declared interface → implementing class mappings.
///
/// Consulted before the negative cache and before discovery; a mapping here
/// always wins.
pub(crate) struct Bindings {
    implementing_class: DashMap<TypeId, TypeKey, RandomState>,
}

impl Bindings {
    pub fn new() -> Self {
        Self {
            implementing_class: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
        }
    }

    /// The bound implementing class for an interface, if any.
    #[inline]
    pub fn implementation_of(&self, interface: &TypeId) -> Option<TypeKey> {
        self.implementing_class
            .get(interface)
            .map(|entry| *entry.value())
    }

    #[inline]
    pub fn set_implementation(&self, interface: TypeId, implementation: TypeKey) {
        self.implementing_class.insert(interface, implementation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        label: String,
    }

    #[test]
    fn instance_identity_is_shared_across_clones() {
        let a = Instance::new(Widget {
            label: "one".into(),
        });
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(a.is::<Widget>());
    }

    #[test]
    fn instance_downcast_round_trip() {
        let instance = Instance::new(Widget {
            label: "tag".into(),
        });
        let typed = instance.downcast::<Widget>().unwrap();
        assert_eq!(typed.read().unwrap().label, "tag");
        assert!(instance.downcast::<String>().is_none());
    }

    #[test]
    fn concrete_field_value_holds_typed_arc() {
        let instance = Instance::new(Widget {
            label: "field".into(),
        });
        let value = instance.concrete_field_value().unwrap();
        let arc = value.downcast::<Arc<RwLock<Widget>>>().unwrap();
        assert_eq!(arc.read().unwrap().label, "field");
    }

    #[test]
    fn cache_returns_same_instance() {
        let cache = InstanceCache::new();
        let id = TypeId::of::<Widget>();
        assert!(cache.get(&id).is_none());

        cache.insert(id, Instance::new(Widget { label: "x".into() }));
        let first = cache.get(&id).unwrap();
        let second = cache.get(&id).unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn negative_cache_remembers_and_forgets() {
        let missing = NegativeCache::new();
        let id = TypeId::of::<Widget>();

        assert!(!missing.contains(&id));
        missing.insert(id);
        assert!(missing.contains(&id));
        missing.remove(&id);
        assert!(!missing.contains(&id));
    }

    #[test]
    fn bindings_latest_mapping_wins() {
        let bindings = Bindings::new();
        let iface = TypeId::of::<dyn std::any::Any>();

        bindings.set_implementation(iface, TypeKey::of::<Widget>());
        bindings.set_implementation(iface, TypeKey::of::<String>());
        assert_eq!(
            bindings.implementation_of(&iface),
            Some(TypeKey::of::<String>())
        );
    }
}

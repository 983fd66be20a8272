//! The injection factory: construction orchestration, resolution, injection
//!
//! [`InjectionFactory`] builds fully initialized instances of concrete
//! types: it constructs the bare instance, caches it immediately, then
//! walks the type's marked fields, resolving each declared type to a
//! concrete implementation and recursing. One instance is kept per concrete
//! type per factory, so a tree of dependency requests collapses into a
//! shared graph.
//!
//! Failure containment follows one rule: configuration misuse (interface
//! requested as a root, malformed binding, ambiguous discovery) propagates
//! as an error; everything that goes wrong for a single field
//! (construction failure, missing implementation, assignment mismatch) is
//! logged and leaves that field unset while the rest of the graph is built.

use crate::error::{InjectError, Result};
use crate::key::{Inject, Marker, TypeKey};
use crate::model::{FieldInfo, TypeKind, TypeModel};
use crate::scope::{Discover, LookupScope, ModelDiscovery, ScopeIndex};
use crate::storage::{Bindings, FieldValue, Instance, InstanceCache, NegativeCache};
use ahash::{AHashSet, RandomState};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, RwLock};

#[cfg(feature = "logging")]
use tracing::{debug, error, trace};

/// Object factory that builds fully initialized instance graphs.
///
/// Each factory owns its caches and registries; independent factories are
/// fully isolated, so parallel test suites can each use their own. The
/// individual caches are lock-free, but the factory's contract is
/// single-threaded call-and-return: concurrent use of one factory is the
/// caller's responsibility to synchronize.
///
/// # Examples
///
/// ```rust
/// use beanwire::{InjectionFactory, TypeModel};
/// use std::sync::{Arc, RwLock};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> &'static str;
/// }
///
/// #[derive(Default)]
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> &'static str {
///         "hello"
///     }
/// }
///
/// #[derive(Default)]
/// struct App {
///     greeter: Option<Arc<RwLock<dyn Greeter>>>,
/// }
///
/// let mut model = TypeModel::new();
/// model.interface::<dyn Greeter>();
/// model.concrete::<English>().implements::<dyn Greeter>(|g| g);
/// model
///     .concrete::<App>()
///     .inject::<dyn Greeter>("greeter", |app, dep| app.greeter = Some(dep));
///
/// let factory = InjectionFactory::new(Arc::new(model));
/// let app = factory.instance::<App>().unwrap().unwrap();
/// let greeter = app.read().unwrap().greeter.clone().unwrap();
/// assert_eq!(greeter.read().unwrap().greet(), "hello");
/// ```
pub struct InjectionFactory {
    model: Arc<TypeModel>,
    discovery: Arc<dyn Discover>,
    /// One instance per concrete type, inserted before field population.
    instances: InstanceCache,
    /// Interfaces already known to have no implementation.
    missing: NegativeCache,
    /// User-set interface → implementing class overrides.
    bindings: Bindings,
    /// Memoized discovery results, one index per scope prefix.
    scope_indexes: DashMap<String, Arc<ScopeIndex>, RandomState>,
    /// Per-interface lookup scope overrides.
    lookup_scopes: DashMap<TypeId, LookupScope, RandomState>,
    /// Marker kinds that make a field injectable for this factory.
    markers: AHashSet<Marker>,
}

impl InjectionFactory {
    /// Create a factory that processes the default [`Inject`] marker.
    pub fn new(model: Arc<TypeModel>) -> Self {
        Self::with_markers(model, [Marker::of::<Inject>()])
    }

    /// Create a factory that processes the given marker kinds instead of
    /// the default.
    pub fn with_markers(
        model: Arc<TypeModel>,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        let discovery = Arc::new(ModelDiscovery::new(Arc::clone(&model)));
        Self::assemble(model, discovery, markers)
    }

    /// Create a factory with a custom discovery adapter.
    pub fn with_discovery(model: Arc<TypeModel>, discovery: Arc<dyn Discover>) -> Self {
        Self::assemble(model, discovery, [Marker::of::<Inject>()])
    }

    fn assemble(
        model: Arc<TypeModel>,
        discovery: Arc<dyn Discover>,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        let markers: AHashSet<Marker> = markers.into_iter().collect();

        #[cfg(feature = "logging")]
        debug!(
            target: "beanwire",
            marker_count = markers.len(),
            "creating injection factory"
        );

        Self {
            model,
            discovery,
            instances: InstanceCache::new(),
            missing: NegativeCache::new(),
            bindings: Bindings::new(),
            scope_indexes: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
            lookup_scopes: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
            markers,
        }
    }

    /// Override the lookup scope used to discover implementations of one
    /// interface. Clears a previous negative verdict for it, since a wider
    /// scope may now find an implementation.
    pub fn set_lookup_scope<I: ?Sized + 'static>(&self, scope: LookupScope) {
        #[cfg(feature = "logging")]
        debug!(
            target: "beanwire",
            interface = std::any::type_name::<I>(),
            scope = ?scope,
            "setting lookup scope"
        );

        self.lookup_scopes.insert(TypeId::of::<I>(), scope);
        self.missing.remove(&TypeId::of::<I>());
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Build (or return the cached) fully initialized instance of `T`.
    ///
    /// `Ok(None)` means construction failed in a recoverable way (no usable
    /// constructor, or the constructor reported an error); the failure is
    /// logged and not cached, so a later override can still supply the
    /// type.
    ///
    /// # Errors
    ///
    /// [`InjectError::InterfaceRequested`] if `T` is a registered interface
    /// type, and [`InjectError::AmbiguousImplementation`] when some field's
    /// interface has several discoverable implementations and no override.
    pub fn instance<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<RwLock<T>>>> {
        Ok(self
            .obtain(TypeKey::of::<T>())?
            .and_then(|instance| instance.downcast::<T>()))
    }

    /// Untyped variant of [`instance`](Self::instance), used by the
    /// recursive injection path and by callers working from runtime keys.
    ///
    /// Instances are cached before their fields are populated; a request
    /// arriving mid-population (a diamond, or a genuine cycle) receives the
    /// partially populated shared instance rather than recursing forever.
    pub fn obtain(&self, key: TypeKey) -> Result<Option<Instance>> {
        #[cfg(feature = "logging")]
        trace!(target: "beanwire", ty = key.name(), "processing");

        let kind = self.model.kind(key.id());
        if kind == Some(TypeKind::Interface) {
            return Err(InjectError::interface_requested(key));
        }

        // The cache comes before the registration check: an instance set
        // through the override API is reachable even when its type was
        // never registered in the model.
        if let Some(cached) = self.instances.get(&key.id()) {
            return Ok(Some(cached));
        }

        if kind.is_none() {
            #[cfg(feature = "logging")]
            error!(
                target: "beanwire",
                ty = key.name(),
                "cannot instantiate: type is not registered in the model"
            );
            return Ok(None);
        }

        let Some(constructor) = self.model.constructor_of(key.id()) else {
            #[cfg(feature = "logging")]
            error!(
                target: "beanwire",
                ty = key.name(),
                "cannot instantiate: no usable constructor"
            );
            return Ok(None);
        };

        let instance = match constructor() {
            Ok(instance) => instance,
            Err(failure) => {
                #[cfg(feature = "logging")]
                error!(
                    target: "beanwire",
                    ty = key.name(),
                    reason = %failure,
                    "could not instantiate type"
                );
                let _ = failure;
                return Ok(None);
            }
        };

        // Cache before populating fields so that shared and cyclic
        // references converge on this instance.
        self.instances.insert(key.id(), instance.clone());

        for field in self.model.fields_of(key.id()) {
            if field.markers.iter().any(|marker| self.markers.contains(marker)) {
                #[cfg(feature = "logging")]
                trace!(
                    target: "beanwire",
                    ty = key.name(),
                    field = field.name,
                    declared = field.declared.name(),
                    "trying to set field"
                );
                self.inject_field(&instance, field)?;
            }
        }

        Ok(Some(instance))
    }

    /// `obtain` over an optional key: the "no dependency chosen" path.
    fn obtain_resolved(&self, key: Option<TypeKey>) -> Result<Option<Instance>> {
        match key {
            Some(key) => self.obtain(key),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Injection
    // =========================================================================

    /// Populate one marked field of `target`.
    fn inject_field(&self, target: &Instance, field: &FieldInfo) -> Result<()> {
        let declared = field.declared;

        // A cached instance for the declared type (user-set or previously
        // built) wins over resolution and construction.
        let instance = match self.instances.get(&declared.id()) {
            Some(existing) => Some(existing),
            None => {
                let chosen = match self.model.kind(declared.id()) {
                    Some(TypeKind::Interface) => self.resolve(declared)?,
                    Some(TypeKind::Concrete) => Some(declared),
                    None => {
                        #[cfg(feature = "logging")]
                        error!(
                            target: "beanwire",
                            field = field.name,
                            declared = declared.name(),
                            "field type is not registered in the model"
                        );
                        None
                    }
                };
                self.obtain_resolved(chosen)?
            }
        };

        let Some(instance) = instance else {
            #[cfg(feature = "logging")]
            trace!(
                target: "beanwire",
                field = field.name,
                "no instance available, leaving field unset"
            );
            return Ok(());
        };

        let Some(value) = self.value_for(declared, &instance) else {
            #[cfg(feature = "logging")]
            error!(
                target: "beanwire",
                field = field.name,
                declared = declared.name(),
                actual = instance.key().name(),
                "instance cannot be assigned to field's declared type"
            );
            return Ok(());
        };

        if let Err(failure) = (field.setter)(target.shared(), value) {
            #[cfg(feature = "logging")]
            error!(
                target: "beanwire",
                field = field.name,
                reason = %failure,
                "could not set field"
            );
            let _ = failure;
        }
        Ok(())
    }

    /// Shape an instance into a value assignable to a field of the declared
    /// type: the interface cast for interface fields, the identity handle
    /// for concrete fields.
    fn value_for(&self, declared: TypeKey, instance: &Instance) -> Option<FieldValue> {
        match self.model.kind(declared.id()) {
            Some(TypeKind::Interface) => self.model.cast_to_interface(
                instance.key().id(),
                declared.id(),
                instance.shared(),
            ),
            _ => {
                if instance.key().id() == declared.id() {
                    instance.concrete_field_value()
                } else {
                    None
                }
            }
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Choose the concrete type to use for an interface: user override,
    /// then negative cache, then scope-limited discovery.
    fn resolve(&self, interface: TypeKey) -> Result<Option<TypeKey>> {
        if let Some(bound) = self.bindings.implementation_of(&interface.id()) {
            #[cfg(feature = "logging")]
            trace!(
                target: "beanwire",
                interface = interface.name(),
                implementation = bound.name(),
                "using user-set implementation"
            );
            return Ok(Some(bound));
        }

        if self.missing.contains(&interface.id()) {
            #[cfg(feature = "logging")]
            trace!(
                target: "beanwire",
                interface = interface.name(),
                "known to have no implementation, not trying again"
            );
            return Ok(None);
        }

        let scope = self
            .lookup_scopes
            .get(&interface.id())
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        let prefix = scope.prefix(interface).to_owned();
        let index = self.scope_index(&prefix);

        let candidates = index.implementers_of(interface.id());

        #[cfg(feature = "logging")]
        trace!(
            target: "beanwire",
            interface = interface.name(),
            scope = prefix.as_str(),
            found = candidates.len(),
            "discovery finished"
        );

        match candidates {
            [only] => Ok(Some(*only)),
            [] => {
                self.missing.insert(interface.id());
                Ok(None)
            }
            several => Err(InjectError::ambiguous(interface, several)),
        }
    }

    /// Memoized per-scope discovery index.
    fn scope_index(&self, prefix: &str) -> Arc<ScopeIndex> {
        if let Some(cached) = self.scope_indexes.get(prefix) {
            return Arc::clone(cached.value());
        }

        #[cfg(feature = "logging")]
        debug!(target: "beanwire", scope = prefix, "preparing discovery index");

        let built = Arc::new(self.discovery.index(prefix));
        self.scope_indexes
            .entry(prefix.to_owned())
            .or_insert(built)
            .clone()
    }

    // =========================================================================
    // Overrides
    // =========================================================================

    /// Register an instance to use verbatim wherever type `T` is needed.
    ///
    /// For an interface `T`: validates at binding time that `C` implements
    /// it, records the interface→class mapping, and caches the instance
    /// under both the interface key and `C`'s own key (so
    /// [`instance::<C>()`](Self::instance) returns the same object). For a
    /// concrete `T` (which must be `C` itself), just caches the instance.
    ///
    /// Overrides the automatic lookup and is the natural way to inject
    /// hand-built collaborators.
    pub fn set_implementation<T: ?Sized + 'static, C: Send + Sync + 'static>(
        &self,
        instance: C,
    ) -> Result<()> {
        let target = TypeKey::of::<T>();
        let concrete = TypeKey::of::<C>();

        match self.model.kind(target.id()) {
            Some(TypeKind::Interface) => {
                if !self.model.is_assignable(concrete.id(), target.id()) {
                    return Err(InjectError::not_an_implementation(target, concrete));
                }

                #[cfg(feature = "logging")]
                debug!(
                    target: "beanwire",
                    interface = target.name(),
                    implementation = concrete.name(),
                    "registering instance for interface"
                );

                self.bindings.set_implementation(target.id(), concrete);
                self.missing.remove(&target.id());

                let instance = Instance::new(instance);
                self.instances.insert(target.id(), instance.clone());
                self.instances.insert(concrete.id(), instance);
                Ok(())
            }
            _ => {
                if target.id() != concrete.id() {
                    return Err(InjectError::not_an_implementation(target, concrete));
                }
                self.set_instance(instance);
                Ok(())
            }
        }
    }

    /// Register an instance under its own concrete type.
    pub fn set_instance<C: Send + Sync + 'static>(&self, instance: C) {
        #[cfg(feature = "logging")]
        debug!(
            target: "beanwire",
            ty = std::any::type_name::<C>(),
            "registering instance"
        );

        self.instances.insert(TypeId::of::<C>(), Instance::new(instance));
    }

    /// Register the implementing class to use for an interface, without a
    /// pre-built instance.
    ///
    /// # Errors
    ///
    /// [`InjectError::NotAnInterface`] if `I` is not a registered
    /// interface, [`InjectError::NotAConcrete`] if `C` is not a registered
    /// concrete type, [`InjectError::NotAnImplementation`] if `C` does not
    /// implement `I`. The registry is unchanged on failure.
    pub fn set_implementing_class<I: ?Sized + 'static, C: ?Sized + 'static>(&self) -> Result<()> {
        let interface = TypeKey::of::<I>();
        let implementation = TypeKey::of::<C>();

        if self.model.kind(interface.id()) != Some(TypeKind::Interface) {
            return Err(InjectError::not_an_interface(interface));
        }
        if self.model.kind(implementation.id()) != Some(TypeKind::Concrete) {
            return Err(InjectError::not_a_concrete(implementation));
        }
        if !self.model.is_assignable(implementation.id(), interface.id()) {
            return Err(InjectError::not_an_implementation(interface, implementation));
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "beanwire",
            interface = interface.name(),
            implementation = implementation.name(),
            "registering implementing class"
        );

        self.bindings.set_implementation(interface.id(), implementation);
        self.missing.remove(&interface.id());
        Ok(())
    }

    /// Substitute a test double for interface `I`.
    ///
    /// Registers `M` as the implementing class for `I` and caches the mock
    /// under `M`'s key, so any field declared `I` receives exactly this
    /// object.
    pub fn set_mock<I: ?Sized + 'static, M: Send + Sync + 'static>(&self, mock: M) -> Result<()> {
        self.set_implementing_class::<I, M>()?;
        self.set_instance(mock);
        Ok(())
    }
}

impl std::fmt::Debug for InjectionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionFactory")
            .field("cached_instances", &self.instances.len())
            .field("markers", &self.markers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    trait Codec: Send + Sync {
        fn name(&self) -> &'static str;
    }

    #[derive(Default)]
    struct Gzip;
    impl Codec for Gzip {
        fn name(&self) -> &'static str {
            "gzip"
        }
    }

    #[derive(Default)]
    struct Zstd;
    impl Codec for Zstd {
        fn name(&self) -> &'static str {
            "zstd"
        }
    }

    #[derive(Default)]
    struct Archiver {
        codec: Option<Arc<RwLock<dyn Codec>>>,
    }

    fn model_with(codecs: &[&str]) -> Arc<TypeModel> {
        let mut model = TypeModel::new();
        model.interface::<dyn Codec>();
        if codecs.contains(&"gzip") {
            model.concrete::<Gzip>().implements::<dyn Codec>(|c| c);
        }
        if codecs.contains(&"zstd") {
            model.concrete::<Zstd>().implements::<dyn Codec>(|c| c);
        }
        model
            .concrete::<Archiver>()
            .inject::<dyn Codec>("codec", |a, dep| a.codec = Some(dep));
        Arc::new(model)
    }

    fn injected_codec(factory: &InjectionFactory) -> Option<Arc<RwLock<dyn Codec>>> {
        let archiver = factory.instance::<Archiver>().unwrap().unwrap();
        let codec = archiver.read().unwrap().codec.clone();
        codec
    }

    #[test]
    fn single_implementation_is_discovered() {
        let factory = InjectionFactory::new(model_with(&["gzip"]));
        let codec = injected_codec(&factory).unwrap();
        assert_eq!(codec.read().unwrap().name(), "gzip");
    }

    #[test]
    fn two_implementations_fail_without_override() {
        let factory = InjectionFactory::new(model_with(&["gzip", "zstd"]));
        let result = factory.instance::<Archiver>();
        assert!(matches!(
            result,
            Err(InjectError::AmbiguousImplementation { candidates, .. }) if candidates.len() == 2
        ));
    }

    #[test]
    fn implementing_class_binding_beats_discovery() {
        let factory = InjectionFactory::new(model_with(&["gzip", "zstd"]));
        factory.set_implementing_class::<dyn Codec, Zstd>().unwrap();

        let codec = injected_codec(&factory).unwrap();
        assert_eq!(codec.read().unwrap().name(), "zstd");
    }

    #[test]
    fn instance_binding_is_used_verbatim() {
        let factory = InjectionFactory::new(model_with(&["gzip", "zstd"]));
        factory.set_implementation::<dyn Codec, Gzip>(Gzip).unwrap();

        let codec = injected_codec(&factory).unwrap();
        assert_eq!(codec.read().unwrap().name(), "gzip");

        // The bound instance is also reachable under its own type.
        let direct = factory.instance::<Gzip>().unwrap().unwrap();
        let via_iface = factory.obtain(TypeKey::of::<Gzip>()).unwrap().unwrap();
        assert!(Arc::ptr_eq(&direct, &via_iface.downcast::<Gzip>().unwrap()));
    }

    #[test]
    fn obtain_of_interface_is_refused() {
        let factory = InjectionFactory::new(model_with(&["gzip"]));
        let result = factory.obtain(TypeKey::of::<dyn Codec>());
        assert!(matches!(result, Err(InjectError::InterfaceRequested { .. })));
    }

    #[test]
    fn unregistered_type_degrades_to_none() {
        let factory = InjectionFactory::new(model_with(&[]));
        assert!(factory.instance::<String>().unwrap().is_none());
    }

    #[test]
    fn unconstructible_root_degrades_to_none() {
        let mut model = TypeModel::new();
        model.unconstructible::<Gzip>();
        let factory = InjectionFactory::new(Arc::new(model));
        assert!(factory.instance::<Gzip>().unwrap().is_none());
    }

    #[test]
    fn failed_construction_is_not_cached() {
        static ATTEMPTS: AtomicU32 = AtomicU32::new(0);

        struct Flaky;
        let mut model = TypeModel::new();
        model.concrete_with::<Flaky, _>(|| {
            if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("first attempt fails".into())
            } else {
                Ok(Flaky)
            }
        });
        let factory = InjectionFactory::new(Arc::new(model));

        assert!(factory.instance::<Flaky>().unwrap().is_none());
        // The failure was not memoized; the second request succeeds.
        assert!(factory.instance::<Flaky>().unwrap().is_some());
    }

    #[test]
    fn set_implementing_class_validates_both_sides() {
        let factory = InjectionFactory::new(model_with(&["gzip"]));

        assert!(matches!(
            factory.set_implementing_class::<Gzip, Gzip>(),
            Err(InjectError::NotAnInterface { .. })
        ));
        assert!(matches!(
            factory.set_implementing_class::<dyn Codec, dyn Codec>(),
            Err(InjectError::NotAConcrete { .. })
        ));
        assert!(matches!(
            factory.set_implementing_class::<dyn Codec, Archiver>(),
            Err(InjectError::NotAnImplementation { .. })
        ));
    }

    #[test]
    fn set_implementation_validates_conformance() {
        let factory = InjectionFactory::new(model_with(&["gzip"]));
        assert!(matches!(
            factory.set_implementation::<dyn Codec, Archiver>(Archiver::default()),
            Err(InjectError::NotAnImplementation { .. })
        ));
    }

    #[test]
    fn binding_clears_negative_verdict() {
        #[derive(Default)]
        struct LateArchiver {
            codec: Option<Arc<RwLock<dyn Codec>>>,
        }

        let mut model = TypeModel::new();
        model.interface::<dyn Codec>();
        model.concrete::<Gzip>().implements::<dyn Codec>(|c| c);
        model
            .concrete::<Archiver>()
            .inject::<dyn Codec>("codec", |a, dep| a.codec = Some(dep));
        model
            .concrete::<LateArchiver>()
            .inject::<dyn Codec>("codec", |a, dep| a.codec = Some(dep));
        let factory = InjectionFactory::new(Arc::new(model));

        // Point discovery at a module with no implementations, so the
        // first build records "no implementation" for the interface.
        factory.set_lookup_scope::<dyn Codec>(LookupScope::Module("beanwire::nowhere".into()));
        let archiver = factory.instance::<Archiver>().unwrap().unwrap();
        assert!(archiver.read().unwrap().codec.is_none());

        factory.set_implementation::<dyn Codec, Gzip>(Gzip).unwrap();

        // The stale verdict is gone; resolution now sees the binding and
        // later builds get the dependency.
        let resolved = factory.resolve(TypeKey::of::<dyn Codec>()).unwrap();
        assert_eq!(resolved, Some(TypeKey::of::<Gzip>()));

        let late = factory.instance::<LateArchiver>().unwrap().unwrap();
        assert!(late.read().unwrap().codec.is_some());
    }

    #[test]
    fn cached_instance_is_reachable_without_model_registration() {
        struct Handle {
            port: u16,
        }

        let factory = InjectionFactory::new(model_with(&[]));
        factory.set_instance(Handle { port: 9 });

        let handle = factory.instance::<Handle>().unwrap().unwrap();
        assert_eq!(handle.read().unwrap().port, 9);
    }

    #[test]
    fn scope_index_is_memoized_per_scope() {
        struct CountingDiscovery {
            inner: ModelDiscovery,
            calls: AtomicU32,
        }
        impl Discover for CountingDiscovery {
            fn index(&self, scope: &str) -> ScopeIndex {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.inner.index(scope)
            }
        }

        let model = model_with(&["gzip"]);
        let discovery = Arc::new(CountingDiscovery {
            inner: ModelDiscovery::new(Arc::clone(&model)),
            calls: AtomicU32::new(0),
        });
        let factory = InjectionFactory::with_discovery(model, Arc::clone(&discovery) as _);

        let _ = factory.resolve(TypeKey::of::<dyn Codec>()).unwrap();
        let _ = factory.resolve(TypeKey::of::<dyn Codec>()).unwrap();
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lookup_scope_override_widens_discovery() {
        let factory = InjectionFactory::new(model_with(&["gzip"]));
        factory.set_lookup_scope::<dyn Codec>(LookupScope::Everywhere);

        let codec = injected_codec(&factory).unwrap();
        assert_eq!(codec.read().unwrap().name(), "gzip");
    }
}

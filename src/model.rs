//! Type model: the engine's view of types, fields, and conformance
//!
//! Rust has no runtime reflection, so the three capabilities the engine
//! consumes — "list a type's injectable fields and their markers",
//! "construct a default instance", and "assign into a field" — are fed from
//! a manually populated registry built before the engine starts. Each
//! registration captures the type-erased glue (constructors, field setters,
//! unsizing casts) at the one place where the compiler still knows the
//! concrete types involved.
//!
//! # Examples
//!
//! ```rust
//! use beanwire::TypeModel;
//! use std::sync::{Arc, RwLock};
//!
//! trait Transport: Send + Sync {}
//!
//! #[derive(Default)]
//! struct Smtp;
//! impl Transport for Smtp {}
//!
//! #[derive(Default)]
//! struct Mailer {
//!     transport: Option<Arc<RwLock<dyn Transport>>>,
//! }
//!
//! let mut model = TypeModel::new();
//! model.interface::<dyn Transport>();
//! model.concrete::<Smtp>().implements::<dyn Transport>(|smtp| smtp);
//! model
//!     .concrete::<Mailer>()
//!     .inject::<dyn Transport>("transport", |mailer, dep| mailer.transport = Some(dep));
//! ```

use crate::error::ConstructError;
use crate::key::{Inject, Marker, TypeKey};
use crate::storage::{FieldValue, Instance, Shared};
use ahash::{AHashSet, RandomState};
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Whether a registered type is a construction target or a resolution point
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TypeKind {
    /// A struct that can (in principle) be instantiated
    Concrete,
    /// A `dyn Trait` object type; implementations are resolved for it
    Interface,
}

/// Failure while assigning a resolved dependency into a field.
///
/// Contained by the injection engine: logged, the field stays unset.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignError {
    #[error("target instance is not of the field's owner type")]
    TargetType,
    #[error("value is not of the field's declared type")]
    ValueType,
    #[error("target instance lock is poisoned")]
    Poisoned,
}

pub(crate) type Constructor = Arc<dyn Fn() -> Result<Instance, ConstructError> + Send + Sync>;
pub(crate) type Setter =
    Arc<dyn Fn(&Shared, FieldValue) -> Result<(), AssignError> + Send + Sync>;
type ImplCast = Arc<dyn Fn(&Shared) -> Option<FieldValue> + Send + Sync>;
type UpCast = Arc<dyn Fn(&FieldValue) -> Option<FieldValue> + Send + Sync>;

/// Descriptor of one injectable field of a concrete type
pub(crate) struct FieldInfo {
    pub name: &'static str,
    pub declared: TypeKey,
    pub markers: Vec<Marker>,
    pub setter: Setter,
}

/// Conformance edge: a concrete type implements an interface
struct ImplementsEdge {
    interface: TypeKey,
    /// Produces the field value `Arc<RwLock<dyn I>>` from the erased instance
    cast: ImplCast,
}

/// Inheritance edge: an interface extends a parent interface
struct ExtendsEdge {
    parent: TypeKey,
    /// Upcasts a field value for the child interface to the parent interface
    up: UpCast,
}

struct ConcreteInfo {
    key: TypeKey,
    constructor: Option<Constructor>,
    fields: Vec<FieldInfo>,
    implements: Vec<ImplementsEdge>,
}

struct InterfaceInfo {
    key: TypeKey,
    extends: Vec<ExtendsEdge>,
}

/// Registry of every type the engine may construct or resolve.
///
/// Populated up front, then frozen into an `Arc` and handed to
/// [`InjectionFactory::new`](crate::InjectionFactory::new). The model is
/// read-only from then on; all mutable engine state lives in the engine's
/// own caches.
pub struct TypeModel {
    concretes: HashMap<TypeId, ConcreteInfo, RandomState>,
    interfaces: HashMap<TypeId, InterfaceInfo, RandomState>,
}

impl TypeModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self {
            concretes: HashMap::default(),
            interfaces: HashMap::default(),
        }
    }

    /// Register an interface (trait object) type.
    ///
    /// The trait must carry `Send + Sync` as supertraits so its trait
    /// objects can live inside shared instances.
    pub fn interface<I: ?Sized + 'static>(&mut self) -> InterfaceBuilder<'_, I> {
        self.interfaces
            .entry(TypeId::of::<I>())
            .or_insert_with(|| InterfaceInfo {
                key: TypeKey::of::<I>(),
                extends: Vec::new(),
            });
        InterfaceBuilder {
            model: self,
            _interface: PhantomData,
        }
    }

    /// Register a concrete type constructed through its `Default` impl.
    pub fn concrete<T: Default + Send + Sync + 'static>(&mut self) -> ConcreteBuilder<'_, T> {
        self.register_concrete::<T>(Some(Arc::new(|| Ok(Instance::new(T::default())))))
    }

    /// Register a concrete type with a fallible constructor.
    ///
    /// A constructor error is a recoverable condition at build time: the
    /// engine logs it and leaves the requesting field unset.
    pub fn concrete_with<T, F>(&mut self, constructor: F) -> ConcreteBuilder<'_, T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, ConstructError> + Send + Sync + 'static,
    {
        self.register_concrete::<T>(Some(Arc::new(move || constructor().map(Instance::new))))
    }

    /// Register a concrete type that cannot be instantiated.
    ///
    /// Models the "no accessible default constructor" case: the type can
    /// appear in field declarations and bindings, but any attempt to build
    /// it yields nothing.
    pub fn unconstructible<T: Send + Sync + 'static>(&mut self) -> ConcreteBuilder<'_, T> {
        self.register_concrete::<T>(None)
    }

    fn register_concrete<T: Send + Sync + 'static>(
        &mut self,
        constructor: Option<Constructor>,
    ) -> ConcreteBuilder<'_, T> {
        let info = self
            .concretes
            .entry(TypeId::of::<T>())
            .or_insert_with(|| ConcreteInfo {
                key: TypeKey::of::<T>(),
                constructor: None,
                fields: Vec::new(),
                implements: Vec::new(),
            });
        if constructor.is_some() {
            info.constructor = constructor;
        }
        ConcreteBuilder {
            model: self,
            _owner: PhantomData,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The kind of a registered type, or `None` if unknown to the model.
    pub fn kind(&self, id: TypeId) -> Option<TypeKind> {
        if self.concretes.contains_key(&id) {
            Some(TypeKind::Concrete)
        } else if self.interfaces.contains_key(&id) {
            Some(TypeKind::Interface)
        } else {
            None
        }
    }

    /// Whether a concrete type is assignable to an interface, directly or
    /// through any chain of interface inheritance.
    pub fn is_assignable(&self, concrete: TypeId, interface: TypeId) -> bool {
        let Some(info) = self.concretes.get(&concrete) else {
            return false;
        };
        info.implements.iter().any(|edge| {
            if edge.interface.id() == interface {
                return true;
            }
            let mut seen = AHashSet::new();
            seen.insert(edge.interface.id());
            self.extends_transitively(edge.interface.id(), interface, &mut seen)
        })
    }

    fn extends_transitively(
        &self,
        from: TypeId,
        target: TypeId,
        seen: &mut AHashSet<TypeId>,
    ) -> bool {
        let Some(info) = self.interfaces.get(&from) else {
            return false;
        };
        info.extends.iter().any(|edge| {
            edge.parent.id() == target
                || (seen.insert(edge.parent.id())
                    && self.extends_transitively(edge.parent.id(), target, seen))
        })
    }

    /// Keys of all registered interfaces.
    pub fn interface_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.interfaces.values().map(|info| info.key)
    }

    /// Keys of all registered concrete types.
    pub fn concrete_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.concretes.values().map(|info| info.key)
    }

    /// Key of a registered type, by id.
    pub fn key_of(&self, id: TypeId) -> Option<TypeKey> {
        self.concretes
            .get(&id)
            .map(|info| info.key)
            .or_else(|| self.interfaces.get(&id).map(|info| info.key))
    }

    pub(crate) fn constructor_of(&self, id: TypeId) -> Option<&Constructor> {
        self.concretes.get(&id).and_then(|info| info.constructor.as_ref())
    }

    pub(crate) fn fields_of(&self, id: TypeId) -> &[FieldInfo] {
        self.concretes
            .get(&id)
            .map(|info| info.fields.as_slice())
            .unwrap_or(&[])
    }

    /// Produce a field value of the requested interface type from an erased
    /// instance of a concrete type, following conformance and inheritance
    /// edges. `None` when the concrete type is not assignable.
    pub(crate) fn cast_to_interface(
        &self,
        concrete: TypeId,
        interface: TypeId,
        shared: &Shared,
    ) -> Option<FieldValue> {
        let info = self.concretes.get(&concrete)?;
        for edge in &info.implements {
            let Some(value) = (edge.cast)(shared) else {
                continue;
            };
            if edge.interface.id() == interface {
                return Some(value);
            }
            let mut seen = AHashSet::new();
            seen.insert(edge.interface.id());
            if let Some(upcast) = self.upcast(edge.interface.id(), &value, interface, &mut seen) {
                return Some(upcast);
            }
        }
        None
    }

    fn upcast(
        &self,
        from: TypeId,
        value: &FieldValue,
        target: TypeId,
        seen: &mut AHashSet<TypeId>,
    ) -> Option<FieldValue> {
        let info = self.interfaces.get(&from)?;
        for edge in &info.extends {
            if !seen.insert(edge.parent.id()) {
                continue;
            }
            let Some(next) = (edge.up)(value) else {
                continue;
            };
            if edge.parent.id() == target {
                return Some(next);
            }
            if let Some(found) = self.upcast(edge.parent.id(), &next, target, seen) {
                return Some(found);
            }
        }
        None
    }
}

impl Default for TypeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeModel")
            .field("concretes", &self.concretes.len())
            .field("interfaces", &self.interfaces.len())
            .finish()
    }
}

/// Builder for an interface registration
pub struct InterfaceBuilder<'m, I: ?Sized> {
    model: &'m mut TypeModel,
    _interface: PhantomData<I>,
}

impl<'m, I: ?Sized + Send + Sync + 'static> InterfaceBuilder<'m, I> {
    /// Declare that this interface extends a parent interface.
    ///
    /// The closure is the trait upcast, written where the compiler can
    /// still coerce: `.extends::<dyn Parent>(|child| child)`.
    pub fn extends<P: ?Sized + Send + Sync + 'static>(
        self,
        up: fn(Arc<RwLock<I>>) -> Arc<RwLock<P>>,
    ) -> Self {
        let edge = ExtendsEdge {
            parent: TypeKey::of::<P>(),
            up: Arc::new(move |value: &FieldValue| {
                value
                    .downcast_ref::<Arc<RwLock<I>>>()
                    .map(|arc| Box::new(up(arc.clone())) as FieldValue)
            }),
        };
        self.model
            .interfaces
            .get_mut(&TypeId::of::<I>())
            .expect("interface registered by builder")
            .extends
            .push(edge);
        self
    }
}

/// Builder for a concrete type registration
pub struct ConcreteBuilder<'m, T> {
    model: &'m mut TypeModel,
    _owner: PhantomData<T>,
}

impl<'m, T: Send + Sync + 'static> ConcreteBuilder<'m, T> {
    fn entry(&mut self) -> &mut ConcreteInfo {
        self.model
            .concretes
            .get_mut(&TypeId::of::<T>())
            .expect("concrete type registered by builder")
    }

    /// Declare that this type implements an interface.
    ///
    /// The closure is the unsizing cast, written where the compiler can
    /// still coerce: `.implements::<dyn Service>(|me| me)`.
    pub fn implements<I: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: fn(Arc<RwLock<T>>) -> Arc<RwLock<I>>,
    ) -> Self {
        let edge = ImplementsEdge {
            interface: TypeKey::of::<I>(),
            cast: Arc::new(move |shared: &Shared| {
                shared
                    .clone()
                    .downcast::<RwLock<T>>()
                    .ok()
                    .map(|arc| Box::new(cast(arc)) as FieldValue)
            }),
        };
        self.entry().implements.push(edge);
        self
    }

    /// Declare an injectable field carrying the default [`Inject`] marker.
    ///
    /// `D` is the field's declared type: an interface (`dyn Trait`) to be
    /// resolved, or a concrete type to be built directly. The closure
    /// performs the actual assignment into the owner.
    pub fn inject<D: ?Sized + Send + Sync + 'static>(
        self,
        name: &'static str,
        assign: fn(&mut T, Arc<RwLock<D>>),
    ) -> Self {
        self.inject_as(name, vec![Marker::of::<Inject>()], assign)
    }

    /// Declare an injectable field with explicit marker kinds.
    ///
    /// The field is only populated by engines whose configured marker set
    /// intersects `markers`.
    pub fn inject_as<D: ?Sized + Send + Sync + 'static>(
        mut self,
        name: &'static str,
        markers: Vec<Marker>,
        assign: fn(&mut T, Arc<RwLock<D>>),
    ) -> Self {
        let setter: Setter = Arc::new(move |target: &Shared, value: FieldValue| {
            let target = target
                .clone()
                .downcast::<RwLock<T>>()
                .map_err(|_| AssignError::TargetType)?;
            let value = value
                .downcast::<Arc<RwLock<D>>>()
                .map_err(|_| AssignError::ValueType)?;
            let mut guard = target.write().map_err(|_| AssignError::Poisoned)?;
            assign(&mut *guard, *value);
            Ok(())
        });
        self.entry().fields.push(FieldInfo {
            name,
            declared: TypeKey::of::<D>(),
            markers,
            setter,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Engine: Send + Sync {
        fn cylinders(&self) -> u8;
    }

    trait TurboEngine: Engine {}

    #[derive(Default)]
    struct V8;
    impl Engine for V8 {
        fn cylinders(&self) -> u8 {
            8
        }
    }

    #[derive(Default)]
    struct TwinTurbo;
    impl Engine for TwinTurbo {
        fn cylinders(&self) -> u8 {
            6
        }
    }
    impl TurboEngine for TwinTurbo {}

    #[derive(Default)]
    struct Car {
        engine: Option<Arc<RwLock<dyn Engine>>>,
    }

    fn sample_model() -> TypeModel {
        let mut model = TypeModel::new();
        model.interface::<dyn Engine>();
        model.interface::<dyn TurboEngine>().extends::<dyn Engine>(|e| e);
        model.concrete::<V8>().implements::<dyn Engine>(|e| e);
        model
            .concrete::<TwinTurbo>()
            .implements::<dyn TurboEngine>(|e| e);
        model
            .concrete::<Car>()
            .inject::<dyn Engine>("engine", |car, dep| car.engine = Some(dep));
        model
    }

    #[test]
    fn kinds_are_tracked() {
        let model = sample_model();
        assert_eq!(model.kind(TypeId::of::<V8>()), Some(TypeKind::Concrete));
        assert_eq!(
            model.kind(TypeId::of::<dyn Engine>()),
            Some(TypeKind::Interface)
        );
        assert_eq!(model.kind(TypeId::of::<String>()), None);
    }

    #[test]
    fn direct_conformance_is_assignable() {
        let model = sample_model();
        assert!(model.is_assignable(TypeId::of::<V8>(), TypeId::of::<dyn Engine>()));
        assert!(!model.is_assignable(TypeId::of::<Car>(), TypeId::of::<dyn Engine>()));
    }

    #[test]
    fn inherited_conformance_is_assignable() {
        let model = sample_model();
        // TwinTurbo only declares TurboEngine; Engine is reached via extends.
        assert!(model.is_assignable(TypeId::of::<TwinTurbo>(), TypeId::of::<dyn Engine>()));
        assert!(!model.is_assignable(TypeId::of::<V8>(), TypeId::of::<dyn TurboEngine>()));
    }

    #[test]
    fn cast_produces_usable_trait_object() {
        let model = sample_model();
        let instance = Instance::new(V8);
        let value = model
            .cast_to_interface(
                TypeId::of::<V8>(),
                TypeId::of::<dyn Engine>(),
                instance.shared(),
            )
            .unwrap();
        let engine = value.downcast::<Arc<RwLock<dyn Engine>>>().unwrap();
        assert_eq!(engine.read().unwrap().cylinders(), 8);
    }

    #[test]
    fn cast_follows_extends_chain() {
        let model = sample_model();
        let instance = Instance::new(TwinTurbo);
        let value = model
            .cast_to_interface(
                TypeId::of::<TwinTurbo>(),
                TypeId::of::<dyn Engine>(),
                instance.shared(),
            )
            .unwrap();
        let engine = value.downcast::<Arc<RwLock<dyn Engine>>>().unwrap();
        assert_eq!(engine.read().unwrap().cylinders(), 6);
    }

    #[test]
    fn setter_assigns_into_owner() {
        let model = sample_model();
        let car = Instance::new(Car::default());
        let engine = Instance::new(V8);

        let field = &model.fields_of(TypeId::of::<Car>())[0];
        assert_eq!(field.name, "engine");
        assert_eq!(field.markers, vec![Marker::of::<Inject>()]);

        let value = model
            .cast_to_interface(
                TypeId::of::<V8>(),
                field.declared.id(),
                engine.shared(),
            )
            .unwrap();
        (field.setter)(car.shared(), value).unwrap();

        let car = car.downcast::<Car>().unwrap();
        let injected = car.read().unwrap().engine.clone().unwrap();
        assert_eq!(injected.read().unwrap().cylinders(), 8);
    }

    #[test]
    fn setter_rejects_wrong_value_type() {
        let model = sample_model();
        let car = Instance::new(Car::default());
        let field = &model.fields_of(TypeId::of::<Car>())[0];

        let bogus: FieldValue = Box::new(Instance::new(V8).downcast::<V8>().unwrap());
        assert_eq!(
            (field.setter)(car.shared(), bogus),
            Err(AssignError::ValueType)
        );
    }

    #[test]
    fn unconstructible_type_has_no_constructor() {
        let mut model = TypeModel::new();
        model.unconstructible::<V8>();
        assert!(model.constructor_of(TypeId::of::<V8>()).is_none());
        assert_eq!(model.kind(TypeId::of::<V8>()), Some(TypeKind::Concrete));
    }

    #[test]
    fn fallible_constructor_reports_failure() {
        let mut model = TypeModel::new();
        model.concrete_with::<V8, _>(|| Err("forge is cold".into()));
        let ctor = model.constructor_of(TypeId::of::<V8>()).unwrap();
        assert!(ctor().is_err());
    }
}

//! Type and marker identity
//!
//! The engine works on runtime type identities rather than generic
//! parameters so that resolution can recurse over types chosen at runtime
//! (discovered implementations, user bindings). A [`TypeKey`] pairs the
//! `TypeId` with the type name; the name is what scope derivation and
//! error messages work from.

use std::any::TypeId;
use std::fmt;

/// Runtime identity of a type known to the engine.
///
/// Works for both concrete types and interface (trait object) types:
/// `TypeKey::of::<MyService>()` and `TypeKey::of::<dyn MyTrait>()` are both
/// valid keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for a type, concrete or `dyn Trait`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name, e.g. `"my_crate::services::Mailer"` or
    /// `"dyn my_crate::services::Transport"`.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declaring module path of the type, used as the default
    /// resolution scope for interfaces.
    ///
    /// Derived from the type name: the `dyn ` prefix is stripped and
    /// anything from the first generic argument onward is ignored.
    /// Returns `""` for types without a module path.
    pub fn module(&self) -> &'static str {
        let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
        let base = match name.find('<') {
            Some(lt) => &name[..lt],
            None => name,
        };
        match base.rfind("::") {
            Some(sep) => &base[..sep],
            None => "",
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An injection marker kind.
///
/// A marker is identified by a plain unit struct; a field carrying a marker
/// whose kind is in the engine's configured marker set is populated during
/// injection, all other fields are left alone. The stock kind is
/// [`Inject`].
///
/// # Examples
///
/// ```rust
/// use beanwire::{Inject, Marker};
///
/// struct Autowired;
///
/// let default = Marker::of::<Inject>();
/// let custom = Marker::of::<Autowired>();
/// assert_ne!(default, custom);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Marker {
    id: TypeId,
    name: &'static str,
}

impl Marker {
    /// Marker for the unit struct `M`.
    #[inline]
    pub fn of<M: 'static>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The default injection marker kind.
///
/// Fields registered through
/// [`ConcreteBuilder::inject`](crate::ConcreteBuilder::inject) carry this
/// marker, and a factory built with [`InjectionFactory::new`](crate::InjectionFactory::new)
/// processes exactly this kind.
pub struct Inject;

//! Error types for the injection engine
//!
//! Only configuration misuse surfaces as an error: requesting an interface
//! as a construction target, malformed binding registrations, and ambiguous
//! discovery results. Per-field construction and assignment problems are
//! contained where they happen (logged, field left unset) and never abort a
//! graph build.

use crate::key::TypeKey;
use thiserror::Error;

/// Errors that can occur during graph construction or binding registration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// An interface type was requested as a construction target
    #[error("cannot build an instance of interface type `{type_name}`: request a concrete type")]
    InterfaceRequested { type_name: &'static str },

    /// A binding named a type that is not a registered interface
    #[error("`{type_name}` is not a registered interface type")]
    NotAnInterface { type_name: &'static str },

    /// A binding named a type that is not a registered concrete type
    #[error("`{type_name}` is not a registered concrete type")]
    NotAConcrete { type_name: &'static str },

    /// A binding paired an interface with a type that does not implement it
    #[error("`{implementation}` does not implement `{interface}`")]
    NotAnImplementation {
        interface: &'static str,
        implementation: &'static str,
    },

    /// Discovery found more than one implementation and no override
    #[error(
        "found {} implementations of `{interface}` ({candidates:?}); \
         pick one with set_implementing_class() or set_implementation()",
        candidates.len()
    )]
    AmbiguousImplementation {
        interface: &'static str,
        candidates: Vec<&'static str>,
    },
}

impl InjectError {
    /// Create an InterfaceRequested error for a key
    #[inline]
    pub(crate) fn interface_requested(key: TypeKey) -> Self {
        Self::InterfaceRequested {
            type_name: key.name(),
        }
    }

    /// Create a NotAnInterface error for a key
    #[inline]
    pub(crate) fn not_an_interface(key: TypeKey) -> Self {
        Self::NotAnInterface {
            type_name: key.name(),
        }
    }

    /// Create a NotAConcrete error for a key
    #[inline]
    pub(crate) fn not_a_concrete(key: TypeKey) -> Self {
        Self::NotAConcrete {
            type_name: key.name(),
        }
    }

    /// Create a NotAnImplementation error for an interface/implementation pair
    #[inline]
    pub(crate) fn not_an_implementation(interface: TypeKey, implementation: TypeKey) -> Self {
        Self::NotAnImplementation {
            interface: interface.name(),
            implementation: implementation.name(),
        }
    }

    /// Create an AmbiguousImplementation error from discovery candidates
    pub(crate) fn ambiguous(interface: TypeKey, candidates: &[TypeKey]) -> Self {
        Self::AmbiguousImplementation {
            interface: interface.name(),
            candidates: candidates.iter().map(TypeKey::name).collect(),
        }
    }
}

/// Failure reported by a registered constructor.
///
/// Contained inside [`obtain`](crate::InjectionFactory::obtain): the engine
/// logs it and treats the type as unavailable for this request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConstructError(pub String);

impl From<&str> for ConstructError {
    fn from(msg: &str) -> Self {
        Self(msg.to_owned())
    }
}

impl From<String> for ConstructError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, InjectError>;

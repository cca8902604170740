//! Error types for binding callables and managing subscriptions.

use crate::method::MethodId;

/// Errors raised synchronously by construction and subscription calls.
///
/// Delivering to a dead target is not an error; it yields the return
/// type's default value instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The method reference cannot be weakly bound.
    #[error("invalid binding: {0}")]
    InvalidBinding(BindingFault),

    /// Subscribe or unsubscribe was called without a callable.
    #[error("subscriber is absent")]
    NullSubscriber,
}

/// Why a method reference was rejected by `WeakCallable::bind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BindingFault {
    /// No bound method reference was supplied.
    #[error("bound method reference is absent")]
    NullReference,

    /// The method has no receiver, so there is no instance to bind weakly.
    #[error("`{0}` is an associated function, not an instance method")]
    StaticMethod(MethodId),

    /// The method takes a receiver but no instance was bound.
    #[error("bound instance is absent")]
    MissingTarget,
}

impl From<BindingFault> for Error {
    fn from(fault: BindingFault) -> Self {
        Error::InvalidBinding(fault)
    }
}

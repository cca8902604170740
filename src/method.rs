//! Method descriptors and the invocation thunks built from them.
//!
//! A `Method<T, A, R>` pairs a stable `MethodId` with a thunk of shape
//! `(&T, A) -> R`, where `A` is a tuple packing the positional arguments.
//! The thunk is built once and shared by every callable cloned from it.
//! When `T` is a trait object the thunk dispatches through the vtable of
//! the target's concrete type.

use crate::error::{BindingFault, Error};
use core::any::TypeId;
use core::fmt;
use std::rc::Rc;

/// Identity of a method: the receiver type plus the method name.
///
/// Stable regardless of whether any instance of the owner is alive.
#[derive(Copy, Clone, Eq)]
pub struct MethodId {
    owner: TypeId,
    owner_name: &'static str,
    name: &'static str,
}

impl MethodId {
    /// Describe method `name` on receiver type `T`.
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            owner: TypeId::of::<T>(),
            owner_name: core::any::type_name::<T>(),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn owner_name(&self) -> &'static str {
        self.owner_name
    }
}

// `owner_name` is derived from `owner`; comparing it would be redundant.
impl PartialEq for MethodId {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name
    }
}

impl core::hash::Hash for MethodId {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodId({self})")
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner_name, self.name)
    }
}

/// Calls a method on an explicit target with tuple-packed arguments.
///
/// Implemented for every `Fn(&T, A1, ..., An) -> R` with `n <= 5`, so a
/// method path such as `Counter::add` is an `Invoker<Counter, (i32,)>`.
pub trait Invoker<T: ?Sized, A>: 'static {
    type Output;

    fn invoke(&self, target: &T, args: A) -> Self::Output;
}

macro_rules! impl_invoker {
    ($($arg:ident),*) => {
        impl<T, F, R, $($arg,)*> Invoker<T, ($($arg,)*)> for F
        where
            T: ?Sized,
            F: Fn(&T, $($arg),*) -> R + 'static,
        {
            type Output = R;

            #[inline]
            #[allow(non_snake_case)]
            fn invoke(&self, target: &T, ($($arg,)*): ($($arg,)*)) -> R {
                self(target, $($arg),*)
            }
        }
    };
}

impl_invoker!();
impl_invoker!(A1);
impl_invoker!(A1, A2);
impl_invoker!(A1, A2, A3);
impl_invoker!(A1, A2, A3, A4);
impl_invoker!(A1, A2, A3, A4, A5);

pub(crate) enum Thunk<T: ?Sized, A, R> {
    Instance(Rc<dyn Fn(&T, A) -> R>),
    Associated(Rc<dyn Fn(A) -> R>),
}

impl<T: ?Sized, A, R> Clone for Thunk<T, A, R> {
    fn clone(&self) -> Self {
        match self {
            Thunk::Instance(f) => Thunk::Instance(f.clone()),
            Thunk::Associated(f) => Thunk::Associated(f.clone()),
        }
    }
}

/// A method descriptor together with its reusable invocation thunk.
pub struct Method<T: ?Sized, A, R> {
    id: MethodId,
    pub(crate) thunk: Thunk<T, A, R>,
}

impl<T, A, R> Method<T, A, R>
where
    T: ?Sized + 'static,
    A: 'static,
    R: 'static,
{
    /// Wrap a method that takes `&T` as its receiver.
    pub fn instance<F>(id: MethodId, f: F) -> Self
    where
        F: Invoker<T, A, Output = R>,
    {
        let thunk: Rc<dyn Fn(&T, A) -> R> = Rc::new(move |target: &T, args: A| f.invoke(target, args));
        Self {
            id,
            thunk: Thunk::Instance(thunk),
        }
    }

    /// Wrap an associated function (no receiver). Such a method can be
    /// called through a `BoundMethod` but never bound weakly.
    pub fn associated<F>(id: MethodId, f: F) -> Self
    where
        F: Fn(A) -> R + 'static,
    {
        Self {
            id,
            thunk: Thunk::Associated(Rc::new(f)),
        }
    }

    pub fn id(&self) -> MethodId {
        self.id
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.thunk, Thunk::Instance(_))
    }
}

impl<T: ?Sized, A, R> Clone for Method<T, A, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            thunk: self.thunk.clone(),
        }
    }
}

impl<T: ?Sized, A, R> fmt::Debug for Method<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.thunk {
            Thunk::Instance(_) => "instance",
            Thunk::Associated(_) => "associated",
        };
        f.debug_struct("Method")
            .field("id", &self.id)
            .field("kind", &kind)
            .finish()
    }
}

/// A method bound to a strongly-held instance; the owning counterpart of
/// `WeakCallable`.
///
/// The target is optional so that associated functions and unbound
/// instance methods can be represented and rejected at weak-bind time.
pub struct BoundMethod<T: ?Sized, A, R> {
    pub(crate) target: Option<Rc<T>>,
    pub(crate) method: Method<T, A, R>,
}

impl<T, A, R> BoundMethod<T, A, R>
where
    T: ?Sized + 'static,
    A: 'static,
    R: 'static,
{
    pub fn new(target: Rc<T>, method: Method<T, A, R>) -> Self {
        Self {
            target: Some(target),
            method,
        }
    }

    /// A method reference with no instance attached.
    pub fn unbound(method: Method<T, A, R>) -> Self {
        Self {
            target: None,
            method,
        }
    }

    pub fn target(&self) -> Option<&Rc<T>> {
        self.target.as_ref()
    }

    pub fn method(&self) -> &Method<T, A, R> {
        &self.method
    }

    /// Call the method. Associated functions ignore the target; instance
    /// methods require one.
    pub fn invoke(&self, args: A) -> Result<R, Error> {
        match (&self.method.thunk, &self.target) {
            (Thunk::Associated(f), _) => Ok(f(args)),
            (Thunk::Instance(f), Some(target)) => Ok(f(target, args)),
            (Thunk::Instance(_), None) => Err(BindingFault::MissingTarget.into()),
        }
    }
}

impl<T: ?Sized, A, R> Clone for BoundMethod<T, A, R> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            method: self.method.clone(),
        }
    }
}

/// Build an instance `Method` from a method path, naming it after the path.
///
/// ```
/// use weak_event::method;
///
/// struct Counter;
/// impl Counter {
///     fn add(&self, a: i32, b: i32) -> i32 {
///         a + b
///     }
/// }
///
/// let m = method!(Counter, add);
/// assert_eq!(m.id().name(), "add");
/// ```
#[macro_export]
macro_rules! method {
    ($owner:ty, $name:ident) => {
        $crate::Method::<$owner, _, _>::instance(
            $crate::MethodId::of::<$owner>(stringify!($name)),
            <$owner>::$name,
        )
    };
}

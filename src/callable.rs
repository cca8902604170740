//! WeakCallable: a method bound to an instance it does not keep alive.

use crate::error::{BindingFault, Error};
use crate::method::{BoundMethod, Method, MethodId, Thunk};
use core::fmt;
use std::rc::{Rc, Weak};

/// Type-erased weak target plus the thunk that calls into it.
trait Binding<A, R> {
    fn is_alive(&self) -> bool;

    /// Address of the target while it is alive. Never upgrades, so it has
    /// no effect on reference counts.
    fn target_addr(&self) -> Option<*const ()>;

    fn call(&self, args: A) -> Option<R>;

    fn upgrade(&self) -> Option<Rc<dyn Fn(A) -> R>>;
}

struct WeakBinding<T: ?Sized, A, R> {
    target: Weak<T>,
    thunk: Rc<dyn Fn(&T, A) -> R>,
}

impl<T, A, R> Binding<A, R> for WeakBinding<T, A, R>
where
    T: ?Sized + 'static,
    A: 'static,
    R: 'static,
{
    #[inline]
    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    #[inline]
    fn target_addr(&self) -> Option<*const ()> {
        self.is_alive().then(|| self.target.as_ptr().cast::<()>())
    }

    #[inline]
    fn call(&self, args: A) -> Option<R> {
        // Held for the duration of the call so the target cannot vanish mid-method.
        let target = self.target.upgrade()?;
        Some((self.thunk)(&*target, args))
    }

    fn upgrade(&self) -> Option<Rc<dyn Fn(A) -> R>> {
        let target = self.target.upgrade()?;
        let thunk = self.thunk.clone();
        Some(Rc::new(move |args: A| thunk(&*target, args)))
    }
}

/// Calls a method on an instance held only through a `Weak` handle.
///
/// The thunk is built once at bind time and shared by clones. Invoking a
/// callable whose target is gone performs no call and yields `R::default()`.
pub struct WeakCallable<A, R = ()> {
    method: MethodId,
    binding: Rc<dyn Binding<A, R>>,
}

impl<A: 'static, R: 'static> WeakCallable<A, R> {
    /// Bind `method` to `target` without taking ownership of it.
    ///
    /// Fails if `method` is an associated function.
    pub fn new<T>(target: &Rc<T>, method: Method<T, A, R>) -> Result<Self, Error>
    where
        T: ?Sized + 'static,
    {
        let id = method.id();
        match method.thunk {
            Thunk::Instance(thunk) => Ok(Self {
                method: id,
                binding: Rc::new(WeakBinding {
                    target: Rc::downgrade(target),
                    thunk,
                }),
            }),
            Thunk::Associated(_) => {
                tracing::debug!(method = %id, "rejected weak binding of associated function");
                Err(BindingFault::StaticMethod(id).into())
            }
        }
    }

    /// Weakly rebind a strongly bound method reference.
    ///
    /// Rejects, in order: an absent reference, an associated function, and
    /// an instance method with no instance attached.
    pub fn bind<'b, T>(bound: impl Into<Option<&'b BoundMethod<T, A, R>>>) -> Result<Self, Error>
    where
        T: ?Sized + 'static,
    {
        let bound = bound.into().ok_or(BindingFault::NullReference)?;
        let id = bound.method.id();
        match (&bound.target, bound.method.is_instance()) {
            (Some(target), _) => Self::new(target, bound.method.clone()),
            (None, false) => {
                tracing::debug!(method = %id, "rejected weak binding of associated function");
                Err(BindingFault::StaticMethod(id).into())
            }
            (None, true) => {
                tracing::debug!(method = %id, "rejected weak binding without instance");
                Err(BindingFault::MissingTarget.into())
            }
        }
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Whether the target is still reachable. May turn false at any moment
    /// once the last strong owner is dropped; never turns true again.
    pub fn is_alive(&self) -> bool {
        self.binding.is_alive()
    }

    /// Call the method if the target is alive.
    pub fn try_invoke(&self, args: A) -> Option<R> {
        self.binding.call(args)
    }

    /// Call the method, or return `R::default()` if the target is gone.
    pub fn invoke(&self, args: A) -> R
    where
        R: Default,
    {
        self.try_invoke(args).unwrap_or_default()
    }

    /// An owning callable that keeps the target alive, if it still is.
    pub fn upgrade(&self) -> Option<StrongCallable<A, R>> {
        self.binding.upgrade().map(|call| StrongCallable {
            method: self.method,
            call,
        })
    }
}

impl<A, R> Clone for WeakCallable<A, R> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            binding: self.binding.clone(),
        }
    }
}

/// Same method and same target identity, resolved at comparison time.
///
/// Two callables whose targets have both been reclaimed resolve to no
/// identity and compare equal when their methods match. The result for a
/// given pair can change once either target is reclaimed.
impl<A, R> PartialEq for WeakCallable<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method && self.binding.target_addr() == other.binding.target_addr()
    }
}

impl<A, R> fmt::Debug for WeakCallable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCallable")
            .field("method", &self.method)
            .field("alive", &self.binding.is_alive())
            .finish()
    }
}

/// Owning callable obtained from `WeakCallable::upgrade`.
pub struct StrongCallable<A, R = ()> {
    method: MethodId,
    call: Rc<dyn Fn(A) -> R>,
}

impl<A, R> StrongCallable<A, R> {
    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn invoke(&self, args: A) -> R {
        (self.call)(args)
    }

    /// The underlying closure, for APIs that take owning callbacks.
    pub fn into_fn(self) -> Rc<dyn Fn(A) -> R> {
        self.call
    }
}

impl<A, R> Clone for StrongCallable<A, R> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            call: self.call.clone(),
        }
    }
}

impl<A, R> fmt::Debug for StrongCallable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrongCallable")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

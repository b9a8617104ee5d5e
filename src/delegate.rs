use {
    crate::{
        signature::{private::Token, BoundFn, Closure, FreeFn, MethodMut, Signature},
        storage::{Fit, Storage},
    },
    core::{
        any::type_name,
        fmt::{self, Debug, Formatter},
        hash::{Hash, Hasher},
        marker::PhantomData,
        ptr::NonNull,
    },
    static_assertions::assert_eq_size,
};

/// Unmanaged, non-owning wrapper for a function, a bound method, a curried function or a small closure,
/// invoked through the signature `S` (`fn(A0, .., An) -> R`).
///
/// A delegate is two pointers wide: one pointer worth of inline [`Storage`] for the payload
/// and the thunk which knows how to reinterpret it. It never allocates and never drops its payload,
/// so every payload must be `Copy`:
///
/// - [`bind`] - a function item or capture-less closure; no payload;
/// - [`bind_with`] - a function item taking a leading value no larger than a pointer;
/// - [`bind_method`] / [`bind_method_mut`] - a method taking `&self` / `&mut self`, with an instance;
/// - [`bind_closure`] - a `Copy` closure strictly smaller than a pointer.
///
/// Payloads which break the size or alignment budget fail the build when the binder is instantiated.
///
/// `'a` bounds every borrowed payload: the delegate may not outlive a bound `&'a T` instance or a closure's borrows.
///
/// Delegates are `Copy`. Copying one duplicates the payload bytes, including any closure state.
///
/// Calling takes `&mut self`: closures run in place and may mutate their state in the delegate's storage,
/// so a call needs exclusive access. Callers which only hold a shared reference call a copy instead.
///
/// [`Storage`]: struct.Storage.html
/// [`bind`]: #method.bind
/// [`bind_with`]: #method.bind_with
/// [`bind_method`]: #method.bind_method
/// [`bind_method_mut`]: #method.bind_method_mut
/// [`bind_closure`]: #method.bind_closure
#[repr(C)]
pub struct Delegate<'a, S: Signature> {
    storage: Storage,          // offs 0b          size 4b / 8b
    thunk: Option<S::Thunk>,   // offs 4b / 8b     size 4b / 8b, `None` is null
    _marker: PhantomData<(&'a (), S)>,
}

assert_eq_size!(Delegate<'static, fn()>, [usize; 2]);
assert_eq_size!(Delegate<'static, fn(u64, &'static str) -> bool>, [usize; 2]);

impl<'a, S: Signature> Delegate<'a, S> {
    /// Creates an unbound delegate.
    pub const fn new() -> Self {
        Delegate {
            storage: Storage::null(),
            thunk: None,
            _marker: PhantomData,
        }
    }

    /// Creates a delegate bound to the free function `function`.
    ///
    /// See [`bind`].
    ///
    /// [`bind`]: #method.bind
    pub fn from_fn<F: FreeFn<S>>(function: F) -> Self {
        let mut result = Self::new();
        result.bind(function);
        result
    }

    /// Creates a delegate bound to `function` curried with `value`.
    ///
    /// See [`bind_with`].
    ///
    /// [`bind_with`]: #method.bind_with
    pub fn from_bound<P, F>(function: F, value: P) -> Self
    where
        P: Copy + 'a,
        F: BoundFn<S, P>,
    {
        let mut result = Self::new();
        result.bind_with(function, value);
        result
    }

    /// Creates a delegate bound to the `&self` method `method` of `instance`.
    ///
    /// See [`bind_method`].
    ///
    /// [`bind_method`]: #method.bind_method
    pub fn from_method<T, F>(method: F, instance: &'a T) -> Self
    where
        F: BoundFn<S, &'a T>,
    {
        let mut result = Self::new();
        result.bind_method(method, instance);
        result
    }

    /// Creates a delegate bound to the `&mut self` method `method` of `instance`.
    ///
    /// See [`bind_method_mut`].
    ///
    /// # Safety
    ///
    /// Same as [`bind_method_mut`].
    ///
    /// [`bind_method_mut`]: #method.bind_method_mut
    pub unsafe fn from_method_mut<T: 'a, F>(method: F, instance: NonNull<T>) -> Self
    where
        F: MethodMut<S, T>,
    {
        let mut result = Self::new();
        unsafe { result.bind_method_mut(method, instance) };
        result
    }

    /// Creates a delegate bound to the closure `closure`.
    ///
    /// See [`bind_closure`].
    ///
    /// [`bind_closure`]: #method.bind_closure
    pub fn from_closure<F: Closure<S> + 'a>(closure: F) -> Self {
        let mut result = Self::new();
        result.bind_closure(closure);
        result
    }

    /// Binds the delegate to the free function `function`.
    ///
    /// `function` must be zero-sized: a function item (`foo`, `Type::method`) or a closure without captures.
    /// Function pointers (`fn(..)` values) are rejected at build time.
    ///
    /// Storage is reset to null; calls go straight to `function`.
    pub fn bind<F: FreeFn<S>>(&mut self, function: F) {
        let () = Fit::<F>::ZERO_SIZED;
        let _ = function;

        self.storage = Storage::null();
        self.thunk = Some(F::thunk(Token));

        trace!("delegate bound to function `{}`", type_name::<F>());
    }

    /// Binds the delegate to `function`, curried with `value`.
    ///
    /// Calls pass a copy of `value` as the first argument, followed by the delegate's arguments.
    ///
    /// `value` must be no larger and no more aligned than a pointer, which is checked at build time.
    /// `function` must be zero-sized, as in [`bind`].
    ///
    /// ```
    /// use minidelegate::Delegate;
    ///
    /// fn scale(factor: i32, x: i32) -> i32 {
    ///     factor * x
    /// }
    ///
    /// let mut triple: Delegate<'_, fn(i32) -> i32> = Delegate::new();
    /// triple.bind_with(scale, 3);
    ///
    /// assert_eq!(triple.call(7), 21);
    /// ```
    ///
    /// [`bind`]: #method.bind
    pub fn bind_with<P, F>(&mut self, function: F, value: P)
    where
        P: Copy + 'a,
        F: BoundFn<S, P>,
    {
        let () = Fit::<F>::ZERO_SIZED;
        let () = Fit::<P>::PAYLOAD;
        let _ = function;

        unsafe {
            self.storage.write(value);
        }
        self.thunk = Some(F::thunk(Token));

        trace!(
            "delegate bound to function `{}` with a `{}` value",
            type_name::<F>(),
            type_name::<P>()
        );
    }

    /// Binds the delegate to the `&self` method `method` of `instance`.
    ///
    /// The delegate does not own `instance`; it borrows it for `'a`.
    /// [`instance`] returns its address afterwards.
    ///
    /// ```
    /// use minidelegate::Delegate;
    ///
    /// struct Greeter {
    ///     excitement: usize,
    /// }
    ///
    /// impl Greeter {
    ///     fn volume(&self, base: usize) -> usize {
    ///         base + self.excitement
    ///     }
    /// }
    ///
    /// let greeter = Greeter { excitement: 2 };
    ///
    /// let mut delegate: Delegate<'_, fn(usize) -> usize> = Delegate::new();
    /// delegate.bind_method(Greeter::volume, &greeter);
    ///
    /// assert_eq!(delegate.call(1), 3);
    /// assert_eq!(unsafe { delegate.instance() }, &greeter as *const Greeter as *const ());
    /// ```
    ///
    /// [`instance`]: #method.instance
    pub fn bind_method<T, F>(&mut self, method: F, instance: &'a T)
    where
        F: BoundFn<S, &'a T>,
    {
        self.bind_with(method, instance);
    }

    /// Binds the delegate to the `&mut self` method `method` of the instance pointed to by `instance`.
    ///
    /// [`instance`] returns `instance` afterwards.
    ///
    /// # Safety
    ///
    /// The caller guarantees that `instance` stays valid for as long as the delegate, or any copy of it, may be called,
    /// and that no other reference to the instance is alive during a call.
    ///
    /// [`instance`]: #method.instance
    pub unsafe fn bind_method_mut<T: 'a, F>(&mut self, method: F, instance: NonNull<T>)
    where
        F: MethodMut<S, T>,
    {
        let () = Fit::<F>::ZERO_SIZED;
        let _ = method;

        unsafe {
            self.storage.write(instance);
        }
        self.thunk = Some(F::thunk(Token));

        trace!(
            "delegate bound to method `{}` of `{}` at {:p}",
            type_name::<F>(),
            type_name::<T>(),
            instance
        );
    }

    /// Binds the delegate to a copy of `closure`.
    ///
    /// `closure` must be strictly smaller than a pointer and no more aligned than one, which is checked at build time.
    /// In practice it may capture nothing, or a few small `Copy` values; it may not capture references.
    ///
    /// The copy lives in the delegate's storage: state it mutates persists across calls to this delegate
    /// and is independent of `closure` itself.
    ///
    /// ```
    /// use minidelegate::Delegate;
    ///
    /// let step = 5u8;
    ///
    /// let mut delegate: Delegate<'_, fn(u8) -> u8> = Delegate::new();
    /// delegate.bind_closure(move |x: u8| x + step);
    ///
    /// assert_eq!(delegate.call(1), 6);
    /// ```
    pub fn bind_closure<F: Closure<S> + 'a>(&mut self, closure: F) {
        let () = Fit::<F>::CLOSURE;

        unsafe {
            self.storage.write(closure);
        }
        self.thunk = Some(F::thunk(Token));

        trace!("delegate bound to closure `{}`", type_name::<F>());
    }

    /// Unbinds the delegate. It may not be called until bound again.
    pub fn reset(&mut self) {
        self.storage = Storage::null();
        self.thunk = None;

        trace!("delegate reset");
    }

    /// Returns `true` if the delegate is bound to a target and may be called.
    pub fn is_bound(&self) -> bool {
        // Storage need not be checked.
        self.thunk.is_some()
    }

    /// Returns the address of the instance bound via [`bind_method`] \ [`bind_method_mut`].
    ///
    /// Null if the delegate is unbound or bound via [`bind`].
    ///
    /// # Safety
    ///
    /// The caller guarantees that the delegate is unbound, or was last bound via [`bind`], [`bind_method`]
    /// or [`bind_method_mut`] (or the matching `from_*` constructor).
    ///
    /// After [`bind_with`] or [`bind_closure`] the storage holds the payload's bytes, which may be fewer than
    /// a pointer's or include padding; reading them as an address is undefined behavior.
    ///
    /// [`bind`]: #method.bind
    /// [`bind_with`]: #method.bind_with
    /// [`bind_method`]: #method.bind_method
    /// [`bind_method_mut`]: #method.bind_method_mut
    /// [`bind_closure`]: #method.bind_closure
    pub unsafe fn instance(&self) -> *const () {
        unsafe { self.storage.address() }
    }

    fn thunk_address(&self) -> Option<usize> {
        self.thunk.map(S::thunk_address)
    }
}

macro_rules! call {
    ($($A:ident $a:ident),*) => {
        impl<'a, R, $($A),*> Delegate<'a, fn($($A),*) -> R> {
            /// Calls the bound target with the given arguments and returns its result.
            ///
            /// # Panics
            ///
            /// Panics if the delegate is unbound.
            #[inline]
            pub fn call(&mut self, $($a: $A),*) -> R {
                match self.thunk {
                    Some(thunk) => unsafe { thunk(&mut self.storage, $($a),*) },
                    None => panic!("tried to call an unbound delegate"),
                }
            }

            /// Calls the bound target with the given arguments and returns its result.
            ///
            /// # Safety
            ///
            /// The caller guarantees that the delegate is bound.
            /// Only checked in debug builds.
            #[inline]
            pub unsafe fn call_unchecked(&mut self, $($a: $A),*) -> R {
                debug_assert!(self.is_bound(), "tried to call an unbound delegate");

                let thunk = unsafe { self.thunk.unwrap_unchecked() };
                unsafe { thunk(&mut self.storage, $($a),*) }
            }
        }
    };
}

call!();
call!(A0 a0);
call!(A0 a0, A1 a1);
call!(A0 a0, A1 a1, A2 a2);
call!(A0 a0, A1 a1, A2 a2, A3 a3);
call!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
call!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
call!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
call!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);

impl<'a, S: Signature> Default for Delegate<'a, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S: Signature> Clone for Delegate<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S: Signature> Copy for Delegate<'a, S> {}

/// Delegates are equal if bound to the same target via the same binder, or both unbound.
///
/// Bound instances, curried values and closure state are not compared. Use [`instance`] for instances.
///
/// Targets are identified by the address of their monomorphized thunk. Function addresses are neither
/// guaranteed unique nor stable: the compiler may merge identical thunks of distinct targets, so they
/// compare equal, or duplicate one across codegen units, so two bindings of the same target compare unequal.
///
/// [`instance`]: struct.Delegate.html#method.instance
impl<'a, 'b, S: Signature> PartialEq<Delegate<'b, S>> for Delegate<'a, S> {
    fn eq(&self, other: &Delegate<'b, S>) -> bool {
        self.thunk_address() == other.thunk_address()
    }
}

impl<'a, S: Signature> Eq for Delegate<'a, S> {}

impl<'a, S: Signature> Hash for Delegate<'a, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.thunk_address().hash(state);
    }
}

impl<'a, S: Signature> Debug for Delegate<'a, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("bound", &self.is_bound())
            .field("thunk", &self.thunk_address().map(|address| address as *const ()))
            .finish()
    }
}

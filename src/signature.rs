//! Call signatures and the binding strategies which produce a thunk for them.
//!
//! A signature is spelled as a function pointer type, `fn(A0, .., An) -> R`, for arities `0..=8`.
//! Every binding strategy is a trait implemented for all callables of the matching shape;
//! its only job is to hand out the monomorphized thunk which knows how to read the payload
//! the strategy wrote into the [`Storage`] and perform the call.
//!
//! Argument types must be concrete: higher-ranked pointer types such as `fn(&str)` do not
//! implement [`Signature`]; name the lifetime instead (`fn(&'s str)`).
//!
//! [`Storage`]: ../struct.Storage.html
//! [`Signature`]: trait.Signature.html

use {crate::storage::Storage, core::ptr::NonNull};

pub(crate) mod private {
    pub trait Sealed {}

    /// Keeps the binder traits implementable only by the blanket impls below.
    #[derive(Clone, Copy)]
    pub struct Token;
}

use private::Token;

/// A delegate call signature, implemented for `fn(A0, .., An) -> R`.
pub trait Signature: private::Sealed {
    /// Type-erased invocation entry point:
    /// `unsafe fn(&mut Storage, A0, .., An) -> R`.
    ///
    /// Only sound to call with the storage written by the binder which produced it.
    type Thunk: Copy;

    #[doc(hidden)]
    fn thunk_address(thunk: Self::Thunk) -> usize;
}

/// Stateless targets: function items and capture-less closures, invoked with the delegate's arguments.
pub trait FreeFn<S: Signature>: Copy + 'static {
    #[doc(hidden)]
    fn thunk(_: Token) -> S::Thunk;
}

/// Stateless targets taking a leading `P` before the delegate's arguments.
///
/// Covers curried free functions (`P` is a small value)
/// and methods taking `&self` (`P` is `&T`).
pub trait BoundFn<S: Signature, P: Copy>: Copy + 'static {
    #[doc(hidden)]
    fn thunk(_: Token) -> S::Thunk;
}

/// Stateless targets taking a leading `&mut T` before the delegate's arguments,
/// i.e. methods taking `&mut self`.
pub trait MethodMut<S: Signature, T>: Copy + 'static {
    #[doc(hidden)]
    fn thunk(_: Token) -> S::Thunk;
}

/// Closures invoked in place, with the delegate's arguments.
pub trait Closure<S: Signature>: Copy {
    #[doc(hidden)]
    fn thunk(_: Token) -> S::Thunk;
}

macro_rules! signature {
    ($($A:ident $a:ident),*) => {
        impl<R, $($A),*> private::Sealed for fn($($A),*) -> R {}

        impl<R, $($A),*> Signature for fn($($A),*) -> R {
            type Thunk = unsafe fn(&mut Storage, $($A),*) -> R;

            fn thunk_address(thunk: Self::Thunk) -> usize {
                thunk as usize
            }
        }

        impl<F, R, $($A),*> FreeFn<fn($($A),*) -> R> for F
        where
            F: Fn($($A),*) -> R + Copy + 'static,
        {
            fn thunk(_: Token) -> unsafe fn(&mut Storage, $($A),*) -> R {
                unsafe fn invoke<F, R, $($A),*>(_: &mut Storage, $($a: $A),*) -> R
                where
                    F: Fn($($A),*) -> R + Copy,
                {
                    let function = unsafe { Storage::conjure::<F>() };
                    function($($a),*)
                }

                invoke::<F, R, $($A),*>
            }
        }

        impl<F, P, R, $($A),*> BoundFn<fn($($A),*) -> R, P> for F
        where
            F: Fn(P, $($A),*) -> R + Copy + 'static,
            P: Copy,
        {
            fn thunk(_: Token) -> unsafe fn(&mut Storage, $($A),*) -> R {
                unsafe fn invoke<F, P, R, $($A),*>(storage: &mut Storage, $($a: $A),*) -> R
                where
                    F: Fn(P, $($A),*) -> R + Copy,
                    P: Copy,
                {
                    let function = unsafe { Storage::conjure::<F>() };
                    let value = unsafe { storage.read::<P>() };
                    function(value, $($a),*)
                }

                invoke::<F, P, R, $($A),*>
            }
        }

        impl<F, T, R, $($A),*> MethodMut<fn($($A),*) -> R, T> for F
        where
            F: Fn(&mut T, $($A),*) -> R + Copy + 'static,
        {
            fn thunk(_: Token) -> unsafe fn(&mut Storage, $($A),*) -> R {
                unsafe fn invoke<F, T, R, $($A),*>(storage: &mut Storage, $($a: $A),*) -> R
                where
                    F: Fn(&mut T, $($A),*) -> R + Copy,
                {
                    let function = unsafe { Storage::conjure::<F>() };
                    let instance = unsafe { storage.read::<NonNull<T>>() };
                    function(unsafe { &mut *instance.as_ptr() }, $($a),*)
                }

                invoke::<F, T, R, $($A),*>
            }
        }

        impl<F, R, $($A),*> Closure<fn($($A),*) -> R> for F
        where
            F: FnMut($($A),*) -> R + Copy,
        {
            fn thunk(_: Token) -> unsafe fn(&mut Storage, $($A),*) -> R {
                unsafe fn invoke<F, R, $($A),*>(storage: &mut Storage, $($a: $A),*) -> R
                where
                    F: FnMut($($A),*) -> R + Copy,
                {
                    let closure = unsafe { storage.get_mut::<F>() };
                    closure($($a),*)
                }

                invoke::<F, R, $($A),*>
            }
        }
    };
}

signature!();
signature!(A0 a0);
signature!(A0 a0, A1 a1);
signature!(A0 a0, A1 a1, A2 a2);
signature!(A0 a0, A1 a1, A2 a2, A3 a3);
signature!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
signature!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
signature!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
signature!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);

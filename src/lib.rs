//! Unmanaged, non-owning, allocation-free delegates.
//!
//! A [`Delegate`] binds one callable target and invokes it through a uniform signature,
//! spelled as a function pointer type:
//!
//! ```
//! use minidelegate::Delegate;
//!
//! fn add(a: i32, b: i32) -> i32 {
//!     a + b
//! }
//!
//! let mut delegate: Delegate<'_, fn(i32, i32) -> i32> = Delegate::from_fn(add);
//! assert_eq!(delegate.call(2, 3), 5);
//!
//! delegate.bind_closure(|a: i32, b: i32| a * b);
//! assert_eq!(delegate.call(2, 3), 6);
//!
//! delegate.reset();
//! assert!(!delegate.is_bound());
//! ```
//!
//! Targets and payloads are stored inline, in one pointer worth of storage,
//! and must be `Copy`. Anything else is rejected when the binder is compiled:
//!
//! ```compile_fail
//! use minidelegate::Delegate;
//!
//! fn greet(name: String, punctuation: char) -> String {
//!     format!("Hello, {}{}", name, punctuation)
//! }
//!
//! // `String` has a destructor.
//! let mut delegate: Delegate<'_, fn(char) -> String> = Delegate::new();
//! delegate.bind_with(greet, String::from("world"));
//! ```
//!
//! ```compile_fail
//! use minidelegate::Delegate;
//!
//! let name = String::from("world");
//!
//! // The closure owns a `String`, so it is not `Copy`.
//! let mut delegate: Delegate<'_, fn() -> usize> = Delegate::new();
//! delegate.bind_closure(move || name.len());
//! ```
//!
//! ```compile_fail
//! use minidelegate::Delegate;
//!
//! fn length(s: &'static str) -> usize {
//!     s.len()
//! }
//!
//! // Not callable with the delegate's arguments.
//! let mut delegate: Delegate<'_, fn(i32) -> usize> = Delegate::new();
//! delegate.bind(length);
//! ```
//!
//! ```compile_fail
//! use minidelegate::Delegate;
//!
//! struct Counter(u32);
//!
//! impl Counter {
//!     fn get(&self) -> u32 {
//!         self.0
//!     }
//! }
//!
//! // The delegate may not outlive the bound instance.
//! let mut delegate: Delegate<'_, fn() -> u32> = Delegate::new();
//! {
//!     let counter = Counter(7);
//!     delegate.bind_method(Counter::get, &counter);
//! }
//! delegate.call();
//! ```
//!
//! Oversized or overaligned payloads (see [`fits`] / [`fits_closure`]) and non-zero-sized targets
//! fail the build when the offending binder is instantiated:
//!
//! ```compile_fail
//! use minidelegate::Delegate;
//!
//! fn first(pair: [usize; 2], x: usize) -> usize {
//!     pair[0] + x
//! }
//!
//! // Two pointers worth of payload.
//! let mut delegate: Delegate<'_, fn(usize) -> usize> = Delegate::new();
//! delegate.bind_with(first, [0usize; 2]);
//! delegate.call(1);
//! ```
//!
//! ```compile_fail
//! use minidelegate::Delegate;
//!
//! let x = 7usize;
//!
//! // Closures must be strictly smaller than a pointer.
//! let mut delegate: Delegate<'_, fn() -> usize> = Delegate::new();
//! delegate.bind_closure(move || x);
//! delegate.call();
//! ```
//!
//! ```compile_fail
//! use minidelegate::Delegate;
//!
//! fn negate(x: i32) -> i32 {
//!     -x
//! }
//!
//! // A function pointer value is not a function item.
//! let g: fn(i32) -> i32 = negate;
//!
//! let mut delegate: Delegate<'_, fn(i32) -> i32> = Delegate::new();
//! delegate.bind(g);
//! delegate.call(1);
//! ```
//!
//! Logging of bind / reset operations is available through the `log` facade with the `trace` feature.
//!
//! [`Delegate`]: struct.Delegate.html
//! [`fits`]: fn.fits.html
//! [`fits_closure`]: fn.fits_closure.html

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(feature = "trace")]
macro_rules! trace {
    ($($arg:tt)*) => {
        log::trace!($($arg)*)
    };
}

#[cfg(not(feature = "trace"))]
macro_rules! trace {
    ($($arg:tt)*) => {{
        if false {
            let _ = format_args!($($arg)*);
        }
    }};
}

mod delegate;
mod signature;
mod storage;

pub use {
    delegate::Delegate,
    signature::{BoundFn, Closure, FreeFn, MethodMut, Signature},
    storage::{fits, fits_closure, Storage, STORAGE_ALIGN, STORAGE_SIZE},
};

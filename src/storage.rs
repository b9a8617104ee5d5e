use {
    core::{
        marker::PhantomData,
        mem::{align_of, size_of, MaybeUninit},
        ptr::{self, NonNull},
    },
    static_assertions::{assert_eq_align, const_assert_eq},
};

/// Size of the [`Storage`] buffer, i.e. of one native pointer.
///
/// x86: 4b
/// x64: 8b
///
/// [`Storage`]: struct.Storage.html
pub const STORAGE_SIZE: usize = size_of::<*const ()>();

/// Alignment of the [`Storage`] buffer, i.e. of one native pointer.
///
/// [`Storage`]: struct.Storage.html
pub const STORAGE_ALIGN: usize = align_of::<*const ()>();

/// Inline payload buffer of a [`Delegate`].
///
/// Holds the bytes written by the last binder: nothing meaningful for free functions,
/// the bound value / instance pointer for bound targets, the closure itself for closures.
/// Only the thunk stored next to it knows which type the bytes belong to.
///
/// Opaque outside of this crate; it only shows up in the thunk type of a [`Signature`].
///
/// [`Delegate`]: struct.Delegate.html
/// [`Signature`]: trait.Signature.html
#[repr(transparent)]
#[derive(Clone, Copy)] // Payloads are `Copy`, so are the raw bytes.
pub struct Storage(MaybeUninit<*const ()>);

const_assert_eq!(size_of::<Storage>(), STORAGE_SIZE);
assert_eq_align!(Storage, *const ());

impl Storage {
    /// Storage holding a null pointer, the state of an unbound delegate.
    pub(crate) const fn null() -> Self {
        Storage(MaybeUninit::new(ptr::null()))
    }

    /// Resets the buffer to null, then copies `payload` over its leading bytes.
    ///
    /// # Safety
    ///
    /// `P` must satisfy [`fits`].
    ///
    /// [`fits`]: fn.fits.html
    pub(crate) unsafe fn write<P: Copy>(&mut self, payload: P) {
        debug_assert!(fits::<P>());

        *self = Self::null();

        unsafe { ptr::write(self.0.as_mut_ptr().cast::<P>(), payload) };
    }

    /// Copies the payload back out of the buffer.
    ///
    /// # Safety
    ///
    /// The last call to [`write`] must have stored a `P`.
    ///
    /// [`write`]: #method.write
    pub(crate) unsafe fn read<P: Copy>(&self) -> P {
        unsafe { ptr::read(self.0.as_ptr().cast::<P>()) }
    }

    /// Mutable view of the payload, in place.
    ///
    /// # Safety
    ///
    /// The last call to [`write`] must have stored an `F`.
    ///
    /// [`write`]: #method.write
    pub(crate) unsafe fn get_mut<F>(&mut self) -> &mut F {
        unsafe { &mut *self.0.as_mut_ptr().cast::<F>() }
    }

    /// Produces a value of a zero-sized type out of thin air.
    ///
    /// # Safety
    ///
    /// `F` must be zero-sized and `Copy`: function items and capture-less closures.
    pub(crate) unsafe fn conjure<F: Copy>() -> F {
        debug_assert_eq!(size_of::<F>(), 0);

        unsafe { NonNull::<F>::dangling().as_ptr().read() }
    }

    /// The buffer reinterpreted as an address.
    ///
    /// # Safety
    ///
    /// Every byte of the buffer must be initialized: it is null or was last written with a pointer.
    /// Padding of a smaller or padded payload is uninitialized.
    pub(crate) unsafe fn address(&self) -> *const () {
        unsafe { ptr::read(self.0.as_ptr()) }
    }
}

/// Whether a value of type `P` can be bound as a delegate payload:
/// no larger and no more aligned than a pointer.
pub const fn fits<P>() -> bool {
    size_of::<P>() <= STORAGE_SIZE && align_of::<P>() <= STORAGE_ALIGN
}

/// Whether a closure of type `F` can be bound to a delegate.
///
/// Same as [`fits`], except the closure must be strictly smaller than a pointer.
///
/// [`fits`]: fn.fits.html
pub const fn fits_closure<F>() -> bool {
    size_of::<F>() < STORAGE_SIZE && align_of::<F>() <= STORAGE_ALIGN
}

/// Layout checks evaluated when a binder is instantiated for `P`.
///
/// Referencing one of the constants with a type that violates it fails the build.
pub(crate) struct Fit<P>(PhantomData<P>);

impl<P> Fit<P> {
    pub(crate) const PAYLOAD: () = assert!(
        fits::<P>(),
        "delegate payload must not be larger or more aligned than a pointer"
    );

    pub(crate) const CLOSURE: () = assert!(
        fits_closure::<P>(),
        "delegate closure must be smaller than a pointer and no more aligned than one"
    );

    pub(crate) const ZERO_SIZED: () = assert!(
        size_of::<P>() == 0,
        "delegate target must be a function item or a capture-less closure"
    );
}

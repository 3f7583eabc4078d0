//! Non-owning, read-only views over contiguous memory.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;
use std::ptr::NonNull;

use stratum_mem::Allocator;

use crate::capability::{ByteView, Capabilities, Capability};
use crate::reflect::{FieldDescriptor, Kind, Members, Name, Reflect, TypeRef};
use crate::vec::Vec;

/// A `(pointer, length)` view borrowed from a [`Vec`], an array, a single
/// value or raw parts. Never allocates or frees.
///
/// The borrow keeps the source alive and stops it from reallocating while
/// the view exists. Values with interior mutability can still change in
/// place, and the view observes it:
///
/// ```
/// use std::cell::Cell;
/// use stratum::{Slice, Vec};
///
/// let v: Vec<Cell<i32>> = Vec::from_array([Cell::new(1), Cell::new(2)]);
/// let view = Slice::from_vec(&v);
/// v[1].set(20);
/// assert_eq!(view[1].get(), 20);
/// ```
pub struct Slice<'a, T> {
    data: *const T,
    length: usize,
    _borrow: PhantomData<&'a [T]>,
}

unsafe impl<T: Sync> Send for Slice<'_, T> {}
unsafe impl<T: Sync> Sync for Slice<'_, T> {}

impl<T> Clone for Slice<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slice<'_, T> {}

impl<'a, T> Slice<'a, T> {
    #[must_use]
    pub const fn empty() -> Self {
        Slice {
            data: NonNull::dangling().as_ptr(),
            length: 0,
            _borrow: PhantomData,
        }
    }

    #[must_use]
    pub fn from_vec<A: Allocator>(vec: &'a Vec<T, A>) -> Self {
        Self::from_std(vec)
    }

    #[must_use]
    pub const fn from_array<const N: usize>(array: &'a [T; N]) -> Self {
        Slice {
            data: array.as_ptr(),
            length: N,
            _borrow: PhantomData,
        }
    }

    /// A view of length 1.
    #[must_use]
    pub const fn from_ref(value: &'a T) -> Self {
        Slice {
            data: std::ptr::from_ref(value),
            length: 1,
            _borrow: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `data` must be non-null, aligned, and point to `length` initialized
    /// values that stay valid and unmodified (except through interior
    /// mutability) for `'a`.
    #[must_use]
    pub const unsafe fn from_raw_parts(data: *const T, length: usize) -> Self {
        Slice {
            data,
            length,
            _borrow: PhantomData,
        }
    }

    const fn from_std(slice: &'a [T]) -> Self {
        Slice {
            data: slice.as_ptr(),
            length: slice.len(),
            _borrow: PhantomData,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub const fn data(&self) -> *const T {
        self.data
    }

    /// Size of the viewed elements in bytes.
    #[must_use]
    pub const fn bytes(&self) -> usize {
        self.length * size_of::<T>()
    }

    #[must_use]
    pub const fn as_std(&self) -> &'a [T] {
        // SAFETY: the constructors guarantee `length` valid values at `data`
        // for `'a`.
        unsafe { std::slice::from_raw_parts(self.data, self.length) }
    }

    #[must_use]
    pub const fn get(&self, index: usize) -> Option<&'a T> {
        if index < self.length {
            // SAFETY: in bounds.
            Some(unsafe { &*self.data.add(index) })
        } else {
            None
        }
    }

    /// # Panics
    ///
    /// Panics if the view is empty.
    #[must_use]
    pub fn front(&self) -> &'a T {
        assert!(self.length > 0, "front on an empty Slice");
        &self.as_std()[0]
    }

    /// # Panics
    ///
    /// Panics if the view is empty.
    #[must_use]
    pub fn back(&self) -> &'a T {
        assert!(self.length > 0, "back on an empty Slice");
        &self.as_std()[self.length - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.as_std().iter()
    }

    /// The viewed memory as raw bytes.
    #[must_use]
    pub fn to_bytes(&self) -> &'a [u8]
    where
        T: ByteView,
    {
        // SAFETY: `ByteView` types have no padding and no interior
        // mutability, so every byte is initialized and stable for `'a`.
        unsafe { std::slice::from_raw_parts(self.data.cast::<u8>(), self.bytes()) }
    }
}

impl<T> Default for Slice<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> From<&'a [T]> for Slice<'a, T> {
    fn from(slice: &'a [T]) -> Self {
        Self::from_std(slice)
    }
}

impl<'a, T, A: Allocator> From<&'a Vec<T, A>> for Slice<'a, T> {
    fn from(vec: &'a Vec<T, A>) -> Self {
        Self::from_vec(vec)
    }
}

impl<T> Index<usize> for Slice<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(
            index < self.length,
            "index {index} out of bounds for Slice of length {}",
            self.length
        );
        &self.as_std()[index]
    }
}

impl<'a, T> IntoIterator for Slice<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_std().iter()
    }
}

impl<'a, T> IntoIterator for &Slice<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Slice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Slice<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_std() == other.as_std()
    }
}

impl<T: PartialEq> PartialEq<[T]> for Slice<'_, T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_std() == other
    }
}

impl<T: Reflect> Slice<'static, T> {
    const LAYOUT: &'static [FieldDescriptor] = &[
        FieldDescriptor {
            name: Name::new("data"),
            offset: std::mem::offset_of!(Slice<'static, T>, data),
            ty: TypeRef::of::<*const T>(),
        },
        FieldDescriptor {
            name: Name::new("length"),
            offset: std::mem::offset_of!(Slice<'static, T>, length),
            ty: TypeRef::of::<usize>(),
        },
    ];
}

unsafe impl<T: Reflect> Reflect for Slice<'static, T> {
    const NAME: Name = Name::new("Slice");
    const KIND: Kind = Kind::Record;

    fn members() -> Members {
        Members::Layout(Self::LAYOUT)
    }

    fn capabilities() -> Capabilities {
        let inherited = Capabilities::NONE.with(Capability::Equatable);
        Capabilities::NONE
            .with(Capability::DefaultConstructible)
            .with(Capability::Copyable)
            .with(Capability::Cloneable)
            .with(Capability::Trivial)
            .union(T::capabilities().intersection(inherited))
    }
}

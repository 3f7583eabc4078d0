//! Growable contiguous container parameterized by an allocator strategy.
//!
//! [`Vec<T, A>`] owns a buffer obtained from the [`Allocator`] strategy `A`.
//! Slots `[0, len)` hold live values, `[len, capacity)` are uninitialized.
//! The buffer pointer is null exactly when the capacity is zero.
//!
//! Misuse is fail-fast: indexing out of bounds or popping an empty vector
//! panics, and a strategy returning null aborts through
//! [`handle_alloc_error`].
//!
//! # Example
//!
//! ```
//! use stratum::{Vec, vec_of};
//!
//! let mut v: Vec<String> = Vec::new();
//! v.push("a".to_string());
//! v.push("b".to_string());
//! assert_eq!(v.capacity(), 8);
//!
//! let copy = v.clone();
//! v[0].push('!');
//! assert_eq!(copy[0], "a");
//!
//! let numbers = vec_of![1, 2, 3];
//! assert_eq!(numbers.iter().sum::<i32>(), 6);
//! ```

use std::alloc::{Layout, handle_alloc_error};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice::SliceIndex;

use stratum_log::debug;
use stratum_mem::{Allocator, System};

use crate::capability::{Capabilities, Capability, is_zero_sized};
use crate::reflect::{FieldDescriptor, Kind, Members, Name, Reflect, TypeRef};
use crate::slice::Slice;

/// Capacity after the first growth of an empty vector.
pub const INITIAL_CAPACITY: usize = 8;

/// A growable array whose storage comes from the strategy `A`.
///
/// Vectors of zero-sized types follow the same capacity growth but never
/// allocate; their buffer is a dangling, well-aligned pointer.
pub struct Vec<T, A: Allocator = System> {
    data: *mut T,
    length: usize,
    capacity: usize,
    _owns: PhantomData<T>,
    _strategy: PhantomData<fn() -> A>,
}

unsafe impl<T: Send, A: Allocator> Send for Vec<T, A> {}
unsafe impl<T: Sync, A: Allocator> Sync for Vec<T, A> {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

impl<T, A: Allocator> Vec<T, A> {
    /// An empty vector. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Vec {
            data: ptr::null_mut(),
            length: 0,
            capacity: 0,
            _owns: PhantomData,
            _strategy: PhantomData,
        }
    }

    /// An empty vector with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut vec = Self::new();
        vec.reserve(capacity);
        vec
    }

    /// A vector holding the elements of `array`, in order, with capacity `N`.
    #[must_use]
    pub fn from_array<const N: usize>(array: [T; N]) -> Self {
        let mut vec = Self::with_capacity(N);
        for value in array {
            vec.push(value);
        }
        vec
    }

    /// Allocates room for `capacity` elements through `A`.
    fn allocate(capacity: usize) -> *mut T {
        let layout = Layout::array::<T>(capacity).unwrap_or_else(|_| capacity_overflow());
        let ptr = A::alloc(layout);
        if ptr.is_null() {
            handle_alloc_error(layout);
        }
        ptr.cast()
    }

    /// Releases the buffer. Elements must already be dropped or moved out.
    fn release(&mut self) {
        if self.capacity != 0 && !is_zero_sized::<T>() {
            // SAFETY: a non-zero capacity of a sized `T` means `data` came
            // from `A::alloc`.
            unsafe { A::free(self.data.cast()) };
        }
        self.data = ptr::null_mut();
        self.capacity = 0;
    }

    /// Grows the buffer to hold at least `capacity` elements. Existing
    /// elements are moved bitwise into the new buffer.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity <= self.capacity {
            return;
        }
        if is_zero_sized::<T>() {
            self.data = NonNull::dangling().as_ptr();
            self.capacity = capacity;
            return;
        }

        let data = Self::allocate(capacity);
        if !self.data.is_null() {
            // SAFETY: both buffers hold at least `length` slots and do not
            // overlap. The old slots are treated as uninitialized afterwards.
            unsafe { ptr::copy_nonoverlapping(self.data, data, self.length) };
        }
        debug!(
            "Vec<{}> reallocated: capacity {} -> {}",
            type_name::<T>(),
            self.capacity,
            capacity
        );
        let length = self.length;
        self.release();
        self.data = data;
        self.capacity = capacity;
        self.length = length;
    }

    fn grow(&mut self) {
        let capacity = if self.capacity == 0 {
            INITIAL_CAPACITY
        } else {
            self.capacity.checked_mul(2).unwrap_or_else(|| capacity_overflow())
        };
        self.reserve(capacity);
    }

    /// Appends `value` and returns a reference to it.
    pub fn push(&mut self, value: T) -> &mut T {
        if self.length == self.capacity {
            self.grow();
        }
        // SAFETY: `length < capacity` after growing.
        unsafe {
            let slot = self.data.add(self.length);
            slot.write(value);
            self.length += 1;
            &mut *slot
        }
    }

    /// Appends a value converted from `args`.
    pub fn emplace<Args>(&mut self, args: Args) -> &mut T
    where
        T: From<Args>,
    {
        self.push(T::from(args))
    }

    /// Appends the value returned by `make`.
    pub fn emplace_with<F: FnOnce() -> T>(&mut self, make: F) -> &mut T {
        self.push(make())
    }

    /// Removes and returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    pub fn pop(&mut self) -> T {
        assert!(self.length > 0, "pop on an empty Vec");
        self.length -= 1;
        // SAFETY: the slot was live and is now outside `[0, length)`.
        unsafe { self.data.add(self.length).read() }
    }

    /// Drops the elements past `length`. No-op if `length >= len()`.
    pub fn truncate(&mut self, length: usize) {
        if length >= self.length {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(
            // SAFETY: `length < self.length`, so the offset is in bounds.
            unsafe { self.data.add(length) },
            self.length - length,
        );
        self.length = length;
        // SAFETY: the tail slots were live and are no longer reachable.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drops every element. The capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[must_use]
    pub fn front(&self) -> &T {
        assert!(self.length > 0, "front on an empty Vec");
        &self[0]
    }

    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[must_use]
    pub fn back(&self) -> &T {
        assert!(self.length > 0, "back on an empty Vec");
        &self[self.length - 1]
    }

    /// # Panics
    ///
    /// Panics if the vector is empty.
    pub fn front_mut(&mut self) -> &mut T {
        assert!(self.length > 0, "front on an empty Vec");
        &mut self[0]
    }

    /// # Panics
    ///
    /// Panics if the vector is empty.
    pub fn back_mut(&mut self) -> &mut T {
        assert!(self.length > 0, "back on an empty Vec");
        let last = self.length - 1;
        &mut self[last]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// True when the next push reallocates.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.length == self.capacity
    }

    /// Size of the live elements in bytes.
    #[must_use]
    pub const fn bytes(&self) -> usize {
        self.length * size_of::<T>()
    }

    /// The buffer pointer. Null when the capacity is zero.
    #[must_use]
    pub const fn data(&self) -> *const T {
        self.data
    }

    /// The buffer pointer. Null when the capacity is zero.
    pub fn data_mut(&mut self) -> *mut T {
        self.data
    }

    #[must_use]
    pub fn as_slice(&self) -> Slice<'_, T> {
        Slice::from_vec(self)
    }

    fn base(&self) -> *mut T {
        if self.data.is_null() {
            NonNull::dangling().as_ptr()
        } else {
            self.data
        }
    }

    /// Copies the elements into a vector with a different strategy.
    #[must_use]
    pub fn clone_in<B: Allocator>(&self) -> Vec<T, B>
    where
        T: Clone,
    {
        let mut copy = Vec::with_capacity(self.length);
        for value in self.iter() {
            copy.push(value.clone());
        }
        copy
    }

    /// Duplicates the buffer with one bulk copy.
    #[must_use]
    pub fn clone_bitwise(&self) -> Self
    where
        T: Copy,
    {
        let mut copy = Self::with_capacity(self.length);
        if self.length != 0 {
            // SAFETY: `copy` has room for `length` elements and the buffers
            // are distinct. `T: Copy`, so the bytes are valid values.
            unsafe { ptr::copy_nonoverlapping(self.data, copy.data, self.length) };
        }
        copy.length = self.length;
        copy
    }
}

impl<T: Default, A: Allocator> Vec<T, A> {
    /// A vector of `length` default values.
    #[must_use]
    pub fn make(length: usize) -> Self {
        let mut vec = Self::with_capacity(length);
        vec.resize(length);
        vec
    }

    /// Sets the length to `length`, default-constructing new slots or
    /// dropping trailing ones.
    pub fn resize(&mut self, length: usize) {
        if length <= self.length {
            self.truncate(length);
            return;
        }
        self.reserve(length);
        while self.length < length {
            self.push(T::default());
        }
    }

    /// Appends `count` default values.
    pub fn extend(&mut self, count: usize) {
        let length = self.length.checked_add(count).unwrap_or_else(|| capacity_overflow());
        self.resize(length);
    }
}

impl<T, A: Allocator> Drop for Vec<T, A> {
    fn drop(&mut self) {
        self.clear();
        self.release();
    }
}

impl<T, A: Allocator> Default for Vec<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: Allocator> Clone for Vec<T, A> {
    fn clone(&self) -> Self {
        self.clone_in::<A>()
    }
}

impl<T, A: Allocator> Deref for Vec<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `[0, length)` is live; `base` is non-null and aligned.
        unsafe { std::slice::from_raw_parts(self.base(), self.length) }
    }
}

impl<T, A: Allocator> DerefMut for Vec<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as for `deref`, with exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.base(), self.length) }
    }
}

impl<T, A: Allocator, I: SliceIndex<[T]>> Index<I> for Vec<T, A> {
    type Output = I::Output;

    fn index(&self, index: I) -> &I::Output {
        &(**self)[index]
    }
}

impl<T, A: Allocator, I: SliceIndex<[T]>> IndexMut<I> for Vec<T, A> {
    fn index_mut(&mut self, index: I) -> &mut I::Output {
        &mut (**self)[index]
    }
}

impl<T, A: Allocator, const N: usize> From<[T; N]> for Vec<T, A> {
    fn from(array: [T; N]) -> Self {
        Self::from_array(array)
    }
}

impl<T, A: Allocator> FromIterator<T> for Vec<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut vec = Self::with_capacity(iter.size_hint().0);
        for value in iter {
            vec.push(value);
        }
        vec
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Vec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: Allocator, B: Allocator> PartialEq<Vec<T, B>> for Vec<T, A> {
    fn eq(&self, other: &Vec<T, B>) -> bool {
        **self == **other
    }
}

impl<T: Eq, A: Allocator> Eq for Vec<T, A> {}

impl<T: PartialEq, A: Allocator> PartialEq<[T]> for Vec<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        **self == *other
    }
}

impl<T: PartialEq, A: Allocator, const N: usize> PartialEq<[T; N]> for Vec<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        **self == other[..]
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Vec<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Vec<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: Allocator> IntoIterator for Vec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter {
            vec: ManuallyDrop::new(self),
            next: 0,
        }
    }
}

/// Owning iterator returned by `Vec::into_iter`.
pub struct IntoIter<T, A: Allocator = System> {
    vec: ManuallyDrop<Vec<T, A>>,
    /// Index of the next element to yield. Slots before it are moved out.
    next: usize,
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next == self.vec.length {
            return None;
        }
        // SAFETY: `next < length`, and each slot is read at most once.
        let value = unsafe { self.vec.data.add(self.next).read() };
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vec.length - self.next;
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining = self.vec.length - self.next;
        if remaining != 0 {
            // SAFETY: `[next, length)` still holds live values.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.vec.data.add(self.next),
                    remaining,
                ));
            }
        }
        self.vec.length = 0;
        self.vec.release();
    }
}

impl<T: Reflect, A: Allocator> Vec<T, A> {
    const LAYOUT: &'static [FieldDescriptor] = &[
        FieldDescriptor {
            name: Name::new("data"),
            offset: std::mem::offset_of!(Vec<T, A>, data),
            ty: TypeRef::of::<*mut T>(),
        },
        FieldDescriptor {
            name: Name::new("length"),
            offset: std::mem::offset_of!(Vec<T, A>, length),
            ty: TypeRef::of::<usize>(),
        },
        FieldDescriptor {
            name: Name::new("capacity"),
            offset: std::mem::offset_of!(Vec<T, A>, capacity),
            ty: TypeRef::of::<usize>(),
        },
    ];
}

unsafe impl<T: Reflect, A: Allocator> Reflect for Vec<T, A> {
    const NAME: Name = Name::new("Vec");
    const KIND: Kind = Kind::Record;

    fn members() -> Members {
        Members::Layout(Self::LAYOUT)
    }

    fn capabilities() -> Capabilities {
        let inherited = Capabilities::NONE
            .with(Capability::Cloneable)
            .with(Capability::Equatable);
        Capabilities::NONE
            .with(Capability::DefaultConstructible)
            .with(Capability::MustDestruct)
            .union(T::capabilities().intersection(inherited))
    }
}

/// Builds a [`Vec`] with the default strategy from a list of elements.
///
/// ```
/// let v = stratum::vec_of!["x", "y"];
/// assert_eq!(v.len(), 2);
/// assert_eq!(v.capacity(), 2);
/// ```
#[macro_export]
macro_rules! vec_of {
    () => {
        <$crate::Vec<_>>::new()
    };
    ($($value:expr),+ $(,)?) => {
        <$crate::Vec<_>>::from_array([$($value),+])
    };
}

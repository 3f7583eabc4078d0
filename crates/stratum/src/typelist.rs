//! Heterogeneous compile-time type lists.
//!
//! A list is a chain of [`Cons`] cells ending in [`Nil`], usually written
//! with [`type_list!`](crate::type_list). Two algorithms run over it:
//!
//! - [`All`]: whether every element satisfies a [`Predicate`], evaluated as
//!   an associated constant
//! - [`Iterate`]: calls a [`Visit`] implementation once per element, in
//!   declaration order
//!
//! Record fields and enum cases are stored as such lists; the visitors in
//! [`reflect::visit`](crate::reflect::visit) are built on [`Iterate`].
//!
//! ```
//! use stratum::type_list;
//! use stratum::typelist::{All, Predicate, TypeList};
//!
//! struct FitsInWord;
//! impl<T> Predicate<T> for FitsInWord {
//!     const VALUE: bool = size_of::<T>() <= size_of::<usize>();
//! }
//!
//! type Small = type_list![u8, u32, usize];
//! type Mixed = type_list![u8, [u64; 4]];
//!
//! const _: () = assert!(<Small as All<FitsInWord>>::VALUE);
//! assert!(!<Mixed as All<FitsInWord>>::VALUE);
//! assert_eq!(Small::LEN, 3);
//! ```

use std::any::TypeId;
use std::marker::PhantomData;

/// The empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nil;

/// A list with head `H` and tail `T`.
pub struct Cons<H, T>(PhantomData<(fn() -> H, T)>);

/// Implemented by every well-formed list.
pub trait TypeList: 'static {
    /// Number of elements.
    const LEN: usize;

    /// `TypeId`s of the elements, in order.
    fn type_ids() -> std::vec::Vec<TypeId> {
        let mut ids = std::vec::Vec::with_capacity(Self::LEN);
        Self::collect_ids(&mut ids);
        ids
    }

    #[doc(hidden)]
    fn collect_ids(ids: &mut std::vec::Vec<TypeId>);
}

impl TypeList for Nil {
    const LEN: usize = 0;

    fn collect_ids(_ids: &mut std::vec::Vec<TypeId>) {}
}

impl<H: 'static, T: TypeList> TypeList for Cons<H, T> {
    const LEN: usize = 1 + T::LEN;

    fn collect_ids(ids: &mut std::vec::Vec<TypeId>) {
        ids.push(TypeId::of::<H>());
        T::collect_ids(ids);
    }
}

/// A compile-time boolean property of `X`.
pub trait Predicate<X> {
    const VALUE: bool;
}

/// True when every element satisfies `P`. Vacuously true for [`Nil`];
/// evaluation stops at the first element that fails.
pub trait All<P>: TypeList {
    const VALUE: bool;
}

impl<P> All<P> for Nil {
    const VALUE: bool = true;
}

impl<P, H: 'static, T> All<P> for Cons<H, T>
where
    P: Predicate<H>,
    T: All<P>,
{
    const VALUE: bool = <P as Predicate<H>>::VALUE && <T as All<P>>::VALUE;
}

/// True when at least one element satisfies `P`. False for [`Nil`].
pub trait Any<P>: TypeList {
    const VALUE: bool;
}

impl<P> Any<P> for Nil {
    const VALUE: bool = false;
}

impl<P, H: 'static, T> Any<P> for Cons<H, T>
where
    P: Predicate<H>,
    T: Any<P>,
{
    const VALUE: bool = <P as Predicate<H>>::VALUE || <T as Any<P>>::VALUE;
}

/// An action run once for element type `X`.
pub trait Visit<X> {
    fn apply(&mut self);
}

/// Runs `V` over every element in order. There is no early exit.
pub trait Iterate<V>: TypeList {
    fn iterate(visitor: &mut V);
}

impl<V> Iterate<V> for Nil {
    #[inline]
    fn iterate(_visitor: &mut V) {}
}

impl<V, H: 'static, T> Iterate<V> for Cons<H, T>
where
    V: Visit<H>,
    T: Iterate<V>,
{
    #[inline]
    fn iterate(visitor: &mut V) {
        <V as Visit<H>>::apply(visitor);
        T::iterate(visitor);
    }
}

/// Builds a type list: `type_list![A, B, C]` is
/// `Cons<A, Cons<B, Cons<C, Nil>>>`.
#[macro_export]
macro_rules! type_list {
    () => { $crate::typelist::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::typelist::Cons<$head, $crate::type_list!($($tail),*)>
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::type_name;

    struct IsUnsigned;
    impl Predicate<u8> for IsUnsigned {
        const VALUE: bool = true;
    }
    impl Predicate<u32> for IsUnsigned {
        const VALUE: bool = true;
    }
    impl Predicate<i16> for IsUnsigned {
        const VALUE: bool = false;
    }

    struct Names(std::vec::Vec<&'static str>);
    impl<X> Visit<X> for Names {
        fn apply(&mut self) {
            self.0.push(type_name::<X>());
        }
    }

    #[test]
    fn test_len() {
        assert_eq!(<type_list![]>::LEN, 0);
        assert_eq!(<type_list![u8]>::LEN, 1);
        assert_eq!(<type_list![u8, i16, u32,]>::LEN, 3);
    }

    #[test]
    fn test_all() {
        assert!(<type_list![] as All<IsUnsigned>>::VALUE);
        assert!(<type_list![u8, u32] as All<IsUnsigned>>::VALUE);
        assert!(!<type_list![u8, i16, u32] as All<IsUnsigned>>::VALUE);
    }

    #[test]
    fn test_any() {
        assert!(!<type_list![] as Any<IsUnsigned>>::VALUE);
        assert!(<type_list![i16, u8] as Any<IsUnsigned>>::VALUE);
        assert!(!<type_list![i16] as Any<IsUnsigned>>::VALUE);
    }

    #[test]
    fn test_iterate_in_order() {
        let mut names = Names(std::vec::Vec::new());
        <type_list![u8, i16, u32]>::iterate(&mut names);
        assert_eq!(names.0, ["u8", "i16", "u32"]);

        let mut empty = Names(std::vec::Vec::new());
        Nil::iterate(&mut empty);
        assert!(empty.0.is_empty());
    }

    #[test]
    fn test_type_ids() {
        assert_eq!(
            <type_list![u8, String]>::type_ids(),
            [TypeId::of::<u8>(), TypeId::of::<String>()]
        );
    }
}

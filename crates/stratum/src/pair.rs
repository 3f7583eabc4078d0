//! A reflected two-field product type.

use crate::capability::{Capabilities, Capability, must_destruct};
use crate::reflect::{Field, FieldDef, FieldDescriptor, Kind, Members, Name, Record, Reflect, TypeRef};
use crate::typelist::{Cons, Nil};

/// Two values stored side by side as fields `first` and `second`.
///
/// `Pair` is a traversable record, so the visitors in
/// [`reflect::visit`](crate::reflect::visit) reach both fields in place.
///
/// ```
/// use stratum::Pair;
///
/// let pair = Pair::new(3, "three");
/// assert_eq!(*pair.get::<0>(), 3);
/// assert_eq!(*pair.get::<1>(), "three");
/// assert_eq!(pair.into_tuple(), (3, "three"));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Pair<A, B> {
    #[must_use]
    pub const fn new(first: A, second: B) -> Self {
        Pair { first, second }
    }

    #[must_use]
    pub fn into_tuple(self) -> (A, B) {
        (self.first, self.second)
    }

    /// The field at position `I`.
    #[must_use]
    pub fn get<const I: usize>(&self) -> &<Self as PairIndex<I>>::Output
    where
        Self: PairIndex<I>,
    {
        <Self as PairIndex<I>>::get(self)
    }

    pub fn get_mut<const I: usize>(&mut self) -> &mut <Self as PairIndex<I>>::Output
    where
        Self: PairIndex<I>,
    {
        <Self as PairIndex<I>>::get_mut(self)
    }
}

/// Positional access to the fields of a [`Pair`].
pub trait PairIndex<const I: usize> {
    type Output;

    fn get(&self) -> &Self::Output;
    fn get_mut(&mut self) -> &mut Self::Output;
}

impl<A, B> PairIndex<0> for Pair<A, B> {
    type Output = A;

    fn get(&self) -> &A {
        &self.first
    }

    fn get_mut(&mut self) -> &mut A {
        &mut self.first
    }
}

impl<A, B> PairIndex<1> for Pair<A, B> {
    type Output = B;

    fn get(&self) -> &B {
        &self.second
    }

    fn get_mut(&mut self) -> &mut B {
        &mut self.second
    }
}

impl<A, B> From<(A, B)> for Pair<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Pair { first, second }
    }
}

impl<A: Reflect, B: Reflect> Pair<A, B> {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor {
            name: Name::new("first"),
            offset: std::mem::offset_of!(Pair<A, B>, first),
            ty: TypeRef::of::<A>(),
        },
        FieldDescriptor {
            name: Name::new("second"),
            offset: std::mem::offset_of!(Pair<A, B>, second),
            ty: TypeRef::of::<B>(),
        },
    ];
}

unsafe impl<A: Reflect, B: Reflect> Reflect for Pair<A, B> {
    const NAME: Name = Name::new("Pair");
    const KIND: Kind = Kind::Record;

    fn members() -> Members {
        Members::Fields(Self::FIELDS)
    }

    fn capabilities() -> Capabilities {
        let shared = A::capabilities()
            .intersection(B::capabilities())
            .without(Capability::MustDestruct);
        if must_destruct::<Self>() {
            shared.with(Capability::MustDestruct)
        } else {
            shared
        }
    }
}

unsafe impl<A: Reflect, B: Reflect> FieldDef<0> for Pair<A, B> {
    type Type = A;
    const NAME: Name = Name::new("first");
    const OFFSET: usize = std::mem::offset_of!(Pair<A, B>, first);
}

unsafe impl<A: Reflect, B: Reflect> FieldDef<1> for Pair<A, B> {
    type Type = B;
    const NAME: Name = Name::new("second");
    const OFFSET: usize = std::mem::offset_of!(Pair<A, B>, second);
}

impl<A: Reflect, B: Reflect> Record for Pair<A, B> {
    type Fields = Cons<Field<Self, 0>, Cons<Field<Self, 1>, Nil>>;
}

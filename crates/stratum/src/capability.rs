//! Structural capability constraints.
//!
//! Capabilities exist at two levels:
//!
//! - **Type level**: traits such as [`Cloneable`] or [`Trivial`] used as
//!   generic bounds. Code that needs a capability the type lacks does not
//!   compile.
//! - **Value level**: a [`Capabilities`] set recorded in every
//!   [`TypeDescriptor`](crate::reflect::TypeDescriptor), so tooling can ask
//!   what a registered type supports without naming it.
//!
//! The value-level set of a concrete type is detected with [`capabilities!`],
//! which resolves each probe at compile time.
//!
//! [`capabilities!`]: crate::capabilities

use std::fmt;

/// Types with a default value (`T::default()`).
pub trait DefaultConstructible: Default {}
impl<T: Default> DefaultConstructible for T {}

/// Types duplicated by a plain bitwise copy.
pub trait Copyable: Copy {}
impl<T: Copy> Copyable for T {}

/// Types that can change owner. Every sized Rust type qualifies: a move is
/// a bitwise copy after which the source is never touched again.
pub trait Movable: Sized {}
impl<T> Movable for T {}

/// Types whose copy, move and destruction are all bitwise no-ops beyond the
/// memory itself.
pub trait Trivial: Copy + 'static {}
impl<T: Copy + 'static> Trivial for T {}

/// Types exposing a deep copy returning the same type.
pub trait Cloneable: Clone {}
impl<T: Clone> Cloneable for T {}

/// Types comparable with `==` and `!=`.
pub trait Equatable: PartialEq {}
impl<T: PartialEq> Equatable for T {}

/// Callables accepting the argument tuple `Args`.
///
/// ```
/// use stratum::capability::Invocable;
///
/// fn call_twice<F: Invocable<(i32, i32), Output = i32>>(mut f: F) -> i32 {
///     f.invoke((1, 2)) + f.invoke((3, 4))
/// }
///
/// assert_eq!(call_twice(|a: i32, b: i32| a * b), 14);
/// ```
pub trait Invocable<Args> {
    type Output;

    fn invoke(&mut self, args: Args) -> Self::Output;
}

macro_rules! invocable_arity {
    ($($arg:ident),*) => {
        impl<F, R, $($arg),*> Invocable<($($arg,)*)> for F
        where
            F: FnMut($($arg),*) -> R,
        {
            type Output = R;

            #[allow(non_snake_case)]
            fn invoke(&mut self, ($($arg,)*): ($($arg,)*)) -> R {
                self($($arg),*)
            }
        }
    };
}

invocable_arity!();
invocable_arity!(A);
invocable_arity!(A, B);
invocable_arity!(A, B, C);
invocable_arity!(A, B, C, D);

/// True when dropping a `T` runs code.
#[must_use]
pub const fn must_destruct<T>() -> bool {
    std::mem::needs_drop::<T>()
}

/// True when a `T` may be relocated with a byte copy. Always the case in Rust.
#[must_use]
pub const fn is_trivially_movable<T>() -> bool {
    true
}

#[must_use]
pub const fn is_zero_sized<T>() -> bool {
    size_of::<T>() == 0
}

/// Types whose every byte is initialized: no padding, no niches read as
/// garbage. Viewing such a value as `[u8]` is sound.
///
/// # Safety
///
/// Implementors must have no padding bytes and no interior mutability.
pub unsafe trait ByteView: Copy + 'static {}

macro_rules! byte_view {
    ($($ty:ty),* $(,)?) => {
        $(unsafe impl ByteView for $ty {})*
    };
}

byte_view!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool);

unsafe impl<T: ByteView, const N: usize> ByteView for [T; N] {}

/// One structural capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Capability {
    DefaultConstructible = 1 << 0,
    Copyable = 1 << 1,
    Cloneable = 1 << 2,
    Equatable = 1 << 3,
    MustDestruct = 1 << 4,
    Trivial = 1 << 5,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::DefaultConstructible,
        Capability::Copyable,
        Capability::Cloneable,
        Capability::Equatable,
        Capability::MustDestruct,
        Capability::Trivial,
    ];

    const fn bit(self) -> u8 {
        self as u8
    }
}

/// A set of [`Capability`] flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    /// What every primitive number and `bool` supports.
    pub const PRIMITIVE: Capabilities = Capabilities::NONE
        .with(Capability::DefaultConstructible)
        .with(Capability::Copyable)
        .with(Capability::Cloneable)
        .with(Capability::Equatable)
        .with(Capability::Trivial);

    /// Builds a set from individual probe results.
    #[must_use]
    pub const fn detect(
        default: bool,
        copy: bool,
        clone: bool,
        eq: bool,
        must_destruct: bool,
    ) -> Capabilities {
        let mut set = Capabilities::NONE;
        if default {
            set = set.with(Capability::DefaultConstructible);
        }
        if copy {
            set = set.with(Capability::Copyable).with(Capability::Trivial);
        }
        if clone {
            set = set.with(Capability::Cloneable);
        }
        if eq {
            set = set.with(Capability::Equatable);
        }
        if must_destruct {
            set = set.with(Capability::MustDestruct);
        }
        set
    }

    #[must_use]
    pub const fn with(self, capability: Capability) -> Capabilities {
        Capabilities(self.0 | capability.bit())
    }

    #[must_use]
    pub const fn without(self, capability: Capability) -> Capabilities {
        Capabilities(self.0 & !capability.bit())
    }

    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    #[must_use]
    pub const fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 & other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every capability in `required` is present.
    #[must_use]
    pub fn satisfies(self, required: &[Capability]) -> bool {
        required.iter().all(|&c| self.contains(c))
    }

    /// Present capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |&c| self.contains(c))
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Capabilities::NONE, Capabilities::with)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Compile-time probes behind [`capabilities!`](crate::capabilities).
///
/// Each probe has two traits with the same method: one implemented on
/// `&Probe<T>` under the capability bound, one on `Probe<T>` without it.
/// Calling the method on `&&Probe<T>` picks the bounded impl when it
/// applies and falls back through auto-deref otherwise. This only works for
/// concrete types.
#[doc(hidden)]
pub mod probe {
    use std::marker::PhantomData;

    pub struct Probe<T>(pub PhantomData<T>);

    macro_rules! probe {
        ($method:ident, $yes:ident, $no:ident, $($bound:tt)+) => {
            pub trait $yes {
                fn $method(&self) -> bool {
                    true
                }
            }
            impl<T: $($bound)+> $yes for &Probe<T> {}

            pub trait $no {
                fn $method(&self) -> bool {
                    false
                }
            }
            impl<T> $no for Probe<T> {}
        };
    }

    probe!(has_default, HasDefault, LacksDefault, Default);
    probe!(has_copy, HasCopy, LacksCopy, Copy);
    probe!(has_clone, HasClone, LacksClone, Clone);
    probe!(has_eq, HasEq, LacksEq, PartialEq);
}

/// Detects the [`Capabilities`] of a concrete type.
///
/// ```
/// use stratum::capability::Capability;
///
/// let caps = stratum::capabilities!(String);
/// assert!(caps.contains(Capability::Cloneable));
/// assert!(caps.contains(Capability::MustDestruct));
/// assert!(!caps.contains(Capability::Copyable));
/// ```
#[macro_export]
macro_rules! capabilities {
    ($ty:ty) => {{
        #[allow(unused_imports)]
        use $crate::capability::probe::{
            HasClone as _, HasCopy as _, HasDefault as _, HasEq as _, LacksClone as _,
            LacksCopy as _, LacksDefault as _, LacksEq as _,
        };
        let probe = $crate::capability::probe::Probe::<$ty>(::core::marker::PhantomData);
        $crate::capability::Capabilities::detect(
            (&&probe).has_default(),
            (&&probe).has_copy(),
            (&&probe).has_clone(),
            (&&probe).has_eq(),
            ::core::mem::needs_drop::<$ty>(),
        )
    }};
}

crate::reflect_enum! {
    Capability: u8, default DefaultConstructible {
        DefaultConstructible,
        Copyable,
        Cloneable,
        Equatable,
        MustDestruct,
        Trivial,
    }
}

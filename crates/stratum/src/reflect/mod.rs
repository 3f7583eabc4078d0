//! Static type reflection.
//!
//! Every participating type implements [`Reflect`], which names it, tags it
//! with a [`Kind`] and describes its members. Primitives, pointers and
//! arrays are covered by built-in impls; records and enums opt in through
//! [`reflect_record!`](crate::reflect_record) and
//! [`reflect_enum!`](crate::reflect_enum).
//!
//! Records and enums also carry their members as a compile-time
//! [type list](crate::typelist), which is what [`visit::iterate_record`] and
//! [`visit::iterate_enum`] walk. The same information is available at
//! runtime as a [`TypeDescriptor`] from the [registry](crate::registry).
//!
//! # Example
//!
//! ```
//! use stratum::reflect::{Kind, Reflect};
//! use stratum::reflect_record;
//!
//! #[derive(Default)]
//! struct Sample {
//!     id: u32,
//!     weight: f64,
//! }
//!
//! reflect_record! {
//!     Sample { id: u32, weight: f64 }
//! }
//!
//! let desc = Sample::descriptor();
//! assert_eq!(desc.name.as_str(), "Sample");
//! assert_eq!(desc.kind, Kind::Record);
//! assert_eq!(desc.fields()[1].name.as_str(), "weight");
//! ```

mod builtin;
mod descriptor;
mod kind;
mod macros;
pub mod visit;

pub use descriptor::{CaseDescriptor, FieldDescriptor, Members, TypeDescriptor, TypeRef};
pub use kind::Kind;

use std::fmt;
use std::marker::PhantomData;

use crate::capability::Capabilities;
use crate::error::{Error, Result};
use crate::typelist::TypeList;

/// Longest accepted type, field or case name, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// A type, field or case name of at most [`MAX_NAME_LEN`] bytes.
///
/// [`Name::new`] is a `const fn` that panics on overlong input, so a name
/// written in a constant is rejected at compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(&'static str);

impl Name {
    /// Creates a name, panicking if it is too long.
    #[must_use]
    pub const fn new(name: &'static str) -> Name {
        assert!(name.len() <= MAX_NAME_LEN, "name exceeds MAX_NAME_LEN");
        Name(name)
    }

    /// Creates a name without panicking.
    ///
    /// Names are borrowed for the whole program, so a string built at run
    /// time has to be leaked first (for example with [`String::leak`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameTooLong`] if `name` exceeds [`MAX_NAME_LEN`].
    pub const fn try_new(name: &'static str) -> Result<Name> {
        if name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong {
                len: name.len(),
                max: MAX_NAME_LEN,
            });
        }
        Ok(Name(name))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A type with static metadata.
///
/// # Safety
///
/// `KIND` and `members` must describe the real layout of `Self`: a
/// primitive kind must match the primitive type, and every field offset and
/// field type must be those of an actual field. [`visit::visit_fields`]
/// reinterprets memory based on this information. Implement it through
/// [`reflect_record!`](crate::reflect_record) or
/// [`reflect_enum!`](crate::reflect_enum) rather than by hand.
pub unsafe trait Reflect: Sized + 'static {
    const NAME: Name;
    const KIND: Kind;

    /// Member description stored in the runtime descriptor.
    fn members() -> Members {
        Members::None
    }

    /// Structural capabilities of the type.
    fn capabilities() -> Capabilities;

    /// The runtime descriptor, registered on first use.
    fn descriptor() -> &'static TypeDescriptor {
        crate::registry::descriptor_of::<Self>()
    }
}

/// Marker naming field `I` of record `R` inside a type list.
pub struct Field<R, const I: usize>(PhantomData<fn() -> R>);

/// Marker naming case `I` of enum `E` inside a type list.
pub struct Case<E, const I: usize>(PhantomData<fn() -> E>);

/// Layout of field `I` of a record.
///
/// # Safety
///
/// `OFFSET` must be the byte offset of a field of type `Type` inside
/// `Self`. Visitors dereference `base + OFFSET` as `Type` without further
/// checks. [`reflect_record!`](crate::reflect_record) derives both with
/// `offset_of!`.
pub unsafe trait FieldDef<const I: usize>: Sized + 'static {
    type Type: Reflect;
    const NAME: Name;
    const OFFSET: usize;
}

/// A record whose fields can be traversed.
pub trait Record: Reflect + Sized {
    /// `Field<Self, 0>, Field<Self, 1>, ...` in declaration order.
    type Fields: TypeList;
}

/// Case `I` of an enum.
pub trait CaseDef<const I: usize>: Enum {
    const NAME: Name;
    const VALUE: Self;
}

/// A fieldless enum with a fixed integer representation.
pub trait Enum: Reflect + Copy {
    /// Integer representation (the `#[repr]` type).
    type Underlying: Reflect + Copy + PartialEq + Into<i128>;
    /// `Case<Self, 0>, Case<Self, 1>, ...` in declaration order.
    type Cases: TypeList;

    const DEFAULT: Self;
    /// Every case value, in declaration order.
    const VALUES: &'static [Self];
    /// Every case descriptor, parallel to [`Enum::VALUES`].
    const CASES: &'static [CaseDescriptor];

    fn to_underlying(self) -> Self::Underlying;

    /// Declared name of this value's case.
    fn case_name(self) -> &'static str {
        let raw = self.to_underlying();
        Self::VALUES
            .iter()
            .zip(Self::CASES)
            .find(|(value, _)| value.to_underlying() == raw)
            .map_or("", |(_, case)| case.name.as_str())
    }

    /// The case whose representation equals `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCase`] if no declared case has that value.
    fn from_underlying(raw: Self::Underlying) -> Result<Self> {
        Self::VALUES
            .iter()
            .copied()
            .find(|value| value.to_underlying() == raw)
            .ok_or(Error::UnknownCase {
                type_name: Self::NAME.as_str(),
                value: raw.into(),
            })
    }

    /// The case declared under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCaseName`] if no case has that name.
    fn from_name(name: &str) -> Result<Self> {
        Self::VALUES
            .iter()
            .zip(Self::CASES)
            .find(|(_, case)| case.name == name)
            .map(|(value, _)| *value)
            .ok_or_else(|| Error::UnknownCaseName {
                type_name: Self::NAME.as_str(),
                name: name.to_string(),
            })
    }
}

/// Checks that no two cases of `E` share a name or a value.
///
/// [`reflect_enum!`](crate::reflect_enum) already rejects a case list that
/// misses a variant; this catches the remaining authoring mistakes and is
/// meant for tests.
///
/// # Errors
///
/// Returns [`Error::DuplicateCase`] naming the first repeated case.
pub fn check_cases<E: Enum>() -> Result<()> {
    for (i, case) in E::CASES.iter().enumerate() {
        let repeated = E::CASES[..i]
            .iter()
            .any(|earlier| earlier.name == case.name || earlier.value == case.value);
        if repeated {
            return Err(Error::DuplicateCase {
                type_name: E::NAME.as_str(),
                name: case.name.as_str(),
            });
        }
    }
    Ok(())
}

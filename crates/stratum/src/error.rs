//! Error types for `stratum`.
//!
//! Container misuse (out-of-bounds indexing, popping an empty `Vec`) is a
//! bug and panics. The variants here cover lookups whose inputs come from
//! outside the program, such as a type name read from a file or a raw enum
//! value received over the wire.

use std::fmt;

/// Errors returned by registry and enum lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No registered type carries this name.
    UnknownType {
        /// The name that was looked up.
        name: String,
    },

    /// The raw value matches no declared case of the enum.
    UnknownCase {
        /// Name of the enum type.
        type_name: &'static str,
        /// The raw value that was converted.
        value: i128,
    },

    /// The string matches no declared case name of the enum.
    UnknownCaseName {
        /// Name of the enum type.
        type_name: &'static str,
        /// The case name that was looked up.
        name: String,
    },

    /// Two declared cases share a name or a value.
    DuplicateCase {
        /// Name of the enum type.
        type_name: &'static str,
        /// Name of the second, conflicting case.
        name: &'static str,
    },

    /// A type name exceeds [`MAX_NAME_LEN`](crate::reflect::MAX_NAME_LEN).
    NameTooLong {
        /// Length of the rejected name in bytes.
        len: usize,
        /// The maximum length.
        max: usize,
    },

    /// The byte is not a [`Kind`](crate::reflect::Kind) discriminant.
    InvalidKind {
        /// The rejected byte.
        value: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownType { name } => {
                write!(f, "No registered type named '{name}'")
            }
            Error::UnknownCase { type_name, value } => {
                write!(f, "Enum '{type_name}' has no case with value {value}")
            }
            Error::UnknownCaseName { type_name, name } => {
                write!(f, "Enum '{type_name}' has no case named '{name}'")
            }
            Error::DuplicateCase { type_name, name } => {
                write!(f, "Enum '{type_name}' declares case '{name}' twice")
            }
            Error::NameTooLong { len, max } => {
                write!(f, "Type name of {len} bytes exceeds the {max} byte limit")
            }
            Error::InvalidKind { value } => {
                write!(f, "Invalid kind discriminant: {value}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for `stratum` lookups.
pub type Result<T> = std::result::Result<T, Error>;

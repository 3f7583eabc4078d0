use std::fmt;

use crate::error::Error;

/// Category tag carried by every [`TypeDescriptor`](super::TypeDescriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Kind {
    #[default]
    Void = 0,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Array,
    Pointer,
    Enum,
    Record,
}

impl Kind {
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Kind::I8 | Kind::I16 | Kind::I32 | Kind::I64)
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        self.is_signed() || matches!(self, Kind::U8 | Kind::U16 | Kind::U32 | Kind::U64)
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Kind::F32 | Kind::F64)
    }

    /// Integers, floats and `bool`.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        self.is_integer() || self.is_float() || matches!(self, Kind::Bool)
    }

    /// Kinds whose descriptor carries members of other types.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Kind::Array | Kind::Pointer | Kind::Enum | Kind::Record)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Void => "void",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Bool => "bool",
            Kind::Array => "array",
            Kind::Pointer => "pointer",
            Kind::Enum => "enum",
            Kind::Record => "record",
        }
    }
}

impl TryFrom<u8> for Kind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use crate::reflect::Enum;
        Kind::from_underlying(value).map_err(|_| Error::InvalidKind { value })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

crate::reflect_enum! {
    Kind: u8, default Void {
        Void,
        I8,
        I16,
        I32,
        I64,
        U8,
        U16,
        U32,
        U64,
        F32,
        F64,
        Bool,
        Array,
        Pointer,
        Enum,
        Record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{Enum, Reflect, check_cases};

    #[test]
    fn test_predicates() {
        assert!(Kind::I16.is_integer());
        assert!(Kind::I16.is_signed());
        assert!(Kind::U64.is_integer());
        assert!(!Kind::U64.is_signed());
        assert!(Kind::F32.is_float());
        assert!(Kind::Bool.is_primitive());
        assert!(!Kind::Void.is_primitive());
        assert!(!Kind::Pointer.is_primitive());
        assert!(Kind::Record.is_composite());
        assert!(!Kind::F64.is_composite());
    }

    #[test]
    fn test_try_from_u8() {
        assert_eq!(Kind::try_from(0), Ok(Kind::Void));
        assert_eq!(Kind::try_from(15), Ok(Kind::Record));
        assert_eq!(Kind::try_from(16), Err(Error::InvalidKind { value: 16 }));
    }

    #[test]
    fn test_kind_is_reflected() {
        assert_eq!(Kind::NAME.as_str(), "Kind");
        assert_eq!(Kind::KIND, Kind::Enum);
        assert_eq!(Kind::DEFAULT, Kind::Void);
        assert_eq!(Kind::VALUES.len(), 16);
        assert_eq!(Kind::Pointer.case_name(), "Pointer");
        assert_eq!(Kind::from_name("Array"), Ok(Kind::Array));
        check_cases::<Kind>().unwrap();
    }

    #[test]
    fn test_display() {
        assert_eq!(Kind::U32.to_string(), "u32");
        assert_eq!(Kind::Record.to_string(), "record");
    }
}

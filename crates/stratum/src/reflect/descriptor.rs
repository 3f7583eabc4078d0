//! Runtime descriptor values.

use std::any::TypeId;
use std::fmt;

use super::{Kind, Name, Reflect};
use crate::capability::Capabilities;

/// A lazily resolved reference to another type's descriptor.
///
/// Holding a function instead of the descriptor itself lets a type refer to
/// itself (through a pointer field) without recursing during registration.
#[derive(Clone, Copy)]
pub struct TypeRef(fn() -> &'static TypeDescriptor);

impl TypeRef {
    #[must_use]
    pub const fn of<T: Reflect>() -> TypeRef {
        TypeRef(T::descriptor)
    }

    /// Resolves the descriptor, registering the type if needed.
    #[must_use]
    pub fn get(self) -> &'static TypeDescriptor {
        (self.0)()
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.get().name)
    }
}

/// One field of a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: Name,
    /// Byte offset from the start of the owning record.
    pub offset: usize,
    pub ty: TypeRef,
}

/// One case of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseDescriptor {
    pub name: Name,
    /// The case's representation, widened to `i128`.
    pub value: i128,
}

impl CaseDescriptor {
    #[must_use]
    pub const fn new(name: Name, value: i128) -> CaseDescriptor {
        CaseDescriptor { name, value }
    }
}

/// Kind-specific part of a [`TypeDescriptor`].
#[derive(Debug, Clone, Copy)]
pub enum Members {
    /// Primitives and `void`.
    None,
    /// Fields of a record that supports traversal.
    Fields(&'static [FieldDescriptor]),
    /// Layout of a record that owns its storage and is not traversable.
    Layout(&'static [FieldDescriptor]),
    /// Cases of an enum.
    Cases {
        underlying: TypeRef,
        /// Representation of the default case.
        default: i128,
        cases: &'static [CaseDescriptor],
    },
    /// Element type and length of an array.
    Element { ty: TypeRef, length: usize },
    /// Target type of a pointer.
    Pointee { ty: TypeRef },
}

/// Metadata describing one type. Built once at registration and never
/// mutated.
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    pub name: Name,
    pub kind: Kind,
    pub size: usize,
    pub align: usize,
    pub capabilities: Capabilities,
    pub type_id: TypeId,
    pub members: Members,
}

impl TypeDescriptor {
    /// Collects the static metadata of `T`.
    pub(crate) fn build<T: Reflect>() -> TypeDescriptor {
        TypeDescriptor {
            name: T::NAME,
            kind: T::KIND,
            size: size_of::<T>(),
            align: align_of::<T>(),
            capabilities: T::capabilities(),
            type_id: TypeId::of::<T>(),
            members: T::members(),
        }
    }

    /// Record fields, traversable or not. Empty for other kinds.
    #[must_use]
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self.members {
            Members::Fields(fields) | Members::Layout(fields) => fields,
            _ => &[],
        }
    }

    /// Enum cases. Empty for other kinds.
    #[must_use]
    pub fn cases(&self) -> &'static [CaseDescriptor] {
        match self.members {
            Members::Cases { cases, .. } => cases,
            _ => &[],
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields().iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn case(&self, name: &str) -> Option<&'static CaseDescriptor> {
        self.cases().iter().find(|case| case.name == name)
    }

    /// Element or pointee type of an array or pointer.
    #[must_use]
    pub fn target(&self) -> Option<&'static TypeDescriptor> {
        match self.members {
            Members::Element { ty, .. } | Members::Pointee { ty } => Some(ty.get()),
            _ => None,
        }
    }

    /// True for records whose fields may be visited in place.
    #[must_use]
    pub fn is_traversable(&self) -> bool {
        matches!(self.members, Members::Fields(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.members {
            Members::None => write!(f, "{}", self.name),
            Members::Fields(fields) | Members::Layout(fields) => {
                write!(f, "{} {{", self.name)?;
                for (i, field) in fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{}: {}", field.name, field.ty.get().name)?;
                }
                if fields.is_empty() {
                    f.write_str("}")
                } else {
                    f.write_str(" }")
                }
            }
            Members::Cases { underlying, cases, .. } => {
                write!(f, "{}: {} {{", self.name, underlying.get().name)?;
                for (i, case) in cases.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{} = {}", case.name, case.value)?;
                }
                f.write_str(" }")
            }
            Members::Element { ty, length } => write!(f, "[{}; {length}]", ty.get().name),
            Members::Pointee { ty } => write!(f, "*{}", ty.get().name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;

    #[test]
    fn test_primitive_descriptor() {
        let desc = i32::descriptor();
        assert_eq!(desc.name.as_str(), "i32");
        assert_eq!(desc.kind, Kind::I32);
        assert_eq!(desc.size, 4);
        assert_eq!(desc.align, 4);
        assert_eq!(desc.type_id, TypeId::of::<i32>());
        assert!(desc.capabilities.contains(Capability::Trivial));
        assert!(desc.fields().is_empty());
        assert!(desc.cases().is_empty());
        assert!(!desc.is_traversable());
        assert_eq!(desc.to_string(), "i32");
    }

    #[test]
    fn test_array_descriptor() {
        let desc = <[u16; 3]>::descriptor();
        assert_eq!(desc.kind, Kind::Array);
        assert_eq!(desc.size, 6);
        assert!(matches!(desc.members, Members::Element { length: 3, .. }));
        assert_eq!(desc.target().map(|t| t.kind), Some(Kind::U16));
        assert_eq!(desc.to_string(), "[u16; 3]");
    }

    #[test]
    fn test_pointer_descriptor() {
        let desc = <*const f64>::descriptor();
        assert_eq!(desc.kind, Kind::Pointer);
        assert_eq!(desc.target().map(|t| t.kind), Some(Kind::F64));
        assert_eq!(desc.to_string(), "*f64");
    }

    #[test]
    fn test_enum_descriptor() {
        let desc = Kind::descriptor();
        assert_eq!(desc.kind, Kind::Enum);
        assert_eq!(desc.cases().len(), 16);
        assert_eq!(desc.case("Bool").map(|c| c.value), Some(Kind::Bool as i128));
        assert!(desc.case("Missing").is_none());
        assert!(desc.to_string().starts_with("Kind: u8 { Void = 0, I8 = 1"));
    }

    #[test]
    fn test_type_ref_resolves_lazily() {
        const TARGET: TypeRef = TypeRef::of::<u64>();
        assert_eq!(TARGET.get().kind, Kind::U64);
        assert_eq!(format!("{TARGET:?}"), "TypeRef(u64)");
    }
}

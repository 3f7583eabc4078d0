//! Reflection for primitives, pointers and arrays.

use super::{Kind, Members, Name, Reflect, TypeRef};
use crate::capability::{Capabilities, Capability};

macro_rules! reflect_primitive {
    ($($ty:ty => $name:literal, $kind:ident;)*) => {
        $(
            unsafe impl Reflect for $ty {
                const NAME: Name = Name::new($name);
                const KIND: Kind = Kind::$kind;

                fn capabilities() -> Capabilities {
                    Capabilities::PRIMITIVE
                }
            }
        )*
    };
}

reflect_primitive! {
    () => "void", Void;
    i8 => "i8", I8;
    i16 => "i16", I16;
    i32 => "i32", I32;
    i64 => "i64", I64;
    u8 => "u8", U8;
    u16 => "u16", U16;
    u32 => "u32", U32;
    u64 => "u64", U64;
    f32 => "f32", F32;
    f64 => "f64", F64;
    bool => "bool", Bool;
}

#[cfg(target_pointer_width = "64")]
reflect_primitive! {
    isize => "isize", I64;
    usize => "usize", U64;
}

#[cfg(target_pointer_width = "32")]
reflect_primitive! {
    isize => "isize", I32;
    usize => "usize", U32;
}

const RAW_POINTER: Capabilities = Capabilities::NONE
    .with(Capability::Copyable)
    .with(Capability::Cloneable)
    .with(Capability::Equatable)
    .with(Capability::Trivial);

macro_rules! reflect_pointer {
    ($($ptr:ty => $caps:expr;)*) => {
        $(
            unsafe impl<T: Reflect> Reflect for $ptr {
                const NAME: Name = T::NAME;
                const KIND: Kind = Kind::Pointer;

                fn members() -> Members {
                    Members::Pointee { ty: TypeRef::of::<T>() }
                }

                fn capabilities() -> Capabilities {
                    $caps
                }
            }
        )*
    };
}

reflect_pointer! {
    *const T => RAW_POINTER;
    *mut T => RAW_POINTER;
    &'static T => RAW_POINTER.without(Capability::Equatable).union(eq_of::<T>());
    &'static mut T => Capabilities::NONE;
}

/// Shared references compare by value, so they are equatable only when the
/// pointee is.
fn eq_of<T: Reflect>() -> Capabilities {
    T::capabilities().intersection(Capabilities::NONE.with(Capability::Equatable))
}

unsafe impl<T: Reflect, const N: usize> Reflect for [T; N] {
    const NAME: Name = T::NAME;
    const KIND: Kind = Kind::Array;

    fn members() -> Members {
        Members::Element {
            ty: TypeRef::of::<T>(),
            length: N,
        }
    }

    fn capabilities() -> Capabilities {
        T::capabilities().without(Capability::DefaultConstructible)
    }
}

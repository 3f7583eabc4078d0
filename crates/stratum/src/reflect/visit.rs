//! Field and case traversal.
//!
//! Two flavors are provided:
//!
//! - **Static**: [`iterate_record`] walks a record's field type list and
//!   calls a generic [`FieldVisitor`] with a typed reference to each field.
//!   Every field type gets its own monomorphized call; a visitor that cannot
//!   handle some field type fails to compile.
//! - **Dynamic**: [`visit_fields`] walks the runtime descriptor and
//!   dispatches on each field's [`Kind`] to a [`KindVisitor`] trait object,
//!   descending into nested records and arrays.
//!
//! In both, the visited reference points into the live instance at
//! `base + offset`; nothing is copied.

use std::marker::PhantomData;

use super::{Case, CaseDef, Enum, Field, FieldDef, Kind, Members, Record, Reflect, TypeDescriptor};
use crate::typelist::{Iterate, Visit};

/// Receives each field of a record, mutably.
pub trait FieldVisitor {
    fn apply<T: Reflect>(&mut self, name: &'static str, field: &mut T);
}

impl<V: FieldVisitor> FieldVisitor for &mut V {
    fn apply<T: Reflect>(&mut self, name: &'static str, field: &mut T) {
        (**self).apply(name, field);
    }
}

/// Receives each field of a record, read-only.
pub trait FieldVisitorRef {
    fn apply<T: Reflect>(&mut self, name: &'static str, field: &T);
}

impl<V: FieldVisitorRef> FieldVisitorRef for &mut V {
    fn apply<T: Reflect>(&mut self, name: &'static str, field: &T) {
        (**self).apply(name, field);
    }
}

/// Adapts a [`FieldVisitor`] to the type-list [`Visit`] protocol.
#[doc(hidden)]
pub struct InvokeField<R, V> {
    visitor: V,
    base: *mut u8,
    _record: PhantomData<fn(&mut R)>,
}

impl<R, V, const I: usize> Visit<Field<R, I>> for InvokeField<R, V>
where
    R: FieldDef<I>,
    V: FieldVisitor,
{
    fn apply(&mut self) {
        // SAFETY: `base` comes from a live `&mut R` and `FieldDef` guarantees
        // that `OFFSET` locates a `Type` inside `R`. Only one field reference
        // exists at a time.
        let field = unsafe {
            &mut *self
                .base
                .add(<R as FieldDef<I>>::OFFSET)
                .cast::<<R as FieldDef<I>>::Type>()
        };
        self.visitor.apply(<R as FieldDef<I>>::NAME.as_str(), field);
    }
}

/// Adapts a [`FieldVisitorRef`] to the type-list [`Visit`] protocol.
#[doc(hidden)]
pub struct InvokeFieldRef<R, V> {
    visitor: V,
    base: *const u8,
    _record: PhantomData<fn(&R)>,
}

impl<R, V, const I: usize> Visit<Field<R, I>> for InvokeFieldRef<R, V>
where
    R: FieldDef<I>,
    V: FieldVisitorRef,
{
    fn apply(&mut self) {
        // SAFETY: as for `InvokeField`, through a shared reference.
        let field = unsafe {
            &*self
                .base
                .add(<R as FieldDef<I>>::OFFSET)
                .cast::<<R as FieldDef<I>>::Type>()
        };
        self.visitor.apply(<R as FieldDef<I>>::NAME.as_str(), field);
    }
}

/// Calls `visitor` once per field of `record`, in declaration order, with a
/// mutable reference into `record`.
///
/// ```
/// use stratum::reflect::Reflect;
/// use stratum::reflect::visit::{FieldVisitor, iterate_record};
/// use stratum::reflect_record;
///
/// struct Reading {
///     sensor: u8,
///     value: f32,
/// }
/// reflect_record! { Reading { sensor: u8, value: f32 } }
///
/// struct Names(Vec<&'static str>);
/// impl FieldVisitor for Names {
///     fn apply<T: Reflect>(&mut self, name: &'static str, _field: &mut T) {
///         self.0.push(name);
///     }
/// }
///
/// let mut reading = Reading { sensor: 3, value: 0.5 };
/// let mut names = Names(Vec::new());
/// iterate_record(&mut names, &mut reading);
/// assert_eq!(names.0, ["sensor", "value"]);
/// ```
pub fn iterate_record<R, V>(visitor: V, record: &mut R)
where
    R: Record,
    V: FieldVisitor,
    R::Fields: Iterate<InvokeField<R, V>>,
{
    let mut invoke = InvokeField {
        visitor,
        base: std::ptr::from_mut(record).cast::<u8>(),
        _record: PhantomData,
    };
    R::Fields::iterate(&mut invoke);
}

/// Read-only counterpart of [`iterate_record`].
pub fn iterate_record_ref<R, V>(visitor: V, record: &R)
where
    R: Record,
    V: FieldVisitorRef,
    R::Fields: Iterate<InvokeFieldRef<R, V>>,
{
    let mut invoke = InvokeFieldRef {
        visitor,
        base: std::ptr::from_ref(record).cast::<u8>(),
        _record: PhantomData,
    };
    R::Fields::iterate(&mut invoke);
}

/// Adapts a case callback to the type-list [`Visit`] protocol.
#[doc(hidden)]
pub struct InvokeCase<E, F> {
    callback: F,
    _enum: PhantomData<fn() -> E>,
}

impl<E, F, const I: usize> Visit<Case<E, I>> for InvokeCase<E, F>
where
    E: CaseDef<I>,
    F: FnMut(&'static str, E),
{
    fn apply(&mut self) {
        (self.callback)(<E as CaseDef<I>>::NAME.as_str(), <E as CaseDef<I>>::VALUE);
    }
}

/// Calls `callback` once per declared case of `E`, in declaration order.
pub fn iterate_enum<E, F>(callback: F)
where
    E: Enum,
    F: FnMut(&'static str, E),
    E::Cases: Iterate<InvokeCase<E, F>>,
{
    let mut invoke = InvokeCase {
        callback,
        _enum: PhantomData,
    };
    E::Cases::iterate(&mut invoke);
}

/// Receives fields by kind. Every method defaults to doing nothing.
///
/// Records and arrays are entered only when [`KindVisitor::enter_record`]
/// or [`KindVisitor::visit_array`] return `true`. Fields and elements inside
/// them are reported with their own name; array elements reuse the array
/// field's name.
#[allow(unused_variables)]
pub trait KindVisitor {
    fn visit_bool(&mut self, name: &'static str, value: &mut bool) {}
    fn visit_i8(&mut self, name: &'static str, value: &mut i8) {}
    fn visit_i16(&mut self, name: &'static str, value: &mut i16) {}
    fn visit_i32(&mut self, name: &'static str, value: &mut i32) {}
    fn visit_i64(&mut self, name: &'static str, value: &mut i64) {}
    fn visit_u8(&mut self, name: &'static str, value: &mut u8) {}
    fn visit_u16(&mut self, name: &'static str, value: &mut u16) {}
    fn visit_u32(&mut self, name: &'static str, value: &mut u32) {}
    fn visit_u64(&mut self, name: &'static str, value: &mut u64) {}
    fn visit_f32(&mut self, name: &'static str, value: &mut f32) {}
    fn visit_f64(&mut self, name: &'static str, value: &mut f64) {}

    /// A pointer field. `field` is the address of the pointer itself.
    fn visit_pointer(&mut self, name: &'static str, desc: &'static TypeDescriptor, field: *mut u8) {
    }

    /// An array field. Return `true` to visit its elements.
    fn visit_array(&mut self, name: &'static str, desc: &'static TypeDescriptor) -> bool {
        true
    }

    /// An enum field with its raw representation.
    fn visit_enum(&mut self, name: &'static str, desc: &'static TypeDescriptor, value: i128) {}

    /// A nested traversable record. Return `true` to visit its fields.
    fn enter_record(&mut self, name: &'static str, desc: &'static TypeDescriptor) -> bool {
        true
    }

    /// Called after the fields of an entered record.
    fn leave_record(&mut self, name: &'static str, desc: &'static TypeDescriptor) {}

    /// A `void` field or a record that does not allow traversal.
    fn visit_opaque(&mut self, name: &'static str, desc: &'static TypeDescriptor) {}
}

/// Walks the fields of `record` through its runtime descriptor.
pub fn visit_fields<R: Record>(record: &mut R, visitor: &mut dyn KindVisitor) {
    let base = std::ptr::from_mut(record).cast::<u8>();
    for field in R::descriptor().fields() {
        // SAFETY: the descriptor of a `Record` lists real fields of `R`.
        unsafe { dispatch(field.name.as_str(), field.ty.get(), base.add(field.offset), visitor) };
    }
}

/// # Safety
///
/// `ptr` must point to a live, exclusively borrowed value of the type
/// described by `desc`.
unsafe fn dispatch(
    name: &'static str,
    desc: &'static TypeDescriptor,
    ptr: *mut u8,
    visitor: &mut dyn KindVisitor,
) {
    unsafe {
        match desc.kind {
            Kind::Bool => visitor.visit_bool(name, &mut *ptr.cast()),
            Kind::I8 => visitor.visit_i8(name, &mut *ptr.cast()),
            Kind::I16 => visitor.visit_i16(name, &mut *ptr.cast()),
            Kind::I32 => visitor.visit_i32(name, &mut *ptr.cast()),
            Kind::I64 => visitor.visit_i64(name, &mut *ptr.cast()),
            Kind::U8 => visitor.visit_u8(name, &mut *ptr.cast()),
            Kind::U16 => visitor.visit_u16(name, &mut *ptr.cast()),
            Kind::U32 => visitor.visit_u32(name, &mut *ptr.cast()),
            Kind::U64 => visitor.visit_u64(name, &mut *ptr.cast()),
            Kind::F32 => visitor.visit_f32(name, &mut *ptr.cast()),
            Kind::F64 => visitor.visit_f64(name, &mut *ptr.cast()),
            Kind::Pointer => visitor.visit_pointer(name, desc, ptr),
            Kind::Enum => visitor.visit_enum(name, desc, read_enum(desc, ptr)),
            Kind::Array => {
                if let Members::Element { ty, length } = desc.members {
                    if visitor.visit_array(name, desc) {
                        let element = ty.get();
                        for i in 0..length {
                            dispatch(name, element, ptr.add(i * element.size), visitor);
                        }
                    }
                }
            }
            Kind::Record => match desc.members {
                Members::Fields(fields) => {
                    if visitor.enter_record(name, desc) {
                        for field in fields {
                            dispatch(field.name.as_str(), field.ty.get(), ptr.add(field.offset), visitor);
                        }
                        visitor.leave_record(name, desc);
                    }
                }
                _ => visitor.visit_opaque(name, desc),
            },
            Kind::Void => visitor.visit_opaque(name, desc),
        }
    }
}

/// Reads an enum value as its underlying integer.
///
/// # Safety
///
/// `ptr` must point to a live value of the enum described by `desc`.
unsafe fn read_enum(desc: &TypeDescriptor, ptr: *const u8) -> i128 {
    let Members::Cases { underlying, .. } = desc.members else {
        return 0;
    };
    unsafe {
        match underlying.get().kind {
            Kind::I8 => i128::from(ptr.cast::<i8>().read()),
            Kind::I16 => i128::from(ptr.cast::<i16>().read()),
            Kind::I32 => i128::from(ptr.cast::<i32>().read()),
            Kind::I64 => i128::from(ptr.cast::<i64>().read()),
            Kind::U8 => i128::from(ptr.cast::<u8>().read()),
            Kind::U16 => i128::from(ptr.cast::<u16>().read()),
            Kind::U32 => i128::from(ptr.cast::<u32>().read()),
            Kind::U64 => i128::from(ptr.cast::<u64>().read()),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reflect_enum, reflect_record};

    #[derive(Debug, Clone, Copy, PartialEq)]
    #[repr(u8)]
    enum Mode {
        Off,
        On,
    }

    reflect_enum! {
        Mode: u8, default Off { Off, On }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Inner {
        count: u16,
        mode: Mode,
    }

    reflect_record! {
        Inner { count: u16, mode: Mode }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Outer {
        id: i64,
        inner: Inner,
        samples: [f32; 2],
        next: *const Outer,
    }

    reflect_record! {
        Outer { id: i64, inner: Inner, samples: [f32; 2], next: *const Outer }
    }

    fn outer() -> Outer {
        Outer {
            id: 7,
            inner: Inner {
                count: 2,
                mode: Mode::On,
            },
            samples: [1.5, 2.5],
            next: std::ptr::null(),
        }
    }

    struct Addresses(std::vec::Vec<(&'static str, usize)>);

    impl FieldVisitor for Addresses {
        fn apply<T: Reflect>(&mut self, name: &'static str, field: &mut T) {
            self.0.push((name, std::ptr::from_mut(field) as usize));
        }
    }

    struct Kinds(std::vec::Vec<Kind>);

    impl FieldVisitorRef for Kinds {
        fn apply<T: Reflect>(&mut self, _name: &'static str, _field: &T) {
            self.0.push(T::KIND);
        }
    }

    #[derive(Default)]
    struct Trace(std::vec::Vec<String>);

    impl KindVisitor for Trace {
        fn visit_i64(&mut self, name: &'static str, value: &mut i64) {
            *value += 1;
            self.0.push(format!("{name}={value}"));
        }
        fn visit_u16(&mut self, name: &'static str, value: &mut u16) {
            self.0.push(format!("{name}={value}"));
        }
        fn visit_f32(&mut self, name: &'static str, value: &mut f32) {
            self.0.push(format!("{name}={value}"));
        }
        fn visit_enum(&mut self, name: &'static str, desc: &'static TypeDescriptor, value: i128) {
            self.0.push(format!("{name}:{}={value}", desc.name));
        }
        fn visit_pointer(&mut self, name: &'static str, desc: &'static TypeDescriptor, _: *mut u8) {
            self.0.push(format!("{name}->{}", desc.name));
        }
        fn enter_record(&mut self, name: &'static str, _: &'static TypeDescriptor) -> bool {
            self.0.push(format!("{name}{{"));
            true
        }
        fn leave_record(&mut self, _: &'static str, _: &'static TypeDescriptor) {
            self.0.push("}".to_string());
        }
    }

    #[test]
    fn test_iterate_record_addresses() {
        let mut value = outer();
        let base = std::ptr::from_mut(&mut value) as usize;
        let mut seen = Addresses(std::vec::Vec::new());
        iterate_record(&mut seen, &mut value);

        let expected: std::vec::Vec<_> = Outer::descriptor()
            .fields()
            .iter()
            .map(|f| (f.name.as_str(), base + f.offset))
            .collect();
        assert_eq!(seen.0, expected);
    }

    #[test]
    fn test_iterate_record_ref_kinds() {
        let value = outer();
        let mut kinds = Kinds(std::vec::Vec::new());
        iterate_record_ref(&mut kinds, &value);
        assert_eq!(kinds.0, [Kind::I64, Kind::Record, Kind::Array, Kind::Pointer]);
    }

    #[test]
    fn test_visit_fields_descends_and_mutates() {
        let mut value = outer();
        let mut trace = Trace::default();
        visit_fields(&mut value, &mut trace);

        assert_eq!(
            trace.0,
            [
                "id=8",
                "inner{",
                "count=2",
                "mode:Mode=1",
                "}",
                "samples=1.5",
                "samples=2.5",
                "next->Outer",
            ]
        );
        assert_eq!(value.id, 8);
    }

    #[test]
    fn test_visit_fields_skips_when_declined() {
        struct Shallow(usize);
        impl KindVisitor for Shallow {
            fn visit_u16(&mut self, _: &'static str, _: &mut u16) {
                self.0 += 1;
            }
            fn enter_record(&mut self, _: &'static str, _: &'static TypeDescriptor) -> bool {
                false
            }
            fn visit_array(&mut self, _: &'static str, _: &'static TypeDescriptor) -> bool {
                false
            }
        }

        let mut value = outer();
        let mut shallow = Shallow(0);
        visit_fields(&mut value, &mut shallow);
        assert_eq!(shallow.0, 0);
    }
}

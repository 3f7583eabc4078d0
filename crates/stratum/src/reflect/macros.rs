//! Declaration macros for records and enums.

/// Implements [`Reflect`](crate::reflect::Reflect) and
/// [`Record`](crate::reflect::Record) for a struct.
///
/// Every listed field must exist with the given type; offsets are taken
/// with `offset_of!`, so they always match the compiled layout. Field types
/// must themselves implement `Reflect`. The descriptor name defaults to the
/// type name and can be overridden with `as "Name"`.
///
/// ```
/// use stratum::reflect::{Record, Reflect};
/// use stratum::reflect_record;
/// use stratum::typelist::TypeList;
///
/// struct Header {
///     tag: u8,
///     len: u32,
/// }
///
/// reflect_record! {
///     Header as "PacketHeader" { tag: u8, len: u32 }
/// }
///
/// assert_eq!(Header::NAME.as_str(), "PacketHeader");
/// assert_eq!(<Header as Record>::Fields::LEN, 2);
/// ```
///
/// A declared type has to match the field exactly. A field that would only
/// convert to it through `Deref`, such as a `Box<u64>` declared as `u64`,
/// is rejected:
///
/// ```compile_fail
/// use stratum::reflect_record;
///
/// struct Boxed {
///     value: Box<u64>,
/// }
///
/// reflect_record! {
///     Boxed { value: u64 }
/// }
/// ```
///
/// ```compile_fail
/// use stratum::reflect_record;
///
/// struct Borrowed {
///     value: &'static u64,
/// }
///
/// reflect_record! {
///     Borrowed { value: u64 }
/// }
/// ```
#[macro_export]
macro_rules! reflect_record {
    (@name $ty:ident) => { stringify!($ty) };
    (@name $ty:ident $name:literal) => { $name };

    (@defs $ty:ident; $idx:expr; ) => {};
    (@defs $ty:ident; $idx:expr; $field:ident : $fty:ty $(, $rf:ident : $rty:ty)*) => {
        unsafe impl $crate::reflect::FieldDef<{ $idx }> for $ty {
            type Type = $fty;
            const NAME: $crate::reflect::Name = $crate::reflect::Name::new(stringify!($field));
            const OFFSET: usize = ::core::mem::offset_of!($ty, $field);
        }
        $crate::reflect_record!(@defs $ty; $idx + 1; $($rf : $rty),*);
    };

    (@list $ty:ident; $idx:expr; ) => { $crate::typelist::Nil };
    (@list $ty:ident; $idx:expr; $field:ident $(, $rest:ident)*) => {
        $crate::typelist::Cons<
            $crate::reflect::Field<$ty, { $idx }>,
            $crate::reflect_record!(@list $ty; $idx + 1; $($rest),*),
        >
    };

    ($ty:ident $(as $name:literal)? { $($field:ident : $fty:ty),* $(,)? }) => {
        const _: () = {
            // Raw pointers never coerce, so the declared type must be exact.
            #[allow(dead_code)]
            fn same_type<T>(_: *const T) {}

            #[allow(dead_code, unused_variables)]
            fn field_types(record: &$ty) {
                $(same_type::<$fty>(::core::ptr::addr_of!(record.$field));)*
            }
        };

        unsafe impl $crate::reflect::Reflect for $ty {
            const NAME: $crate::reflect::Name =
                $crate::reflect::Name::new($crate::reflect_record!(@name $ty $($name)?));
            const KIND: $crate::reflect::Kind = $crate::reflect::Kind::Record;

            fn members() -> $crate::reflect::Members {
                const FIELDS: &[$crate::reflect::FieldDescriptor] = &[$(
                    $crate::reflect::FieldDescriptor {
                        name: $crate::reflect::Name::new(stringify!($field)),
                        offset: ::core::mem::offset_of!($ty, $field),
                        ty: $crate::reflect::TypeRef::of::<$fty>(),
                    }
                ),*];
                $crate::reflect::Members::Fields(FIELDS)
            }

            fn capabilities() -> $crate::capability::Capabilities {
                $crate::capabilities!($ty)
            }
        }

        impl $crate::reflect::Record for $ty {
            type Fields = $crate::reflect_record!(@list $ty; 0; $($field),*);
        }

        $crate::reflect_record!(@defs $ty; 0; $($field : $fty),*);
    };
}

/// Implements [`Reflect`](crate::reflect::Reflect) and
/// [`Enum`](crate::reflect::Enum) for a fieldless enum.
///
/// The case list must name every variant: the macro emits an exhaustive
/// `match` over it, so a missing variant is a compile error. The enum must
/// be `#[repr]`-sized like the declared underlying type.
///
/// ```
/// use stratum::reflect::{Enum, Reflect};
/// use stratum::reflect_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// #[repr(i8)]
/// enum Trend {
///     Down = -1,
///     Flat = 0,
///     Up = 1,
/// }
///
/// reflect_enum! {
///     Trend: i8, default Flat { Down, Flat, Up }
/// }
///
/// assert_eq!(Trend::DEFAULT, Trend::Flat);
/// assert_eq!(Trend::from_underlying(-1), Ok(Trend::Down));
/// assert_eq!(Trend::Up.case_name(), "Up");
/// assert!(Trend::from_underlying(2).is_err());
/// ```
#[macro_export]
macro_rules! reflect_enum {
    (@defs $ty:ident; $idx:expr; ) => {};
    (@defs $ty:ident; $idx:expr; $case:ident $(, $rest:ident)*) => {
        impl $crate::reflect::CaseDef<{ $idx }> for $ty {
            const NAME: $crate::reflect::Name = $crate::reflect::Name::new(stringify!($case));
            const VALUE: Self = $ty::$case;
        }
        $crate::reflect_enum!(@defs $ty; $idx + 1; $($rest),*);
    };

    (@list $ty:ident; $idx:expr; ) => { $crate::typelist::Nil };
    (@list $ty:ident; $idx:expr; $case:ident $(, $rest:ident)*) => {
        $crate::typelist::Cons<
            $crate::reflect::Case<$ty, { $idx }>,
            $crate::reflect_enum!(@list $ty; $idx + 1; $($rest),*),
        >
    };

    ($ty:ident : $repr:ty, default $default:ident { $($case:ident),+ $(,)? }) => {
        const _: fn($ty) = |value| match value {
            $($ty::$case => {})+
        };
        const _: () = assert!(
            ::core::mem::size_of::<$ty>() == ::core::mem::size_of::<$repr>(),
            "enum size differs from its underlying type",
        );

        unsafe impl $crate::reflect::Reflect for $ty {
            const NAME: $crate::reflect::Name = $crate::reflect::Name::new(stringify!($ty));
            const KIND: $crate::reflect::Kind = $crate::reflect::Kind::Enum;

            fn members() -> $crate::reflect::Members {
                $crate::reflect::Members::Cases {
                    underlying: $crate::reflect::TypeRef::of::<$repr>(),
                    default: $ty::$default as $repr as i128,
                    cases: <$ty as $crate::reflect::Enum>::CASES,
                }
            }

            fn capabilities() -> $crate::capability::Capabilities {
                $crate::capabilities!($ty)
            }
        }

        impl $crate::reflect::Enum for $ty {
            type Underlying = $repr;
            type Cases = $crate::reflect_enum!(@list $ty; 0; $($case),+);

            const DEFAULT: Self = $ty::$default;
            const VALUES: &'static [Self] = &[$($ty::$case),+];
            const CASES: &'static [$crate::reflect::CaseDescriptor] = &[$(
                $crate::reflect::CaseDescriptor::new(
                    $crate::reflect::Name::new(stringify!($case)),
                    $ty::$case as $repr as i128,
                )
            ),+];

            fn to_underlying(self) -> $repr {
                self as $repr
            }
        }

        $crate::reflect_enum!(@defs $ty; 0; $($case),+);
    };
}

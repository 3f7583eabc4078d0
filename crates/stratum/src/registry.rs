//! Process-wide type registry.
//!
//! Maps each reflected type's `TypeId` to its [`TypeDescriptor`]. The
//! registry is created on first touch, seeded with the built-in primitives
//! and [`Kind`], and then grows as types register, either explicitly through
//! [`register`] or implicitly the first time [`Reflect::descriptor`] is
//! called for them.
//!
//! Descriptors are leaked into `'static` storage and never change, so a
//! reference obtained once stays valid for the rest of the program.
//!
//! # Example
//!
//! ```
//! use stratum::registry;
//! use stratum::reflect::Kind;
//!
//! let desc = registry::lookup("u32").unwrap();
//! assert_eq!(desc.kind, Kind::U32);
//! assert!(registry::lookup("NoSuchType").is_err());
//! ```

use std::any::TypeId;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard};

use fxhash::FxBuildHasher;
use hashbrown::HashMap;
use stratum_log::debug;

use crate::error::{Error, Result};
use crate::reflect::{Kind, Reflect, TypeDescriptor};

struct Registry {
    by_id: HashMap<TypeId, &'static TypeDescriptor, FxBuildHasher>,
    /// Registration order, for name lookups and enumeration.
    ordered: std::vec::Vec<&'static TypeDescriptor>,
}

impl Registry {
    fn with_builtins() -> Registry {
        let mut registry = Registry {
            by_id: HashMap::default(),
            ordered: std::vec::Vec::new(),
        };
        registry.seed::<()>();
        registry.seed::<i8>();
        registry.seed::<i16>();
        registry.seed::<i32>();
        registry.seed::<i64>();
        registry.seed::<u8>();
        registry.seed::<u16>();
        registry.seed::<u32>();
        registry.seed::<u64>();
        registry.seed::<isize>();
        registry.seed::<usize>();
        registry.seed::<f32>();
        registry.seed::<f64>();
        registry.seed::<bool>();
        registry.seed::<Kind>();
        registry
    }

    /// Inserts `T` while the registry is being built. Built-in descriptors
    /// never call back into the registry, so this cannot deadlock.
    fn seed<T: Reflect>(&mut self) {
        self.insert(Box::leak(Box::new(TypeDescriptor::build::<T>())));
    }

    fn insert(&mut self, desc: &'static TypeDescriptor) -> &'static TypeDescriptor {
        *self.by_id.entry(desc.type_id).or_insert_with(|| {
            self.ordered.push(desc);
            desc
        })
    }
}

static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

fn registry() -> &'static RwLock<Registry> {
    REGISTRY.get_or_init(|| RwLock::new(Registry::with_builtins()))
}

// Descriptors are immutable once inserted, so a panic while holding the lock
// cannot leave the maps in a state worth rejecting.
fn read() -> RwLockReadGuard<'static, Registry> {
    registry().read().unwrap_or_else(PoisonError::into_inner)
}

/// The descriptor of `T`, registering it on first use.
pub fn descriptor_of<T: Reflect>() -> &'static TypeDescriptor {
    if let Some(desc) = lookup_by_type_id(TypeId::of::<T>()) {
        return desc;
    }
    register::<T>()
}

/// Registers `T` and returns its descriptor. Registering a type twice
/// returns the first descriptor.
pub fn register<T: Reflect>() -> &'static TypeDescriptor {
    // Built outside the lock: `members` and `capabilities` may touch other
    // types' descriptors.
    let built = TypeDescriptor::build::<T>();

    let mut registry = registry().write().unwrap_or_else(PoisonError::into_inner);
    if let Some(&existing) = registry.by_id.get(&built.type_id) {
        return existing;
    }
    let desc = registry.insert(Box::leak(Box::new(built)));
    debug!(
        "registered {} '{}' ({} bytes, align {})",
        desc.kind, desc.name, desc.size, desc.align
    );
    desc
}

#[must_use]
pub fn lookup_by_type_id(id: TypeId) -> Option<&'static TypeDescriptor> {
    read().by_id.get(&id).copied()
}

/// The type named `name` itself, never an array or pointer of it.
///
/// Arrays and pointers carry their target's name. If only such a derived
/// descriptor is registered so far, its target is resolved (and registered)
/// instead.
///
/// # Errors
///
/// Returns [`Error::UnknownType`] if no registered type has that name.
pub fn lookup(name: &str) -> Result<&'static TypeDescriptor> {
    let matches = lookup_all(name);
    if let Some(&direct) = matches.iter().find(|desc| !is_derived(desc)) {
        return Ok(direct);
    }
    let Some(&first) = matches.first() else {
        return Err(Error::UnknownType {
            name: name.to_string(),
        });
    };

    // Resolved without the lock held: `target` may register the element.
    let mut desc = first;
    while let Some(target) = desc.target() {
        desc = target;
    }
    Ok(desc)
}

fn is_derived(desc: &TypeDescriptor) -> bool {
    matches!(desc.kind, Kind::Array | Kind::Pointer)
}

/// Every registered type named `name`, in registration order.
///
/// Pointers and arrays share their target's name, so several descriptors
/// may match.
#[must_use]
pub fn lookup_all(name: &str) -> std::vec::Vec<&'static TypeDescriptor> {
    read()
        .ordered
        .iter()
        .copied()
        .filter(|desc| desc.name == name)
        .collect()
}

/// Every registered descriptor, in registration order.
#[must_use]
pub fn all_types() -> std::vec::Vec<&'static TypeDescriptor> {
    read().ordered.clone()
}

#[must_use]
pub fn is_registered<T: Reflect>() -> bool {
    lookup_by_type_id(TypeId::of::<T>()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect_record;

    #[allow(dead_code)]
    struct Probe {
        a: u8,
    }

    reflect_record! {
        Probe as "RegistryProbe" { a: u8 }
    }

    #[allow(dead_code)]
    struct Explicit {
        b: u16,
    }

    reflect_record! {
        Explicit as "RegistryExplicit" { b: u16 }
    }

    #[test]
    fn test_builtins_are_seeded() {
        assert!(is_registered::<u8>());
        assert!(is_registered::<f64>());
        assert!(is_registered::<Kind>());
        assert_eq!(lookup("bool").map(|d| d.kind), Ok(Kind::Bool));
        assert_eq!(all_types()[0].name.as_str(), "void");
    }

    #[test]
    fn test_descriptor_of_registers_once() {
        assert!(!is_registered::<Probe>());
        let first = descriptor_of::<Probe>();
        let second = descriptor_of::<Probe>();
        assert!(std::ptr::eq(first, second));
        assert!(is_registered::<Probe>());
        assert_eq!(lookup_all("RegistryProbe").len(), 1);
    }

    #[test]
    fn test_register_then_lookup() {
        let desc = register::<Explicit>();
        assert!(std::ptr::eq(register::<Explicit>(), desc));
        assert!(std::ptr::eq(lookup("RegistryExplicit").unwrap(), desc));
        assert_eq!(lookup_by_type_id(TypeId::of::<Explicit>()).map(|d| d.size), Some(2));
    }

    #[allow(dead_code)]
    struct Gadget {
        id: u32,
    }

    reflect_record! {
        Gadget as "RegistryGadget" { id: u32 }
    }

    #[test]
    fn test_lookup_prefers_type_over_array_and_pointer() {
        let array = <[Gadget; 2]>::descriptor();
        let pointer = <*const Gadget>::descriptor();
        assert!(!is_registered::<Gadget>());

        let found = lookup("RegistryGadget").unwrap();
        assert_eq!(found.kind, Kind::Record);
        assert!(is_registered::<Gadget>());
        assert!(std::ptr::eq(found, Gadget::descriptor()));

        let kinds: std::vec::Vec<Kind> = lookup_all("RegistryGadget").iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [Kind::Array, Kind::Pointer, Kind::Record]);
        assert!(std::ptr::eq(array.target().unwrap(), found));
        assert!(std::ptr::eq(pointer.target().unwrap(), found));
    }

    #[test]
    fn test_lookup_unknown() {
        assert_eq!(
            lookup("Unregistered").unwrap_err(),
            Error::UnknownType {
                name: "Unregistered".to_string()
            }
        );
    }
}

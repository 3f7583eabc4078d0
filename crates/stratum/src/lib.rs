//! `stratum`: static type reflection and allocator-parameterized containers
//!
//! `stratum` provides:
//!
//! - **Capability constraints**: structural properties (copyable, trivial,
//!   cloneable...) as trait bounds and as a runtime [`Capabilities`] set
//! - **Type lists**: compile-time heterogeneous lists with `All`, `Any` and
//!   ordered iteration
//! - **Reflection**: named, kind-tagged descriptors for primitives, pointers,
//!   arrays, records and enums, kept in a process-wide [`registry`]
//! - **Visitors**: in-place traversal of record fields and enumeration of
//!   enum cases, statically typed or dispatched by kind
//! - **Containers**: [`Vec`] over a pluggable [`Allocator`] strategy, the
//!   non-owning [`Slice`] view and the reflected [`Pair`]
//!
//! # Example
//!
//! ```
//! use stratum::reflect::visit::{FieldVisitor, iterate_record};
//! use stratum::reflect::Reflect;
//! use stratum::{Vec, reflect_record};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: f32,
//! }
//!
//! reflect_record! {
//!     Point { x: i32, y: f32 }
//! }
//!
//! struct Collect(std::vec::Vec<String>);
//! impl FieldVisitor for Collect {
//!     fn apply<T: Reflect>(&mut self, name: &'static str, _field: &mut T) {
//!         self.0.push(format!("{name}: {}", T::NAME));
//!     }
//! }
//!
//! let mut points: Vec<Point> = Vec::make(2);
//! let mut names = Collect(std::vec::Vec::new());
//! iterate_record(&mut names, &mut points[0]);
//! assert_eq!(names.0, ["x: i32", "y: f32"]);
//! ```

pub mod capability;
pub mod error;
pub mod pair;
pub mod reflect;
pub mod registry;
pub mod slice;
pub mod typelist;
pub mod vec;

pub use capability::{Capabilities, Capability};
pub use error::{Error, Result};
pub use pair::Pair;
pub use slice::Slice;
pub use vec::Vec;

pub use stratum_mem::{AllocError, Allocator, System};
#[cfg(feature = "arena")]
pub use stratum_mem::{Arena, ArenaStats, arena_stats};
#[cfg(feature = "tracking")]
pub use stratum_mem::{Counting, CountingStats, counting_stats};

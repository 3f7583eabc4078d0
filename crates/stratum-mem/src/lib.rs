//! Allocator strategies for `stratum` containers.
//!
//! A strategy is a zero-sized, stateless type implementing [`Allocator`]. It
//! is selected at the type level (`Vec<T, System>`), never stored per
//! container, so swapping strategies costs nothing at runtime.
//!
//! - [`System`]: general purpose, backed by `std::alloc`
//! - [`Arena`]: process-wide bump arena, `free` is a no-op (feature `arena`)
//! - [`Counting`]: wraps another strategy and counts traffic per thread
//!   (feature `tracking`)
//!
//! # Example
//!
//! ```
//! use std::alloc::Layout;
//! use stratum_mem::{Allocator, System};
//!
//! let layout = Layout::new::<u64>();
//! let ptr = System::alloc(layout);
//! assert!(!ptr.is_null());
//! unsafe { System::free(ptr) };
//! ```

pub mod alloc;
#[cfg(feature = "arena")]
pub mod arena;
#[cfg(feature = "tracking")]
pub mod counting;

pub use alloc::{AllocError, Allocator, System};
#[cfg(feature = "arena")]
pub use arena::{Arena, ArenaStats, arena_stats};
#[cfg(feature = "tracking")]
pub use counting::{Counting, CountingStats, counting_stats};

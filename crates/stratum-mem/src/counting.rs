//! Counting wrapper strategy.
//!
//! [`Counting<A>`] forwards to `A` and records every successful allocation
//! and every non-null free. Counters are kept per thread: a container that
//! is created and dropped on one thread shows up only in that thread's
//! [`counting_stats`], which keeps concurrently running tests independent.
//!
//! ```
//! use std::alloc::Layout;
//! use stratum_mem::{Allocator, Counting, System, counting_stats};
//!
//! let before = counting_stats();
//! let ptr = Counting::<System>::alloc(Layout::new::<u64>());
//! unsafe { Counting::<System>::free(ptr) };
//!
//! let delta = counting_stats().since(&before);
//! assert_eq!(delta.allocations, 1);
//! assert_eq!(delta.frees, 1);
//! ```

use std::alloc::Layout;
use std::cell::Cell;
use std::marker::PhantomData;

use crate::alloc::{Allocator, System};

/// Per-thread allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingStats {
    /// Successful `alloc` calls.
    pub allocations: usize,
    /// `free` calls with a non-null pointer.
    pub frees: usize,
    /// Bytes requested by successful `alloc` calls.
    pub bytes_requested: usize,
    /// `alloc` calls that returned null.
    pub failures: usize,
}

impl CountingStats {
    /// Blocks allocated and not yet freed.
    ///
    /// A block freed on another thread than the one that allocated it is
    /// counted as a free there, so a thread may see more frees than
    /// allocations. Such a thread reports zero.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.allocations.saturating_sub(self.frees)
    }

    /// Counter growth since an earlier snapshot.
    #[must_use]
    pub const fn since(&self, earlier: &CountingStats) -> CountingStats {
        CountingStats {
            allocations: self.allocations.saturating_sub(earlier.allocations),
            frees: self.frees.saturating_sub(earlier.frees),
            bytes_requested: self.bytes_requested.saturating_sub(earlier.bytes_requested),
            failures: self.failures.saturating_sub(earlier.failures),
        }
    }
}

thread_local! {
    static STATS: Cell<CountingStats> = const { Cell::new(CountingStats {
        allocations: 0,
        frees: 0,
        bytes_requested: 0,
        failures: 0,
    }) };
}

fn update(f: impl FnOnce(&mut CountingStats)) {
    STATS.with(|cell| {
        let mut stats = cell.get();
        f(&mut stats);
        cell.set(stats);
    });
}

/// Counters for the calling thread.
#[must_use]
pub fn counting_stats() -> CountingStats {
    STATS.with(Cell::get)
}

/// Strategy that counts traffic before forwarding to `A`.
pub struct Counting<A: Allocator = System>(PhantomData<A>);

impl<A: Allocator> Allocator for Counting<A> {
    fn alloc(layout: Layout) -> *mut u8 {
        let ptr = A::alloc(layout);
        update(|stats| {
            if ptr.is_null() {
                stats.failures += 1;
            } else {
                stats.allocations += 1;
                stats.bytes_requested += layout.size();
            }
        });
        ptr
    }

    unsafe fn free(ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        update(|stats| stats.frees += 1);
        // SAFETY: forwarded caller contract.
        unsafe { A::free(ptr) };
    }
}

//! Process-wide bump arena strategy.
//!
//! [`Arena`] hands out memory from a chain of chunks shared by every thread.
//! Blocks are never returned individually: [`Allocator::free`] is a no-op and
//! the memory lives until the process exits. This suits containers that are
//! built once and kept for the whole program, such as lookup tables filled
//! during start-up.
//!
//! Allocation bumps an atomic pointer inside the current chunk with a CAS
//! loop; a new chunk is linked in under a mutex only when the current one is
//! exhausted.
//!
//! # Example
//!
//! ```
//! use std::alloc::Layout;
//! use stratum_mem::{Allocator, Arena, arena_stats};
//!
//! let before = arena_stats().total_allocated;
//! let ptr = Arena::alloc(Layout::new::<[u64; 4]>());
//! assert!(!ptr.is_null());
//! assert!(arena_stats().total_allocated >= before + 32);
//! ```

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use stratum_log::{debug, trace};

use crate::alloc::Allocator;

/// Alignment of every chunk and the minimum alignment of every block.
const CHUNK_ALIGNMENT: usize = 16;

/// Size of the first chunk.
pub const INITIAL_CHUNK_SIZE: usize = 64 * 1024;

/// Upper bound for regular chunk growth. Larger requests get a dedicated
/// chunk of exactly the size they need.
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Snapshot of arena usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes handed out, alignment padding excluded.
    pub total_allocated: usize,
    /// Number of chunks linked into the arena.
    pub chunk_count: usize,
    /// Combined capacity of all chunks in bytes.
    pub total_capacity: usize,
}

/// One contiguous region with an atomic bump pointer.
struct Chunk {
    start: NonNull<u8>,
    ptr: AtomicPtr<u8>,
    end: usize,
    capacity: usize,
}

impl Chunk {
    fn new(size: usize) -> Option<NonNull<Chunk>> {
        let layout = Layout::from_size_align(size, CHUNK_ALIGNMENT).ok()?;
        // SAFETY: chunk sizes are never zero.
        let start = NonNull::new(unsafe { alloc::alloc(layout) })?;

        let chunk = Box::new(Chunk {
            start,
            ptr: AtomicPtr::new(start.as_ptr()),
            end: start.addr().get() + size,
            capacity: size,
        });
        Some(NonNull::from(Box::leak(chunk)))
    }

    /// Bumps the pointer by `size` bytes aligned to `align`.
    fn try_alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        loop {
            let current = self.ptr.load(Ordering::Acquire);
            let aligned = current.addr().checked_add(align - 1)? & !(align - 1);
            let next = aligned.checked_add(size)?;
            if next > self.end {
                return None;
            }

            if self
                .ptr
                .compare_exchange_weak(
                    current,
                    current.with_addr(next),
                    Ordering::Release,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                // SAFETY: `aligned` lies in `[start, end)` and keeps the
                // provenance of the chunk's base pointer.
                return Some(unsafe { NonNull::new_unchecked(current.with_addr(aligned)) });
            }
        }
    }

    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.end - self.ptr.load(Ordering::Relaxed).addr()
    }
}

struct BumpArena {
    chunks: Mutex<std::vec::Vec<NonNull<Chunk>>>,
    current: AtomicPtr<Chunk>,
    next_size: AtomicUsize,
    total_allocated: AtomicUsize,
}

// SAFETY: chunks are only mutated through atomics or under the mutex and
// are never freed while the arena is alive.
unsafe impl Send for BumpArena {}
unsafe impl Sync for BumpArena {}

impl BumpArena {
    fn new() -> Self {
        BumpArena {
            chunks: Mutex::new(std::vec::Vec::new()),
            current: AtomicPtr::new(ptr::null_mut()),
            next_size: AtomicUsize::new(INITIAL_CHUNK_SIZE),
            total_allocated: AtomicUsize::new(0),
        }
    }

    fn alloc(&self, layout: Layout) -> *mut u8 {
        let size = layout.size();
        let align = layout.align().max(CHUNK_ALIGNMENT);

        loop {
            let current = self.current.load(Ordering::Acquire);
            if !current.is_null() {
                // SAFETY: chunks are leaked and live as long as the arena.
                let chunk = unsafe { &*current };
                if let Some(block) = chunk.try_alloc(size, align) {
                    self.total_allocated.fetch_add(size, Ordering::Relaxed);
                    trace!("arena alloc: {} bytes at {:p}", size, block);
                    return block.as_ptr();
                }
            }

            if !self.grow(current, size + align) {
                return ptr::null_mut();
            }
        }
    }

    /// Links a new chunk unless another thread already replaced `seen`.
    #[cold]
    fn grow(&self, seen: *mut Chunk, min_size: usize) -> bool {
        let Ok(mut chunks) = self.chunks.lock() else {
            return false;
        };
        if self.current.load(Ordering::Acquire) != seen {
            return true;
        }

        let regular = self.next_size.load(Ordering::Relaxed);
        let size = regular.max(min_size);
        let Some(chunk) = Chunk::new(size) else {
            return false;
        };

        debug!("arena: new chunk of {} bytes (chunk #{})", size, chunks.len() + 1);
        chunks.push(chunk);
        self.next_size
            .store((regular * 2).min(MAX_CHUNK_SIZE), Ordering::Relaxed);
        self.current.store(chunk.as_ptr(), Ordering::Release);
        true
    }

    fn stats(&self) -> ArenaStats {
        let chunks = self.chunks.lock().unwrap_or_else(|poison| poison.into_inner());
        ArenaStats {
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            chunk_count: chunks.len(),
            // SAFETY: every recorded chunk is alive.
            total_capacity: chunks.iter().map(|c| unsafe { c.as_ref().capacity }).sum(),
        }
    }

    #[cfg(test)]
    fn current_remaining(&self) -> Option<usize> {
        let current = self.current.load(Ordering::Acquire);
        // SAFETY: see `alloc`.
        (!current.is_null()).then(|| unsafe { (*current).remaining() })
    }
}

impl Drop for BumpArena {
    fn drop(&mut self) {
        let chunks = self.chunks.get_mut().unwrap_or_else(|poison| poison.into_inner());
        for chunk in chunks.drain(..) {
            // SAFETY: each chunk was leaked from a `Box` in `Chunk::new` and
            // owns a block allocated with exactly this layout.
            unsafe {
                let chunk = Box::from_raw(chunk.as_ptr());
                alloc::dealloc(
                    chunk.start.as_ptr(),
                    Layout::from_size_align_unchecked(chunk.capacity, CHUNK_ALIGNMENT),
                );
            }
        }
    }
}

fn global() -> &'static BumpArena {
    static ARENA: OnceLock<BumpArena> = OnceLock::new();
    ARENA.get_or_init(BumpArena::new)
}

/// Usage of the process-wide arena behind [`Arena`].
#[must_use]
pub fn arena_stats() -> ArenaStats {
    global().stats()
}

/// Strategy that bump-allocates from the process-wide arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arena;

impl Allocator for Arena {
    fn alloc(layout: Layout) -> *mut u8 {
        global().alloc(layout)
    }

    unsafe fn free(_ptr: *mut u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_are_aligned_and_disjoint() {
        let arena = BumpArena::new();
        let a = arena.alloc(Layout::from_size_align(3, 1).unwrap());
        let b = arena.alloc(Layout::from_size_align(8, 64).unwrap());
        let c = arena.alloc(Layout::from_size_align(5, 4).unwrap());

        assert_eq!(b.addr() % 64, 0);
        assert!(a.addr() + 3 <= b.addr());
        assert!(b.addr() + 8 <= c.addr());
    }

    #[test]
    fn test_oversized_request_gets_own_chunk() {
        let arena = BumpArena::new();
        arena.alloc(Layout::new::<u8>());
        let big = MAX_CHUNK_SIZE * 2;
        let ptr = arena.alloc(Layout::from_size_align(big, 16).unwrap());

        assert!(!ptr.is_null());
        let stats = arena.stats();
        assert_eq!(stats.chunk_count, 2);
        assert!(stats.total_capacity >= INITIAL_CHUNK_SIZE + big);
    }

    #[test]
    fn test_chunk_growth_doubles() {
        let arena = BumpArena::new();
        for _ in 0..3 {
            arena.alloc(Layout::from_size_align(INITIAL_CHUNK_SIZE, 16).unwrap());
        }
        let stats = arena.stats();
        assert_eq!(stats.chunk_count, 2);
        // The first chunk is stretched by the alignment slack of the request.
        assert_eq!(stats.total_capacity, INITIAL_CHUNK_SIZE * 3 + 16);
    }

    #[test]
    fn test_remaining_shrinks() {
        let arena = BumpArena::new();
        assert_eq!(arena.current_remaining(), None);
        arena.alloc(Layout::new::<[u64; 2]>());
        let left = arena.current_remaining().unwrap();
        arena.alloc(Layout::new::<[u8; 128]>());
        assert_eq!(arena.current_remaining().unwrap(), left - 128);
    }

    #[test]
    fn test_concurrent_allocation() {
        use std::sync::Arc;
        use std::thread;

        let arena = Arc::new(BumpArena::new());
        let handles: std::vec::Vec<_> = (0..8)
            .map(|i| {
                let arena = Arc::clone(&arena);
                thread::spawn(move || {
                    let blocks: std::vec::Vec<(*mut u64, u64)> = (0..256)
                        .map(|j| {
                            let ptr = arena.alloc(Layout::new::<u64>()).cast::<u64>();
                            unsafe { ptr.write(i * 1000 + j) };
                            (ptr, i * 1000 + j)
                        })
                        .collect();
                    blocks
                        .into_iter()
                        .map(|(ptr, value)| {
                            assert_eq!(unsafe { *ptr }, value);
                            ptr.addr()
                        })
                        .collect::<std::vec::Vec<_>>()
                })
            })
            .collect();

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            for addr in handle.join().unwrap() {
                assert!(seen.insert(addr), "block handed out twice");
            }
        }
    }

    #[test]
    fn test_strategy_uses_global_arena() {
        let before = arena_stats().total_allocated;
        let ptr = Arena::alloc(Layout::new::<u32>());
        assert!(!ptr.is_null());
        unsafe { Arena::free(ptr) };
        assert!(arena_stats().total_allocated >= before + 4);
    }
}

//! The [`Allocator`] strategy trait and the default [`System`] strategy.

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::{self, NonNull};

use stratum_log::trace;

/// A strategy returned null for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocation failed: out of memory")
    }
}

impl std::error::Error for AllocError {}

/// A stateless provider of raw memory blocks.
///
/// Strategies are selected by type and called through associated functions,
/// so an implementation must not depend on per-instance state. Any shared
/// bookkeeping lives in statics.
///
/// # Contract
///
/// - `alloc` returns a block of at least `layout.size()` bytes aligned to
///   `layout.align()`, or null on failure. It is never called with a
///   zero-sized layout by `stratum` containers.
/// - `free` accepts null and does nothing with it.
pub trait Allocator: 'static {
    /// Allocates a block for `layout`, or returns null.
    fn alloc(layout: Layout) -> *mut u8;

    /// Releases a block previously returned by [`Allocator::alloc`].
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a pointer obtained from `Self::alloc` that has
    /// not been freed yet.
    unsafe fn free(ptr: *mut u8);

    /// Like [`Allocator::alloc`], with the null sentinel turned into an error.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the strategy returns null.
    fn try_alloc(layout: Layout) -> Result<NonNull<u8>, AllocError> {
        NonNull::new(Self::alloc(layout)).ok_or(AllocError)
    }
}

/// Bookkeeping stored immediately before every [`System`] block.
#[derive(Clone, Copy)]
struct Header {
    /// Size of the underlying `std::alloc` block, header included.
    size: usize,
    /// Alignment of the underlying block.
    align: usize,
}

const HEADER_SIZE: usize = size_of::<Header>();

/// Offset from the start of the underlying block to the user pointer.
const fn header_offset(align: usize) -> usize {
    (HEADER_SIZE + align - 1) & !(align - 1)
}

/// General purpose strategy over the global `std::alloc` allocator.
///
/// `std::alloc::dealloc` needs the original layout, while [`Allocator::free`]
/// only receives the pointer, so every block carries a small header holding
/// the size and alignment it was created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct System;

impl Allocator for System {
    fn alloc(layout: Layout) -> *mut u8 {
        let align = layout.align().max(align_of::<Header>());
        let offset = header_offset(align);
        let Some(total) = offset.checked_add(layout.size()) else {
            return ptr::null_mut();
        };
        let Ok(block) = Layout::from_size_align(total, align) else {
            return ptr::null_mut();
        };

        // SAFETY: `block` has a nonzero size because `offset >= HEADER_SIZE`.
        let base = unsafe { alloc::alloc(block) };
        if base.is_null() {
            return base;
        }

        // SAFETY: `offset` lies inside the block and is a multiple of
        // `align`, which is at least the header alignment. The header slot
        // `[user - HEADER_SIZE, user)` lies inside `[base, user)`.
        unsafe {
            let user = base.add(offset);
            ptr::write(
                user.sub(HEADER_SIZE).cast::<Header>(),
                Header { size: total, align },
            );
            trace!("system alloc: {} bytes (align {}) at {:p}", layout.size(), align, user);
            user
        }
    }

    unsafe fn free(ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }

        // SAFETY: the caller guarantees `ptr` came from `System::alloc`, so
        // a header sits right before it and describes the original block.
        unsafe {
            let header = ptr::read(ptr.sub(HEADER_SIZE).cast::<Header>());
            let base = ptr.sub(header_offset(header.align));
            trace!("system free: {:p}", ptr);
            alloc::dealloc(
                base,
                Layout::from_size_align_unchecked(header.size, header.align),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_alloc_respects_alignment() {
        for align in [1, 2, 4, 8, 16, 32, 64, 4096] {
            let layout = Layout::from_size_align(24, align).unwrap();
            let ptr = System::alloc(layout);
            assert!(!ptr.is_null());
            assert_eq!(ptr.addr() % align, 0, "misaligned for {align}");
            unsafe { System::free(ptr) };
        }
    }

    #[test]
    fn test_system_block_is_writable() {
        let layout = Layout::array::<u32>(64).unwrap();
        let ptr = System::alloc(layout).cast::<u32>();

        unsafe {
            for i in 0..64 {
                ptr.add(i).write(i as u32 * 3);
            }
            for i in 0..64 {
                assert_eq!(*ptr.add(i), i as u32 * 3);
            }
            System::free(ptr.cast());
        }
    }

    #[test]
    fn test_system_free_null_is_noop() {
        unsafe { System::free(ptr::null_mut()) };
    }

    #[test]
    fn test_try_alloc_reports_overflow() {
        // Valid on its own, too large once the header is added.
        let layout = Layout::from_size_align(isize::MAX as usize - 8, 8).unwrap();
        assert_eq!(System::try_alloc(layout), Err(AllocError));
    }

    #[test]
    fn test_header_offset() {
        assert_eq!(header_offset(8), 16);
        assert_eq!(header_offset(16), 16);
        assert_eq!(header_offset(32), 32);
        assert_eq!(header_offset(4096), 4096);
    }

    #[test]
    fn test_alloc_error_display() {
        assert_eq!(AllocError.to_string(), "allocation failed: out of memory");
    }
}

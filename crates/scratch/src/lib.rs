//! Bump allocator for per-draw scratch memory.
//!
//! A [`Scratch`] hands out typed, zeroed slices carved from a borrowed byte arena. Every
//! allocation is rounded up to [`ALIGN`] bytes, so consecutive allocations stay aligned for any
//! of the plain-old-data types the tessellator stores in them. Nothing is ever freed
//! individually: the arena is reclaimed as a whole when the [`Scratch`] is dropped.
use easyerr::Error;
use zerocopy::{FromBytes, IntoBytes};

/// Alignment and size granularity of every allocation.
pub const ALIGN: usize = 16;

#[derive(Debug, Error)]
pub enum AllocError {
    #[error("scratch arena exhausted: requested {requested} bytes but only {remaining} remain")]
    Exhausted { requested: usize, remaining: usize },
    #[error("allocation size overflows")]
    Overflow,
    #[error("allocation is not suitably aligned for the requested type")]
    Misaligned,
}

/// A bump allocator over a borrowed arena.
pub struct Scratch<'arena> {
    free: &'arena mut [u8],
    used: usize,
    capacity: usize,
}

impl<'arena> Scratch<'arena> {
    /// Creates a new allocator over the given arena. The first bytes of the arena may be skipped
    /// so that allocations start at an [`ALIGN`] boundary.
    pub fn new(arena: &'arena mut [u8]) -> Self {
        let skip = arena.as_ptr().align_offset(ALIGN).min(arena.len());
        let (_, free) = arena.split_at_mut(skip);
        let capacity = free.len();

        Self {
            free,
            used: 0,
            capacity,
        }
    }

    /// Allocates a zeroed slice of `count` elements of type `T`.
    ///
    /// The returned slice lives as long as the arena, so multiple allocations may be held at the
    /// same time.
    pub fn allocate<T>(&mut self, count: usize) -> Result<&'arena mut [T], AllocError>
    where
        T: FromBytes + IntoBytes,
    {
        if align_of::<T>() > ALIGN {
            return Err(AllocError::Misaligned);
        }

        let bytes = count
            .checked_mul(size_of::<T>())
            .ok_or(AllocError::Overflow)?;
        let rounded = bytes
            .checked_next_multiple_of(ALIGN)
            .ok_or(AllocError::Overflow)?;

        if rounded > self.free.len() {
            return Err(AllocError::Exhausted {
                requested: rounded,
                remaining: self.free.len(),
            });
        }

        let free = std::mem::take(&mut self.free);
        let (allocation, rest) = free.split_at_mut(rounded);
        self.free = rest;
        self.used += rounded;

        let allocation = &mut allocation[..bytes];
        allocation.fill(0);

        <[T]>::mut_from_bytes(allocation).map_err(|_| AllocError::Misaligned)
    }

    /// How many bytes have been handed out so far, including alignment padding.
    #[inline(always)]
    pub fn used(&self) -> usize {
        self.used
    }

    /// How many bytes are still available.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.free.len()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

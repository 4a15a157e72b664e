use core::ops::Range;

use bytemuck::{Pod, Zeroable};

/// Largest alignment a reservation may request; the arena base satisfies it.
///
/// Payloads are restricted to types whose alignment does not exceed this.
pub const ARENA_ALIGN: usize = 8;

/// Rounds `offset` up to a multiple of `align` (a power of two).
#[inline]
pub const fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

/// Byte range inside a command buffer's arena.
///
/// Payloads reference auxiliary data (vertex arrays, strings) through these
/// instead of pointers, so a payload stays meaningful wherever the arena
/// lives. Only valid until the owning buffer is next reset.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ArenaSlice {
    pub offset: u32,
    /// Length in bytes.
    pub len: u32,
}

impl ArenaSlice {
    pub const EMPTY: Self = Self { offset: 0, len: 0 };

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    fn range(self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.len as usize
    }
}

/// Fixed-capacity bump allocator backing a command buffer.
///
/// Storage is a `u64` vector so the base address satisfies `ARENA_ALIGN`.
/// Every reservation is zeroed before it is handed out. Padding is inserted
/// in front of a reservation only when its alignment needs it, so a request
/// fits whenever its own bytes fit.
#[derive(Debug)]
pub(crate) struct Arena {
    words: Vec<u64>,
    capacity: usize,
    cursor: usize,
}

impl Arena {
    #[track_caller]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity <= u32::MAX as usize,
            "command arena capacity {capacity} exceeds u32 offsets"
        );
        Self {
            words: vec![0; capacity.div_ceil(ARENA_ALIGN)],
            capacity,
            cursor: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn used(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub(crate) fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Reserves `size` zeroed bytes at an `align`-aligned offset and returns
    /// the offset.
    ///
    /// # Panics
    /// Panics when the aligned reservation does not fit in the remaining
    /// capacity.
    #[track_caller]
    pub(crate) fn reserve(&mut self, size: usize, align: usize) -> usize {
        debug_assert!(align.is_power_of_two() && align <= ARENA_ALIGN);
        let offset = align_up(self.cursor, align);
        let end = offset.checked_add(size).filter(|&end| end <= self.capacity);

        let Some(end) = end else {
            panic!(
                "command arena overflow: {size} bytes (align {align}) requested with {} of {} bytes used",
                self.cursor, self.capacity
            );
        };

        self.bytes_mut()[offset..end].fill(0);
        self.cursor = end;
        offset
    }

    #[inline]
    pub(crate) fn view(&self) -> ArenaView<'_> {
        ArenaView { bytes: self.bytes() }
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.capacity]
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..self.capacity]
    }

    #[inline]
    pub(crate) fn slice_mut(&mut self, slice: ArenaSlice) -> &mut [u8] {
        &mut self.bytes_mut()[slice.range()]
    }
}

/// Read-only view of an arena, handed to dispatchers to resolve
/// [`ArenaSlice`] references.
#[derive(Debug, Copy, Clone)]
pub struct ArenaView<'a> {
    bytes: &'a [u8],
}

impl<'a> ArenaView<'a> {
    /// Raw bytes of `slice`.
    ///
    /// # Panics
    /// Panics if `slice` lies outside the arena.
    #[inline]
    pub fn bytes(&self, slice: ArenaSlice) -> &'a [u8] {
        &self.bytes[slice.range()]
    }

    /// Reinterprets `slice` as `[T]`.
    ///
    /// # Panics
    /// Panics if the slice is out of bounds, misaligned for `T`, or not a
    /// whole number of `T`s. Slices produced by
    /// [`CommandBuffer::alloc_slice`](super::CommandBuffer::alloc_slice)
    /// always satisfy this.
    #[inline]
    pub fn slice<T: Pod>(&self, slice: ArenaSlice) -> &'a [T] {
        bytemuck::cast_slice(self.bytes(slice))
    }

    /// Interprets `slice` as UTF-8; invalid data reads as an empty string.
    #[inline]
    pub fn str(&self, slice: ArenaSlice) -> &'a str {
        std::str::from_utf8(self.bytes(slice)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_power_of_two() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(12, 4), 12);
        assert_eq!(align_up(13, 2), 14);
    }

    #[test]
    fn reserve_is_zeroed_after_reset() {
        let mut arena = Arena::with_capacity(64);
        let a = arena.reserve(16, 8);
        arena.bytes_mut()[a..a + 16].fill(0xAB);

        arena.reset();
        let b = arena.reserve(16, 8);
        assert_eq!(a, b);
        assert!(arena.bytes()[b..b + 16].iter().all(|&x| x == 0));
    }

    #[test]
    fn reserve_exactly_fills_capacity() {
        let mut arena = Arena::with_capacity(32);
        arena.reserve(16, 8);
        arena.reserve(16, 8);
        assert_eq!(arena.used(), 32);
    }

    #[test]
    fn unpadded_sizes_fill_capacity() {
        let mut arena = Arena::with_capacity(44);
        assert_eq!(arena.reserve(44, 4), 0);
        assert_eq!(arena.used(), 44);

        let mut arena = Arena::with_capacity(24);
        assert_eq!(arena.reserve(12, 4), 0);
        assert_eq!(arena.reserve(12, 4), 12);
        assert_eq!(arena.used(), 24);
    }

    #[test]
    fn padding_is_charged_before_aligned_reservations() {
        let mut arena = Arena::with_capacity(32);
        assert_eq!(arena.reserve(3, 1), 0);
        assert_eq!(arena.reserve(2, 2), 4);
        assert_eq!(arena.reserve(8, 8), 8);
        assert_eq!(arena.used(), 16);
    }

    #[test]
    #[should_panic(expected = "command arena overflow")]
    fn reserve_past_capacity_panics() {
        let mut arena = Arena::with_capacity(32);
        arena.reserve(24, 8);
        arena.reserve(9, 1);
    }

    #[test]
    fn view_reads_typed_slices() {
        let mut arena = Arena::with_capacity(64);
        let off = arena.reserve(8, 4);
        arena.bytes_mut()[off..off + 8].copy_from_slice(bytemuck::cast_slice(&[1.5f32, -2.0]));
        let slice = ArenaSlice { offset: off as u32, len: 8 };
        assert_eq!(arena.view().slice::<f32>(slice), &[1.5, -2.0]);
    }

    #[test]
    fn invalid_utf8_reads_empty() {
        let mut arena = Arena::with_capacity(8);
        let off = arena.reserve(2, 1);
        arena.bytes_mut()[off..off + 2].copy_from_slice(&[0xff, 0xfe]);
        assert_eq!(arena.view().str(ArenaSlice { offset: 0, len: 2 }), "");
    }
}

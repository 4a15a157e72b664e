use core::mem::{align_of, size_of};

use bytemuck::Pod;

use crate::config::CommandBufferConfig;
use crate::render::DrawContext;

use super::arena::{Arena, ArenaSlice, ArenaView, ARENA_ALIGN};
use super::SortKey;

/// Alignment of payloads registered through [`CommandBuffer::push_raw`].
pub const RAW_PAYLOAD_ALIGN: usize = 4;

/// Type-erased entry point for one recorded command.
///
/// Receives the draw context and a view of the command's payload bytes.
pub type Dispatcher = fn(&mut DrawContext<'_>, CommandPayload<'_>);

/// A fixed-size, plain-old-data command payload that knows how to execute
/// itself against a [`DrawContext`].
///
/// Implementing this trait is the extension point for new command kinds: the
/// buffer stores the payload bytes plus a monomorphised dispatcher, so no
/// central match over command types exists.
pub trait RenderCommand: Pod {
    fn execute(&self, ctx: &mut DrawContext<'_>, arena: ArenaView<'_>);
}

fn dispatch_command<C: RenderCommand>(ctx: &mut DrawContext<'_>, payload: CommandPayload<'_>) {
    payload.read::<C>().execute(ctx, payload.arena());
}

/// Payload bytes of one recorded command, as seen by its dispatcher.
#[derive(Debug, Copy, Clone)]
pub struct CommandPayload<'a> {
    arena: ArenaView<'a>,
    slice: ArenaSlice,
}

impl<'a> CommandPayload<'a> {
    /// Offset of the payload inside the arena.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.slice.offset
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.arena.bytes(self.slice)
    }

    /// Reinterprets the payload as `C`.
    ///
    /// # Panics
    /// Panics if the payload is shorter than `C`.
    #[inline]
    pub fn read<C: Pod>(&self) -> &'a C {
        bytemuck::from_bytes(&self.bytes()[..size_of::<C>()])
    }

    /// View of the whole arena, for resolving auxiliary data.
    #[inline]
    pub fn arena(&self) -> ArenaView<'a> {
        self.arena
    }
}

#[derive(Copy, Clone)]
struct CommandEntry {
    payload: ArenaSlice,
    dispatch: Dispatcher,
}

/// Arena-backed, type-erased render command stream.
///
/// Performance characteristics:
/// - all storage is allocated once in [`new`](Self::new); recording never allocates
/// - `push()` and `alloc()` are O(1) bump allocations
/// - `begin()` is O(1); stale bytes stay in the arena but are unreachable
///
/// Exceeding the byte capacity or the command limit is a sizing bug and
/// panics; there is no growth policy.
pub struct CommandBuffer {
    arena: Arena,
    entries: Vec<CommandEntry>,
    keys: Vec<SortKey>,
    indices: Vec<u32>,
    max_commands: usize,
}

impl CommandBuffer {
    pub fn new(byte_capacity: usize, max_commands: usize) -> Self {
        Self {
            arena: Arena::with_capacity(byte_capacity),
            entries: Vec::with_capacity(max_commands),
            keys: Vec::with_capacity(max_commands),
            indices: Vec::with_capacity(max_commands),
            max_commands,
        }
    }

    pub fn from_config(config: &CommandBufferConfig) -> Self {
        Self::new(config.byte_capacity, config.max_commands)
    }

    /// Starts a new recording: forgets every command and arena allocation.
    pub fn begin(&mut self) {
        self.arena.reset();
        self.entries.clear();
        self.keys.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn max_commands(&self) -> usize {
        self.max_commands
    }

    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.arena.used()
    }

    #[inline]
    pub fn byte_capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Registers a command of `size` payload bytes and returns them, zeroed,
    /// for the caller to fill in. The bytes start at a
    /// [`RAW_PAYLOAD_ALIGN`]-aligned offset.
    #[track_caller]
    pub fn push_raw(&mut self, size: usize, dispatch: Dispatcher) -> &mut [u8] {
        self.push_raw_keyed(SortKey::DEFAULT, size, dispatch)
    }

    #[track_caller]
    pub fn push_raw_keyed(&mut self, key: SortKey, size: usize, dispatch: Dispatcher) -> &mut [u8] {
        self.register(key, size, RAW_PAYLOAD_ALIGN, dispatch)
    }

    #[track_caller]
    fn register(&mut self, key: SortKey, size: usize, align: usize, dispatch: Dispatcher) -> &mut [u8] {
        assert!(
            self.entries.len() < self.max_commands,
            "command buffer full: limit of {} commands reached",
            self.max_commands
        );

        let offset = self.arena.reserve(size, align);
        let payload = ArenaSlice { offset: offset as u32, len: size as u32 };

        self.indices.push(self.entries.len() as u32);
        self.entries.push(CommandEntry { payload, dispatch });
        self.keys.push(key);

        self.arena.slice_mut(payload)
    }

    /// Records `cmd` and returns the stored copy for further edits.
    #[track_caller]
    pub fn push<C: RenderCommand>(&mut self, cmd: C) -> &mut C {
        self.push_keyed(SortKey::DEFAULT, cmd)
    }

    #[track_caller]
    pub fn push_keyed<C: RenderCommand>(&mut self, key: SortKey, cmd: C) -> &mut C {
        const { assert!(align_of::<C>() <= ARENA_ALIGN, "command payload is over-aligned for the arena") };

        let bytes = self.register(key, size_of::<C>(), align_of::<C>(), dispatch_command::<C>);
        let slot: &mut C = bytemuck::from_bytes_mut(bytes);
        *slot = cmd;
        slot
    }

    /// Reserves `size` zeroed bytes of auxiliary data, aligned to
    /// [`ARENA_ALIGN`]. No command is registered.
    #[track_caller]
    pub fn alloc(&mut self, size: usize) -> ArenaSlice {
        self.alloc_aligned(size, ARENA_ALIGN)
    }

    #[track_caller]
    fn alloc_aligned(&mut self, size: usize, align: usize) -> ArenaSlice {
        let offset = self.arena.reserve(size, align);
        ArenaSlice { offset: offset as u32, len: size as u32 }
    }

    /// Copies `data` into the arena.
    #[track_caller]
    pub fn alloc_slice<T: Pod>(&mut self, data: &[T]) -> ArenaSlice {
        const { assert!(align_of::<T>() <= ARENA_ALIGN, "element type is over-aligned for the arena") };

        let bytes: &[u8] = bytemuck::cast_slice(data);
        let slice = self.alloc_aligned(bytes.len(), align_of::<T>());
        self.arena.slice_mut(slice).copy_from_slice(bytes);
        slice
    }

    #[track_caller]
    pub fn alloc_str(&mut self, text: &str) -> ArenaSlice {
        self.alloc_slice(text.as_bytes())
    }

    /// Mutable access to a previous [`alloc`](Self::alloc) reservation.
    pub fn slice_mut<T: Pod>(&mut self, slice: ArenaSlice) -> &mut [T] {
        bytemuck::cast_slice_mut(self.arena.slice_mut(slice))
    }

    /// Orders execution by sort key, keeping push order among equal keys.
    pub fn sort(&mut self) {
        let keys = &self.keys;
        self.indices.sort_by_key(|&i| keys[i as usize]);
    }

    /// Execution order as indices into push order.
    #[inline]
    pub fn execution_order(&self) -> &[u32] {
        &self.indices
    }

    /// Payload of the `index`-th pushed command.
    pub fn payload(&self, index: usize) -> Option<CommandPayload<'_>> {
        self.entries.get(index).map(|e| CommandPayload {
            arena: self.arena.view(),
            slice: e.payload,
        })
    }

    /// Invokes every command's dispatcher in execution order.
    pub fn execute(&self, ctx: &mut DrawContext<'_>) {
        let arena = self.arena.view();
        for &index in &self.indices {
            let entry = self.entries[index as usize];
            (entry.dispatch)(ctx, CommandPayload { arena, slice: entry.payload });
        }
        log::trace!(
            "executed {} commands ({} of {} arena bytes)",
            self.entries.len(),
            self.arena.used(),
            self.arena.capacity()
        );
    }
}

impl core::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("commands", &self.entries.len())
            .field("max_commands", &self.max_commands)
            .field("bytes_used", &self.arena.used())
            .field("byte_capacity", &self.arena.capacity())
            .finish()
    }
}

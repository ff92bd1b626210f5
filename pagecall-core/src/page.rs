//! The parameter page.
//!
//! A page is a fixed-capacity array of 64-bit slots shared between the host
//! and the adapter. It doubles as an indirection table for native handles and
//! as the output mailbox of every operation.

/// Slot count of the standard page layout.
pub const PAGE_CAPACITY: usize = 512;

/// What a slot value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotKind {
    /// Zero sentinel: no handle.
    #[default]
    Empty,
    /// Plain number stored by the host.
    Integer,
    /// Heap block obtained from the platform allocator.
    Pointer,
    /// Open file descriptor.
    Descriptor,
    /// Base address of a memory mapping.
    Mapping,
}

/// Storage the dispatcher reads handles from and writes outputs to.
///
/// Callers only hand out indices that passed a range check against
/// [`Slots::capacity`].
pub trait Slots {
    fn capacity(&self) -> usize;

    fn load(&self, index: usize) -> u64;

    fn store(&mut self, index: usize, value: u64, kind: SlotKind);

    /// Tag of a slot, or `None` when the storage carries no tags.
    fn kind(&self, index: usize) -> Option<SlotKind>;
}

/// Host-owned, tagged page.
#[derive(Debug, Clone)]
pub struct ParamPage {
    slots: Box<[u64]>,
    kinds: Box<[SlotKind]>,
}

impl Default for ParamPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamPage {
    pub fn new() -> Self {
        Self::with_capacity(PAGE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity].into_boxed_slice(),
            kinds: vec![SlotKind::Empty; capacity].into_boxed_slice(),
        }
    }

    pub fn get(&self, index: usize) -> Option<u64> {
        self.slots.get(index).copied()
    }

    /// Store a plain number, as a host does before passing its index as a
    /// relative input.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn set(&mut self, index: usize, value: u64) -> bool {
        let kind = if value == 0 { SlotKind::Empty } else { SlotKind::Integer };
        self.set_handle(index, value, kind)
    }

    /// Store a value with an explicit tag.
    pub fn set_handle(&mut self, index: usize, value: u64, kind: SlotKind) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        Slots::store(self, index, value, kind);
        true
    }

    pub fn slot_kind(&self, index: usize) -> Option<SlotKind> {
        self.kinds.get(index).copied()
    }

    /// Zero every slot. Handles still held are not released.
    pub fn clear(&mut self) {
        self.slots.fill(0);
        self.kinds.fill(SlotKind::Empty);
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.slots
    }
}

impl Slots for ParamPage {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn load(&self, index: usize) -> u64 {
        self.slots[index]
    }

    fn store(&mut self, index: usize, value: u64, kind: SlotKind) {
        self.slots[index] = value;
        self.kinds[index] = if value == 0 { SlotKind::Empty } else { kind };
    }

    fn kind(&self, index: usize) -> Option<SlotKind> {
        Some(self.kinds[index])
    }
}

/// Untagged view over host storage, as handed over through the C ABI.
pub struct RawPage<'a> {
    slots: &'a mut [u64],
}

impl<'a> RawPage<'a> {
    pub fn new(slots: &'a mut [u64]) -> Self {
        Self { slots }
    }
}

impl Slots for RawPage<'_> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn load(&self, index: usize) -> u64 {
        self.slots[index]
    }

    fn store(&mut self, index: usize, value: u64, _kind: SlotKind) {
        self.slots[index] = value;
    }

    fn kind(&self, _index: usize) -> Option<SlotKind> {
        None
    }
}

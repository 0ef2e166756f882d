use std::fmt;

/// One cross-reference table entry.
///
/// For an in-use slot `offset` is the byte position of the object body, or
/// 0 while the identity is reserved but unwritten. For a free slot it is
/// the number of the next free slot (0 ends the chain). Slot 0 is the head
/// of the free list and is never in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotRecord {
    pub offset: u64,
    pub generation: u16,
    pub in_use: bool,
    /// Changed since the store was opened; only dirty slots are emitted.
    pub dirty: bool,
}

impl SlotRecord {
    /// A freshly appended, reserved slot.
    pub(crate) fn reserved(generation: u16) -> Self {
        Self {
            offset: 0,
            generation,
            in_use: true,
            dirty: true,
        }
    }

    /// Reserved but not yet written.
    pub fn is_pending(&self) -> bool {
        self.in_use && self.offset == 0
    }

    /// The fixed-width, 20-byte table line for this slot.
    pub fn xref_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SlotRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.in_use { 'n' } else { 'f' };
        writeln!(f, "{:010} {:05} {} ", self.offset, self.generation, kind)
    }
}

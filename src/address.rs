/// The number of bits in a trace address
pub const ADDRESS_BITS: u32 = 32;

/// The three roles of an address, produced by [`AddressLayout::decompose`]
///
/// The offset locates a byte within a line and plays no part in the coherence logic; it is kept
/// here so the decomposition is total over the address bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressParts {
    pub tag: u32,
    pub set_index: u32,
    pub offset: u32,
}

/// Splits an address into a tag, a set index, and a block offset
///
/// The three fields are adjacent and non-overlapping, with the tag in the most significant bits.
/// Masks are precomputed once at construction so decomposition is two shifts and two ands
///
/// Decomposition is a pure function of the address; it never fails and performs no alignment or
/// validation beyond the widths fixed at construction
#[derive(Debug, Clone, Copy)]
pub struct AddressLayout {
    offset_bits: u32,
    index_bits: u32,
    offset_mask: u32,
    index_mask: u32,
}

impl AddressLayout {
    /// Creates a layout from the offset and index widths. The tag takes whatever remains of the
    /// address, so `offset_bits + index_bits` must leave at least one tag bit
    pub fn new(offset_bits: u32, index_bits: u32) -> Self {
        debug_assert!(offset_bits + index_bits < ADDRESS_BITS);
        Self {
            offset_bits,
            index_bits,
            offset_mask: (1 << offset_bits) - 1,
            index_mask: (1 << index_bits) - 1,
        }
    }

    pub fn decompose(&self, address: u32) -> AddressParts {
        AddressParts {
            tag: address >> (self.offset_bits + self.index_bits),
            set_index: (address >> self.offset_bits) & self.index_mask,
            offset: address & self.offset_mask,
        }
    }

    /// Rebuilds the address an `(tag, set_index)` pair maps to, with a zero offset. Used by tests
    /// and trace generation to target a specific set
    pub fn compose(&self, tag: u32, set_index: u32) -> u32 {
        (tag << (self.offset_bits + self.index_bits)) | (set_index << self.offset_bits)
    }

    pub fn tag_bits(&self) -> u32 {
        ADDRESS_BITS - self.offset_bits - self.index_bits
    }
}

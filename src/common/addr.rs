//! Address-to-cache-line translation.
//!
//! Pure and stateless: given a line size and set count, converts byte
//! addresses to line indices, line indices to set indices, and byte
//! ranges within a line to subblock dirty masks.

/// Translates byte addresses to cache-line and set indices for one
/// cache geometry.
///
/// `cl_size` must be a power of two (enforced at construction by the
/// graph builder, not here — `AddressCodec` itself never fails). `sets`
/// is typically also a power of two; when it is not, the set index
/// falls back to `line mod sets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressCodec {
    cl_size: usize,
    cl_bits: u32,
    sets: usize,
    sets_is_pow2: bool,
}

impl AddressCodec {
    /// Creates a codec for the given line size and set count.
    ///
    /// # Panics
    ///
    /// Panics if `cl_size` is zero or `sets` is zero — both are
    /// configuration invariants that must already have been checked by
    /// the graph builder before a codec is ever constructed.
    #[must_use]
    pub fn new(cl_size: usize, sets: usize) -> Self {
        assert!(cl_size > 0, "cl_size must be non-zero");
        assert!(sets > 0, "sets must be non-zero");
        Self {
            cl_size,
            cl_bits: cl_size.trailing_zeros(),
            sets,
            sets_is_pow2: sets.is_power_of_two(),
        }
    }

    /// Line size in bytes.
    #[must_use]
    pub fn cl_size(&self) -> usize {
        self.cl_size
    }

    /// Number of sets.
    #[must_use]
    pub fn sets(&self) -> usize {
        self.sets
    }

    /// The cache-line index containing `addr`.
    #[must_use]
    pub fn line_of(&self, addr: u64) -> u64 {
        addr >> self.cl_bits
    }

    /// The set index for a given cache-line index.
    #[must_use]
    pub fn set_of(&self, line: u64) -> usize {
        if self.sets_is_pow2 {
            (line & (self.sets as u64 - 1)) as usize
        } else {
            (line % self.sets as u64) as usize
        }
    }

    /// First byte address belonging to the same line as `addr`.
    #[must_use]
    pub fn line_start(&self, addr: u64) -> u64 {
        (addr >> self.cl_bits) << self.cl_bits
    }

    /// Last byte address belonging to the same line as `addr`.
    #[must_use]
    pub fn line_end(&self, addr: u64) -> u64 {
        self.line_start(addr) + self.cl_size as u64 - 1
    }

    /// The offset of `addr` within its line, in `[0, cl_size)`.
    #[must_use]
    pub fn offset_in_line(&self, addr: u64) -> usize {
        (addr & (self.cl_size as u64 - 1)) as usize
    }

    /// The subblock index of a byte offset within a line, given a
    /// subblock size that divides `cl_size`.
    #[must_use]
    pub fn subblock_index(&self, offset: usize, subblock_size: usize) -> usize {
        offset / subblock_size
    }

    /// Builds a dirty bitmask (one bit per subblock, LSB = subblock 0)
    /// for the byte range `[addr, addr + len)`, clipped to the single
    /// line containing `addr`.
    #[must_use]
    pub fn subblock_mask(&self, addr: u64, len: usize, subblock_size: usize) -> u64 {
        let start = self.offset_in_line(addr);
        let line_end = self.cl_size;
        let end = (start + len).min(line_end);
        let first_sb = start / subblock_size;
        let last_sb = end.saturating_sub(1) / subblock_size;
        let mut mask = 0u64;
        for sb in first_sb..=last_sb {
            mask |= 1u64 << sb;
        }
        mask
    }

    /// Splits a byte range `[addr, addr + len)` into `(line, bytes_in_line)`
    /// segments in ascending address order, one per cache line crossed.
    #[must_use]
    pub fn segments(&self, addr: u64, len: usize) -> Vec<(u64, usize, u64)> {
        if len == 0 {
            return Vec::new();
        }
        let mut segments = Vec::new();
        let mut remaining = len as u64;
        let mut cursor = addr;
        while remaining > 0 {
            let line = self.line_of(cursor);
            let offset = self.offset_in_line(cursor);
            let bytes_left_in_line = self.cl_size as u64 - offset as u64;
            let take = remaining.min(bytes_left_in_line);
            segments.push((line, take as usize, cursor));
            cursor += take;
            remaining -= take;
        }
        segments
    }
}

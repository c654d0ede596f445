//! DDR address mapping.
//!
//! Banks interleave at byte granularity (`bank = addr mod num_banks`) and
//! rows advance every `row_stride` bytes (`row = addr / row_stride`). The
//! controller and the DDR share one copy of this mapping so both sides
//! agree on which bank and row a request targets.

/// Fixed address-to-bank/row mapping.
#[derive(Debug, Clone, Copy)]
pub struct DdrMap {
    num_banks: usize,
    row_stride: u64,
}

impl DdrMap {
    /// Creates a mapping over `num_banks` banks with the given row stride.
    ///
    /// Both values are validated as positive at configuration time.
    pub fn new(num_banks: usize, row_stride: u64) -> Self {
        debug_assert!(num_banks > 0 && row_stride > 0);
        Self {
            num_banks,
            row_stride,
        }
    }

    /// Returns the bank the address interleaves into.
    #[inline]
    pub fn bank(&self, addr: u64) -> usize {
        (addr % self.num_banks as u64) as usize
    }

    /// Returns the DDR row the address falls in.
    #[inline]
    pub fn row(&self, addr: u64) -> u64 {
        addr / self.row_stride
    }

    /// Returns the number of banks.
    #[inline]
    pub fn num_banks(&self) -> usize {
        self.num_banks
    }
}

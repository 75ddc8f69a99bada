//! Word-addressed main memory with a checked access policy.

use crate::Fault;

/// Number of 16-bit words in main memory (addresses `0..0x8000`).
pub const MEMORY_WORDS: usize = 0x8000;

/// Flat word-addressed main memory, zero-initialized at construction.
///
/// Addresses are architecturally 16-bit, but only the low half of the address
/// space is backed; any access at or beyond [`MEMORY_WORDS`] is a
/// [`Fault::MemoryAccess`] rather than a silent wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Memory {
    words: Box<[u16]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Allocates a zeroed main-memory backing store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS].into_boxed_slice(),
        }
    }

    /// Reads the word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MemoryAccess`] when `addr` is outside backed memory.
    pub fn read(&self, addr: u16) -> Result<u16, Fault> {
        self.words
            .get(usize::from(addr))
            .copied()
            .ok_or(Fault::MemoryAccess { addr })
    }

    /// Writes the word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MemoryAccess`] when `addr` is outside backed memory.
    pub fn write(&mut self, addr: u16, value: u16) -> Result<(), Fault> {
        match self.words.get_mut(usize::from(addr)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Fault::MemoryAccess { addr }),
        }
    }

    /// Returns the words in the inclusive address range `low..=high`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MemoryAccess`] when either bound is outside backed
    /// memory or the range is reversed.
    pub fn range(&self, low: u16, high: u16) -> Result<&[u16], Fault> {
        if low > high {
            return Err(Fault::MemoryAccess { addr: high });
        }
        if usize::from(high) >= MEMORY_WORDS {
            return Err(Fault::MemoryAccess { addr: high });
        }
        Ok(&self.words[usize::from(low)..=usize::from(high)])
    }
}

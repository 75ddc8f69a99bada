use thiserror::Error;

/// Stable fault taxonomy for conditions the engine can report mid-cycle.
///
/// The original design leaves out-of-range addressing undefined; this core
/// resolves it as a reported fault rather than silent wrap. Undefined opcodes
/// fault only when the machine is configured strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// A computed address fell outside the fixed 0x8000-word memory.
    #[error("memory access at out-of-range address {addr:#06x}")]
    MemoryAccess {
        /// The faulting word address.
        addr: u16,
    },
    /// An unassigned 4-bit opcode was fetched while in strict mode.
    #[error("invalid opcode {opcode:#03x}")]
    InvalidOpcode {
        /// The unassigned opcode value (`0x8` or `0xD`).
        opcode: u8,
    },
}

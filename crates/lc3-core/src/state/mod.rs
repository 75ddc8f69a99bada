//! Architectural machine-state model primitives.

/// Register file, condition codes, and latch snapshot storage.
pub mod registers;
/// Host-observable execution control state.
pub mod run_state;

pub use registers::{ConditionCode, Latches, Reg, REGISTER_COUNT};
pub use run_state::RunState;

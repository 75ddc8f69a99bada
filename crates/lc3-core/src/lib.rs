//! Cycle-stepped LC-3 simulator core.
//!
//! The engine executes one instruction per cycle under a dual-latch
//! discipline: handlers read the committed `current` snapshot and write the
//! in-progress `next` snapshot, which is committed wholesale at cycle end.
//! Hosts drive execution through [`Machine`] and read state back through its
//! accessors; the interactive shell lives in the `lc3-sim` crate.

/// Architectural machine-state model primitives.
pub mod state;
pub use state::{ConditionCode, Latches, Reg, RunState, REGISTER_COUNT};

/// Fault taxonomy for conditions reported mid-cycle.
pub mod fault;
pub use fault::Fault;

/// Word-addressed main memory with a checked access policy.
pub mod memory;
pub use memory::{Memory, MEMORY_WORDS};

/// Instruction decoder and operand-field extraction.
pub mod decoder;
pub use decoder::{sign_extend, Decoder, Instruction, JsrTarget, Opcode, Operand2};

/// Opcode handlers applying decoded instructions to the next latch.
pub mod execute;
pub use execute::execute_instruction;

/// Execution cycle driver and the host-facing machine type.
pub mod machine;
pub use machine::{CoreConfig, Machine, RunOutcome, StepOutcome, HALT_PC};

/// Program-image parsing (hex-word file contract).
pub mod image;
pub use image::{ImageError, Program};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;

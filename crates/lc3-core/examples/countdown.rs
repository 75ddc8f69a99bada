//! Headless demo: runs a small countdown loop and prints the retired state.

use lc3_core::{Machine, Program, Reg, StepOutcome};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn main() {
    let mut machine = Machine::default();
    machine
        .load_program(&Program::from_words(
            0x3000,
            vec![
                0x126A, // ADD R1, R1, #10
                0x127F, // ADD R1, R1, #-1
                0x03FE, // BRp #-2
                0xC000, // JMP R0 (halt sentinel)
            ],
        ))
        .expect("image fits in memory");

    loop {
        match machine.step() {
            StepOutcome::Retired => {
                println!(
                    "pc={:#06x} r1={:#06x} cc={:?}",
                    machine.pc(),
                    machine.reg(Reg::R1),
                    machine.condition_codes()
                );
            }
            StepOutcome::Halted => {
                println!(
                    "halted after {} instructions",
                    machine.retired_instructions()
                );
                break;
            }
            StepOutcome::Faulted(fault) => {
                eprintln!("fault: {fault}");
                break;
            }
        }
    }
}

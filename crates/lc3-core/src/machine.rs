//! Execution cycle driver: fetch, decode, dispatch, commit.

use crate::decoder::{Decoder, Instruction};
use crate::execute::execute_instruction;
use crate::image::{ImageError, Program};
use crate::memory::{Memory, MEMORY_WORDS};
use crate::state::{ConditionCode, Latches, Reg, RunState, REGISTER_COUNT};
use crate::Fault;

/// Program-counter value that stops simulation at the start of a cycle.
pub const HALT_PC: u16 = 0x0000;

/// Immutable per-machine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Report [`Fault::InvalidOpcode`] for unassigned opcodes instead of the
    /// default permissive no-op.
    pub strict_opcodes: bool,
}

/// Output status from one cycle-step request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// One instruction retired and its effects committed.
    Retired,
    /// The machine is halted; the request was a reported no-op.
    Halted,
    /// A fault was raised (or was already latched); nothing committed.
    Faulted(Fault),
}

/// Aggregated outcome from a multi-cycle execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of instructions retired during this request.
    pub steps: u64,
    /// Machine control state after the request.
    pub state: RunState,
}

/// One simulated LC-3 machine instance.
///
/// Owns the dual-latch state pair, main memory, and the retired-instruction
/// counter. Instances are value-isolated: each cycle is fully self-contained,
/// so independent machines need no coordination.
#[derive(Debug, Clone)]
pub struct Machine {
    config: CoreConfig,
    current: Latches,
    next: Latches,
    memory: Memory,
    retired: u64,
    run_state: RunState,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl Machine {
    /// Creates a machine with zeroed memory, zeroed registers, the Z
    /// condition code set, and no program loaded.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            current: Latches::default(),
            next: Latches::default(),
            memory: Memory::new(),
            retired: 0,
            run_state: RunState::Running,
        }
    }

    /// Loads a program image into memory.
    ///
    /// If the current PC is zero (no start address established yet), the PC
    /// is set to the image base, matching the original loader rule. Several
    /// images may be loaded in sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DoesNotFit`] when the image extends past the end
    /// of backed memory.
    pub fn load_program(&mut self, program: &Program) -> Result<(), ImageError> {
        let base = usize::from(program.base());
        let end = base + program.words().len();
        if end > MEMORY_WORDS {
            return Err(ImageError::DoesNotFit {
                base: program.base(),
                words: program.words().len(),
            });
        }

        let mut addr = program.base();
        for &word in program.words() {
            // In range by the check above; a failure here cannot happen.
            let _ = self.memory.write(addr, word);
            addr = addr.wrapping_add(1);
        }

        if self.current.pc() == HALT_PC {
            self.current.set_pc(program.base());
            self.next = self.current;
        }

        Ok(())
    }

    /// Executes exactly one fetch/decode/dispatch/commit cycle.
    ///
    /// Requests against a halted or faulted machine are reported no-ops. The
    /// halt sentinel is checked against the committed PC at cycle start, so a
    /// branch *to* zero retires normally and the following step halts.
    pub fn step(&mut self) -> StepOutcome {
        match self.run_state {
            RunState::Halted => return StepOutcome::Halted,
            RunState::Faulted(fault) => return StepOutcome::Faulted(fault),
            RunState::Running => {}
        }

        if self.current.pc() == HALT_PC {
            self.run_state = RunState::Halted;
            return StepOutcome::Halted;
        }

        let word = match self.memory.read(self.current.pc()) {
            Ok(word) => word,
            Err(fault) => return self.latch_fault(fault),
        };

        // Fetch increment happens before dispatch: handlers that compute
        // PC-relative addresses must see the post-fetch PC in `next`.
        self.next = self.current;
        self.next.set_pc(self.current.pc().wrapping_add(1));

        let instr = Decoder::decode(word);

        if self.config.strict_opcodes {
            if let Instruction::Reserved { opcode } = instr {
                return self.latch_fault(Fault::InvalidOpcode { opcode });
            }
        }

        match execute_instruction(&instr, &self.current, &mut self.next, &mut self.memory) {
            Ok(()) => {
                self.current = self.next;
                self.retired += 1;
                StepOutcome::Retired
            }
            Err(fault) => self.latch_fault(fault),
        }
    }

    /// Executes up to `cycles` cycles, stopping early on halt or fault.
    pub fn run_for(&mut self, cycles: u64) -> RunOutcome {
        let mut steps = 0;
        for _ in 0..cycles {
            match self.step() {
                StepOutcome::Retired => steps += 1,
                StepOutcome::Halted | StepOutcome::Faulted(_) => break,
            }
        }
        RunOutcome {
            steps,
            state: self.run_state,
        }
    }

    /// Executes cycles until the machine halts or faults.
    pub fn run_to_halt(&mut self) -> RunOutcome {
        let mut steps = 0;
        while matches!(self.step(), StepOutcome::Retired) {
            steps += 1;
        }
        RunOutcome {
            steps,
            state: self.run_state,
        }
    }

    /// Returns the machine to architectural defaults, keeping the loaded
    /// memory image: zeroed registers, PC zero, Z set, counter cleared, any
    /// halt or latched fault discharged.
    pub fn reset(&mut self) {
        self.current = Latches::default();
        self.next = Latches::default();
        self.retired = 0;
        self.run_state = RunState::Running;
    }

    fn latch_fault(&mut self, fault: Fault) -> StepOutcome {
        self.run_state = RunState::Faulted(fault);
        StepOutcome::Faulted(fault)
    }

    /// Reads the committed program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.current.pc()
    }

    /// Reads a committed general-purpose register.
    #[must_use]
    pub const fn reg(&self, reg: Reg) -> u16 {
        self.current.reg(reg)
    }

    /// Returns the committed register file in index order.
    #[must_use]
    pub const fn registers(&self) -> [u16; REGISTER_COUNT] {
        self.current.regs()
    }

    /// Reads the committed condition codes.
    #[must_use]
    pub const fn condition_codes(&self) -> ConditionCode {
        self.current.cc()
    }

    /// Number of instructions retired since construction or [`Self::reset`].
    #[must_use]
    pub const fn retired_instructions(&self) -> u64 {
        self.retired
    }

    /// Returns `true` once the halt sentinel has been observed.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.run_state, RunState::Halted)
    }

    /// Current execution control state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Read access to main memory, for dumps and inspection.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, Machine, RunOutcome, StepOutcome};
    use crate::image::Program;
    use crate::state::{ConditionCode, Reg, RunState};
    use crate::Fault;

    fn machine_with(base: u16, words: &[u16]) -> Machine {
        let mut machine = Machine::default();
        let program = Program::from_words(base, words.to_vec());
        machine.load_program(&program).expect("image fits");
        machine
    }

    #[test]
    fn load_sets_pc_to_base_only_when_unestablished() {
        let mut machine = Machine::default();
        machine
            .load_program(&Program::from_words(0x3000, vec![0x1265]))
            .expect("image fits");
        assert_eq!(machine.pc(), 0x3000);

        // A second image must not move the established PC.
        machine
            .load_program(&Program::from_words(0x4000, vec![0x0000]))
            .expect("image fits");
        assert_eq!(machine.pc(), 0x3000);
        assert_eq!(machine.memory().read(0x4000), Ok(0x0000));
    }

    #[test]
    fn load_rejects_image_past_end_of_memory() {
        let mut machine = Machine::default();
        let result = machine.load_program(&Program::from_words(0x7FFF, vec![1, 2]));
        assert!(result.is_err());
    }

    #[test]
    fn add_immediate_end_to_end_scenario() {
        // ADD R1, R1, #5 at 0x3000.
        let mut machine = machine_with(0x3000, &[0x1265]);

        assert_eq!(machine.step(), StepOutcome::Retired);

        assert_eq!(machine.reg(Reg::R1), 5);
        assert_eq!(machine.condition_codes(), ConditionCode::Positive);
        assert_eq!(machine.pc(), 0x3001);
        assert_eq!(machine.retired_instructions(), 1);
    }

    #[test]
    fn stepping_at_halt_sentinel_changes_nothing() {
        let mut machine = Machine::default();
        let before_regs = machine.registers();

        assert_eq!(machine.step(), StepOutcome::Halted);
        assert!(machine.is_halted());
        assert_eq!(machine.pc(), 0x0000);
        assert_eq!(machine.registers(), before_regs);
        assert_eq!(machine.retired_instructions(), 0);

        // Further requests stay reported no-ops.
        assert_eq!(machine.step(), StepOutcome::Halted);
        assert_eq!(
            machine.run_for(10),
            RunOutcome {
                steps: 0,
                state: RunState::Halted,
            }
        );
    }

    #[test]
    fn branch_to_zero_retires_then_halts_on_next_step() {
        // JMP R0 with R0 = 0 jumps to the halt sentinel.
        let mut machine = machine_with(0x3000, &[0xC000]);

        assert_eq!(machine.step(), StepOutcome::Retired);
        assert_eq!(machine.pc(), 0x0000);
        assert!(!machine.is_halted());

        assert_eq!(machine.step(), StepOutcome::Halted);
        assert!(machine.is_halted());
        assert_eq!(machine.retired_instructions(), 1);
    }

    #[test]
    fn run_for_stops_early_at_halt() {
        // Three ADDs, then JMP R0 to the sentinel.
        let mut machine = machine_with(0x3000, &[0x1265, 0x1265, 0x1265, 0xC000]);

        let outcome = machine.run_for(100);

        assert_eq!(outcome.steps, 4);
        assert_eq!(outcome.state, RunState::Halted);
        assert_eq!(machine.reg(Reg::R1), 15);
    }

    #[test]
    fn run_for_honors_the_cycle_budget() {
        let mut machine = machine_with(0x3000, &[0x1265, 0x1265, 0x1265, 0xC000]);

        let outcome = machine.run_for(2);

        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.state, RunState::Running);
        assert_eq!(machine.reg(Reg::R1), 10);
        assert_eq!(machine.retired_instructions(), 2);
    }

    #[test]
    fn run_to_halt_executes_the_whole_program() {
        let mut machine = machine_with(0x3000, &[0x1265, 0x1265, 0xC000]);

        let outcome = machine.run_to_halt();

        assert_eq!(outcome.steps, 3);
        assert_eq!(outcome.state, RunState::Halted);
        assert_eq!(machine.retired_instructions(), 3);
    }

    #[test]
    fn permissive_mode_retires_reserved_opcodes_as_no_ops() {
        let mut machine = machine_with(0x3000, &[0x8000, 0xD000]);

        assert_eq!(machine.step(), StepOutcome::Retired);
        assert_eq!(machine.step(), StepOutcome::Retired);
        assert_eq!(machine.pc(), 0x3002);
        assert_eq!(machine.condition_codes(), ConditionCode::Zero);
    }

    #[test]
    fn strict_mode_latches_invalid_opcode() {
        let mut machine = Machine::new(CoreConfig {
            strict_opcodes: true,
        });
        machine
            .load_program(&Program::from_words(0x3000, vec![0x8000]))
            .expect("image fits");

        let expected = Fault::InvalidOpcode { opcode: 0x8 };
        assert_eq!(machine.step(), StepOutcome::Faulted(expected));
        assert_eq!(machine.run_state(), RunState::Faulted(expected));
        // The faulting cycle committed nothing.
        assert_eq!(machine.pc(), 0x3000);
        assert_eq!(machine.retired_instructions(), 0);

        // The fault stays latched.
        assert_eq!(machine.step(), StepOutcome::Faulted(expected));
    }

    #[test]
    fn memory_fault_commits_nothing_and_latches() {
        let mut machine = machine_with(
            0x3000,
            &[
                0x2C01, // LD R6, #1      -> R6 = 0x7FFF (from the data word)
                0x6581, // LDR R2, R6, #1 -> addresses 0x8000, out of range
                0x7FFF, // data
            ],
        );

        assert_eq!(machine.step(), StepOutcome::Retired);
        assert_eq!(machine.reg(Reg::R6), 0x7FFF);

        let expected = Fault::MemoryAccess { addr: 0x8000 };
        assert_eq!(machine.step(), StepOutcome::Faulted(expected));
        // The faulting cycle committed nothing: PC still points at the LDR.
        assert_eq!(machine.pc(), 0x3001);
        assert_eq!(machine.reg(Reg::R2), 0);
        assert_eq!(machine.retired_instructions(), 1);
        assert_eq!(machine.run_state(), RunState::Faulted(expected));
    }

    #[test]
    fn reset_restores_defaults_and_keeps_memory() {
        let mut machine = machine_with(0x3000, &[0x1265, 0xC000]);
        machine.run_to_halt();
        assert!(machine.is_halted());

        machine.reset();

        assert_eq!(machine.pc(), 0x0000);
        assert_eq!(machine.registers(), [0; 8]);
        assert_eq!(machine.condition_codes(), ConditionCode::Zero);
        assert_eq!(machine.retired_instructions(), 0);
        assert_eq!(machine.run_state(), RunState::Running);
        assert_eq!(machine.memory().read(0x3000), Ok(0x1265));
    }

    #[test]
    fn counter_is_monotonic_and_diagnostic_only() {
        let mut machine = machine_with(0x3000, &[0x1265, 0x1265, 0xC000]);
        let mut last = machine.retired_instructions();
        while matches!(machine.step(), StepOutcome::Retired) {
            let count = machine.retired_instructions();
            assert!(count > last);
            last = count;
        }
        assert_eq!(last, 3);
    }
}

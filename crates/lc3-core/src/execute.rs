//! Opcode handlers: pure state transforms from the current latch generation
//! onto the next one.
//!
//! Every handler reads operand registers and condition codes from `current`
//! and writes results into `next`, whose PC already holds the fetch-increment
//! (the address of the following instruction). That split is the load-bearing
//! invariant of the engine: PC-relative addressing (BR, LD, LDI, LEA, ST,
//! STI, long-form JSR) uses `next.pc`, while register operands and the
//! JMP/JSRR/LDR/STR bases come from `current`.
//!
//! Faults are precise: register effects land in the discarded `next` latch,
//! and each handler performs at most one memory write, ordered after every
//! fallible read, so a faulting instruction commits nothing.

use crate::decoder::{Instruction, JsrTarget, Operand2};
use crate::memory::Memory;
use crate::state::{ConditionCode, Latches, Reg};
use crate::Fault;

/// Applies one decoded instruction on top of the fetch-updated `next` latch.
///
/// # Errors
///
/// Returns [`Fault::MemoryAccess`] when a computed address (including the
/// indirect hop of LDI/STI and the TRAP vector read) is outside backed
/// memory. [`Instruction::Reserved`] is an architected no-op here; strict
/// mode is enforced by the cycle driver before dispatch.
pub fn execute_instruction(
    instr: &Instruction,
    current: &Latches,
    next: &mut Latches,
    memory: &mut Memory,
) -> Result<(), Fault> {
    match *instr {
        Instruction::Add { dr, sr1, src2 } => {
            let result = current.reg(sr1).wrapping_add(operand2(current, src2));
            write_with_cc(next, dr, result);
            Ok(())
        }
        Instruction::And { dr, sr1, src2 } => {
            let result = current.reg(sr1) & operand2(current, src2);
            write_with_cc(next, dr, result);
            Ok(())
        }
        Instruction::Br { n, z, p, pc_offset } => {
            let cc = current.cc();
            if (n && cc.n()) || (z && cc.z()) || (p && cc.p()) {
                next.set_pc(next.pc().wrapping_add(pc_offset));
            }
            Ok(())
        }
        Instruction::Jmp { base } => {
            next.set_pc(current.reg(base));
            Ok(())
        }
        Instruction::Jsr { target } => {
            // The link value is the post-fetch PC; the register-form target is
            // read from the current file, so `JSRR R7` jumps to the pre-link
            // value.
            let return_addr = next.pc();
            let target_pc = match target {
                JsrTarget::Relative(offset) => next.pc().wrapping_add(offset),
                JsrTarget::Register(base) => current.reg(base),
            };
            next.set_reg(Reg::R7, return_addr);
            next.set_pc(target_pc);
            Ok(())
        }
        Instruction::Ld { dr, pc_offset } => {
            let value = memory.read(next.pc().wrapping_add(pc_offset))?;
            write_with_cc(next, dr, value);
            Ok(())
        }
        Instruction::Ldi { dr, pc_offset } => {
            let ptr = memory.read(next.pc().wrapping_add(pc_offset))?;
            let value = memory.read(ptr)?;
            write_with_cc(next, dr, value);
            Ok(())
        }
        Instruction::Ldr { dr, base, offset } => {
            let value = memory.read(current.reg(base).wrapping_add(offset))?;
            write_with_cc(next, dr, value);
            Ok(())
        }
        Instruction::Lea { dr, pc_offset } => {
            next.set_reg(dr, next.pc().wrapping_add(pc_offset));
            Ok(())
        }
        Instruction::Not { dr, sr } => {
            write_with_cc(next, dr, !current.reg(sr));
            Ok(())
        }
        Instruction::St { sr, pc_offset } => {
            memory.write(next.pc().wrapping_add(pc_offset), current.reg(sr))
        }
        Instruction::Sti { sr, pc_offset } => {
            let addr = memory.read(next.pc().wrapping_add(pc_offset))?;
            memory.write(addr, current.reg(sr))
        }
        Instruction::Str { sr, base, offset } => {
            memory.write(current.reg(base).wrapping_add(offset), current.reg(sr))
        }
        Instruction::Trap { vector } => {
            let target = memory.read(u16::from(vector))?;
            next.set_reg(Reg::R7, next.pc());
            next.set_pc(target);
            Ok(())
        }
        Instruction::Reserved { .. } => Ok(()),
    }
}

const fn operand2(current: &Latches, src2: Operand2) -> u16 {
    match src2 {
        Operand2::Register(sr2) => current.reg(sr2),
        Operand2::Immediate(imm) => imm,
    }
}

const fn write_with_cc(next: &mut Latches, dr: Reg, value: u16) {
    next.set_reg(dr, value);
    next.set_cc(ConditionCode::of(value));
}

//! Instruction decoder for the LC-3 word format.
//!
//! Decoding is a total pure function: all 2^16 instruction words decode, with
//! the two unassigned opcode values producing [`Instruction::Reserved`] so
//! that the permissive no-op policy (or the strict-mode fault) is decided by
//! the cycle driver rather than here. Offsets and immediates are
//! sign-extended at decode time and stored as two's-complement `u16` values.

// Field extraction truncates deliberately: every field is narrower than the
// instruction word it comes from.
#![allow(clippy::cast_possible_truncation)]

use crate::state::Reg;

/// Assigned 4-bit primary opcode values (`bits[15:12]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Br = 0x0,
    Add = 0x1,
    Ld = 0x2,
    St = 0x3,
    Jsr = 0x4,
    And = 0x5,
    Ldr = 0x6,
    Str = 0x7,
    Not = 0x9,
    Ldi = 0xA,
    Sti = 0xB,
    Jmp = 0xC,
    Lea = 0xE,
    Trap = 0xF,
}

impl Opcode {
    /// Converts a 4-bit opcode value into an assigned opcode.
    ///
    /// Returns `None` for the two unassigned values (`0x8` and `0xD`).
    #[must_use]
    pub const fn from_u4(op: u8) -> Option<Self> {
        match op {
            0x0 => Some(Self::Br),
            0x1 => Some(Self::Add),
            0x2 => Some(Self::Ld),
            0x3 => Some(Self::St),
            0x4 => Some(Self::Jsr),
            0x5 => Some(Self::And),
            0x6 => Some(Self::Ldr),
            0x7 => Some(Self::Str),
            0x9 => Some(Self::Not),
            0xA => Some(Self::Ldi),
            0xB => Some(Self::Sti),
            0xC => Some(Self::Jmp),
            0xE => Some(Self::Lea),
            0xF => Some(Self::Trap),
            _ => None,
        }
    }
}

/// Second operand of ADD/AND: register form (bit 5 clear) or a sign-extended
/// 5-bit immediate (bit 5 set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand2 {
    /// `SR2` register form.
    Register(Reg),
    /// Sign-extended `imm5`, stored as two's-complement `u16`.
    Immediate(u16),
}

/// Subroutine-call target: long PC-relative form (bit 11 set) or the
/// base-register form (`JSRR`, bit 11 clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsrTarget {
    /// Sign-extended `pcOffset11` added to the post-fetch PC.
    Relative(u16),
    /// Base register read from the current register file.
    Register(Reg),
}

/// A fully decoded instruction with all operand fields extracted.
///
/// PC-relative offsets (`pc_offset`) and base-register displacements
/// (`offset`) are already sign-extended two's-complement `u16` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `ADD DR, SR1, SR2|imm5`:sets condition codes.
    Add {
        /// Destination register.
        dr: Reg,
        /// First source register.
        sr1: Reg,
        /// Register or immediate second operand.
        src2: Operand2,
    },
    /// `AND DR, SR1, SR2|imm5`:sets condition codes.
    And {
        /// Destination register.
        dr: Reg,
        /// First source register.
        sr1: Reg,
        /// Register or immediate second operand.
        src2: Operand2,
    },
    /// `BRnzp pcOffset9`:conditional PC-relative branch.
    Br {
        /// Branch when the N flag is set.
        n: bool,
        /// Branch when the Z flag is set.
        z: bool,
        /// Branch when the P flag is set.
        p: bool,
        /// Sign-extended 9-bit offset from the post-fetch PC.
        pc_offset: u16,
    },
    /// `JMP BaseR`:unconditional jump through a register.
    Jmp {
        /// Base register holding the target address.
        base: Reg,
    },
    /// `JSR pcOffset11` / `JSRR BaseR`:call saving the return address in R7.
    Jsr {
        /// Long PC-relative or base-register target.
        target: JsrTarget,
    },
    /// `LD DR, pcOffset9`:PC-relative load; sets condition codes.
    Ld {
        /// Destination register.
        dr: Reg,
        /// Sign-extended 9-bit offset from the post-fetch PC.
        pc_offset: u16,
    },
    /// `LDI DR, pcOffset9`:indirect load; sets condition codes.
    Ldi {
        /// Destination register.
        dr: Reg,
        /// Sign-extended 9-bit offset from the post-fetch PC.
        pc_offset: u16,
    },
    /// `LDR DR, BaseR, offset6`:base+offset load; sets condition codes.
    Ldr {
        /// Destination register.
        dr: Reg,
        /// Base register.
        base: Reg,
        /// Sign-extended 6-bit displacement.
        offset: u16,
    },
    /// `LEA DR, pcOffset9`:load effective address; no condition-code update.
    Lea {
        /// Destination register.
        dr: Reg,
        /// Sign-extended 9-bit offset from the post-fetch PC.
        pc_offset: u16,
    },
    /// `NOT DR, SR`:bitwise complement; sets condition codes.
    Not {
        /// Destination register.
        dr: Reg,
        /// Source register.
        sr: Reg,
    },
    /// `ST SR, pcOffset9`:PC-relative store.
    St {
        /// Source register.
        sr: Reg,
        /// Sign-extended 9-bit offset from the post-fetch PC.
        pc_offset: u16,
    },
    /// `STI SR, pcOffset9`:indirect store.
    Sti {
        /// Source register.
        sr: Reg,
        /// Sign-extended 9-bit offset from the post-fetch PC.
        pc_offset: u16,
    },
    /// `STR SR, BaseR, offset6`:base+offset store.
    Str {
        /// Source register.
        sr: Reg,
        /// Base register.
        base: Reg,
        /// Sign-extended 6-bit displacement.
        offset: u16,
    },
    /// `TRAP trapvect8`:saves the return address in R7, jumps through the
    /// trap vector table at the bottom of memory.
    Trap {
        /// Zero-extended 8-bit trap vector.
        vector: u8,
    },
    /// An unassigned opcode value (`0x8` or `0xD`): architected no-op in
    /// permissive mode, fault in strict mode.
    Reserved {
        /// The unassigned 4-bit opcode value.
        opcode: u8,
    },
}

/// Sign-extends the low `width` bits of `value` to the full 16-bit register
/// width by replicating bit `width - 1`, independent of host integer width.
///
/// Defined for every `width` in `1..=16`; the engine uses widths 5 (`imm5`),
/// 6 (`offset6`), 9 (`pcOffset9`), and 11 (`pcOffset11`).
#[must_use]
pub const fn sign_extend(value: u16, width: u32) -> u16 {
    debug_assert!(width >= 1 && width <= 16);
    let sign_bit = 1_u16 << (width - 1);
    let field_mask = sign_bit.wrapping_shl(1).wrapping_sub(1);
    let field = value & field_mask;
    if field & sign_bit != 0 {
        field | !field_mask
    } else {
        field
    }
}

/// Instruction decoder for 16-bit fetched words.
pub struct Decoder;

const fn reg_field(word: u16, low_bit: u32) -> Reg {
    // A 3-bit field always decodes; the unwrap-free path keeps this const.
    match Reg::from_u3(((word >> low_bit) & 0x7) as u8) {
        Some(reg) => reg,
        None => unreachable!(),
    }
}

impl Decoder {
    /// Decodes a 16-bit fetched word into its instruction and operand fields.
    ///
    /// Total over all inputs: the two unassigned opcodes decode to
    /// [`Instruction::Reserved`].
    #[must_use]
    pub const fn decode(word: u16) -> Instruction {
        let op_bits = ((word >> 12) & 0xF) as u8;
        let Some(opcode) = Opcode::from_u4(op_bits) else {
            return Instruction::Reserved { opcode: op_bits };
        };

        match opcode {
            Opcode::Add => Instruction::Add {
                dr: reg_field(word, 9),
                sr1: reg_field(word, 6),
                src2: Self::decode_src2(word),
            },
            Opcode::And => Instruction::And {
                dr: reg_field(word, 9),
                sr1: reg_field(word, 6),
                src2: Self::decode_src2(word),
            },
            Opcode::Br => Instruction::Br {
                n: (word >> 11) & 1 != 0,
                z: (word >> 10) & 1 != 0,
                p: (word >> 9) & 1 != 0,
                pc_offset: sign_extend(word, 9),
            },
            Opcode::Jmp => Instruction::Jmp {
                base: reg_field(word, 6),
            },
            Opcode::Jsr => Instruction::Jsr {
                target: if (word >> 11) & 1 != 0 {
                    JsrTarget::Relative(sign_extend(word, 11))
                } else {
                    JsrTarget::Register(reg_field(word, 6))
                },
            },
            Opcode::Ld => Instruction::Ld {
                dr: reg_field(word, 9),
                pc_offset: sign_extend(word, 9),
            },
            Opcode::Ldi => Instruction::Ldi {
                dr: reg_field(word, 9),
                pc_offset: sign_extend(word, 9),
            },
            Opcode::Ldr => Instruction::Ldr {
                dr: reg_field(word, 9),
                base: reg_field(word, 6),
                offset: sign_extend(word, 6),
            },
            Opcode::Lea => Instruction::Lea {
                dr: reg_field(word, 9),
                pc_offset: sign_extend(word, 9),
            },
            Opcode::Not => Instruction::Not {
                dr: reg_field(word, 9),
                sr: reg_field(word, 6),
            },
            Opcode::St => Instruction::St {
                sr: reg_field(word, 9),
                pc_offset: sign_extend(word, 9),
            },
            Opcode::Sti => Instruction::Sti {
                sr: reg_field(word, 9),
                pc_offset: sign_extend(word, 9),
            },
            Opcode::Str => Instruction::Str {
                sr: reg_field(word, 9),
                base: reg_field(word, 6),
                offset: sign_extend(word, 6),
            },
            Opcode::Trap => Instruction::Trap {
                vector: (word & 0xFF) as u8,
            },
        }
    }

    const fn decode_src2(word: u16) -> Operand2 {
        if (word >> 5) & 1 != 0 {
            Operand2::Immediate(sign_extend(word, 5))
        } else {
            Operand2::Register(reg_field(word, 0))
        }
    }
}

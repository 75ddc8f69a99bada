/// Number of architecturally visible general-purpose registers (`R0..R7`).
pub const REGISTER_COUNT: usize = 8;

/// Architecturally visible general-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Reg {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl Reg {
    /// Ordered list of all architectural general-purpose registers.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Returns the register-file index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a 3-bit register field into an architectural register.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            _ => None,
        }
    }
}

/// Condition-code summary of the last condition-code-setting result.
///
/// Exactly one of N/Z/P is architecturally set at any time; modelling the
/// codes as an enum makes that invariant unrepresentable to violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ConditionCode {
    /// Last result had bit 15 set.
    Negative,
    /// Last result was zero. Initial state at machine reset.
    #[default]
    Zero,
    /// Last result was a nonzero value with bit 15 clear.
    Positive,
}

impl ConditionCode {
    /// Classifies a 16-bit register value into its condition code.
    #[must_use]
    pub const fn of(value: u16) -> Self {
        if value & 0x8000 != 0 {
            Self::Negative
        } else if value == 0 {
            Self::Zero
        } else {
            Self::Positive
        }
    }

    /// Returns `true` when the N flag is set.
    #[must_use]
    pub const fn n(self) -> bool {
        matches!(self, Self::Negative)
    }

    /// Returns `true` when the Z flag is set.
    #[must_use]
    pub const fn z(self) -> bool {
        matches!(self, Self::Zero)
    }

    /// Returns `true` when the P flag is set.
    #[must_use]
    pub const fn p(self) -> bool {
        matches!(self, Self::Positive)
    }
}

/// One generation of latched machine state: PC, condition codes, and the
/// register file.
///
/// The machine holds two of these: the committed `current` snapshot, which
/// handlers read operands from, and the in-progress `next` snapshot, which
/// handlers write results into. `next.pc` already holds the fetch-incremented
/// PC during execution, which is what PC-relative addressing must use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Latches {
    pc: u16,
    cc: ConditionCode,
    regs: [u16; REGISTER_COUNT],
}

impl Default for Latches {
    fn default() -> Self {
        Self {
            pc: 0,
            cc: ConditionCode::Zero,
            regs: [0; REGISTER_COUNT],
        }
    }
}

impl Latches {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn reg(&self, reg: Reg) -> u16 {
        self.regs[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_reg(&mut self, reg: Reg, value: u16) {
        self.regs[reg.index()] = value;
    }

    /// Returns the full register file in index order.
    #[must_use]
    pub const fn regs(&self) -> [u16; REGISTER_COUNT] {
        self.regs
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the condition codes.
    #[must_use]
    pub const fn cc(&self) -> ConditionCode {
        self.cc
    }

    /// Replaces the condition codes.
    pub const fn set_cc(&mut self, cc: ConditionCode) {
        self.cc = cc;
    }
}

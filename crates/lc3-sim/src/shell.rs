//! Operator command grammar and report formatting.
//!
//! The command set and the `rdump`/`mdump` report layouts follow the
//! original simulator shell; both reports are mirrored to the `dumpsim`
//! transcript file by the session loop in `main`.

use std::io::{self, Write};

use lc3_core::{Machine, Reg, RunState};

/// Help text printed for the `?` command.
pub const HELP_TEXT: &str = "\
----------------LC-3 SIM Help-----------------------
go               -  run program to completion
run n            -  execute program for n instructions
mdump low high   -  dump memory from low to high
rdump            -  dump the register & bus values
?                -  display this help menu
quit             -  exit the program
";

/// One parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run until the halt sentinel.
    Go,
    /// Execute up to the given number of instructions.
    Run(u64),
    /// Dump the inclusive memory word range.
    MemDump {
        /// First address to dump.
        low: u16,
        /// Last address to dump.
        high: u16,
    },
    /// Dump the register file, PC, condition codes, and instruction count.
    RegDump,
    /// Print the help menu.
    Help,
    /// Leave the shell.
    Quit,
}

/// Parses one operator input line.
///
/// Numbers are decimal or `0x`-prefixed hexadecimal.
///
/// # Errors
///
/// Returns a user-facing message for empty input, unknown commands, and
/// missing or malformed operands.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Err("no command given".to_string());
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "go" | "g" => Command::Go,
        "run" | "r" => {
            let cycles = required_number(parts.next(), "run")?;
            Command::Run(u64::from(cycles))
        }
        "mdump" | "m" => {
            let low = address_operand(parts.next(), "mdump")?;
            let high = address_operand(parts.next(), "mdump")?;
            Command::MemDump { low, high }
        }
        "rdump" | "rd" => Command::RegDump,
        "?" | "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        other => return Err(format!("invalid command: {other}")),
    };

    if let Some(extra) = parts.next() {
        return Err(format!("unexpected operand: {extra}"));
    }

    Ok(command)
}

fn required_number(operand: Option<&str>, command: &str) -> Result<u32, String> {
    let text = operand.ok_or_else(|| format!("{command}: missing operand"))?;
    parse_number(text).ok_or_else(|| format!("{command}: invalid number `{text}`"))
}

fn address_operand(operand: Option<&str>, command: &str) -> Result<u16, String> {
    let value = required_number(operand, command)?;
    u16::try_from(value).map_err(|_| format!("{command}: address `{value:#x}` out of range"))
}

fn parse_number(text: &str) -> Option<u32> {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .map_or_else(
            || text.parse::<u32>().ok(),
            |digits| u32::from_str_radix(digits, 16).ok(),
        )
}

/// Formats the register/bus dump in the original report layout.
#[must_use]
pub fn format_rdump(machine: &Machine) -> String {
    use std::fmt::Write as _;

    let cc = machine.condition_codes();
    let mut report = String::new();
    report.push_str("\nCurrent register/bus values :\n");
    report.push_str("-------------------------------------\n");
    let _ = writeln!(
        report,
        "Instruction Count : {}",
        machine.retired_instructions()
    );
    let _ = writeln!(report, "PC                : 0x{:04x}", machine.pc());
    let _ = writeln!(
        report,
        "CCs: N = {}  Z = {}  P = {}",
        u8::from(cc.n()),
        u8::from(cc.z()),
        u8::from(cc.p())
    );
    report.push_str("Registers:\n");
    for reg in Reg::ALL {
        let _ = writeln!(report, "{}: 0x{:04x}", reg.index(), machine.reg(reg));
    }
    report.push('\n');
    report
}

/// Formats the memory dump for the inclusive range in the original layout.
///
/// # Errors
///
/// Returns a user-facing message when the range is reversed or reaches past
/// the end of backed memory.
pub fn format_mdump(machine: &Machine, low: u16, high: u16) -> Result<String, String> {
    use std::fmt::Write as _;

    let words = machine
        .memory()
        .range(low, high)
        .map_err(|fault| fault.to_string())?;

    let mut report = String::new();
    let _ = writeln!(report, "\nMemory content [0x{low:04x}..0x{high:04x}] :");
    report.push_str("-------------------------------------\n");
    for (offset, word) in words.iter().enumerate() {
        let addr = low + u16::try_from(offset).unwrap_or(0);
        let _ = writeln!(report, "  0x{addr:04x} ({addr}) : 0x{word:04x}");
    }
    report.push('\n');
    Ok(report)
}

/// Runs one command against the machine, writing user-facing output to `out`
/// and mirroring dump reports to `transcript`.
///
/// Returns `false` once the shell should exit.
///
/// # Errors
///
/// Propagates I/O failures from either sink.
pub fn execute_command(
    machine: &mut Machine,
    command: Command,
    out: &mut impl Write,
    transcript: &mut impl Write,
) -> io::Result<bool> {
    match command {
        Command::Go => {
            if machine.is_halted() {
                writeln!(out, "Can't simulate, Simulator is halted\n")?;
                return Ok(true);
            }
            writeln!(out, "Simulating...\n")?;
            machine.run_to_halt();
            report_stop(machine, out)?;
        }
        Command::Run(cycles) => {
            if machine.is_halted() {
                writeln!(out, "Can't simulate, Simulator is halted\n")?;
                return Ok(true);
            }
            writeln!(out, "Simulating for {cycles} cycles...\n")?;
            machine.run_for(cycles);
            if !matches!(machine.run_state(), RunState::Running) {
                report_stop(machine, out)?;
            }
        }
        Command::MemDump { low, high } => match format_mdump(machine, low, high) {
            Ok(report) => {
                out.write_all(report.as_bytes())?;
                transcript.write_all(report.as_bytes())?;
                transcript.flush()?;
            }
            Err(message) => writeln!(out, "error: {message}")?,
        },
        Command::RegDump => {
            let report = format_rdump(machine);
            out.write_all(report.as_bytes())?;
            transcript.write_all(report.as_bytes())?;
            transcript.flush()?;
        }
        Command::Help => out.write_all(HELP_TEXT.as_bytes())?,
        Command::Quit => {
            writeln!(out, "Bye.")?;
            return Ok(false);
        }
    }
    Ok(true)
}

fn report_stop(machine: &Machine, out: &mut impl Write) -> io::Result<()> {
    match machine.run_state() {
        RunState::Halted => writeln!(out, "Simulator halted\n"),
        RunState::Faulted(fault) => writeln!(out, "Simulator faulted: {fault}\n"),
        RunState::Running => Ok(()),
    }
}

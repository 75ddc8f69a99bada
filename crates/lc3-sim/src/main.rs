//! CLI entry point for the interactive LC-3 simulator shell.

mod shell;

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use lc3_core::{Machine, Program};
#[cfg(test)]
use tempfile as _;

use shell::{execute_command, parse_command};

const USAGE_TEXT: &str = "\
Usage: lc3-sim [options] <image-file>...

Loads each program image (hex words, one per line, base address first) and
starts the interactive command shell. Dump reports are mirrored to a
`dumpsim` transcript file in the working directory.

Options:
  --strict       Fault on unassigned opcodes instead of treating them as no-ops
  -h, --help     Show this help message
";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    images: Vec<PathBuf>,
    strict: bool,
}

#[derive(Debug)]
enum ParseResult {
    Args(Args),
    Help,
}

fn parse_args(args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut images = Vec::new();
    let mut strict = false;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--strict" {
            strict = true;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        images.push(PathBuf::from(arg));
    }

    if images.is_empty() {
        return Err("missing image file".to_string());
    }

    Ok(ParseResult::Args(Args { images, strict }))
}

fn boot_machine(args: &Args) -> Result<Machine, String> {
    let mut machine = Machine::new(lc3_core::CoreConfig {
        strict_opcodes: args.strict,
    });

    for path in &args.images {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("can't open program file {}: {e}", path.display()))?;
        let program =
            Program::parse(&source).map_err(|e| format!("{}: {e}", path.display()))?;
        machine
            .load_program(&program)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        println!(
            "Read {} words from {} into memory.\n",
            program.words().len(),
            path.display()
        );
    }

    Ok(machine)
}

fn run_shell(machine: &mut Machine) -> io::Result<()> {
    let mut transcript = fs::File::create("dumpsim")?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "LC-3-SIM> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(command) => {
                if !execute_command(machine, command, &mut stdout, &mut transcript)? {
                    return Ok(());
                }
            }
            Err(message) => writeln!(stdout, "{message}")?,
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Args(args)) => match boot_machine(&args) {
            Ok(mut machine) => {
                println!("LC-3 Simulator\n");
                match run_shell(&mut machine) {
                    Ok(()) => 0,
                    Err(error) => {
                        eprintln!("error: {error}");
                        1
                    }
                }
            }
            Err(message) => {
                eprintln!("error: {message}");
                1
            }
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::{parse_args, Args, ParseResult};
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn parses_image_list() {
        let result = parse_args(
            [OsString::from("boot.hex"), OsString::from("os.hex")].into_iter(),
        )
        .expect("valid args should parse");

        match result {
            ParseResult::Args(args) => assert_eq!(
                args,
                Args {
                    images: vec![PathBuf::from("boot.hex"), PathBuf::from("os.hex")],
                    strict: false,
                }
            ),
            ParseResult::Help => panic!("expected parsed args"),
        }
    }

    #[test]
    fn parses_strict_flag() {
        let result =
            parse_args([OsString::from("--strict"), OsString::from("a.hex")].into_iter())
                .expect("valid args should parse");
        match result {
            ParseResult::Args(args) => assert!(args.strict),
            ParseResult::Help => panic!("expected parsed args"),
        }
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args([OsString::from("--help")].into_iter())
            .expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_missing_images_and_unknown_options() {
        assert!(parse_args(std::iter::empty()).is_err());
        assert!(parse_args([OsString::from("--verbose")].into_iter()).is_err());
    }
}

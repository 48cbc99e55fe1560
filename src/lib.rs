//! Two-pass assembler for a subset of the MIPS32 instruction set.
//!
//! The main entry point is [`assemble`], which drives both passes over
//! named files. [`expand::pass_one`] reads the source, collects labels into
//! a [`SymbolTable`] and expands pseudoinstructions into an intermediate
//! stream of one concrete instruction per line.
//! [`instructions::pass_two`] encodes that stream into 32-bit machine
//! words, one lowercase 8-digit hex word per line, resolving branch targets
//! against the symbol table and recording every jump site in a relocation
//! table. The target file carries the hex words and both tables under
//! `.text`, `.symbol` and `.relocation` section markers.
//!
//! Neither pass stops at the first problem: every offending line is
//! reported to a caller-supplied log sink and skipped, and the pass reports
//! how many lines failed.
//!
//! # Source language
//!
//! Each line holds at most one instruction, optionally preceded by a label
//! (an identifier ending in `:`). A `#` starts a comment running to the end
//! of the line. Commas and parentheses separate operands just like
//! whitespace does, so `lw $t0, 4($sp)` and `lw $t0 4 $sp` are the same
//! instruction.
//!
//! Registers are written `$zero`, `$at`, `$v0`-`$v1`, `$a0`-`$a3`,
//! `$t0`-`$t9`, `$s0`-`$s7`, `$k0`-`$k1`, `$gp`, `$sp`, `$fp`, `$ra`, or by
//! plain index `$0`-`$31`. Immediates may be decimal, hexadecimal (`0x`) or
//! octal (leading `0`).
//!
//! Quick reference for the accepted mnemonics:
//!
//! Mnemonic | Syntax                | Notes
//! ---------|-----------------------|---------------------------------
//! `addu`   | `addu rd, rs, rt`     |
//! `or`     | `or rd, rs, rt`       |
//! `slt`    | `slt rd, rs, rt`      |
//! `sltu`   | `sltu rd, rs, rt`     |
//! `sll`    | `sll rd, rt, shamt`   | shamt in `[0, 31]`
//! `jr`     | `jr rs`               |
//! `addiu`  | `addiu rt, rs, imm`   | imm in `[-32768, 32767]`
//! `ori`    | `ori rt, rs, imm`     | imm in `[0, 65535]`
//! `lui`    | `lui rt, imm`         | imm in `[0, 65535]`
//! `lb`     | `lb rt, offset(rs)`   | offset in `[-32768, 32767]`
//! `lbu`    | `lbu rt, offset(rs)`  | offset in `[-32768, 32767]`
//! `lw`     | `lw rt, offset(rs)`   | offset in `[-32768, 32767]`
//! `sb`     | `sb rt, offset(rs)`   | offset in `[-32768, 32767]`
//! `sw`     | `sw rt, offset(rs)`   | offset in `[-32768, 32767]`
//! `beq`    | `beq rs, rt, label`   | PC-relative, label must be defined
//! `bne`    | `bne rs, rt, label`   | PC-relative, label must be defined
//! `j`      | `j label`             | target left for relocation
//! `jal`    | `jal label`           | target left for relocation
//!
//! Pseudoinstructions expanded by pass one:
//!
//! Mnemonic | Expansion
//! ---------|--------------------------------------------------------
//! `li rd, imm`        | `addiu rd, $0, imm`, or `lui $at` + `ori rd, $at`
//! `bge rs, rt, label` | `slt $at, rs, rt` + `beq $at, $0, label`
//! `move rd, rs`       | `addu rd, $0, rs`
//!
//! # Target format
//!
//! ```text
//! .text
//! <one hex word per instruction>
//!
//! .symbol
//! <byte offset>\t<label>          (one per label, in order of definition)
//!
//! .relocation
//! <byte offset>\t<label>          (one per j/jal site, in order of emission)
//! ```

pub mod constants;
mod error;
pub mod expand;
pub mod instructions;
pub mod int_util;
pub mod labels;
pub mod parser;
pub mod registers;


use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

pub use crate::error::{Error, IoContext};
pub use crate::expand::pass_one;
pub use crate::instructions::pass_two;
pub use crate::labels::{Mode, Symbol, SymbolTable};
pub use crate::registers::Register;

/// A 32-bit machine word.
pub type Word = u32;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn log_invalid_instruction<L: Write>(
    log: &mut L,
    line: usize,
    mnemonic: &str,
    args: &[&str],
) -> io::Result<()> {
    write!(log, "Error - invalid instruction at line {}: {}", line, mnemonic)?;
    for arg in args {
        write!(log, " {}", arg)?;
    }
    writeln!(log)
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::Open(IoContext::Input, path.to_owned(), err))
}

fn open_output(path: &Path) -> Result<File> {
    File::create(path).map_err(|err| Error::Open(IoContext::Output, path.to_owned(), err))
}

/// Runs pass two over the intermediate stream and frames the result with
/// the `.text`, `.symbol` and `.relocation` sections of the target format.
/// Returns the number of errors reported.
pub fn write_target<R, W, L>(
    intermediate: R,
    output: &mut W,
    symbols: &SymbolTable,
    relocations: &mut SymbolTable,
    log: &mut L,
) -> Result<usize>
where
    R: io::BufRead,
    W: Write,
    L: Write,
{
    writeln!(output, ".text")?;
    let errors = instructions::pass_two(intermediate, output, symbols, relocations, log)?;

    writeln!(output)?;
    writeln!(output, ".symbol")?;
    symbols.write(output)?;

    writeln!(output)?;
    writeln!(output, ".relocation")?;
    relocations.write(output)?;

    Ok(errors)
}

/// Runs the assembler over named files.
///
/// With both `input` and `output` set, this is the full pipeline: pass one
/// reads `input` and writes the intermediate stream to `intermediate`, then
/// pass two reads that stream back and writes the target to `output`.
/// Passing `None` for `input` or `output` skips the corresponding pass;
/// note that pass two alone starts from an empty symbol table, so branches
/// to labels cannot resolve.
///
/// Diagnostics go to `log`. Returns [`Error::Assembly`] if any were
/// recorded; the files written so far are then not authoritative.
pub fn assemble<L: Write>(
    input: Option<&Path>,
    intermediate: &Path,
    output: Option<&Path>,
    log: &mut L,
) -> Result<()> {
    let mut symbols = SymbolTable::new(Mode::Unique);
    let mut relocations = SymbolTable::new(Mode::NonUnique);
    let mut errors = 0;

    if let Some(input) = input {
        println!(
            "Running pass one: {} -> {}",
            input.display(),
            intermediate.display()
        );
        let source = BufReader::new(open_input(input)?);
        let mut stream = BufWriter::new(open_output(intermediate)?);

        errors += expand::pass_one(source, &mut stream, &mut symbols, log)?;
        stream.flush()?;
    }

    if let Some(output) = output {
        println!(
            "Running pass two: {} -> {}",
            intermediate.display(),
            output.display()
        );
        let stream = BufReader::new(open_input(intermediate)?);
        let mut target = BufWriter::new(open_output(output)?);

        errors += write_target(stream, &mut target, &symbols, &mut relocations, log)?;
        target.flush()?;
    }

    if errors > 0 {
        Err(Error::Assembly(errors))
    } else {
        Ok(())
    }
}

use std::error::Error;
use std::fmt;
use std::io::{BufRead, Write};

use crate::constants::{MAX_ARGS, WORD_BYTES};
use crate::int_util::{parse_number, NumberError};
use crate::labels::{is_valid_label, SymbolTable};
use crate::parser::tokenize;
use crate::{log_invalid_instruction, Result};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExpandError {
    WrongArity,
    Number(NumberError),
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExpandError::WrongArity => write!(f, "wrong number of arguments"),
            ExpandError::Number(err) => write!(f, "{}", err),
        }
    }
}

impl Error for ExpandError {}

impl From<NumberError> for ExpandError {
    fn from(err: NumberError) -> ExpandError {
        ExpandError::Number(err)
    }
}

fn instruction_line(mnemonic: &str, args: &[&str]) -> String {
    let mut line = String::from(mnemonic);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Rewrites one source instruction into intermediate-stream lines.
///
/// The pseudoinstructions `li`, `bge` and `move` become one or two concrete
/// instructions:
///
/// - `li rd, imm` becomes `addiu rd, $0, imm` when `imm` fits 16 signed
///   bits, otherwise a `lui $at` / `ori rd, $at` pair loading the two
///   halves. The immediate may be any signed or unsigned 32-bit literal.
/// - `bge rs, rt, label` becomes `slt $at, rs, rt` + `beq $at, $0, label`.
/// - `move rd, rs` becomes `addu rd, $0, rs`.
///
/// Every other mnemonic passes through verbatim with its arguments; whether
/// it means anything is the second pass's problem. Only pseudoinstruction
/// arity and the `li` immediate are checked here.
pub fn expand_instruction(mnemonic: &str, args: &[&str]) -> Result<Vec<String>, ExpandError> {
    match mnemonic {
        "li" => {
            if args.len() != 2 {
                return Err(ExpandError::WrongArity);
            }
            let immediate = parse_number(args[1], i64::from(i32::MIN), i64::from(u32::MAX))?;

            if -32768 <= immediate && immediate <= 32767 {
                Ok(vec![instruction_line("addiu", &[args[0], "$0", args[1]])])
            } else {
                // Upper half as unsigned, lower half bit-wise; both rendered
                // in decimal for the sub-instructions.
                let upper = ((immediate >> 16) as u16).to_string();
                let lower = (immediate & 0xffff).to_string();
                Ok(vec![
                    instruction_line("lui", &["$at", &upper]),
                    instruction_line("ori", &[args[0], "$at", &lower]),
                ])
            }
        }
        "bge" => {
            if args.len() != 3 {
                return Err(ExpandError::WrongArity);
            }
            Ok(vec![
                instruction_line("slt", &["$at", args[0], args[1]]),
                instruction_line("beq", &["$at", "$0", args[2]]),
            ])
        }
        "move" => {
            if args.len() != 2 {
                return Err(ExpandError::WrongArity);
            }
            Ok(vec![instruction_line("addu", &[args[0], "$0", args[1]])])
        }
        _ => Ok(vec![instruction_line(mnemonic, args)]),
    }
}

/// First pass: strips comments, collects labels into `symbols`, expands
/// pseudoinstructions and writes the intermediate stream to `output`.
///
/// A label is a first token ending in `:` and is recorded at the byte
/// offset of the next instruction to be emitted, whether or not one ever
/// follows. After a label (valid or not), the next token still starts an
/// instruction. Lines with more than [`MAX_ARGS`] arguments, invalid
/// labels, duplicate labels and unexpandable pseudoinstructions are
/// reported to `log` and emit nothing; the whole input is always consumed.
/// Returns the number of errors reported.
pub fn pass_one<R: BufRead, W: Write, L: Write>(
    input: R,
    output: &mut W,
    symbols: &mut SymbolTable,
    log: &mut L,
) -> Result<usize> {
    let mut errors = 0;
    let mut offset: u32 = 0;

    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        let line = line?;
        let tokens = tokenize(&line)?;
        let mut tokens = tokens.into_iter();

        let mut mnemonic = match tokens.next() {
            Some(token) => token,
            None => continue,
        };

        if let Some(label) = mnemonic.strip_suffix(':') {
            if !is_valid_label(label) {
                writeln!(log, "Error - invalid label at line {}: {}", number, label)?;
                errors += 1;
            } else if let Err(err) = symbols.add(label, offset) {
                writeln!(log, "{}", err)?;
                errors += 1;
            }
            mnemonic = match tokens.next() {
                Some(token) => token,
                None => continue,
            };
        }

        let args: Vec<&str> = tokens.collect();
        if args.len() > MAX_ARGS {
            writeln!(
                log,
                "Error - extra argument at line {}: {}",
                number, args[MAX_ARGS]
            )?;
            errors += 1;
            continue;
        }

        match expand_instruction(mnemonic, &args) {
            Ok(expanded) => {
                for instruction in &expanded {
                    writeln!(output, "{}", instruction)?;
                }
                offset += WORD_BYTES * expanded.len() as u32;
            }
            Err(_) => {
                log_invalid_instruction(log, number, mnemonic, &args)?;
                errors += 1;
            }
        }
    }

    Ok(errors)
}

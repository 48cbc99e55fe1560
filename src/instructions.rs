use std::error::Error;
use std::fmt;
use std::io::{BufRead, Write};

use crate::constants::*;
use crate::int_util::{parse_number, NumberError};
use crate::labels::{is_valid_label, SymbolError, SymbolTable};
use crate::parser::tokenize;
use crate::registers::{register_index, ParseRegisterError, Register};
use crate::{log_invalid_instruction, Result, Word};

/// Constructs an R-format instruction word (opcode 0).
#[inline]
pub fn make_rtype(funct: u32, rd: Register, rs: Register, rt: Register) -> Word {
    ((register_index(rs) << RS_OFFSET) & RS_MASK)
        | ((register_index(rt) << RT_OFFSET) & RT_MASK)
        | ((register_index(rd) << RD_OFFSET) & RD_MASK)
        | ((funct << FUNCT_OFFSET) & FUNCT_MASK)
}

/// Constructs a shift instruction word (opcode 0, rs 0).
#[inline]
pub fn make_shift(funct: u32, rd: Register, rt: Register, shamt: u32) -> Word {
    ((register_index(rt) << RT_OFFSET) & RT_MASK)
        | ((register_index(rd) << RD_OFFSET) & RD_MASK)
        | ((shamt << SHAMT_OFFSET) & SHAMT_MASK)
        | ((funct << FUNCT_OFFSET) & FUNCT_MASK)
}

/// Constructs an I-format instruction word. `immediate` carries the low 16
/// bits verbatim, so signed values must already be in two's complement.
#[inline]
pub fn make_itype(opcode: u32, rs: Register, rt: Register, immediate: u16) -> Word {
    ((opcode << OPCODE_OFFSET) & OPCODE_MASK)
        | ((register_index(rs) << RS_OFFSET) & RS_MASK)
        | ((register_index(rt) << RT_OFFSET) & RT_MASK)
        | ((u32::from(immediate) << IMMEDIATE_OFFSET) & IMMEDIATE_MASK)
}

/// Constructs a J-format instruction word.
#[inline]
pub fn make_jtype(opcode: u32, target: u32) -> Word {
    ((opcode << OPCODE_OFFSET) & OPCODE_MASK) | ((target << TARGET_OFFSET) & TARGET_MASK)
}

/// Reasons a line of the intermediate stream fails to encode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    UnknownMnemonic,
    WrongArity,
    Register(ParseRegisterError),
    Number(NumberError),
    /// A branch or jump target is not a syntactically valid label.
    BadLabel,
    /// A branch target is missing from the symbol table.
    UnresolvedLabel,
    /// A branch displacement does not fit in a signed 16-bit field.
    BranchTooFar,
    Symbol(SymbolError),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::UnknownMnemonic => write!(f, "unknown mnemonic"),
            EncodeError::WrongArity => write!(f, "wrong number of arguments"),
            EncodeError::Register(err) => write!(f, "{}", err),
            EncodeError::Number(err) => write!(f, "{}", err),
            EncodeError::BadLabel => write!(f, "target is not a valid label"),
            EncodeError::UnresolvedLabel => write!(f, "label is not in the symbol table"),
            EncodeError::BranchTooFar => write!(f, "branch target is too far away"),
            EncodeError::Symbol(err) => write!(f, "{}", err),
        }
    }
}

impl Error for EncodeError {}

impl From<ParseRegisterError> for EncodeError {
    fn from(err: ParseRegisterError) -> EncodeError {
        EncodeError::Register(err)
    }
}

impl From<NumberError> for EncodeError {
    fn from(err: NumberError) -> EncodeError {
        EncodeError::Number(err)
    }
}

impl From<SymbolError> for EncodeError {
    fn from(err: SymbolError) -> EncodeError {
        EncodeError::Symbol(err)
    }
}

fn encode_rtype(funct: u32, args: &[&str]) -> Result<Word, EncodeError> {
    if args.len() != 3 {
        return Err(EncodeError::WrongArity);
    }
    let rd: Register = args[0].parse()?;
    let rs: Register = args[1].parse()?;
    let rt: Register = args[2].parse()?;
    Ok(make_rtype(funct, rd, rs, rt))
}

fn encode_shift(funct: u32, args: &[&str]) -> Result<Word, EncodeError> {
    if args.len() != 3 {
        return Err(EncodeError::WrongArity);
    }
    let rd: Register = args[0].parse()?;
    let rt: Register = args[1].parse()?;
    let shamt = parse_number(args[2], 0, 31)?;
    Ok(make_shift(funct, rd, rt, shamt as u32))
}

fn encode_jr(funct: u32, args: &[&str]) -> Result<Word, EncodeError> {
    if args.len() != 1 {
        return Err(EncodeError::WrongArity);
    }
    let rs: Register = args[0].parse()?;
    Ok(((register_index(rs) << RS_OFFSET) & RS_MASK) | ((funct << FUNCT_OFFSET) & FUNCT_MASK))
}

fn encode_addiu(opcode: u32, args: &[&str]) -> Result<Word, EncodeError> {
    if args.len() != 3 {
        return Err(EncodeError::WrongArity);
    }
    let rt: Register = args[0].parse()?;
    let rs: Register = args[1].parse()?;
    let immediate = parse_number(args[2], -32768, 32767)?;
    Ok(make_itype(opcode, rs, rt, immediate as u16))
}

fn encode_ori(opcode: u32, args: &[&str]) -> Result<Word, EncodeError> {
    if args.len() != 3 {
        return Err(EncodeError::WrongArity);
    }
    let rt: Register = args[0].parse()?;
    let rs: Register = args[1].parse()?;
    let immediate = parse_number(args[2], 0, 65535)?;
    Ok(make_itype(opcode, rs, rt, immediate as u16))
}

fn encode_lui(opcode: u32, args: &[&str]) -> Result<Word, EncodeError> {
    if args.len() != 2 {
        return Err(EncodeError::WrongArity);
    }
    let rt: Register = args[0].parse()?;
    let immediate = parse_number(args[1], 0, 65535)?;
    Ok(make_itype(opcode, Register::Zero, rt, immediate as u16))
}

/// Loads and stores. The tokenizer splits `4($sp)` at the parentheses, so
/// the arguments arrive as `rt, offset, rs`.
fn encode_mem(opcode: u32, args: &[&str]) -> Result<Word, EncodeError> {
    if args.len() != 3 {
        return Err(EncodeError::WrongArity);
    }
    let rt: Register = args[0].parse()?;
    let offset = parse_number(args[1], -32768, 32767)?;
    let rs: Register = args[2].parse()?;
    Ok(make_itype(opcode, rs, rt, offset as u16))
}

/// PC-relative branches. With the target label at byte offset `L` and the
/// branch itself at `addr`, the encoded displacement is `(L - addr - 4) / 4`
/// words and must fit in a signed 16-bit field.
fn encode_branch(
    opcode: u32,
    args: &[&str],
    addr: u32,
    symbols: &SymbolTable,
) -> Result<Word, EncodeError> {
    if args.len() != 3 {
        return Err(EncodeError::WrongArity);
    }
    let rs: Register = args[0].parse()?;
    let rt: Register = args[1].parse()?;
    let label = args[2];

    if !is_valid_label(label) {
        return Err(EncodeError::BadLabel);
    }
    let target = symbols.addr_of(label).ok_or(EncodeError::UnresolvedLabel)?;

    let displacement = (i64::from(target) - i64::from(addr) - 4) / 4;
    if displacement < -32768 || 32767 < displacement {
        return Err(EncodeError::BranchTooFar);
    }
    Ok(make_itype(opcode, rs, rt, displacement as u16))
}

/// Absolute jumps. The target field is left zero and the jump site is
/// recorded in the relocation table for a later link step.
fn encode_jump(
    opcode: u32,
    args: &[&str],
    addr: u32,
    relocations: &mut SymbolTable,
) -> Result<Word, EncodeError> {
    if args.len() != 1 {
        return Err(EncodeError::WrongArity);
    }
    let label = args[0];

    if !is_valid_label(label) {
        return Err(EncodeError::BadLabel);
    }
    relocations.add(label, addr)?;
    Ok(make_jtype(opcode, 0))
}

/// Encodes one intermediate-stream instruction into a machine word.
///
/// `addr` is the byte offset of the instruction being encoded. Branches
/// resolve their target through `symbols`; jumps append their site to
/// `relocations`.
pub fn encode_instruction(
    mnemonic: &str,
    args: &[&str],
    addr: u32,
    symbols: &SymbolTable,
    relocations: &mut SymbolTable,
) -> Result<Word, EncodeError> {
    match mnemonic {
        "addu" => encode_rtype(FUNCT_ADDU, args),
        "or" => encode_rtype(FUNCT_OR, args),
        "slt" => encode_rtype(FUNCT_SLT, args),
        "sltu" => encode_rtype(FUNCT_SLTU, args),
        "sll" => encode_shift(FUNCT_SLL, args),
        "jr" => encode_jr(FUNCT_JR, args),
        "addiu" => encode_addiu(OPCODE_ADDIU, args),
        "ori" => encode_ori(OPCODE_ORI, args),
        "lui" => encode_lui(OPCODE_LUI, args),
        "lb" => encode_mem(OPCODE_LB, args),
        "lbu" => encode_mem(OPCODE_LBU, args),
        "lw" => encode_mem(OPCODE_LW, args),
        "sb" => encode_mem(OPCODE_SB, args),
        "sw" => encode_mem(OPCODE_SW, args),
        "beq" => encode_branch(OPCODE_BEQ, args, addr, symbols),
        "bne" => encode_branch(OPCODE_BNE, args, addr, symbols),
        "j" => encode_jump(OPCODE_J, args, addr, relocations),
        "jal" => encode_jump(OPCODE_JAL, args, addr, relocations),
        _ => Err(EncodeError::UnknownMnemonic),
    }
}

/// Second pass: encodes the intermediate stream into hex words.
///
/// The input is expected to be pass-one output: one instruction per line, no
/// comments, no labels. Every failing line is reported to `log` and skipped
/// without advancing the byte offset; the whole stream is always consumed.
/// Returns the number of errors reported.
pub fn pass_two<R: BufRead, W: Write, L: Write>(
    input: R,
    output: &mut W,
    symbols: &SymbolTable,
    relocations: &mut SymbolTable,
    log: &mut L,
) -> Result<usize> {
    let mut errors = 0;
    let mut offset: u32 = 0;

    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        let line = line?;
        let tokens = tokenize(&line)?;
        let (mnemonic, args) = match tokens.split_first() {
            Some((mnemonic, args)) => (*mnemonic, args),
            None => continue,
        };

        match encode_instruction(mnemonic, args, offset, symbols, relocations) {
            Ok(word) => {
                writeln!(output, "{:08x}", word)?;
                offset += WORD_BYTES;
            }
            Err(_) => {
                log_invalid_instruction(log, number, mnemonic, args)?;
                errors += 1;
            }
        }
    }

    Ok(errors)
}

use num::traits::{FromPrimitive, ToPrimitive};
use num_derive::{FromPrimitive, ToPrimitive};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// General purpose register identifiers, in index order.
///
/// Registers are written with a `$` prefix and accepted both under their
/// ABI name (`$t0`, `$sp`, ...) and their plain index (`$8`, `$29`, ...).
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Register {
    /// Always zero.
    Zero,
    /// Assembler temporary, reserved for pseudoinstruction expansion.
    At,
    /// Function results.
    V0,
    V1,
    /// Function arguments.
    A0,
    A1,
    A2,
    A3,
    /// Caller-saved temporaries.
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    /// Callee-saved.
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    /// More caller-saved temporaries.
    T8,
    T9,
    /// Reserved for the kernel.
    K0,
    K1,
    /// Global pointer.
    Gp,
    /// Stack pointer.
    Sp,
    /// Frame pointer.
    Fp,
    /// Return address.
    Ra,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseRegisterError {
    pub value: String,
}

impl fmt::Display for ParseRegisterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Failed to parse \"{}\" as a register.", &self.value)
    }
}

impl Error for ParseRegisterError {}

impl FromStr for Register {
    type Err = ParseRegisterError;

    fn from_str(name: &str) -> Result<Register, ParseRegisterError> {
        let err = || ParseRegisterError {
            value: name.to_owned(),
        };

        let body = name.strip_prefix('$').ok_or_else(err)?;
        let register = match body {
            "zero" => Register::Zero,
            "at" => Register::At,
            "v0" => Register::V0,
            "v1" => Register::V1,
            "a0" => Register::A0,
            "a1" => Register::A1,
            "a2" => Register::A2,
            "a3" => Register::A3,
            "t0" => Register::T0,
            "t1" => Register::T1,
            "t2" => Register::T2,
            "t3" => Register::T3,
            "t4" => Register::T4,
            "t5" => Register::T5,
            "t6" => Register::T6,
            "t7" => Register::T7,
            "s0" => Register::S0,
            "s1" => Register::S1,
            "s2" => Register::S2,
            "s3" => Register::S3,
            "s4" => Register::S4,
            "s5" => Register::S5,
            "s6" => Register::S6,
            "s7" => Register::S7,
            "t8" => Register::T8,
            "t9" => Register::T9,
            "k0" => Register::K0,
            "k1" => Register::K1,
            "gp" => Register::Gp,
            "sp" => Register::Sp,
            "fp" => Register::Fp,
            "ra" => Register::Ra,
            _ => {
                // Plain index form: decimal only, no sign, no leading zero.
                if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                if body.len() > 1 && body.starts_with('0') {
                    return Err(err());
                }
                let index: u32 = body.parse().map_err(|_| err())?;
                Register::from_u32(index).ok_or_else(err)?
            }
        };

        Ok(register)
    }
}

/// Index of `register` in the register file, suitable for a 5-bit field.
#[inline]
pub fn register_index(register: Register) -> u32 {
    register.to_u32().unwrap()
}

use num::Num;
use std::error::Error;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumberError {
    /// The token is not a number, or has trailing characters.
    Malformed,
    /// The value lies outside the requested bounds.
    OutOfRange,
}

impl fmt::Display for NumberError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NumberError::Malformed => write!(f, "token is not a valid number"),
            NumberError::OutOfRange => write!(f, "number is out of range"),
        }
    }
}

impl Error for NumberError {}

/// Parses an integer token with `strtol`-style base detection: decimal by
/// default, hexadecimal after `0x`/`0X`, octal after a leading `0`. An
/// optional sign precedes the base prefix. The whole token must be consumed
/// and the value must satisfy `lower <= value <= upper` (inclusive).
pub fn parse_number(text: &str, lower: i64, upper: i64) -> Result<i64, NumberError> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (16, hex)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    // `from_str_radix` tolerates its own leading sign; a sign here would
    // mean the token had two, or one after the base prefix.
    if digits.is_empty() || digits.starts_with('+') || digits.starts_with('-') {
        return Err(NumberError::Malformed);
    }

    let magnitude =
        <i64 as Num>::from_str_radix(digits, radix).map_err(|_| NumberError::Malformed)?;
    let value = if negative { -magnitude } else { magnitude };

    if value < lower || upper < value {
        return Err(NumberError::OutOfRange);
    }
    Ok(value)
}

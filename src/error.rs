use std::fmt;
use std::io;
use std::path::PathBuf;

use pest::error::Error as PestError;

use crate::parser::Rule;

/// Which side of a pass a file belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IoContext {
    Input,
    Output,
}

#[derive(Debug)]
pub enum Error {
    /// A named file could not be opened.
    Open(IoContext, PathBuf, io::Error),
    /// Reading or writing an already-open stream failed.
    Io(io::Error),
    /// A line could not be tokenized.
    Parse(PestError<Rule>),
    /// The given number of diagnostics were recorded during the passes. The
    /// emitted output is not authoritative.
    Assembly(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open(IoContext::Input, path, _) => {
                write!(f, "Error: unable to open input file: {}", path.display())
            }
            Error::Open(IoContext::Output, path, _) => {
                write!(f, "Error: unable to open output file: {}", path.display())
            }
            Error::Io(err) => write!(f, "Error: {}", err),
            Error::Parse(err) => write!(f, "{}", err),
            Error::Assembly(count) => {
                write!(f, "{} error(s) encountered during assembly", count)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open(_, _, err) | Error::Io(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Assembly(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<PestError<Rule>> for Error {
    fn from(err: PestError<Rule>) -> Error {
        Error::Parse(err)
    }
}

/*
 * This file is a part of the tracecache project.
 *
 * tracecache is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
*/

use std::fmt::{self, Display};
use std::io;

pub type CResult<T> = Result<T, Error>;

/// CLI-facing errors. The core crate never produces these: it only raises contract-violation
/// panics for programmer errors (see `tracecache_core`). Everything here is a recoverable,
/// operator-facing failure.
#[derive(Debug)]
pub enum Error {
    /// A file could not be opened or read
    Io(io::Error),
    /// A malformed row or field, tagged with the line it was found on
    Parse { line: usize, message: String },
    /// An inconsistent or incomplete configuration, caught before simulation starts
    Config(String),
}

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "i/o error: {e}"),
            Error::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
            Error::Config(e) => write!(f, "config error: {e}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::Config(format!("expected an integer: {e}"))
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(e: std::num::ParseFloatError) -> Self {
        Self::Config(format!("expected a floating-point number: {e}"))
    }
}

//! Line-oriented command protocol
//!
//! Requests are single lines of space-separated, case-sensitive tokens:
//! ```text
//! GET MODE
//! GET LAST <n>
//! SET MODE <AUTO|MANUAL>
//! SET OUTPUT <ON|OFF>
//! ```
//!
//! Tokens beyond what a command consumes are ignored.

use std::fmt;
use std::num::NonZeroUsize;

use thiserror::Error;

/// Server-wide operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Auto,
    Manual,
}

impl Mode {
    /// Wire representation of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Auto => "AUTO",
            Mode::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output flag, settable only in manual mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Off,
    On,
}

impl Output {
    /// Wire representation of this output value
    pub fn as_str(&self) -> &'static str {
        match self {
            Output::Off => "OFF",
            Output::On => "ON",
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated command parsed from one request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetMode,
    SetMode(Mode),
    SetOutput(Output),
    /// Return the `n` most recent records
    GetLast(NonZeroUsize),
}

/// Why a request line was rejected
///
/// The `Display` text is sent verbatim to the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Missing argument after GET")]
    MissingGetTarget,

    #[error("Missing N for GET LAST")]
    MissingCount,

    #[error("N must be positive integer")]
    InvalidCount,

    #[error("Unknown GET command")]
    UnknownGet,

    #[error("Missing argument after SET")]
    MissingSetTarget,

    #[error("Missing mode for SET MODE")]
    MissingMode,

    #[error("Unknown mode")]
    UnknownMode,

    #[error("Missing value for SET OUTPUT")]
    MissingOutput,

    #[error("Unknown output value")]
    UnknownOutput,

    #[error("Unknown SET command")]
    UnknownSet,

    #[error("Unknown command")]
    UnknownCommand,
}

/// Parse one trimmed, non-empty request line
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut tokens = line.split(' ').filter(|t| !t.is_empty());

    match tokens.next() {
        None => Err(ParseError::Empty),
        Some("GET") => match tokens.next() {
            None => Err(ParseError::MissingGetTarget),
            Some("MODE") => Ok(Command::GetMode),
            Some("LAST") => {
                let raw = tokens.next().ok_or(ParseError::MissingCount)?;
                // Rejects zero, negatives and anything that would overflow
                let n = raw
                    .parse::<NonZeroUsize>()
                    .map_err(|_| ParseError::InvalidCount)?;
                Ok(Command::GetLast(n))
            }
            Some(_) => Err(ParseError::UnknownGet),
        },
        Some("SET") => match tokens.next() {
            None => Err(ParseError::MissingSetTarget),
            Some("MODE") => match tokens.next() {
                None => Err(ParseError::MissingMode),
                Some("AUTO") => Ok(Command::SetMode(Mode::Auto)),
                Some("MANUAL") => Ok(Command::SetMode(Mode::Manual)),
                Some(_) => Err(ParseError::UnknownMode),
            },
            Some("OUTPUT") => match tokens.next() {
                None => Err(ParseError::MissingOutput),
                Some("ON") => Ok(Command::SetOutput(Output::On)),
                Some("OFF") => Ok(Command::SetOutput(Output::Off)),
                Some(_) => Err(ParseError::UnknownOutput),
            },
            Some(_) => Err(ParseError::UnknownSet),
        },
        Some(_) => Err(ParseError::UnknownCommand),
    }
}

/// A response to one command, encoded by [`crate::codec::encode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK MODE <mode>`
    Mode(Mode),
    /// `OK OUTPUT <output>`
    Output(Output),
    /// `OK`, each record, then `END`
    Records(Vec<String>),
    /// `ERR INVALID_STATE "<message>"`
    InvalidState(String),
    /// `ERR INVALID_ARGUMENT "<message>"`
    InvalidArgument(String),
    /// `ERR UNKNOWN_COMMAND`
    UnknownCommand,
    /// `ERR IO "<message>"`
    Io(String),
}

impl Response {
    /// Whether this response reports a failure
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Response::Mode(_) | Response::Output(_) | Response::Records(_)
        )
    }
}

impl From<ParseError> for Response {
    fn from(err: ParseError) -> Self {
        let reason = err.to_string();
        if reason.is_empty() {
            Response::UnknownCommand
        } else {
            Response::InvalidArgument(reason)
        }
    }
}

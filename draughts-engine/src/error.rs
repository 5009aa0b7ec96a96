//! Errors returned by the engine, the game record and the learning book.

use std::error;
use std::fmt::{self, Display};
use std::io;
use std::result;

pub type Result<T> = result::Result<T, Error>;

/// What went wrong, independent of any attached detail.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Square number outside 1 to 32, or not a number.
    ParseSquareMalformed,
    /// Text is not of the form `from-to` or `fromxto`.
    ParseMoveCodeMalformed,
    /// Board diagram malformed.
    ParseBoardMalformed,

    /// Learning store could not be read from or written to storage.
    BookIo,

    /// A foreground search is already running.
    EngineAlreadySearching,
    /// Search thread ended without delivering a result.
    EngineSearchLost,
    /// Worker pool no longer accepts jobs.
    ThreadPoolClosed,
    /// An engine thread could not be started.
    ThreadSpawnFailed,

    /// An illegal move was provided, and could not be applied to the game.
    GameIllegalMove,
    /// A move was requested after the game was decided.
    GameOver,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ParseSquareMalformed => "parse square malformed",
            ErrorKind::ParseMoveCodeMalformed => "parse move code malformed",
            ErrorKind::ParseBoardMalformed => "parse board malformed",

            ErrorKind::BookIo => "book io",

            ErrorKind::EngineAlreadySearching => "engine already searching",
            ErrorKind::EngineSearchLost => "engine search lost",
            ErrorKind::ThreadPoolClosed => "thread pool closed",
            ErrorKind::ThreadSpawnFailed => "thread spawn failed",

            ErrorKind::GameIllegalMove => "game illegal move",
            ErrorKind::GameOver => "game over",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error kind, optionally with a message or the underlying error.
#[derive(Debug)]
pub enum Error {
    Simple(ErrorKind),
    Message(ErrorKind, String),
    Custom(ErrorKind, Box<dyn error::Error + Send + Sync>),
}

impl Error {
    pub fn new<E>(error_kind: ErrorKind, inner_error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Custom(error_kind, inner_error.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Simple(error_kind) => *error_kind,
            Error::Message(error_kind, _) => *error_kind,
            Error::Custom(error_kind, _) => *error_kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Simple(error_kind) => {
                write!(f, "{error_kind}")
            }
            Error::Message(error_kind, string) => {
                write!(f, "{error_kind}: {string}")
            }
            Error::Custom(error_kind, ref box_error) => {
                write!(f, "{error_kind}, error: {}", *box_error)
            }
        }
    }
}

impl error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Self::Simple(error_kind)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Custom(ErrorKind::BookIo, error.into())
    }
}

impl<S: ToString> From<(ErrorKind, S)> for Error {
    fn from((error_kind, stringable): (ErrorKind, S)) -> Self {
        Self::Message(error_kind, stringable.to_string())
    }
}

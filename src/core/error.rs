use std::fmt;

/// Error taxonomy. Every fallible operation in this crate returns one of
/// these kinds, never a raw library error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad query syntax, missing corpus path, malformed CLI arguments.
    InputError,
    /// On-disk structures fail a checksum, length, or offset sanity check.
    IndexCorruption,
    /// Memory limit exceeded, disk full, too many open bucket files.
    ResourceError,
    /// Reader opened against an unfinished or half-written index.
    ProtocolError,
    /// A build or query was cooperatively cancelled.
    Cancelled,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn input(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::InputError, context)
    }

    pub fn corruption(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::IndexCorruption, context)
    }

    pub fn resource(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::ResourceError, context)
    }

    pub fn protocol(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::ProtocolError, context)
    }

    pub fn cancelled(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Cancelled, context)
    }

    /// CLI exit code per the §6 table: 0 success, 1 input/protocol,
    /// 2 corruption/resource, 3 cancelled.
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::InputError | ErrorKind::ProtocolError => 1,
            ErrorKind::IndexCorruption | ErrorKind::ResourceError => 2,
            ErrorKind::Cancelled => 3,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::input(err.to_string()),
            std::io::ErrorKind::UnexpectedEof => Error::corruption(err.to_string()),
            _ => Error::resource(err.to_string()),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::corruption(format!("bincode: {}", err))
    }
}

impl From<fst::Error> for Error {
    fn from(err: fst::Error) -> Self {
        Error::corruption(format!("fst: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

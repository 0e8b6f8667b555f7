use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[allow(missing_docs, reason = "The variants are self-explanatory.")]
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[display("Configuration store is not available")]
    StorageUnavailable,

    #[display("Configuration store read or write failed")]
    StorageIo,

    #[display("Configuration record is corrupted")]
    StorageCorrupted,

    #[display("Format error")]
    FormatError,

    #[display("Index out of bounds")]
    IndexOutOfBounds,

    #[display("Ticker text does not fit the ticker buffer")]
    TickerTooLong,

    #[display("Icon does not fit the display")]
    IconTooLarge,
}

impl From<postcard::Error> for Error {
    fn from(_: postcard::Error) -> Self {
        Self::FormatError
    }
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::FormatError
    }
}

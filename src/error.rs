use core::fmt;

/// Represents errors that can occur when accessing or configuring a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested key is not present
    KeyNotFound,

    /// The rebuild density is outside the accepted range. Holds the rejected
    /// density.
    InvalidDensity(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::KeyNotFound => write!(f, "key not found"),
            Error::InvalidDensity(density) => {
                write!(f, "invalid rebuild density {density}, must be between 2 and 16")
            }
        }
    }
}

impl core::error::Error for Error {}

/// Table result
pub type Result<T> = core::result::Result<T, Error>;

//! Error types for tagpack operations.

use thiserror::Error;

/// Result type for tagpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tagpack decoding.
///
/// Encoding never fails; every variant here is raised by a [`Decoder`](crate::Decoder)
/// or by code walking one. After an error the decoder's cursor is unspecified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The tag at the cursor is not compatible with the requested type.
    #[error("invalid conversion from tag 0x{0:02x}")]
    Conversion(u8),

    /// Fewer bytes remain than the value needs.
    #[error("buffer underflow: needed {needed} bytes, only {available} available")]
    Underflow { needed: usize, available: usize },

    /// String payload is not valid UTF-8.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Containers are nested deeper than the decoder allows.
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),
}

impl Error {
    /// Creates an underflow error.
    pub fn underflow(needed: usize, available: usize) -> Self {
        Self::Underflow { needed, available }
    }

    /// Returns true for an underflow error.
    pub fn is_underflow(&self) -> bool {
        matches!(self, Self::Underflow { .. })
    }

    /// Returns true for a conversion error.
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }
}

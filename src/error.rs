//! Errors raised while a converter runs.
//!
//! Failing to *find* a converter is not an error: resolution returns
//! [`None`] and the caller decides what to do. The types here describe what
//! can go wrong once a converter has been produced and is applied to a value.

use alloc::string::String;
use core::fmt;

use rootcause::Report;

/// A [`Result`](core::result::Result) whose error is a
/// [`Report<ConversionError>`].
pub type ConversionResult<T> = core::result::Result<T, Report<ConversionError>>;

/// The reason a conversion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A value did not have the runtime type the converter was built for.
    TypeMismatch {
        /// Name of the type the converter expected.
        expected: &'static str,
        /// Name of the type it was given.
        found: &'static str,
    },
    /// A converter produced an absent value where a present one is required.
    UnexpectedNull {
        /// Name of the type that cannot be absent.
        target: &'static str,
    },
    /// No converter exists for the requested pair of types.
    NoConverter {
        /// Name of the source type.
        source: &'static str,
        /// Name of the target type.
        target: &'static str,
    },
    /// A user-supplied converter rejected its input.
    InvalidValue {
        /// Human readable reason.
        message: String,
    },
}

impl ConversionError {
    /// Creates an [`InvalidValue`](Self::InvalidValue) error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected a value of type {expected}, found {found}")
            }
            Self::UnexpectedNull { target } => {
                write!(f, "converter produced no value for non-nullable {target}")
            }
            Self::NoConverter { source, target } => {
                write!(f, "no converter from {source} to {target}")
            }
            Self::InvalidValue { message } => write!(f, "invalid value: {message}"),
        }
    }
}

impl core::error::Error for ConversionError {}

/// Attachment recording which collection element failed to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementIndex(pub usize);

impl fmt::Display for ElementIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "while converting element {}", self.0)
    }
}

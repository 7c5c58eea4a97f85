//! Error types for parsing and serialization.
//!
//! Two error kinds carry the whole contract: [`Error::Parse`] (source text
//! does not conform to the declared or detected format) and
//! [`Error::Serialize`] (a value cannot be rendered in the target format).
//! Both are fully recovered at the conversion boundary and surfaced as
//! sentinel strings in the normal output channel: the boundary itself has
//! no error return path. Internally everything is a proper `Result` so
//! callers and tests can still distinguish success from failure.
//!
//! ## Examples
//!
//! ```rust
//! use anyform::{parse, Format};
//!
//! let result = parse("{invalid", Format::Json);
//! assert!(result.is_err());
//! if let Err(err) = result {
//!     // The user-visible rendering of this failure:
//!     assert_eq!(err.sentinel(), "Error: Could not parse json");
//! }
//! ```

use crate::Format;
use std::fmt;
use thiserror::Error;

/// All errors the conversion engine can produce.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Source text does not conform to the declared/detected format.
    #[error("could not parse input as {format}: {msg}")]
    Parse {
        format: Format,
        msg: String,
    },

    /// A value cannot be rendered in the target format.
    #[error("could not serialize value to {format}: {msg}")]
    Serialize {
        format: Format,
        msg: String,
    },

    /// A format tag string did not name any supported format.
    #[error("unknown format tag: {0:?}")]
    UnknownFormat(String),
}

impl Error {
    /// Creates a parse error for the given source format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use anyform::{Error, Format};
    ///
    /// let err = Error::parse(Format::Json, "unexpected end of input");
    /// assert!(err.to_string().contains("json"));
    /// ```
    pub fn parse<T: fmt::Display>(format: Format, msg: T) -> Self {
        Error::Parse {
            format,
            msg: msg.to_string(),
        }
    }

    /// Creates a serialize error for the given target format.
    pub fn serialize<T: fmt::Display>(format: Format, msg: T) -> Self {
        Error::Serialize {
            format,
            msg: msg.to_string(),
        }
    }

    /// Renders this error as the user-visible sentinel string.
    ///
    /// The sentinel shape is part of the UI contract: conversion never
    /// throws past the engine boundary, it embeds one of these strings in
    /// the normal output instead.
    #[must_use]
    pub fn sentinel(&self) -> String {
        match self {
            Error::Parse { format, .. } => {
                format!("Error: Could not parse {}", format.as_str())
            }
            Error::Serialize { format, .. } => {
                format!("Error: Could not convert to {}", format.as_str())
            }
            Error::UnknownFormat(tag) => format!("Error: Unknown format {}", tag),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

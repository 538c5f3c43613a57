//! Error types for parsing command-surface input, with error codes and helpful messages.
//!
//! # Error Codes
//!
//! Each error variant has a unique code (E001-E007) for documentation lookup:
//!
//! - E001: `ParseFailure` (Generic parse failure)
//! - E002: `EmptyInput` (Nothing to parse)
//! - E003: `InvalidLetter` (Character outside a-z)
//! - E004: `EmptyFragment` (Empty entry in a fragment list)
//! - E005: `InvalidNumber` (Integer parsing error)
//! - E006: `ClauseParseError` (Parse error in one list item (wraps another error))
//! - E007: `NomError` (Low-level nom parser error)
//!
//! # Examples
//!
//! ## Basic Error Handling
//!
//! ```
//! use runkey::errors::ParseError;
//!
//! fn parse_something(input: &str) -> Result<(), Box<ParseError>> {
//!     if input.is_empty() {
//!         return Err(Box::new(ParseError::EmptyInput));
//!     }
//!     Ok(())
//! }
//!
//! match parse_something("") {
//!     Err(e) => {
//!         println!("Error: {}", e);
//!         println!("Code: {}", e.code());
//!         if let Some(help) = e.help() {
//!             println!("Help: {}", help);
//!         }
//!     }
//!     Ok(_) => println!("Success"),
//! }
//! ```
//!
//! ## Error Wrapping with Context
//!
//! ```
//! use runkey::errors::ParseError;
//!
//! fn parse_fragment(fragment: &str) -> Result<String, Box<ParseError>> {
//!     match fragment.chars().find(|c| !c.is_ascii_lowercase()) {
//!         Some(invalid_char) => Err(Box::new(ParseError::InvalidLetter {
//!             input: fragment.to_string(),
//!             invalid_char,
//!         })),
//!         None => Ok(fragment.to_string()),
//!     }
//! }
//!
//! let err = parse_fragment("qv!").map_err(|e| ParseError::ClauseParseError {
//!     clause: "qv!".to_string(),
//!     source: e,
//! });
//! assert_eq!(err.unwrap_err().code(), "E006");
//! ```

use nom::error::{ErrorKind, ParseError as NomParseError};
use std::io;
use std::num::ParseIntError;

/// Custom error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Input parsing failed: \"{s}\"")]
    ParseFailure { s: String },

    #[error("Empty input")]
    EmptyInput,

    #[error("Invalid character '{invalid_char}' in \"{input}\" (only letters a-z allowed)")]
    InvalidLetter { input: String, invalid_char: char },

    #[error("Empty fragment at position {position}")]
    EmptyFragment { position: usize },

    #[error("int-parsing error: {0}")]
    InvalidNumber(#[from] ParseIntError),

    #[error("Parse error in '{clause}': {source}")]
    ClauseParseError {
        clause: String,
        #[source]
        source: Box<ParseError>,
    },

    // nom parser error (lowest level)
    #[error("nom parser error: {0:?}")]
    NomError(ErrorKind),
}

impl From<ParseError> for io::Error {
    fn from(pe: ParseError) -> Self {
        // String version is the least fragile (no Send/Sync bounds issues)
        io::Error::new(io::ErrorKind::InvalidInput, pe.to_string())
    }
}

impl From<ParseIntError> for Box<ParseError> {
    fn from(pie: ParseIntError) -> Self {
        Box::new(ParseError::InvalidNumber(pie))
    }
}

impl<'a> NomParseError<&'a str> for Box<ParseError> {
    fn from_error_kind(_input: &'a str, kind: ErrorKind) -> Self {
        Box::new(ParseError::NomError(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        // keep the innermost error; it names the offending token
        other
    }
}

impl ParseError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::ParseFailure { .. } => "E001",
            ParseError::EmptyInput => "E002",
            ParseError::InvalidLetter { .. } => "E003",
            ParseError::EmptyFragment { .. } => "E004",
            ParseError::InvalidNumber(_) => "E005",
            ParseError::ClauseParseError { .. } => "E006",
            ParseError::NomError(_) => "E007",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ParseError::ParseFailure { .. } => "Generic parse failure",
            ParseError::EmptyInput => "Nothing to parse",
            ParseError::InvalidLetter { .. } => "Character outside a-z",
            ParseError::EmptyFragment { .. } => "Empty entry in a fragment list",
            ParseError::InvalidNumber(_) => "Integer parsing error",
            ParseError::ClauseParseError { .. } => "Parse error in one list item",
            ParseError::NomError(_) => "Low-level nom parser error",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            ParseError::ParseFailure { .. } => "The input could not be parsed for a reason not covered by a more specific error.",
            ParseError::EmptyInput => "A cipher, plaintext, key or fragment list was given but contained no letters.",
            ParseError::InvalidLetter { .. } => "Known texts and fragments are letters of the 26-letter alphabet. Uppercase input is lower-cased first; digits, punctuation and accented letters are rejected.",
            ParseError::EmptyFragment { .. } => "A fragment list contained two separators in a row or a trailing separator, which would describe a zero-length fragment.",
            ParseError::InvalidNumber(_) => "A numeric option could not be parsed as a non-negative integer.",
            ParseError::ClauseParseError { .. } => "One item of a list failed to parse. The wrapped error names the specific problem.",
            ParseError::NomError(_) => "The low-level parser rejected the input. This usually means an unexpected separator or character.",
        }
    }

    /// Returns a helpful suggestion or example for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ParseError::EmptyInput => Some("Example: --cipher xzfdq or --fragments qvu,bma,e"),
            ParseError::InvalidLetter { .. } => Some("Only letters a-z are allowed; remove spaces, digits and punctuation"),
            ParseError::EmptyFragment { .. } => Some("Separate fragments with a single comma or space, e.g. 'qvu,bma,e'"),
            ParseError::InvalidNumber(_) => Some("Use a plain decimal integer such as 3"),
            _ => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            ParseError::ClauseParseError { source, .. } => {
                format!(
                    "{}\n  caused by: {}",
                    format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
                    source.display_detailed()
                )
            }
            _ => format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
        }
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(base_msg: &str, code: &str, help: Option<&str>) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}

//! Generate error code documentation from the source of truth (error enums).
//!
//! This binary reads the error codes, descriptions, details, and help text
//! directly from the `ParseError` and `SolverError` implementations via their
//! `code()`, `description()`, `details()`, and `help()` methods.
//!
//! Run with:
//! ```bash
//! cargo run --bin generate_error_docs > docs/ERROR_CODES.md
//! ```

use std::fmt::Write as _;

use runkey::errors::ParseError;
use runkey::solver::SolverError;

/// Append one documentation section per error to `$out`.
/// Works for any error type with `code()`, `description()`, `details()`, `help()`
/// and `display_detailed()`.
macro_rules! generate_error_docs {
    ($out:expr, $errors:expr) => {
        for error in $errors {
            let _ = writeln!($out, "### {}: {}\n", error.code(), error.description());
            let _ = writeln!($out, "**Details:** {}\n", error.details());

            if let Some(help_text) = error.help() {
                let _ = writeln!($out, "**How to fix:**\n```\n{help_text}\n```\n");
            }

            let _ = writeln!($out, "**Example error message:**\n```\n{error}\n```\n");
            let _ = writeln!($out, "**Detailed format:**\n```\n{}\n```\n", error.display_detailed());
            let _ = writeln!($out, "---\n");
        }
    };
}

/// One instance of every `ParseError` variant
fn all_parse_error_variants() -> Vec<ParseError> {
    vec![
        ParseError::ParseFailure { s: "30 minutes".to_string() },
        ParseError::EmptyInput,
        ParseError::InvalidLetter { input: "xz1dq".to_string(), invalid_char: '1' },
        ParseError::EmptyFragment { position: 2 },
        // build a real ParseIntError from an overflowing number
        match "99999999999999999999999".parse::<u64>() {
            Err(e) => ParseError::InvalidNumber(e),
            Ok(_) => ParseError::EmptyInput,
        },
        ParseError::ClauseParseError {
            clause: "b1a".to_string(),
            source: Box::new(ParseError::InvalidLetter { input: "b1a".to_string(), invalid_char: '1' }),
        },
        ParseError::NomError(nom::error::ErrorKind::Alpha),
    ]
}

/// One instance of every `SolverError` variant
fn all_solver_error_variants() -> Vec<SolverError> {
    vec![
        SolverError::ParseFailure(Box::new(ParseError::EmptyInput)),
        SolverError::InvalidInput { reason: "both a plaintext and a key were given".to_string() },
        SolverError::AmbiguousResidue {
            residue: "n".to_string(),
            fragments: vec!["nc".to_string(), "ngqzp".to_string()],
        },
        SolverError::EmptyDictionary {
            dictionary: "words.txt".to_string(),
            source: Some(std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory")),
        },
    ]
}

fn render_docs() -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Error Code Reference\n");
    let _ = writeln!(out, "**This document is auto-generated from the source code. Do not edit manually.**\n");

    let _ = writeln!(out, "## Table of Contents\n");
    let _ = writeln!(out, "- [Solver Errors (S001–S004)](#solver-errors)");
    let _ = writeln!(out, "- [Parse Errors (E001–E007)](#parse-errors)");
    let _ = writeln!(out, "- [How to Use Error Codes](#how-to-use-error-codes)\n");

    let _ = writeln!(out, "## Solver Errors\n");
    let _ = writeln!(out, "Errors raised before or around a search. These wrap lower-level parse errors or reject a puzzle or dictionary.\n");
    generate_error_docs!(out, all_solver_error_variants());

    let _ = writeln!(out, "## Parse Errors\n");
    let _ = writeln!(out, "Errors that occur when parsing letters, fragment lists or durations from the command line.\n");
    generate_error_docs!(out, all_parse_error_variants());

    let _ = writeln!(out, "\n## How to Use Error Codes\n");
    let _ = writeln!(out, "When you see an error like:\n");
    let _ = writeln!(out, "```");
    let _ = writeln!(out, "Error: invalid input: neither a plaintext nor a key was given (S002)");
    let _ = writeln!(out, "Help: Give exactly one of --plain or --key");
    let _ = writeln!(out, "```\n");
    let _ = writeln!(out, "1. Note the error code (e.g., `S002`)");
    let _ = writeln!(out, "2. Look it up in this document for detailed explanation");
    let _ = writeln!(out, "3. Follow the suggested resolution steps\n");

    let _ = writeln!(out, "## Error Display Formats\n");
    let _ = writeln!(out, "### Simple Format");
    let _ = writeln!(out, "```\nError: <message>\n```\n");
    let _ = writeln!(out, "### Detailed Format (via `display_detailed()`)");
    let _ = writeln!(out, "```\n<message> (<code>)\n<help text if available>\n```");

    out
}

fn main() {
    print!("{}", render_docs());
}

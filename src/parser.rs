//! Parsers for the text the command line hands us: letter strings, fragment lists and
//! durations. Everything is normalised to lowercase a-z before it reaches the search.

use std::time::Duration;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, digit1, multispace0, multispace1},
    combinator::opt,
    multi::separated_list1,
    sequence::delimited,
    IResult,
    Parser,
};

use crate::alphabet::first_invalid_letter;
use crate::errors::ParseError;

/// Parser result type: input, output, with our custom `ParseError`
pub type PResult<'a, O> = IResult<&'a str, O, Box<ParseError>>;

fn invalid_letter(input: &str, rest: &str) -> Box<ParseError> {
    let invalid_char = first_invalid_letter(rest).unwrap_or('?');
    Box::new(ParseError::InvalidLetter { input: input.to_string(), invalid_char })
}

/// Parse a known cipher, plaintext or key: trimmed, lower-cased, letters only.
///
/// # Errors
///
/// `EmptyInput` for blank input; `InvalidLetter` naming the first character outside a-z.
pub fn parse_letters(raw: &str) -> Result<String, Box<ParseError>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Box::new(ParseError::EmptyInput));
    }
    let lowered = trimmed.to_lowercase();

    match alpha1::<&str, Box<ParseError>>.parse(lowered.as_str()) {
        Ok(("", letters)) => Ok(letters.to_string()),
        Ok((rest, _)) => Err(invalid_letter(trimmed, rest)),
        Err(_) => Err(invalid_letter(trimmed, &lowered)),
    }
}

/// Like [`parse_letters`], but blank input means "nothing known yet".
///
/// # Errors
///
/// `InvalidLetter` naming the first character outside a-z.
pub fn parse_optional_letters(raw: &str) -> Result<String, Box<ParseError>> {
    if raw.trim().is_empty() {
        Ok(String::new())
    } else {
        parse_letters(raw)
    }
}

fn fragment_token(input: &str) -> PResult<'_, &str> {
    take_while1(|c: char| c != ',' && !c.is_whitespace()).parse(input)
}

fn fragment_separator(input: &str) -> PResult<'_, &str> {
    alt((delimited(multispace0, tag(","), multispace0), multispace1)).parse(input)
}

/// Parse a list of cipher fragments separated by commas and/or whitespace.
///
/// Order is preserved: it decides the order in which the search tries fragments.
///
/// # Errors
///
/// `EmptyInput` for a blank list, `EmptyFragment` for `a,,b` or a trailing comma, and
/// `ClauseParseError` wrapping `InvalidLetter` for a fragment with characters outside a-z.
pub fn parse_fragment_list(raw: &str) -> Result<Vec<String>, Box<ParseError>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Box::new(ParseError::EmptyInput));
    }

    let (rest, tokens) = match separated_list1(fragment_separator, fragment_token).parse(trimmed) {
        Ok(parsed) => parsed,
        Err(_) => return Err(Box::new(ParseError::EmptyFragment { position: 1 })),
    };

    if !rest.is_empty() {
        return if rest.trim_start().starts_with(',') {
            Err(Box::new(ParseError::EmptyFragment { position: tokens.len() + 1 }))
        } else {
            Err(Box::new(ParseError::ParseFailure { s: rest.to_string() }))
        };
    }

    tokens
        .into_iter()
        .map(|token| {
            parse_letters(token).map_err(|source| {
                Box::new(ParseError::ClauseParseError { clause: token.to_string(), source })
            })
        })
        .collect()
}

/// Parse a duration in whole seconds, with an optional `s` suffix (`30`, `30s`).
///
/// # Errors
///
/// `InvalidNumber` if the digits do not fit, `ParseFailure` for anything else.
pub fn parse_seconds(raw: &str) -> Result<Duration, Box<ParseError>> {
    let trimmed = raw.trim();
    let parsed: PResult<'_, (&str, Option<&str>)> = (digit1, opt(tag("s"))).parse(trimmed);
    match parsed {
        Ok(("", (digits, _))) => Ok(Duration::from_secs(digits.parse::<u64>()?)),
        _ => Err(Box::new(ParseError::ParseFailure { s: trimmed.to_string() })),
    }
}

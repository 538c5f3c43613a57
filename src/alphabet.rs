use std::collections::HashSet;
use std::sync::LazyLock;

// Character-set constants
pub(crate) const ALPHABET_SIZE: usize = 26;
#[cfg(test)]
pub(crate) const LOWERCASE_ALPHABET: std::ops::RangeInclusive<char> = 'a'..='z';

pub(crate) const VOWELS: &str = "aeiouy";
#[cfg(test)]
pub(crate) const CONSONANTS: &str = "bcdfghjklmnpqrstvwxz";

static VOWEL_SET: LazyLock<HashSet<char>> = LazyLock::new(|| VOWELS.chars().collect());

/// Letter classification used by the dictionary filters and input validation.
pub(crate) trait LetterChar {
    fn is_vowel(&self) -> bool;
    fn is_cipher_letter(&self) -> bool;
}

impl LetterChar for char {
    fn is_vowel(&self) -> bool {
        VOWEL_SET.contains(self)
    }
    fn is_cipher_letter(&self) -> bool {
        self.is_ascii_lowercase()
    }
}

/// 'a' -> 0, 'b' -> 1, ..., 'z' -> 25, working on raw bytes for the codec hot path.
///
/// Callers guarantee `b` is in `b'a'..=b'z'`; anything else is a logic error upstream.
#[inline]
pub(crate) fn letter_to_num(b: u8) -> u8 {
    debug_assert!(b.is_ascii_lowercase(), "letter_to_num: '{}' is not a-z", b as char);
    b - b'a'
}

/// 0 -> 'a', ..., 25 -> 'z'
#[inline]
pub(crate) fn num_to_letter(n: u8) -> u8 {
    debug_assert!((n as usize) < ALPHABET_SIZE, "num_to_letter: {n} out of range");
    b'a' + n
}

/// First character of `s` outside a-z, if any.
pub(crate) fn first_invalid_letter(s: &str) -> Option<char> {
    s.chars().find(|c| !c.is_cipher_letter())
}

//! `dictionary`: load, clean and index the word list for runkey
//!
//! This module is responsible for reading a dictionary (either from a file, or from an
//! in-memory string) and building the read-only index every search branch shares.
//!
//! The output is a `Dictionary` struct holding the same words twice: a sorted `Vec<String>`
//! for prefix-range queries and a `HashSet<String>` for O(1) membership.
//!
//! The parsing logic:
//! - Each line holds one token; surrounding whitespace is trimmed.
//! - ASCII punctuation is removed (so "don't" becomes "dont") and the token is lower-cased.
//! - Tokens with anything other than a-z left over are skipped.
//! - Tokens shorter than `min_word_len` are skipped.
//! - Optionally, tokens without a vowel (`aeiouy`) are skipped, and a fixed list of
//!   common short words is appended regardless of `min_word_len`.
//! - The final list is sorted ascending and deduplicated.
//!
//! The public API provides:
//! - `Dictionary::from_words(...)`: build directly from words that are already clean.
//! - `Dictionary::parse_from_str(...)`: clean and index raw file contents.
//! - `Dictionary::load_from_path(...)`: convenience method to read from a file path.

use std::collections::HashSet;
use std::ops::Range;

use crate::alphabet::LetterChar;

/// Short words that most dictionaries carry but that a `min_word_len` of 3 would drop.
pub const COMMON_SHORT_WORDS: [&str; 17] = [
    "a", "in", "on", "of", "by", "to", "up", "at", "or", "it", "an", "no", "do", "be", "go", "is", "as",
];

/// Filters applied while loading a dictionary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryOptions {
    /// Words shorter than this are dropped.
    pub min_word_len: usize,
    /// Drop words with no vowel (`aeiouy`); removes most abbreviations.
    pub require_vowel: bool,
    /// Append [`COMMON_SHORT_WORDS`] after filtering.
    pub add_short_words: bool,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self { min_word_len: 3, require_vowel: false, add_short_words: false }
    }
}

impl DictionaryOptions {
    #[must_use]
    pub fn with_min_word_len(min_word_len: usize) -> Self {
        Self { min_word_len, ..Self::default() }
    }
}

/// Sorted, deduplicated word list plus a membership set.
///
/// Read-only after construction; every search branch borrows the same instance.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Ascending, distinct, lowercase words.
    /// Example: `["apple", "cat", "cats", "do", ...]`
    words: Vec<String>,
    /// Same content as `words`.
    set: HashSet<String>,
}

impl Dictionary {
    /// Build a dictionary from words that are already clean lowercase a-z.
    ///
    /// The words are sorted and deduplicated; no other filtering happens.
    pub fn from_words<I, S>(words: I) -> Dictionary
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        words.sort();
        words.dedup();

        debug_assert!(
            words.iter().all(|w| w.bytes().all(|b| b.is_ascii_lowercase())),
            "from_words expects lowercase a-z words"
        );

        let set = words.iter().cloned().collect();
        Dictionary { words, set }
    }

    /// Parse a raw dictionary from an in-memory string.
    ///
    /// # Behavior:
    /// 1. Splits the input into lines and trims each one.
    /// 2. Removes ASCII punctuation and lower-cases what is left.
    /// 3. Skips empty tokens and tokens with characters outside a-z.
    /// 4. Applies the length and vowel filters from `options`.
    /// 5. Optionally appends the common short words.
    /// 6. Sorts and deduplicates.
    #[must_use]
    pub fn parse_from_str(contents: &str, options: &DictionaryOptions) -> Dictionary {
        let mut words: Vec<String> = contents
            .lines()
            .filter_map(|raw_line| {
                let cleaned: String = raw_line
                    .trim()
                    .chars()
                    .filter(|c| !c.is_ascii_punctuation())
                    .flat_map(char::to_lowercase)
                    .collect();

                if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_cipher_letter()) {
                    None
                } else if cleaned.len() < options.min_word_len {
                    None
                } else if options.require_vowel && !cleaned.chars().any(|c| c.is_vowel()) {
                    None
                } else {
                    Some(cleaned)
                }
            })
            .collect();

        if options.add_short_words {
            words.extend(COMMON_SHORT_WORDS.iter().map(|w| (*w).to_string()));
        }

        Self::from_words(words)
    }

    /// Convenience method: read from a file path and parse.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to read a file at `path`.
    pub fn load_from_path<P: AsRef<std::path::Path>>(
        path: P,
        options: &DictionaryOptions,
    ) -> std::io::Result<Dictionary> {
        let path_ref = path.as_ref();

        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read dictionary from '{}': {}", path_ref.display(), e)
            )
        })?;

        Ok(Self::parse_from_str(&data, options))
    }

    /// Number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All words in ascending order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// O(1) membership test.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word)
    }

    /// Index range of every word starting with `prefix`.
    ///
    /// Binary search finds the first word `>= prefix`; a linear scan then extends the
    /// range while the prefix still matches. An empty prefix yields an empty range.
    #[must_use]
    pub fn prefix_range(&self, prefix: &str) -> Range<usize> {
        if prefix.is_empty() {
            return 0..0;
        }

        let start = self.words.partition_point(|w| w.as_str() < prefix);
        let end = start
            + self.words[start..]
                .iter()
                .take_while(|w| w.starts_with(prefix))
                .count();

        debug_assert!(start <= end && end <= self.words.len());
        start..end
    }

    /// Words starting with `prefix`, in ascending order.
    #[must_use]
    pub fn words_with_prefix(&self, prefix: &str) -> &[String] {
        &self.words[self.prefix_range(prefix)]
    }

    /// True iff `stub` is a non-empty proper prefix of some strictly longer word.
    ///
    /// A word equal to `stub` does not count.
    #[must_use]
    pub fn is_proper_prefix(&self, stub: &str) -> bool {
        self.words_with_prefix(stub).iter().any(|w| w.len() > stub.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Dictionary {
        Dictionary::from_words(["cat", "apple", "cats", "do", "dog", "dogmeat", "go", "good"])
    }

    #[test]
    fn test_from_words_sorts_and_dedups() {
        let dict = Dictionary::from_words(["dog", "cat", "dog", "ant"]);
        assert_eq!(dict.words(), ["ant", "cat", "dog"]);
        assert_eq!(dict.len(), 3);
        assert!(dict.contains("dog"));
        assert!(!dict.contains("do"));
    }

    #[test]
    fn test_set_matches_list() {
        let dict = sample();
        for w in dict.words() {
            assert!(dict.contains(w));
        }
        assert_eq!(dict.set.len(), dict.words.len());
    }

    #[test]
    fn test_prefix_range_matches_filter() {
        let dict = sample();
        for prefix in ["a", "c", "ca", "cat", "cats", "d", "do", "dog", "g", "go", "goo", "x", "zz", "apples"] {
            let expected: Vec<&str> = dict
                .words()
                .iter()
                .filter(|w| w.starts_with(prefix))
                .map(String::as_str)
                .collect();
            let got: Vec<&str> = dict.words_with_prefix(prefix).iter().map(String::as_str).collect();
            assert_eq!(got, expected, "prefix {prefix}");
        }
    }

    proptest! {
        #[test]
        fn test_prefix_range_matches_filter_for_any_word_set(
            words in prop::collection::vec("[a-e]{1,6}", 0..40),
            prefix in "[a-e]{0,3}",
        ) {
            let dict = Dictionary::from_words(words);
            let expected: Vec<&String> = if prefix.is_empty() {
                Vec::new()
            } else {
                dict.words().iter().filter(|w| w.starts_with(prefix.as_str())).collect()
            };
            let got: Vec<&String> = dict.words_with_prefix(&prefix).iter().collect();
            prop_assert_eq!(got, expected);
            prop_assert_eq!(
                dict.is_proper_prefix(&prefix),
                !prefix.is_empty() && dict.words().iter().any(|w| w.len() > prefix.len() && w.starts_with(prefix.as_str()))
            );
        }
    }

    #[test]
    fn test_prefix_range_is_contiguous() {
        let dict = sample();
        assert_eq!(dict.prefix_range("do"), 3..6);
        assert_eq!(&dict.words()[dict.prefix_range("do")], ["do", "dog", "dogmeat"]);
    }

    #[test]
    fn test_empty_prefix_or_no_match_is_empty_range() {
        let dict = sample();
        assert!(dict.prefix_range("").is_empty());
        assert!(dict.prefix_range("q").is_empty());
        assert!(Dictionary::default().prefix_range("a").is_empty());
    }

    #[test]
    fn test_is_proper_prefix() {
        let dict = sample();
        assert!(dict.is_proper_prefix("dog")); // dogmeat
        assert!(dict.is_proper_prefix("g")); // go, good
        assert!(dict.is_proper_prefix("app"));
        assert!(!dict.is_proper_prefix("apple")); // only the word itself
        assert!(!dict.is_proper_prefix("catd"));
        assert!(!dict.is_proper_prefix(""));
    }

    #[test]
    fn test_parse_cleans_and_filters() {
        let input = "Cat\ndon't\n  dog  \nab\ncafé\nx-ray\n1st\n\napple";
        let dict = Dictionary::parse_from_str(input, &DictionaryOptions::with_min_word_len(3));
        assert_eq!(dict.words(), ["apple", "cat", "dog", "dont", "xray"]);
    }

    #[test]
    fn test_parse_min_len_one_keeps_short_words() {
        let dict = Dictionary::parse_from_str("a\nI\nan", &DictionaryOptions::with_min_word_len(1));
        assert_eq!(dict.words(), ["a", "an", "i"]);
    }

    #[test]
    fn test_parse_require_vowel() {
        let options = DictionaryOptions { require_vowel: true, ..DictionaryOptions::with_min_word_len(1) };
        let dict = Dictionary::parse_from_str("nth\nhymn\ncwm\ncat", &options);
        assert_eq!(dict.words(), ["cat", "hymn"]);
    }

    #[test]
    fn test_parse_adds_short_words() {
        let options = DictionaryOptions { add_short_words: true, ..DictionaryOptions::default() };
        let dict = Dictionary::parse_from_str("bonfire\nto", &options);
        assert!(dict.contains("bonfire"));
        assert!(dict.contains("to"));
        assert!(dict.contains("a"));
        assert_eq!(dict.len(), COMMON_SHORT_WORDS.len() + 1);
    }

    #[test]
    fn test_parse_empty_input() {
        let dict = Dictionary::parse_from_str("", &DictionaryOptions::default());
        assert!(dict.is_empty());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "fire\nFiber\nbon\n").unwrap();
        let dict = Dictionary::load_from_path(&path, &DictionaryOptions::default()).unwrap();
        assert_eq!(dict.words(), ["bon", "fiber", "fire"]);
    }

    #[test]
    fn test_load_from_missing_path_names_the_file() {
        let err = Dictionary::load_from_path("/definitely/not/here.txt", &DictionaryOptions::default()).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}

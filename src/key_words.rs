//! Key-Word Generator: extending the key one dictionary word at a time.
//!
//! Starting from an already-fixed key-word sequence, the generator appends words drawn from
//! the key dictionary (the same word may appear at several positions) and walks depth-first.
//! After every addition, the known cipher is decoded under the longer key and the part of the
//! plaintext not yet split into words must still segment. Anything that fails is dropped
//! without descending further. A sequence is yielded once the key covers the whole known
//! cipher.
//!
//! When a key stub is pending (the key so far ends in the start of a word), the first new word
//! must begin with that stub and be strictly longer than it; it takes the stub's place.

use std::ops::Range;

use crate::codec::decode;
use crate::dictionary::Dictionary;
use crate::segmenter::contains_words_or_prefix;

/// Settings for one generator run.
#[derive(Debug, Clone, Copy)]
pub struct KeyWordQuery<'a> {
    /// Words available for the key.
    pub key_dict: &'a Dictionary,
    /// Words the decoded plaintext must split into.
    pub plain_dict: &'a Dictionary,
    /// Known cipher; its length is the target key length.
    pub cipher: &'a str,
    /// Length of plaintext already split into complete words; it is not re-checked.
    pub plain_offset: usize,
    /// Shortest word the generator may append.
    pub min_word_len: usize,
}

#[derive(Debug, Clone)]
struct Frame {
    candidates: Range<usize>,
    /// Only the first appended word has to extend the pending stub.
    first: bool,
}

/// Lazy iterator over complete key-word sequences.
#[derive(Debug)]
pub struct KeyWordGenerator<'a> {
    query: KeyWordQuery<'a>,
    fixed: &'a [String],
    stub: Option<&'a str>,
    key: String,
    chosen: Vec<&'a str>,
    stack: Vec<Frame>,
}

impl<'a> KeyWordGenerator<'a> {
    #[must_use]
    pub fn new(query: KeyWordQuery<'a>, fixed: &'a [String], stub: Option<&'a str>) -> Self {
        let stub = stub.filter(|s| !s.is_empty());
        let candidates = match stub {
            Some(prefix) => query.key_dict.prefix_range(prefix),
            None => 0..query.key_dict.len(),
        };

        Self {
            query,
            fixed,
            stub,
            key: fixed.concat(),
            chosen: Vec::new(),
            stack: vec![Frame { candidates, first: true }],
        }
    }

    fn acceptable(&self, word: &str, first: bool) -> bool {
        if word.len() < self.query.min_word_len {
            return false;
        }
        match self.stub {
            Some(stub) if first => word.len() > stub.len(),
            _ => true,
        }
    }

    /// Decode as much cipher as the key covers and check the unsettled plaintext.
    fn key_is_consistent(&self) -> bool {
        let cipher = self.query.cipher;
        let covered = cipher.len().min(self.key.len());
        let plain = decode(&cipher[..covered], &self.key[..covered]);
        contains_words_or_prefix(plain.get(self.query.plain_offset..).unwrap_or(""), self.query.plain_dict)
    }

    fn sequence_with(&self, last: &str) -> Vec<String> {
        self.fixed
            .iter()
            .cloned()
            .chain(self.chosen.iter().map(|w| (*w).to_string()))
            .chain(std::iter::once(last.to_string()))
            .collect()
    }
}

impl Iterator for KeyWordGenerator<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        let key_dict = self.query.key_dict;
        let words = key_dict.words();
        let target = self.query.cipher.len();

        loop {
            debug_assert!(self.stack.is_empty() || self.chosen.len() + 1 == self.stack.len());
            let Some(frame) = self.stack.last_mut() else {
                break;
            };

            let Some(idx) = frame.candidates.next() else {
                self.stack.pop();
                if let Some(word) = self.chosen.pop() {
                    let keep = self.key.len() - word.len();
                    self.key.truncate(keep);
                }
                continue;
            };
            let first = frame.first;

            let word = words[idx].as_str();
            if !self.acceptable(word, first) {
                continue;
            }

            let keep = self.key.len();
            self.key.push_str(word);
            if !self.key_is_consistent() {
                self.key.truncate(keep);
                continue;
            }

            if self.key.len() >= target {
                let found = self.sequence_with(word);
                self.key.truncate(keep);
                return Some(found);
            }

            self.chosen.push(word);
            self.stack.push(Frame { candidates: 0..words.len(), first: false });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_stub_completed_by_fiber_then_fire() {
        let key_dict = Dictionary::from_words(["bonfire", "fire", "fiber"]);
        let plain_dict = Dictionary::from_words(["epic", "snow"]);
        let query = KeyWordQuery { key_dict: &key_dict, plain_dict: &plain_dict, cipher: "xzfdq", plain_offset: 0, min_word_len: 1 };
        let base = fixed(&["bon"]);

        let found: Vec<_> = KeyWordGenerator::new(query, &base, Some("f")).collect();
        assert_eq!(found, vec![fixed(&["bon", "fiber"]), fixed(&["bon", "fire"])]);
    }

    #[test]
    fn test_stub_must_be_extended_strictly() {
        let key_dict = Dictionary::from_words(["fire", "fires"]);
        let plain_dict = Dictionary::from_words(["epic", "epics", "snow"]);
        let query = KeyWordQuery { key_dict: &key_dict, plain_dict: &plain_dict, cipher: "xzfdq", plain_offset: 0, min_word_len: 1 };
        let base = fixed(&["bon"]);

        // "fire" equals the stub and cannot replace it
        let found: Vec<_> = KeyWordGenerator::new(query, &base, Some("fire")).collect();
        assert_eq!(found, vec![fixed(&["bon", "fires"])]);
    }

    #[test]
    fn test_words_repeat_and_decode_check_prunes() {
        // every key letter 'a' decodes cipher "a" to plaintext "a"
        let key_dict = Dictionary::from_words(["a", "b"]);
        let plain_dict = Dictionary::from_words(["aaa"]);
        let query = KeyWordQuery { key_dict: &key_dict, plain_dict: &plain_dict, cipher: "aaa", plain_offset: 0, min_word_len: 1 };

        let found: Vec<_> = KeyWordGenerator::new(query, &[], None).collect();
        assert_eq!(found, vec![fixed(&["a", "a", "a"])]);
    }

    #[test]
    fn test_min_word_len_filters_candidates() {
        let key_dict = Dictionary::from_words(["a", "aa", "aaa"]);
        let plain_dict = Dictionary::from_words(["aaa"]);
        let query = KeyWordQuery { key_dict: &key_dict, plain_dict: &plain_dict, cipher: "aaa", plain_offset: 0, min_word_len: 2 };

        let found: Vec<_> = KeyWordGenerator::new(query, &[], None).collect();
        assert_eq!(found, vec![fixed(&["aa", "aa"]), fixed(&["aa", "aaa"]), fixed(&["aaa"])]);
    }

    #[test]
    fn test_always_appends_a_word() {
        let key_dict = Dictionary::from_words(["fire"]);
        let plain_dict = Dictionary::from_words(["epic", "epics", "snow"]);
        let query = KeyWordQuery { key_dict: &key_dict, plain_dict: &plain_dict, cipher: "xzfdq", plain_offset: 0, min_word_len: 1 };
        // already long enough, but one more word is still drawn
        let base = fixed(&["bonfire"]);
        let found: Vec<_> = KeyWordGenerator::new(query, &base, None).collect();
        assert_eq!(found, vec![fixed(&["bonfire", "fire"])]);
    }

    #[test]
    fn test_no_candidates_for_stub() {
        let key_dict = Dictionary::from_words(["fire"]);
        let plain_dict = Dictionary::from_words(["epic"]);
        let query = KeyWordQuery { key_dict: &key_dict, plain_dict: &plain_dict, cipher: "xzfdq", plain_offset: 0, min_word_len: 1 };
        assert_eq!(KeyWordGenerator::new(query, &[], Some("q")).count(), 0);
    }
}

//! Per-branch search state and the records a finished branch produces.

use std::fmt;

/// The coordinator states, plus the terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchState {
    KeyWords,
    CiphersForKey,
    PlaintextWords,
    PlaintextForPrefix,
    CiphersForPlaintext,
    Terminal,
}

impl SearchState {
    pub const ALL: [SearchState; 6] = [
        SearchState::KeyWords,
        SearchState::CiphersForKey,
        SearchState::PlaintextWords,
        SearchState::PlaintextForPrefix,
        SearchState::CiphersForPlaintext,
        SearchState::Terminal,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SearchState::KeyWords => "KEY_WORDS",
            SearchState::CiphersForKey => "CIPHERS_FOR_KEY",
            SearchState::PlaintextWords => "PLAINTEXT_WORDS",
            SearchState::PlaintextForPrefix => "PLAINTEXT_FOR_PREFIX",
            SearchState::CiphersForPlaintext => "CIPHERS_FOR_PLAINTEXT",
            SearchState::Terminal => "TERMINAL",
        }
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accumulated state of one search branch.
///
/// A child branch always works on its own copy (see [`SearchContext::descend`]); nothing here
/// is shared between siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    /// Complete key words, in order.
    pub key_words: Vec<String>,
    /// Start of a key word that is not complete yet.
    pub key_stub: Option<String>,
    /// Complete plaintext words, in order.
    pub plain_words: Vec<String>,
    /// Start of a plaintext word that is not complete yet.
    pub plain_stub: Option<String>,
    /// Cipher assembled so far.
    pub cipher: String,
    /// Fragments not yet placed, in pool order.
    pub fragments: Vec<String>,
    /// Recursion depth; diagnostic only.
    pub depth: usize,
}

impl SearchContext {
    #[must_use]
    pub fn new(cipher: &str, fragments: &[String]) -> Self {
        Self { cipher: cipher.to_string(), fragments: fragments.to_vec(), ..Self::default() }
    }

    /// Independent copy for a child branch.
    #[must_use]
    pub fn descend(&self) -> Self {
        Self { depth: self.depth + 1, ..self.clone() }
    }

    /// Key so far: complete words plus any pending stub.
    #[must_use]
    pub fn key(&self) -> String {
        let mut key = self.key_words.concat();
        if let Some(stub) = &self.key_stub {
            key.push_str(stub);
        }
        key
    }

    /// Plaintext so far: complete words plus any pending stub.
    #[must_use]
    pub fn plaintext(&self) -> String {
        let mut plain = self.plain_words.concat();
        if let Some(stub) = &self.plain_stub {
            plain.push_str(stub);
        }
        plain
    }

    #[must_use]
    pub fn key_len(&self) -> usize {
        self.key_words_len() + self.key_stub.as_ref().map_or(0, String::len)
    }

    #[must_use]
    pub fn plain_len(&self) -> usize {
        self.plain_words_len() + self.plain_stub.as_ref().map_or(0, String::len)
    }

    /// Length of the key covered by complete words.
    #[must_use]
    pub fn key_words_len(&self) -> usize {
        self.key_words.iter().map(String::len).sum()
    }

    /// Length of the plaintext covered by complete words.
    #[must_use]
    pub fn plain_words_len(&self) -> usize {
        self.plain_words.iter().map(String::len).sum()
    }

    #[must_use]
    pub fn cipher_len(&self) -> usize {
        self.cipher.len()
    }

    /// Freeze a finished branch into a record.
    ///
    /// Callers only do this once key, plaintext and cipher agree in length with no stubs.
    #[must_use]
    pub fn to_record(&self) -> TerminalRecord {
        debug_assert!(self.key_stub.is_none() && self.plain_stub.is_none());
        debug_assert_eq!(self.key_len(), self.cipher_len());
        debug_assert_eq!(self.plain_len(), self.cipher_len());

        let outcome = if self.fragments.is_empty() { Outcome::Perfect } else { Outcome::Final };
        TerminalRecord {
            outcome,
            pkc: Pkc { plaintext: self.plaintext(), key: self.key(), cipher: self.cipher.clone() },
            plain_words: self.plain_words.clone(),
            key_words: self.key_words.clone(),
            unused_fragments: self.fragments.clone(),
        }
    }
}

/// Finalised plaintext, key and cipher of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pkc {
    pub plaintext: String,
    pub key: String,
    pub cipher: String,
}

impl fmt::Display for Pkc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p: {} k: {} c: {}", self.plaintext, self.key, self.cipher)
    }
}

/// Whether every fragment found a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// No fragments left over.
    Perfect,
    /// Consistent, but some fragments were never placed.
    Final,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Perfect => write!(f, "PERFECT"),
            Outcome::Final => write!(f, "FINAL"),
        }
    }
}

/// A finished (or provisionally finished) solution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerminalRecord {
    pub outcome: Outcome,
    pub pkc: Pkc,
    pub plain_words: Vec<String>,
    pub key_words: Vec<String>,
    pub unused_fragments: Vec<String>,
}

impl TerminalRecord {
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.outcome == Outcome::Perfect
    }
}

impl fmt::Display for TerminalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.outcome, self.pkc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_lengths_include_stubs() {
        let ctx = SearchContext {
            key_words: strings(&["bon"]),
            key_stub: Some("f".to_string()),
            plain_words: strings(&["epic"]),
            plain_stub: Some("s".to_string()),
            cipher: "xzfdq".to_string(),
            ..SearchContext::default()
        };
        assert_eq!(ctx.key(), "bonf");
        assert_eq!(ctx.key_len(), 4);
        assert_eq!(ctx.key_words_len(), 3);
        assert_eq!(ctx.plaintext(), "epics");
        assert_eq!(ctx.plain_len(), 5);
        assert_eq!(ctx.plain_words_len(), 4);
        assert_eq!(ctx.cipher_len(), 5);
    }

    #[test]
    fn test_descend_copies_and_counts_depth() {
        let parent = SearchContext::new("xzfdq", &strings(&["e", "qw"]));
        let mut child = parent.descend();
        child.fragments.pop();
        child.key_words.push("bon".to_string());
        assert_eq!(child.depth, 1);
        assert_eq!(parent.depth, 0);
        assert_eq!(parent.fragments, strings(&["e", "qw"]));
        assert!(parent.key_words.is_empty());
    }

    #[test]
    fn test_to_record_tags_outcome() {
        let mut ctx = SearchContext {
            key_words: strings(&["bon", "fires"]),
            plain_words: strings(&["epic", "snow"]),
            cipher: "xzfdqeqw".to_string(),
            ..SearchContext::default()
        };
        let record = ctx.to_record();
        assert!(record.is_perfect());
        assert_eq!(record.to_string(), "PERFECT p: epicsnow k: bonfires c: xzfdqeqw");

        ctx.fragments.push("tn".to_string());
        let record = ctx.to_record();
        assert_eq!(record.outcome, Outcome::Final);
        assert_eq!(record.unused_fragments, strings(&["tn"]));
    }

    #[test]
    fn test_state_names() {
        let names: Vec<_> = SearchState::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names[0], "KEY_WORDS");
        assert_eq!(names[4], "CIPHERS_FOR_PLAINTEXT");
    }
}

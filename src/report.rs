//! Diagnostic sinks for the joint search.
//!
//! The search hands an observer every state it enters and every key word it places. Observers
//! only watch: nothing they record is read back by the search, so they can never change which
//! records are produced or in what order.
//!
//! [`DecodeTable`] is the observer behind `--dump-tables`. For each key word it collects the
//! distinct cipher slices that word was laid over and the plaintext each slice decoded to, and
//! it counts how often each state was entered.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::codec::decode;
use crate::context::SearchState;

/// Receives search events. Every method defaults to doing nothing.
pub trait SearchObserver {
    /// A state was entered at branch depth `depth`.
    fn on_state(&mut self, _state: SearchState, _depth: usize) {}

    /// `word` was placed in the key at `offset`, over the known cipher slice `cipher_slice`
    /// (shorter than the word when the cipher runs out).
    fn on_key_word(&mut self, _word: &str, _offset: usize, _cipher_slice: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SearchObserver for NullObserver {}

/// One decoded slice under a key word.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DecodedSlice {
    pub offset: usize,
    pub cipher: String,
    pub plaintext: String,
}

/// Aggregated key-word decodes and state counts.
#[derive(Debug, Default, Clone)]
pub struct DecodeTable {
    by_word: BTreeMap<String, BTreeSet<DecodedSlice>>,
    state_counts: BTreeMap<SearchState, usize>,
}

impl DecodeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct slices decoded under `word`, ordered by offset.
    pub fn slices_for(&self, word: &str) -> impl Iterator<Item = &DecodedSlice> {
        self.by_word.get(word).into_iter().flatten()
    }

    /// Number of times `state` was entered.
    #[must_use]
    pub fn state_count(&self, state: SearchState) -> usize {
        self.state_counts.get(&state).copied().unwrap_or(0)
    }

    /// Number of distinct key words seen.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.by_word.len()
    }

    /// Human-readable dump of both tables.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "State entries:");
        for state in SearchState::ALL {
            let _ = writeln!(out, "  {:<22} {}", state.name(), self.state_count(state));
        }

        let _ = writeln!(out, "Key word decodes:");
        if self.by_word.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for (word, slices) in &self.by_word {
            let _ = writeln!(out, "  {word}");
            for slice in slices {
                let _ = writeln!(out, "    @{:<3} {} -> {}", slice.offset, slice.cipher, slice.plaintext);
            }
        }

        out
    }
}

impl SearchObserver for DecodeTable {
    fn on_state(&mut self, state: SearchState, _depth: usize) {
        *self.state_counts.entry(state).or_insert(0) += 1;
    }

    fn on_key_word(&mut self, word: &str, offset: usize, cipher_slice: &str) {
        if cipher_slice.is_empty() {
            return;
        }
        let covered = cipher_slice.len().min(word.len());
        let slice = DecodedSlice {
            offset,
            cipher: cipher_slice[..covered].to_string(),
            plaintext: decode(&cipher_slice[..covered], &word[..covered]),
        };
        self.by_word.entry(word.to_string()).or_default().insert(slice);
    }
}

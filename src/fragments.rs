//! Fragment Assembler: orderings of unplaced ciphertext fragments.
//!
//! The fragment pool holds known pieces of ciphertext whose position is unknown. Extending the
//! known cipher means appending pool fragments one at a time, in every order, until the
//! cipher is long enough. A branch stops growing as soon as it reaches the target length and
//! yields the assembled cipher together with the fragments it left unused.
//!
//! Two anchors share the same depth-first walk:
//!
//! - **key-anchored**: the target is the current key length, and every addition is checked
//!   right away: the newly covered cipher is decoded with the key and the plaintext tail
//!   must still segment into words (optionally ending in a stub). Failing orderings are cut
//!   before they grow further.
//! - **plaintext-anchored**: the target is caller-supplied and nothing is checked; the caller
//!   derives key material from the result and validates it there.
//!
//! Fragments are used at most once per branch. At each step a fragment identical to an
//! earlier unused one is skipped, since it would produce exactly the same branch.

use crate::codec::decode;
use crate::dictionary::Dictionary;
use crate::segmenter::contains_words_or_prefix;

/// One assembled cipher and the fragments still unplaced, in original pool order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub cipher: String,
    pub unused: Vec<String>,
}

/// How candidates are validated while they grow.
#[derive(Debug, Clone, Copy)]
enum Anchor<'a> {
    Key {
        key: &'a str,
        /// Plaintext before this offset is already settled and is not re-segmented.
        plain_offset: usize,
        plain_dict: &'a Dictionary,
    },
    Plaintext,
}

impl Anchor<'_> {
    fn accepts(&self, cipher: &str) -> bool {
        match *self {
            Anchor::Plaintext => true,
            Anchor::Key { key, plain_offset, plain_dict } => {
                let covered = cipher.len().min(key.len());
                let plain = decode(&cipher[..covered], &key[..covered]);
                contains_words_or_prefix(plain.get(plain_offset..).unwrap_or(""), plain_dict)
            }
        }
    }
}

/// Lazy iterator over the fragment orderings that reach a target length.
#[derive(Debug)]
pub struct FragmentAssembler<'a> {
    fragments: &'a [String],
    target: usize,
    anchor: Anchor<'a>,
    current: String,
    used: Vec<bool>,
    /// Next pool index to try, one entry per depth.
    stack: Vec<usize>,
    /// Pool index placed at each depth below the top.
    placed: Vec<usize>,
    /// Set when the starting cipher already meets the target.
    already_long_enough: bool,
}

impl<'a> FragmentAssembler<'a> {
    fn new(base: &str, fragments: &'a [String], target: usize, anchor: Anchor<'a>) -> Self {
        let already_long_enough = base.len() >= target;
        Self {
            fragments,
            target,
            anchor,
            current: base.to_string(),
            used: vec![false; fragments.len()],
            stack: if already_long_enough { Vec::new() } else { vec![0] },
            placed: Vec::new(),
            already_long_enough,
        }
    }

    /// Grow `base` until it covers `key`, checking each addition by decoding it.
    ///
    /// `plain_offset` is the length of plaintext already split into complete words.
    #[must_use]
    pub fn key_anchored(
        base: &str,
        fragments: &'a [String],
        key: &'a str,
        plain_offset: usize,
        plain_dict: &'a Dictionary,
    ) -> Self {
        Self::new(base, fragments, key.len(), Anchor::Key { key, plain_offset, plain_dict })
    }

    /// Grow `base` to at least `min_len` with no validation.
    #[must_use]
    pub fn plaintext_anchored(base: &str, fragments: &'a [String], min_len: usize) -> Self {
        Self::new(base, fragments, min_len, Anchor::Plaintext)
    }

    /// An identical fragment earlier in the pool is still free; trying this one would repeat it.
    fn shadowed(&self, i: usize) -> bool {
        let fragment = &self.fragments[i];
        self.fragments[..i]
            .iter()
            .zip(&self.used)
            .any(|(earlier, used)| !*used && earlier == fragment)
    }

    fn unused_except(&self, skip: usize) -> Vec<String> {
        self.fragments
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != skip && !self.used[*j])
            .map(|(_, f)| f.clone())
            .collect()
    }
}

impl Iterator for FragmentAssembler<'_> {
    type Item = Assembly;

    fn next(&mut self) -> Option<Assembly> {
        if self.already_long_enough {
            self.already_long_enough = false;
            if !self.anchor.accepts(&self.current) {
                return None;
            }
            return Some(Assembly { cipher: self.current.clone(), unused: self.fragments.to_vec() });
        }

        loop {
            debug_assert!(self.stack.is_empty() || self.placed.len() + 1 == self.stack.len());
            let Some(next) = self.stack.last_mut() else {
                break;
            };

            let i = *next;
            if i >= self.fragments.len() {
                // backtrack one level
                self.stack.pop();
                if let Some(idx) = self.placed.pop() {
                    self.used[idx] = false;
                    let keep = self.current.len() - self.fragments[idx].len();
                    self.current.truncate(keep);
                }
                continue;
            }
            *next += 1;

            if self.used[i] || self.fragments[i].is_empty() || self.shadowed(i) {
                continue;
            }

            let keep = self.current.len();
            self.current.push_str(&self.fragments[i]);

            if !self.anchor.accepts(&self.current) {
                self.current.truncate(keep);
                continue;
            }

            if self.current.len() >= self.target {
                let found = Assembly { cipher: self.current.clone(), unused: self.unused_except(i) };
                self.current.truncate(keep);
                return Some(found);
            }

            self.used[i] = true;
            self.placed.push(i);
            self.stack.push(0);
        }

        None
    }
}

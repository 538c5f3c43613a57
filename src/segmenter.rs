//! Word segmentation of letter strings.
//!
//! A [`Segmenter`] enumerates every way to consume *all* of a letter string as zero or more
//! complete dictionary words followed by at most one trailing stub. A stub is a non-empty
//! suffix that is a proper prefix of some strictly longer dictionary word, so the text
//! could still grow into that word once more letters are known.
//!
//! Example, with the words `{apple, cat, cats, do, dog, dogmeat, go, good}`:
//!
//! ```text
//! "applecatdog" -> [apple, cat, dog]        (fully consumed)
//!                  [apple, cat] + "dog"      (dog may become dogmeat)
//!                  [apple, cat, do] + "g"    (g may become go/good)
//! ```
//!
//! The enumeration is lazy and depth-first: split points are tried shortest word first, and
//! after all words starting at a position have been explored, the remaining suffix is
//! checked as a stub. If the whole string is a word, `([text], None)` comes first.
//! No `(words, stub)` pair is produced twice.

use std::collections::HashSet;

use crate::dictionary::Dictionary;

/// One way to consume a string: complete words, then an optional stub.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segmentation<'t> {
    pub words: Vec<&'t str>,
    pub stub: Option<&'t str>,
}

impl Segmentation<'_> {
    /// True iff the string was consumed by complete words alone.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stub.is_none()
    }

    /// Owned copies of the words, for storing in a search context.
    #[must_use]
    pub fn owned_words(&self) -> Vec<String> {
        self.words.iter().map(|w| (*w).to_string()).collect()
    }
}

impl std::fmt::Display for Segmentation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.words.join(" "))?;
        if let Some(stub) = self.stub {
            if !self.words.is_empty() {
                write!(f, " ")?;
            }
            write!(f, "{stub}…")?;
        }
        Ok(())
    }
}

/// Position in the depth-first walk: the segment being extended starts at `start`,
/// and `next_end` is the next candidate end index to try.
#[derive(Debug, Clone, Copy)]
struct Frame {
    start: usize,
    next_end: usize,
}

/// Lazy iterator over the [`Segmentation`]s of a string.
#[derive(Debug)]
pub struct Segmenter<'d, 't> {
    dict: &'d Dictionary,
    text: &'t str,
    /// Whole-word result still to be yielded first.
    pending_whole: bool,
    stack: Vec<Frame>,
    /// Words leading to the top frame; always `stack.len() - 1` long while walking.
    path: Vec<&'t str>,
    seen: HashSet<Segmentation<'t>>,
}

impl<'d, 't> Segmenter<'d, 't> {
    #[must_use]
    pub fn new(text: &'t str, dict: &'d Dictionary) -> Self {
        let stack = if text.is_empty() {
            Vec::new()
        } else {
            vec![Frame { start: 0, next_end: 1 }]
        };

        Self {
            dict,
            text,
            pending_whole: !text.is_empty() && dict.contains(text),
            stack,
            path: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn emit(&mut self, candidate: Segmentation<'t>) -> Option<Segmentation<'t>> {
        if self.seen.insert(candidate.clone()) {
            Some(candidate)
        } else {
            None
        }
    }
}

impl<'t> Iterator for Segmenter<'_, 't> {
    type Item = Segmentation<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_whole {
            self.pending_whole = false;
            let whole = Segmentation { words: vec![self.text], stub: None };
            if let Some(out) = self.emit(whole) {
                return Some(out);
            }
        }

        let len = self.text.len();
        loop {
            debug_assert!(self.stack.is_empty() || self.path.len() + 1 == self.stack.len());
            let Some(frame) = self.stack.last_mut() else {
                break;
            };

            if frame.next_end <= len {
                let start = frame.start;
                let end = frame.next_end;
                frame.next_end += 1;

                let piece = &self.text[start..end];
                if self.dict.contains(piece) {
                    if end == len {
                        let mut words = self.path.clone();
                        words.push(piece);
                        if let Some(out) = self.emit(Segmentation { words, stub: None }) {
                            return Some(out);
                        }
                    } else {
                        self.path.push(piece);
                        self.stack.push(Frame { start: end, next_end: end + 1 });
                    }
                } else if self.dict.prefix_range(piece).is_empty() {
                    // no longer piece from `start` can be a word or a stub either
                    frame.next_end = len + 1;
                }
                continue;
            }

            // every word starting at `start` has been explored; try the suffix as a stub
            let start = frame.start;
            self.stack.pop();
            let suffix = &self.text[start..];
            let candidate = self
                .dict
                .is_proper_prefix(suffix)
                .then(|| Segmentation { words: self.path.clone(), stub: Some(suffix) });
            if !self.stack.is_empty() {
                self.path.pop();
            }
            if let Some(out) = candidate.and_then(|c| self.emit(c)) {
                return Some(out);
            }
        }

        None
    }
}

/// Every segmentation of `text`, lazily.
#[must_use]
pub fn segment<'d, 't>(text: &'t str, dict: &'d Dictionary) -> Segmenter<'d, 't> {
    Segmenter::new(text, dict)
}

/// True iff `text` has at least one segmentation; stops at the first one found.
///
/// Empty text is trivially valid: nothing has been decoded yet that could fail.
#[must_use]
pub fn contains_words_or_prefix(text: &str, dict: &Dictionary) -> bool {
    text.is_empty() || segment(text, dict).next().is_some()
}

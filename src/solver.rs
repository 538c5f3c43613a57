//! The joint key/plaintext/cipher search.
//!
//! A [`Puzzle`] gives the known cipher prefix, a pool of cipher fragments with unknown
//! positions, and exactly one of a known key prefix or a known plaintext prefix. The
//! [`Solver`] grows all three texts together until they have equal length, with every key
//! and plaintext split into dictionary words.
//!
//! The search moves between five states:
//!
//! - `KEY_WORDS`: the key is shorter than the cipher, so append key words.
//! - `CIPHERS_FOR_KEY`: the key is longer than the cipher, so place fragments under it.
//! - `PLAINTEXT_WORDS`: newly decoded plaintext is split into words.
//! - `PLAINTEXT_FOR_PREFIX`: the plaintext ends in a stub; try each word it could become.
//! - `CIPHERS_FOR_PLAINTEXT`: the plaintext is longer than the cipher, so place fragments.
//!
//! Whenever key, plaintext and cipher reach the same length with nothing pending, a
//! [`TerminalRecord`] is produced: `PERFECT` if the fragment pool is empty, else `FINAL`.
//!
//! # Error Handling
//!
//! The solver uses [`SolverError`] with four variants:
//!
//! - S001: `ParseFailure` (Input text could not be parsed (wraps [`ParseError`]))
//! - S002: `InvalidInput` (Conflicting, missing or malformed puzzle input)
//! - S003: `AmbiguousResidue` (A one-letter fragment matches the start of several fragments)
//! - S004: `EmptyDictionary` (Dictionary is missing or has no usable words)
//!
//! Finding nothing is not an error: the result simply has no records.
//!
//! # Examples
//!
//! ```
//! use runkey::dictionary::Dictionary;
//! use runkey::solver::{Puzzle, SearchConfig, SolveOptions, Solver};
//!
//! let plain = Dictionary::from_words(["epic", "epics", "now", "snow"]);
//! let key = Dictionary::from_words(["bon", "bonfires", "fires"]);
//! let solver = Solver::new(&plain, &key, SearchConfig::default());
//!
//! let puzzle = Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]);
//! let result = solver.solve(&puzzle, &SolveOptions::default())?;
//!
//! for record in &result.records {
//!     println!("{record}");
//! }
//! assert!(result.records.iter().all(|r| r.pkc.plaintext == "epicsnow"));
//! # Ok::<(), runkey::solver::SolverError>(())
//! ```

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::alphabet::first_invalid_letter;
use crate::codec::{decode, derive_key};
use crate::context::{SearchContext, SearchState, TerminalRecord};
use crate::dictionary::{Dictionary, DictionaryOptions};
use crate::errors::ParseError;
use crate::fragments::FragmentAssembler;
use crate::key_words::{KeyWordGenerator, KeyWordQuery};
use crate::report::{NullObserver, SearchObserver};
use crate::segmenter::{contains_words_or_prefix, segment};

/// What is known before the search starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Puzzle {
    /// Known cipher prefix; may be empty if everything comes from fragments.
    pub cipher: String,
    /// Known plaintext prefix. Exactly one of `plaintext` and `key` must be given.
    pub plaintext: Option<String>,
    /// Known key prefix.
    pub key: Option<String>,
    /// Cipher fragments of unknown position, in the order they are tried.
    pub fragments: Vec<String>,
}

impl Puzzle {
    #[must_use]
    pub fn with_key(cipher: &str, key: &str, fragments: &[&str]) -> Self {
        Self {
            cipher: cipher.to_string(),
            key: Some(key.to_string()),
            fragments: fragments.iter().map(|f| (*f).to_string()).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_plaintext(cipher: &str, plaintext: &str, fragments: &[&str]) -> Self {
        Self {
            cipher: cipher.to_string(),
            plaintext: Some(plaintext.to_string()),
            fragments: fragments.iter().map(|f| (*f).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Check the puzzle and decide which known text starts the search.
    fn validate(&self) -> Result<Known<'_>, SolverError> {
        let plaintext = self.plaintext.as_deref().filter(|p| !p.is_empty());
        let key = self.key.as_deref().filter(|k| !k.is_empty());

        let known = match (plaintext, key) {
            (Some(p), None) => Known::Plaintext(p),
            (None, Some(k)) => Known::Key(k),
            (Some(_), Some(_)) => {
                return Err(SolverError::InvalidInput {
                    reason: "both a plaintext and a key were given".to_string(),
                })
            }
            (None, None) => {
                return Err(SolverError::InvalidInput {
                    reason: "neither a plaintext nor a key was given".to_string(),
                })
            }
        };

        let texts = [("cipher", Some(self.cipher.as_str())), ("plaintext", plaintext), ("key", key)];
        for (label, text) in texts {
            if let Some(c) = text.and_then(first_invalid_letter) {
                return Err(SolverError::InvalidInput {
                    reason: format!("{label} contains '{c}'; only a-z are allowed"),
                });
            }
        }

        for (i, fragment) in self.fragments.iter().enumerate() {
            if fragment.is_empty() {
                return Err(SolverError::InvalidInput { reason: format!("fragment {} is empty", i + 1) });
            }
            if let Some(c) = first_invalid_letter(fragment) {
                return Err(SolverError::InvalidInput {
                    reason: format!("fragment '{fragment}' contains '{c}'; only a-z are allowed"),
                });
            }
        }

        if let Some((residue, fragments)) = ambiguous_residue(&self.fragments) {
            return Err(SolverError::AmbiguousResidue { residue, fragments });
        }

        Ok(known)
    }
}

/// A one-letter fragment that equals the first letter of two or more longer fragments.
fn ambiguous_residue(fragments: &[String]) -> Option<(String, Vec<String>)> {
    fragments.iter().filter(|f| f.len() == 1).find_map(|residue| {
        let sharing: Vec<String> = fragments
            .iter()
            .filter(|other| other.len() > 1 && other.starts_with(residue.as_str()))
            .cloned()
            .collect();
        (sharing.len() >= 2).then(|| (residue.clone(), sharing))
    })
}

#[derive(Debug, Clone, Copy)]
enum Known<'p> {
    Key(&'p str),
    Plaintext(&'p str),
}

/// Tuning knobs for the search itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Shortest complete key word allowed anywhere in the key, including words split out of
    /// the known key prefix and out of keys derived under plaintext. A trailing key stub is
    /// not a word yet and is exempt until it is completed.
    pub min_key_word_len: usize,
    /// Extra cipher demanded beyond the key when placing fragments for plaintext.
    ///
    /// Fragments are placed until the cipher covers `max(plain_len, key_len + lookahead)`.
    /// Defaults to 0, so assembly stops as soon as the plaintext is covered. A margin such
    /// as 2 makes every assembly also reach two letters past the key.
    pub lookahead: usize,
    /// For short plaintext stubs with several completions, give up on the rest when the
    /// first completion produces no record.
    pub probe_short_stubs: bool,
    /// Longest stub that counts as short.
    pub short_stub_len: usize,
    /// Keep searching past a `FINAL` record to try to place the remaining fragments.
    pub extend_final: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_key_word_len: 1, lookahead: 0, probe_short_stubs: true, short_stub_len: 2, extend_final: true }
    }
}

/// Limits applied by [`Solver::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Stop after this many distinct records.
    pub max_results: usize,
    /// Wall-clock budget for the whole run.
    ///
    /// The budget is checked each time the search enters a state. A single key-word scan
    /// that rejects every word of a large dictionary runs to completion before the next
    /// check, so a run can overshoot the limit by that long.
    pub time_limit: Option<Duration>,
    /// Drop `FINAL` records.
    pub perfect_only: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { max_results: 100, time_limit: None, perfect_only: false }
    }
}

/// Status of the solver run.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// Every branch was explored.
    Exhausted,

    /// Stopped early because the requested number of results was found.
    FoundEnough,

    /// Solver stopped because the time budget expired. Contains the elapsed time.
    TimedOut { elapsed: Duration },
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Coordinator states entered, terminal steps included.
    pub states_entered: usize,
    /// Records handed to the caller, duplicates included.
    pub records_emitted: usize,
    /// Short stubs abandoned after a fruitless probe.
    pub probes_pruned: usize,
}

/// How a [`Solver::search`] ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    pub status: SolveStatus,
    pub stats: SearchStats,
}

/// Successful solver run (even if it stopped early).
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Distinct records, in discovery order.
    pub records: Vec<TerminalRecord>,
    /// Status indicating whether we finished, stopped early or timed out.
    pub status: SolveStatus,
    pub stats: SearchStats,
}

impl SolveResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that placed every fragment.
    pub fn perfect(&self) -> impl Iterator<Item = &TerminalRecord> {
        self.records.iter().filter(|r| r.is_perfect())
    }
}

/// Unified error type for the solver pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// Failure while parsing command-line text into puzzle input.
    ///
    /// These originate from the parser (`ParseError`), which we box to keep the
    /// error type size stable.
    #[error("parse failure: {0}")]
    ParseFailure(#[from] Box<ParseError>),

    /// The puzzle cannot be searched as given.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A one-letter fragment could be the missing start of several fragments.
    #[error("fragment '{residue}' is ambiguous: it matches the start of {}", .fragments.join(", "))]
    AmbiguousResidue { residue: String, fragments: Vec<String> },

    /// A dictionary has no words: the file could not be read, or nothing survived filtering.
    ///
    /// `source` carries the io error when the file itself was the problem.
    #[error("dictionary '{dictionary}' has no usable words{}", .source.as_ref().map(|e| format!(" (cannot read: {e})")).unwrap_or_default())]
    EmptyDictionary {
        dictionary: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "S001",
            SolverError::InvalidInput { .. } => "S002",
            SolverError::AmbiguousResidue { .. } => "S003",
            SolverError::EmptyDictionary { .. } => "S004",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "Input text could not be parsed",
            SolverError::InvalidInput { .. } => "Conflicting, missing or malformed puzzle input",
            SolverError::AmbiguousResidue { .. } => "A one-letter fragment matches the start of several fragments",
            SolverError::EmptyDictionary { .. } => "Dictionary is missing or has no usable words",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "A cipher, plaintext, key, fragment list or duration could not be parsed. This wraps an underlying ParseError (see Parse Errors section for specific error codes).",
            SolverError::InvalidInput { .. } => "The search starts from exactly one known text: a key prefix or a plaintext prefix, never both and never neither. All known texts and fragments must be non-empty strings of the letters a-z.",
            SolverError::AmbiguousResidue { .. } => "A single-letter fragment that equals the first letter of two or more other fragments cannot be placed unambiguously; it may be a leftover piece of either. The search refuses to start rather than guess.",
            SolverError::EmptyDictionary { .. } => "The dictionary file does not exist or could not be read as UTF-8 text, or after cleaning and filtering (letters only, minimum length, optional vowel requirement) it contains no words. Either way no key or plaintext could ever be split into words.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::InvalidInput { .. } => Some("Give exactly one of --plain or --key, e.g. 'runkey solve --cipher xzfdq --key bonf'"),
            SolverError::AmbiguousResidue { .. } => Some("Merge the one-letter fragment into the fragment it belongs to, or drop it"),
            SolverError::EmptyDictionary { .. } => {
                Some("Pass an existing word list with --dict (e.g. /usr/share/dict/words), or lower --min-word-len")
            }
            SolverError::ParseFailure(_) => None, // ParseError has its own help
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::ParseFailure(pe) => {
                // delegate to ParseError's detailed display
                format!("{}\n  caused by: {}", self.code(), pe.display_detailed())
            }
            _ => crate::errors::format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
        }
    }
}

/// Load and filter a dictionary file, rejecting one that ends up empty.
///
/// # Errors
///
/// `EmptyDictionary` if the file cannot be read (with the io error as its source) or if
/// nothing survives filtering.
pub fn load_dictionary(path: &Path, options: &DictionaryOptions) -> Result<Dictionary, SolverError> {
    let dict = Dictionary::load_from_path(path, options).map_err(|source| SolverError::EmptyDictionary {
        dictionary: path.display().to_string(),
        source: Some(source),
    })?;

    if dict.is_empty() {
        return Err(SolverError::EmptyDictionary { dictionary: path.display().to_string(), source: None });
    }

    info!("loaded {} words from {}", dict.len(), path.display());
    Ok(dict)
}

/// Simple helper to enforce a wall-clock time limit.
struct TimeBudget {
    start: Instant,   // when the budget began
    limit: Duration,  // maximum allowed elapsed time
}

impl TimeBudget {
    /// Create a new budget that lasts for `limit` (e.g., 30 seconds).
    fn new(limit: Duration) -> Self {
        Self { start: Instant::now(), limit }
    }

    /// How long this budget has been running.
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns true if the allowed time has fully elapsed.
    fn expired(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}

/// Why a search unwound early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Requested,
    TimedOut,
}

type Step = Result<(), Stop>;

/// Joint search over a plaintext dictionary and a key dictionary.
///
/// The dictionaries may be the same instance.
#[derive(Debug, Clone)]
pub struct Solver<'d> {
    plain_dict: &'d Dictionary,
    key_dict: &'d Dictionary,
    config: SearchConfig,
}

impl<'d> Solver<'d> {
    #[must_use]
    pub fn new(plain_dict: &'d Dictionary, key_dict: &'d Dictionary, config: SearchConfig) -> Self {
        Self { plain_dict, key_dict, config }
    }

    /// Run the search, handing every terminal record to `on_record` as it is found.
    ///
    /// Records are produced depth-first in a fixed order, and the same record may be reached
    /// along different branches. Returning `ControlFlow::Break` from `on_record` stops the
    /// search; the status is then `FoundEnough`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` or `AmbiguousResidue` if the puzzle is rejected before searching.
    pub fn search<F>(
        &self,
        puzzle: &Puzzle,
        time_limit: Option<Duration>,
        observer: &mut dyn SearchObserver,
        mut on_record: F,
    ) -> Result<SearchSummary, SolverError>
    where
        F: FnMut(TerminalRecord) -> ControlFlow<()>,
    {
        let known = puzzle.validate()?;

        let mut run = Run {
            plain_dict: self.plain_dict,
            key_dict: self.key_dict,
            config: &self.config,
            budget: time_limit.map(TimeBudget::new),
            observer,
            on_record: &mut on_record,
            stats: SearchStats::default(),
        };

        let outcome = match known {
            Known::Key(key) => run.start_from_key(&puzzle.cipher, key, &puzzle.fragments),
            Known::Plaintext(plain) => run.start_from_plaintext(&puzzle.cipher, plain, &puzzle.fragments),
        };

        let status = match outcome {
            Ok(()) => SolveStatus::Exhausted,
            Err(Stop::Requested) => SolveStatus::FoundEnough,
            Err(Stop::TimedOut) => SolveStatus::TimedOut {
                elapsed: run.budget.as_ref().map_or(Duration::ZERO, TimeBudget::elapsed),
            },
        };

        info!(
            "search finished: {:?}, {} states, {} records",
            status, run.stats.states_entered, run.stats.records_emitted
        );

        Ok(SearchSummary { status, stats: run.stats })
    }

    /// Collect up to `options.max_results` distinct records.
    ///
    /// # Errors
    ///
    /// See [`Solver::search`]; also `InvalidInput` if `max_results` is zero.
    pub fn solve(&self, puzzle: &Puzzle, options: &SolveOptions) -> Result<SolveResult, SolverError> {
        self.solve_with_observer(puzzle, options, &mut NullObserver)
    }

    /// [`Solver::solve`], reporting search events to `observer`.
    ///
    /// # Errors
    ///
    /// See [`Solver::solve`].
    pub fn solve_with_observer(
        &self,
        puzzle: &Puzzle,
        options: &SolveOptions,
        observer: &mut dyn SearchObserver,
    ) -> Result<SolveResult, SolverError> {
        if options.max_results == 0 {
            return Err(SolverError::InvalidInput { reason: "max_results must be at least 1".to_string() });
        }

        let mut records: Vec<TerminalRecord> = Vec::new();
        let mut seen: HashSet<TerminalRecord> = HashSet::new();

        let summary = self.search(puzzle, options.time_limit, observer, |record| {
            if options.perfect_only && !record.is_perfect() {
                return ControlFlow::Continue(());
            }
            if !seen.insert(record.clone()) {
                return ControlFlow::Continue(());
            }
            records.push(record);
            if records.len() >= options.max_results {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;

        // Postcondition: limits respected and no duplicates
        debug_assert!(records.len() <= options.max_results);
        debug_assert!(!options.perfect_only || records.iter().all(TerminalRecord::is_perfect));

        Ok(SolveResult { records, status: summary.status, stats: summary.stats })
    }
}

/// State of one search run, threaded through the recursive state functions.
struct Run<'r> {
    plain_dict: &'r Dictionary,
    key_dict: &'r Dictionary,
    config: &'r SearchConfig,
    budget: Option<TimeBudget>,
    observer: &'r mut dyn SearchObserver,
    on_record: &'r mut dyn FnMut(TerminalRecord) -> ControlFlow<()>,
    stats: SearchStats,
}

impl Run<'_> {
    fn enter(&mut self, state: SearchState, ctx: &SearchContext) -> Step {
        self.stats.states_entered += 1;
        self.observer.on_state(state, ctx.depth);
        trace!(
            "{:indent$}{state} k={} p={} c={} frags={}",
            "",
            ctx.key(),
            ctx.plaintext(),
            ctx.cipher,
            ctx.fragments.len(),
            indent = ctx.depth.min(40) * 2
        );

        match &self.budget {
            Some(budget) if budget.expired() => Err(Stop::TimedOut),
            _ => Ok(()),
        }
    }

    fn start_from_key(&mut self, cipher: &str, key: &str, fragments: &[String]) -> Step {
        let covered = cipher.len().min(key.len());
        let plain = decode(&cipher[..covered], &key[..covered]);
        if !contains_words_or_prefix(&plain, self.plain_dict) {
            debug!("key '{key}' decodes '{}' to '{plain}', which is not words", &cipher[..covered]);
            return Ok(());
        }

        let (key_dict, min_len) = (self.key_dict, self.config.min_key_word_len);
        for split in segment(key, key_dict).filter(|split| words_long_enough(&split.words, min_len)) {
            debug!("starting from key words: {split}");
            let mut ctx = SearchContext::new(cipher, fragments);
            ctx.key_words = split.owned_words();
            ctx.key_stub = split.stub.map(str::to_string);
            self.report_key_words(&ctx.key_words, 0, cipher);

            if ctx.key_stub.is_some() {
                self.key_words(ctx)?;
            } else {
                self.route_key(ctx)?;
            }
        }
        Ok(())
    }

    fn start_from_plaintext(&mut self, cipher: &str, plain: &str, fragments: &[String]) -> Step {
        let plain_dict = self.plain_dict;
        for split in segment(plain, plain_dict) {
            debug!("starting from plaintext words: {split}");
            let mut ctx = SearchContext::new(cipher, fragments);
            ctx.plain_words = split.owned_words();
            ctx.plain_stub = split.stub.map(str::to_string);

            if ctx.plain_stub.is_some() {
                self.plaintext_for_prefix(ctx)?;
            } else if ctx.plain_len() <= ctx.cipher_len() {
                self.catch_up_key(ctx)?;
            } else {
                self.ciphers_for_plaintext(ctx)?;
            }
        }
        Ok(())
    }

    /// Pick the next state once the key is made of complete words.
    fn route_key(&mut self, ctx: SearchContext) -> Step {
        debug_assert!(ctx.key_stub.is_none());
        let (key_len, cipher_len, plain_len) = (ctx.key_len(), ctx.cipher_len(), ctx.plain_len());

        if key_len < cipher_len {
            self.key_words(ctx)
        } else if key_len > cipher_len {
            self.ciphers_for_key(ctx)
        } else if key_len > plain_len {
            self.plaintext_words(ctx)
        } else {
            self.terminal(ctx)
        }
    }

    fn key_words(&mut self, ctx: SearchContext) -> Step {
        self.enter(SearchState::KeyWords, &ctx)?;

        let query = KeyWordQuery {
            key_dict: self.key_dict,
            plain_dict: self.plain_dict,
            cipher: &ctx.cipher,
            plain_offset: ctx.plain_words_len(),
            min_word_len: self.config.min_key_word_len,
        };
        let offset = ctx.key_words_len();
        let fixed = ctx.key_words.len();

        for sequence in KeyWordGenerator::new(query, &ctx.key_words, ctx.key_stub.as_deref()) {
            self.report_key_words(&sequence[fixed..], offset, &ctx.cipher);

            let mut child = ctx.descend();
            child.key_words = sequence;
            child.key_stub = None;
            self.route_key(child)?;
        }
        Ok(())
    }

    fn ciphers_for_key(&mut self, ctx: SearchContext) -> Step {
        self.enter(SearchState::CiphersForKey, &ctx)?;

        let key = ctx.key();
        let assembler =
            FragmentAssembler::key_anchored(&ctx.cipher, &ctx.fragments, &key, ctx.plain_words_len(), self.plain_dict);

        for assembly in assembler {
            let mut child = ctx.descend();
            child.cipher = assembly.cipher;
            child.fragments = assembly.unused;
            self.plaintext_words(child)?;
        }
        Ok(())
    }

    fn plaintext_words(&mut self, ctx: SearchContext) -> Step {
        self.enter(SearchState::PlaintextWords, &ctx)?;
        debug_assert!(ctx.plain_stub.is_none());

        let key = ctx.key();
        let covered = key.len().min(ctx.cipher_len());
        let plain = decode(&ctx.cipher[..covered], &key[..covered]);
        let tail = plain.get(ctx.plain_words_len()..).unwrap_or("");

        let plain_dict = self.plain_dict;
        for split in segment(tail, plain_dict) {
            let mut child = ctx.descend();
            child.plain_words.extend(split.owned_words());
            child.plain_stub = split.stub.map(str::to_string);

            if child.plain_stub.is_some() {
                self.plaintext_for_prefix(child)?;
            } else {
                self.route_key(child)?;
            }
        }
        Ok(())
    }

    fn plaintext_for_prefix(&mut self, ctx: SearchContext) -> Step {
        self.enter(SearchState::PlaintextForPrefix, &ctx)?;

        let Some(stub) = ctx.plain_stub.as_deref() else {
            debug_assert!(false, "PLAINTEXT_FOR_PREFIX entered without a stub");
            return Ok(());
        };

        let plain_dict = self.plain_dict;
        let candidates: Vec<&str> = plain_dict
            .words_with_prefix(stub)
            .iter()
            .map(String::as_str)
            .filter(|w| w.len() > stub.len())
            .collect();
        let probe = self.config.probe_short_stubs && stub.len() <= self.config.short_stub_len && candidates.len() > 1;

        for (i, word) in candidates.iter().enumerate() {
            let before = self.stats.records_emitted;

            let mut child = ctx.descend();
            child.plain_stub = None;
            child.plain_words.push((*word).to_string());
            if child.plain_len() <= child.cipher_len() {
                self.catch_up_key(child)?;
            } else {
                self.ciphers_for_plaintext(child)?;
            }

            if probe && i == 0 && self.stats.records_emitted == before {
                debug!("stub '{stub}': probe '{word}' found nothing, skipping {} more", candidates.len() - 1);
                self.stats.probes_pruned += 1;
                break;
            }
        }
        Ok(())
    }

    fn ciphers_for_plaintext(&mut self, ctx: SearchContext) -> Step {
        self.enter(SearchState::CiphersForPlaintext, &ctx)?;

        let target = ctx.plain_len().max(ctx.key_len() + self.config.lookahead);
        for assembly in FragmentAssembler::plaintext_anchored(&ctx.cipher, &ctx.fragments, target) {
            let mut child = ctx.descend();
            child.cipher = assembly.cipher;
            child.fragments = assembly.unused;
            self.catch_up_key(child)?;
        }
        Ok(())
    }

    /// Derive the key under plaintext that runs ahead of it and split it into key words.
    fn catch_up_key(&mut self, ctx: SearchContext) -> Step {
        debug_assert!(ctx.key_stub.is_none());
        let (key_len, plain_len) = (ctx.key_len(), ctx.plain_len());
        if plain_len <= key_len {
            return self.route_key(ctx);
        }

        let plaintext = ctx.plaintext();
        let Some(cipher_slice) = ctx.cipher.get(key_len..plain_len) else {
            // not enough cipher to cover the plaintext; nothing to derive
            return Ok(());
        };
        let extension = derive_key(cipher_slice, &plaintext[key_len..plain_len]);
        trace!("{:indent$}derived key '{extension}' under '{}'", "", &plaintext[key_len..], indent = ctx.depth.min(40) * 2);

        let (key_dict, min_len) = (self.key_dict, self.config.min_key_word_len);
        for split in segment(&extension, key_dict).filter(|split| words_long_enough(&split.words, min_len)) {
            let mut child = ctx.descend();
            let new_words = split.owned_words();
            self.report_key_words(&new_words, key_len, &ctx.cipher);
            child.key_words.extend(new_words);
            child.key_stub = split.stub.map(str::to_string);

            if child.key_stub.is_some() {
                self.key_words(child)?;
            } else {
                self.route_key(child)?;
            }
        }
        Ok(())
    }

    fn terminal(&mut self, ctx: SearchContext) -> Step {
        self.enter(SearchState::Terminal, &ctx)?;

        let record = ctx.to_record();
        let leftovers = !record.unused_fragments.is_empty();
        debug!("{record}");

        self.stats.records_emitted += 1;
        if (self.on_record)(record).is_break() {
            return Err(Stop::Requested);
        }

        if leftovers && self.config.extend_final {
            self.key_words(ctx.descend())?;
        }
        Ok(())
    }

    fn report_key_words(&mut self, words: &[String], mut offset: usize, cipher: &str) {
        for word in words {
            let end = (offset + word.len()).min(cipher.len());
            let slice = cipher.get(offset..end).unwrap_or("");
            self.observer.on_key_word(word, offset, slice);
            offset += word.len();
        }
    }
}

fn words_long_enough(words: &[&str], min_len: usize) -> bool {
    words.iter().all(|word| word.len() >= min_len)
}

//! Integration tests for the runkey solver.
//!
//! These tests run the complete pipeline from dictionary files through the joint search
//! to record validation, and check the invariants every record must satisfy.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use runkey::codec::{decode, derive_key, encode};
use runkey::context::{Outcome, TerminalRecord};
use runkey::dictionary::{Dictionary, DictionaryOptions};
use runkey::parser::parse_fragment_list;
use runkey::report::{DecodeTable, NullObserver};
use runkey::segmenter::segment;
use runkey::solver::{load_dictionary, Puzzle, SearchConfig, SolveOptions, SolveStatus, Solver, SolverError};

/// Load one of the fixture word lists, keeping words of any length
fn load_fixture(name: &str) -> Dictionary {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    load_dictionary(&path, &DictionaryOptions::with_min_word_len(1)).expect("Failed to load fixture dictionary")
}

fn dictionaries() -> (Dictionary, Dictionary) {
    (load_fixture("plain_words.txt"), load_fixture("key_words.txt"))
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Can `rest` be tiled exactly by `pieces`, each used once?
fn tiles(rest: &str, pieces: &mut Vec<String>) -> bool {
    if rest.is_empty() {
        return pieces.is_empty();
    }
    for i in 0..pieces.len() {
        if rest.starts_with(pieces[i].as_str()) {
            let piece = pieces.remove(i);
            let ok = tiles(&rest[piece.len()..], pieces);
            pieces.insert(i, piece);
            if ok {
                return true;
            }
        }
    }
    false
}

/// Check everything a record promises about itself and the puzzle it came from
fn assert_record_is_consistent(record: &TerminalRecord, puzzle: &Puzzle, plain: &Dictionary, key: &Dictionary) {
    let pkc = &record.pkc;
    assert_eq!(pkc.plaintext.len(), pkc.cipher.len());
    assert_eq!(pkc.key.len(), pkc.cipher.len());
    assert_eq!(decode(&pkc.cipher, &pkc.key), pkc.plaintext);
    assert_eq!(derive_key(&pkc.cipher, &pkc.plaintext), pkc.key);

    assert_eq!(record.plain_words.concat(), pkc.plaintext);
    assert_eq!(record.key_words.concat(), pkc.key);
    assert!(record.plain_words.iter().all(|w| plain.contains(w)), "{:?}", record.plain_words);
    assert!(record.key_words.iter().all(|w| key.contains(w)), "{:?}", record.key_words);

    if let Some(p) = &puzzle.plaintext {
        assert!(pkc.plaintext.starts_with(p.as_str()));
    }
    if let Some(k) = &puzzle.key {
        assert!(pkc.key.starts_with(k.as_str()));
    }
    assert!(pkc.cipher.starts_with(puzzle.cipher.as_str()));

    // the cipher beyond the known prefix is exactly the used fragments, each once
    let mut used = puzzle.fragments.clone();
    for unused in &record.unused_fragments {
        let pos = used.iter().position(|f| f == unused).expect("unused fragment must come from the pool");
        used.remove(pos);
    }
    assert!(tiles(&pkc.cipher[puzzle.cipher.len()..], &mut used), "cipher {} not tiled", pkc.cipher);

    assert_eq!(record.outcome == Outcome::Perfect, record.unused_fragments.is_empty());
}

#[cfg(test)]
mod joint_search {
    use super::*;

    #[test]
    fn test_key_prefix_with_fixture_dictionaries() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let puzzle = Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]);
        let result = solver.solve(&puzzle, &SolveOptions::default()).unwrap();

        assert_eq!(result.status, SolveStatus::Exhausted);
        assert_eq!(result.len(), 4);
        for record in &result.records {
            assert_record_is_consistent(record, &puzzle, &plain, &key);
            assert_eq!(record.to_string(), "PERFECT p: epicsnow k: bonfires c: xzfdqeqw");
        }

        let splits: HashSet<_> = result.records.iter().map(|r| (r.plain_words.clone(), r.key_words.clone())).collect();
        assert!(splits.contains(&(words(&["epics", "now"]), words(&["bonfires"]))));
        assert!(splits.contains(&(words(&["epic", "snow"]), words(&["bon", "fires"]))));
    }

    #[test]
    fn test_plaintext_prefix_finds_same_texts() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let from_plain = solver.solve(&Puzzle::with_plaintext("xzfdq", "epic", &["e", "qw"]), &SolveOptions::default()).unwrap();
        let from_key = solver.solve(&Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]), &SolveOptions::default()).unwrap();

        let a: HashSet<_> = from_plain.records.into_iter().collect();
        let b: HashSet<_> = from_key.records.into_iter().collect();
        assert_eq!(a.len(), 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_plaintext_stub() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let puzzle = Puzzle::with_plaintext("xzfdq", "ep", &["e", "qw"]);
        let result = solver.solve(&puzzle, &SolveOptions::default()).unwrap();
        assert_eq!(result.len(), 4);
        for record in &result.records {
            assert_record_is_consistent(record, &puzzle, &plain, &key);
        }
    }

    #[test]
    fn test_cipher_built_entirely_from_fragments() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let puzzle = Puzzle::with_key("", "bonf", &["xzf", "dq", "e", "qw"]);
        let result = solver.solve(&puzzle, &SolveOptions::default()).unwrap();
        assert_eq!(result.len(), 4);
        for record in &result.records {
            assert_record_is_consistent(record, &puzzle, &plain, &key);
        }
    }

    #[test]
    fn test_leftover_fragment_gives_final_records() {
        let (plain, key) = dictionaries();
        let puzzle = Puzzle::with_key("xzfdq", "bonf", &["e", "qw", "tn"]);
        for extend_final in [true, false] {
            let solver = Solver::new(&plain, &key, SearchConfig { extend_final, ..SearchConfig::default() });
            let result = solver.solve(&puzzle, &SolveOptions::default()).unwrap();
            assert_eq!(result.len(), 4);
            for record in &result.records {
                assert_eq!(record.outcome, Outcome::Final);
                assert_eq!(record.unused_fragments, words(&["tn"]));
                assert_record_is_consistent(record, &puzzle, &plain, &key);
            }
        }
    }

    #[test]
    fn test_no_fragments_and_full_cipher() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let puzzle = Puzzle::with_key("xzfdqeqw", "bon", &[]);

        let mut raw = 0;
        solver
            .search(&puzzle, None, &mut NullObserver, |_| {
                raw += 1;
                ControlFlow::Continue(())
            })
            .unwrap();
        let result = solver.solve(&puzzle, &SolveOptions::default()).unwrap();

        // each record here is reached along exactly one branch
        assert_eq!(raw, result.len());
        assert_eq!(result.len(), 4);
        assert!(result.records.iter().all(TerminalRecord::is_perfect));
    }

    #[test]
    fn test_record_reached_twice_is_returned_once() {
        let plain = Dictionary::from_words(["xw"]);
        let key = Dictionary::from_words(["zz"]);
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let puzzle = Puzzle::with_key("", "zz", &["c", "d", "cd"]);

        let mut raw = Vec::new();
        solver
            .search(&puzzle, None, &mut NullObserver, |record| {
                raw.push(record);
                ControlFlow::Continue(())
            })
            .unwrap();
        let distinct: HashSet<_> = raw.iter().cloned().collect();
        assert_eq!(raw.len(), 4);
        assert_eq!(distinct.len(), 3);

        let result = solver.solve(&puzzle, &SolveOptions::default()).unwrap();
        assert_eq!(result.len(), distinct.len());
        for record in &result.records {
            assert_record_is_consistent(record, &puzzle, &plain, &key);
        }
    }

    #[test]
    fn test_same_dictionary_for_key_and_plaintext() {
        let (plain, key) = dictionaries();
        let mut all: Vec<String> = plain.words().to_vec();
        all.extend(key.words().iter().cloned());
        let both = Dictionary::from_words(all);

        let solver = Solver::new(&both, &both, SearchConfig::default());
        let puzzle = Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]);
        let result = solver.solve(&puzzle, &SolveOptions::default()).unwrap();
        assert!(result.len() >= 4);
        for record in &result.records {
            assert_record_is_consistent(record, &puzzle, &both, &both);
        }
    }

    #[test]
    fn test_decode_table_sees_key_words() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let mut table = DecodeTable::new();
        solver
            .solve_with_observer(&Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]), &SolveOptions::default(), &mut table)
            .unwrap();

        let bon: Vec<_> = table.slices_for("bon").collect();
        assert!(bon.iter().any(|s| s.offset == 0 && s.plaintext == "epi"));
        assert!(table.render().contains("TERMINAL"));
    }
}

#[cfg(test)]
mod limits {
    use super::*;

    #[test]
    fn test_max_results() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let options = SolveOptions { max_results: 2, ..SolveOptions::default() };
        let result = solver.solve(&Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]), &options).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.status, SolveStatus::FoundEnough);
    }

    #[test]
    fn test_perfect_only_drops_final_records() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let options = SolveOptions { perfect_only: true, ..SolveOptions::default() };
        let result = solver.solve(&Puzzle::with_key("xzfdq", "bonf", &["e", "qw", "tn"]), &options).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.status, SolveStatus::Exhausted);
    }

    #[test]
    fn test_time_limit() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let options = SolveOptions { time_limit: Some(Duration::ZERO), ..SolveOptions::default() };
        let result = solver.solve(&Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]), &options).unwrap();
        assert!(matches!(result.status, SolveStatus::TimedOut { .. }));

        let generous = SolveOptions { time_limit: Some(Duration::from_secs(60)), ..SolveOptions::default() };
        let result = solver.solve(&Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]), &generous).unwrap();
        assert_eq!(result.status, SolveStatus::Exhausted);
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_callback_can_stop_search() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let mut seen = Vec::new();
        let summary = solver
            .search(&Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]), None, &mut NullObserver, |record| {
                seen.push(record);
                ControlFlow::Break(())
            })
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(summary.status, SolveStatus::FoundEnough);
    }
}

#[cfg(test)]
mod building_blocks {
    use super::*;

    #[test]
    fn test_codec_round_trip() {
        let cipher = encode("epicsnow", "bonfires");
        assert_eq!(cipher, "xzfdqeqw");
        assert_eq!(decode(&cipher, "bonfires"), "epicsnow");
        assert_eq!(derive_key(&cipher, "epicsnow"), "bonfires");
    }

    #[test]
    fn test_segmenter_over_fixture() {
        let (plain, _) = dictionaries();
        let found: Vec<String> = segment("epicsnow", &plain).filter(|s| s.is_complete()).map(|s| s.to_string()).collect();
        assert!(found.contains(&"epic snow".to_string()));
        assert!(found.contains(&"epics now".to_string()));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_fixture_is_cleaned() {
        let (_, key) = dictionaries();
        // "Bon" is lower-cased on load
        assert!(key.contains("bon"));
        assert_eq!(key.words_with_prefix("bon"), words(&["bon", "bonfire", "bonfires"]).as_slice());
    }

    #[test]
    fn test_fragment_list_feeds_puzzle() {
        let fragments = parse_fragment_list("E, QW").unwrap();
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let puzzle = Puzzle { fragments, ..Puzzle::with_key("xzfdq", "bonf", &[]) };
        assert_eq!(solver.solve(&puzzle, &SolveOptions::default()).unwrap().len(), 4);
    }
}

#[cfg(test)]
mod error_cases {
    use super::*;

    #[test]
    fn test_missing_dictionary_file() {
        let err = load_dictionary(Path::new("tests/fixtures/missing.txt"), &DictionaryOptions::default()).unwrap_err();
        assert!(matches!(err, SolverError::EmptyDictionary { source: Some(_), .. }));
        assert!(err.display_detailed().contains("S004"));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_dictionary_filtered_to_nothing() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/key_words.txt");
        let err = load_dictionary(&path, &DictionaryOptions::with_min_word_len(20)).unwrap_err();
        assert!(matches!(err, SolverError::EmptyDictionary { source: None, .. }));
    }

    #[test]
    fn test_rejected_puzzles() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());

        let both = Puzzle { key: Some("bonf".to_string()), ..Puzzle::with_plaintext("xzfdq", "epic", &[]) };
        assert!(matches!(solver.solve(&both, &SolveOptions::default()), Err(SolverError::InvalidInput { .. })));

        let ambiguous = Puzzle::with_key("xzfdq", "bonf", &["n", "nc", "ngqzp"]);
        assert!(matches!(solver.solve(&ambiguous, &SolveOptions::default()), Err(SolverError::AmbiguousResidue { .. })));
    }

    #[test]
    fn test_nothing_found_is_not_an_error() {
        let (plain, key) = dictionaries();
        let solver = Solver::new(&plain, &key, SearchConfig::default());
        let result = solver.solve(&Puzzle::with_key("xzfdq", "fire", &["e", "qw"]), &SolveOptions::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.status, SolveStatus::Exhausted);
    }
}

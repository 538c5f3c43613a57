//! `bench_local.rs`: quick local timing runner (no Criterion)
//!
//! PURPOSE
//! -------
//! - Fast, ad-hoc timing for a handful of puzzles on *your* machine.
//! - Loads the dictionaries once, then runs each puzzle several times and reports the median.
//! - Every puzzle uses the same `SolveOptions` so comparisons stay simple.
//!
//! HOW TO RUN
//! ----------
//! - Optimized build:                `cargo run --bin bench_local --release`
//! - Multiple repeats:               `cargo run --bin bench_local --release -- -r 5`
//! - Print a few records:            `cargo run --bin bench_local --release -- -p 5`
//! - Real dictionary:                `cargo run --bin bench_local --release -- -d /usr/share/dict/words`
//!
//! NOTES
//! -----
//! - This is *not* Criterion. It's quick and convenient, not statistically rigorous.
//! - Puzzles live in `get_cases()` below.
//! - I/O (loading, printing) is kept outside the timed section.
//! - One warm-up run per puzzle is done (not included in timing).

use clap::Parser;
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Instant;

use runkey::context::TerminalRecord;
use runkey::dictionary::DictionaryOptions;
use runkey::solver::{self, Puzzle, SearchConfig, SolveOptions, Solver};

/// Simple local benchmark runner: load dictionaries once, time several puzzles.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Word list for plaintext words
    #[arg(
        short,
        long,
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/plain_words.txt")
    )]
    dict: PathBuf,

    /// Word list for key words
    #[arg(
        short,
        long,
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/key_words.txt")
    )]
    key_dict: PathBuf,

    /// Drop words shorter than this
    #[arg(short = 'm', long, default_value_t = 1)]
    min_word_len: usize,

    /// Number of repeats per puzzle (use >1 to reduce noise; median is reported)
    #[arg(short = 'r', long = "repeats", default_value_t = 1)]
    num_repeats: usize,

    /// Print up to this many records per puzzle (0 = print none)
    #[arg(short = 'p', long = "print", default_value_t = 0)]
    print_limit: usize,
}

/// A benchmark case: a short label and the puzzle to solve.
struct Case {
    name: &'static str,
    puzzle: Puzzle,
}

/// Edit/add new puzzles here.
fn get_cases() -> Vec<Case> {
    let fragments = ["qvu", "bma", "aps", "e", "tn", "nc", "sc", "ngqzp"];
    vec![
        Case { name: "key bonf, small pool", puzzle: Puzzle::with_key("xzfdq", "bonf", &["e", "qw"]) },
        Case { name: "plain epic, small pool", puzzle: Puzzle::with_plaintext("xzfdq", "epic", &["e", "qw"]) },
        Case { name: "plain ep, small pool", puzzle: Puzzle::with_plaintext("xzfdq", "ep", &["e", "qw"]) },
        Case { name: "key bon, no pool", puzzle: Puzzle::with_key("xzfdqeqw", "bon", &[]) },
        Case { name: "key bonf, full pool", puzzle: Puzzle::with_key("xzfdq", "bonf", &fragments) },
        Case { name: "plain epic, full pool", puzzle: Puzzle::with_plaintext("xzfdq", "epic", &fragments) },
    ]
}

/// Small helper: robust central tendency for small samples.
fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(f64::total_cmp);
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        0.5 * (xs[n / 2 - 1] + xs[n / 2])
    }
}

fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        format!("{singular}s")
    }
}

const MAX_NAME_LEN: usize = 32;

fn main() -> Result<(), solver::SolverError> {
    let cli = Cli::parse();
    runkey::log::init_logger(runkey::log::debug_from_env());

    // Load the dictionaries once. This I/O is *not* included in per-puzzle timing.
    let options = DictionaryOptions::with_min_word_len(cli.min_word_len);
    let t_load = Instant::now();
    let plain_dict = solver::load_dictionary(&cli.dict, &options)?;
    let key_dict = solver::load_dictionary(&cli.key_dict, &options)?;
    eprintln!(
        "Loaded {} + {} words in {:.3}s",
        plain_dict.len(),
        key_dict.len(),
        t_load.elapsed().as_secs_f64()
    );

    let solver = Solver::new(&plain_dict, &key_dict, SearchConfig::default());
    let solve_options = SolveOptions::default();
    let cases = get_cases();
    let mut summary: Vec<(&str, f64, usize)> = Vec::with_capacity(cases.len());

    for (idx, case) in cases.iter().enumerate() {
        eprintln!("\n[{:02}] {}", idx + 1, case.name);

        // One warm-up execution per puzzle; its timing is ignored.
        if let Err(e) = solver.solve(&case.puzzle, &solve_options) {
            eprintln!("  warm-up failed: {}", e.display_detailed());
            continue;
        }

        let mut times = Vec::with_capacity(cli.num_repeats);
        let mut last_records: Vec<TerminalRecord> = Vec::new();

        for rep in 0..cli.num_repeats {
            // Keep only the *core* operation inside the timed region.
            let t_solve = Instant::now();
            let result = solver.solve(black_box(&case.puzzle), &solve_options)?;
            let solve_secs = t_solve.elapsed().as_secs_f64();

            let _keep = black_box(result.len());
            times.push(solve_secs);
            eprintln!(
                "  run {:>2}/{:>2}: {:.4}s ({} records, {} states)",
                rep + 1,
                cli.num_repeats,
                solve_secs,
                result.len(),
                result.stats.states_entered
            );
            last_records = result.records;
        }

        let med = median(times);

        // Optionally print a few records from the *last* run (outside timing).
        for record in last_records.iter().take(cli.print_limit) {
            println!("{record}");
        }

        eprintln!(
            "  median {:.4}s over {} run(s); last run produced {} {}",
            med,
            cli.num_repeats,
            last_records.len(),
            pluralize(last_records.len(), "record")
        );
        summary.push((case.name, med, last_records.len()));
    }

    // Compact summary at the end for a quick scan across all puzzles.
    eprintln!("\n==== Summary ====");
    eprintln!("{:<MAX_NAME_LEN$} | {:>10} | {:>9}", "puzzle", "median (s)", "# records");
    eprintln!("{:-<MAX_NAME_LEN$}-+-{:-<10}-+-{:-<9}", "", "", "");
    for (name, med, count) in &summary {
        eprintln!("{name:<MAX_NAME_LEN$} | {med:>10.4} | {count:>9}");
    }

    Ok(())
}

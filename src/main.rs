use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use runkey::codec;
use runkey::dictionary::{Dictionary, DictionaryOptions};
use runkey::parser::{parse_fragment_list, parse_letters, parse_optional_letters, parse_seconds};
use runkey::report::DecodeTable;
use runkey::segmenter::segment;
use runkey::solver::{self, Puzzle, SearchConfig, SolveOptions, SolveStatus, Solver, SolverError};

const DEFAULT_CIPHER: &str = "xzfdq";
const DEFAULT_FRAGMENTS: &str = "qvu,bma,aps,e,tn,nc,sc,ngqzp";

/// Running-key cipher solver
#[derive(Parser, Debug)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
struct Cli {
    /// Enable debug logging (same as setting RUNKEY_DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for key, plaintext and cipher together
    Solve(SolveArgs),
    /// Decode, encode or derive keys for single strings
    Codec(CodecArgs),
    /// Print every way to split a letter string into dictionary words
    Segment {
        /// Letters to split
        text: String,
        #[command(flatten)]
        dict: DictArgs,
    },
    /// List dictionary words starting with a prefix
    Words {
        /// Prefix to look up
        prefix: String,
        #[command(flatten)]
        dict: DictArgs,
    },
}

#[derive(Args, Debug)]
struct DictArgs {
    /// Path to the word list (one word per line)
    #[arg(short, long, default_value = "/usr/share/dict/words")]
    dict: PathBuf,

    /// Drop words shorter than this
    #[arg(long, default_value_t = 3)]
    min_word_len: usize,

    /// Drop words without a vowel (aeiouy)
    #[arg(long)]
    require_vowel: bool,

    /// Add common one- and two-letter words back after filtering
    #[arg(long)]
    short_words: bool,
}

impl DictArgs {
    fn options(&self) -> DictionaryOptions {
        DictionaryOptions {
            min_word_len: self.min_word_len,
            require_vowel: self.require_vowel,
            add_short_words: self.short_words,
        }
    }
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Known ciphertext prefix (may be empty)
    #[arg(short, long, default_value = DEFAULT_CIPHER)]
    cipher: String,

    /// Known plaintext prefix
    #[arg(short, long, conflicts_with = "key")]
    plain: Option<String>,

    /// Known key prefix
    #[arg(short, long)]
    key: Option<String>,

    /// Cipher fragments of unknown position, comma or space separated
    #[arg(short, long, default_value = DEFAULT_FRAGMENTS)]
    fragments: String,

    #[command(flatten)]
    dict: DictArgs,

    /// Separate word list for key words (defaults to --dict)
    #[arg(long)]
    key_dict: Option<PathBuf>,

    /// Shortest word allowed anywhere in the key
    #[arg(long, default_value_t = 1)]
    min_key_word_len: usize,

    /// Maximum number of distinct records to return
    #[arg(short = 'n', long, default_value_t = 100)]
    max_results: usize,

    /// Wall-clock limit in seconds (e.g. 30 or 30s)
    #[arg(short, long)]
    time_limit: Option<String>,

    /// Only report records that place every fragment
    #[arg(long)]
    perfect_only: bool,

    /// Try every completion of short plaintext stubs
    #[arg(long)]
    no_probe: bool,

    /// Extra cipher to assemble beyond the key when plaintext runs ahead
    #[arg(long, default_value_t = 0)]
    lookahead: usize,

    /// Stop at the first record that leaves fragments unplaced
    #[arg(long)]
    stop_at_final: bool,

    /// Print the key-word decode table and state counts after the search
    #[arg(long)]
    dump_tables: bool,
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// Key to decode or encode with
    #[arg(short, long)]
    key: Option<String>,

    /// Plaintext to derive keys from, or to encode with --key
    #[arg(short, long)]
    plain: Option<String>,

    /// Ciphertexts, comma or space separated
    #[arg(short, long)]
    ciphers: Option<String>,
}

/// Entry point of the runkey CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// in a user-friendly way before exiting with code 1.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    runkey::log::init_logger(cli.verbose || runkey::log::debug_from_env());

    if let Err(e) = try_main(cli) {
        // Print the error message to stderr, with detailed formatting if it's a SolverError
        if let Some(solver_err) = e.downcast_ref::<SolverError>() {
            eprintln!("Error: {}", solver_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        // Exit explicitly with a nonzero code so scripts can detect failure
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Dispatch to the selected subcommand.
///
/// Returns `Ok(())` on success, whether or not anything was found, or an error
/// (bad letters, unreadable dictionary, rejected puzzle) which bubbles up to [`main`].
fn try_main(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Solve(args) => run_solve(&args),
        Command::Codec(args) => run_codec(&args),
        Command::Segment { text, dict } => {
            let text = parse_letters(&text).map_err(SolverError::from)?;
            let dict = solver::load_dictionary(&dict.dict, &dict.options())?;
            let mut found = 0;
            for split in segment(&text, &dict) {
                println!("{split}");
                found += 1;
            }
            if found == 0 {
                println!("No segmentations found.");
            }
            Ok(())
        }
        Command::Words { prefix, dict } => {
            let prefix = parse_letters(&prefix).map_err(SolverError::from)?;
            let dict = solver::load_dictionary(&dict.dict, &dict.options())?;
            for word in dict.words_with_prefix(&prefix) {
                println!("{word}");
            }
            Ok(())
        }
    }
}

fn run_solve(args: &SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Normalise the command-line text into a puzzle
    let puzzle = Puzzle {
        cipher: parse_optional_letters(&args.cipher).map_err(SolverError::from)?,
        plaintext: args.plain.as_deref().map(parse_optional_letters).transpose().map_err(SolverError::from)?,
        key: args.key.as_deref().map(parse_optional_letters).transpose().map_err(SolverError::from)?,
        fragments: if args.fragments.trim().is_empty() {
            Vec::new()
        } else {
            parse_fragment_list(&args.fragments).map_err(SolverError::from)?
        },
    };
    let time_limit = args.time_limit.as_deref().map(parse_seconds).transpose().map_err(SolverError::from)?;

    // 2. Load the dictionaries
    let t_load = Instant::now();
    let plain_dict = solver::load_dictionary(&args.dict.dict, &args.dict.options())?;
    let key_dict: Option<Dictionary> =
        args.key_dict.as_deref().map(|path| solver::load_dictionary(path, &args.dict.options())).transpose()?;
    let load_secs = t_load.elapsed().as_secs_f64();

    let config = SearchConfig {
        min_key_word_len: args.min_key_word_len,
        lookahead: args.lookahead,
        probe_short_stubs: !args.no_probe,
        extend_final: !args.stop_at_final,
        ..SearchConfig::default()
    };
    let options = SolveOptions { max_results: args.max_results, time_limit, perfect_only: args.perfect_only };
    let solver = Solver::new(&plain_dict, key_dict.as_ref().unwrap_or(&plain_dict), config);

    // 3. Search
    let mut table = DecodeTable::new();
    let t_solve = Instant::now();
    let result = solver.solve_with_observer(&puzzle, &options, &mut table)?;
    let solve_secs = t_solve.elapsed().as_secs_f64();

    // 4. Print each record on stdout
    if result.is_empty() {
        println!("No solutions found.");
    }
    for (i, record) in result.records.iter().enumerate() {
        println!("{}: {record}", i + 1);
        println!("    plain: {}", record.plain_words.join(" "));
        println!("    key:   {}", record.key_words.join(" "));
        if !record.unused_fragments.is_empty() {
            println!("    unused: {}", record.unused_fragments.join(","));
        }
    }

    if args.dump_tables {
        print!("{}", table.render());
    }

    match result.status {
        SolveStatus::TimedOut { elapsed } => {
            eprintln!("Timed out after {:.1}s; some solutions may not have been returned", elapsed.as_secs_f64());
        }
        SolveStatus::FoundEnough => {
            eprintln!("Stopped after finding {}/{} requested solutions", result.len(), args.max_results);
        }
        SolveStatus::Exhausted => {
            eprintln!("Search exhausted (no more solutions)");
        }
    }

    // 5. Print diagnostics (dictionary size, timings, counts) to stderr
    eprintln!(
        "Loaded {} words in {:.3}s; solved in {:.3}s ({} records, {} perfect, {} states).",
        plain_dict.len(),
        load_secs,
        solve_secs,
        result.len(),
        result.perfect().count(),
        result.stats.states_entered
    );

    Ok(())
}

fn run_codec(args: &CodecArgs) -> Result<(), Box<dyn std::error::Error>> {
    let key = args.key.as_deref().map(parse_letters).transpose().map_err(SolverError::from)?;
    let plain = args.plain.as_deref().map(parse_letters).transpose().map_err(SolverError::from)?;
    let ciphers = args.ciphers.as_deref().map(parse_fragment_list).transpose().map_err(SolverError::from)?;

    match (key, plain, ciphers) {
        (Some(key), Some(plain), None) => {
            println!("{}", codec::encode(&plain, &key));
        }
        (Some(key), None, Some(ciphers)) => {
            for cipher in ciphers {
                println!("{cipher} -> {}", codec::decode(&cipher, &key));
            }
        }
        (None, Some(plain), Some(ciphers)) => {
            for cipher in ciphers {
                println!("{cipher} -> {}", codec::derive_key(&cipher, &plain));
            }
        }
        _ => {
            return Err(SolverError::InvalidInput {
                reason: "codec needs --key with --ciphers, --plain with --ciphers, or --key with --plain".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

// Reusable library API for the runkey CLI and tools
pub mod alphabet;
pub mod codec;
pub mod context;
pub mod dictionary;
pub mod errors;
pub mod fragments;
pub mod key_words;
pub mod log;
pub mod parser;
pub mod report;
pub mod segmenter;
pub mod solver;

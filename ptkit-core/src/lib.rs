// ptkit-core/src/lib.rs
//! # ptkit Core Library
//!
//! `ptkit-core` provides the platform-independent logic for working with
//! phrase tables from statistical machine translation: reading and validating
//! rows, collecting table statistics, filtering rows by their feature scores
//! and computing bidirectional lexical weights against a bilingual lexicon.
//!
//! The arithmetic of lexical weighting lives in the `no_std` crate
//! `ptkit-lexical`; this crate wires it to files, configuration and threads.
//!
//! ## Modules
//!
//! * `config`: Phrase-table layout, lexicon, scoring and filter settings, loaded from YAML.
//! * `phrase_table`: The record type and the validating line reader.
//! * `features`: Parsing of named and positional feature fields.
//! * `stats`: One-pass phrase-table statistics.
//! * `filter`: Feature predicates and per-source top-N selection.
//! * `lexicon`: The in-memory bilingual lexicon, its text format and its binary model.
//! * `scorer`: Batch and stream scoring of phrase pairs.
//! * `unlabeled`: Corpus n-grams missing from a phrase table, and their breakdown.
//! * `headless`: One-shot helpers over in-memory strings.
//! * `errors`: The library error type.
//!
//! ## Usage Example
//!
//! ```rust
//! use ptkit_core::{BilingualLexicon, LexicalEntry, LexicalScorer, Token};
//!
//! let mut lexicon = BilingualLexicon::new();
//! lexicon.insert(Token::Word("le"), Token::Word("the"), LexicalEntry::new(0.9, 0.7))?;
//!
//! let scorer = LexicalScorer::new(&lexicon);
//! let score = scorer.score_pair("le", "the")?;
//! assert_eq!(score.to_string(), "Forward score: 0.900; Backward score: 0.700");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Parsing and validation failures are reported as [`PtkitError`]; the
//! file-level entry points return `anyhow::Result` with context attached.

pub mod config;
pub mod errors;
pub mod features;
pub mod filter;
pub mod headless;
pub mod lexicon;
pub mod phrase_table;
pub mod scorer;
pub mod stats;
pub mod unlabeled;

/// Re-exports the configuration types and the merge helper.
pub use config::{
    merge_config, FeatureOp, FilterConfig, FilterRule, LexiconConfig, MalformedPolicy, PhraseTableConfig,
    PtkitConfig, ScoringConfig, DEFAULT_BATCH_SIZE, DEFAULT_DELIMITER,
};

pub use errors::PtkitError;

pub use features::FeatureSet;
pub use filter::{filter_records, CompiledFilter, CompiledRule, FilterSummary, TopNSelector};
pub use headless::{headless_analyze_string, headless_score_string};
pub use lexicon::{BilingualLexicon, LexicalEntry};
pub use phrase_table::{open_input, parse_record, PhraseTableReader, PhraseTableRecord};
pub use scorer::{build_thread_pool, LexicalScorer, OutputFormat, ScoreSummary, BACKWARD_FEATURE, FORWARD_FEATURE};
pub use stats::{analyze_records, LongestPair, PhraseTableStats, StatsCollector};
pub use unlabeled::{
    analyze_unlabeled, count_corpus_ngrams, extract_ngrams, load_source_phrases, select_unlabeled,
    select_unlabeled_phrases, write_unlabeled, SourcePhraseIndex, UnlabeledAnalysis, UnlabeledPhrase, UnlabeledReport,
};

/// Re-exports the scoring core so callers need a single dependency.
pub use ptkit_lexical::{Direction, FnLexicon, LexiconProvider, PhraseScore, ScoreError, Token, MAX_SCORE};

// ptkit/src/cli.rs
//! This file defines the command-line interface (CLI) for the ptkit application,
//! including all available commands and their arguments.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ptkit_core::OutputFormat;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "ptkit",
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "Analyze, filter and lexically score SMT phrase tables",
    long_about = "ptkit works on phrase tables from statistical machine translation: ` ||| `-separated rows holding a source phrase, a target phrase and their feature scores. It reports table statistics, filters rows by feature predicates or per-source top-N, and computes bidirectional lexical weights for every phrase pair against a word-level bilingual lexicon.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Path to a custom ptkit configuration file (YAML), merged over the built-in defaults.
    #[arg(long = "config", value_name = "FILE", global = true, env = "PTKIT_CONFIG", help = "Path to a custom configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `ptkit` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prints phrase-table statistics.
    #[command(about = "Prints phrase-table statistics (pair count, vocabularies, longest phrases).")]
    Analyze(AnalyzeCommand),

    /// Filters rows by feature predicates and per-source top-N.
    #[command(about = "Filters phrase-table rows by feature predicates and per-source top-N.")]
    Filter(FilterCommand),

    /// Computes forward and backward lexical weights for every phrase pair.
    #[command(about = "Computes forward and backward lexical weights for every phrase pair.")]
    Score(ScoreCommand),

    /// Converts a text lexicon into the binary model format.
    #[command(name = "compile-lexicon", about = "Converts a text lexicon into the binary model format.")]
    CompileLexicon(CompileLexiconCommand),

    /// Lists corpus n-grams the phrase table has no source phrase for.
    #[command(about = "Lists evaluation-corpus n-grams that have no source phrase in the table.")]
    Unlabeled(UnlabeledCommand),
}

/// Arguments for the `analyze` command.
#[derive(Parser, Debug)]
pub struct AnalyzeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the phrase table from a file (.gz supported) instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Export statistics to a JSON file.
    #[arg(long = "json-file", value_name = "FILE", help = "Export the statistics to a JSON file.")]
    pub json_file: Option<PathBuf>,

    /// Print statistics as JSON to stdout (conflicts with --json-file).
    #[arg(long = "json-stdout", conflicts_with = "json_file", help = "Export the statistics to stdout as JSON.")]
    pub json_stdout: bool,

    /// Render the statistics as a table instead of plain lines.
    #[arg(long = "table", conflicts_with = "json_stdout", help = "Render the statistics as a table.")]
    pub table: bool,
}

/// Arguments for the `filter` command.
#[derive(Parser, Debug)]
pub struct FilterCommand {
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the phrase table from a file (.gz supported) instead of stdin.")]
    pub input_file: Option<PathBuf>,

    #[arg(long, short = 'o', value_name = "FILE", help = "Write kept rows to a file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Explicitly enable these rule names (comma-separated).
    #[arg(long, short = 'e', value_delimiter = ',', help = "Enable these filter rules (comma-separated).")]
    pub enable: Vec<String>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Disable these filter rules (comma-separated).")]
    pub disable: Vec<String>,

    /// Keep only the N best rows per source phrase.
    #[arg(long = "top-n", value_name = "N", value_parser = clap::value_parser!(u64).range(1..), help = "Keep only the N best rows per source phrase.")]
    pub top_n: Option<u64>,

    /// Feature used to rank rows for --top-n.
    #[arg(long = "top-n-feature", value_name = "FEATURE", help = "Feature name or positional index ranked by --top-n (highest first).")]
    pub top_n_feature: Option<String>,

    /// Suppress the filter summary.
    #[arg(long = "no-summary", help = "Suppress the filter summary.")]
    pub no_summary: bool,
}

/// Output format for `score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScoreFormat {
    /// One `Forward score: ...; Backward score: ...` line per pair.
    Scores,
    /// The input row with EgivenFLex and FgivenELex appended to its features.
    Append,
}

impl From<ScoreFormat> for OutputFormat {
    fn from(format: ScoreFormat) -> Self {
        match format {
            ScoreFormat::Scores => OutputFormat::Scores,
            ScoreFormat::Append => OutputFormat::Append,
        }
    }
}

/// Arguments for the `score` command.
#[derive(Parser, Debug)]
pub struct ScoreCommand {
    /// Lexicon model, text or binary.
    #[arg(long = "lexicon", short = 'l', value_name = "FILE", help = "Path to the lexicon model (text or compiled binary).")]
    pub lexicon: PathBuf,

    #[arg(long, short = 'i', value_name = "FILE", help = "Read the phrase table from a file (.gz supported) instead of stdin.")]
    pub input_file: Option<PathBuf>,

    #[arg(long, short = 'o', value_name = "FILE", help = "Write scores to a file instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long = "format", short = 'f', value_enum, default_value = "scores", help = "Output format.")]
    pub format: ScoreFormat,

    /// Overrides `scoring.threads` from the configuration.
    #[arg(long = "threads", short = 't', value_name = "N", help = "Worker threads for batch scoring (0 = all cores).")]
    pub threads: Option<usize>,
}

/// Arguments for the `compile-lexicon` command.
#[derive(Parser, Debug)]
pub struct CompileLexiconCommand {
    /// Text lexicon: `source target p(t|s) p(s|t)` per line.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination of the binary model.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Arguments for the `unlabeled` command.
#[derive(Parser, Debug)]
pub struct UnlabeledCommand {
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the phrase table from a file (.gz supported) instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Evaluation corpus, one tokenized sentence per line.
    #[arg(long = "corpus", short = 'c', value_name = "FILE", help = "Evaluation corpus, one tokenized sentence per line (.gz supported).")]
    pub corpus: PathBuf,

    #[arg(
        long = "phrase-length",
        short = 'n',
        value_name = "N",
        default_value_t = 2,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Length of the source phrases and corpus n-grams to compare."
    )]
    pub phrase_length: u64,

    /// Where the unlabeled phrases go, one per line.
    #[arg(long = "write", short = 'w', value_name = "FILE", help = "Write the unlabeled phrases to a file.")]
    pub write: Option<PathBuf>,

    #[arg(long = "analyze", help = "Break the unlabeled phrases down by how many of their words are known.")]
    pub analyze: bool,

    #[arg(long = "json-stdout", help = "Print the selection report to stdout as JSON.")]
    pub json_stdout: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ptkit", "score", "--lexicon", "lex.txt", "-q", "--format", "append"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Score(cmd) => {
                assert_eq!(cmd.format, ScoreFormat::Append);
                assert_eq!(cmd.lexicon, PathBuf::from("lex.txt"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn top_n_must_be_positive() {
        assert!(Cli::try_parse_from(["ptkit", "filter", "--top-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["ptkit", "filter", "--top-n", "3", "-e", "a,b"]).is_ok());
    }

    #[test]
    fn unlabeled_defaults_and_bounds() {
        let cli = Cli::try_parse_from(["ptkit", "unlabeled", "--corpus", "dev.txt", "--analyze"]).unwrap();
        match cli.command {
            Commands::Unlabeled(cmd) => {
                assert_eq!(cmd.phrase_length, 2);
                assert!(cmd.analyze);
                assert_eq!(cmd.write, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["ptkit", "unlabeled", "--corpus", "dev.txt", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["ptkit", "unlabeled", "-n", "3"]).is_err());
    }
}

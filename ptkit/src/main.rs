// ptkit/src/main.rs
//! ptkit entry point.
//!
//! Parses the command line, initializes logging, loads the merged
//! configuration and dispatches to the selected subcommand.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use ptkit::cli::{Cli, Commands};
use ptkit::commands::analyze::{run_analyze, AnalyzeOptions};
use ptkit::commands::compile::run_compile_lexicon;
use ptkit::commands::filter::{run_filter, FilterOptions};
use ptkit::commands::score::{run_score, ScoreOptions};
use ptkit::commands::unlabeled::{run_unlabeled, UnlabeledOptions};
use ptkit::commands::{error_msg, load_config};
use ptkit::logger;
use ptkit::ui::theme::{build_theme_map, ThemeMap, ThemeStyle};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug));

    let theme = match build_theme_map(cli.theme.as_deref()).context("Theme error") {
        Ok(theme) => theme,
        Err(e) => {
            let fallback = ThemeStyle::default_theme_map();
            error_msg(format!("{:#}", e), &fallback);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &theme) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error_msg(format!("{:#}", e), &theme);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, theme: &ThemeMap) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Analyze(cmd) => {
            let opts = AnalyzeOptions {
                input_file: cmd.input_file,
                json_file: cmd.json_file,
                json_stdout: cmd.json_stdout,
                table: cmd.table,
                quiet,
            };
            run_analyze(&config, opts, theme)?;
        }
        Commands::Filter(cmd) => {
            let opts = FilterOptions {
                input_file: cmd.input_file,
                output: cmd.output,
                enable: cmd.enable,
                disable: cmd.disable,
                top_n: cmd.top_n.map(|n| n as usize),
                top_n_feature: cmd.top_n_feature,
                no_summary: cmd.no_summary,
                quiet,
            };
            run_filter(&config, opts, theme)?;
        }
        Commands::Score(cmd) => {
            let opts = ScoreOptions {
                lexicon: cmd.lexicon,
                input_file: cmd.input_file,
                output: cmd.output,
                format: cmd.format.into(),
                threads: cmd.threads,
                quiet,
            };
            run_score(&config, opts, theme)?;
        }
        Commands::CompileLexicon(cmd) => {
            run_compile_lexicon(&config, &cmd.input, &cmd.output, quiet, theme)?;
        }
        Commands::Unlabeled(cmd) => {
            let opts = UnlabeledOptions {
                input_file: cmd.input_file,
                corpus: cmd.corpus,
                phrase_length: cmd.phrase_length as usize,
                write: cmd.write,
                analyze: cmd.analyze,
                json_stdout: cmd.json_stdout,
                quiet,
            };
            run_unlabeled(&config, opts, theme)?;
        }
    }
    Ok(())
}

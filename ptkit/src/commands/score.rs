//! `ptkit score`: bidirectional lexical weighting of every phrase pair.

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use ptkit_core::{
    build_thread_pool, open_input, BilingualLexicon, LexicalScorer, OutputFormat, PhraseTableReader, PtkitConfig,
    ScoreSummary,
};

use super::{info_msg, open_output, report_skipped};
use crate::ui::theme::ThemeMap;

pub struct ScoreOptions {
    pub lexicon: PathBuf,
    pub input_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub threads: Option<usize>,
    pub quiet: bool,
}

pub fn run_score(config: &PtkitConfig, opts: ScoreOptions, theme: &ThemeMap) -> Result<ScoreSummary> {
    info!("Starting score operation.");
    // Loaded once; every worker reads the same table.
    let lexicon = BilingualLexicon::load(&opts.lexicon, &config.lexicon.null_token)?;
    if !opts.quiet {
        info_msg(format!("Loaded {} lexicon entries from {}", lexicon.len(), opts.lexicon.display()), theme);
    }

    let scorer = LexicalScorer::new(&lexicon);
    let pool = build_thread_pool(opts.threads.unwrap_or(config.scoring.threads))?;
    info!("Scoring with {} worker threads.", pool.current_num_threads());

    let input = open_input(opts.input_file.as_deref())?;
    let mut reader = PhraseTableReader::new(input, config.phrase_table.clone());
    let mut writer = open_output(opts.output.as_deref())?;

    let summary = pool.install(|| {
        scorer.score_stream(
            reader.by_ref(),
            &mut writer,
            opts.format,
            config.scoring.batch_size,
            &config.phrase_table.delimiter,
        )
    })?;
    drop(writer);
    report_skipped(reader.skipped(), opts.quiet, theme);

    if !opts.quiet {
        info_msg(format!("Scored {} phrase pairs.", summary.scored), theme);
    }
    Ok(summary)
}

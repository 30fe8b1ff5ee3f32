//! `ptkit unlabeled`: corpus n-grams missing from the phrase table.

use anyhow::{bail, Context, Result};
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;

use ptkit_core::{open_input, select_unlabeled_phrases, PhraseTableReader, PtkitConfig, UnlabeledReport};

use super::{open_output, report_skipped, success_msg};
use crate::ui::theme::ThemeMap;

pub struct UnlabeledOptions {
    pub input_file: Option<PathBuf>,
    pub corpus: PathBuf,
    pub phrase_length: usize,
    pub write: Option<PathBuf>,
    pub analyze: bool,
    pub json_stdout: bool,
    pub quiet: bool,
}

pub fn run_unlabeled(config: &PtkitConfig, opts: UnlabeledOptions, theme: &ThemeMap) -> Result<UnlabeledReport> {
    info!("Starting unlabeled selection (phrase length {}).", opts.phrase_length);
    let table_from_stdin = opts.input_file.as_deref().map_or(true, |p| p.as_os_str() == "-");
    if table_from_stdin && opts.corpus.as_os_str() == "-" {
        bail!("The phrase table and the corpus cannot both be read from stdin");
    }

    let input = open_input(opts.input_file.as_deref())?;
    let mut reader = PhraseTableReader::new(input, config.phrase_table.clone());
    let corpus = open_input(Some(opts.corpus.as_path()))
        .with_context(|| format!("Failed to open evaluation corpus: {}", opts.corpus.display()))?;

    let report = match &opts.write {
        Some(path) => {
            let mut sink = open_output(Some(path.as_path()))?;
            select_unlabeled_phrases(reader.by_ref(), corpus, opts.phrase_length, Some(&mut sink), opts.analyze)?
        }
        None => select_unlabeled_phrases(reader.by_ref(), corpus, opts.phrase_length, None::<&mut io::Sink>, opts.analyze)?,
    };
    report_skipped(reader.skipped(), opts.quiet, theme);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if opts.json_stdout {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize unlabeled report")?;
        writeln!(out, "{}", json)?;
    } else {
        writeln!(out, "{}", report)?;
    }

    if let Some(path) = &opts.write {
        if !opts.quiet {
            success_msg(
                format!("Wrote {} unlabeled phrase(s) to {}", report.unlabeled, path.display()),
                theme,
            );
        }
    }

    info!("Unlabeled selection completed.");
    Ok(report)
}

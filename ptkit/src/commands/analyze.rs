//! `ptkit analyze`: phrase-table statistics.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use ptkit_core::{analyze_records, open_input, PhraseTableReader, PhraseTableStats, PtkitConfig};

use super::{info_msg, report_skipped};
use crate::ui::stats_table::print_stats_table;
use crate::ui::theme::ThemeMap;

pub struct AnalyzeOptions {
    pub input_file: Option<PathBuf>,
    pub json_file: Option<PathBuf>,
    pub json_stdout: bool,
    pub table: bool,
    pub quiet: bool,
}

pub fn run_analyze(config: &PtkitConfig, opts: AnalyzeOptions, theme: &ThemeMap) -> Result<PhraseTableStats> {
    info!("Starting analyze operation.");
    let input = open_input(opts.input_file.as_deref())?;
    let mut reader = PhraseTableReader::new(input, config.phrase_table.clone());
    let stats = analyze_records(reader.by_ref())?;
    report_skipped(reader.skipped(), opts.quiet, theme);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if opts.json_stdout {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialize statistics")?;
        writeln!(out, "{}", json)?;
    } else {
        if opts.table {
            print_stats_table(&stats, &mut out, theme, io::stdout().is_terminal())?;
        } else {
            writeln!(out, "{}", stats)?;
        }
        if let Some(path) = &opts.json_file {
            let json = serde_json::to_string_pretty(&stats).context("Failed to serialize statistics")?;
            fs::write(path, json)
                .with_context(|| format!("Failed to write statistics to {}", path.display()))?;
            if !opts.quiet {
                info_msg(format!("Statistics written to {}", path.display()), theme);
            }
        }
    }

    info!("Analyze operation completed.");
    Ok(stats)
}

//! `ptkit filter`: predicate and top-N row filtering.

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use ptkit_core::{filter_records, open_input, CompiledFilter, FilterSummary, PhraseTableReader, PtkitConfig, TopNSelector};

use super::{info_msg, open_output, report_skipped};
use crate::ui::theme::ThemeMap;

pub struct FilterOptions {
    pub input_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub top_n: Option<usize>,
    pub top_n_feature: Option<String>,
    pub no_summary: bool,
    pub quiet: bool,
}

pub fn run_filter(config: &PtkitConfig, opts: FilterOptions, theme: &ThemeMap) -> Result<FilterSummary> {
    info!("Starting filter operation.");
    let mut filter_config = config.filter.clone();
    filter_config.set_active_rules(&opts.enable, &opts.disable);
    if opts.top_n.is_some() {
        filter_config.top_n = opts.top_n;
    }
    if let Some(feature) = opts.top_n_feature {
        filter_config.top_n_feature = feature;
    }

    let filter = CompiledFilter::from_config(&filter_config)?;
    let top_n = filter_config.top_n.map(|n| TopNSelector::new(n, filter_config.top_n_feature.clone()));

    let input = open_input(opts.input_file.as_deref())?;
    let mut reader = PhraseTableReader::new(input, config.phrase_table.clone());
    let mut writer = open_output(opts.output.as_deref())?;
    let summary = filter_records(reader.by_ref(), &filter, top_n, &mut writer, &config.phrase_table.delimiter)?;
    drop(writer);
    report_skipped(reader.skipped(), opts.quiet, theme);

    if !opts.no_summary && !opts.quiet {
        info_msg(
            format!("Read {} rows, kept {}, dropped {}.", summary.read, summary.kept, summary.dropped),
            theme,
        );
    }
    Ok(summary)
}

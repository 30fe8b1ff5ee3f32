//! The phrase-pair stream adapter around the lexical scoring core.
//!
//! `LexicalScorer` receives its lexicon at construction and holds no other
//! state, so one scorer can be shared by every worker of a rayon pool. Records
//! are scored in batches; output order always matches input order.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;

use ptkit_lexical::{score_phrase_pair, tokenize, LexiconProvider, PhraseScore, ScoreError};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::errors::PtkitError;
use crate::phrase_table::PhraseTableRecord;

/// Feature name of lex(target | source) in appended output.
pub const FORWARD_FEATURE: &str = "EgivenFLex";
/// Feature name of lex(source | target) in appended output.
pub const BACKWARD_FEATURE: &str = "FgivenELex";

/// How scored pairs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `Forward score: 0.900; Backward score: 0.700`, one line per pair.
    #[default]
    Scores,
    /// The input row with both scores appended to its feature field.
    Append,
}

/// Counts reported after a scoring run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub scored: usize,
    pub batches: usize,
}

#[derive(Debug, Clone)]
pub struct LexicalScorer<L> {
    lexicon: L,
}

impl<L: LexiconProvider> LexicalScorer<L> {
    pub fn new(lexicon: L) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &L {
        &self.lexicon
    }

    /// Tokenizes both phrases on whitespace and scores them.
    pub fn score_pair(&self, source: &str, target: &str) -> Result<PhraseScore, ScoreError> {
        score_phrase_pair(&tokenize(source), &tokenize(target), &self.lexicon)
    }

    pub fn score_record(&self, record: &PhraseTableRecord) -> Result<PhraseScore, PtkitError> {
        self.score_pair(record.source(), record.target())
            .map_err(|source| PtkitError::Scoring { line: record.line_number, source })
    }
}

impl<L: LexiconProvider + Sync> LexicalScorer<L> {
    /// Scores a batch in parallel on the current rayon pool.
    pub fn score_batch(&self, records: &[PhraseTableRecord]) -> Vec<Result<PhraseScore, PtkitError>> {
        records.par_iter().map(|r| self.score_record(r)).collect()
    }

    /// Reads records, scores them batch by batch and writes one output line per
    /// record. Stops at the first read or scoring error.
    pub fn score_stream<I, W>(
        &self,
        records: I,
        writer: &mut W,
        format: OutputFormat,
        batch_size: usize,
        delimiter: &str,
    ) -> Result<ScoreSummary>
    where
        I: IntoIterator<Item = Result<PhraseTableRecord, PtkitError>>,
        W: Write,
    {
        let batch_size = if batch_size == 0 { DEFAULT_BATCH_SIZE } else { batch_size };
        let mut summary = ScoreSummary::default();
        let mut batch = Vec::with_capacity(batch_size);

        for record in records {
            batch.push(record.context("Failed to read phrase-table record")?);
            if batch.len() == batch_size {
                self.flush_batch(&mut batch, writer, format, delimiter, &mut summary)?;
            }
        }
        if !batch.is_empty() {
            self.flush_batch(&mut batch, writer, format, delimiter, &mut summary)?;
        }
        writer.flush().context("Failed to flush score output")?;

        info!("Scored {} phrase pairs in {} batches.", summary.scored, summary.batches);
        Ok(summary)
    }

    fn flush_batch<W: Write>(
        &self,
        batch: &mut Vec<PhraseTableRecord>,
        writer: &mut W,
        format: OutputFormat,
        delimiter: &str,
        summary: &mut ScoreSummary,
    ) -> Result<()> {
        debug!("Scoring batch of {} records.", batch.len());
        let scores = self.score_batch(batch);

        for (record, score) in batch.drain(..).zip(scores) {
            let score = score?;
            write_scored(writer, record, score, format, delimiter)?;
            summary.scored += 1;
        }
        summary.batches += 1;
        Ok(())
    }
}

/// Renders one scored record in the requested format.
pub fn write_scored<W: Write>(
    writer: &mut W,
    mut record: PhraseTableRecord,
    score: PhraseScore,
    format: OutputFormat,
    delimiter: &str,
) -> Result<()> {
    match format {
        OutputFormat::Scores => writeln!(writer, "{}", score),
        OutputFormat::Append => {
            record.append_features(&[(FORWARD_FEATURE, score.forward), (BACKWARD_FEATURE, score.backward)]);
            writeln!(writer, "{}", record.to_line(delimiter))
        }
    }
    .context("Failed to write score output")
}

/// Builds the worker pool for batch scoring. `0` threads lets rayon decide.
pub fn build_thread_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build scoring thread pool")
}

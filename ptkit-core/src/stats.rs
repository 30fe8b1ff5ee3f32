//! Phrase-table statistics.
//!
//! One pass over the table collects the pair count, distinct phrases on each
//! side, the word vocabularies and the longest phrases.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::errors::PtkitError;
use crate::phrase_table::PhraseTableRecord;

/// The pair holding the longest target phrase seen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestPair {
    pub source: String,
    pub target: String,
    pub target_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhraseTableStats {
    pub phrase_pairs: usize,
    pub source_phrases: usize,
    pub target_phrases: usize,
    pub source_vocabulary: usize,
    pub target_vocabulary: usize,
    pub longest_source_phrase: usize,
    pub longest_target_phrase: usize,
    pub longest_target_pair: Option<LongestPair>,
}

impl fmt::Display for PhraseTableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of phrase pairs: {}", self.phrase_pairs)?;
        writeln!(f, "Number of source side phrases: {}", self.source_phrases)?;
        writeln!(f, "Number of target side phrases: {}", self.target_phrases)?;
        writeln!(f, "Source vocabulary size: {}", self.source_vocabulary)?;
        writeln!(f, "Target vocabulary size: {}", self.target_vocabulary)?;
        writeln!(f, "Longest source phrase: {}", self.longest_source_phrase)?;
        write!(f, "Longest target phrase: {}", self.longest_target_phrase)?;
        if let Some(pair) = &self.longest_target_pair {
            write!(f, "\nPhrase pair: {} ||| {}", pair.source, pair.target)?;
        }
        Ok(())
    }
}

/// Accumulates [`PhraseTableStats`] one record at a time.
#[derive(Debug, Default)]
pub struct StatsCollector {
    phrase_pairs: usize,
    source_phrases: HashSet<String>,
    target_phrases: HashSet<String>,
    source_vocabulary: HashSet<String>,
    target_vocabulary: HashSet<String>,
    longest_source_phrase: usize,
    longest_target_pair: Option<LongestPair>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &PhraseTableRecord) {
        self.phrase_pairs += 1;

        let source_words = record.source_words();
        let target_words = record.target_words();

        self.longest_source_phrase = self.longest_source_phrase.max(source_words.len());
        let longest_target = self.longest_target_pair.as_ref().map_or(0, |p| p.target_length);
        if target_words.len() > longest_target {
            self.longest_target_pair = Some(LongestPair {
                source: record.source().to_string(),
                target: record.target().to_string(),
                target_length: target_words.len(),
            });
        }

        for word in source_words {
            if !self.source_vocabulary.contains(word) {
                self.source_vocabulary.insert(word.to_string());
            }
        }
        for word in target_words {
            if !self.target_vocabulary.contains(word) {
                self.target_vocabulary.insert(word.to_string());
            }
        }

        if !self.source_phrases.contains(record.source()) {
            self.source_phrases.insert(record.source().to_string());
        }
        if !self.target_phrases.contains(record.target()) {
            self.target_phrases.insert(record.target().to_string());
        }
    }

    pub fn finish(self) -> PhraseTableStats {
        PhraseTableStats {
            phrase_pairs: self.phrase_pairs,
            source_phrases: self.source_phrases.len(),
            target_phrases: self.target_phrases.len(),
            source_vocabulary: self.source_vocabulary.len(),
            target_vocabulary: self.target_vocabulary.len(),
            longest_source_phrase: self.longest_source_phrase,
            longest_target_phrase: self.longest_target_pair.as_ref().map_or(0, |p| p.target_length),
            longest_target_pair: self.longest_target_pair,
        }
    }
}

/// Collects statistics over a whole record stream.
pub fn analyze_records<I>(records: I) -> Result<PhraseTableStats>
where
    I: IntoIterator<Item = Result<PhraseTableRecord, PtkitError>>,
{
    let mut collector = StatsCollector::new();
    for record in records {
        let record = record.context("Failed to read phrase-table record")?;
        collector.observe(&record);
    }
    Ok(collector.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhraseTableConfig;
    use crate::phrase_table::PhraseTableReader;
    use std::io::Cursor;

    const TABLE: &str = "\
le chat ||| the cat ||| 0.5
le chat ||| the cat here ||| 0.2
le ||| the ||| 0.9
chien ||| the dog ||| 0.9
";

    #[test]
    fn test_counts() {
        let reader = PhraseTableReader::new(Cursor::new(TABLE), PhraseTableConfig::default());
        let stats = analyze_records(reader).unwrap();
        assert_eq!(stats.phrase_pairs, 4);
        assert_eq!(stats.source_phrases, 3);
        assert_eq!(stats.target_phrases, 4);
        assert_eq!(stats.source_vocabulary, 3);
        assert_eq!(stats.target_vocabulary, 4);
        assert_eq!(stats.longest_source_phrase, 2);
        assert_eq!(stats.longest_target_phrase, 3);
        let pair = stats.longest_target_pair.as_ref().unwrap();
        assert_eq!(pair.target, "the cat here");
    }

    #[test]
    fn test_display_lines() {
        let reader = PhraseTableReader::new(Cursor::new(TABLE), PhraseTableConfig::default());
        let text = analyze_records(reader).unwrap().to_string();
        assert!(text.contains("Number of phrase pairs: 4"));
        assert!(text.contains("Number of source side phrases: 3"));
        assert!(text.contains("Longest target phrase: 3"));
        assert!(text.contains("Phrase pair: le chat ||| the cat here"));
    }

    #[test]
    fn test_empty_table() {
        let stats = StatsCollector::new().finish();
        assert_eq!(stats, PhraseTableStats::default());
    }
}

//! Selection of unlabeled source phrases.
//!
//! An evaluation corpus is cut into n-grams of one fixed length; every n-gram
//! that the phrase table has no row for is "unlabeled". The selection can be
//! written out one phrase per line and broken down by how many of its words
//! the table's source side already knows.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{BufRead, Write};

use crate::errors::PtkitError;
use crate::phrase_table::PhraseTableRecord;

/// Source phrases of a phrase table, optionally restricted to one length.
///
/// The vocabulary holds the words of the kept phrases only, so with a length
/// restriction a word that appears solely in longer phrases stays unknown.
#[derive(Debug, Default)]
pub struct SourcePhraseIndex {
    phrase_length: Option<usize>,
    rows: usize,
    matching_rows: usize,
    phrases: HashSet<String>,
    vocabulary: HashSet<String>,
}

impl SourcePhraseIndex {
    /// An empty index. `Some(n)` keeps only source phrases of `n` words.
    pub fn new(phrase_length: Option<usize>) -> Result<Self, PtkitError> {
        if phrase_length == Some(0) {
            return Err(PtkitError::Config("phrase length must be at least 1".to_string()));
        }
        Ok(Self { phrase_length, ..Self::default() })
    }

    pub fn observe(&mut self, record: &PhraseTableRecord) {
        self.rows += 1;
        let words = record.source_words();
        if self.phrase_length.is_some_and(|n| n != words.len()) {
            return;
        }
        self.matching_rows += 1;

        for word in &words {
            if !self.vocabulary.contains(*word) {
                self.vocabulary.insert(word.to_string());
            }
        }
        let phrase = words.join(" ");
        if !self.phrases.contains(&phrase) {
            self.phrases.insert(phrase);
        }
    }

    pub fn contains_phrase(&self, phrase: &str) -> bool {
        self.phrases.contains(phrase)
    }

    pub fn knows_word(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    /// Rows read from the table, whatever their length.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Rows whose source phrase has the requested length.
    pub fn matching_rows(&self) -> usize {
        self.matching_rows
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Builds a [`SourcePhraseIndex`] over a whole record stream.
pub fn load_source_phrases<I>(records: I, phrase_length: Option<usize>) -> Result<SourcePhraseIndex>
where
    I: IntoIterator<Item = Result<PhraseTableRecord, PtkitError>>,
{
    let mut index = SourcePhraseIndex::new(phrase_length)?;
    for record in records {
        let record = record.context("Failed to read phrase-table record")?;
        index.observe(&record);
    }
    debug!(
        "Indexed {} source phrases ({} of {} rows matched the phrase length).",
        index.phrase_count(),
        index.matching_rows(),
        index.rows()
    );
    Ok(index)
}

/// All `n`-word windows of a whitespace-tokenized line, joined by single spaces.
pub fn extract_ngrams(line: &str, n: usize) -> Vec<String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if n == 0 || n > words.len() {
        return Vec::new();
    }
    words.windows(n).map(|window| window.join(" ")).collect()
}

/// Counts every `n`-gram of a corpus, one sentence per line.
///
/// Keys are kept sorted so every later listing is deterministic.
pub fn count_corpus_ngrams<R: BufRead>(reader: R, n: usize) -> Result<BTreeMap<String, usize>> {
    if n == 0 {
        return Err(PtkitError::Config("phrase length must be at least 1".to_string()).into());
    }
    let mut counts = BTreeMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read corpus line {}", idx + 1))?;
        for ngram in extract_ngrams(&line, n) {
            *counts.entry(ngram).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// A corpus n-gram with no row in the phrase table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlabeledPhrase {
    pub phrase: String,
    /// Occurrences in the corpus.
    pub count: usize,
}

/// Corpus n-grams missing from `index`, in sorted order.
pub fn select_unlabeled(index: &SourcePhraseIndex, ngram_counts: &BTreeMap<String, usize>) -> Vec<UnlabeledPhrase> {
    ngram_counts
        .iter()
        .filter(|(ngram, _)| !index.contains_phrase(ngram))
        .map(|(ngram, &count)| UnlabeledPhrase { phrase: ngram.clone(), count })
        .collect()
}

/// Writes one unlabeled phrase per line.
pub fn write_unlabeled<W: Write>(phrases: &[UnlabeledPhrase], writer: &mut W) -> Result<()> {
    for phrase in phrases {
        writeln!(writer, "{}", phrase.phrase).context("Failed to write unlabeled phrase")?;
    }
    writer.flush().context("Failed to flush unlabeled phrases")?;
    Ok(())
}

/// Unlabeled phrases split by how many of their words the table knows.
///
/// Token counts sum the corpus occurrences of the phrases in each class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnlabeledAnalysis {
    pub all_known: usize,
    pub all_known_tokens: usize,
    pub some_known: usize,
    pub some_known_tokens: usize,
    pub none_known: usize,
    pub none_known_tokens: usize,
}

impl fmt::Display for UnlabeledAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "All unigrams known: {} phrases ({} tokens)",
            self.all_known, self.all_known_tokens
        )?;
        writeln!(
            f,
            "Some unigrams unknown: {} phrases ({} tokens)",
            self.some_known, self.some_known_tokens
        )?;
        write!(
            f,
            "All unigrams unknown: {} phrases ({} tokens)",
            self.none_known, self.none_known_tokens
        )
    }
}

pub fn analyze_unlabeled(index: &SourcePhraseIndex, phrases: &[UnlabeledPhrase]) -> UnlabeledAnalysis {
    let mut analysis = UnlabeledAnalysis::default();
    for phrase in phrases {
        let (known, total) = phrase
            .phrase
            .split_whitespace()
            .fold((0, 0), |(known, total), word| (known + usize::from(index.knows_word(word)), total + 1));
        if known == total {
            analysis.all_known += 1;
            analysis.all_known_tokens += phrase.count;
        } else if known == 0 {
            analysis.none_known += 1;
            analysis.none_known_tokens += phrase.count;
        } else {
            analysis.some_known += 1;
            analysis.some_known_tokens += phrase.count;
        }
    }
    analysis
}

/// Outcome of one unlabeled-phrase selection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlabeledReport {
    pub phrase_length: usize,
    pub table_rows: usize,
    pub matching_rows: usize,
    pub source_phrases: usize,
    pub source_vocabulary: usize,
    /// Distinct n-grams in the corpus.
    pub corpus_ngrams: usize,
    /// Distinct n-grams with no table row.
    pub unlabeled: usize,
    pub analysis: Option<UnlabeledAnalysis>,
}

impl fmt::Display for UnlabeledReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of phrases in phrase table: {}", self.table_rows)?;
        writeln!(
            f,
            "Number of phrases with desired phrase length {}: {}",
            self.phrase_length, self.matching_rows
        )?;
        writeln!(f, "Source vocabulary size: {}", self.source_vocabulary)?;
        writeln!(
            f,
            "Number of {}-grams in evaluation corpus: {}",
            self.phrase_length, self.corpus_ngrams
        )?;
        write!(
            f,
            "Number of unlabeled {}-grams in evaluation corpus: {}",
            self.phrase_length, self.unlabeled
        )?;
        if let Some(analysis) = &self.analysis {
            write!(f, "\n{}", analysis)?;
        }
        Ok(())
    }
}

/// Runs the whole selection: index the table's source phrases of length
/// `phrase_length`, count the corpus n-grams of that length, write the missing
/// ones to `output` when given, and optionally analyze them.
pub fn select_unlabeled_phrases<I, R, W>(
    records: I,
    corpus: R,
    phrase_length: usize,
    output: Option<&mut W>,
    analyze: bool,
) -> Result<UnlabeledReport>
where
    I: IntoIterator<Item = Result<PhraseTableRecord, PtkitError>>,
    R: BufRead,
    W: Write,
{
    let index = load_source_phrases(records, Some(phrase_length))?;
    let ngram_counts = count_corpus_ngrams(corpus, phrase_length)?;
    let unlabeled = select_unlabeled(&index, &ngram_counts);

    if let Some(writer) = output {
        write_unlabeled(&unlabeled, writer)?;
    }
    let analysis = analyze.then(|| analyze_unlabeled(&index, &unlabeled));

    info!(
        "Selected {} unlabeled {}-grams out of {} in the corpus.",
        unlabeled.len(),
        phrase_length,
        ngram_counts.len()
    );
    Ok(UnlabeledReport {
        phrase_length,
        table_rows: index.rows(),
        matching_rows: index.matching_rows(),
        source_phrases: index.phrase_count(),
        source_vocabulary: index.vocabulary_size(),
        corpus_ngrams: ngram_counts.len(),
        unlabeled: unlabeled.len(),
        analysis,
    })
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
chat noir ||| black cat ||| 0.7
grand chien ||| big dog ||| 0.6
";

    fn records(input: &str) -> PhraseTableReader<Cursor<&str>> {
        PhraseTableReader::new(Cursor::new(input), PhraseTableConfig::default())
    }

    #[test]
    fn test_extract_ngrams() {
        assert_eq!(extract_ngrams("  le  chat noir ", 2), vec!["le chat", "chat noir"]);
        assert_eq!(extract_ngrams("le chat", 2), vec!["le chat"]);
        assert!(extract_ngrams("le", 2).is_empty());
        assert!(extract_ngrams("", 1).is_empty());
    }

    #[test]
    fn test_phrase_length_restricts_index() {
        let index = load_source_phrases(records(TABLE), Some(2)).unwrap();
        assert_eq!(index.rows(), 5);
        assert_eq!(index.matching_rows(), 4);
        assert_eq!(index.phrase_count(), 3);
        assert!(index.contains_phrase("le chat"));
        assert!(!index.contains_phrase("le"));
        assert!(index.knows_word("noir"));

        let unrestricted = load_source_phrases(records(TABLE), None).unwrap();
        assert_eq!(unrestricted.matching_rows(), 5);
        assert!(unrestricted.contains_phrase("le"));
    }

    #[test]
    fn test_zero_phrase_length_is_rejected() {
        assert!(matches!(SourcePhraseIndex::new(Some(0)), Err(PtkitError::Config(_))));
        assert!(count_corpus_ngrams(Cursor::new("a b"), 0).is_err());
    }

    #[test]
    fn test_select_unlabeled_sorted_with_counts() {
        let index = load_source_phrases(records(TABLE), Some(2)).unwrap();
        let counts = count_corpus_ngrams(Cursor::new("le chat noir dort\nle chat dort\n"), 2).unwrap();
        assert_eq!(counts.len(), 4);
        assert_eq!(counts["le chat"], 2);

        let unlabeled = select_unlabeled(&index, &counts);
        assert_eq!(
            unlabeled,
            vec![
                UnlabeledPhrase { phrase: "chat dort".to_string(), count: 1 },
                UnlabeledPhrase { phrase: "noir dort".to_string(), count: 1 },
            ]
        );

        let mut out = Vec::new();
        write_unlabeled(&unlabeled, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "chat dort\nnoir dort\n");
    }

    #[test]
    fn test_analyze_unlabeled_classes() {
        let index = load_source_phrases(records(TABLE), Some(2)).unwrap();
        let phrases = vec![
            UnlabeledPhrase { phrase: "chat le".to_string(), count: 3 },
            UnlabeledPhrase { phrase: "chien noir".to_string(), count: 2 },
            UnlabeledPhrase { phrase: "chat dort".to_string(), count: 1 },
            UnlabeledPhrase { phrase: "il dort".to_string(), count: 4 },
        ];
        let analysis = analyze_unlabeled(&index, &phrases);
        assert_eq!(
            analysis,
            UnlabeledAnalysis {
                all_known: 2,
                all_known_tokens: 5,
                some_known: 1,
                some_known_tokens: 1,
                none_known: 1,
                none_known_tokens: 4,
            }
        );
    }

    #[test]
    fn test_select_unlabeled_phrases_report() {
        let corpus = Cursor::new("le chat noir\nun grand chien\n");
        let mut out = Vec::new();
        let report = select_unlabeled_phrases(records(TABLE), corpus, 2, Some(&mut out), true).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "un grand\n");
        assert_eq!(report.corpus_ngrams, 4);
        assert_eq!(report.unlabeled, 1);
        assert_eq!(report.matching_rows, 4);
        let analysis = report.analysis.unwrap();
        assert_eq!(analysis.some_known, 1);
        assert_eq!(analysis.some_known_tokens, 1);

        let text = report.to_string();
        assert!(text.contains("Number of phrases with desired phrase length 2: 4"));
        assert!(text.contains("Number of unlabeled 2-grams in evaluation corpus: 1"));
        assert!(text.contains("Some unigrams unknown: 1 phrases (1 tokens)"));
    }

    #[test]
    fn test_report_without_output_or_analysis() {
        let report =
            select_unlabeled_phrases(records(TABLE), Cursor::new("le chat\n"), 2, None::<&mut Vec<u8>>, false).unwrap();
        assert_eq!(report.unlabeled, 0);
        assert_eq!(report.analysis, None);
        assert!(!report.to_string().contains("unigrams"));
    }
}

//! Phrase-table records and the line-oriented reader that produces them.
//!
//! A row is a `" ||| "`-separated record: source phrase, target phrase, then
//! format-dependent fields (feature scores, word alignment, counts). The
//! reader validates rows before anything downstream sees them, so the scorer
//! can assume non-empty phrases.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::config::{MalformedPolicy, PhraseTableConfig};
use crate::errors::PtkitError;
use crate::features::FeatureSet;

const READ_BUFFER_CAPACITY: usize = 1 << 20;

/// One parsed phrase-table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTableRecord {
    /// 1-based line number in the input.
    pub line_number: usize,
    fields: Vec<String>,
    feature_field: usize,
    alignment_field: usize,
}

impl PhraseTableRecord {
    pub fn source(&self) -> &str {
        &self.fields[0]
    }

    pub fn target(&self) -> &str {
        &self.fields[1]
    }

    pub fn source_words(&self) -> Vec<&str> {
        self.source().split_whitespace().collect()
    }

    pub fn target_words(&self) -> Vec<&str> {
        self.target().split_whitespace().collect()
    }

    /// The raw feature field, if the row has one.
    pub fn features(&self) -> Option<&str> {
        self.fields.get(self.feature_field).map(String::as_str)
    }

    pub fn alignment(&self) -> Option<&str> {
        self.fields.get(self.alignment_field).map(String::as_str)
    }

    pub fn feature_set(&self) -> Result<FeatureSet, PtkitError> {
        match self.features() {
            Some(field) => FeatureSet::parse(field),
            None => Ok(FeatureSet::default()),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Appends `key=value` pairs to the feature field, creating it (and any
    /// empty fields before it) when the row is shorter.
    pub fn append_features(&mut self, extra: &[(&str, f64)]) {
        if extra.is_empty() {
            return;
        }
        while self.fields.len() <= self.feature_field {
            self.fields.push(String::new());
        }
        let field = &mut self.fields[self.feature_field];
        for (name, value) in extra {
            if !field.is_empty() {
                field.push(' ');
            }
            field.push_str(&format!("{}={}", name, format_score(*value)));
        }
    }

    /// Serializes the row back into a single line without a trailing newline.
    pub fn to_line(&self, delimiter: &str) -> String {
        self.fields.join(delimiter)
    }
}

/// Shortest round-trip form, switching to exponent notation outside
/// `[1e-4, 1e15)` so floored scores stay short.
fn format_score(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || !value.is_finite() || (1e-4..1e15).contains(&magnitude) {
        format!("{}", value)
    } else {
        format!("{:e}", value)
    }
}

/// Parses one phrase-table line.
pub fn parse_record(
    line: &str,
    line_number: usize,
    config: &PhraseTableConfig,
) -> Result<PhraseTableRecord, PtkitError> {
    let line = line.trim();
    let fields: Vec<String> = line.split(config.delimiter.as_str()).map(str::to_string).collect();

    if fields.len() < 2 {
        return Err(PtkitError::MalformedRecord {
            line: line_number,
            reason: format!("missing field separator '{}'", config.delimiter),
        });
    }
    if fields[0].trim().is_empty() {
        return Err(PtkitError::MalformedRecord { line: line_number, reason: "empty source phrase".to_string() });
    }
    if fields[1].trim().is_empty() {
        return Err(PtkitError::MalformedRecord { line: line_number, reason: "empty target phrase".to_string() });
    }
    if let Some(features) = fields.get(config.feature_field) {
        FeatureSet::parse(features)
            .map_err(|e| PtkitError::MalformedRecord { line: line_number, reason: e.to_string() })?;
    }

    Ok(PhraseTableRecord {
        line_number,
        fields,
        feature_field: config.feature_field,
        alignment_field: config.alignment_field,
    })
}

/// Streams validated records out of any buffered reader.
///
/// Lines are read as raw bytes; a line that is not valid UTF-8 is malformed
/// like any other and goes through [`MalformedPolicy`]. Only genuine I/O
/// failures end the stream with an error.
pub struct PhraseTableReader<R> {
    reader: R,
    buf: Vec<u8>,
    config: PhraseTableConfig,
    line_number: usize,
    skipped: usize,
}

impl<R: BufRead> PhraseTableReader<R> {
    pub fn new(reader: R, config: PhraseTableConfig) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            config,
            line_number: 0,
            skipped: 0,
        }
    }

    /// Number of malformed lines dropped so far under [`MalformedPolicy::Skip`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn config(&self) -> &PhraseTableConfig {
        &self.config
    }
}

impl<R: BufRead> Iterator for PhraseTableReader<R> {
    type Item = Result<PhraseTableRecord, PtkitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(PtkitError::IoError(e))),
            }
            self.line_number += 1;

            let parsed = match std::str::from_utf8(&self.buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => parse_record(line, self.line_number, &self.config),
                Err(e) => Err(PtkitError::MalformedRecord {
                    line: self.line_number,
                    reason: format!("invalid UTF-8: {}", e),
                }),
            };

            match parsed {
                Ok(record) => return Some(Ok(record)),
                Err(e) => match self.config.on_malformed {
                    MalformedPolicy::Skip => {
                        warn!("Skipping line {}: {}", self.line_number, e);
                        self.skipped += 1;
                    }
                    MalformedPolicy::Fail => return Some(Err(e)),
                },
            }
        }
    }
}

/// Opens a phrase table for reading. `None` or `-` reads stdin; a `.gz`
/// suffix is decompressed on the fly.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>> {
    match path {
        None => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(p) if p.as_os_str() == "-" => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(p) => {
            let file = File::open(p)
                .with_context(|| format!("Failed to open phrase table {}", p.display()))?;
            if p.extension().is_some_and(|ext| ext == "gz") {
                debug!("Reading gzip-compressed input from {}", p.display());
                Ok(Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, MultiGzDecoder::new(file))))
            } else {
                Ok(Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, file)))
            }
        }
    }
}

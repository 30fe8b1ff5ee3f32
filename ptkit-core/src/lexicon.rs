//! The in-memory bilingual lexicon and its on-disk formats.
//!
//! The lexicon is built once at startup and only read afterwards, so it can be
//! shared across scoring threads without locking.
//!
//! Two formats are supported:
//!
//! * **text**: one entry per line, `source target p(t|s) p(s|t)`, whitespace
//!   separated. Blank lines and lines starting with `#` are ignored. The
//!   configured null token on either side denotes the NULL word.
//! * **binary**: the 4-byte magic `PTLX`, a version byte, then the table
//!   encoded with `bincode`. Produced by `compile-lexicon`.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use bincode::config::{self, Fixint, LittleEndian};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use ptkit_lexical::{Direction, LexiconProvider, Token};

use crate::errors::PtkitError;

pub const MAGIC: &[u8; 4] = b"PTLX";
pub const VERSION: u8 = 1;

/// Shared bincode settings for the binary lexicon.
pub const fn bincode_config() -> config::Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

/// Both conditional probabilities of one word pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LexicalEntry {
    pub target_given_source: f64,
    pub source_given_target: f64,
}

impl LexicalEntry {
    pub fn new(target_given_source: f64, source_given_target: f64) -> Self {
        Self { target_given_source, source_given_target }
    }

    pub fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::TargetGivenSource => self.target_given_source,
            Direction::SourceGivenTarget => self.source_given_target,
        }
    }
}

/// Word-to-word translation table in both directions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilingualLexicon {
    /// source word -> target word -> entry
    pairs: HashMap<String, HashMap<String, LexicalEntry>>,
    /// Target words aligned to a NULL source.
    null_source: HashMap<String, LexicalEntry>,
    /// Source words aligned to a NULL target.
    null_target: HashMap<String, LexicalEntry>,
}

impl BilingualLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous one.
    pub fn insert(
        &mut self,
        source: Token<'_>,
        target: Token<'_>,
        entry: LexicalEntry,
    ) -> Result<Option<LexicalEntry>, PtkitError> {
        let previous = match (source, target) {
            (Token::Word(s), Token::Word(t)) => self
                .pairs
                .entry(s.to_string())
                .or_default()
                .insert(t.to_string(), entry),
            (Token::Null, Token::Word(t)) => self.null_source.insert(t.to_string(), entry),
            (Token::Word(s), Token::Null) => self.null_target.insert(s.to_string(), entry),
            (Token::Null, Token::Null) => {
                return Err(PtkitError::Fatal("the NULL word cannot be aligned to NULL".to_string()));
            }
        };
        Ok(previous)
    }

    pub fn get(&self, source: Token<'_>, target: Token<'_>) -> Option<&LexicalEntry> {
        match (source, target) {
            (Token::Word(s), Token::Word(t)) => self.pairs.get(s).and_then(|row| row.get(t)),
            (Token::Null, Token::Word(t)) => self.null_source.get(t),
            (Token::Word(s), Token::Null) => self.null_target.get(s),
            (Token::Null, Token::Null) => None,
        }
    }

    /// Total number of entries, NULL rows included.
    pub fn len(&self) -> usize {
        self.pairs.values().map(HashMap::len).sum::<usize>() + self.null_source.len() + self.null_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses the text format.
    pub fn from_text_reader<R: BufRead>(reader: R, null_token: &str) -> Result<Self, PtkitError> {
        let mut lexicon = Self::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let columns: Vec<&str> = trimmed.split_whitespace().collect();
            let &[source, target, tgs, sgt] = columns.as_slice() else {
                return Err(PtkitError::LexiconFormat {
                    line: line_number,
                    reason: format!("expected 4 columns, found {}", columns.len()),
                });
            };

            let entry = LexicalEntry::new(
                parse_probability(tgs, line_number)?,
                parse_probability(sgt, line_number)?,
            );
            let (source, target) = (to_token(source, null_token), to_token(target, null_token));
            if source.is_null() && target.is_null() {
                return Err(PtkitError::LexiconFormat {
                    line: line_number,
                    reason: "both sides are the NULL word".to_string(),
                });
            }
            lexicon.insert(source, target, entry)?;
        }

        debug!("Parsed {} lexicon entries from text.", lexicon.len());
        Ok(lexicon)
    }

    /// Reads the binary format, header included.
    pub fn from_binary_reader<R: Read>(mut reader: R) -> Result<Self, PtkitError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_binary_slice(&bytes)
    }

    /// Decodes a whole binary model held in memory.
    ///
    /// Strings are decoded as borrows of `bytes`, so every length prefix is
    /// checked against the bytes actually present before anything is
    /// allocated. A corrupt or truncated model is an error, never an abort.
    pub fn from_binary_slice(bytes: &[u8]) -> Result<Self, PtkitError> {
        let Some((header, body)) = bytes.split_first_chunk::<5>() else {
            return Err(PtkitError::Fatal("binary lexicon is truncated (no header)".to_string()));
        };
        if &header[..4] != MAGIC {
            return Err(PtkitError::Fatal("not a binary ptkit lexicon (bad magic)".to_string()));
        }
        if header[4] != VERSION {
            return Err(PtkitError::UnsupportedLexiconVersion(header[4]));
        }

        let (borrowed, read): (BorrowedLexicon<'_>, usize) =
            bincode::serde::borrow_decode_from_slice(body, bincode_config())?;
        if read != body.len() {
            return Err(PtkitError::Fatal(format!(
                "binary lexicon has {} trailing bytes",
                body.len() - read
            )));
        }
        Ok(borrowed.into_owned())
    }

    /// Writes the binary format, header included.
    pub fn write_binary<W: Write>(&self, mut writer: W) -> Result<(), PtkitError> {
        writer.write_all(MAGIC)?;
        writer.write_all(&[VERSION])?;
        bincode::serde::encode_into_std_write(self, &mut writer, bincode_config())?;
        writer.flush()?;
        Ok(())
    }

    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create lexicon file {}", path.display()))?;
        self.write_binary(BufWriter::new(file))
            .with_context(|| format!("Failed to write lexicon file {}", path.display()))?;
        info!("Wrote {} lexicon entries to {}.", self.len(), path.display());
        Ok(())
    }

    /// Loads a lexicon model, detecting the format by its magic bytes.
    ///
    /// A missing or unreadable model is fatal for every caller, so the error
    /// carries the path.
    pub fn load<P: AsRef<Path>>(path: P, null_token: &str) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading lexicon model from: {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open lexicon model {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let is_binary = reader
            .fill_buf()
            .with_context(|| format!("Failed to read lexicon model {}", path.display()))?
            .starts_with(MAGIC);

        let lexicon = if is_binary {
            debug!("Detected binary lexicon format.");
            Self::from_binary_reader(reader)
        } else {
            debug!("Detected text lexicon format.");
            Self::from_text_reader(reader, null_token)
        }
        .with_context(|| format!("Failed to load lexicon model {}", path.display()))?;

        info!("Loaded {} lexicon entries.", lexicon.len());
        Ok(lexicon)
    }
}

/// Zero-copy view of the binary layout. Field order matches [`BilingualLexicon`].
#[derive(Deserialize)]
struct BorrowedLexicon<'a> {
    #[serde(borrow)]
    pairs: HashMap<&'a str, HashMap<&'a str, LexicalEntry>>,
    #[serde(borrow)]
    null_source: HashMap<&'a str, LexicalEntry>,
    #[serde(borrow)]
    null_target: HashMap<&'a str, LexicalEntry>,
}

impl BorrowedLexicon<'_> {
    fn into_owned(self) -> BilingualLexicon {
        fn owned(map: HashMap<&str, LexicalEntry>) -> HashMap<String, LexicalEntry> {
            map.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
        }

        BilingualLexicon {
            pairs: self.pairs.into_iter().map(|(k, row)| (k.to_string(), owned(row))).collect(),
            null_source: owned(self.null_source),
            null_target: owned(self.null_target),
        }
    }
}

impl LexiconProvider for BilingualLexicon {
    fn score(&self, source: Token<'_>, target: Token<'_>, direction: Direction) -> f64 {
        self.get(source, target).map_or(0.0, |entry| entry.get(direction))
    }
}

fn to_token<'a>(word: &'a str, null_token: &str) -> Token<'a> {
    if word == null_token {
        Token::Null
    } else {
        Token::Word(word)
    }
}

fn parse_probability(value: &str, line: usize) -> Result<f64, PtkitError> {
    let p: f64 = value.parse().map_err(|_| PtkitError::LexiconFormat {
        line,
        reason: format!("'{}' is not a number", value),
    })?;
    if !(0.0..=1.0).contains(&p) {
        return Err(PtkitError::LexiconFormat {
            line,
            reason: format!("probability {} is outside [0, 1]", p),
        });
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TEXT: &str = "\
# source target p(t|s) p(s|t)
le the 0.9 0.7
NULL the 0.1 0.0
le NULL 0.0 0.2
chat cat 1.0 1.0
";

    #[test]
    fn test_text_parsing_and_lookup() {
        let lex = BilingualLexicon::from_text_reader(Cursor::new(TEXT), "NULL").unwrap();
        assert_eq!(lex.len(), 4);
        assert_eq!(lex.score(Token::Word("le"), Token::Word("the"), Direction::TargetGivenSource), 0.9);
        assert_eq!(lex.score(Token::Word("le"), Token::Word("the"), Direction::SourceGivenTarget), 0.7);
        assert_eq!(lex.score(Token::Null, Token::Word("the"), Direction::TargetGivenSource), 0.1);
        assert_eq!(lex.score(Token::Word("le"), Token::Null, Direction::SourceGivenTarget), 0.2);
        assert_eq!(lex.score(Token::Word("zebra"), Token::Word("the"), Direction::TargetGivenSource), 0.0);
    }

    #[test]
    fn test_literal_null_word_is_not_the_sentinel() {
        let lex = BilingualLexicon::from_text_reader(Cursor::new(TEXT), "NULL").unwrap();
        assert_eq!(lex.score(Token::Word("NULL"), Token::Word("the"), Direction::TargetGivenSource), 0.0);
    }

    #[test]
    fn test_custom_null_token() {
        let text = "__NULL__ the 0.3 0.0\n";
        let lex = BilingualLexicon::from_text_reader(Cursor::new(text), "__NULL__").unwrap();
        assert_eq!(lex.score(Token::Null, Token::Word("the"), Direction::TargetGivenSource), 0.3);
    }

    #[test]
    fn test_text_errors_carry_line_numbers() {
        let err = BilingualLexicon::from_text_reader(Cursor::new("le the 0.9\n"), "NULL").unwrap_err();
        assert!(matches!(err, PtkitError::LexiconFormat { line: 1, .. }));

        let err = BilingualLexicon::from_text_reader(Cursor::new("\nle the 1.5 0.1\n"), "NULL").unwrap_err();
        assert!(matches!(err, PtkitError::LexiconFormat { line: 2, .. }));

        let err = BilingualLexicon::from_text_reader(Cursor::new("NULL NULL 0.5 0.5\n"), "NULL").unwrap_err();
        assert!(matches!(err, PtkitError::LexiconFormat { line: 1, .. }));
    }

    #[test]
    fn test_binary_header_is_checked() {
        let lex = BilingualLexicon::from_text_reader(Cursor::new(TEXT), "NULL").unwrap();
        let mut buf = Vec::new();
        lex.write_binary(&mut buf).unwrap();
        assert!(buf.starts_with(MAGIC));

        buf[4] = 9;
        let err = BilingualLexicon::from_binary_reader(Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, PtkitError::UnsupportedLexiconVersion(9)));
    }

    #[test]
    fn test_binary_round_trip_through_reader() {
        let lex = BilingualLexicon::from_text_reader(Cursor::new(TEXT), "NULL").unwrap();
        let mut buf = Vec::new();
        lex.write_binary(&mut buf).unwrap();
        let decoded = BilingualLexicon::from_binary_reader(Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, lex);
    }

    #[test]
    fn test_huge_length_prefix_is_an_error() {
        // One source row whose key claims 2^62 bytes.
        let mut buf = Vec::from(&MAGIC[..]);
        buf.push(VERSION);
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&(1u64 << 62).to_le_bytes());
        buf.extend_from_slice(b"le");

        let err = BilingualLexicon::from_binary_slice(&buf).unwrap_err();
        assert!(matches!(err, PtkitError::Decode(_)));
    }

    #[test]
    fn test_truncated_model_is_an_error() {
        let lex = BilingualLexicon::from_text_reader(Cursor::new(TEXT), "NULL").unwrap();
        let mut buf = Vec::new();
        lex.write_binary(&mut buf).unwrap();

        for cut in [3, 5, buf.len() / 2, buf.len() - 1] {
            assert!(BilingualLexicon::from_binary_slice(&buf[..cut]).is_err(), "cut at {}", cut);
        }
    }
}

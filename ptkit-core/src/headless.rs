// ptkit-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for using the core in headless mode (non-UI).
//! Each function takes a whole phrase table as a string and returns the
//! rendered result, with no file or terminal I/O.

use anyhow::Result;
use std::io::Cursor;

use ptkit_lexical::LexiconProvider;

use crate::config::PtkitConfig;
use crate::phrase_table::PhraseTableReader;
use crate::scorer::{LexicalScorer, OutputFormat};
use crate::stats::{analyze_records, PhraseTableStats};

/// Scores every row of `content` against `lexicon` and returns the output
/// lines, one per row, in input order.
///
/// # Arguments
///
/// * `config` - The merged configuration (defaults + optional user overrides).
/// * `lexicon` - Any lexicon provider; a loaded `BilingualLexicon` or a closure.
/// * `content` - The phrase-table text.
/// * `format` - `Scores` for score lines, `Append` for rows with appended features.
pub fn headless_score_string<L>(
    config: &PtkitConfig,
    lexicon: L,
    content: &str,
    format: OutputFormat,
) -> Result<String>
where
    L: LexiconProvider + Sync,
{
    let scorer = LexicalScorer::new(lexicon);
    let reader = PhraseTableReader::new(Cursor::new(content), config.phrase_table.clone());
    let mut out = Vec::new();
    scorer.score_stream(
        reader,
        &mut out,
        format,
        config.scoring.batch_size,
        &config.phrase_table.delimiter,
    )?;
    Ok(String::from_utf8(out)?)
}

/// Collects phrase-table statistics from an in-memory table.
pub fn headless_analyze_string(config: &PtkitConfig, content: &str) -> Result<PhraseTableStats> {
    let reader = PhraseTableReader::new(Cursor::new(content), config.phrase_table.clone());
    analyze_records(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptkit_lexical::{Direction, FnLexicon, Token};

    fn identity_lexicon() -> FnLexicon<impl Fn(Token<'_>, Token<'_>, Direction) -> f64> {
        FnLexicon(|s: Token<'_>, t: Token<'_>, _: Direction| match (s, t) {
            (Token::Word(a), Token::Word(b)) if a == b => 1.0,
            _ => 0.0,
        })
    }

    #[test]
    fn test_headless_score_string() -> Result<()> {
        let config = PtkitConfig::default();
        let out = headless_score_string(&config, identity_lexicon(), "a b ||| a b\nx ||| y\n", OutputFormat::Scores)?;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Forward score: 1.000; Backward score: 1.000");
        assert_eq!(lines[1], "Forward score: 0.000; Backward score: 0.000");
        Ok(())
    }

    #[test]
    fn test_headless_analyze_string() -> Result<()> {
        let config = PtkitConfig::default();
        let stats = headless_analyze_string(&config, "a ||| x y\na ||| x\n")?;
        assert_eq!(stats.phrase_pairs, 2);
        assert_eq!(stats.source_phrases, 1);
        assert_eq!(stats.longest_target_phrase, 2);
        Ok(())
    }
}

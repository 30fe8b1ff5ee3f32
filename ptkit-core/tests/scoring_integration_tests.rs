// ptkit-core/tests/scoring_integration_tests.rs
use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use tempfile::tempdir;
use test_log::test;

use ptkit_core::{
    build_thread_pool, open_input, BilingualLexicon, LexicalEntry, LexicalScorer, OutputFormat, PhraseTableConfig,
    PhraseTableReader, Token, MAX_SCORE,
};

fn lexicon() -> BilingualLexicon {
    let mut lex = BilingualLexicon::new();
    lex.insert(Token::Word("le"), Token::Word("the"), LexicalEntry::new(0.9, 0.7)).unwrap();
    lex.insert(Token::Null, Token::Word("the"), LexicalEntry::new(0.1, 0.1)).unwrap();
    lex.insert(Token::Word("chat"), Token::Word("cat"), LexicalEntry::new(0.8, 0.6)).unwrap();
    lex.insert(Token::Word("le"), Token::Null, LexicalEntry::new(0.0, 0.2)).unwrap();
    lex
}

#[test]
fn test_best_alignment_beats_null() {
    let lex = lexicon();
    let scorer = LexicalScorer::new(&lex);
    let score = scorer.score_pair("le", "the").unwrap();
    assert!((score.forward - 0.9).abs() < 1e-12);
    assert!((score.backward - 0.7).abs() < 1e-12);
}

#[test]
fn test_unaligned_word_takes_ceiling_penalty() {
    let lex = lexicon();
    let scorer = LexicalScorer::new(&lex);
    let score = scorer.score_pair("le", "dog").unwrap();
    let expected = 10f64.powf(-MAX_SCORE);
    assert!((score.forward - expected).abs() <= expected * 1e-9);
}

#[test]
fn test_phrase_score_is_product_of_word_maxima() {
    let lex = lexicon();
    let scorer = LexicalScorer::new(&lex);
    let score = scorer.score_pair("le chat", "the cat").unwrap();
    assert!((score.forward - 0.9 * 0.8).abs() < 1e-12);
    assert!((score.backward - 0.7 * 0.6).abs() < 1e-12);
}

#[test]
fn test_scoring_is_deterministic_across_pools() -> Result<()> {
    let lex = lexicon();
    let scorer = LexicalScorer::new(&lex);
    let table: String = (0..500)
        .map(|i| if i % 2 == 0 { "le chat ||| the cat\n" } else { "le ||| the dog\n" })
        .collect();

    let mut runs = Vec::new();
    for threads in [1, 4] {
        let pool = build_thread_pool(threads)?;
        let mut out = Vec::new();
        pool.install(|| {
            let reader = PhraseTableReader::new(table.as_bytes(), PhraseTableConfig::default());
            scorer.score_stream(reader, &mut out, OutputFormat::Scores, 64, " ||| ")
        })?;
        runs.push(String::from_utf8(out)?);
    }
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].lines().count(), 500);
    Ok(())
}

#[test]
fn test_gzipped_phrase_table_input() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("phrase-table.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path)?, Compression::default());
    encoder.write_all(b"le ||| the ||| 0.5\nchat ||| cat ||| 0.4\n")?;
    encoder.finish()?;

    let lex = lexicon();
    let scorer = LexicalScorer::new(&lex);
    let reader = PhraseTableReader::new(open_input(Some(&path))?, PhraseTableConfig::default());
    let mut out = Vec::new();
    let summary = scorer.score_stream(reader, &mut out, OutputFormat::Append, 8, " ||| ")?;

    assert_eq!(summary.scored, 2);
    let text = String::from_utf8(out)?;
    assert!(text.lines().all(|l| l.contains("EgivenFLex=") && l.contains("FgivenELex=")));
    Ok(())
}

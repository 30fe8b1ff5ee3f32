// ptkit-core/tests/lexicon_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use test_log::test;

use ptkit_core::{BilingualLexicon, Direction, LexiconProvider, Token};

const LEXICON: &str = "\
# source target p(t|s) p(s|t)
le the 0.9 0.7
NULL the 0.1 0.0
chat cat 1.0 0.95
chat NULL 0.0 0.05
";

fn write_text_lexicon() -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(LEXICON.as_bytes())?;
    Ok(file)
}

#[test]
fn test_text_lexicon_loads() -> Result<()> {
    let file = write_text_lexicon()?;
    let lexicon = BilingualLexicon::load(file.path(), "NULL")?;
    assert_eq!(lexicon.len(), 4);
    assert_eq!(lexicon.score(Token::Word("le"), Token::Word("the"), Direction::TargetGivenSource), 0.9);
    assert_eq!(lexicon.score(Token::Null, Token::Word("the"), Direction::TargetGivenSource), 0.1);
    assert_eq!(lexicon.score(Token::Word("chat"), Token::Null, Direction::SourceGivenTarget), 0.05);
    // Unseen pairs are zero, never an error.
    assert_eq!(lexicon.score(Token::Word("chien"), Token::Word("dog"), Direction::TargetGivenSource), 0.0);
    Ok(())
}

#[test]
fn test_binary_model_matches_text() -> Result<()> {
    let file = write_text_lexicon()?;
    let text = BilingualLexicon::load(file.path(), "NULL")?;

    let dir = tempdir()?;
    let model = dir.path().join("lexicon.ptlx");
    text.save_binary(&model)?;

    let bytes = std::fs::read(&model)?;
    assert_eq!(&bytes[..4], b"PTLX");

    let binary = BilingualLexicon::load(&model, "NULL")?;
    assert_eq!(binary, text);
    Ok(())
}

#[test]
fn test_custom_null_token() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"<null> the 0.2 0.0\nNULL the 0.3 0.3\n")?;
    let lexicon = BilingualLexicon::load(file.path(), "<null>")?;
    assert_eq!(lexicon.score(Token::Null, Token::Word("the"), Direction::TargetGivenSource), 0.2);
    // With a custom token, a literal NULL is an ordinary word.
    assert_eq!(lexicon.score(Token::Word("NULL"), Token::Word("the"), Direction::TargetGivenSource), 0.3);
    Ok(())
}

#[test]
fn test_bad_lexicon_line_reports_line_number() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"le the 0.9 0.7\nchat cat 1.5 0.1\n")?;
    let err = BilingualLexicon::load(file.path(), "NULL").unwrap_err();
    assert!(format!("{:#}", err).contains("line 2"));
    Ok(())
}

#[test]
fn test_missing_lexicon_is_an_error() {
    let err = BilingualLexicon::load("/no/such/lexicon.txt", "NULL").unwrap_err();
    assert!(err.to_string().contains("/no/such/lexicon.txt"));
}

// ptkit-lexical/src/scoring/mod.rs
//! Bidirectional lexical weighting for a single phrase pair.
//!
//! Every word on the primary side is assumed aligned to whichever counterpart
//! word (or NULL) explains it best. Per-word maxima are combined in log10
//! space and converted back into a probability at the end.

use alloc::vec::Vec;
use core::fmt;
use libm::{log10, pow};

use crate::direction::Direction;
use crate::lexicon::LexiconProvider;
use crate::token::Token;
use crate::Probability;

/// Penalty charged for a word that no counterpart (NULL included) explains.
pub const MAX_SCORE: f64 = 99.0;

/// Lower bound of a returned score. Several ceiling penalties underflow `f64`,
/// and a returned score must stay strictly positive.
pub const SCORE_FLOOR: Probability = f64::MIN_POSITIVE;

/// The two aggregate lexical weights of a phrase pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhraseScore {
    /// lex(target | source)
    pub forward: Probability,
    /// lex(source | target)
    pub backward: Probability,
}

impl fmt::Display for PhraseScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Forward score: {:.3}; Backward score: {:.3}", self.forward, self.backward)
    }
}

/// Side of a phrase pair, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

/// Input-shape violations. Scoring itself never fails on lexicon content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// A phrase with no words reached the scorer.
    EmptyPhrase(Side),
    /// The candidate list handed to [`aggregate`] lacks the NULL sentinel.
    MissingNull,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::EmptyPhrase(side) => write!(f, "cannot score an empty {} phrase", side),
            ScoreError::MissingNull => f.write_str("candidate list does not contain the NULL word"),
        }
    }
}

impl core::error::Error for ScoreError {}

/// Splits a phrase on whitespace. Order is kept; duplicates are kept.
pub fn tokenize(phrase: &str) -> Vec<&str> {
    phrase.split_whitespace().collect()
}

/// Builds the counterpart candidate list: a fresh copy of `words` followed by
/// exactly one NULL. The caller's slice is left untouched.
pub fn with_null<'a>(words: &[&'a str]) -> Vec<Token<'a>> {
    let mut candidates = Vec::with_capacity(words.len() + 1);
    candidates.extend(words.iter().map(|&w| Token::Word(w)));
    candidates.push(Token::Null);
    candidates
}

/// Aggregates the lexical weight of `primary` against `candidates`.
///
/// For [`Direction::TargetGivenSource`] the primary words are target words and
/// every query is `(candidate, word)`; for [`Direction::SourceGivenTarget`] the
/// primary words are source words and every query is `(word, candidate)`.
///
/// `candidates` must be built with [`with_null`].
pub fn aggregate<L>(
    primary: &[&str],
    candidates: &[Token<'_>],
    lexicon: &L,
    direction: Direction,
) -> Result<Probability, ScoreError>
where
    L: LexiconProvider + ?Sized,
{
    if !candidates.iter().any(Token::is_null) {
        return Err(ScoreError::MissingNull);
    }
    if primary.is_empty() {
        let side = match direction {
            Direction::TargetGivenSource => Side::Target,
            Direction::SourceGivenTarget => Side::Source,
        };
        return Err(ScoreError::EmptyPhrase(side));
    }
    if candidates.len() == 1 {
        let side = match direction {
            Direction::TargetGivenSource => Side::Source,
            Direction::SourceGivenTarget => Side::Target,
        };
        return Err(ScoreError::EmptyPhrase(side));
    }

    let mut penalty = 0.0;
    for &word in primary {
        let best = best_alignment(Token::Word(word), candidates, lexicon, direction);
        penalty += word_penalty(best);
    }

    Ok(pow(10.0, -penalty).max(SCORE_FLOOR))
}

/// Scores one phrase pair in both directions.
///
/// `forward` is lex(target | source ∪ NULL), `backward` is
/// lex(source | target ∪ NULL).
pub fn score_phrase_pair<L>(
    source: &[&str],
    target: &[&str],
    lexicon: &L,
) -> Result<PhraseScore, ScoreError>
where
    L: LexiconProvider + ?Sized,
{
    if source.is_empty() {
        return Err(ScoreError::EmptyPhrase(Side::Source));
    }
    if target.is_empty() {
        return Err(ScoreError::EmptyPhrase(Side::Target));
    }

    let forward = aggregate(target, &with_null(source), lexicon, Direction::TargetGivenSource)?;
    let backward = aggregate(source, &with_null(target), lexicon, Direction::SourceGivenTarget)?;

    Ok(PhraseScore { forward, backward })
}

/// Highest probability any candidate assigns to `word`, clamped to `[0, 1]`.
/// NaN answers count as no evidence.
fn best_alignment<L>(
    word: Token<'_>,
    candidates: &[Token<'_>],
    lexicon: &L,
    direction: Direction,
) -> Probability
where
    L: LexiconProvider + ?Sized,
{
    let best = candidates
        .iter()
        .map(|&candidate| match direction {
            Direction::TargetGivenSource => lexicon.score(candidate, word, direction),
            Direction::SourceGivenTarget => lexicon.score(word, candidate, direction),
        })
        .fold(0.0, Probability::max);
    best.min(1.0)
}

fn word_penalty(best: Probability) -> f64 {
    if best > 0.0 {
        -log10(best)
    } else {
        MAX_SCORE
    }
}

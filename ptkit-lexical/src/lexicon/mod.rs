// ptkit-lexical/src/lexicon/mod.rs
//! The lexicon capability consumed by the scorer.
//!
//! The scorer never looks inside a lexicon. It only asks point queries of the
//! form `(source, target, direction) -> probability`, so anything from an
//! in-memory hash table to a memory-mapped model can sit behind this trait.

use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::direction::Direction;
use crate::token::Token;
use crate::Probability;

/// Answers word-to-word translation probability queries.
///
/// Implementations must be deterministic, side-effect free and total: an
/// unknown pair (including out-of-vocabulary words) yields `0.0` rather than
/// an error. Returned values are expected in `[0, 1]`.
pub trait LexiconProvider {
    /// Probability of the conditioned word given the conditioning word.
    ///
    /// For [`Direction::TargetGivenSource`] this is p(`target` | `source`),
    /// for [`Direction::SourceGivenTarget`] it is p(`source` | `target`).
    fn score(&self, source: Token<'_>, target: Token<'_>, direction: Direction) -> Probability;
}

impl<T: LexiconProvider + ?Sized> LexiconProvider for &T {
    fn score(&self, source: Token<'_>, target: Token<'_>, direction: Direction) -> Probability {
        (**self).score(source, target, direction)
    }
}

impl<T: LexiconProvider + ?Sized> LexiconProvider for Box<T> {
    fn score(&self, source: Token<'_>, target: Token<'_>, direction: Direction) -> Probability {
        (**self).score(source, target, direction)
    }
}

impl<T: LexiconProvider + ?Sized> LexiconProvider for Arc<T> {
    fn score(&self, source: Token<'_>, target: Token<'_>, direction: Direction) -> Probability {
        (**self).score(source, target, direction)
    }
}

/// Adapts a plain function or closure into a [`LexiconProvider`].
#[derive(Debug, Clone, Copy)]
pub struct FnLexicon<F>(pub F);

impl<F> LexiconProvider for FnLexicon<F>
where
    F: Fn(Token<'_>, Token<'_>, Direction) -> Probability,
{
    fn score(&self, source: Token<'_>, target: Token<'_>, direction: Direction) -> Probability {
        (self.0)(source, target, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_lexicon_forwards_arguments() {
        let lex = FnLexicon(|s: Token<'_>, t: Token<'_>, d: Direction| {
            match (s, t, d) {
                (Token::Word("le"), Token::Word("the"), Direction::TargetGivenSource) => 0.9,
                _ => 0.0,
            }
        });
        assert_eq!(lex.score("le".into(), "the".into(), Direction::TargetGivenSource), 0.9);
        assert_eq!(lex.score("le".into(), "the".into(), Direction::SourceGivenTarget), 0.0);

        let boxed: Box<dyn LexiconProvider> = Box::new(lex);
        assert_eq!(boxed.score("le".into(), "the".into(), Direction::TargetGivenSource), 0.9);
    }
}

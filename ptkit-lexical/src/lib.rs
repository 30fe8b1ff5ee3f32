// ptkit-lexical/src/lib.rs
#![no_std]

extern crate alloc; 

#[cfg(feature = "std")]
extern crate std;

pub mod direction;
pub mod token;
pub mod lexicon;
pub mod scoring;

pub use direction::Direction;
pub use lexicon::{FnLexicon, LexiconProvider};
pub use scoring::{aggregate, score_phrase_pair, tokenize, with_null, PhraseScore, ScoreError, Side, MAX_SCORE};
pub use token::Token;

/// Common type definitions
pub type Probability = f64;

// ptkit-lexical/src/token/mod.rs
use core::fmt;

/// A lexicon query operand: either a real word or the NULL sentinel.
///
/// NULL is a variant, not a reserved string, so a phrase that happens to
/// contain the literal text `NULL` is scored as an ordinary word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token<'a> {
    Word(&'a str),
    Null,
}

impl<'a> Token<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Token::Null)
    }

    /// Returns the word text, or `None` for the sentinel.
    pub fn as_word(&self) -> Option<&'a str> {
        match self {
            Token::Word(w) => Some(w),
            Token::Null => None,
        }
    }
}

impl<'a> From<&'a str> for Token<'a> {
    fn from(word: &'a str) -> Self {
        Token::Word(word)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Null => f.write_str("<NULL>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_null_text_is_a_word() {
        let t = Token::from("NULL");
        assert!(!t.is_null());
        assert_eq!(t.as_word(), Some("NULL"));
        assert_ne!(t, Token::Null);
    }
}

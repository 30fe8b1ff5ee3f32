// ptkit-lexical/src/direction/mod.rs
use core::fmt;

/// Which side of a word pair conditions a lexicon probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// p(target word | source word), the "forward" lexical weight.
    TargetGivenSource,
    /// p(source word | target word), the "backward" lexical weight.
    SourceGivenTarget,
}

impl Direction {
    /// The other direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::TargetGivenSource => Direction::SourceGivenTarget,
            Direction::SourceGivenTarget => Direction::TargetGivenSource,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TargetGivenSource => f.write_str("target|source"),
            Direction::SourceGivenTarget => f.write_str("source|target"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_is_involution() {
        assert_eq!(Direction::TargetGivenSource.flip(), Direction::SourceGivenTarget);
        assert_eq!(Direction::SourceGivenTarget.flip().flip(), Direction::SourceGivenTarget);
    }
}

use std::ops::RangeInclusive;

use crate::show::Show;

/// First character of the universe alphabet.
pub const UNIVERSE_FIRST: char = '!';
/// Last character of the universe alphabet.
pub const UNIVERSE_LAST: char = '~';

/// Returns the universe alphabet, that is the contiguous range of printable ASCII
/// characters `'!'` to `'~'`. Operations which have to consider every possible input
/// character, such as totalization or the construction of bounded-length automata,
/// range over this set.
pub fn universe() -> RangeInclusive<char> {
    UNIVERSE_FIRST..=UNIVERSE_LAST
}

/// Number of characters in the universe alphabet.
pub const fn universe_len() -> usize {
    UNIVERSE_LAST as usize - UNIVERSE_FIRST as usize + 1
}

/// Returns true if `chr` lies in the universe alphabet.
pub fn in_universe(chr: char) -> bool {
    universe().contains(&chr)
}

/// A symbol labelling a transition. This is either an actual character or the empty
/// word ε, which allows nondeterministic intermediate results (as produced by union,
/// concatenation or reversal) to be represented directly. Symbols are ordered with
/// ε before all characters, so iterating the transitions of a state in canonical
/// order yields its ε-moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// The empty word.
    Epsilon,
    /// A single character.
    Char(char),
}

impl Symbol {
    /// Returns true if this symbol is the empty word.
    pub fn is_epsilon(self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    /// Returns the underlying character, if this symbol is not ε.
    pub fn as_char(self) -> Option<char> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Char(chr) => Some(chr),
        }
    }

    /// Appends the rendering of this symbol to `word`. The empty word contributes
    /// nothing, so concatenating symbol renderings along a path gives precisely the
    /// word that the path spells.
    pub fn push_onto(self, word: &mut String) {
        if let Symbol::Char(chr) = self {
            word.push(chr);
        }
    }
}

impl From<char> for Symbol {
    fn from(chr: char) -> Self {
        Symbol::Char(chr)
    }
}

impl Show for Symbol {
    fn show(&self) -> String {
        match self {
            Symbol::Epsilon => "ε".to_string(),
            Symbol::Char(chr) => chr.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_spans_printable_ascii() {
        assert_eq!(universe_len(), 94);
        assert!(in_universe('a'));
        assert!(in_universe('!'));
        assert!(in_universe('~'));
        assert!(!in_universe(' '));
        assert!(!in_universe('\n'));
    }

    #[test]
    fn epsilon_sorts_before_characters() {
        let mut symbols = vec![Symbol::Char('b'), Symbol::Char('a'), Symbol::Epsilon];
        symbols.sort();
        assert_eq!(
            symbols,
            vec![Symbol::Epsilon, Symbol::Char('a'), Symbol::Char('b')]
        );
    }

    #[test]
    fn rendering_epsilon_contributes_nothing() {
        let mut word = String::new();
        Symbol::Char('a').push_onto(&mut word);
        Symbol::Epsilon.push_onto(&mut word);
        Symbol::Char('b').push_onto(&mut word);
        assert_eq!(word, "ab");
        assert_eq!(Symbol::Epsilon.show(), "ε");
    }
}

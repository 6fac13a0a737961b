//! Library for building, combining and minimizing finite automata over character
//! symbols, together with a solver that converts an automaton back into a regular
//! expression. It is meant as the computational kernel of string abstractions,
//! where an automaton stands for a possibly infinite set of strings and every
//! operation on automata mirrors an operation on string sets.
//!
//! The central type is [`automaton::Automaton`]. Its states live in an arena and are
//! addressed by a dense [`automaton::StateId`], transitions are plain value triples of
//! source, symbol and target, and the symbol alphabet is the fixed range of printable
//! ASCII characters plus an explicit ε symbol. The representation is permissive on
//! purpose: ε transitions, several initial states and nondeterministic branching are
//! all legal, since the intermediate products of union, concatenation, closure and
//! reversal pass through such shapes. Operations that need determinism, such as
//! complementation or the partition refinement minimizers, normalize their input by
//! running the subset construction first.
//!
//! On top of the boolean algebra (union, intersection, complement, difference) and
//! the three minimization procedures (Brzozowski, Hopcroft and Moore), the crate
//! derives the string operators that abstract interpreters ask for: quotients,
//! prefix/suffix/factor languages, `substring` and `char_at` over sets of strings,
//! and a widening that merges states with equal bounded lookahead. Regex synthesis
//! is performed by [`automaton::Automaton::to_regex`], which solves the linear language
//! equations of the automaton with Arden's rule and returns a normalized
//! [`regex::RegularExpression`].
//!
//! Automata are either assembled programmatically, through the constructors like
//! [`automaton::Automaton::from_word`] or [`automaton::Automaton::from_parts`], or read
//! from one of the two plain-text formats understood by the loaders in [`parse`].
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything,
/// i.e. `use automata_strings::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet,
        alphabet::{in_universe, universe, universe_len, Symbol, UNIVERSE_FIRST, UNIVERSE_LAST},
        automaton::{Automaton, State, StateId, Transition},
        math,
        math::{Bijection, Map, OrderedMap, OrderedSet, Partition},
        parse::{parse_interchange_format, parse_line_format, ParseError},
        regex::RegularExpression,
        Show,
    };
}

/// This module contains some definitions of mathematical objects which are used
/// throughout the crate and do not really fit to the top level.
pub mod math;

/// Module that defines the symbol alphabet, that is the fixed universe of printable
/// ASCII characters and the ε symbol.
pub mod alphabet;

/// Defines automata as arenas of states with a value-typed transition relation, and
/// implements the algebra, the minimizers and the derived string operators on them.
pub mod automaton;

/// Defines the regular expression term algebra that regex synthesis produces.
pub mod regex;

/// Plain-text loaders constructing automata from serialized descriptions.
pub mod parse;

mod show;
mod solver;

pub use show::Show;

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn operators_loaders_and_synthesis_work_together() {
        let loaded = parse_line_format("a b c\na\nc\na b h\nb c i").unwrap();
        assert!(loaded.equivalent(&Automaton::from_word("hi")));

        let mut language = loaded.union(&Automaton::from_word("ha"));
        language.minimize();
        assert_eq!(language.char_at(1).pretty_print(), "(a + i)");
        assert!(language
            .substring(0, 1)
            .equivalent(&Automaton::from_word("h")));

        let synthesized = language.to_regex().to_automaton();
        assert!(synthesized.equivalent(&language));
    }
}

//! Regex synthesis through the language equations of an automaton.
//!
//! Every state `q` induces one linear equation: its language is the alternation
//! over the outgoing transitions `(q, s, r)` of `s` concatenated with the
//! language of `r`, plus ε when `q` accepts. The system is solved by Gaussian
//! elimination, where Arden's rule removes the self reference of an equation
//! before the equation is substituted into the rest of the system.

use tracing::trace;

use crate::prelude::*;

/// One language equation in linear shape: the unknown equals the alternation of
/// `coefficient · variable` over the tracked successors, plus a constant. All
/// coefficients and the constant are ground expressions.
#[derive(Clone, Debug)]
struct Equation {
    coefficients: OrderedMap<StateId, RegularExpression>,
    constant: RegularExpression,
}

impl Equation {
    fn of_state(automaton: &Automaton, q: StateId) -> Self {
        let mut equation = Self {
            coefficients: OrderedMap::new(),
            constant: if automaton.is_final(q) {
                RegularExpression::epsilon()
            } else {
                RegularExpression::Empty
            },
        };
        for transition in automaton.outgoing_from(q) {
            equation.add_coefficient(
                transition.target(),
                RegularExpression::symbol(transition.symbol()),
            );
        }
        equation
    }

    /// Alternates `coefficient` onto the entry for `target`. Empty coefficients
    /// are never stored.
    fn add_coefficient(&mut self, target: StateId, coefficient: RegularExpression) {
        let combined = match self.coefficients.remove(&target) {
            Some(existing) => existing.or(coefficient),
            None => coefficient,
        };
        if combined != RegularExpression::Empty {
            self.coefficients.insert(target, combined);
        }
    }

    /// Applies Arden's rule to remove the self reference: an equation
    /// `x = A·x + rest` has the least solution `x = A*·rest`, so every other
    /// coefficient and the constant are prefixed with the closed self loop.
    fn eliminate_self(&mut self, q: StateId) {
        let Some(coefficient) = self.coefficients.remove(&q) else {
            return;
        };
        let prefix = coefficient.star();
        if prefix.is_epsilon() {
            return;
        }
        for value in self.coefficients.values_mut() {
            let tail = std::mem::replace(value, RegularExpression::Empty);
            *value = prefix.clone().cat(tail);
        }
        self.constant = prefix.cat(std::mem::replace(
            &mut self.constant,
            RegularExpression::Empty,
        ));
    }

    /// Replaces the reference to `q` in this equation with the right hand side
    /// of the already eliminated equation for `q`, which must not reference `q`
    /// itself anymore.
    fn substitute(&mut self, q: StateId, solved: &Equation) {
        let Some(through) = self.coefficients.remove(&q) else {
            return;
        };
        for (r, coefficient) in &solved.coefficients {
            self.add_coefficient(*r, through.clone().cat(coefficient.clone()));
        }
        let constant = std::mem::replace(&mut self.constant, RegularExpression::Empty);
        self.constant = constant.or(through.cat(solved.constant.clone()));
    }
}

impl Automaton {
    /// Synthesizes a regular expression denoting the language of this automaton.
    ///
    /// States are eliminated in ascending index order. Eliminating `q` first
    /// closes its self loop with Arden's rule and then substitutes the equation
    /// into all remaining ones, so each eliminated equation only references
    /// states that are eliminated later. A reverse back substitution pass then
    /// grounds the language of every state, and the result is the alternation
    /// over the initial states.
    ///
    /// # Panics
    /// Panics if the automaton has no initial state.
    pub fn to_regex(&self) -> RegularExpression {
        assert!(
            !self.initial_states().is_empty(),
            "cannot synthesize a regex without an initial state"
        );
        let reachable = self.reachable_states();
        if !self.final_states().iter().any(|q| reachable.contains(*q)) {
            return RegularExpression::Empty;
        }

        let mut remaining: OrderedMap<StateId, Equation> = self
            .states()
            .map(|q| (q, Equation::of_state(self, q)))
            .collect();
        let mut eliminated = Vec::with_capacity(self.size());
        while let Some((q, mut equation)) = remaining.pop_first() {
            equation.eliminate_self(q);
            for other in remaining.values_mut() {
                other.substitute(q, &equation);
            }
            trace!(
                "eliminated the equation of state {q}, {} remaining",
                remaining.len()
            );
            eliminated.push((q, equation));
        }

        let mut languages: Map<StateId, RegularExpression> = Map::default();
        for (q, equation) in eliminated.into_iter().rev() {
            let mut language = equation.constant;
            for (r, coefficient) in equation.coefficients {
                let tail = languages
                    .get(&r)
                    .expect("an eliminated equation only references later equations");
                language = language.or(coefficient.cat(tail.clone()));
            }
            debug_assert!(language.is_ground());
            languages.insert(q, language);
        }

        RegularExpression::alternation(self.initial_states().into_iter().map(|q| {
            languages
                .get(&q)
                .expect("back substitution grounds every state language")
                .clone()
        }))
        .simplify()
    }

    /// Renders the language of this automaton as a regular expression string.
    pub fn pretty_print(&self) -> String {
        self.to_regex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn a_single_word_solves_to_its_literal() {
        assert_eq!(
            Automaton::from_word("abc").to_regex(),
            RegularExpression::ground("abc")
        );
        assert_eq!(
            Automaton::empty_string().to_regex(),
            RegularExpression::epsilon()
        );
    }

    #[test]
    fn the_empty_language_solves_to_empty() {
        assert_eq!(
            Automaton::empty_language().to_regex(),
            RegularExpression::Empty
        );
    }

    #[test]
    fn unreachable_accepting_states_do_not_contribute() {
        let automaton = Automaton::from_parts(
            vec![
                State::new("live", true, false),
                State::new("stranded", false, true),
            ],
            [],
        );
        assert_eq!(automaton.to_regex(), RegularExpression::Empty);
    }

    #[test]
    #[should_panic]
    fn solving_without_an_initial_state_is_refused() {
        Automaton::from_parts(vec![State::new("lonely", false, true)], []).to_regex();
    }

    #[test]
    fn a_self_loop_closes_into_a_star() {
        assert_eq!(
            Automaton::from_word("a").star().to_regex(),
            RegularExpression::ground("a").star()
        );
    }

    #[test]
    fn branches_solve_to_an_alternation() {
        let automaton = Automaton::from_word("a").union(&Automaton::from_word("b"));
        assert_eq!(
            automaton.to_regex(),
            RegularExpression::ground("a").or(RegularExpression::ground("b"))
        );
    }

    #[test_log::test]
    fn synthesized_expressions_denote_the_same_language() {
        let samples = [
            Automaton::from_word("ab").star(),
            Automaton::from_word("a")
                .union(&Automaton::from_word("b"))
                .star()
                .concat(&Automaton::from_word("abb")),
            Automaton::from_word("hello").union(&Automaton::from_word("world").star()),
        ];
        for automaton in samples {
            let synthesized = automaton.to_regex();
            assert!(synthesized.is_ground());
            assert!(
                synthesized.to_automaton().equivalent(&automaton),
                "{synthesized} does not match the source language"
            );
        }
    }

    #[test]
    fn rendering_goes_through_the_synthesizer() {
        assert_eq!(Automaton::from_word("hi").pretty_print(), "hi");
        assert_eq!(Automaton::empty_language().pretty_print(), "∅");
        assert_eq!(Automaton::from_word("a").star().pretty_print(), "a*");
    }
}

use tracing::debug;

use crate::automaton::NameSource;
use crate::prelude::*;

/// Copies the states and transitions of `source` into the arena under construction,
/// renaming every state freshly. The initial and final markers survive only where the
/// flags say so. Returns the index offset at which the copy begins.
fn splice(
    states: &mut Vec<State>,
    transitions: &mut Vec<Transition>,
    names: &mut NameSource,
    source: &Automaton,
    keep_initial: bool,
    keep_final: bool,
) -> usize {
    let offset = states.len();
    for q in source.states() {
        states.push(State::new(
            names.fresh(),
            keep_initial && source.is_initial(q),
            keep_final && source.is_final(q),
        ));
    }
    for t in source.transitions() {
        transitions.push(Transition::new(
            t.source() + offset,
            t.target() + offset,
            t.symbol(),
        ));
    }
    offset
}

/// The boolean algebra of languages: union, intersection, complement, difference and
/// the remaining regular operators.
impl Automaton {
    /// Makes the transition function total by adding a rejecting sink state named
    /// `qbottom`. For every state and every character of the universe alphabet that
    /// the state cannot read, a transition into the sink is added, and the sink
    /// loops on the whole universe. The accepted language does not change.
    pub fn totalize(&self) -> Automaton {
        let mut result = self.clone();
        let sink = result.push_state(State::new("qbottom", false, false));
        for chr in alphabet::universe() {
            result.insert_transition(Transition::on_char(sink, sink, chr));
        }
        for q in self.states() {
            let covered: OrderedSet<char> = self
                .outgoing_from(q)
                .iter()
                .filter_map(|t| t.symbol().as_char())
                .collect();
            for chr in alphabet::universe() {
                if !covered.contains(&chr) {
                    result.insert_transition(Transition::on_char(q, sink, chr));
                }
            }
        }
        result
    }

    /// Complements this automaton with respect to the universe alphabet. The input
    /// is determinized if necessary, then totalized, then every acceptance verdict
    /// is flipped. The result is minimal.
    pub fn complement(&self) -> Automaton {
        let det = if self.is_deterministic() {
            self.clone()
        } else {
            debug!("complementing a nondeterministic automaton, determinizing first");
            self.determinize()
        };
        let mut result = det.totalize();
        for q in result.states() {
            let accepting = result.is_final(q);
            result.set_final(q, !accepting);
        }
        result.minimize();
        result
    }

    /// Builds the union of the two languages. A fresh initial state is connected by
    /// ε transitions to the initial states of (copies of) both operands, whose own
    /// initial markers are dropped. The result is minimal.
    pub fn union(&self, other: &Automaton) -> Automaton {
        let mut names = NameSource::new("q");
        let mut states = Vec::new();
        let mut transitions = Vec::new();
        states.push(State::new(names.fresh(), true, false));
        let left = splice(&mut states, &mut transitions, &mut names, self, false, true);
        let right = splice(&mut states, &mut transitions, &mut names, other, false, true);
        for q in self.initial_states() {
            transitions.push(Transition::epsilon(0, left + q));
        }
        for q in other.initial_states() {
            transitions.push(Transition::epsilon(0, right + q));
        }
        let mut result = Automaton::from_parts(states, transitions);
        result.minimize();
        result
    }

    /// Builds the concatenation of the two languages. The final states of the first
    /// operand lose their acceptance and are connected by ε transitions to the
    /// initial states of the second. The result is minimal.
    pub fn concat(&self, other: &Automaton) -> Automaton {
        let mut names = NameSource::new("q");
        let mut states = Vec::new();
        let mut transitions = Vec::new();
        let left = splice(&mut states, &mut transitions, &mut names, self, true, false);
        let right = splice(&mut states, &mut transitions, &mut names, other, false, true);
        for f in self.final_states() {
            for i in other.initial_states() {
                transitions.push(Transition::epsilon(left + f, right + i));
            }
        }
        let mut result = Automaton::from_parts(states, transitions);
        result.minimize();
        result
    }

    /// Builds the intersection of the two languages through De Morgan's law, the
    /// complement of the union of the complements.
    pub fn intersection(&self, other: &Automaton) -> Automaton {
        self.complement().union(&other.complement()).complement()
    }

    /// Builds the difference of the two languages, all words of `self` that `other`
    /// does not accept.
    pub fn minus(&self, other: &Automaton) -> Automaton {
        let mut result = self.intersection(&other.complement());
        result.minimize();
        result
    }

    /// Builds the Kleene closure of this language. A fresh state is both initial and
    /// final, ε transitions connect it to the initial states of a copy of `self` and
    /// lead from every final state back to the initial ones. The result is minimal.
    pub fn star(&self) -> Automaton {
        let mut names = NameSource::new("q");
        let mut states = Vec::new();
        let mut transitions = Vec::new();
        states.push(State::new(names.fresh(), true, true));
        let offset = splice(&mut states, &mut transitions, &mut names, self, false, true);
        for i in self.initial_states() {
            transitions.push(Transition::epsilon(0, offset + i));
        }
        for f in self.final_states() {
            for i in self.initial_states() {
                transitions.push(Transition::epsilon(offset + f, offset + i));
            }
        }
        let mut result = Automaton::from_parts(states, transitions);
        result.minimize();
        result
    }

    /// Reverses this automaton in place, so that it accepts the mirror image of
    /// every previously accepted word. All transitions are flipped, a fresh initial
    /// state named `init` is connected by ε transitions to the old final states, and
    /// the old initial states become the final ones.
    pub fn reverse(&mut self) {
        let old_initials = self.initial_states();
        let old_finals = self.final_states();
        let mut transitions: Vec<Transition> = self
            .transitions()
            .map(|t| Transition::new(t.target(), t.source(), t.symbol()))
            .collect();
        let init = self.push_state(State::new("init", true, false));
        for q in &old_finals {
            self.set_final(*q, false);
            transitions.push(Transition::epsilon(init, *q));
        }
        for q in &old_initials {
            self.set_final(*q, true);
            self.set_initial(*q, false);
        }
        self.replace_transitions(transitions);
    }

    /// Returns true if this automaton accepts no word at all.
    pub fn is_empty_language(&self) -> bool {
        let mut minimized = self.clone();
        minimized.minimize();
        minimized.final_states().is_empty()
    }

    /// Returns true if every word of `self` is also accepted by `other`.
    pub fn included_in(&self, other: &Automaton) -> bool {
        self.intersection(&other.complement()).is_empty_language()
    }

    /// Decides language equality by checking inclusion in both directions.
    pub fn equivalent(&self, other: &Automaton) -> bool {
        self.included_in(other) && other.included_in(self)
    }

    /// Folds a collection of automata into the union of their languages. Returns
    /// `None` if the collection is empty.
    pub fn union_all(automata: impl IntoIterator<Item = Automaton>) -> Option<Automaton> {
        automata.into_iter().reduce(|acc, next| acc.union(&next))
    }

    /// Folds a collection of automata into the intersection of their languages.
    /// Returns `None` if the collection is empty.
    pub fn intersection_all(automata: impl IntoIterator<Item = Automaton>) -> Option<Automaton> {
        automata.into_iter().reduce(|acc, next| acc.intersection(&next))
    }

    /// Folds a collection of automata into the concatenation of their languages, in
    /// iteration order. Returns `None` if the collection is empty.
    pub fn concat_all(automata: impl IntoIterator<Item = Automaton>) -> Option<Automaton> {
        automata.into_iter().reduce(|acc, next| acc.concat(&next))
    }

    /// Folds a collection of automata by subtracting each further language from the
    /// first one, in iteration order. Returns `None` if the collection is empty.
    pub fn minus_all(automata: impl IntoIterator<Item = Automaton>) -> Option<Automaton> {
        automata.into_iter().reduce(|acc, next| acc.minus(&next))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn totalization_covers_the_whole_universe() {
        let total = Automaton::from_word("ab").totalize();
        for q in total.states() {
            let covered: OrderedSet<char> = total
                .outgoing_from(q)
                .iter()
                .filter_map(|t| t.symbol().as_char())
                .collect();
            assert_eq!(covered.len(), alphabet::universe_len());
        }
        assert!(total.run("ab"));
        assert!(!total.run("ax"));
    }

    #[test]
    fn union_accepts_both_operands() {
        let union = Automaton::from_word("a").union(&Automaton::from_word("b"));
        assert!(union.run("a"));
        assert!(union.run("b"));
        assert!(!union.run(""));
        assert!(!union.run("ab"));
        assert_eq!(union.size(), 2);
    }

    #[test]
    fn concatenation_glues_words_together() {
        let concat = Automaton::from_word("ab").concat(&Automaton::from_word("cd"));
        assert!(concat.run("abcd"));
        assert!(!concat.run("ab"));
        assert!(!concat.run("cd"));
        assert!(!concat.run("abdc"));
    }

    #[test]
    fn concatenation_with_the_empty_word_is_neutral() {
        let word = Automaton::from_word("xy");
        let concat = word.concat(&Automaton::empty_string());
        assert!(concat.equivalent(&word));
    }

    #[test_log::test]
    fn complementation_flips_membership() {
        let complement = Automaton::from_word("a").complement();
        assert!(!complement.run("a"));
        assert!(complement.run(""));
        assert!(complement.run("b"));
        assert!(complement.run("aa"));
    }

    #[test]
    fn complementation_is_an_involution() {
        let automaton = Automaton::from_word("a").union(&Automaton::from_word("bc"));
        assert!(automaton.complement().complement().equivalent(&automaton));
    }

    #[test]
    fn de_morgan_holds() {
        let left = Automaton::from_word("a");
        let right = Automaton::from_word("b");
        let via_union = left.union(&right).complement();
        let via_intersection = left.complement().intersection(&right.complement());
        assert!(via_union.equivalent(&via_intersection));
    }

    #[test]
    fn intersection_keeps_the_overlap() {
        let left = Automaton::from_word("a").union(&Automaton::from_word("b"));
        let right = Automaton::from_word("b").union(&Automaton::from_word("c"));
        let overlap = left.intersection(&right);
        assert!(overlap.equivalent(&Automaton::from_word("b")));
    }

    #[test]
    fn difference_removes_words() {
        let both = Automaton::from_word("a").union(&Automaton::from_word("b"));
        let minus = both.minus(&Automaton::from_word("a"));
        assert!(minus.equivalent(&Automaton::from_word("b")));
    }

    #[test]
    fn kleene_closure_iterates_the_language() {
        let star = Automaton::from_word("ab").star();
        assert!(star.run(""));
        assert!(star.run("ab"));
        assert!(star.run("abab"));
        assert!(!star.run("aba"));
        assert_eq!(star.size(), 2);
    }

    #[test]
    fn reversal_mirrors_words() {
        let mut automaton = Automaton::from_word("abc");
        automaton.reverse();
        assert!(automaton.run("cba"));
        assert!(!automaton.run("abc"));
    }

    #[test]
    fn emptiness_check() {
        assert!(Automaton::empty_language().is_empty_language());
        assert!(!Automaton::empty_string().is_empty_language());
        assert!(!Automaton::from_word("a").is_empty_language());
        let disjoint = Automaton::from_word("a").intersection(&Automaton::from_word("b"));
        assert!(disjoint.is_empty_language());
    }

    #[test]
    fn inclusion_is_a_partial_order() {
        let word = Automaton::from_word("ab");
        let star = Automaton::from_word("ab").star();
        assert!(word.included_in(&star));
        assert!(!star.included_in(&word));
        assert!(word.included_in(&word));
    }

    #[test]
    fn equivalence_ignores_the_shape() {
        let doubled = Automaton::from_word("a").union(&Automaton::from_word("a"));
        assert!(doubled.equivalent(&Automaton::from_word("a")));
        assert!(!doubled.equivalent(&Automaton::from_word("b")));
    }

    #[test]
    fn folds_over_collections() {
        let union = Automaton::union_all(["x", "y", "z"].map(Automaton::from_word)).unwrap();
        assert!(union.run("x") && union.run("y") && union.run("z"));
        let concat = Automaton::concat_all(["ab", "c"].map(Automaton::from_word)).unwrap();
        assert!(concat.run("abc"));
        let same = Automaton::intersection_all([
            Automaton::from_word("k").union(&Automaton::from_word("l")),
            Automaton::from_word("k").union(&Automaton::from_word("m")),
        ])
        .unwrap();
        assert!(same.equivalent(&Automaton::from_word("k")));
        let rest = Automaton::minus_all([
            Automaton::union_all(["x", "y", "z"].map(Automaton::from_word)).unwrap(),
            Automaton::from_word("y"),
            Automaton::from_word("z"),
        ])
        .unwrap();
        assert!(rest.equivalent(&Automaton::from_word("x")));
        assert!(Automaton::union_all([]).is_none());
    }
}

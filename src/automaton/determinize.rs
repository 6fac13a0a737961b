use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::automaton::NameSource;
use crate::prelude::*;

/// Subset construction and the closure primitives it is built from.
impl Automaton {
    /// Computes the ε-closure of a single state, that is all states reachable from
    /// `q` by following only ε transitions, including `q` itself.
    pub fn epsilon_closure(&self, q: StateId) -> OrderedSet<StateId> {
        self.epsilon_closure_of(OrderedSet::from([q]))
    }

    /// Closes the given set of states under ε transitions with a simple worklist.
    pub(crate) fn epsilon_closure_of(&self, set: OrderedSet<StateId>) -> OrderedSet<StateId> {
        let mut closure = set;
        let mut queue: VecDeque<StateId> = closure.iter().copied().collect();
        while let Some(q) = queue.pop_front() {
            for t in self.outgoing_from(q) {
                if t.is_epsilon() && closure.insert(t.target()) {
                    queue.push_back(t.target());
                }
            }
        }
        closure
    }

    /// Returns the set of states reachable from `set` by reading the character `chr`
    /// once, without any ε-closure applied.
    pub(crate) fn move_on(&self, set: &OrderedSet<StateId>, chr: char) -> OrderedSet<StateId> {
        set.iter()
            .flat_map(|q| self.outgoing_from(*q))
            .filter(|t| t.symbol() == Symbol::Char(chr))
            .map(|t| t.target())
            .collect()
    }

    /// The characters that some state in `set` can read, in ascending order.
    fn readable_characters_from(&self, set: &OrderedSet<StateId>) -> OrderedSet<char> {
        set.iter()
            .flat_map(|q| self.outgoing_from(*q))
            .filter_map(|t| t.symbol().as_char())
            .collect()
    }

    /// Returns true if this automaton is deterministic, meaning it has no ε
    /// transitions, at most one initial state and at most one transition per state
    /// and character.
    pub fn is_deterministic(&self) -> bool {
        if self.initial_states().len() > 1 {
            return false;
        }
        for q in self.states() {
            let mut seen = OrderedSet::new();
            for t in self.outgoing_from(q) {
                if t.is_epsilon() || !seen.insert(t.symbol()) {
                    return false;
                }
            }
        }
        true
    }

    /// Determinizes this automaton with the subset construction. The result accepts
    /// the same language, is deterministic and contains only reachable states. Its
    /// states are named `q0`, `q1`, ... in the order in which the construction
    /// discovers the corresponding subsets, with `q0` for the ε-closure of the
    /// initial states.
    ///
    /// An automaton without any initial state determinizes to a single rejecting
    /// state, the canonical shape of the empty language.
    pub fn determinize(&self) -> Automaton {
        debug!(
            "determinizing automaton with {} states and {} transitions",
            self.size(),
            self.transition_count()
        );
        let start = self.epsilon_closure_of(self.initial_states());

        let mut names = NameSource::new("q");
        let mut subsets: Bijection<OrderedSet<StateId>, StateId> = Bijection::new();
        let mut states = Vec::new();
        let mut transitions = Vec::new();
        let mut queue = VecDeque::new();

        let accepting = start.iter().any(|q| self.is_final(*q));
        states.push(State::new(names.fresh(), true, accepting));
        subsets.insert(start.clone(), 0);
        queue.push_back((start, 0));

        while let Some((subset, from)) = queue.pop_front() {
            for chr in self.readable_characters_from(&subset) {
                let target = self.epsilon_closure_of(self.move_on(&subset, chr));
                let to = match subsets.get_by_left(&target) {
                    Some(id) => *id,
                    None => {
                        let id = states.len();
                        let accepting = target.iter().any(|q| self.is_final(*q));
                        states.push(State::new(names.fresh(), false, accepting));
                        subsets.insert(target.clone(), id);
                        trace!("subset {} becomes state {}", StateId::show_collection(target.iter()), id);
                        queue.push_back((target, id));
                        id
                    }
                };
                transitions.push(Transition::on_char(from, to, chr));
            }
        }
        Automaton::from_parts(states, transitions)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn with_epsilons() -> Automaton {
        Automaton::from_parts(
            vec![
                State::new("q0", true, false),
                State::new("q1", false, false),
                State::new("q2", false, true),
            ],
            [
                Transition::epsilon(0, 1),
                Transition::on_char(1, 2, 'a'),
                Transition::on_char(0, 2, 'b'),
                Transition::epsilon(2, 1),
            ],
        )
    }

    #[test]
    fn closure_follows_epsilon_chains() {
        let automaton = with_epsilons();
        assert_eq!(automaton.epsilon_closure(0), OrderedSet::from([0, 1]));
        assert_eq!(automaton.epsilon_closure(2), OrderedSet::from([1, 2]));
        assert_eq!(automaton.epsilon_closure(1), OrderedSet::from([1]));
    }

    #[test_log::test]
    fn determinization_preserves_the_language() {
        let automaton = with_epsilons();
        let det = automaton.determinize();
        assert!(det.is_deterministic());
        for word in ["a", "b", "aa", "ba", "baa"] {
            assert!(automaton.run(word), "nfa rejects {word}");
            assert!(det.run(word), "dfa rejects {word}");
        }
        for word in ["", "ab", "c"] {
            assert!(!automaton.run(word));
            assert!(!det.run(word));
        }
    }

    #[test]
    fn determinization_merges_nondeterministic_branches() {
        let automaton = Automaton::from_parts(
            vec![
                State::new("q0", true, false),
                State::new("q1", false, false),
                State::new("q2", false, true),
            ],
            [
                Transition::on_char(0, 1, 'a'),
                Transition::on_char(0, 2, 'a'),
                Transition::on_char(1, 2, 'b'),
            ],
        );
        let det = automaton.determinize();
        assert!(det.is_deterministic());
        assert!(det.run("a") && det.run("ab"));
        assert!(!det.run("b") && !det.run("abb"));
    }

    #[test]
    fn determinized_states_are_named_in_discovery_order() {
        let det = Automaton::from_word("ab").determinize();
        assert_eq!(det.state(0).name(), "q0");
        assert!(det.state_named("q1").is_some());
        assert!(det.state_named("q2").is_some());
    }

    #[test]
    fn nondeterminism_detection() {
        assert!(Automaton::from_word("ab").is_deterministic());
        assert!(!with_epsilons().is_deterministic());
        let twin_initial = Automaton::from_parts(
            vec![State::new("a", true, true), State::new("b", true, false)],
            [],
        );
        assert!(!twin_initial.is_deterministic());
    }

    #[test]
    fn determinizing_without_initial_states_yields_the_empty_language() {
        let automaton = Automaton::from_parts(
            vec![State::new("q0", false, true)],
            [Transition::on_char(0, 0, 'a')],
        );
        let det = automaton.determinize();
        assert_eq!(det.size(), 1);
        assert!(det.final_states().is_empty());
        assert!(!det.run(""));
    }
}

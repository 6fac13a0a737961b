use std::collections::VecDeque;

use bit_set::BitSet;

use crate::prelude::*;

/// Traversals of the state graph. Everything here walks the adjacency index with an
/// explicit worklist or stack, so arbitrarily deep automata cannot exhaust the call
/// stack.
impl Automaton {
    /// Computes the set of states reachable from the initial states.
    pub(crate) fn reachable_states(&self) -> BitSet {
        let mut reachable = BitSet::with_capacity(self.size());
        let mut queue: VecDeque<StateId> = VecDeque::new();
        for q in self.initial_states() {
            reachable.insert(q);
            queue.push_back(q);
        }
        while let Some(q) = queue.pop_front() {
            for t in self.outgoing_from(q) {
                if reachable.insert(t.target()) {
                    queue.push_back(t.target());
                }
            }
        }
        reachable
    }

    /// Returns true if the transition graph contains a cycle, ε transitions
    /// included. Uses a depth first search with an explicit stack that keeps states
    /// open while their descendants are explored, a transition back into an open
    /// state is a cycle.
    pub fn has_cycle(&self) -> bool {
        let mut open = BitSet::with_capacity(self.size());
        let mut done = BitSet::with_capacity(self.size());
        for root in self.states() {
            if done.contains(root) {
                continue;
            }
            let mut stack: Vec<(StateId, bool)> = vec![(root, false)];
            while let Some((q, closing)) = stack.pop() {
                if closing {
                    open.remove(q);
                    done.insert(q);
                    continue;
                }
                if done.contains(q) || open.contains(q) {
                    continue;
                }
                open.insert(q);
                stack.push((q, true));
                for t in self.outgoing_from(q) {
                    let next = t.target();
                    if open.contains(next) {
                        return true;
                    }
                    if !done.contains(next) {
                        stack.push((next, false));
                    }
                }
            }
        }
        false
    }

    /// Computes a shortest path from the initial state to `target`, both endpoints
    /// included. All transitions count as one step regardless of their symbol.
    ///
    /// # Panics
    /// Panics if the automaton has no initial state or `target` cannot be reached
    /// from it.
    pub fn shortest_path(&self, target: StateId) -> Vec<StateId> {
        assert!(target < self.size(), "state {target} is outside of the arena");
        let source = self
            .initial_state()
            .expect("automaton must have an initial state");
        let mut distance: Map<StateId, usize> = Map::default();
        let mut predecessor: Map<StateId, StateId> = Map::default();
        let mut queue: OrderedSet<(usize, StateId)> = OrderedSet::new();
        distance.insert(source, 0);
        queue.insert((0, source));
        while let Some((dist, node)) = queue.pop_first() {
            if distance.get(&node) != Some(&dist) {
                continue;
            }
            for t in self.outgoing_from(node) {
                let next = t.target();
                let candidate = dist + 1;
                if distance.get(&next).map_or(true, |current| candidate < *current) {
                    if let Some(stale) = distance.insert(next, candidate) {
                        queue.remove(&(stale, next));
                    }
                    predecessor.insert(next, node);
                    queue.insert((candidate, next));
                }
            }
        }
        self.assemble_path(source, target, &predecessor)
    }

    /// Computes a longest path from the initial state to `target`, both endpoints
    /// included, by propagating distances along a topological order.
    ///
    /// # Panics
    /// Panics if the transition graph is cyclic, since longest paths are not defined
    /// there, if the automaton has no initial state, or if `target` cannot be
    /// reached from it.
    pub fn longest_path(&self, target: StateId) -> Vec<StateId> {
        assert!(target < self.size(), "state {target} is outside of the arena");
        assert!(
            !self.has_cycle(),
            "longest paths are only defined for acyclic automata"
        );
        let source = self
            .initial_state()
            .expect("automaton must have an initial state");
        let (_, predecessor) = self.longest_distances(source);
        self.assemble_path(source, target, &predecessor)
    }

    /// Longest distances from `source` to every reachable state, computed with a
    /// worklist topological sort followed by relaxation in that order. Only sound on
    /// acyclic graphs, the callers check that.
    fn longest_distances(&self, source: StateId) -> (Map<StateId, usize>, Map<StateId, StateId>) {
        let reachable = self.reachable_states();
        let mut indegree = vec![0usize; self.size()];
        for t in self.transitions() {
            if reachable.contains(t.source()) && reachable.contains(t.target()) {
                indegree[t.target()] += 1;
            }
        }
        let mut queue: VecDeque<StateId> = self
            .states()
            .filter(|q| reachable.contains(*q) && indegree[*q] == 0)
            .collect();
        let mut order = Vec::with_capacity(reachable.len());
        while let Some(q) = queue.pop_front() {
            order.push(q);
            for t in self.outgoing_from(q) {
                if reachable.contains(t.target()) {
                    indegree[t.target()] -= 1;
                    if indegree[t.target()] == 0 {
                        queue.push_back(t.target());
                    }
                }
            }
        }

        let mut distance: Map<StateId, usize> = Map::default();
        let mut predecessor: Map<StateId, StateId> = Map::default();
        distance.insert(source, 0);
        for q in order {
            let dist = match distance.get(&q) {
                Some(dist) => *dist,
                None => continue,
            };
            for t in self.outgoing_from(q) {
                let next = t.target();
                let candidate = dist + 1;
                if distance.get(&next).map_or(true, |current| candidate > *current) {
                    distance.insert(next, candidate);
                    predecessor.insert(next, q);
                }
            }
        }
        (distance, predecessor)
    }

    fn assemble_path(
        &self,
        source: StateId,
        target: StateId,
        predecessor: &Map<StateId, StateId>,
    ) -> Vec<StateId> {
        if target == source {
            return vec![source];
        }
        assert!(
            predecessor.contains_key(&target),
            "state {target} is not reachable from the initial state"
        );
        let mut path = vec![target];
        let mut current = target;
        while let Some(previous) = predecessor.get(&current) {
            path.push(*previous);
            current = *previous;
        }
        path.reverse();
        path
    }

    /// The length of a longest accepted word, or `None` if no bound exists. The
    /// bound does not exist when the transition graph is cyclic, and no length at
    /// all exists when the language is empty; both cases yield `None`. On automata
    /// with ε transitions the value counts steps rather than characters.
    pub fn max_word_len(&self) -> Option<usize> {
        if self.has_cycle() {
            return None;
        }
        let source = self.initial_state()?;
        let (distance, _) = self.longest_distances(source);
        self.final_states()
            .iter()
            .filter_map(|q| distance.get(q))
            .max()
            .copied()
    }

    /// Maps every reachable state to a shortest word spelling a path from the
    /// initial states to it, found by breadth first search. On automata with ε
    /// transitions the words are minimal in the number of transitions taken rather
    /// than in characters.
    pub fn minimal_representatives(&self) -> Map<StateId, String> {
        let mut words: Map<StateId, String> = Map::default();
        let mut queue: VecDeque<StateId> = VecDeque::new();
        for q in self.initial_states() {
            words.insert(q, String::new());
            queue.push_back(q);
        }
        while let Some(q) = queue.pop_front() {
            for t in self.outgoing_from(q) {
                if !words.contains_key(&t.target()) {
                    let mut word = words[&q].clone();
                    t.symbol().push_onto(&mut word);
                    words.insert(t.target(), word);
                    queue.push_back(t.target());
                }
            }
        }
        words
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn diamond() -> Automaton {
        // Two branches from q0 to q3, one of length 1 and one of length 2.
        Automaton::from_parts(
            vec![
                State::new("q0", true, false),
                State::new("q1", false, false),
                State::new("q2", false, false),
                State::new("q3", false, true),
            ],
            [
                Transition::on_char(0, 3, 'a'),
                Transition::on_char(0, 1, 'b'),
                Transition::on_char(1, 2, 'c'),
                Transition::on_char(2, 3, 'd'),
            ],
        )
    }

    #[test]
    fn chains_are_acyclic() {
        assert!(!Automaton::from_word("abc").has_cycle());
        assert!(!diamond().has_cycle());
    }

    #[test]
    fn loops_are_cycles() {
        assert!(Automaton::sigma_star().has_cycle());
        let automaton = Automaton::from_parts(
            vec![
                State::new("q0", true, false),
                State::new("q1", false, false),
                State::new("q2", false, true),
            ],
            [
                Transition::on_char(0, 1, 'a'),
                Transition::epsilon(1, 2),
                Transition::on_char(2, 0, 'b'),
            ],
        );
        assert!(automaton.has_cycle());
    }

    #[test]
    fn shortest_path_prefers_the_direct_branch() {
        assert_eq!(diamond().shortest_path(3), vec![0, 3]);
        assert_eq!(diamond().shortest_path(2), vec![0, 1, 2]);
        assert_eq!(diamond().shortest_path(0), vec![0]);
    }

    #[test]
    fn longest_path_prefers_the_detour() {
        assert_eq!(diamond().longest_path(3), vec![0, 1, 2, 3]);
        assert_eq!(diamond().longest_path(1), vec![0, 1]);
    }

    #[test]
    #[should_panic]
    fn path_queries_reject_unreachable_targets() {
        let automaton = Automaton::from_parts(
            vec![State::new("q0", true, true), State::new("q1", false, false)],
            [],
        );
        automaton.shortest_path(1);
    }

    #[test]
    #[should_panic]
    fn longest_paths_require_acyclicity() {
        Automaton::sigma_star().longest_path(0);
    }

    #[test]
    fn word_length_bounds() {
        assert_eq!(Automaton::from_word("abc").max_word_len(), Some(3));
        assert_eq!(diamond().max_word_len(), Some(3));
        assert_eq!(Automaton::sigma_star().max_word_len(), None);
        assert_eq!(Automaton::empty_string().max_word_len(), Some(0));
        let no_final = Automaton::from_parts(vec![State::new("q0", true, false)], []);
        assert_eq!(no_final.max_word_len(), None);
    }

    #[test]
    fn representatives_spell_shortest_access_words() {
        let words = Automaton::from_word("ab").minimal_representatives();
        assert_eq!(words[&0], "");
        assert_eq!(words[&1], "a");
        assert_eq!(words[&2], "ab");
        assert_eq!(diamond().minimal_representatives()[&3], "a");
    }
}

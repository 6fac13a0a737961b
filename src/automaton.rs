use crate::prelude::*;

mod algebra;
mod build;
mod determinize;
mod minimize;
mod reachability;
mod strings;

pub(crate) use build::NameSource;

/// Index of a state in the arena of an [`Automaton`]. Indices are dense, they always
/// range from zero to the number of states. All operations address states through
/// their index, the name attached to a state is display information and carries no
/// identity whatsoever.
pub type StateId = usize;

/// A state of an [`Automaton`]. Apart from its display name, a state knows whether it
/// is initial and whether it is final. Everything else about a state, in particular
/// its transitions, is stored by the automaton itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    name: String,
    initial: bool,
    accepting: bool,
}

impl State {
    /// Creates a new state with the given display name and flags.
    pub fn new(name: impl Into<String>, initial: bool, accepting: bool) -> Self {
        Self {
            name: name.into(),
            initial,
            accepting,
        }
    }

    /// Returns the display name of this state.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this state is an initial state.
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Returns true if this state is a final state.
    pub fn is_final(&self) -> bool {
        self.accepting
    }
}

/// A transition of an [`Automaton`], a triple of source state, target state and the
/// [`Symbol`] that labels it. Transitions are plain values, two transitions with the
/// same endpoints and symbol are the same transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    from: StateId,
    symbol: Symbol,
    to: StateId,
}

impl Transition {
    /// Creates a new transition from `from` to `to` labelled with `symbol`.
    pub fn new(from: StateId, to: StateId, symbol: Symbol) -> Self {
        Self { from, to, symbol }
    }

    /// Creates a new transition labelled with the character `chr`.
    pub fn on_char(from: StateId, to: StateId, chr: char) -> Self {
        Self::new(from, to, Symbol::Char(chr))
    }

    /// Creates a new ε transition.
    pub fn epsilon(from: StateId, to: StateId) -> Self {
        Self::new(from, to, Symbol::Epsilon)
    }

    /// The source state of this transition.
    pub fn source(&self) -> StateId {
        self.from
    }

    /// The target state of this transition.
    pub fn target(&self) -> StateId {
        self.to
    }

    /// The symbol labelling this transition.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Returns true if this transition is labelled with ε.
    pub fn is_epsilon(&self) -> bool {
        self.symbol.is_epsilon()
    }
}

impl Show for Transition {
    fn show(&self) -> String {
        format!("({}, {}, {})", self.from, self.symbol.show(), self.to)
    }

    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
        I::IntoIter: DoubleEndedIterator,
    {
        format!(
            "{{{}}}",
            itertools::Itertools::join(&mut iter.into_iter().map(|t| t.show()), ", ")
        )
    }
}

/// A finite-state automaton over character symbols, the core type of this crate.
///
/// States live in an arena and are addressed by their [`StateId`]. The transition
/// relation is a set of [`Transition`] triples, kept in canonical order so that all
/// derived constructions are reproducible. Alongside the relation the automaton
/// maintains an adjacency index from source state to outgoing transitions, which
/// is what all traversals operate on.
///
/// The representation is deliberately permissive. ε transitions, several initial
/// states and nondeterministic choice are all allowed, since the products of union,
/// concatenation and reversal pass through such intermediate shapes before they are
/// determinized or minimized again.
#[derive(Clone)]
pub struct Automaton {
    states: Vec<State>,
    delta: OrderedSet<Transition>,
    adjacency: Vec<OrderedSet<Transition>>,
}

impl Automaton {
    /// Creates a new automaton from a state arena and a transition relation. The
    /// index of a state in `states` is its [`StateId`].
    ///
    /// # Panics
    /// Panics if a transition refers to a state that is not part of the arena.
    pub fn from_parts(
        states: Vec<State>,
        transitions: impl IntoIterator<Item = Transition>,
    ) -> Self {
        let delta: OrderedSet<Transition> = transitions.into_iter().collect();
        for t in &delta {
            assert!(
                t.source() < states.len() && t.target() < states.len(),
                "transition {} refers to a state outside of the arena",
                t.show()
            );
        }
        let mut automaton = Self {
            states,
            delta,
            adjacency: Vec::new(),
        };
        automaton.rebuild_adjacency();
        automaton
    }

    pub(crate) fn rebuild_adjacency(&mut self) {
        let mut adjacency = vec![OrderedSet::new(); self.states.len()];
        for t in &self.delta {
            adjacency[t.source()].insert(*t);
        }
        self.adjacency = adjacency;
    }

    /// Replaces the entire transition relation and reindexes adjacency.
    pub(crate) fn replace_transitions(
        &mut self,
        transitions: impl IntoIterator<Item = Transition>,
    ) {
        self.delta = transitions.into_iter().collect();
        debug_assert!(self
            .delta
            .iter()
            .all(|t| t.source() < self.states.len() && t.target() < self.states.len()));
        self.rebuild_adjacency();
    }

    /// Appends a fresh state to the arena and returns its index.
    pub(crate) fn push_state(&mut self, state: State) -> StateId {
        self.states.push(state);
        self.adjacency.push(OrderedSet::new());
        self.states.len() - 1
    }

    /// Inserts a single transition, keeping the adjacency index up to date.
    pub(crate) fn insert_transition(&mut self, t: Transition) {
        assert!(
            t.source() < self.states.len() && t.target() < self.states.len(),
            "transition {} refers to a state outside of the arena",
            t.show()
        );
        if self.delta.insert(t) {
            self.adjacency[t.source()].insert(t);
        }
    }

    /// The number of states of this automaton.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns an iterator over all state indices.
    pub fn states(&self) -> std::ops::Range<StateId> {
        0..self.states.len()
    }

    /// Gives access to the [`State`] stored at index `q`.
    ///
    /// # Panics
    /// Panics if `q` is not a valid index.
    pub fn state(&self, q: StateId) -> &State {
        &self.states[q]
    }

    /// Looks up a state by its display name. Names carry no identity, this is only
    /// useful directly after parsing, before any operation has renamed states.
    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s.name() == name)
    }

    /// Returns true if `q` is an initial state.
    pub fn is_initial(&self, q: StateId) -> bool {
        self.states[q].is_initial()
    }

    /// Returns true if `q` is a final state.
    pub fn is_final(&self, q: StateId) -> bool {
        self.states[q].is_final()
    }

    /// Marks or unmarks `q` as initial.
    pub fn set_initial(&mut self, q: StateId, initial: bool) {
        self.states[q].initial = initial;
    }

    /// Marks or unmarks `q` as final.
    pub fn set_final(&mut self, q: StateId, accepting: bool) {
        self.states[q].accepting = accepting;
    }

    /// Returns the least initial state, if any.
    pub fn initial_state(&self) -> Option<StateId> {
        self.states().find(|q| self.is_initial(*q))
    }

    /// Returns all initial states in ascending order.
    pub fn initial_states(&self) -> OrderedSet<StateId> {
        self.states().filter(|q| self.is_initial(*q)).collect()
    }

    /// Returns all final states in ascending order.
    pub fn final_states(&self) -> OrderedSet<StateId> {
        self.states().filter(|q| self.is_final(*q)).collect()
    }

    /// Returns an iterator over the transition relation in canonical order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.delta.iter()
    }

    /// The number of transitions of this automaton.
    pub fn transition_count(&self) -> usize {
        self.delta.len()
    }

    /// The outgoing transitions of `q`, in canonical order. Since ε sorts before all
    /// characters, the ε-moves of `q` come first.
    ///
    /// # Panics
    /// Panics if `q` is not a valid index.
    pub fn outgoing_from(&self, q: StateId) -> &OrderedSet<Transition> {
        &self.adjacency[q]
    }

    /// Returns the set of characters that actually appear on transitions, in
    /// ascending order. ε does not count as a character.
    pub fn symbols(&self) -> OrderedSet<char> {
        self.delta.iter().filter_map(|t| t.symbol().as_char()).collect()
    }

    /// Decides whether this automaton accepts `input`. The automaton may be
    /// nondeterministic, the run tracks the full set of states that the prefix read
    /// so far can reach, closing under ε-moves after every step.
    pub fn run(&self, input: &str) -> bool {
        let mut current = self.epsilon_closure_of(self.initial_states());
        for chr in input.chars() {
            if current.is_empty() {
                return false;
            }
            let moved = self.move_on(&current, chr);
            current = self.epsilon_closure_of(moved);
        }
        current.iter().any(|q| self.is_final(*q))
    }

    /// Renders the automaton in the textual dump format: one header line per state
    /// carrying its acceptance verdict and initial marker, followed by one indented
    /// line per outgoing transition. States that have no transitions and are neither
    /// initial nor final are omitted.
    pub fn automaton_print(&self) -> String {
        let mut out = String::new();
        for q in self.states() {
            let state = self.state(q);
            if self.outgoing_from(q).is_empty() && !state.is_initial() && !state.is_final() {
                continue;
            }
            out.push_str(&format!(
                "[{}] [{}]{}\n",
                state.name(),
                if state.is_final() { "accept" } else { "reject" },
                if state.is_initial() { "[initial]" } else { "" }
            ));
            for t in self.outgoing_from(q) {
                out.push_str(&format!(
                    "\t{} {} -> {}\n",
                    state.name(),
                    t.symbol().show(),
                    self.state(t.target()).name()
                ));
            }
        }
        out
    }
}

impl std::fmt::Debug for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.automaton_print())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn branching() -> Automaton {
        Automaton::from_parts(
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
        )
    }

    #[test]
    fn adjacency_indexes_transitions_by_source() {
        let automaton = branching();
        assert_eq!(automaton.size(), 3);
        assert_eq!(automaton.transition_count(), 3);
        assert_eq!(automaton.outgoing_from(0).len(), 2);
        assert_eq!(automaton.outgoing_from(1).len(), 1);
        assert!(automaton.outgoing_from(2).is_empty());
        assert_eq!(automaton.symbols(), OrderedSet::from(['a', 'b']));
    }

    #[test]
    #[should_panic]
    fn transitions_must_stay_inside_the_arena() {
        Automaton::from_parts(
            vec![State::new("q0", true, true)],
            [Transition::on_char(0, 1, 'a')],
        );
    }

    #[test]
    fn nondeterministic_run_tracks_all_branches() {
        let automaton = branching();
        assert!(automaton.run("a"));
        assert!(automaton.run("ab"));
        assert!(!automaton.run(""));
        assert!(!automaton.run("b"));
        assert!(!automaton.run("abb"));
    }

    #[test]
    fn run_follows_epsilon_moves() {
        let automaton = Automaton::from_parts(
            vec![
                State::new("q0", true, false),
                State::new("q1", false, false),
                State::new("q2", false, true),
            ],
            [
                Transition::epsilon(0, 1),
                Transition::on_char(1, 2, 'x'),
                Transition::epsilon(2, 0),
            ],
        );
        assert!(automaton.run("x"));
        assert!(automaton.run("xx"));
        assert!(!automaton.run(""));
        assert!(!automaton.run("y"));
    }

    #[test]
    fn epsilon_moves_are_listed_first() {
        let automaton = Automaton::from_parts(
            vec![State::new("q0", true, false), State::new("q1", false, true)],
            [
                Transition::on_char(0, 0, 'a'),
                Transition::epsilon(0, 1),
            ],
        );
        let first = automaton.outgoing_from(0).iter().next().unwrap();
        assert!(first.is_epsilon());
    }

    #[test]
    fn print_contains_verdicts_and_transitions() {
        let automaton = branching();
        let dump = automaton.automaton_print();
        assert!(dump.contains("[q0] [reject][initial]"));
        assert!(dump.contains("[q2] [accept]"));
        assert!(dump.contains("\tq0 a -> q1"));
        assert!(dump.contains("\tq1 b -> q2"));
    }

    #[test]
    fn state_lookup_by_name_is_display_only() {
        let automaton = branching();
        assert_eq!(automaton.state_named("q1"), Some(1));
        assert_eq!(automaton.state_named("nope"), None);
    }
}

use crate::prelude::*;

/// Hands out fresh display names with a common prefix. Every operation that has to
/// invent state names creates its own source, so renaming is a purely local affair
/// and repeated runs of an operation produce identical output.
#[derive(Debug)]
pub(crate) struct NameSource {
    prefix: &'static str,
    next: usize,
}

impl NameSource {
    pub(crate) fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    pub(crate) fn fresh(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

/// Constructors for the basic building blocks. More involved automata are obtained
/// by combining these with the boolean operations.
impl Automaton {
    /// Builds the automaton that accepts precisely `word`, a chain of states with one
    /// transition per character. The empty word yields the same automaton as
    /// [`Automaton::empty_string`].
    pub fn from_word(word: &str) -> Self {
        let mut names = NameSource::new("q");
        let mut states = vec![State::new(names.fresh(), true, false)];
        let mut transitions = Vec::new();
        for chr in word.chars() {
            let next = states.len();
            states.push(State::new(names.fresh(), false, false));
            transitions.push(Transition::on_char(next - 1, next, chr));
        }
        let last = states.len() - 1;
        states[last].accepting = true;
        Self::from_parts(states, transitions)
    }

    /// Builds the automaton accepting only the empty word.
    pub fn empty_string() -> Self {
        Self::from_parts(vec![State::new("q0", true, true)], [])
    }

    /// Builds the automaton accepting no word at all. The single state rejects and
    /// loops on the whole universe alphabet, so the automaton is total.
    pub fn empty_language() -> Self {
        let loops = alphabet::universe().map(|chr| Transition::on_char(0, 0, chr));
        Self::from_parts(vec![State::new("q0", true, false)], loops)
    }

    /// Builds the automaton accepting every word over the universe alphabet.
    pub fn sigma_star() -> Self {
        let loops = alphabet::universe().map(|chr| Transition::on_char(0, 0, chr));
        Self::from_parts(vec![State::new("q0", true, true)], loops)
    }

    /// Builds the automaton accepting all words over the universe alphabet whose
    /// length is exactly `n`. Negative values are treated as zero, so any `n <= 0`
    /// gives the automaton for the empty word.
    pub fn exact_length_automaton(n: i64) -> Self {
        Self::length_chain(n, false)
    }

    /// Builds the automaton accepting all words over the universe alphabet whose
    /// length is at most `n`. Negative values are treated as zero.
    pub fn at_most_length_automaton(n: i64) -> Self {
        Self::length_chain(n, true)
    }

    fn length_chain(n: i64, all_accept: bool) -> Self {
        let steps = n.max(0) as usize;
        let mut names = NameSource::new("q");
        let mut states = Vec::with_capacity(steps + 1);
        let mut transitions = Vec::new();
        states.push(State::new(names.fresh(), true, all_accept || steps == 0));
        for step in 1..=steps {
            states.push(State::new(names.fresh(), false, all_accept || step == steps));
            for chr in alphabet::universe() {
                transitions.push(Transition::on_char(step - 1, step, chr));
            }
        }
        Self::from_parts(states, transitions)
    }
}

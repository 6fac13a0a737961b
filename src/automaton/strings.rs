use bit_set::BitSet;

use tracing::debug;

use crate::prelude::*;

/// String-theoretic operators on top of the boolean algebra. These are what an
/// abstract interpretation of string values actually calls; all of them treat an
/// automaton as a set of words and characterize the result through quotients of
/// that set.
impl Automaton {
    /// Builds the left quotient of `self` by `divisor`, the language of all words
    /// `w` such that `uw` is accepted by `self` for some `u` accepted by `divisor`.
    ///
    /// A state becomes an entry point of the result exactly if some word of
    /// `divisor` reaches it, which is probed by making the state the only final one
    /// and intersecting with `divisor`.
    pub fn left_quotient(&self, divisor: &Automaton) -> Automaton {
        let mut result = self.clone();
        for q in result.states() {
            result.set_initial(q, false);
        }
        let mut probe = self.clone();
        for q in probe.states() {
            probe.set_final(q, false);
        }
        for q in self.states() {
            probe.set_final(q, true);
            if !probe.intersection(divisor).is_empty_language() {
                result.set_initial(q, true);
            }
            probe.set_final(q, false);
        }
        result.minimize();
        result
    }

    /// Builds the right quotient of `self` by `divisor`, the language of all words
    /// `w` such that `wv` is accepted by `self` for some `v` accepted by `divisor`.
    pub fn right_quotient(&self, divisor: &Automaton) -> Automaton {
        let mut result = self.clone();
        for q in result.states() {
            result.set_final(q, false);
        }
        let mut probe = self.clone();
        for q in probe.states() {
            probe.set_initial(q, false);
        }
        for q in self.states() {
            probe.set_initial(q, true);
            if !probe.intersection(divisor).is_empty_language() {
                result.set_final(q, true);
            }
            probe.set_initial(q, false);
        }
        result.minimize();
        result
    }

    /// The language of all prefixes of accepted words, obtained by making every
    /// state final. The result is minimal.
    pub fn prefixes(&self) -> Automaton {
        let mut result = self.clone();
        for q in result.states() {
            result.set_final(q, true);
        }
        result.minimize();
        result
    }

    /// The language of all suffixes of accepted words, obtained by making every
    /// state initial. The result is minimal.
    pub fn suffixes(&self) -> Automaton {
        let mut result = self.clone();
        for q in result.states() {
            result.set_initial(q, true);
        }
        result.minimize();
        result
    }

    /// The prefixes of accepted words that consist of exactly `length` characters.
    pub fn prefixes_of_length(&self, length: i64) -> Automaton {
        self.prefixes()
            .intersection(&Automaton::exact_length_automaton(length))
    }

    /// The suffixes of accepted words that consist of exactly `length` characters.
    pub fn suffixes_of_length(&self, length: i64) -> Automaton {
        self.suffixes()
            .intersection(&Automaton::exact_length_automaton(length))
    }

    /// The suffixes obtained by chopping exactly `offset` characters off the front
    /// of every accepted word. Words shorter than `offset` contribute nothing. When
    /// no word is long enough the result degenerates to the empty word, mirroring
    /// how an out-of-range substring reads as the empty string.
    pub fn suffixes_at(&self, offset: i64) -> Automaton {
        let at = self.left_quotient(&self.prefixes_of_length(offset));
        if at.is_empty_language() {
            debug!("no word reaches offset {offset}, falling back to the empty word");
            Automaton::empty_string()
        } else {
            at
        }
    }

    /// Abstracts the substring between positions `i` and `j` of every accepted
    /// word. The bounds are swapped if given in the wrong order and clamped at
    /// zero. Words that end inside the requested range contribute their proper
    /// tail, so the result covers every string a concrete substring evaluation
    /// could produce.
    pub fn substring(&self, i: i64, j: i64) -> Automaton {
        let start = i.min(j).max(0);
        let end = i.max(j).max(0);
        let left = self.suffixes_at(start);
        let bounded = left.intersection(&Automaton::at_most_length_automaton(end - start));
        let exact = left
            .right_quotient(&self.suffixes_at(end))
            .intersection(&Automaton::exact_length_automaton(end - start));
        exact.union(&bounded)
    }

    /// Abstracts reading the single character at `position`, which is simply the
    /// substring of length one starting there.
    pub fn char_at(&self, position: i64) -> Automaton {
        self.substring(position, position + 1)
    }

    /// Substrings that start at position `i` and end anywhere between `i` and the
    /// position where the suffixes at `j` begin.
    pub fn substring_with_unknown_end(&self, i: i64, j: i64) -> Automaton {
        self.suffixes_at(i)
            .right_quotient(&self.suffixes_at(j).suffixes())
    }

    /// The language of all factors, that is all substrings at arbitrary positions,
    /// which are exactly the suffixes of the prefixes.
    pub fn factors(&self) -> Automaton {
        self.prefixes().suffixes()
    }

    /// The factors of the words remaining after chopping `offset` characters off
    /// the front.
    pub fn factors_starting_at(&self, offset: i64) -> Automaton {
        let left = self.left_quotient(&self.prefixes_of_length(offset));
        left.prefixes().suffixes()
    }

    /// The language of all single characters appearing on transitions. This
    /// abstracts which characters an accepted word can possibly contain.
    pub fn chars(&self) -> Automaton {
        let mut minimized = self.clone();
        minimized.minimize();
        let transitions: Vec<Transition> = minimized
            .transitions()
            .map(|t| Transition::new(0, 1, t.symbol()))
            .collect();
        let mut result = Automaton::from_parts(
            vec![State::new("q0", true, false), State::new("qf", false, true)],
            transitions,
        );
        result.minimize();
        result
    }

    /// Returns true if the language consists of exactly one word. After
    /// minimization this is the case precisely when the automaton is an acyclic
    /// chain with a single final state at its end.
    pub fn recognizes_exactly_one_word(&self) -> bool {
        let mut minimized = self.clone();
        minimized.minimize();
        !minimized.has_cycle()
            && minimized.final_states().len() == 1
            && minimized
                .states()
                .all(|q| minimized.outgoing_from(q).len() <= 1)
    }

    /// The words spelled by maximal paths of at most `bound` transitions starting
    /// in `q`. A path stops early only where a state has no outgoing transitions,
    /// so for `bound` of two an `a`-loop yields `aa` rather than `{a, aa}`. ε
    /// transitions count as a step but contribute no character.
    pub fn strings_at_most(&self, q: StateId, bound: usize) -> OrderedSet<String> {
        assert!(q < self.size(), "state {q} is outside of the arena");
        let mut row = self.bounded_words(bound);
        std::mem::take(&mut row[q])
    }

    /// Computes [`Automaton::strings_at_most`] for every state at once, iterating
    /// the defining recurrence bottom-up over the bound.
    fn bounded_words(&self, bound: usize) -> Vec<OrderedSet<String>> {
        let mut below: Vec<OrderedSet<String>> = vec![OrderedSet::new(); self.size()];
        for _ in 0..bound {
            let mut row = Vec::with_capacity(self.size());
            for state in self.states() {
                let mut words = OrderedSet::new();
                for t in self.outgoing_from(state) {
                    let mut partial = String::new();
                    t.symbol().push_onto(&mut partial);
                    let continuations = &below[t.target()];
                    if continuations.is_empty() {
                        words.insert(partial);
                    } else {
                        for next in continuations {
                            words.insert(format!("{partial}{next}"));
                        }
                    }
                }
                row.push(words);
            }
            below = row;
        }
        below
    }

    /// Widens this automaton by merging all states whose bounded lookahead
    /// languages coincide, where the lookahead follows paths of at most `bound`
    /// transitions. The result accepts a superset of the original language and is
    /// how a fixpoint iteration over growing string sets is forced to converge.
    pub fn widening(&self, bound: usize) -> Automaton {
        let lookahead = self.bounded_words(bound);
        let mut groups: OrderedMap<OrderedSet<String>, OrderedSet<StateId>> = OrderedMap::new();
        for q in self.states() {
            groups.entry(lookahead[q].clone()).or_default().insert(q);
        }
        debug!(
            "widening merges {} states into {} classes",
            self.size(),
            groups.len()
        );
        self.quotient(&Partition::new(groups.into_values()))
    }

    /// The maximal digit sequences readable from the initial state, where a single
    /// leading sign is also allowed. This abstracts which numbers a word can start
    /// with. Each state is expanded at most once, so the traversal terminates on
    /// cyclic automata.
    pub fn numeric_prefixes(&self) -> OrderedSet<String> {
        let source = match self.initial_state() {
            Some(source) => source,
            None => return OrderedSet::new(),
        };
        let mut visited = BitSet::with_capacity(self.size());
        visited.insert(source);

        // First pass carves a DFS tree out of the numeric subgraph. An edge whose
        // target was already visited contributes its character but is not entered.
        let mut preorder = vec![source];
        let mut tree: Vec<Vec<(char, Option<StateId>)>> = vec![Vec::new(); self.size()];
        let mut stack = vec![source];
        while let Some(q) = stack.pop() {
            for t in self.outgoing_from(q) {
                let chr = match t.symbol().as_char() {
                    Some(chr) => chr,
                    None => continue,
                };
                let allowed =
                    chr.is_ascii_digit() || ((chr == '+' || chr == '-') && q == source);
                if !allowed {
                    continue;
                }
                if visited.insert(t.target()) {
                    tree[q].push((chr, Some(t.target())));
                    preorder.push(t.target());
                    stack.push(t.target());
                } else {
                    tree[q].push((chr, None));
                }
            }
        }

        // Second pass folds the tree bottom-up. In reversed preorder every child is
        // handled before its parent.
        let mut words: Vec<OrderedSet<String>> = vec![OrderedSet::new(); self.size()];
        for q in preorder.iter().rev() {
            let mut acc = OrderedSet::new();
            for (chr, child) in &tree[*q] {
                let continuations = child.map(|c| &words[c]);
                match continuations {
                    Some(set) if !set.is_empty() => {
                        for word in set {
                            acc.insert(format!("{chr}{word}"));
                        }
                    }
                    _ => {
                        acc.insert(chr.to_string());
                    }
                }
            }
            words[*q] = acc;
        }
        std::mem::take(&mut words[source])
    }
}

use tracing::{debug, trace};

use crate::automaton::NameSource;
use crate::prelude::*;

/// Minimization. Three interchangeable algorithms are provided, they all leave the
/// automaton deterministic, reachable and minimal in the number of states.
impl Automaton {
    /// Minimizes this automaton in place using Brzozowski's double reversal, that is
    /// determinizing the reversal and then determinizing the reversal of the result.
    /// This needs nothing but the subset construction and therefore works directly
    /// on nondeterministic input.
    pub fn minimize(&mut self) {
        trace!(
            "minimizing automaton with {} states via double reversal",
            self.size()
        );
        self.reverse();
        let mut halfway = self.determinize();
        halfway.reverse();
        *self = halfway.determinize();
    }

    /// Minimizes this automaton in place with Hopcroft's partition refinement. The
    /// automaton is determinized first if necessary and unreachable states are
    /// dropped, since refinement only makes sense on reachable deterministic input.
    pub fn minimize_hopcroft(&mut self) {
        if !self.is_deterministic() {
            debug!("partition refinement needs deterministic input, determinizing first");
            *self = self.determinize();
        }
        self.remove_unreachable_states();

        let finals = self.final_states();
        let nonfinals: OrderedSet<StateId> = self.states().filter(|q| !self.is_final(*q)).collect();
        let mut partition: Vec<OrderedSet<StateId>> = Vec::new();
        if !finals.is_empty() {
            partition.push(finals.clone());
        }
        if !nonfinals.is_empty() {
            partition.push(nonfinals);
        }
        let mut worklist: Vec<OrderedSet<StateId>> = Vec::new();
        if !finals.is_empty() {
            worklist.push(finals);
        }

        while let Some(splitter) = worklist.pop() {
            for chr in self.symbols() {
                let incoming: OrderedSet<StateId> = self
                    .transitions()
                    .filter(|t| t.symbol() == Symbol::Char(chr) && splitter.contains(&t.target()))
                    .map(|t| t.source())
                    .collect();
                if incoming.is_empty() {
                    continue;
                }
                let split_classes: Vec<OrderedSet<StateId>> = partition
                    .iter()
                    .filter(|class| {
                        class.iter().any(|q| incoming.contains(q))
                            && class.iter().any(|q| !incoming.contains(q))
                    })
                    .cloned()
                    .collect();
                for class in split_classes {
                    let inside: OrderedSet<StateId> =
                        class.intersection(&incoming).copied().collect();
                    let outside: OrderedSet<StateId> =
                        class.difference(&incoming).copied().collect();
                    trace!(
                        "splitting {} into {} and {}",
                        StateId::show_collection(class.iter()),
                        StateId::show_collection(inside.iter()),
                        StateId::show_collection(outside.iter())
                    );
                    partition.retain(|c| *c != class);
                    partition.push(inside.clone());
                    partition.push(outside.clone());
                    if let Some(at) = worklist.iter().position(|c| *c == class) {
                        worklist.remove(at);
                        worklist.push(inside);
                        worklist.push(outside);
                    } else if inside.len() <= outside.len() {
                        worklist.push(inside);
                    } else {
                        worklist.push(outside);
                    }
                }
            }
        }
        *self = self.quotient(&Partition::new(partition));
    }

    /// Minimizes this automaton in place with Moore's algorithm, repeatedly
    /// refining the partition into final and non-final states by the transition
    /// signatures of the states until the partition stabilizes. Like
    /// [`Automaton::minimize_hopcroft`] this determinizes first when necessary.
    pub fn minimize_moore(&mut self) {
        if !self.is_deterministic() {
            debug!("signature refinement needs deterministic input, determinizing first");
            *self = self.determinize();
        }
        self.remove_unreachable_states();

        let finals = self.final_states();
        let nonfinals: OrderedSet<StateId> = self.states().filter(|q| !self.is_final(*q)).collect();
        let mut partition = Partition::new([finals, nonfinals]);
        loop {
            let refined = self.refine_by_signatures(&partition);
            if refined == partition {
                break;
            }
            partition = refined;
        }
        *self = self.quotient(&partition);
    }

    /// Splits every class of `partition` by the signatures of its states, where the
    /// signature of a state maps each readable character to the class its successor
    /// belongs to. States with equal signatures stay together.
    fn refine_by_signatures(&self, partition: &Partition<StateId>) -> Partition<StateId> {
        let mut classes: Vec<OrderedSet<StateId>> = Vec::new();
        for class in partition {
            let mut groups: OrderedMap<OrderedMap<char, usize>, OrderedSet<StateId>> =
                OrderedMap::new();
            for q in class {
                let signature: OrderedMap<char, usize> = self
                    .outgoing_from(*q)
                    .iter()
                    .filter_map(|t| {
                        t.symbol().as_char().map(|chr| {
                            (
                                chr,
                                partition
                                    .class_of(&t.target())
                                    .expect("partition covers every state"),
                            )
                        })
                    })
                    .collect();
                groups.entry(signature).or_default().insert(*q);
            }
            classes.extend(groups.into_values());
        }
        Partition::new(classes)
    }

    /// Collapses each class of `partition` into a single state. A merged state is
    /// initial if its class contains an initial state and final if its class
    /// contains a final state, transitions are remapped accordingly.
    pub(crate) fn quotient(&self, partition: &Partition<StateId>) -> Automaton {
        let mut remap = vec![usize::MAX; self.size()];
        for (index, class) in partition.iter().enumerate() {
            for q in class {
                remap[*q] = index;
            }
        }
        assert!(
            remap.iter().all(|class| *class != usize::MAX),
            "partition must cover every state"
        );
        let mut names = NameSource::new("p");
        let mut states = Vec::with_capacity(partition.size());
        for class in partition {
            states.push(State::new(
                names.fresh(),
                class.iter().any(|q| self.is_initial(*q)),
                class.iter().any(|q| self.is_final(*q)),
            ));
        }
        let transitions: Vec<Transition> = self
            .transitions()
            .map(|t| Transition::new(remap[t.source()], remap[t.target()], t.symbol()))
            .collect();
        Automaton::from_parts(states, transitions)
    }

    /// Drops every state that cannot be reached from an initial state, along with
    /// all transitions touching such a state. The surviving states keep their
    /// relative order and are reindexed densely.
    pub fn remove_unreachable_states(&mut self) {
        let reachable = self.reachable_states();
        if reachable.len() == self.size() {
            return;
        }
        debug!(
            "pruning {} unreachable of {} states",
            self.size() - reachable.len(),
            self.size()
        );
        let mut remap: Vec<Option<StateId>> = vec![None; self.size()];
        let mut states = Vec::with_capacity(reachable.len());
        for q in self.states() {
            if reachable.contains(q) {
                remap[q] = Some(states.len());
                states.push(self.state(q).clone());
            }
        }
        let transitions: Vec<Transition> = self
            .transitions()
            .filter_map(|t| match (remap[t.source()], remap[t.target()]) {
                (Some(from), Some(to)) => Some(Transition::new(from, to, t.symbol())),
                _ => None,
            })
            .collect();
        *self = Automaton::from_parts(states, transitions);
    }
}

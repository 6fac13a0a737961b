use itertools::Itertools;

use crate::prelude::*;

/// A regular expression over the same symbols as [`Automaton`]. This is the term
/// algebra that regex synthesis produces, together with just enough rewriting to
/// keep the synthesized terms small.
///
/// Alternation is kept in a normalized shape, the operand list is flattened,
/// deduplicated and sorted, which makes structural equality commutative and
/// associative. Concatenation stays a binary node, except that adjacent literals
/// are merged into a single one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegularExpression {
    /// The empty language, accepting no word at all.
    Empty,
    /// A literal word, where the empty literal denotes ε.
    Ground(String),
    /// The language of a state, only present while an equation system is being
    /// solved. A fully solved expression contains no variables.
    Var(StateId),
    /// Alternation over at least two distinct normalized operands.
    Or(Vec<RegularExpression>),
    /// Concatenation of two expressions.
    Comp(Box<RegularExpression>, Box<RegularExpression>),
    /// Kleene closure of an expression.
    Star(Box<RegularExpression>),
}

impl RegularExpression {
    /// The empty word.
    pub fn epsilon() -> Self {
        Self::Ground(String::new())
    }

    /// A literal word.
    pub fn ground(word: impl Into<String>) -> Self {
        Self::Ground(word.into())
    }

    /// The literal for a transition symbol, which is ε for the ε symbol.
    pub fn symbol(symbol: Symbol) -> Self {
        let mut word = String::new();
        symbol.push_onto(&mut word);
        Self::Ground(word)
    }

    /// Returns true if this expression is the literal empty word.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Self::Ground(word) if word.is_empty())
    }

    /// Returns true if no [`RegularExpression::Var`] occurs in this expression.
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Empty | Self::Ground(_) => true,
            Self::Var(_) => false,
            Self::Or(items) => items.iter().all(Self::is_ground),
            Self::Comp(lhs, rhs) => lhs.is_ground() && rhs.is_ground(),
            Self::Star(inner) => inner.is_ground(),
        }
    }

    /// Returns true if the variable for state `q` occurs in this expression.
    pub fn contains_var(&self, q: StateId) -> bool {
        match self {
            Self::Empty | Self::Ground(_) => false,
            Self::Var(v) => *v == q,
            Self::Or(items) => items.iter().any(|e| e.contains_var(q)),
            Self::Comp(lhs, rhs) => lhs.contains_var(q) || rhs.contains_var(q),
            Self::Star(inner) => inner.contains_var(q),
        }
    }

    /// Collects the variables occurring in this expression.
    pub fn vars(&self) -> OrderedSet<StateId> {
        fn collect(expr: &RegularExpression, into: &mut OrderedSet<StateId>) {
            match expr {
                RegularExpression::Empty | RegularExpression::Ground(_) => {}
                RegularExpression::Var(v) => {
                    into.insert(*v);
                }
                RegularExpression::Or(items) => items.iter().for_each(|e| collect(e, into)),
                RegularExpression::Comp(lhs, rhs) => {
                    collect(lhs, into);
                    collect(rhs, into);
                }
                RegularExpression::Star(inner) => collect(inner, into),
            }
        }
        let mut vars = OrderedSet::new();
        collect(self, &mut vars);
        vars
    }

    /// Builds the alternation of the given operands in normalized shape: nested
    /// alternations are flattened, the empty language is dropped, duplicates are
    /// removed and the remaining operands are sorted. No operand leaves the empty
    /// language, a single operand is returned as is.
    pub fn alternation(operands: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        let mut stack: Vec<Self> = operands.into_iter().collect();
        while let Some(operand) = stack.pop() {
            match operand {
                Self::Empty => {}
                Self::Or(items) => stack.extend(items),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();
        match flat.len() {
            0 => Self::Empty,
            1 => flat.swap_remove(0),
            _ => Self::Or(flat),
        }
    }

    /// Builds the alternation of two expressions, see [`RegularExpression::alternation`].
    pub fn or(self, other: Self) -> Self {
        Self::alternation([self, other])
    }

    /// Builds the concatenation of two expressions. The empty language swallows
    /// both sides, ε is the neutral element and adjacent literals fuse into one.
    pub fn cat(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, _) | (_, Self::Empty) => Self::Empty,
            (lhs, rhs) if lhs.is_epsilon() => rhs,
            (lhs, rhs) if rhs.is_epsilon() => lhs,
            (Self::Ground(lhs), Self::Ground(rhs)) => Self::Ground(format!("{lhs}{rhs}")),
            (lhs, rhs) => Self::Comp(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Builds the Kleene closure of this expression. Closing the empty language or
    /// ε gives ε, and closing a closure changes nothing.
    pub fn star(self) -> Self {
        match self {
            Self::Empty => Self::epsilon(),
            expr if expr.is_epsilon() => Self::epsilon(),
            Self::Star(inner) => Self::Star(inner),
            other => Self::Star(Box::new(other)),
        }
    }

    /// Substitutes `with` for every occurrence of the variable for `q`. The result
    /// is rebuilt through the normalizing constructors, so the substitution also
    /// simplifies on the way.
    pub fn replace(&self, q: StateId, with: &Self) -> Self {
        match self {
            Self::Empty | Self::Ground(_) => self.clone(),
            Self::Var(v) if *v == q => with.clone(),
            Self::Var(_) => self.clone(),
            Self::Or(items) => Self::alternation(items.iter().map(|e| e.replace(q, with))),
            Self::Comp(lhs, rhs) => lhs.replace(q, with).cat(rhs.replace(q, with)),
            Self::Star(inner) => inner.replace(q, with).star(),
        }
    }

    /// Extracts a common left factor of the two expressions, if one exists. Both
    /// operands either are the factor themselves or start with it as the head of a
    /// concatenation.
    pub fn factorize(&self, other: &Self) -> Option<Self> {
        if self == other {
            return Some(self.clone());
        }
        let head = |expr: &Self| match expr {
            Self::Comp(lhs, _) => Some((**lhs).clone()),
            _ => None,
        };
        match (head(self), head(other)) {
            (Some(lhs), Some(rhs)) if lhs == rhs => Some(lhs),
            (Some(lhs), None) if lhs == *other => Some(lhs),
            (None, Some(rhs)) if rhs == *self => Some(rhs),
            _ => None,
        }
    }

    /// What remains of this expression after peeling the left `factor` off, ε if
    /// the expression is the factor itself.
    fn behind(&self, factor: &Self) -> Self {
        if self == factor {
            return Self::epsilon();
        }
        match self {
            Self::Comp(lhs, rhs) if **lhs == *factor => (**rhs).clone(),
            _ => self.clone(),
        }
    }

    /// Rewrites this expression into a smaller equivalent shape. Children are
    /// simplified first, then alternations merge operands that share a left factor
    /// and drop an ε operand when a closure operand already contains it.
    pub fn simplify(&self) -> Self {
        match self {
            Self::Empty | Self::Ground(_) | Self::Var(_) => self.clone(),
            Self::Star(inner) => inner.simplify().star(),
            Self::Comp(lhs, rhs) => lhs.simplify().cat(rhs.simplify()),
            Self::Or(items) => {
                let mut operands: Vec<Self> = items.iter().map(Self::simplify).collect();
                loop {
                    let merge = operands
                        .iter()
                        .enumerate()
                        .tuple_combinations()
                        .find_map(|((i, lhs), (j, rhs))| {
                            lhs.factorize(rhs).map(|common| (i, j, common))
                        });
                    match merge {
                        Some((i, j, common)) => {
                            let merged = common
                                .clone()
                                .cat(operands[i].behind(&common).or(operands[j].behind(&common)));
                            operands.remove(j);
                            operands.remove(i);
                            operands.push(merged);
                        }
                        None => break,
                    }
                }
                if operands.iter().any(|e| matches!(e, Self::Star(_))) {
                    operands.retain(|e| !e.is_epsilon());
                }
                Self::alternation(operands)
            }
        }
    }

    /// Compiles this expression into an automaton accepting its language, by
    /// composing the constructions for the operators bottom-up. The result is
    /// minimal since every composition step minimizes.
    ///
    /// # Panics
    /// Panics if the expression still contains a variable.
    pub fn to_automaton(&self) -> Automaton {
        match self {
            Self::Empty => Automaton::empty_language(),
            Self::Ground(word) => Automaton::from_word(word),
            Self::Var(_) => panic!("cannot build an automaton from an unresolved variable"),
            Self::Or(items) => Automaton::union_all(items.iter().map(Self::to_automaton))
                .unwrap_or_else(Automaton::empty_language),
            Self::Comp(lhs, rhs) => lhs.to_automaton().concat(&rhs.to_automaton()),
            Self::Star(inner) => inner.to_automaton().star(),
        }
    }
}

impl std::fmt::Display for RegularExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "∅"),
            Self::Ground(word) if word.is_empty() => write!(f, "ε"),
            Self::Ground(word) => write!(f, "{word}"),
            Self::Var(q) => write!(f, "x{q}"),
            Self::Or(items) => write!(f, "({})", items.iter().join(" + ")),
            Self::Comp(lhs, rhs) => write!(f, "{lhs}{rhs}"),
            Self::Star(inner) => match inner.as_ref() {
                Self::Or(_) => write!(f, "{inner}*"),
                Self::Ground(word) if word.chars().count() == 1 => write!(f, "{inner}*"),
                _ => write!(f, "({inner})*"),
            },
        }
    }
}

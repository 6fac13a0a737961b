//! Plain-text loaders constructing an [`Automaton`] from a serialized
//! description. Two formats are understood, a terse line based one and a
//! sectioned interchange format, see [`parse_line_format`] and
//! [`parse_interchange_format`]. Both validate the structure of their input and
//! report the first violation they encounter.

use tracing::warn;

use crate::prelude::*;

/// The ways in which a serialized automaton description can be structurally
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A state name is used before it was declared.
    #[error("line {line}: reference to unknown state {name:?}")]
    UnknownState {
        /// The 1-based line number on which the reference appears.
        line: usize,
        /// The undeclared state name.
        name: String,
    },
    /// A transition line does not follow the format of its loader.
    #[error("line {line}: malformed transition {text:?}")]
    MalformedTransition {
        /// The 1-based line number of the malformed transition.
        line: usize,
        /// The offending line's text.
        text: String,
    },
    /// A content line appears before any section header.
    #[error("line {line}: {text:?} does not belong to any section")]
    OutsideSection {
        /// The 1-based line number of the stray content.
        line: usize,
        /// The offending line's text.
        text: String,
    },
    /// A part of the description that the format requires is absent.
    #[error("the description is missing its {0}")]
    MissingSection(&'static str),
}

fn resolve(index: &Map<&str, StateId>, name: &str, line: usize) -> Result<StateId, ParseError> {
    index.get(name).copied().ok_or_else(|| ParseError::UnknownState {
        line,
        name: name.to_string(),
    })
}

/// Parses the line based format: the first line lists all state names, the
/// second the initial states and the third the final states, each separated by
/// whitespace. Every following line is one transition `from to symbol` with a
/// single character symbol. The format cannot express ε transitions.
///
/// ```
/// use automata_strings::prelude::*;
///
/// let automaton = parse_line_format("q0 q1\nq0\nq1\nq0 q1 a").unwrap();
/// assert!(automaton.run("a"));
/// ```
pub fn parse_line_format(description: &str) -> Result<Automaton, ParseError> {
    let mut lines = description.lines();
    let state_line = lines.next().ok_or(ParseError::MissingSection("state names"))?;
    let initial_line = lines
        .next()
        .ok_or(ParseError::MissingSection("initial states"))?;
    let final_line = lines.next().ok_or(ParseError::MissingSection("final states"))?;

    let mut names = Vec::new();
    let mut index: Map<&str, StateId> = Map::default();
    for name in state_line.split_whitespace() {
        if index.contains_key(name) {
            warn!("state {name:?} is declared twice, keeping the first declaration");
            continue;
        }
        index.insert(name, names.len());
        names.push(name);
    }

    let mut initial = OrderedSet::new();
    for name in initial_line.split_whitespace() {
        initial.insert(resolve(&index, name, 2)?);
    }
    let mut accepting = OrderedSet::new();
    for name in final_line.split_whitespace() {
        accepting.insert(resolve(&index, name, 3)?);
    }

    let mut transitions = Vec::new();
    for (offset, line) in lines.enumerate() {
        let number = offset + 4;
        if line.trim().is_empty() {
            continue;
        }
        let mut pieces = line.split_whitespace();
        let (Some(from), Some(to), Some(symbol), None) =
            (pieces.next(), pieces.next(), pieces.next(), pieces.next())
        else {
            return Err(ParseError::MalformedTransition {
                line: number,
                text: line.to_string(),
            });
        };
        let from = resolve(&index, from, number)?;
        let to = resolve(&index, to, number)?;
        let mut chars = symbol.chars();
        let (Some(chr), None) = (chars.next(), chars.next()) else {
            return Err(ParseError::MalformedTransition {
                line: number,
                text: line.to_string(),
            });
        };
        transitions.push(Transition::on_char(from, to, chr));
    }

    Ok(assemble(names, &initial, &accepting, transitions))
}

enum Section {
    States,
    Initial,
    Accepting,
    Alphabet,
    Transitions,
}

/// Parses the sectioned interchange format. The headers `#states`, `#initial`,
/// `#accepting`, `#alphabet` and `#transitions` each open a section; within the
/// first three every line is one state name, the alphabet section is ignored
/// since the symbols are evident from the transitions, and transition lines
/// read `from:symbol>to` with a comma separated target list and `$` denoting ε.
///
/// State names may contain spaces. Blank lines are skipped, a `#states` section
/// is required and content before the first header is rejected.
pub fn parse_interchange_format(description: &str) -> Result<Automaton, ParseError> {
    let mut section = None;
    let mut names = Vec::new();
    let mut index: Map<&str, StateId> = Map::default();
    let mut initial = OrderedSet::new();
    let mut accepting = OrderedSet::new();
    let mut transitions = Vec::new();
    let mut saw_states = false;

    for (offset, raw) in description.lines().enumerate() {
        let number = offset + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "#states" => {
                section = Some(Section::States);
                saw_states = true;
                continue;
            }
            "#initial" => {
                section = Some(Section::Initial);
                continue;
            }
            "#accepting" => {
                section = Some(Section::Accepting);
                continue;
            }
            "#alphabet" => {
                section = Some(Section::Alphabet);
                continue;
            }
            "#transitions" => {
                section = Some(Section::Transitions);
                continue;
            }
            _ => {}
        }
        match section {
            None => {
                return Err(ParseError::OutsideSection {
                    line: number,
                    text: line.to_string(),
                })
            }
            Some(Section::States) => {
                if index.contains_key(line) {
                    warn!("line {number}: state {line:?} is declared twice, keeping the first declaration");
                } else {
                    index.insert(line, names.len());
                    names.push(line);
                }
            }
            Some(Section::Initial) => {
                initial.insert(resolve(&index, line, number)?);
            }
            Some(Section::Accepting) => {
                accepting.insert(resolve(&index, line, number)?);
            }
            Some(Section::Alphabet) => {}
            Some(Section::Transitions) => {
                let malformed = || ParseError::MalformedTransition {
                    line: number,
                    text: line.to_string(),
                };
                let (head, targets) = line.split_once('>').ok_or_else(malformed)?;
                let (source, symbol) = head.split_once(':').ok_or_else(malformed)?;
                if targets.is_empty() {
                    return Err(malformed());
                }
                let from = resolve(&index, source, number)?;
                let symbol = if symbol == "$" {
                    Symbol::Epsilon
                } else {
                    let mut chars = symbol.chars();
                    match (chars.next(), chars.next()) {
                        (Some(chr), None) => Symbol::Char(chr),
                        _ => return Err(malformed()),
                    }
                };
                for target in targets.split(',') {
                    let to = resolve(&index, target, number)?;
                    transitions.push(Transition::new(from, to, symbol));
                }
            }
        }
    }

    if !saw_states {
        return Err(ParseError::MissingSection("#states section"));
    }
    Ok(assemble(names, &initial, &accepting, transitions))
}

fn assemble(
    names: Vec<&str>,
    initial: &OrderedSet<StateId>,
    accepting: &OrderedSet<StateId>,
    transitions: Vec<Transition>,
) -> Automaton {
    let states = names
        .into_iter()
        .enumerate()
        .map(|(q, name)| State::new(name, initial.contains(&q), accepting.contains(&q)))
        .collect();
    Automaton::from_parts(states, transitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFIX_ABB: &str = "#states\ns0\ns1\ns2\ns3\n#initial\ns0\n#accepting\ns3\n#transitions\ns0:a>s0,s1\ns0:b>s0\ns1:b>s2\ns2:b>s3\n";

    #[test]
    fn the_line_format_builds_the_described_automaton() {
        let automaton = parse_line_format("q0 q1 q2\nq0\nq2\nq0 q1 a\nq1 q2 b").unwrap();
        assert_eq!(automaton.size(), 3);
        assert_eq!(automaton.initial_states(), OrderedSet::from([0]));
        assert_eq!(automaton.final_states(), OrderedSet::from([2]));
        assert!(automaton.equivalent(&Automaton::from_word("ab")));
    }

    #[test]
    fn the_line_format_rejects_unknown_states() {
        assert_eq!(
            parse_line_format("q0\nq1\nq0").unwrap_err(),
            ParseError::UnknownState {
                line: 2,
                name: "q1".to_string()
            }
        );
        assert_eq!(
            parse_line_format("q0\nq0\nq0\nq0 q7 a").unwrap_err(),
            ParseError::UnknownState {
                line: 4,
                name: "q7".to_string()
            }
        );
    }

    #[test]
    fn the_line_format_rejects_malformed_transitions() {
        let short = parse_line_format("q0\nq0\nq0\nq0 q0");
        assert!(matches!(short, Err(ParseError::MalformedTransition { line: 4, .. })));
        let long = parse_line_format("q0\nq0\nq0\nq0 q0 a b");
        assert!(matches!(long, Err(ParseError::MalformedTransition { .. })));
        let wide = parse_line_format("q0\nq0\nq0\nq0 q0 ab");
        assert!(matches!(wide, Err(ParseError::MalformedTransition { .. })));
    }

    #[test]
    fn the_line_format_needs_its_three_header_lines() {
        assert_eq!(
            parse_line_format("q0\nq0").unwrap_err(),
            ParseError::MissingSection("final states")
        );
        assert_eq!(
            parse_line_format("").unwrap_err(),
            ParseError::MissingSection("state names")
        );
    }

    #[test]
    fn duplicate_declarations_keep_the_first_state() {
        let automaton = parse_line_format("q0 q0\nq0\nq0\n").unwrap();
        assert_eq!(automaton.size(), 1);
    }

    #[test]
    fn the_interchange_format_builds_the_described_automaton() {
        let description = "#states\np0\np1\n#initial\np0\n#accepting\np1\n#alphabet\na\n#transitions\np0:a>p0,p1\np0:$>p1\n";
        let automaton = parse_interchange_format(description).unwrap();
        assert_eq!(automaton.size(), 2);
        assert_eq!(automaton.transition_count(), 3);
        assert!(automaton.run(""));
        assert!(automaton.run("aaa"));
        assert!(automaton.equivalent(&Automaton::from_word("a").star()));
    }

    #[test]
    fn the_interchange_format_rejects_structural_violations() {
        assert!(matches!(
            parse_interchange_format("p0\n#states\np0"),
            Err(ParseError::OutsideSection { line: 1, .. })
        ));
        assert!(matches!(
            parse_interchange_format("#states\np0\n#transitions\np0 a p0"),
            Err(ParseError::MalformedTransition { .. })
        ));
        assert!(matches!(
            parse_interchange_format("#states\np0\n#transitions\np0:a>"),
            Err(ParseError::MalformedTransition { .. })
        ));
        assert!(matches!(
            parse_interchange_format("#states\np0\n#transitions\np0:a>p9"),
            Err(ParseError::UnknownState { name, .. }) if name == "p9"
        ));
        assert_eq!(
            parse_interchange_format("#initial\n").unwrap_err(),
            ParseError::MissingSection("#states section")
        );
    }

    #[test]
    fn errors_render_with_their_position() {
        let error = parse_line_format("q0\nq1\nq0").unwrap_err();
        assert_eq!(error.to_string(), "line 2: reference to unknown state \"q1\"");
    }

    #[test_log::test]
    fn minimizing_a_loaded_reference_automaton_agrees_across_algorithms() {
        let reference = Automaton::from_word("a")
            .union(&Automaton::from_word("b"))
            .star()
            .concat(&Automaton::from_word("abb"));

        let brzozowski = {
            let mut automaton = parse_interchange_format(SUFFIX_ABB).unwrap();
            automaton.minimize();
            automaton
        };
        let hopcroft = {
            let mut automaton = parse_interchange_format(SUFFIX_ABB).unwrap();
            automaton.minimize_hopcroft();
            automaton
        };
        let moore = {
            let mut automaton = parse_interchange_format(SUFFIX_ABB).unwrap();
            automaton.minimize_moore();
            automaton
        };

        for minimized in [&brzozowski, &hopcroft, &moore] {
            assert_eq!(minimized.size(), 4);
            assert!(minimized.equivalent(&reference));
        }
    }
}

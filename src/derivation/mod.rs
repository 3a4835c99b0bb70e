/*
    This module decides whether a string of terminal tokens can be
    derived from a grammar's start symbol.

    The search rewrites the leftmost frontier symbol at every step and
    tries the productions of a nonterminal in declaration order, so the
    first full derivation found is the same on every run. Backtracking is
    driven by an explicit stack of choice points instead of native
    recursion, which lets a step budget cut off grammars that rewrite a
    nonterminal to itself without consuming input
*/

use std::fmt::Display;

use itertools::Itertools;

use crate::grammar::{Grammar, Symbol};
use crate::tree::{self, DerivationTree};

// Generous default for small grammars and short strings; the shell can
// override it
pub const DEFAULT_STEP_BUDGET: usize = 100_000;

// One committed rewrite along the winning path: the index of the applied
// production, with `at` tokens of the input already consumed
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Application {
    pub at: usize,
    pub production: usize,
}

#[derive(Debug, PartialEq)]
pub enum MatchResult {
    Match(Vec<Application>),
    NoMatch,
}

#[derive(Debug, PartialEq)]
pub enum TestOutcome {
    Accepted(DerivationTree),
    Rejected,
}

#[derive(Debug, PartialEq)]
pub enum DeriveError {
    // The budget ran out before the search resolved either way
    BudgetExceeded { steps: usize },
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeriveError::BudgetExceeded { steps } => write!(
                f,
                "Gave up after {steps} search steps; the grammar may contain a cycle that consumes no input"
            ),
        }
    }
}

// The alternatives still open for one expansion of a nonterminal.
// Restoring the saved fields undoes everything tried since the expansion
struct ChoicePoint {
    frontier: Vec<Symbol>,
    consumed: usize,
    trace_len: usize,
    candidates: Vec<usize>,
    next: usize,
}

struct SearchState {
    // The not-yet-matched left-to-right rewrite of the start symbol
    frontier: Vec<Symbol>,
    // How many input tokens have been matched so far
    consumed: usize,
    trace: Vec<Application>,
}

pub struct DerivationEngine {
    max_steps: usize,
}

impl Default for DerivationEngine {
    fn default() -> Self {
        DerivationEngine {
            max_steps: DEFAULT_STEP_BUDGET,
        }
    }
}

impl DerivationEngine {
    pub fn new(max_steps: usize) -> Self {
        DerivationEngine { max_steps }
    }

    // Searches for a leftmost derivation of `input`. On a match, the
    // returned trace is enough to rebuild the derivation tree without
    // running the search again
    pub fn derive(&self, grammar: &Grammar, input: &[String]) -> Result<MatchResult, DeriveError> {
        let mut state = SearchState {
            frontier: vec![Symbol::Nonterminal(grammar.start.clone())],
            consumed: 0,
            trace: Vec::new(),
        };
        let mut choices: Vec<ChoicePoint> = Vec::new();
        let mut steps = 0;

        loop {
            steps += 1;
            if steps > self.max_steps {
                return Err(DeriveError::BudgetExceeded { steps: self.max_steps });
            }

            match state.frontier.first().cloned() {
                // The frontier and the input must run out together
                None => {
                    if state.consumed == input.len() {
                        return Ok(MatchResult::Match(state.trace));
                    }
                    if !backtrack(grammar, &mut state, &mut choices) {
                        return Ok(MatchResult::NoMatch);
                    }
                }
                // Terminals are matched, never chosen: a mismatch is an
                // immediate dead end for this path
                Some(Symbol::Terminal(terminal)) => {
                    if input.get(state.consumed) == Some(&terminal) {
                        state.consumed += 1;
                        state.frontier.remove(0);
                    } else if !backtrack(grammar, &mut state, &mut choices) {
                        return Ok(MatchResult::NoMatch);
                    }
                }
                // Epsilon right sides splice nothing into the frontier,
                // so this symbol never sits there; skip it if it does
                Some(Symbol::Epsilon) => {
                    state.frontier.remove(0);
                }
                Some(Symbol::Nonterminal(nonterminal)) => {
                    let candidates = grammar
                        .productions_for(&nonterminal)
                        .map(|(index, _)| index)
                        .collect_vec();
                    choices.push(ChoicePoint {
                        frontier: state.frontier.clone(),
                        consumed: state.consumed,
                        trace_len: state.trace.len(),
                        candidates,
                        next: 0,
                    });
                    // A nonterminal with no productions leaves the fresh
                    // choice point empty and backtracks right away
                    if !backtrack(grammar, &mut state, &mut choices) {
                        return Ok(MatchResult::NoMatch);
                    }
                }
            }
        }
    }
}

// Restores the most recent choice point that still has an untried
// alternative and applies that alternative. Returns false once every
// choice point is exhausted
fn backtrack(grammar: &Grammar, state: &mut SearchState, choices: &mut Vec<ChoicePoint>) -> bool {
    while let Some(choice) = choices.last_mut() {
        if choice.next < choice.candidates.len() {
            let index = choice.candidates[choice.next];
            choice.next += 1;
            state.frontier = choice.frontier.clone();
            state.consumed = choice.consumed;
            state.trace.truncate(choice.trace_len);
            apply(grammar, state, index);
            return true;
        }
        choices.pop();
    }

    return false;
}

// Replaces the leftmost frontier symbol with the production's right
// side. An epsilon right side contributes nothing
fn apply(grammar: &Grammar, state: &mut SearchState, index: usize) {
    state.trace.push(Application {
        at: state.consumed,
        production: index,
    });
    let right = grammar.productions[index]
        .right
        .iter()
        .filter(|symbol| !symbol.is_epsilon())
        .cloned()
        .collect_vec();
    state.frontier.splice(0..1, right);
}

// The combined operation the shell drives: a derivation search followed
// by a replay of the winning trace into a tree
pub fn test_string(
    grammar: &Grammar,
    engine: &DerivationEngine,
    input: &[String],
) -> Result<TestOutcome, DeriveError> {
    match engine.derive(grammar, input)? {
        MatchResult::Match(trace) => Ok(TestOutcome::Accepted(tree::build(grammar, &trace))),
        MatchResult::NoMatch => Ok(TestOutcome::Rejected),
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::grammar::Production;

    fn s_terminal(text: &str) -> Symbol {
        Symbol::Terminal(text.to_string())
    }

    fn s_nonterminal(text: &str) -> Symbol {
        Symbol::Nonterminal(text.to_string())
    }

    fn production(left: &str, right: Vec<Symbol>) -> Production {
        Production {
            left: left.to_string(),
            right,
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.chars().map(String::from).collect()
    }

    // S -> a S b | ε
    fn nested_pairs() -> Grammar {
        Grammar {
            terminals: vec!["a".to_string(), "b".to_string()],
            nonterminals: vec!["S".to_string()],
            start: "S".to_string(),
            productions: vec![
                production("S", vec![s_terminal("a"), s_nonterminal("S"), s_terminal("b")]),
                production("S", vec![Symbol::Epsilon]),
            ],
        }
    }

    // S -> A A, A -> x | y
    fn two_letters() -> Grammar {
        Grammar {
            terminals: vec!["x".to_string(), "y".to_string()],
            nonterminals: vec!["S".to_string(), "A".to_string()],
            start: "S".to_string(),
            productions: vec![
                production("S", vec![s_nonterminal("A"), s_nonterminal("A")]),
                production("A", vec![s_terminal("x")]),
                production("A", vec![s_terminal("y")]),
            ],
        }
    }

    fn verdict(grammar: &Grammar, input: &str) -> bool {
        let engine = DerivationEngine::default();
        match engine.derive(grammar, &grammar.tokenize(input)).unwrap() {
            MatchResult::Match(_) => true,
            MatchResult::NoMatch => false,
        }
    }

    #[test]
    fn nested_pairs_verdicts() {
        let grammar = nested_pairs();
        let inputs = vec!["ab", "aabb", "aab", "ba", "a", "b"];
        let answers = vec![true, true, false, false, false, false];

        for (input, answer) in zip(inputs, answers) {
            assert_eq!(verdict(&grammar, input), answer, "input {input:?}");
        }
    }

    #[test]
    fn two_letters_verdicts() {
        let grammar = two_letters();
        let inputs = vec!["xy", "xx", "yy", "yx", "x", "xyz"];
        let answers = vec![true, true, true, true, false, false];

        for (input, answer) in zip(inputs, answers) {
            assert_eq!(verdict(&grammar, input), answer, "input {input:?}");
        }
    }

    #[test]
    fn empty_string_needs_an_epsilon_path() {
        // S -> a S b | ε accepts the empty string directly
        assert!(verdict(&nested_pairs(), ""));
        // S -> A A does not
        assert!(!verdict(&two_letters(), ""));

        // A chain of epsilon-only productions also reduces to it
        let chained = Grammar {
            terminals: vec!["a".to_string()],
            nonterminals: vec!["S".to_string(), "A".to_string()],
            start: "S".to_string(),
            productions: vec![
                production("S", vec![s_nonterminal("A")]),
                production("A", vec![Symbol::Epsilon]),
            ],
        };
        assert!(verdict(&chained, ""));
    }

    #[test]
    fn trace_follows_declaration_order() {
        let engine = DerivationEngine::default();
        let result = engine.derive(&two_letters(), &tokens("xy")).unwrap();

        // S -> A A, then A -> x for the first A, then A -> y for the second
        assert_eq!(
            result,
            MatchResult::Match(vec![
                Application { at: 0, production: 0 },
                Application { at: 0, production: 1 },
                Application { at: 1, production: 2 },
            ])
        );
    }

    #[test]
    fn earliest_declared_production_wins_ties() {
        // Two identical alternatives; the first one must be committed
        let ambiguous = Grammar {
            terminals: vec!["a".to_string()],
            nonterminals: vec!["S".to_string()],
            start: "S".to_string(),
            productions: vec![
                production("S", vec![s_terminal("a")]),
                production("S", vec![s_terminal("a")]),
            ],
        };

        let engine = DerivationEngine::default();
        let result = engine.derive(&ambiguous, &tokens("a")).unwrap();
        assert_eq!(result, MatchResult::Match(vec![Application { at: 0, production: 0 }]));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let grammar = nested_pairs();
        let engine = DerivationEngine::default();
        let input = tokens("aabb");

        let first = engine.derive(&grammar, &input).unwrap();
        let second = engine.derive(&grammar, &input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn nonterminal_without_productions_is_a_dead_end() {
        let stuck = Grammar {
            terminals: vec!["a".to_string()],
            nonterminals: vec!["S".to_string(), "A".to_string()],
            start: "S".to_string(),
            productions: vec![production("S", vec![s_nonterminal("A"), s_terminal("a")])],
        };

        let engine = DerivationEngine::default();
        assert_eq!(engine.derive(&stuck, &tokens("a")).unwrap(), MatchResult::NoMatch);
    }

    #[test]
    fn zero_consuming_cycle_hits_the_budget() {
        // S -> S never consumes input; only the budget stops the search
        let cyclic = Grammar {
            terminals: vec!["a".to_string()],
            nonterminals: vec!["S".to_string()],
            start: "S".to_string(),
            productions: vec![production("S", vec![s_nonterminal("S")])],
        };

        let engine = DerivationEngine::new(50);
        assert_eq!(
            engine.derive(&cyclic, &tokens("a")),
            Err(DeriveError::BudgetExceeded { steps: 50 })
        );
    }

    #[test]
    fn accepted_tree_reads_back_the_input() {
        let grammar = nested_pairs();
        let engine = DerivationEngine::default();
        let input = tokens("aabb");

        match test_string(&grammar, &engine, &input).unwrap() {
            TestOutcome::Accepted(tree) => {
                assert_eq!(tree.terminal_leaves(), vec!["a", "a", "b", "b"]);
            }
            TestOutcome::Rejected => panic!("expected the string to be accepted"),
        }
    }

    #[test]
    fn rejected_strings_build_no_tree() {
        let grammar = nested_pairs();
        let engine = DerivationEngine::default();

        assert_eq!(
            test_string(&grammar, &engine, &tokens("ba")).unwrap(),
            TestOutcome::Rejected
        );
    }
}

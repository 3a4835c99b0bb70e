/*
    This module is for storing and querying grammars
*/

pub mod validate;

use std::fmt::Display;

use itertools::Itertools;

// The spelling of the empty-string symbol in grammar files
pub const EPSILON: &str = "ε";

// The base unit in a production. Symbols are tagged when the grammar is
// built, by membership in the declared symbol sets, never by how the
// symbol happens to be spelled
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
    Epsilon,
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => name,
            Symbol::Epsilon => EPSILON,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// A single rewrite rule. `right` is either the lone Epsilon symbol or a
// sequence of terminals and nonterminals; the loader never mixes the two
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Production {
    pub left: String,
    pub right: Vec<Symbol>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.right == [Symbol::Epsilon]
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.left, self.right.iter().join(" "))
    }
}

// A context-free grammar. Declaration order of the symbol lists and of
// the productions is preserved; production order fixes the order in
// which the derivation engine tries alternatives
#[derive(Debug, PartialEq)]
pub struct Grammar {
    pub terminals: Vec<String>,
    pub nonterminals: Vec<String>,
    pub start: String,
    pub productions: Vec<Production>,
}

impl Grammar {
    // All productions with the given left side, in declaration order,
    // paired with their index in the production list. An empty result is
    // not an error: the engine treats it as a dead end
    pub fn productions_for<'a>(
        &'a self,
        nonterminal: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Production)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, production)| production.left == nonterminal)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.iter().any(|terminal| terminal == name)
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminals.iter().any(|nonterminal| nonterminal == name)
    }

    // Splits a typed line into terminal tokens. A line containing
    // whitespace is split on it; otherwise, when every declared terminal
    // is a single character, each character is its own token
    pub fn tokenize(&self, input: &str) -> Vec<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        if trimmed.split_whitespace().nth(1).is_some() {
            return trimmed.split_whitespace().map(str::to_string).collect();
        }
        if self.terminals.iter().all(|terminal| terminal.chars().count() == 1) {
            trimmed.chars().map(String::from).collect()
        } else {
            vec![trimmed.to_string()]
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Terminals (Vt): {}", self.terminals.iter().join(" "))?;
        writeln!(f, "  Nonterminals (Vxt): {}", self.nonterminals.iter().join(" "))?;
        writeln!(f, "  Start symbol (S): {}", self.start)?;
        writeln!(f, "  Productions (P):")?;
        for production in &self.productions {
            writeln!(f, "    {production}")?;
        }
        Ok(())
    }
}

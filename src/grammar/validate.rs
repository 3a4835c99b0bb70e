/*
    Structural checks over a built grammar. The scan is deterministic
    (symbol sets, then start symbol, then productions top to bottom, each
    right side left to right) and stops at the first violation; nothing
    is ever repaired
*/

use std::fmt::Display;

use super::{Grammar, Production, Symbol};

#[derive(Debug, PartialEq)]
pub enum GrammarError {
    // A symbol declared as both a terminal and a nonterminal
    SharedSymbol(String),
    // The start symbol is not a declared nonterminal
    InvalidStartSymbol(String),
    // A production whose left side is not a declared nonterminal
    InvalidProductionLeft { production: Production },
    // A production using a symbol outside the declared vocabulary
    InvalidProductionSymbol { production: Production, symbol: String },
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::SharedSymbol(symbol) => {
                write!(f, "`{symbol}` is declared as both a terminal and a nonterminal")
            }
            GrammarError::InvalidStartSymbol(start) => {
                write!(f, "The start symbol `{start}` is not in the set of nonterminals")
            }
            GrammarError::InvalidProductionLeft { production } => {
                write!(f, "The left side of production `{production}` is not a nonterminal")
            }
            GrammarError::InvalidProductionSymbol { production, symbol } => {
                write!(f, "The symbol `{symbol}` in production `{production}` is not valid")
            }
        }
    }
}

// Read-only check; calling it twice gives the same answer twice
pub fn validate(grammar: &Grammar) -> Result<(), GrammarError> {
    if let Some(shared) = grammar.nonterminals.iter().find(|name| grammar.is_terminal(name)) {
        return Err(GrammarError::SharedSymbol(shared.clone()));
    }

    if !grammar.is_nonterminal(&grammar.start) {
        return Err(GrammarError::InvalidStartSymbol(grammar.start.clone()));
    }

    for production in &grammar.productions {
        if !grammar.is_nonterminal(&production.left) {
            return Err(GrammarError::InvalidProductionLeft {
                production: production.clone(),
            });
        }
        for symbol in &production.right {
            let known = match symbol {
                Symbol::Epsilon => true,
                Symbol::Terminal(name) => grammar.is_terminal(name),
                Symbol::Nonterminal(name) => grammar.is_nonterminal(name),
            };
            if !known {
                return Err(GrammarError::InvalidProductionSymbol {
                    production: production.clone(),
                    symbol: symbol.name().to_string(),
                });
            }
        }
    }

    Ok(())
}

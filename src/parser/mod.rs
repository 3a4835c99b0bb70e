/*
    This module parses grammar description files.

    The format is line oriented: a header section with `Vt:`, `Vxt:` and
    `S:` lines in any order, a `P:` line, and then one production per
    line (`LHS -> sym1 sym2 ...`, with `|` separating alternatives and
    `ε` alone denoting the empty right side). Lines starting with `;`
    are comments
*/

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error_handling::*;
use crate::grammar::{Grammar, Production, Symbol, EPSILON};

#[derive(Debug)]
pub enum LoadErrorType {
    // One or more of the Vt/Vxt/S/P sections never appeared
    IncompleteGrammar(Vec<&'static str>),
    // A header line given more than once
    DuplicateHeader(&'static str),
    // A line before `P:` that is not one of the four headers
    UnrecognizedHeader,
    // A production line without an arrow
    MissingArrow,
    // A production line with nothing before the arrow
    MissingLeftHandSide,
    // ε combined with other symbols in one alternative
    MixedEpsilon,
    // There was an issue with reading the file
    FileError(std::io::Error),
}

impl ErrorType for LoadErrorType {}

impl PartialEq for LoadErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoadErrorType::FileError(a), LoadErrorType::FileError(b)) => a.kind() == b.kind(),
            (LoadErrorType::IncompleteGrammar(a), LoadErrorType::IncompleteGrammar(b)) => a == b,
            (LoadErrorType::DuplicateHeader(a), LoadErrorType::DuplicateHeader(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for LoadErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadErrorType::IncompleteGrammar(missing) => {
                write!(f, "The grammar is incomplete: missing {}", missing.iter().join(", "))
            }
            LoadErrorType::DuplicateHeader(header) => {
                write!(f, "The `{header}:` header appears more than once")
            }
            LoadErrorType::UnrecognizedHeader => {
                write!(f, "Expected `Vt:`, `Vxt:`, `S:` or `P:` before the productions")
            }
            LoadErrorType::MissingArrow => write!(f, "Expected `->` in production line"),
            LoadErrorType::MissingLeftHandSide => write!(f, "Expected a nonterminal before `->`"),
            LoadErrorType::MixedEpsilon => {
                write!(f, "`{EPSILON}` cannot be combined with other symbols in an alternative")
            }
            LoadErrorType::FileError(error) => write!(f, "File error: {error}"),
        }
    }
}

pub type LoadError = Error<LoadErrorType>;
pub type LoadErrors = Errors<LoadErrorType>;

pub type FileResult<T> = std::result::Result<T, LoadErrors>;

// A production as written, before its symbols are tagged
struct RawProduction {
    left: String,
    right: Vec<String>,
}

fn is_grammar_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with(';')
}

fn located(location: &Location, error: LoadErrorType) -> LoadError {
    LoadError {
        location: location.clone(),
        error,
    }
}

// Stores a header value, rejecting a second occurrence of the header
fn set_header<T>(
    slot: &mut Option<T>,
    value: T,
    header: &'static str,
    location: &Location,
    errors: &mut LoadErrors,
) {
    if slot.is_some() {
        errors.push(located(location, LoadErrorType::DuplicateHeader(header)));
    } else {
        *slot = Some(value);
    }
}

// Duplicate declarations inside one header are collapsed silently
fn symbol_list(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).unique().collect_vec()
}

// Splits one production line into its alternatives. An empty right side
// (or an empty alternative between pipes) is normalized to ε
fn parse_production_line(
    line: &str,
    location: &Location,
    productions: &mut Vec<RawProduction>,
    errors: &mut LoadErrors,
) {
    let Some((left, right)) = line.split_once("->").or_else(|| line.split_once('→')) else {
        errors.push(located(location, LoadErrorType::MissingArrow));
        return;
    };

    let left = left.trim();
    if left.is_empty() {
        errors.push(located(location, LoadErrorType::MissingLeftHandSide));
        return;
    }

    let tokens = right.split_whitespace().collect_vec();
    for alternative in tokens.split(|token| *token == "|") {
        if alternative.len() > 1 && alternative.contains(&EPSILON) {
            errors.push(located(location, LoadErrorType::MixedEpsilon));
            continue;
        }
        let right = if alternative.is_empty() {
            vec![EPSILON.to_string()]
        } else {
            alternative.iter().map(|token| token.to_string()).collect_vec()
        };
        productions.push(RawProduction {
            left: left.to_string(),
            right,
        });
    }
}

// Tags a right-hand token by membership in the declared sets. Unknown
// symbols fall back to Terminal so that validation can reject them by name
fn tag(token: &str, terminals: &[String], nonterminals: &[String]) -> Symbol {
    if token == EPSILON {
        Symbol::Epsilon
    } else if terminals.iter().any(|terminal| terminal == token) {
        Symbol::Terminal(token.to_string())
    } else if nonterminals.iter().any(|nonterminal| nonterminal == token) {
        Symbol::Nonterminal(token.to_string())
    } else {
        Symbol::Terminal(token.to_string())
    }
}

fn assemble(
    terminals: Vec<String>,
    nonterminals: Vec<String>,
    start: String,
    raw_productions: Vec<RawProduction>,
) -> Grammar {
    let productions = raw_productions
        .into_iter()
        .map(|raw| Production {
            right: raw
                .right
                .iter()
                .map(|token| tag(token, &terminals, &nonterminals))
                .collect(),
            left: raw.left,
        })
        .collect();

    Grammar {
        terminals,
        nonterminals,
        start,
        productions,
    }
}

pub fn parse_str(text: &str, file: PathBuf) -> FileResult<Grammar> {
    let mut terminals: Option<Vec<String>> = None;
    let mut nonterminals: Option<Vec<String>> = None;
    let mut start: Option<String> = None;
    let mut in_productions = false;
    let mut raw_productions = Vec::new();
    let mut errors = LoadErrors::new();

    for (number, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if !is_grammar_line(line) {
            continue;
        }
        let location = Location::new(file.clone(), number + 1);

        if in_productions {
            parse_production_line(line, &location, &mut raw_productions, &mut errors);
        } else if let Some(rest) = line.strip_prefix("Vt:") {
            let symbols = symbol_list(rest);
            if !symbols.is_empty() {
                set_header(&mut terminals, symbols, "Vt", &location, &mut errors);
            }
        } else if let Some(rest) = line.strip_prefix("Vxt:") {
            let symbols = symbol_list(rest);
            if !symbols.is_empty() {
                set_header(&mut nonterminals, symbols, "Vxt", &location, &mut errors);
            }
        } else if let Some(rest) = line.strip_prefix("S:") {
            let symbol = rest.trim();
            if !symbol.is_empty() {
                set_header(&mut start, symbol.to_string(), "S", &location, &mut errors);
            }
        } else if line == "P:" {
            in_productions = true;
        } else {
            errors.push(located(&location, LoadErrorType::UnrecognizedHeader));
        }
    }

    let mut missing = Vec::new();
    if terminals.is_none() {
        missing.push("Vt");
    }
    if nonterminals.is_none() {
        missing.push("Vxt");
    }
    if start.is_none() {
        missing.push("S");
    }
    if raw_productions.is_empty() {
        missing.push("P");
    }
    if !missing.is_empty() {
        errors.push(LoadError {
            location: Location::whole_file(file),
            error: LoadErrorType::IncompleteGrammar(missing),
        });
    }

    match (terminals, nonterminals, start) {
        (Some(terminals), Some(nonterminals), Some(start)) if errors.is_empty() => {
            Ok(assemble(terminals, nonterminals, start, raw_productions))
        }
        _ => Err(errors),
    }
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let text = fs::read_to_string(path).map_err(|error| {
        vec![LoadError {
            location: Location::whole_file(path.to_path_buf()),
            error: LoadErrorType::FileError(error),
        }]
    })?;

    return parse_str(&text, path.to_path_buf());
}

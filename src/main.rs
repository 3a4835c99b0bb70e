mod cli;
mod derivation;
mod error_handling;
mod grammar;
mod parser;
mod tree;

use std::fs;
use std::io::{self, BufRead, Write};

use clap::Parser;
use itertools::Itertools;

use cli::Cli;
use derivation::{DerivationEngine, TestOutcome};
use grammar::Grammar;

fn main() {
    let cli = Cli::parse();

    if let Err(message) = run(&cli) {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let grammar = parser::parse_file(&cli.file)
        .map_err(|errors| errors.iter().map(|error| error.to_string()).join("\n"))?;

    println!("Grammar components:");
    print!("{grammar}");

    grammar::validate::validate(&grammar).map_err(|error| format!("Invalid grammar: {error}"))?;

    let engine = match cli.max_steps {
        Some(steps) => DerivationEngine::new(steps),
        None => DerivationEngine::default(),
    };

    let stdin = io::stdin();
    loop {
        print!("\nEnter a string to test (or 'exit' to quit): ");
        io::stdout().flush().map_err(|error| error.to_string())?;

        let mut line = String::new();
        let read = stdin.lock().read_line(&mut line).map_err(|error| error.to_string())?;
        if read == 0 {
            // End of input counts as quitting
            break;
        }

        let input = line.trim();
        if is_quit(input) {
            break;
        }

        test_and_report(&grammar, &engine, input, cli)?;
    }

    return Ok(());
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("salir")
}

fn test_and_report(
    grammar: &Grammar,
    engine: &DerivationEngine,
    input: &str,
    cli: &Cli,
) -> Result<(), String> {
    let tokens = grammar.tokenize(input);

    match derivation::test_string(grammar, engine, &tokens) {
        Ok(TestOutcome::Accepted(tree)) => {
            println!("The string '{input}' belongs to the language.");
            print!("{tree}");
            if let Some(path) = &cli.dot {
                fs::write(path, tree::render::to_dot(&tree))
                    .map_err(|error| format!("Could not write {}: {error}", path.display()))?;
                println!("Derivation tree written to {}", path.display());
            }
        }
        Ok(TestOutcome::Rejected) => {
            println!("The string '{input}' does not belong to the language.");
        }
        // A blown budget only aborts this string, not the session
        Err(error) => {
            println!("{error}");
        }
    }

    return Ok(());
}

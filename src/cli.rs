use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Cap on derivation search steps
    #[arg(short, long, value_name = "STEPS")]
    pub max_steps: Option<usize>,

    /// Write each accepted derivation tree to this file in Graphviz dot format
    #[arg(short, long, value_name = "FILE")]
    pub dot: Option<PathBuf>,
}

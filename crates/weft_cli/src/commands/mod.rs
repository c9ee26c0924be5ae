//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod compile;

/// weft - markup template compiler
#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about = "weft - compile markup documents into template modules")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a markup document (or a directory of them) to generated
    /// render modules
    Compile(compile::CompileArgs),
}

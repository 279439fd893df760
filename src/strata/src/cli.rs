use clap::{Parser, Subcommand};

use crate::cmd::*;

mod args;

pub mod helpers;

pub mod io;
pub use io::*;

mod processor;
pub use processor::*;

pub const HYPHEN: &str = "-";

/// The CLI interface for the Strata application.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// The selected command.
    #[clap(subcommand)]
    pub command: StrataCommand,

    #[clap(flatten)]
    pub verbosity: args::Verbosity,
}

/// The top-level commands supported by Strata.
#[derive(Debug, Subcommand)]
pub enum StrataCommand {
    Kinds(kinds::Kinds),
    Normalize(normalize::Normalize),
    Tree(tree::Tree),
}

impl Command for StrataCommand {
    fn handle(self) -> eyre::Result<()> {
        match self {
            Self::Kinds(kinds) => kinds.handle(),
            Self::Normalize(normalize) => normalize.handle(),
            Self::Tree(tree) => tree.handle(),
        }
    }
}

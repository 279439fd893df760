use clap::Args;
use strata_table::strata_types::Kind;

use super::Command;

/// Lists the value kinds understood in table files.
#[derive(Debug, Args)]
pub struct Kinds {
    /// Prints the list as a JSON array instead.
    #[clap(short, long, default_value_t = false)]
    json: bool,
}

impl Command for Kinds {
    fn handle(self) -> eyre::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(&Kind::ALL)?);
            return Ok(());
        }

        for kind in Kind::ALL {
            let storage = if kind.is_table() { "owned" } else { "owned or external" };
            println!("{:<8} {storage}", kind.name());
        }

        Ok(())
    }
}

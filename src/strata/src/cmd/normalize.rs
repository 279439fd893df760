use clap::Args;
use strata_table::serde as json;

use super::Command;
use crate::cli::{InputsOutputs, helpers, process};

/// Loads table files and writes them back in canonical JSON form.
///
/// Unset entries, single elements and nested tables are written the
/// same way every time, so normalized files can be diffed.
#[derive(Debug, Args)]
pub struct Normalize {
    #[clap(flatten)]
    args: InputsOutputs,
}

impl Command for Normalize {
    fn handle(self) -> eyre::Result<()> {
        let (inputs, outputs) = self.args.evaluate("json")?;
        process(
            inputs,
            outputs,
            |r| {
                let table = json::from_reader(r)?;
                log::info!("Loaded table with {} entries", table.len());
                Ok(table)
            },
            helpers::write_as_json,
        )
    }
}

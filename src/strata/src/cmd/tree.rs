use std::fmt::Write;

use clap::Args;
use strata_table::{Table, Value, serde as json};

use super::Command;
use crate::cli::{InputsOutputs, helpers, process};

/// Prints the entries of table files as an indented tree.
#[derive(Debug, Args)]
pub struct Tree {
    #[clap(flatten)]
    args: InputsOutputs,

    /// The number of spaces per nesting level.
    #[clap(long, env = "STRATA_TREE_INDENT", default_value_t = 2)]
    indent: usize,
}

impl Command for Tree {
    fn handle(self) -> eyre::Result<()> {
        let indent = self.indent;
        let (inputs, outputs) = self.args.evaluate("tree.txt")?;
        process(
            inputs,
            outputs,
            |r| {
                let table = json::from_reader(r)?;
                let mut out = String::new();
                render_table(&mut out, &table, 0, indent)?;
                Ok(out)
            },
            helpers::write_as_text,
        )
    }
}

fn render_table(out: &mut String, table: &Table, depth: usize, indent: usize) -> eyre::Result<()> {
    let pad = depth * indent;
    for (name, value) in table.entries().iter() {
        write!(out, "{:pad$}{name}", "")?;

        let Some(kind) = value.kind() else {
            writeln!(out, ": <unset>")?;
            continue;
        };

        if kind.is_table() {
            writeln!(out, ": {kind} ({})", value.len())?;
            for (i, child) in value.tables().iter().enumerate() {
                writeln!(out, "{:width$}[{i}]", "", width = pad + indent)?;
                render_table(out, child, depth + 2, indent)?;
            }
        } else {
            writeln!(out, ": {kind} = {}", render_elements(value)?)?;
        }
    }

    Ok(())
}

fn render_elements(value: &Value) -> eyre::Result<String> {
    let elements = (0..value.len())
        .map(|i| value.render(i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match elements.as_slice() {
        [single] => single.clone(),
        many => format!("[{}]", many.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_entries() {
        let table = json::from_str(
            r#"{
                "Health": { "type": "Integer", "value": 5 },
                "Items": { "type": "Table", "value": [{ "Id": { "type": "Integer", "value": [1, 2] } }] },
                "Slot": { "type": null }
            }"#,
        )
        .unwrap();

        let mut out = String::new();
        render_table(&mut out, &table, 0, 2).unwrap();

        assert_eq!(
            out,
            "Health: Integer = 5\nItems: Table (1)\n  [0]\n    Id: Integer = [1, 2]\nSlot: <unset>\n"
        );
    }
}

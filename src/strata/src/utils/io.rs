use std::{
    fs,
    io::{self, BufWriter, IsTerminal, Write},
    path::PathBuf,
    process,
};

use clap::CommandFactory;

use crate::cli::Cli;

/// Obtains a buffered reader over the contents of stdin.
///
/// This function will terminate the process and print the running
/// command's help if stdin is connected to a terminal.
pub fn stdin_reader() -> io::BufReader<io::StdinLock<'static>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        let _ = Cli::command().print_help();
        process::exit(2);
    }

    io::BufReader::new(stdin.lock())
}

/// Writes `text` to a file, or to stdout when `out` is [`None`].
pub fn write_to_output_source(out: Option<PathBuf>, text: &str) -> eyre::Result<()> {
    match out {
        Some(out) => {
            let mut writer = BufWriter::new(fs::File::create(&out)?);
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
        }
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }

    Ok(())
}

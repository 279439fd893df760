use std::path::PathBuf;

use clap::Args;
use glob::glob;

use crate::cli::HYPHEN;

/// An input source to [`InputsOutputs`] machinery.
#[derive(Clone, Debug)]
pub enum InputSource {
    /// The input will be read from stdin.
    Stdin,
    /// The input will be read from a single file.
    File(PathBuf),
    /// Inputs will be read from multiple files (glob).
    Files(Vec<PathBuf>),
}

/// An output source to [`InputsOutputs`] machinery.
#[derive(Clone, Debug)]
pub enum OutputSource {
    /// The output will be written to stdout.
    Stdout,
    /// The output will be written to a single file.
    File(PathBuf),
    /// The output will be written to files in the directory.
    ///
    /// The extra suffix replaces the extension of every input file.
    Dir(PathBuf, &'static str),
}

/// Command options for reading table files and writing one result
/// per input.
#[derive(Debug, Args)]
pub struct InputsOutputs {
    /// The table files to process.
    ///
    /// When the value is "-", the table is read from stdin. Anything
    /// else is a file path, and UNIX glob patterns select many files.
    ///
    /// A pattern matching more than one file needs an output
    /// directory for all the result files.
    pub input: String,

    /// Where to write the results.
    ///
    /// Defaults to "-" for printing to stdout. Takes a single file
    /// path for a single input, or a directory which receives one
    /// file per input.
    #[clap(short, default_value = HYPHEN)]
    pub output: PathBuf,
}

impl InputsOutputs {
    /// Evaluates the supplied arguments into input and output sources.
    pub fn evaluate(self, suffix: &'static str) -> eyre::Result<(InputSource, OutputSource)> {
        let inputs = self.input_source()?;
        let outputs = self.output_source(suffix, &inputs);

        Ok((inputs, outputs))
    }

    fn input_source(&self) -> eyre::Result<InputSource> {
        if self.input == HYPHEN {
            return Ok(InputSource::Stdin);
        }

        // A plain file path is a glob pattern matching itself.
        let mut paths: Vec<PathBuf> = glob(&self.input)?.collect::<Result<_, _>>()?;

        match paths.len() {
            0 => Err(eyre::eyre!("failed to find files matching '{}'", self.input)),
            1 => Ok(InputSource::File(paths.remove(0))),
            _ => Ok(InputSource::Files(paths)),
        }
    }

    fn output_source(self, suffix: &'static str, input: &InputSource) -> OutputSource {
        if self.output.as_os_str() == HYPHEN {
            return OutputSource::Stdout;
        }

        match input {
            InputSource::Files(..) => OutputSource::Dir(self.output, suffix),
            _ if self.output.is_dir() => OutputSource::Dir(self.output, suffix),
            InputSource::Stdin | InputSource::File(..) => OutputSource::File(self.output),
        }
    }
}

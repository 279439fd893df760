use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use eyre::Context;

use super::{InputSource, OutputSource};
use crate::utils;

/// A reader over a compatible input source.
pub enum Reader {
    Stdin(io::Cursor<Vec<u8>>),
    File(io::BufReader<fs::File>),
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stdin(i) => i.read(buf),
            Self::File(i) => i.read(buf),
        }
    }

    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        match self {
            Self::Stdin(i) => i.read_to_end(buf),
            Self::File(i) => i.read_to_end(buf),
        }
    }
}

fn open_stdin() -> eyre::Result<Reader> {
    let mut stdin = utils::stdin_reader();
    let mut buf = Vec::new();
    stdin.read_to_end(&mut buf)?;

    Ok(Reader::Stdin(io::Cursor::new(buf)))
}

fn open_file(path: &Path) -> eyre::Result<Reader> {
    let file =
        fs::File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    Ok(Reader::File(io::BufReader::new(file)))
}

/// Processes inputs one after the other.
///
/// Tables are single-threaded, so every input is read and written
/// on the calling thread.
pub fn process<T>(
    input: InputSource,
    output: OutputSource,
    mut read: impl FnMut(Reader) -> eyre::Result<T>,
    mut write: impl FnMut(Option<PathBuf>, T, OutputSource) -> eyre::Result<()>,
) -> eyre::Result<()> {
    match (input, output) {
        (InputSource::Stdin, out) => {
            let value = read(open_stdin()?)?;
            write(None, value, out)
        }

        (InputSource::File(path), out) => {
            let value = read(open_file(&path)?)
                .with_context(|| format!("failed to process '{}'", path.display()))?;
            write(Some(path), value, out)
        }

        (InputSource::Files(paths), OutputSource::Dir(dir, suffix)) => {
            fs::create_dir_all(&dir)?;
            for path in paths {
                log::debug!("Processing '{}'", path.display());

                let value = read(open_file(&path)?)
                    .with_context(|| format!("failed to process '{}'", path.display()))?;
                write(Some(path), value, OutputSource::Dir(dir.clone(), suffix))?;
            }

            Ok(())
        }

        (InputSource::Files(..), _) => Err(eyre::eyre!(
            "multiple inputs need an output directory; pass one with -o"
        )),
    }
}

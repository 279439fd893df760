use std::path::PathBuf;

use super::OutputSource;
use crate::utils;

/// Resolves the file a result for `inpath` is written to.
///
/// Returns [`None`] for stdout.
pub fn output_path(inpath: Option<PathBuf>, out: OutputSource) -> eyre::Result<Option<PathBuf>> {
    match (out, inpath) {
        (OutputSource::Stdout, _) => Ok(None),
        (OutputSource::File(path), _) => Ok(Some(path)),
        (OutputSource::Dir(mut out, suffix), Some(path)) => {
            // Name the result after the input file.
            let infile = path.with_extension(suffix);
            let name = infile
                .file_name()
                .ok_or_else(|| eyre::eyre!("input path '{}' has no file name", path.display()))?;
            out.push(name);

            Ok(Some(out))
        }

        (OutputSource::Dir(..), None) => Err(eyre::eyre!(
            "output path for stdin input is directory; specify a file path instead"
        )),
    }
}

/// Helper for [`process`](super::process) which writes any
/// serializable `T` to an output source.
pub fn write_as_json<T: serde::Serialize>(
    inpath: Option<PathBuf>,
    value: T,
    out: OutputSource,
) -> eyre::Result<()> {
    let path = output_path(inpath, out)?;
    utils::serialize_to_output_source(path, &value)
}

/// Helper for [`process`](super::process) which writes plain text to
/// an output source.
pub fn write_as_text(inpath: Option<PathBuf>, text: String, out: OutputSource) -> eyre::Result<()> {
    let path = output_path(inpath, out)?;
    utils::write_to_output_source(path, &text)
}

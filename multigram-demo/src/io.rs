use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    Ok(fs::read_to_string(path)?.lines().map(str::to_owned).collect())
}

/// Builds an output path next to an input path, with a new extension.
///
/// Example:
/// `data/corpus.txt` + `"bin"` → `data/corpus.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
    input_path: P,
    output_extension: &str,
) -> io::Result<PathBuf> {
    let input_path = input_path.as_ref();
    if input_path.file_stem().is_none() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"));
    }
    Ok(input_path.with_extension(output_extension))
}

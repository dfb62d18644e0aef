//! Centralized precondition checks for input and output paths.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Index extensions searched next to a data file, in order of preference
pub const INDEX_EXTENSIONS: [&str; 2] = ["tbi", "csi"];

/// Length of a BGZF block header through the `BC` extra subfield
const BGZF_HEADER_LEN: usize = 16;

/// Precondition failures detected before any record is processed
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Input path is not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Index file not found: {} (looked for .tbi and .csi next to {})", .index.display(), .data.display())]
    MissingIndex { data: PathBuf, index: PathBuf },

    #[error("Input is not BGZF-compressed (compress with bgzip and index with tabix): {}", .0.display())]
    NotBgzf(PathBuf),

    #[error("Output path {} would overwrite input {}", .output.display(), .input.display())]
    OutputIsInput { output: PathBuf, input: PathBuf },

    #[error("Output directory does not exist: {}", .0.display())]
    MissingOutputDirectory(PathBuf),

    #[error("Failed to inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Path of the index for `data` with the given extension (`sample.vcf.gz` -> `sample.vcf.gz.tbi`)
#[must_use]
pub fn index_path(data: &Path, extension: &str) -> PathBuf {
    let mut path = data.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Find the first existing index next to `data`
#[must_use]
pub fn find_index(data: &Path) -> Option<PathBuf> {
    INDEX_EXTENSIONS
        .iter()
        .map(|ext| index_path(data, ext))
        .find(|path| path.is_file())
}

/// Check that an input VCF exists, is BGZF-compressed, and has an index.
///
/// Returns the path of the index that will be used.
///
/// # Errors
///
/// Returns the [`ValidationError`] naming the first missing or unusable file.
pub fn check_indexed_input(data: &Path) -> Result<PathBuf, ValidationError> {
    if !data.exists() {
        return Err(ValidationError::MissingFile(data.to_path_buf()));
    }
    if !data.is_file() {
        return Err(ValidationError::NotAFile(data.to_path_buf()));
    }

    let index = find_index(data).ok_or_else(|| ValidationError::MissingIndex {
        data: data.to_path_buf(),
        index: index_path(data, INDEX_EXTENSIONS[0]),
    })?;

    let mut header = [0u8; BGZF_HEADER_LEN];
    let read = File::open(data)
        .and_then(|mut file| read_prefix(&mut file, &mut header))
        .map_err(|source| ValidationError::Io {
            path: data.to_path_buf(),
            source,
        })?;

    if !is_bgzf_header(&header[..read]) {
        return Err(ValidationError::NotBgzf(data.to_path_buf()));
    }

    Ok(index)
}

/// Check that the output can be created without clobbering an input
///
/// # Errors
///
/// Returns `ValidationError::OutputIsInput` if `output` names one of `inputs`, or
/// `ValidationError::MissingOutputDirectory` if its parent directory is missing.
pub fn check_output(output: &Path, inputs: &[&Path]) -> Result<(), ValidationError> {
    let resolved = output.canonicalize().ok();
    for input in inputs {
        let same = *input == output
            || matches!((&resolved, input.canonicalize()), (Some(a), Ok(b)) if *a == b);
        if same {
            return Err(ValidationError::OutputIsInput {
                output: output.to_path_buf(),
                input: input.to_path_buf(),
            });
        }
    }

    let parent = output_directory(output);
    if !parent.is_dir() {
        return Err(ValidationError::MissingOutputDirectory(parent.to_path_buf()));
    }

    Ok(())
}

/// Directory the output will be created in (`.` for a bare file name)
#[must_use]
pub fn output_directory(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Check for the gzip magic with the BGZF `BC` extra subfield
#[must_use]
pub fn is_bgzf_header(content: &[u8]) -> bool {
    content.len() >= BGZF_HEADER_LEN
        && content[0] == 0x1f
        && content[1] == 0x8b
        && content[2] == 0x08
        && content[3] & 0x04 != 0
        && content[12] == b'B'
        && content[13] == b'C'
}

/// Read up to `buf.len()` bytes, stopping early only at end of file
fn read_prefix(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Header of the empty BGZF EOF block
    const BGZF_EOF: [u8; 28] = [
        0x1f, 0x8b, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x06, 0x00, 0x42, 0x43, 0x02,
        0x00, 0x1b, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    fn write_file(path: &Path, content: &[u8]) {
        let mut file = File::create(path).unwrap();
        file.write_all(content).unwrap();
    }

    #[test]
    fn test_index_path() {
        assert_eq!(
            index_path(Path::new("data/00-All.vcf.gz"), "tbi"),
            PathBuf::from("data/00-All.vcf.gz.tbi")
        );
    }

    #[test]
    fn test_is_bgzf_header() {
        assert!(is_bgzf_header(&BGZF_EOF));
        assert!(!is_bgzf_header(b"##fileformat=VCFv4.2\n"));
        // Plain gzip without the BC subfield
        let mut gzip = BGZF_EOF;
        gzip[3] = 0x00;
        assert!(!is_bgzf_header(&gzip));
        assert!(!is_bgzf_header(&BGZF_EOF[..10]));
    }

    #[test]
    fn test_check_indexed_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("missing.vcf.gz");
        let err = check_indexed_input(&data).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFile(_)));
        assert!(err.to_string().contains("missing.vcf.gz"));
    }

    #[test]
    fn test_check_indexed_input_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("target.vcf.gz");
        write_file(&data, &BGZF_EOF);

        let err = check_indexed_input(&data).unwrap_err();
        assert!(matches!(err, ValidationError::MissingIndex { .. }));
        assert!(err.to_string().contains("target.vcf.gz.tbi"));
    }

    #[test]
    fn test_check_indexed_input_prefers_tbi() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("target.vcf.gz");
        write_file(&data, &BGZF_EOF);
        write_file(&index_path(&data, "csi"), b"");
        assert_eq!(check_indexed_input(&data).unwrap(), index_path(&data, "csi"));

        write_file(&index_path(&data, "tbi"), b"");
        assert_eq!(check_indexed_input(&data).unwrap(), index_path(&data, "tbi"));
    }

    #[test]
    fn test_check_indexed_input_not_bgzf() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("plain.vcf.gz");
        write_file(&data, b"##fileformat=VCFv4.2\n");
        write_file(&index_path(&data, "tbi"), b"");

        assert!(matches!(
            check_indexed_input(&data),
            Err(ValidationError::NotBgzf(_))
        ));
    }

    #[test]
    fn test_check_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("target.vcf.gz");
        write_file(&input, &BGZF_EOF);

        assert!(matches!(
            check_output(&input, &[input.as_path()]),
            Err(ValidationError::OutputIsInput { .. })
        ));
        assert!(check_output(&dir.path().join("out.vcf"), &[input.as_path()]).is_ok());
        assert!(matches!(
            check_output(&dir.path().join("nope/out.vcf"), &[input.as_path()]),
            Err(ValidationError::MissingOutputDirectory(_))
        ));
    }

    #[test]
    fn test_output_directory() {
        assert_eq!(output_directory(Path::new("out.vcf")), Path::new("."));
        assert_eq!(output_directory(Path::new("a/out.vcf")), Path::new("a"));
    }
}

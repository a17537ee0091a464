use crate::errors::RunError;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Wall-clock stamp format used in output names, e.g. `17_Jan_2024_14_05_09`.
pub const TIMESTAMP_FORMAT: &str = "%d_%b_%Y_%H_%M_%S";

/// How an input path is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// One DICOM file.
    SingleFile,
    /// A directory holding the slices of one series.
    Series,
}

/// Route an input path: directories are series, regular files are single
/// images, anything else (missing path, special file, unresolvable symlink)
/// aborts the run before any output is attempted.
pub fn classify(path: &Path) -> Result<InputKind, RunError> {
    let meta = fs::metadata(path).map_err(|err| RunError::InvalidInput {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    if meta.is_dir() {
        Ok(InputKind::Series)
    } else if meta.is_file() {
        Ok(InputKind::SingleFile)
    } else {
        Err(RunError::InvalidInput {
            path: path.to_path_buf(),
            reason: "not a regular file or directory".into(),
        })
    }
}

/// Current wall-clock time formatted for filesystem-safe output names.
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Output path for single-file mode: `<base>/output_<stamp>.dcm`.
pub fn single_output_path(base: &Path, stamp: &str) -> PathBuf {
    base.join(format!("output_{stamp}.dcm"))
}

/// Output directory for series mode: `<base>/output_<stamp>/`.
pub fn series_output_dir(base: &Path, stamp: &str) -> PathBuf {
    base.join(format!("output_{stamp}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_classify_directory_as_series() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(classify(dir.path()).unwrap(), InputKind::Series);
    }

    #[test]
    fn test_classify_file_as_single() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(classify(file.path()).unwrap(), InputKind::SingleFile);
    }

    #[test]
    fn test_classify_missing_path_fails() {
        let err = classify(Path::new("no/such/thing")).unwrap_err();
        assert!(matches!(err, RunError::InvalidInput { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_timestamp_matches_format() {
        let stamp = timestamp();
        // wall clock is not injectable; assert shape, not a literal value
        assert!(NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
        assert!(!stamp.contains(['/', '\\', ':', ' ']));
    }

    #[test]
    fn test_output_names() {
        let base = Path::new("work");
        let stamp = "17_Jan_2024_14_05_09";
        assert_eq!(
            single_output_path(base, stamp),
            Path::new("work/output_17_Jan_2024_14_05_09.dcm")
        );
        assert_eq!(
            series_output_dir(base, stamp),
            Path::new("work/output_17_Jan_2024_14_05_09")
        );
    }
}

//! Input staging: validate the input path and resolve a collision-free working copy

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Trait for resolving an input file before extraction
///
/// Implementations:
/// - `InPlaceStager`: validates and reads the file where it is
/// - `DirectoryStager`: copies into a staging directory, renaming on conflict
pub trait Stager: Send + Sync {
    /// Validate `path` and return the path extraction should read
    fn stage(&self, path: &Path) -> Result<PathBuf>;

    /// Get stager name for logging
    fn name(&self) -> &str;
}

/// Missing paths and directories are fatal for the file
fn check_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Reads inputs in place
#[derive(Debug, Default, Clone)]
pub struct InPlaceStager;

impl Stager for InPlaceStager {
    fn stage(&self, path: &Path) -> Result<PathBuf> {
        check_input(path)?;
        Ok(path.to_path_buf())
    }

    fn name(&self) -> &str {
        "in-place"
    }
}

/// Copies inputs into a staging directory
#[derive(Debug, Clone)]
pub struct DirectoryStager {
    dir: PathBuf,
}

impl DirectoryStager {
    /// Create a stager, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Create `file_name` in `dir` without replacing anything
///
/// Taken names fall back to `<stem>_<unix-timestamp>.<ext>`, bumping the timestamp
/// until creation succeeds. The name is reserved by `create_new`, so concurrent
/// callers never get the same path.
pub(crate) fn create_unique(dir: &Path, file_name: &Path) -> Result<(PathBuf, File)> {
    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut candidate = dir.join(file_name);
    let mut stamp = chrono::Utc::now().timestamp();
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                candidate = dir.join(format!("{}_{}{}", stem, stamp, ext));
                stamp += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

impl Stager for DirectoryStager {
    fn stage(&self, path: &Path) -> Result<PathBuf> {
        check_input(path)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| Error::NotAFile(path.to_path_buf()))?;
        let (dest, mut out) = create_unique(&self.dir, Path::new(file_name))?;

        let mut src = File::open(path)?;
        std::io::copy(&mut src, &mut out)?;
        tracing::info!(
            "Copied file to: {}",
            dest.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(dest)
    }

    fn name(&self) -> &str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_directory_inputs_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let stager = InPlaceStager;

        let missing = dir.path().join("nope.pdf");
        assert!(matches!(stager.stage(&missing), Err(Error::FileNotFound(_))));
        assert!(matches!(stager.stage(dir.path()), Err(Error::NotAFile(_))));
    }

    #[test]
    fn test_in_place_returns_same_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.csv");
        std::fs::write(&file, "x\n1\n").unwrap();
        assert_eq!(InPlaceStager.stage(&file).unwrap(), file);
    }

    #[test]
    fn test_directory_stager_renames_on_conflict() {
        let src_dir = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let file = src_dir.path().join("report.pdf");
        std::fs::write(&file, b"%PDF-1.4").unwrap();

        let stager = DirectoryStager::new(staging.path()).unwrap();
        let first = stager.stage(&file).unwrap();
        let second = stager.stage(&file).unwrap();

        assert_eq!(first, staging.path().join("report.pdf"));
        assert_ne!(first, second);
        let second_name = second.file_name().unwrap().to_string_lossy().to_string();
        assert!(second_name.starts_with("report_"));
        assert!(second_name.ends_with(".pdf"));
        assert_eq!(std::fs::read(&second).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_concurrent_same_name_inputs_get_distinct_copies() {
        let staging = tempfile::tempdir().unwrap();
        let stager = DirectoryStager::new(staging.path()).unwrap();

        let sources: Vec<_> = (0..8)
            .map(|i| {
                let dir = tempfile::tempdir().unwrap();
                let file = dir.path().join("rows.csv");
                std::fs::write(&file, format!("id\n{}\n", i)).unwrap();
                (dir, file)
            })
            .collect();

        let stager = &stager;
        let staged: Vec<PathBuf> = std::thread::scope(|scope| {
            let handles: Vec<_> = sources
                .iter()
                .map(|(_, file)| scope.spawn(move || stager.stage(file).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut unique = staged.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 8);

        for (i, path) in staged.iter().enumerate() {
            assert_eq!(std::fs::read_to_string(path).unwrap(), format!("id\n{}\n", i));
        }
    }

    #[test]
    fn test_create_unique_never_replaces() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"keep").unwrap();

        let (path, _file) = create_unique(dir.path(), Path::new("report.pdf")).unwrap();
        assert_ne!(path, dir.path().join("report.pdf"));
        assert_eq!(std::fs::read(dir.path().join("report.pdf")).unwrap(), b"keep");
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A read-only namespace of named byte blobs to discover migrations from.
///
/// The engine only needs two capabilities: enumerate every leaf entry and
/// read one entry by name. The files can live in a directory on disk, in a
/// table compiled into the binary, or in an in-memory fixture in tests.
pub trait MigrationSource {
    /// All leaf (non-directory) entries in the source, named relative to its
    /// root. Order is not significant; the engine sorts.
    fn entries(&self) -> io::Result<Vec<String>>;

    /// Read the full content of one entry.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Migration source backed by a directory on disk.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn walk(&self, dir: &Path, out: &mut Vec<String>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if entry.file_type()?.is_dir() {
                self.walk(&path, out)?;
                continue;
            }

            let rel = path.strip_prefix(&self.root).unwrap_or(&path);
            let name = rel.to_str().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "non-UTF-8 file name")
            })?;
            out.push(name.to_string());
        }

        Ok(())
    }
}

impl MigrationSource for DirSource {
    fn entries(&self) -> io::Result<Vec<String>> {
        let mut out = Vec::new();
        self.walk(&self.root, &mut out)?;
        Ok(out)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(path))
    }
}

/// Migration source backed by an in-memory table of `(name, content)` pairs.
///
/// Pair it with `include_str!` to bundle migrations into the binary, or use
/// it directly as a test fixture.
pub struct StaticSource {
    files: &'static [(&'static str, &'static str)],
}

impl StaticSource {
    pub const fn new(files: &'static [(&'static str, &'static str)]) -> Self {
        Self { files }
    }
}

impl MigrationSource for StaticSource {
    fn entries(&self) -> io::Result<Vec<String>> {
        Ok(self.files.iter().map(|(name, _)| name.to_string()).collect())
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, content)| content.as_bytes().to_vec())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dir_source_lists_leaf_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0001_first.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("readme.txt"), "not a migration").unwrap();

        let source = DirSource::new(dir.path());
        let mut entries = source.entries().unwrap();
        entries.sort();

        assert_eq!(entries, vec!["0001_first.sql", "readme.txt"]);
    }

    #[test]
    fn test_dir_source_recurses_into_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("2024")).unwrap();
        fs::write(dir.path().join("2024/0002_nested.sql"), "SELECT 2;").unwrap();
        fs::write(dir.path().join("0001_top.sql"), "SELECT 1;").unwrap();

        let source = DirSource::new(dir.path());
        let mut entries = source.entries().unwrap();
        entries.sort();

        assert_eq!(entries, vec!["0001_top.sql", "2024/0002_nested.sql"]);
    }

    #[test]
    fn test_dir_source_missing_root_errors() {
        let source = DirSource::new("/nonexistent/migrations");
        assert!(source.entries().is_err());
    }

    #[test]
    fn test_dir_source_read() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0001_first.sql"), "SELECT 1;").unwrap();

        let source = DirSource::new(dir.path());
        let content = source.read("0001_first.sql").unwrap();

        assert_eq!(content, b"SELECT 1;");
    }

    #[test]
    fn test_static_source_entries_and_read() {
        const SOURCE: StaticSource = StaticSource::new(&[
            ("0001_first.sql", "SELECT 1;"),
            ("0002_second.sql", "SELECT 2;"),
        ]);

        let entries = SOURCE.entries().unwrap();
        assert_eq!(entries, vec!["0001_first.sql", "0002_second.sql"]);

        assert_eq!(SOURCE.read("0002_second.sql").unwrap(), b"SELECT 2;");
        assert!(SOURCE.read("0003_missing.sql").is_err());
    }
}

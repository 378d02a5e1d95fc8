use std::io;
use std::path::Path;

use super::util::clean_path;

/// A fully qualified path in the file system, in POSIX form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbsoluteFsPath(String);

impl AbsoluteFsPath {
    pub fn new(path: impl AsRef<str>) -> Self {
        AbsoluteFsPath(clean_path(path.as_ref()))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new(path.as_ref().to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for AbsoluteFsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for AbsoluteFsPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl std::fmt::Display for AbsoluteFsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single path component (a directory entry name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment(String);

impl PathSegment {
    pub fn new(segment: impl Into<String>) -> Self {
        PathSegment(segment.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An abstraction over the read-only aspects of a file-system.
pub trait ReadonlyFileSystem: Send + Sync {
    fn exists(&self, path: &AbsoluteFsPath) -> bool;
    fn is_directory(&self, path: &AbsoluteFsPath) -> bool;
    fn read_file(&self, path: &AbsoluteFsPath) -> io::Result<String>;
    fn readdir(&self, path: &AbsoluteFsPath) -> io::Result<Vec<PathSegment>>;
}

/// A basic interface to abstract the underlying file-system.
pub trait FileSystem: ReadonlyFileSystem {
    fn write_file(&self, path: &AbsoluteFsPath, data: &[u8]) -> io::Result<()>;
    fn remove_file(&self, path: &AbsoluteFsPath) -> io::Result<()>;
    fn ensure_dir(&self, path: &AbsoluteFsPath) -> io::Result<()>;
    /// Remove an empty directory.
    fn remove_dir(&self, path: &AbsoluteFsPath) -> io::Result<()>;
}

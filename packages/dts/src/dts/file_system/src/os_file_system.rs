use std::fs;
use std::io;
use std::path::Path;

use super::types::{AbsoluteFsPath, FileSystem, PathSegment, ReadonlyFileSystem};
use super::util::normalize_separators;

/// The real file system, backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn pwd() -> AbsoluteFsPath {
        let cwd = std::env::current_dir().unwrap_or_else(|_| Path::new("/").to_path_buf());
        AbsoluteFsPath::new(normalize_separators(&cwd.to_string_lossy()))
    }
}

impl ReadonlyFileSystem for OsFileSystem {
    fn exists(&self, path: &AbsoluteFsPath) -> bool {
        path.as_path().exists()
    }

    fn is_directory(&self, path: &AbsoluteFsPath) -> bool {
        path.as_path().is_dir()
    }

    fn read_file(&self, path: &AbsoluteFsPath) -> io::Result<String> {
        fs::read_to_string(path.as_path())
    }

    fn readdir(&self, path: &AbsoluteFsPath) -> io::Result<Vec<PathSegment>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(path.as_path())? {
            let entry = entry?;
            result.push(PathSegment::new(entry.file_name().to_string_lossy().to_string()));
        }
        result.sort();
        Ok(result)
    }
}

impl FileSystem for OsFileSystem {
    fn write_file(&self, path: &AbsoluteFsPath, data: &[u8]) -> io::Result<()> {
        fs::write(path.as_path(), data)
    }

    fn remove_file(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        fs::remove_file(path.as_path())
    }

    fn ensure_dir(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        fs::create_dir_all(path.as_path())
    }

    fn remove_dir(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        fs::remove_dir(path.as_path())
    }
}

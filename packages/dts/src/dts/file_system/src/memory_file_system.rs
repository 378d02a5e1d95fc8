use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{AbsoluteFsPath, FileSystem, PathSegment, ReadonlyFileSystem};
use super::util::dirname;

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

/// An in-memory file system. Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    tree: Arc<Mutex<Tree>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        tree.dirs.insert("/".to_string());
        Self {
            tree: Arc::new(Mutex::new(tree)),
        }
    }

    pub fn init_with_files(&self, files: Vec<(&str, &str)>) {
        for (path, content) in files {
            let path = AbsoluteFsPath::new(path);
            let _ = self.ensure_dir(&AbsoluteFsPath::new(dirname(path.as_str())));
            let _ = self.write_file(&path, content.as_bytes());
        }
    }

    /// Snapshot of every file as UTF-8 text, keyed by path.
    pub fn files(&self) -> BTreeMap<String, String> {
        self.lock()
            .files
            .iter()
            .map(|(path, data)| (path.clone(), String::from_utf8_lossy(data).to_string()))
            .collect()
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.read_file(&AbsoluteFsPath::new(path)).ok()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        // A panicking writer cannot leave the maps half-updated.
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(path: &AbsoluteFsPath) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path))
}

impl ReadonlyFileSystem for MemoryFileSystem {
    fn exists(&self, path: &AbsoluteFsPath) -> bool {
        let tree = self.lock();
        tree.files.contains_key(path.as_str()) || tree.dirs.contains(path.as_str())
    }

    fn is_directory(&self, path: &AbsoluteFsPath) -> bool {
        self.lock().dirs.contains(path.as_str())
    }

    fn read_file(&self, path: &AbsoluteFsPath) -> io::Result<String> {
        let tree = self.lock();
        let data = tree.files.get(path.as_str()).ok_or_else(|| not_found(path))?;
        String::from_utf8(data.clone()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn readdir(&self, path: &AbsoluteFsPath) -> io::Result<Vec<PathSegment>> {
        let tree = self.lock();
        if !tree.dirs.contains(path.as_str()) {
            return Err(not_found(path));
        }
        let children = tree
            .files
            .keys()
            .chain(tree.dirs.iter())
            .filter(|candidate| candidate.as_str() != path.as_str())
            .filter(|candidate| dirname(candidate) == path.as_str())
            .map(|candidate| PathSegment::new(candidate.rsplit('/').next().unwrap_or_default()))
            .collect();
        Ok(children)
    }
}

impl FileSystem for MemoryFileSystem {
    fn write_file(&self, path: &AbsoluteFsPath, data: &[u8]) -> io::Result<()> {
        let mut tree = self.lock();
        let parent = dirname(path.as_str());
        if !tree.dirs.contains(&parent) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory {} not found", parent),
            ));
        }
        if tree.dirs.contains(path.as_str()) {
            return Err(io::Error::new(io::ErrorKind::Other, "Is a directory"));
        }
        tree.files.insert(path.as_str().to_string(), data.to_vec());
        Ok(())
    }

    fn remove_file(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        self.lock()
            .files
            .remove(path.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn ensure_dir(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        let mut tree = self.lock();
        let mut current = path.as_str().to_string();
        loop {
            if tree.files.contains_key(&current) {
                return Err(io::Error::new(io::ErrorKind::Other, "Not a directory"));
            }
            if !tree.dirs.insert(current.clone()) {
                break;
            }
            let parent = dirname(&current);
            if parent == current {
                break;
            }
            current = parent;
        }
        Ok(())
    }

    fn remove_dir(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        let mut tree = self.lock();
        if !tree.dirs.contains(path.as_str()) {
            return Err(not_found(path));
        }
        let prefix = format!("{}/", path.as_str().trim_end_matches('/'));
        let occupied = tree.files.keys().any(|f| f.starts_with(&prefix))
            || tree.dirs.iter().any(|d| d.starts_with(&prefix));
        if occupied {
            return Err(io::Error::new(io::ErrorKind::Other, "Directory not empty"));
        }
        tree.dirs.remove(path.as_str());
        Ok(())
    }
}

use std::sync::Arc;

use super::types::{AbsoluteFsPath, FileSystem};
use super::util::resolve;

/// `ts::CompilerHost` over a `FileSystem`. Relative names resolve against
/// `current_directory`.
pub struct FileSystemCompilerHost {
    fs: Arc<dyn FileSystem>,
    current_directory: String,
}

impl FileSystemCompilerHost {
    pub fn new(fs: Arc<dyn FileSystem>, current_directory: impl AsRef<str>) -> Self {
        Self {
            fs,
            current_directory: AbsoluteFsPath::new(current_directory).into_string(),
        }
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    fn absolute(&self, file_name: &str) -> AbsoluteFsPath {
        AbsoluteFsPath::new(resolve(&self.current_directory, file_name))
    }
}

impl ts::CompilerHost for FileSystemCompilerHost {
    fn get_current_directory(&self) -> String {
        self.current_directory.clone()
    }

    fn file_exists(&self, file_name: &str) -> bool {
        let path = self.absolute(file_name);
        self.fs.exists(&path) && !self.fs.is_directory(&path)
    }

    fn read_file(&self, file_name: &str) -> Option<String> {
        let path = self.absolute(file_name);
        if self.fs.is_directory(&path) {
            return None;
        }
        self.fs.read_file(&path).ok()
    }
}

use std::sync::Arc;

use serde_json::Value;

use crate::dts::file_system::{join, AbsoluteFsPath, FileSystem};

const DEPENDENCY_FIELDS: &[&str] = &["dependencies", "devDependencies", "peerDependencies"];

/// What the project being built supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Single-file `.vue` components are part of the program.
    pub vue: bool,
}

pub trait CapabilityProbe: Send + Sync {
    fn probe(&self, root: &str) -> Capabilities;
}

/// Reads `<root>/package.json` dependency tables.
pub struct PackageJsonProbe {
    fs: Arc<dyn FileSystem>,
}

impl PackageJsonProbe {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl CapabilityProbe for PackageJsonProbe {
    fn probe(&self, root: &str) -> Capabilities {
        let path = AbsoluteFsPath::new(join(root, &["package.json"]));
        let Some(manifest) = self
            .fs
            .read_file(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        else {
            return Capabilities::default();
        };
        let depends_on = |name: &str| {
            DEPENDENCY_FIELDS
                .iter()
                .any(|field| manifest.get(field).and_then(|deps| deps.get(name)).is_some())
        };
        Capabilities {
            vue: depends_on("vue"),
        }
    }
}

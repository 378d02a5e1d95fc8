use serde_json::Value;

/// One bundling job: merge everything reachable from `entry_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRequest {
    pub root: String,
    pub compiler_options: Value,
    pub out_dir: String,
    /// Already-written declaration to start from.
    pub entry_path: String,
    /// Final name of the merged declaration, relative to `out_dir`.
    pub file_name: String,
    /// Extra engine configuration, merged over the generated one.
    pub bundle_config: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOutput {
    pub content: String,
    /// Messages the engine reported while bundling.
    pub messages: Vec<String>,
}

pub trait DeclarationBundler: Send + Sync {
    fn bundle(&self, request: &BundleRequest) -> anyhow::Result<BundleOutput>;
}

/// Deep-merge `overlay` into `base`. Objects merge key by key; anything
/// else in `overlay` replaces the value in `base`. `null` overlays are
/// ignored.
pub fn merge_json(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// On-disk shape of the cache: a flat key/value map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    pub schema_version: u32,
    #[serde(default)]
    pub entries: BTreeMap<String, Value>,
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            schema_version: 1,
            entries: BTreeMap::new(),
        }
    }
}

pub fn load_cache_file(path: &Path) -> Result<CacheFile> {
    if !path.exists() {
        return Ok(CacheFile::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read cache file {}", path.display()))?;
    match serde_json::from_str(&content) {
        Ok(file) => Ok(file),
        Err(err) => {
            warn!(
                cache = %path.display(),
                error = %err,
                "cache file is malformed; starting from an empty cache"
            );
            Ok(CacheFile::default())
        }
    }
}

/// Writes through a sibling temp file so a crash never leaves a truncated cache.
pub fn save_cache_file(path: &Path, file: &CacheFile) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create cache directory {}", parent.display()))?;
    }

    let serialized = serde_json::to_string_pretty(file)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serialized)
        .with_context(|| format!("failed to write cache file {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace cache file {}", path.display()))?;
    Ok(())
}

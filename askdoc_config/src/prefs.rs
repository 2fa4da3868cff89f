//! File-backed preference persistence.
//!
//! Small key/value store at `~/askdoc/prefs.json`. Unavailability of the
//! backing file is never fatal: reads come back `None` and failed writes
//! are logged and dropped, so the client behaves as if no preference was
//! ever stored.

use std::collections::BTreeMap;
use std::path::PathBuf;

use askdoc_core::PreferenceStore;
use tracing::warn;

pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Store at the default location under the config directory.
    pub fn open_default() -> anyhow::Result<Self> {
        let dir = crate::Config::ensure_config_dir()?;
        Ok(Self::at(dir.join("prefs.json")))
    }

    #[must_use]
    pub const fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, values: &BTreeMap<String, String>) {
        let serialized = match serde_json::to_string_pretty(values) {
            Ok(s) => s,
            Err(e) => {
                warn!("could not serialize preferences: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, serialized) {
            warn!("could not persist preferences to {}: {e}", self.path.display());
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_values() {
        let dir = std::env::temp_dir().join("askdoc_prefs_roundtrip");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("prefs.json");
        let _ = std::fs::remove_file(&path);

        let store = FilePreferenceStore::at(path);
        assert_eq!(store.get("websearch"), None);

        store.set("websearch", "true");
        assert_eq!(store.get("websearch").as_deref(), Some("true"));

        store.set("websearch", "false");
        assert_eq!(store.get("websearch").as_deref(), Some("false"));
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let store = FilePreferenceStore::at(PathBuf::from("/nonexistent/dir/prefs.json"));
        assert_eq!(store.get("websearch"), None);
        // Write failure is swallowed.
        store.set("websearch", "true");
        assert_eq!(store.get("websearch"), None);
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = std::env::temp_dir().join("askdoc_prefs_corrupt");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("prefs.json");
        let _ = std::fs::write(&path, "not json at all");

        let store = FilePreferenceStore::at(path);
        assert_eq!(store.get("websearch"), None);
    }
}

//! Construction options.

use serde::{Deserialize, Serialize};

use crate::persist::StorageKind;

pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerOptions {
    /// Append milliseconds to the formatted duration.
    pub show_ms: bool,
    /// Milliseconds between live recomputes while a section is open.
    pub update_interval_ms: u64,
    pub persist: Option<PersistOptions>,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            show_ms: false,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            persist: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistOptions {
    pub id: String,
    #[serde(default)]
    pub storage: StorageKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TimerOptions::default();
        assert!(!opts.show_ms);
        assert_eq!(opts.update_interval_ms, 16);
        assert!(opts.persist.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: TimerOptions =
            serde_json::from_str(r#"{"show_ms": true, "persist": {"id": "bench"}}"#).unwrap();
        assert!(opts.show_ms);
        assert_eq!(opts.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS);
        let persist = opts.persist.unwrap();
        assert_eq!(persist.id, "bench");
        assert_eq!(persist.storage, StorageKind::Memory);
    }

    #[test]
    fn test_file_storage_kind() {
        let persist: PersistOptions =
            serde_json::from_str(r#"{"id": "a", "storage": {"kind": "file", "dir": "/tmp/t"}}"#)
                .unwrap();
        assert_eq!(persist.storage, StorageKind::File { dir: "/tmp/t".into() });
    }
}

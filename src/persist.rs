//! Reading and writing the `{people, rootIdStack}` snapshot.
//!
//! The snapshot is the single interchange shape shared by the store, import,
//! merge, and export. Everything arriving through here is untrusted until it
//! passes the validation gate in [`crate::graph::validate`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::graph::model::People;

/// The on-disk and wire shape of a whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub people: People,
    #[serde(default)]
    pub root_id_stack: Vec<String>,
}

/// Load a snapshot, or `None` when the file does not exist yet.
///
/// Malformed JSON is an error here; whether that is fatal (CLI) or an
/// empty-state fallback (TUI) is the caller's decision.
pub fn load(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(snapshot))
}

/// Write a snapshot atomically (write to a sibling temp file, then rename).
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let text = serde_json::to_string_pretty(snapshot).context("serialising tree")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Parse a snapshot from external JSON text (import/merge/share-restore).
pub fn from_json(text: &str) -> Result<Snapshot> {
    serde_json::from_str(text).context("parsing tree snapshot")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Gender, PersonDetails, ROOT_ID};
    use tempfile::TempDir;

    fn snapshot() -> Snapshot {
        Snapshot {
            people: People::with_founder(PersonDetails {
                first_name: "Ada".to_string(),
                last_name: "Byron".to_string(),
                gender: Gender::Female,
                ..PersonDetails::default()
            }),
            root_id_stack: vec![ROOT_ID.to_string()],
        }
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("tree.json")).unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.json");
        let snap = snapshot();
        save(&path, &snap).unwrap();
        assert_eq!(load(&path).unwrap(), Some(snap));
        assert!(!dir.path().join("tree.json.tmp").exists());
    }

    #[test]
    fn wire_shape_uses_interchange_names() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(json.contains("\"people\""));
        assert!(json.contains("\"rootIdStack\""));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn missing_stack_defaults_to_empty() {
        let snap = from_json(r#"{"people": {}}"#).unwrap();
        assert!(snap.root_id_stack.is_empty());
    }
}

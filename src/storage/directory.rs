use super::{DatasetHandle, DatasetStore};
use crate::error::{QaError, Result};
use crate::ingestion::{self, SourceFormat};
use crate::table::Table;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Upload-folder store: every dataset is a file, the newest file is current.
///
/// Files dropped into the folder by other means count too, as long as their
/// extension is one ingestion understands.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open (creating if needed) the upload directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Supported files with their modification time, oldest first.
    fn entries(&self) -> Result<Vec<(DateTime<Utc>, PathBuf)>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if !path.is_file() || !SourceFormat::is_supported(&name) {
                continue;
            }
            let modified: DateTime<Utc> = entry.metadata()?.modified()?.into();
            entries.push((modified, path));
        }
        // equal timestamps fall back to the file name, which for our own
        // files starts with a nanosecond timestamp
        entries.sort();
        Ok(entries)
    }

    fn handle_for(modified: DateTime<Utc>, path: &Path) -> DatasetHandle {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        DatasetHandle {
            id: file_name.clone(),
            name: file_name,
            created_at: modified,
        }
    }
}

/// Keep only characters that are safe in a file name.
fn sanitize_stem(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "dataset".to_string()
    } else {
        cleaned
    }
}

impl DatasetStore for DirectoryStore {
    fn put(&self, name: &str, bytes: &[u8], table: Table) -> Result<DatasetHandle> {
        let format = SourceFormat::from_file_name(name)?;
        let now = Utc::now();
        let file_name = format!(
            "{}-{}-{}.{}",
            now.format("%Y%m%dT%H%M%S%.9f"),
            sanitize_stem(name),
            Uuid::new_v4().simple(),
            format.extension()
        );
        let path = self.root.join(&file_name);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), rows = table.row_count(), "stored dataset");
        Ok(DatasetHandle {
            id: file_name,
            name: name.to_string(),
            created_at: now,
        })
    }

    fn current(&self) -> Result<Option<Arc<Table>>> {
        let Some((_, path)) = self.entries()?.pop() else {
            return Ok(None);
        };
        debug!(path = %path.display(), "loading current dataset");
        let table = ingestion::load_path(&path).map_err(|e| {
            QaError::Storage(format!("failed to load {}: {}", path.display(), e))
        })?;
        Ok(Some(Arc::new(table)))
    }

    fn list(&self) -> Result<Vec<DatasetHandle>> {
        Ok(self
            .entries()?
            .iter()
            .map(|(modified, path)| Self::handle_for(*modified, path))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnKind};
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("Q3 sales (final).csv"), "Q3salesfinal");
        assert_eq!(sanitize_stem("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_stem("???.csv"), "dataset");
    }

    #[test]
    fn test_open_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("uploads");
        let store = DirectoryStore::open(&root).unwrap();
        assert!(store.root().is_dir());
        assert!(store.current().unwrap().is_none());
    }

    #[test]
    fn test_ignores_unsupported_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();
        let store = DirectoryStore::open(temp_dir.path()).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_put_persists_and_becomes_current() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirectoryStore::open(temp_dir.path()).unwrap();
        let bytes = b"Region,Sales\nA,1\nB,2\n";
        let table = ingestion::load_bytes("sales.csv", bytes).unwrap();
        let handle = store.put("sales.csv", bytes, table).unwrap();
        assert!(handle.id.contains("-sales-") && handle.id.ends_with(".csv"));
        assert_eq!(std::fs::read(temp_dir.path().join(&handle.id)).unwrap(), bytes.to_vec());

        let current = store.current().unwrap().unwrap();
        assert_eq!(current.row_count(), 2);
        assert_eq!(current.column_names(), vec!["Region", "Sales"]);
    }

    #[test]
    fn test_reload_keeps_column_kinds() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirectoryStore::open(temp_dir.path()).unwrap();
        let bytes = br#"[{"Zip":"02134","Sales":5},{"Zip":"10001","Sales":7}]"#;
        let table = ingestion::load_bytes("zips.json", bytes).unwrap();
        let handle = store.put("zips.json", bytes, table.clone()).unwrap();
        assert!(handle.id.ends_with(".json"));

        let current = store.current().unwrap().unwrap();
        assert_eq!(*current, table);
        assert_eq!(current.column("Zip").unwrap().kind(), ColumnKind::Categorical);
    }

    #[test]
    fn test_put_rejects_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirectoryStore::open(temp_dir.path()).unwrap();
        let table = Table::new(vec![Column::numeric("n", [1.0])]).unwrap();
        assert!(store.put("notes.txt", b"n\n1\n", table).is_err());
        assert!(store.list().unwrap().is_empty());
    }
}

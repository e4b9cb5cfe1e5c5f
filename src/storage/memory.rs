use super::{DatasetHandle, DatasetStore};
use crate::error::{QaError, Result};
use crate::table::Table;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Process-local store; the most recent `put` is current.
#[derive(Default)]
pub struct MemoryStore {
    datasets: Mutex<Vec<(DatasetHandle, Arc<Table>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<(DatasetHandle, Arc<Table>)>>> {
        self.datasets
            .lock()
            .map_err(|_| QaError::Storage("dataset store lock poisoned".to_string()))
    }
}

impl DatasetStore for MemoryStore {
    fn put(&self, name: &str, _bytes: &[u8], table: Table) -> Result<DatasetHandle> {
        let handle = DatasetHandle {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.lock()?.push((handle.clone(), Arc::new(table)));
        Ok(handle)
    }

    fn current(&self) -> Result<Option<Arc<Table>>> {
        Ok(self.lock()?.last().map(|(_, table)| Arc::clone(table)))
    }

    fn list(&self) -> Result<Vec<DatasetHandle>> {
        Ok(self.lock()?.iter().map(|(handle, _)| handle.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table(rows: usize) -> Table {
        Table::new(vec![Column::numeric("n", (0..rows).map(|i| i as f64))]).unwrap()
    }

    #[test]
    fn test_empty_store_has_no_current() {
        let store = MemoryStore::new();
        assert!(store.current().unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_latest_put_is_current() {
        let store = MemoryStore::new();
        store.put("first.csv", b"", table(1)).unwrap();
        let second = store.put("second.csv", b"", table(2)).unwrap();
        assert_eq!(store.current().unwrap().unwrap().row_count(), 2);
        let names: Vec<_> = store.list().unwrap().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["first.csv", "second.csv"]);
        assert_eq!(store.list().unwrap()[1].id, second.id);
    }
}

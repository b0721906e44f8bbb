use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::ports::storage::{StorageError, StoragePort};

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl StoragePort for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_remove_forgets() {
        let storage = MemoryStorage::default();
        assert_eq!(storage.get_item("k").expect("read"), None);
        storage.set_item("k", "one").expect("write");
        storage.set_item("k", "two").expect("overwrite");
        assert_eq!(storage.get_item("k").expect("read").as_deref(), Some("two"));
        storage.remove_item("k").expect("remove");
        storage.remove_item("k").expect("remove missing");
        assert_eq!(storage.get_item("k").expect("read"), None);
    }
}

// src/storage/memory.rs

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::common::error::AppError;
use crate::storage::KeyValueStore;

/// Store en memoria. Es el doble de pruebas del localStorage original y
/// también sirve para correr el backend sin disco.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    max_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_bytes: Some(max_bytes),
        }
    }

    fn current_size(entries: &HashMap<String, String>) -> u64 {
        entries
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut entries = self.entries.write().unwrap();

        if let Some(max) = self.max_bytes {
            let without_old = Self::current_size(&entries)
                - entries.get(key).map(|v| (key.len() + v.len()) as u64).unwrap_or(0);
            let projected = without_old + (key.len() + value.len()) as u64;
            if projected > max {
                return Err(AppError::StorageQuota);
            }
        }

        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, AppError> {
        Ok(self.entries.read().unwrap().keys().cloned().collect())
    }

    async fn size_bytes(&self) -> Result<u64, AppError> {
        let entries = self.entries.read().unwrap();
        Ok(Self::current_size(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryStore::new();
        store.set_raw("cart", "[1,2]".into()).await.unwrap();
        assert_eq!(store.get_raw("cart").await.unwrap().unwrap(), "[1,2]");

        store.remove("cart").await.unwrap();
        assert!(store.get_raw("cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn quota_rejects_oversized_write() {
        let store = MemoryStore::with_max_bytes(16);
        let err = store
            .set_raw("quotations", "x".repeat(64))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageQuota));

        // Nada quedó escrito a medias.
        assert!(store.get_raw("quotations").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn quota_counts_replacement_not_sum() {
        let store = MemoryStore::with_max_bytes(40);
        store.set_raw("k", "a".repeat(30)).await.unwrap();
        // Reemplazar el mismo valor no debe contar el viejo y el nuevo juntos.
        store.set_raw("k", "b".repeat(30)).await.unwrap();
        assert_eq!(store.get_raw("k").await.unwrap().unwrap(), "b".repeat(30));
    }
}

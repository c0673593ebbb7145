// src/storage/file.rs

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::common::error::AppError;
use crate::storage::{KeyValueStore, KEY_PREFIX};

/// Store respaldado en disco: un archivo JSON por clave, dentro de un
/// directorio. Las claves llevan el prefijo histórico `ferreteria_`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    max_bytes: Option<u64>,
}

impl FileStore {
    pub async fn new(dir: impl Into<PathBuf>, max_bytes: Option<u64>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("no se pudo crear {}: {}", dir.display(), e))?;
        Ok(Self { dir, max_bytes })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}.json", KEY_PREFIX, key))
    }

    async fn total_size(&self) -> Result<u64, AppError> {
        let mut total = 0u64;
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| anyhow::anyhow!("no se pudo leer {}: {}", self.dir.display(), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| anyhow::anyhow!("error recorriendo el directorio: {}", e))?
        {
            if let Ok(meta) = entry.metadata().await {
                if meta.is_file() {
                    total += meta.len();
                }
            }
        }
        Ok(total)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::anyhow!("error leyendo '{}': {}", key, e).into()),
        }
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), AppError> {
        if let Some(max) = self.max_bytes {
            let path = self.path_for(key);
            let old_len = fs::metadata(&path).await.map(|m| m.len()).unwrap_or(0);
            let projected = self.total_size().await? - old_len + value.len() as u64;
            if projected > max {
                return Err(AppError::StorageQuota);
            }
        }

        fs::write(self.path_for(key), value)
            .await
            .map_err(|e| anyhow::anyhow!("error escribiendo '{}': {}", key, e))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::anyhow!("error borrando '{}': {}", key, e).into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, AppError> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| anyhow::anyhow!("no se pudo leer {}: {}", self.dir.display(), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| anyhow::anyhow!("error recorriendo el directorio: {}", e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(rest) = name.strip_prefix(KEY_PREFIX) {
                if let Some(key) = rest.strip_suffix(".json") {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn size_bytes(&self) -> Result<u64, AppError> {
        self.total_size().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), None).await.unwrap();

        store.set_raw("orders", "[]".into()).await.unwrap();
        assert_eq!(store.get_raw("orders").await.unwrap().unwrap(), "[]");

        // El archivo en disco lleva el prefijo de namespace.
        assert!(dir.path().join("ferreteria_orders.json").exists());
        assert_eq!(store.keys().await.unwrap(), vec!["orders".to_string()]);
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), None).await.unwrap();
        assert!(store.get_raw("nada").await.unwrap().is_none());
        // remove de algo inexistente no es error
        store.remove("nada").await.unwrap();
    }

    #[tokio::test]
    async fn quota_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), Some(10)).await.unwrap();
        let err = store
            .set_raw("quotations", "x".repeat(100))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageQuota));
    }
}

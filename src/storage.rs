// src/storage.rs
//
// Persistencia clave-valor con prefijo de namespace y valores JSON,
// detrás de un trait para poder inyectar una implementación en memoria
// en los tests. El guardado nunca debe bloquear mostrar un resultado:
// los servicios tratan el fallo de escritura como degradación, no abort.

pub mod error_log;
pub mod file;
pub mod memory;
pub mod order_repo;
pub mod quotation_repo;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::common::error::AppError;

// Prefijo histórico de las claves del sitio.
pub const KEY_PREFIX: &str = "ferreteria_";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Escribe el valor. Devuelve `StorageQuota` si el store superaría
    /// su capacidad configurada.
    async fn set_raw(&self, key: &str, value: String) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Claves presentes (sin el prefijo).
    async fn keys(&self) -> Result<Vec<String>, AppError>;

    /// Tamaño aproximado ocupado, en bytes.
    async fn size_bytes(&self) -> Result<u64, AppError>;
}

pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, AppError> {
    match store.get_raw(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)?;
    store.set_raw(key, raw).await
}

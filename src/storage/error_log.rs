// src/storage/error_log.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::common::error::AppError;
use crate::storage::{get_json, set_json, KeyValueStore};

const KEY: &str = "error_logs";

// El log nunca crece sin límite: tope duro al escribir.
const MAX_LOGS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub message: String,
}

#[derive(Clone)]
pub struct ErrorLogRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ErrorLogRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_all(&self) -> Result<Vec<ErrorLogEntry>, AppError> {
        Ok(get_json(self.store.as_ref(), KEY).await?.unwrap_or_default())
    }

    pub async fn save_all(&self, logs: &[ErrorLogEntry]) -> Result<(), AppError> {
        set_json(self.store.as_ref(), KEY, &logs).await
    }

    /// Registra un error. Si ni siquiera se puede escribir el log, solo
    /// lo reporta por tracing: el log no puede tirar abajo la operación.
    pub async fn append(&self, context: &str, message: &str) {
        let entry = ErrorLogEntry {
            timestamp: Utc::now(),
            context: context.to_string(),
            message: message.to_string(),
        };

        let result = async {
            let mut logs = self.load_all().await?;
            logs.push(entry);
            if logs.len() > MAX_LOGS {
                let excess = logs.len() - MAX_LOGS;
                logs.drain(..excess);
            }
            self.save_all(&logs).await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!("no se pudo guardar el log de error: {}", e);
        }
    }

    /// Descarta entradas más viejas que `retention_days`. Devuelve
    /// cuántas se eliminaron.
    pub async fn trim_older_than(&self, retention_days: i64) -> Result<usize, AppError> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let logs = self.load_all().await?;
        let before = logs.len();

        let kept: Vec<_> = logs.into_iter().filter(|l| l.timestamp > cutoff).collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.save_all(&kept).await?;
        }
        Ok(removed)
    }

    /// Recorte de emergencia: conserva solo las últimas `keep` entradas.
    pub async fn truncate_to_last(&self, keep: usize) -> Result<(), AppError> {
        let mut logs = self.load_all().await?;
        if logs.len() > keep {
            let excess = logs.len() - keep;
            logs.drain(..excess);
            self.save_all(&logs).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn repo() -> ErrorLogRepository {
        ErrorLogRepository::new(Arc::new(MemoryStore::new()))
    }

    fn entry(age_days: i64, context: &str) -> ErrorLogEntry {
        ErrorLogEntry {
            timestamp: Utc::now() - Duration::days(age_days),
            context: context.to_string(),
            message: "falló el guardado".to_string(),
        }
    }

    #[tokio::test]
    async fn append_caps_total_entries() {
        let repo = repo();
        for i in 0..(MAX_LOGS + 5) {
            repo.append("quotation.save", &format!("intento {}", i)).await;
        }

        let logs = repo.load_all().await.unwrap();
        assert_eq!(logs.len(), MAX_LOGS);
        // Sobreviven las más nuevas.
        assert_eq!(logs.last().unwrap().message, format!("intento {}", MAX_LOGS + 4));
    }

    #[tokio::test]
    async fn retention_drops_entries_past_cutoff() {
        let repo = repo();
        let seeded = vec![
            entry(10, "viejo"),
            entry(8, "viejo"),
            entry(2, "reciente"),
            entry(0, "reciente"),
        ];
        repo.save_all(&seeded).await.unwrap();

        let removed = repo.trim_older_than(7).await.unwrap();
        assert_eq!(removed, 2);

        let kept = repo.load_all().await.unwrap();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|l| l.context == "reciente"));

        // Segunda pasada: nada para borrar.
        assert_eq!(repo.trim_older_than(7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn emergency_truncation_keeps_last_entries() {
        let repo = repo();
        let seeded: Vec<_> = (0..30).map(|i| entry(0, &format!("c{}", i))).collect();
        repo.save_all(&seeded).await.unwrap();

        repo.truncate_to_last(20).await.unwrap();

        let kept = repo.load_all().await.unwrap();
        assert_eq!(kept.len(), 20);
        assert_eq!(kept.first().unwrap().context, "c10");
        assert_eq!(kept.last().unwrap().context, "c29");
    }
}

// src/services/cleanup_service.rs
//
// Limpieza periódica del almacenamiento: barrido de cotizaciones
// vencidas, retención de logs de error y control de cuota con limpieza
// de emergencia cuando el uso se acerca al tope.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::common::notify::{Severity, SharedNotifier};
use crate::services::quotation_service::QuotationService;
use crate::storage::error_log::ErrorLogRepository;
use crate::storage::KeyValueStore;

// Umbral de uso a partir del cual se dispara la limpieza de emergencia.
const CRITICAL_USAGE_PCT: f64 = 90.0;
const WARNING_USAGE_PCT: f64 = 75.0;

// En emergencia, los logs se recortan a las últimas 20 entradas.
const EMERGENCY_LOG_KEEP: usize = 20;

#[derive(Debug, Clone)]
pub struct CleanupSettings {
    pub check_interval_secs: u64,
    pub error_log_retention_days: i64,
    pub max_storage_bytes: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: 3600,
            error_log_retention_days: 7,
            max_storage_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupStats {
    pub quotations_removed: usize,
    pub logs_removed: usize,
    pub storage_warnings: usize,
}

#[derive(Clone)]
pub struct CleanupService {
    store: Arc<dyn KeyValueStore>,
    quotations: QuotationService,
    error_log: ErrorLogRepository,
    settings: CleanupSettings,
    notifier: SharedNotifier,
}

impl CleanupService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        quotations: QuotationService,
        error_log: ErrorLogRepository,
        settings: CleanupSettings,
        notifier: SharedNotifier,
    ) -> Self {
        Self {
            store,
            quotations,
            error_log,
            settings,
            notifier,
        }
    }

    /// Una pasada completa de limpieza. Cada tarea es independiente: un
    /// fallo en una no frena a las demás.
    pub async fn run_once(&self) -> CleanupStats {
        let mut stats = CleanupStats::default();

        match self.quotations.clean_expired_quotations().await {
            Ok(removed) => stats.quotations_removed = removed,
            Err(e) => tracing::error!("error al limpiar cotizaciones expiradas: {}", e),
        }

        match self
            .error_log
            .trim_older_than(self.settings.error_log_retention_days)
            .await
        {
            Ok(removed) => stats.logs_removed = removed,
            Err(e) => tracing::error!("error al limpiar logs viejos: {}", e),
        }

        match self.check_storage_quota().await {
            Ok(warnings) => stats.storage_warnings = warnings,
            Err(e) => tracing::error!("error al verificar la cuota de almacenamiento: {}", e),
        }

        tracing::debug!(
            "limpieza: {} cotizaciones, {} logs, {} avisos de cuota",
            stats.quotations_removed,
            stats.logs_removed,
            stats.storage_warnings
        );
        stats
    }

    /// Controla el uso del almacenamiento contra el tope configurado.
    /// ≥90%: aviso y limpieza de emergencia. ≥75%: solo aviso.
    async fn check_storage_quota(&self) -> Result<usize, AppError> {
        let used = self.store.size_bytes().await?;
        let max = self.settings.max_storage_bytes;
        if max == 0 {
            return Ok(0);
        }
        let usage_pct = (used as f64 / max as f64) * 100.0;

        if usage_pct >= CRITICAL_USAGE_PCT {
            tracing::warn!(
                "almacenamiento crítico: {} / {} bytes ({:.1}%)",
                used,
                max,
                usage_pct
            );
            self.notifier.notify(
                &format!("Almacenamiento casi lleno: {} / {} bytes", used, max),
                Severity::Warning,
            );
            self.attempt_emergency_cleanup().await;
            Ok(1)
        } else if usage_pct >= WARNING_USAGE_PCT {
            tracing::warn!(
                "almacenamiento alto: {} / {} bytes ({:.1}%)",
                used,
                max,
                usage_pct
            );
            Ok(1)
        } else {
            Ok(0)
        }
    }

    // Evicción de las cotizaciones más viejas y recorte del log.
    async fn attempt_emergency_cleanup(&self) {
        tracing::info!("iniciando limpieza de emergencia...");

        if let Err(e) = self.quotations.emergency_cleanup().await {
            tracing::error!("error durante la limpieza de emergencia: {}", e);
        }
        if let Err(e) = self.error_log.truncate_to_last(EMERGENCY_LOG_KEEP).await {
            tracing::error!("error recortando los logs de error: {}", e);
        }
    }

    /// Tarea recurrente. Se lanza desde main con tokio::spawn.
    pub async fn run_forever(self) {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(self.settings.check_interval_secs));
        // El primer tick es inmediato: la limpieza inicial corre al arrancar.
        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::notify::test_support::RecordingNotifier;
    use crate::services::pricing_service::PriceManager;
    use crate::services::quotation_service::{LineItemRequest, QuotationSettings};
    use crate::storage::memory::MemoryStore;
    use crate::storage::quotation_repo::QuotationRepository;
    use rust_decimal_macros::dec;

    fn build(
        store: Arc<dyn KeyValueStore>,
        max_storage_bytes: u64,
    ) -> (CleanupService, QuotationService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let quotations = QuotationService::new(
            QuotationRepository::new(store.clone()),
            Arc::new(PriceManager::new(Vec::new())),
            QuotationSettings::default(),
            notifier.clone(),
            ErrorLogRepository::new(store.clone()),
        );
        let cleanup = CleanupService::new(
            store.clone(),
            quotations.clone(),
            ErrorLogRepository::new(store),
            CleanupSettings {
                check_interval_secs: 3600,
                error_log_retention_days: 7,
                max_storage_bytes,
            },
            notifier.clone(),
        );
        (cleanup, quotations, notifier)
    }

    fn item() -> LineItemRequest {
        LineItemRequest {
            product_id: None,
            name: "Poste de hormigón".to_string(),
            category: Some("postes".to_string()),
            quantity: dec!(1),
        }
    }

    #[tokio::test]
    async fn run_once_reports_zero_on_clean_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let (cleanup, _, _) = build(store, 5 * 1024 * 1024);

        let stats = cleanup.run_once().await;
        assert_eq!(stats.quotations_removed, 0);
        assert_eq!(stats.logs_removed, 0);
        assert_eq!(stats.storage_warnings, 0);
    }

    #[tokio::test]
    async fn storage_pressure_triggers_emergency_eviction() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        // Tope chico para forzar presión con pocas cotizaciones.
        let (cleanup, quotations, notifier) = build(store, 4096);

        for _ in 0..25 {
            quotations
                .assemble_quotation(vec![item()], None)
                .await
                .unwrap();
        }

        let stats = cleanup.run_once().await;
        assert_eq!(stats.storage_warnings, 1);

        // La evicción dejó como mucho la mitad (mínimo 10), las más nuevas.
        let left = quotations.get_all_quotations().await.unwrap();
        assert!(left.len() <= 13);
        assert!(left.len() >= 10);

        let messages = notifier.messages.lock().unwrap();
        assert!(messages
            .iter()
            .any(|(m, _)| m.contains("Almacenamiento casi lleno")));
    }
}

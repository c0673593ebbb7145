// src/services/quotation_service.rs
//
// Armado y gestión de cotizaciones. El precio unitario lo resuelve el
// PriceManager; la persistencia es degradable: si no se puede guardar,
// se avisa por el notificador y la cotización igual vuelve al caller.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::error::AppError;
use crate::common::notify::{Severity, SharedNotifier};
use crate::models::quotation::{
    Installation, Quotation, QuotationItem, QuotationStatus, QuotationStorageInfo,
};
use crate::services::pricing_service::PriceManager;
use crate::storage::error_log::ErrorLogRepository;
use crate::storage::quotation_repo::QuotationRepository;

// ---
// Validación customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("El valor no puede ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// --- Pedido de línea ---
// Serialize hace falta porque la regla length() del payload de creación
// reporta el valor del campo en los detalles de validación.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: Option<String>,

    #[validate(length(min = 1, message = "El nombre del producto es obligatorio."))]
    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,
}

// --- Pedido de instalación ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallationRequest {
    #[validate(custom(function = "validate_not_negative"))]
    pub linear_meters: Decimal,

    // Si no viene, se usa el precio por metro configurado.
    pub price_per_meter: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct QuotationSettings {
    pub prefix: String,
    pub validity_days: i64,
    pub installation_price_per_meter: Decimal,
}

impl Default for QuotationSettings {
    fn default() -> Self {
        Self {
            prefix: "COT".to_string(),
            validity_days: 30,
            installation_price_per_meter: Decimal::from(500),
        }
    }
}

#[derive(Clone)]
pub struct QuotationService {
    repo: QuotationRepository,
    prices: Arc<PriceManager>,
    settings: QuotationSettings,
    notifier: SharedNotifier,
    error_log: ErrorLogRepository,
}

impl QuotationService {
    pub fn new(
        repo: QuotationRepository,
        prices: Arc<PriceManager>,
        settings: QuotationSettings,
        notifier: SharedNotifier,
        error_log: ErrorLogRepository,
    ) -> Self {
        Self {
            repo,
            prices,
            settings,
            notifier,
            error_log,
        }
    }

    // COT-{millis}-{sufijo de 3 dígitos}. El formato histórico se
    // conserva, pero el sufijo sale de un UUID v4 en vez de Math.random.
    // La unicidad sigue siendo probabilística (ver DESIGN.md).
    fn generate_id(&self) -> String {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().as_u128() % 1000;
        format!("{}-{}-{:03}", self.settings.prefix, millis, suffix)
    }

    /// Arma una cotización nueva y la intenta persistir. Dos llamadas
    /// con los mismos ítems producen cotizaciones distintas: esto no es
    /// idempotente a propósito.
    pub async fn assemble_quotation(
        &self,
        line_items: Vec<LineItemRequest>,
        installation: Option<InstallationRequest>,
    ) -> Result<Quotation, AppError> {
        let mut items = Vec::with_capacity(line_items.len());

        for request in line_items {
            request.validate()?;

            let category = request.category.unwrap_or_else(|| "general".to_string());
            let quote = self.prices.get_product_price(
                request.product_id.as_deref(),
                &request.name,
                &category,
            );

            let subtotal = request.quantity * quote.price;
            items.push(QuotationItem {
                id: request
                    .product_id
                    .unwrap_or_else(|| slug_from_name(&request.name)),
                name: request.name,
                category,
                quantity: request.quantity,
                unit_price: quote.price,
                subtotal,
            });
        }

        if let Some(req) = &installation {
            req.validate()?;
        }

        let installation = installation.map(|req| {
            let price_per_meter = req
                .price_per_meter
                .unwrap_or(self.settings.installation_price_per_meter);
            Installation {
                linear_meters: req.linear_meters,
                price_per_meter,
                subtotal: req.linear_meters * price_per_meter,
            }
        });

        let subtotal: Decimal = items.iter().map(|i| i.subtotal).sum();
        let total = subtotal
            + installation
                .as_ref()
                .map(|i| i.subtotal)
                .unwrap_or(Decimal::ZERO);

        let now = Utc::now();
        let quotation = Quotation {
            id: self.generate_id(),
            date: now,
            valid_until: now + Duration::days(self.settings.validity_days),
            items,
            installation,
            subtotal,
            total,
            status: QuotationStatus::Draft,
        };

        // El guardado nunca bloquea el resultado: si falla, se avisa y
        // la cotización armada vuelve igual.
        if let Err(e) = self.repo.push(&quotation).await {
            tracing::warn!("no se pudo guardar la cotización {}: {}", quotation.id, e);
            self.error_log
                .append("quotation.save", &e.to_string())
                .await;
            self.notifier.notify(
                "No se pudo guardar la cotización. Verifica el espacio disponible.",
                Severity::Warning,
            );
        } else {
            self.notifier
                .notify("Cotización guardada correctamente", Severity::Success);
        }

        Ok(quotation)
    }

    pub async fn get_quotation_by_id(&self, id: &str) -> Result<Quotation, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::QuotationNotFound(id.to_string()))
    }

    pub async fn get_all_quotations(&self) -> Result<Vec<Quotation>, AppError> {
        self.repo.load_all().await
    }

    pub async fn get_valid_quotations(&self) -> Result<Vec<Quotation>, AppError> {
        let now = Utc::now();
        Ok(self
            .repo
            .load_all()
            .await?
            .into_iter()
            .filter(|q| !q.is_expired(now))
            .collect())
    }

    pub async fn get_expired_quotations(&self) -> Result<Vec<Quotation>, AppError> {
        let now = Utc::now();
        Ok(self
            .repo
            .load_all()
            .await?
            .into_iter()
            .filter(|q| q.is_expired(now))
            .collect())
    }

    pub async fn delete_quotation(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::QuotationNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Barrido de expiración: elimina las cotizaciones vencidas y
    /// devuelve cuántas se fueron.
    pub async fn clean_expired_quotations(&self) -> Result<usize, AppError> {
        let all = self.repo.load_all().await?;
        let now = Utc::now();
        let before = all.len();

        let kept: Vec<Quotation> = all.into_iter().filter(|q| !q.is_expired(now)).collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.repo.save_all(&kept).await?;
            tracing::info!("se eliminaron {} cotizaciones expiradas", removed);
        }
        Ok(removed)
    }

    /// Limpieza de emergencia por presión de almacenamiento: conserva
    /// las más recientes, `max(10, mitad)`.
    pub async fn emergency_cleanup(&self) -> Result<usize, AppError> {
        let mut all = self.repo.load_all().await?;
        if all.is_empty() {
            return Ok(0);
        }

        all.sort_by_key(|q| q.date);
        let to_keep = std::cmp::max(10, all.len() / 2);
        if all.len() <= to_keep {
            return Ok(0);
        }

        let removed = all.len() - to_keep;
        let kept = all.split_off(removed);
        self.repo.save_all(&kept).await?;
        tracing::info!(
            "limpieza de emergencia: se mantuvieron {} cotizaciones recientes",
            to_keep
        );
        Ok(removed)
    }

    pub async fn storage_info(&self) -> Result<QuotationStorageInfo, AppError> {
        let all = self.repo.load_all().await?;
        let now = Utc::now();
        let expired_count = all.iter().filter(|q| q.is_expired(now)).count();
        let approx_bytes = serde_json::to_string(&all)?.len() as u64;

        Ok(QuotationStorageInfo {
            count: all.len(),
            valid_count: all.len() - expired_count,
            expired_count,
            approx_bytes,
        })
    }
}

fn slug_from_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::notify::test_support::RecordingNotifier;
    use crate::storage::memory::MemoryStore;
    use rust_decimal_macros::dec;

    fn service_with_store(store: Arc<MemoryStore>) -> (QuotationService, Arc<RecordingNotifier>) {
        let store: Arc<dyn crate::storage::KeyValueStore> = store;
        let notifier = Arc::new(RecordingNotifier::default());
        let service = QuotationService::new(
            QuotationRepository::new(store.clone()),
            Arc::new(PriceManager::new(Vec::new())),
            QuotationSettings::default(),
            notifier.clone(),
            ErrorLogRepository::new(store),
        );
        (service, notifier)
    }

    fn service() -> QuotationService {
        service_with_store(Arc::new(MemoryStore::new())).0
    }

    fn posts_item(quantity: Decimal) -> LineItemRequest {
        LineItemRequest {
            product_id: None,
            name: "Poste de hormigón".to_string(),
            category: Some("postes".to_string()),
            quantity,
        }
    }

    #[tokio::test]
    async fn totals_scenario_with_installation() {
        // 10 @ 3500 + 5 @ 2500 = 47500; instalación 100 m @ 500 = 50000.
        let quotation = service_scenario().await;
        assert_eq!(quotation.subtotal, dec!(47500));
        assert_eq!(
            quotation.installation.as_ref().unwrap().subtotal,
            dec!(50000)
        );
        assert_eq!(quotation.total, dec!(97500));
    }

    // Arma el escenario normativo: dos líneas (3500 y 2500) más 100 m
    // de instalación a 500.
    async fn service_scenario() -> Quotation {
        let catalog = PriceManager::new(vec![
            crate::models::catalog::Product {
                id: "poste-hormigon".to_string(),
                name: "Poste de hormigón".to_string(),
                category: "postes".to_string(),
                subcategory: String::new(),
                description: String::new(),
                price: dec!(3500),
                price_unit: "unidad".to_string(),
                stock: 100,
            },
            crate::models::catalog::Product {
                id: "varilla-12".to_string(),
                name: "Varilla de anclaje".to_string(),
                category: "accesorios".to_string(),
                subcategory: String::new(),
                description: String::new(),
                price: dec!(2500),
                price_unit: "unidad".to_string(),
                stock: 10,
            },
        ]);
        let store: Arc<dyn crate::storage::KeyValueStore> = Arc::new(MemoryStore::new());
        let svc = QuotationService::new(
            QuotationRepository::new(store.clone()),
            Arc::new(catalog),
            QuotationSettings::default(),
            Arc::new(RecordingNotifier::default()),
            ErrorLogRepository::new(store),
        );

        svc.assemble_quotation(
            vec![
                LineItemRequest {
                    product_id: Some("poste-hormigon".to_string()),
                    name: "Poste de hormigón".to_string(),
                    category: Some("postes".to_string()),
                    quantity: dec!(10),
                },
                LineItemRequest {
                    product_id: Some("varilla-12".to_string()),
                    name: "Varilla de anclaje".to_string(),
                    category: Some("accesorios".to_string()),
                    quantity: dec!(5),
                },
            ],
            Some(InstallationRequest {
                linear_meters: dec!(100),
                price_per_meter: Some(dec!(500)),
            }),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn not_idempotent_but_totals_match() {
        let svc = service();
        let q1 = svc
            .assemble_quotation(vec![posts_item(dec!(10))], None)
            .await
            .unwrap();
        let q2 = svc
            .assemble_quotation(vec![posts_item(dec!(10))], None)
            .await
            .unwrap();

        assert_ne!(q1.id, q2.id);
        assert_eq!(q1.total, q2.total);
    }

    #[tokio::test]
    async fn id_format_and_validity_window() {
        let svc = service();
        let before = Utc::now();
        let q = svc
            .assemble_quotation(vec![posts_item(dec!(1))], None)
            .await
            .unwrap();

        assert!(q.id.starts_with("COT-"));
        let suffix = q.id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 3);

        // validUntil sale del mismo instante que date: igualdad exacta.
        let expected = q.date + Duration::days(30);
        assert_eq!(q.valid_until, expected);
        assert!(q.date >= before);
        assert_eq!(q.status, QuotationStatus::Draft);
    }

    #[tokio::test]
    async fn persisted_and_retrievable() {
        let svc = service();
        let q = svc
            .assemble_quotation(vec![posts_item(dec!(2))], None)
            .await
            .unwrap();

        let loaded = svc.get_quotation_by_id(&q.id).await.unwrap();
        assert_eq!(loaded, q);

        svc.delete_quotation(&q.id).await.unwrap();
        assert!(matches!(
            svc.get_quotation_by_id(&q.id).await,
            Err(AppError::QuotationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let svc = service();
        assert!(matches!(
            svc.get_quotation_by_id("COT-0-000").await,
            Err(AppError::QuotationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn expiry_sweep_removes_past_quotations() {
        let (svc, _) = service_with_store(Arc::new(MemoryStore::new()));
        let fresh = svc
            .assemble_quotation(vec![posts_item(dec!(1))], None)
            .await
            .unwrap();
        let mut stale = svc
            .assemble_quotation(vec![posts_item(dec!(1))], None)
            .await
            .unwrap();

        // Vencemos la segunda a mano y la reescribimos.
        stale.valid_until = Utc::now() - Duration::days(1);
        let mut all = svc.get_all_quotations().await.unwrap();
        for q in &mut all {
            if q.id == stale.id {
                q.valid_until = stale.valid_until;
            }
        }
        svc.repo.save_all(&all).await.unwrap();

        assert_eq!(svc.get_expired_quotations().await.unwrap().len(), 1);
        let removed = svc.clean_expired_quotations().await.unwrap();
        assert_eq!(removed, 1);

        let remaining = svc.get_all_quotations().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, fresh.id);
    }

    #[tokio::test]
    async fn emergency_cleanup_keeps_most_recent_half() {
        let (svc, _) = service_with_store(Arc::new(MemoryStore::new()));
        for _ in 0..30 {
            svc.assemble_quotation(vec![posts_item(dec!(1))], None)
                .await
                .unwrap();
        }

        let removed = svc.emergency_cleanup().await.unwrap();
        assert_eq!(removed, 15);

        // Quedan las 15 más recientes, ordenadas por fecha.
        let kept = svc.get_all_quotations().await.unwrap();
        assert_eq!(kept.len(), 15);
        assert!(kept.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[tokio::test]
    async fn storage_failure_degrades_but_returns_quotation() {
        // Cuota minúscula: el push va a fallar sí o sí.
        let (svc, notifier) = service_with_store(Arc::new(MemoryStore::with_max_bytes(8)));

        let q = svc
            .assemble_quotation(vec![posts_item(dec!(3))], None)
            .await
            .expect("el cálculo debe volver aunque no se pueda persistir");
        assert!(q.total > Decimal::ZERO);

        let messages = notifier.messages.lock().unwrap();
        assert!(messages
            .iter()
            .any(|(m, s)| *s == Severity::Warning && m.contains("No se pudo guardar")));
    }
}

// src/config.rs

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::common::notify::{SharedNotifier, TracingNotifier};
use crate::services::calculator_service::{CalculatorService, CalculatorSettings};
use crate::services::cleanup_service::{CleanupService, CleanupSettings};
use crate::services::document_service::{DocumentService, DocumentSettings};
use crate::services::order_service::{OrderService, OrderSettings};
use crate::services::pricing_service::PriceManager;
use crate::services::quotation_service::{QuotationService, QuotationSettings};
use crate::storage::error_log::ErrorLogRepository;
use crate::storage::file::FileStore;
use crate::storage::order_repo::OrderRepository;
use crate::storage::quotation_repo::QuotationRepository;
use crate::storage::KeyValueStore;

#[derive(Clone)]
pub struct AppState {
    pub calculator: CalculatorService,
    pub quotations: QuotationService,
    pub orders: OrderService,
    pub cleanup: CleanupService,
    pub documents: DocumentService,
    pub prices: Arc<PriceManager>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // --- Almacenamiento ---
        let storage_dir = env_or("STORAGE_DIR", "./data");
        let max_storage_bytes = env_parse("MAX_STORAGE_MB", 5u64) * 1024 * 1024;
        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::new(PathBuf::from(&storage_dir), Some(max_storage_bytes)).await?,
        );
        tracing::info!("✅ Almacenamiento listo en {}", storage_dir);

        // --- Catálogo de precios ---
        let catalog_path = env_or("CATALOG_PATH", "./data/products.json");
        let prices = Arc::new(PriceManager::from_json_file(catalog_path.as_ref()));

        let notifier: SharedNotifier = Arc::new(TracingNotifier);
        let error_log = ErrorLogRepository::new(store.clone());

        // --- Arma el grafo de dependencias ---
        let calculator = CalculatorService::new(CalculatorSettings {
            default_post_spacing: env_parse("POST_SPACING", 2.5),
            corner_posts: env_parse("CORNER_POSTS", 4),
            mesh_roll_length: env_parse("MESH_ROLL_LENGTH", 10.0),
            wire_kg_per_meter: env_parse("WIRE_KG_PER_METER", 0.15),
            default_wire_strands: env_parse("WIRE_STRANDS", 5),
            default_mesh_height: env_parse("MESH_HEIGHT", 1.5),
        });

        let quotations = QuotationService::new(
            QuotationRepository::new(store.clone()),
            prices.clone(),
            QuotationSettings {
                prefix: env_or("QUOTATION_PREFIX", "COT"),
                validity_days: env_parse("QUOTATION_VALIDITY_DAYS", 30),
                installation_price_per_meter: env_parse(
                    "INSTALLATION_PRICE_PER_METER",
                    Decimal::from(500),
                ),
            },
            notifier.clone(),
            error_log.clone(),
        );

        let orders = OrderService::new(
            OrderRepository::new(store.clone()),
            OrderSettings {
                prefix: env_or("ORDER_PREFIX", "ORD"),
            },
            notifier.clone(),
            error_log.clone(),
        );

        let cleanup = CleanupService::new(
            store.clone(),
            quotations.clone(),
            error_log,
            CleanupSettings {
                check_interval_secs: env_parse("CLEANUP_INTERVAL_SECS", 3600),
                error_log_retention_days: env_parse("ERROR_LOG_RETENTION_DAYS", 7),
                max_storage_bytes,
            },
            notifier,
        );

        let documents = DocumentService::new(DocumentSettings {
            business_name: env_or("BUSINESS_NAME", "Metales & Hierros"),
            fonts_dir: env_or("FONTS_DIR", "./fonts"),
            terms_text: env_or(
                "QUOTATION_TERMS",
                "Cotización válida por 30 días. Precios sujetos a cambios sin previo aviso. No incluye IVA.",
            ),
        });

        Ok(Self {
            calculator,
            quotations,
            orders,
            cleanup,
            documents,
            prices,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

// Un valor inválido no debe frenar el arranque: avisa y usa el default.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("valor inválido para {}, se usa el default", key);
            default
        }),
        Err(_) => default,
    }
}

// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Producto del catálogo ---
// El catálogo se carga de un JSON externo; los campos opcionales toman
// los mismos defaults que usaba el normalizador del frontend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub subcategory: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub price: Decimal,

    #[serde(default = "default_unit")]
    pub price_unit: String,

    #[serde(default)]
    pub stock: i64,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_unit() -> String {
    "unidad".to_string()
}

// --- Precio resuelto ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: Decimal,
    pub unit: String,
}

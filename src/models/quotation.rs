// src/models/quotation.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
}

// --- Ítem cotizado ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotationItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

// --- Servicio de instalación (opcional) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub linear_meters: Decimal,
    pub price_per_meter: Decimal,
    pub subtotal: Decimal,
}

// --- Cotización ---
// subtotal = suma de ítems; total = subtotal + instalación.
// El id es COT-{timestamp}-{sufijo}, igual que generaba el sitio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: String,
    pub date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub items: Vec<QuotationItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation: Option<Installation>,

    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: QuotationStatus,
}

impl Quotation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until <= now
    }
}

// --- Resumen de almacenamiento ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotationStorageInfo {
    pub count: usize,
    pub valid_count: usize,
    pub expired_count: usize,
    pub approx_bytes: u64,
}

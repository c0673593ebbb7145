// src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::quotation::{Installation, QuotationItem};

// --- ENUMS ---

// Enum plano: cualquier transición es válida (p. ej. volver de
// completed a pending). No hay máquina de estados, a propósito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Confirmed => "Confirmado",
            OrderStatus::InProgress => "En Proceso",
            OrderStatus::Completed => "Completado",
            OrderStatus::Cancelled => "Cancelado",
        }
    }
}

// --- Cliente ---
// name y phone son obligatorios; el resto es opcional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub phone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

// --- Historial de estados ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub date: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// --- Pedido ---
// Copia por valor de los ítems y totales de la cotización: después de
// crearse, el pedido no tiene ningún vínculo vivo con ella (solo el id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotation_id: Option<String>,

    pub date: DateTime<Utc>,
    pub customer: Customer,
    pub items: Vec<QuotationItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation: Option<Installation>,

    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,

    // Append-only, nunca vacío: nace con la entrada "pending".
    pub status_history: Vec<StatusEntry>,
}

impl Order {
    pub fn current_status_entry(&self) -> Option<&StatusEntry> {
        self.status_history.last()
    }
}

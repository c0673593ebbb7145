// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    models::order::{Order, OrderStatus},
    services::order_service::CustomerData,
};

// ---
// Payload: CreateOrderPayload
// ---
// La validación de presencia de name/phone corre en el service, que
// nombra el primer campo faltante.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[schema(example = "COT-1700000000000-123")]
    pub quotation_id: String,

    pub customer: CustomerData,
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido creado", body = Order),
        (status = 400, description = "Datos del cliente incompletos"),
        (status = 404, description = "Cotización no encontrada")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    // La cotización tiene que existir; el pedido copia sus datos por valor.
    let quotation = app_state
        .quotations
        .get_quotation_by_id(&payload.quotation_id)
        .await?;

    let order = app_state
        .orders
        .create_order(&quotation, payload.customer)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub phone: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(
        ("status" = Option<String>, Query, description = "pending | confirmed | in_progress | completed | cancelled"),
        ("phone" = Option<String>, Query, description = "Teléfono exacto del cliente"),
        ("from" = Option<String>, Query, description = "Fecha inicial (RFC 3339)"),
        ("to" = Option<String>, Query, description = "Fecha final (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Listado de pedidos", body = [Order])
    )
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = if let Some(status) = query.status {
        app_state.orders.get_orders_by_status(status).await?
    } else if let Some(phone) = query.phone {
        app_state.orders.get_orders_by_customer(&phone).await?
    } else if let (Some(from), Some(to)) = (query.from, query.to) {
        app_state.orders.get_orders_by_date_range(from, to).await?
    } else {
        app_state.orders.get_all_orders().await?
    };

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Id del pedido (ORD-...)")),
    responses(
        (status = 200, description = "Pedido", body = Order),
        (status = 404, description = "No encontrado")
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.orders.get_order_by_id(&id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// ---
// Payload: UpdateStatusPayload
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    #[schema(example = "confirmed")]
    pub status: OrderStatus,

    pub note: Option<String>,
}

// PATCH /api/orders/{id}/status
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    request_body = UpdateStatusPayload,
    params(("id" = String, Path, description = "Id del pedido")),
    responses(
        (status = 200, description = "Pedido actualizado", body = Order),
        (status = 404, description = "No encontrado")
    )
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .orders
        .update_order_status(&id, payload.status, payload.note)
        .await?;
    Ok((StatusCode::OK, Json(order)))
}

// DELETE /api/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Id del pedido")),
    responses(
        (status = 204, description = "Eliminado"),
        (status = 404, description = "No encontrado")
    )
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.orders.delete_order(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/orders/export/csv
#[utoipa::path(
    get,
    path = "/api/orders/export/csv",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedidos en CSV", content_type = "text/csv")
    )
)]
pub async fn export_orders_csv(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.orders.export_csv().await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pedidos.csv\"".to_string(),
            ),
        ],
        csv,
    ))
}

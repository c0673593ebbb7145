// src/handlers/catalog.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    models::catalog::{PriceQuote, Product},
};

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(
        ("category" = Option<String>, Query, description = "Filtra por categoría")
    ),
    responses(
        (status = 200, description = "Productos del catálogo", body = [Product])
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products: Vec<Product> = match query.category {
        Some(category) => app_state
            .prices
            .products_by_category(&category)
            .into_iter()
            .cloned()
            .collect(),
        None => app_state.prices.all_products().to_vec(),
    };
    Ok((StatusCode::OK, Json(products)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub product_id: Option<String>,
    pub name: String,
    pub category: Option<String>,
}

// GET /api/products/price
#[utoipa::path(
    get,
    path = "/api/products/price",
    tag = "Catalog",
    params(
        ("productId" = Option<String>, Query, description = "Id del producto"),
        ("name" = String, Query, description = "Nombre del producto"),
        ("category" = Option<String>, Query, description = "Categoría para el precio de respaldo")
    ),
    responses(
        (status = 200, description = "Precio resuelto", body = PriceQuote)
    )
)]
pub async fn get_product_price(
    State(app_state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state.prices.get_product_price(
        query.product_id.as_deref(),
        &query.name,
        query.category.as_deref().unwrap_or("general"),
    );
    Ok((StatusCode::OK, Json(quote)))
}

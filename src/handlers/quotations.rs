// src/handlers/quotations.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::quotation::{Quotation, QuotationStorageInfo},
    services::quotation_service::{InstallationRequest, LineItemRequest},
};

// ---
// Payload: CreateQuotationPayload
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotationPayload {
    #[validate(length(min = 1, message = "La cotización necesita al menos un ítem."))]
    pub items: Vec<LineItemRequest>,

    pub installation: Option<InstallationRequest>,
}

// POST /api/quotations
#[utoipa::path(
    post,
    path = "/api/quotations",
    tag = "Quotations",
    request_body = CreateQuotationPayload,
    responses(
        (status = 201, description = "Cotización creada", body = Quotation),
        (status = 400, description = "Ítems inválidos")
    )
)]
pub async fn create_quotation(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateQuotationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quotation = app_state
        .quotations
        .assemble_quotation(payload.items, payload.installation)
        .await?;

    Ok((StatusCode::CREATED, Json(quotation)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuotationsQuery {
    // "valid" | "expired"; sin filtro devuelve todas.
    pub filter: Option<String>,
}

// GET /api/quotations
#[utoipa::path(
    get,
    path = "/api/quotations",
    tag = "Quotations",
    params(
        ("filter" = Option<String>, Query, description = "valid | expired")
    ),
    responses(
        (status = 200, description = "Listado de cotizaciones", body = [Quotation])
    )
)]
pub async fn list_quotations(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuotationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let quotations = match query.filter.as_deref() {
        Some("valid") => app_state.quotations.get_valid_quotations().await?,
        Some("expired") => app_state.quotations.get_expired_quotations().await?,
        _ => app_state.quotations.get_all_quotations().await?,
    };
    Ok((StatusCode::OK, Json(quotations)))
}

// GET /api/quotations/{id}
#[utoipa::path(
    get,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    params(("id" = String, Path, description = "Id de la cotización (COT-...)")),
    responses(
        (status = 200, description = "Cotización", body = Quotation),
        (status = 404, description = "No encontrada")
    )
)]
pub async fn get_quotation(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quotation = app_state.quotations.get_quotation_by_id(&id).await?;
    Ok((StatusCode::OK, Json(quotation)))
}

// DELETE /api/quotations/{id}
#[utoipa::path(
    delete,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    params(("id" = String, Path, description = "Id de la cotización")),
    responses(
        (status = 204, description = "Eliminada"),
        (status = 404, description = "No encontrada")
    )
)]
pub async fn delete_quotation(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.quotations.delete_quotation(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/quotations/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/quotations/{id}/pdf",
    tag = "Quotations",
    params(("id" = String, Path, description = "Id de la cotización")),
    responses(
        (status = 200, description = "PDF de la cotización", content_type = "application/pdf"),
        (status = 404, description = "No encontrada")
    )
)]
pub async fn download_quotation_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quotation = app_state.quotations.get_quotation_by_id(&id).await?;
    let pdf = app_state.documents.generate_quotation_pdf(&quotation)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.pdf\"", quotation.id),
            ),
        ],
        pdf,
    ))
}

// POST /api/quotations/cleanup
#[utoipa::path(
    post,
    path = "/api/quotations/cleanup",
    tag = "Quotations",
    responses(
        (status = 200, description = "Cotizaciones expiradas eliminadas")
    )
)]
pub async fn clean_expired(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state.quotations.clean_expired_quotations().await?;
    Ok((StatusCode::OK, Json(json!({ "removed": removed }))))
}

// GET /api/quotations/storage/info
#[utoipa::path(
    get,
    path = "/api/quotations/storage/info",
    tag = "Quotations",
    responses(
        (status = 200, description = "Estado del almacenamiento", body = QuotationStorageInfo)
    )
)]
pub async fn storage_info(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let info = app_state.quotations.storage_info().await?;
    Ok((StatusCode::OK, Json(info)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn payload_requires_at_least_one_item() {
        let empty = CreateQuotationPayload {
            items: vec![],
            installation: None,
        };
        let err = empty.validate().unwrap_err();
        assert!(err.field_errors().contains_key("items"));

        let ok = CreateQuotationPayload {
            items: vec![LineItemRequest {
                product_id: None,
                name: "Poste de hormigón".to_string(),
                category: Some("postes".to_string()),
                quantity: dec!(1),
            }],
            installation: None,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn line_item_serializes_in_camel_case() {
        let item = LineItemRequest {
            product_id: Some("poste-hormigon".to_string()),
            name: "Poste de hormigón".to_string(),
            category: None,
            quantity: dec!(2),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productId"], "poste-hormigon");
        assert!(json.get("product_id").is_none());
    }
}

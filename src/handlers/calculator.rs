// src/handlers/calculator.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    models::calculator::{DimensionInput, MaterialEstimate, MaterialType, PostType},
    services::calculator_service::CalculationParams,
};

// ---
// Payload: CalculatePayload
// ---
// Acepta las tres formas de dimensiones del formulario. La prioridad es
// la misma de siempre: perímetro directo, después largo×ancho, después
// tramos. Los opcionales caen a los defaults configurados.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePayload {
    #[schema(example = 30.0)]
    pub length: Option<f64>,

    #[schema(example = 20.0)]
    pub width: Option<f64>,

    pub perimeter: Option<f64>,

    pub segments: Option<Vec<f64>>,

    #[serde(default)]
    #[schema(example = "hormigon")]
    pub post_type: PostType,

    #[schema(example = 2.5)]
    pub post_spacing: Option<f64>,

    #[serde(default)]
    #[schema(example = "wire")]
    pub material_type: MaterialType,

    #[schema(example = 5)]
    pub wire_strands: Option<u32>,

    #[schema(example = 1.5)]
    pub mesh_height: Option<f64>,
}

impl CalculatePayload {
    fn dimensions(&self) -> Result<DimensionInput, AppError> {
        if let Some(perimeter) = self.perimeter {
            return Ok(DimensionInput::Perimeter { perimeter });
        }
        if let (Some(length), Some(width)) = (self.length, self.width) {
            return Ok(DimensionInput::Rectangle { length, width });
        }
        if let Some(segments) = &self.segments {
            return Ok(DimensionInput::Segments {
                segments: segments.clone(),
            });
        }
        Err(AppError::InvalidDimension(
            "debe indicar perímetro, largo y ancho, o una lista de tramos".into(),
        ))
    }
}

// POST /api/calculator/complete
#[utoipa::path(
    post,
    path = "/api/calculator/complete",
    tag = "Calculator",
    request_body = CalculatePayload,
    responses(
        (status = 200, description = "Desglose de materiales", body = MaterialEstimate),
        (status = 400, description = "Dimensiones o parámetros inválidos")
    )
)]
pub async fn calculate_complete(
    State(app_state): State<AppState>,
    Json(payload): Json<CalculatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let params = CalculationParams {
        dimensions: payload.dimensions()?,
        post_type: payload.post_type,
        post_spacing: payload.post_spacing,
        material_type: payload.material_type,
        wire_strands: payload.wire_strands,
        mesh_height: payload.mesh_height,
    };

    let estimate = app_state.calculator.calculate_complete(&params)?;
    Ok((StatusCode::OK, Json(estimate)))
}

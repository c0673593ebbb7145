use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Calculadora ---
    #[error("Dimensiones inválidas: {0}")]
    InvalidDimension(String),

    #[error("La separación entre postes debe ser un valor positivo")]
    InvalidSpacing,

    #[error("El número de hilos debe ser un valor positivo")]
    InvalidStrandCount,

    #[error("La altura del tejido debe ser un valor positivo")]
    InvalidHeight,

    // --- Pedidos / Cotizaciones ---
    #[error("Campo requerido faltante: {0}")]
    MissingRequiredField(&'static str),

    #[error("Pedido no encontrado: {0}")]
    OrderNotFound(String),

    #[error("Cotización no encontrada: {0}")]
    QuotationNotFound(String),

    // --- Almacenamiento ---
    #[error("Cuota de almacenamiento excedida")]
    StorageQuota,

    #[error("Error de serialización")]
    Serde(#[from] serde_json::Error),

    #[error("Fuente no encontrada: {0}")]
    FontNotFound(String),

    // Variante genérica para cualquier otro error inesperado.
    // `anyhow::Error` es ideal para capturar el contexto del error.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidDimension(_)
            | AppError::InvalidSpacing
            | AppError::InvalidStrandCount
            | AppError::InvalidHeight
            | AppError::MissingRequiredField(_) => (StatusCode::BAD_REQUEST, self.to_string()),

            AppError::OrderNotFound(_) | AppError::QuotationNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }

            AppError::StorageQuota => (StatusCode::INSUFFICIENT_STORAGE, self.to_string()),

            // Todo lo demás (Serde, FontNotFound, InternalServerError) es un 500.
            // `tracing` ya registró el mensaje detallado de `thiserror`.
            e => {
                tracing::error!("Error interno del servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        // Respuesta estándar para errores simples que solo llevan un mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

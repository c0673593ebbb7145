// src/models/calculator.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- 1. Tipos de poste ---
// Olimpo es especial: incluye 3 hilos de púa además del material principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Hormigon,
    Quebracho,
    Eucalipto,
    Olimpo,
}

impl PostType {
    pub fn label(&self) -> &'static str {
        match self {
            PostType::Hormigon => "Hormigón Armado",
            PostType::Quebracho => "Quebracho",
            PostType::Eucalipto => "Eucalipto",
            PostType::Olimpo => "Olimpo (Hormigón + Púas)",
        }
    }
}

// --- 2. Material principal ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    #[default]
    Wire,
    Mesh,
}

// --- 3. Entrada de dimensiones ---
// El frontend podía mandar largo/ancho, un perímetro directo, o la suma
// de tramos cargados a mano. Acá las tres formas son variantes explícitas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DimensionInput {
    Rectangle { length: f64, width: f64 },
    Perimeter { perimeter: f64 },
    Segments { segments: Vec<f64> },
}

// --- 4. Plan de postes ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostPlan {
    pub corner: u32,
    pub intermediate: u32,
    pub total: u32,
    pub spacing: f64,
}

// --- 5. Plan de alambre ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WirePlan {
    pub strands: u32,
    pub meters_per_strand: f64,
    pub total_meters: f64,
    pub estimated_kg: u32,
}

// --- 6. Plan de tejido ---
// La altura es descriptiva: los rollos salen solo de perimetro / largo
// de rollo. Decisión fija heredada del negocio, no un cálculo pendiente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeshPlan {
    pub height: f64,
    pub roll_length: f64,
    pub rolls_needed: u32,
    pub total_meters: f64,
    pub coverage: f64,
}

// --- 7. Accesorios ---
// Grampas solo aplican a alambre, abrazaderas solo a tejido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Accessories {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grampas: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub abrazaderas: Option<u32>,

    pub tensores: u32,
    pub alambre_atar: u32,
    pub esquineros: u32,
    pub varillas_anclaje: u32,
}

// --- 8. Resultado completo ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialEstimate {
    pub perimeter: f64,
    pub posts: PostPlan,
    pub post_type: PostType,
    pub material_type: MaterialType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wire: Option<WirePlan>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshPlan>,

    // Hilos de púa que suma el poste Olimpo, sobre el material elegido.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barbed: Option<WirePlan>,

    pub accessories: Accessories,
}

// src/services/calculator_service.rs
//
// Calculadora de materiales para alambrados: postes, alambres, tejidos
// y accesorios a partir de las dimensiones del terreno. Todo el módulo
// es aritmética pura, sin I/O; los errores salen tipados, nunca se
// reemplazan por defaults (eso es responsabilidad del payload).

use crate::common::error::AppError;
use crate::models::calculator::{
    Accessories, DimensionInput, MaterialEstimate, MaterialType, MeshPlan, PostPlan, PostType,
    WirePlan,
};

// Hilos de púa que incorpora el poste Olimpo.
const OLIMPO_BARBED_STRANDS: u32 = 3;

/// Resuelve el perímetro a partir de cualquiera de las tres formas de
/// entrada. Siempre devuelve un valor estrictamente positivo.
pub fn resolve_perimeter(input: &DimensionInput) -> Result<f64, AppError> {
    let perimeter = match input {
        DimensionInput::Rectangle { length, width } => {
            if !positive(*length) || !positive(*width) {
                return Err(AppError::InvalidDimension(
                    "las dimensiones deben ser valores positivos".into(),
                ));
            }
            2.0 * (length + width)
        }
        DimensionInput::Perimeter { perimeter } => *perimeter,
        DimensionInput::Segments { segments } => {
            if segments.is_empty() {
                return Err(AppError::InvalidDimension(
                    "debe cargar al menos un tramo".into(),
                ));
            }
            if segments.iter().any(|s| !positive(*s)) {
                return Err(AppError::InvalidDimension(
                    "todos los tramos deben ser valores positivos".into(),
                ));
            }
            segments.iter().sum()
        }
    };

    if !positive(perimeter) {
        return Err(AppError::InvalidDimension(
            "el perímetro debe ser un valor positivo".into(),
        ));
    }
    Ok(perimeter)
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Parámetros del cálculo completo, ya con los defaults de UI aplicados.
#[derive(Debug, Clone)]
pub struct CalculationParams {
    pub dimensions: DimensionInput,
    pub post_type: PostType,
    pub post_spacing: Option<f64>,
    pub material_type: MaterialType,
    pub wire_strands: Option<u32>,
    pub mesh_height: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CalculatorSettings {
    pub default_post_spacing: f64,
    pub corner_posts: u32,
    pub mesh_roll_length: f64,
    pub wire_kg_per_meter: f64,
    pub default_wire_strands: u32,
    pub default_mesh_height: f64,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            default_post_spacing: 2.5,
            corner_posts: 4,
            mesh_roll_length: 10.0,
            wire_kg_per_meter: 0.15,
            default_wire_strands: 5,
            default_mesh_height: 1.5,
        }
    }
}

#[derive(Clone)]
pub struct CalculatorService {
    settings: CalculatorSettings,
}

impl CalculatorService {
    pub fn new(settings: CalculatorSettings) -> Self {
        Self { settings }
    }

    /// total = ceil(perímetro / separación); los esquineros son fijos y
    /// los intermedios nunca quedan negativos.
    pub fn calculate_posts(
        &self,
        perimeter: f64,
        spacing: Option<f64>,
    ) -> Result<PostPlan, AppError> {
        if !positive(perimeter) {
            return Err(AppError::InvalidDimension(
                "el perímetro debe ser un valor positivo".into(),
            ));
        }

        let effective_spacing = spacing.unwrap_or(self.settings.default_post_spacing);
        if !positive(effective_spacing) {
            return Err(AppError::InvalidSpacing);
        }

        let total = (perimeter / effective_spacing).ceil() as u32;
        let corner = self.settings.corner_posts;
        let intermediate = total.saturating_sub(corner);

        Ok(PostPlan {
            corner,
            intermediate,
            total,
            spacing: effective_spacing,
        })
    }

    pub fn calculate_wire(&self, perimeter: f64, strands: u32) -> Result<WirePlan, AppError> {
        if !positive(perimeter) {
            return Err(AppError::InvalidDimension(
                "el perímetro debe ser un valor positivo".into(),
            ));
        }
        if strands == 0 {
            return Err(AppError::InvalidStrandCount);
        }

        let total_meters = perimeter * strands as f64;
        let estimated_kg = (total_meters * self.settings.wire_kg_per_meter).ceil() as u32;

        Ok(WirePlan {
            strands,
            meters_per_strand: perimeter,
            total_meters,
            estimated_kg,
        })
    }

    /// La altura solo describe el tejido: los rollos dependen únicamente
    /// del perímetro y del largo de rollo.
    pub fn calculate_mesh(&self, perimeter: f64, height: f64) -> Result<MeshPlan, AppError> {
        if !positive(perimeter) {
            return Err(AppError::InvalidDimension(
                "el perímetro debe ser un valor positivo".into(),
            ));
        }
        if !positive(height) {
            return Err(AppError::InvalidHeight);
        }

        let roll_length = self.settings.mesh_roll_length;
        let rolls_needed = (perimeter / roll_length).ceil() as u32;

        Ok(MeshPlan {
            height,
            roll_length,
            rolls_needed,
            total_meters: perimeter,
            coverage: rolls_needed as f64 * roll_length,
        })
    }

    /// Púa del poste Olimpo: siempre 3 hilos, no es configurable.
    pub fn calculate_olimpo_barbed(&self, perimeter: f64) -> Result<WirePlan, AppError> {
        self.calculate_wire(perimeter, OLIMPO_BARBED_STRANDS)
    }

    /// Ratios fijos por tipo de material; todos los derivados del
    /// perímetro redondean para arriba.
    pub fn calculate_accessories(
        &self,
        posts: &PostPlan,
        perimeter: f64,
        material_type: MaterialType,
    ) -> Accessories {
        // Multiplicación saturante: con perímetros enormes y separaciones
        // mínimas el total de postes ya viene saturado en u32::MAX.
        let (grampas, abrazaderas, tensores, alambre_atar) = match material_type {
            MaterialType::Wire => (
                Some(posts.total.saturating_mul(10)),
                None,
                (perimeter / 25.0).ceil() as u32,
                (perimeter / 50.0).ceil() as u32,
            ),
            MaterialType::Mesh => (
                None,
                Some(posts.total.saturating_mul(4)),
                (perimeter / 20.0).ceil() as u32,
                (perimeter / 30.0).ceil() as u32,
            ),
        };

        Accessories {
            grampas,
            abrazaderas,
            tensores,
            alambre_atar,
            esquineros: 4,
            varillas_anclaje: posts.corner,
        }
    }

    /// Cálculo completo: perímetro → postes → material principal →
    /// púa Olimpo (si corresponde) → accesorios.
    pub fn calculate_complete(
        &self,
        params: &CalculationParams,
    ) -> Result<MaterialEstimate, AppError> {
        let perimeter = resolve_perimeter(&params.dimensions)?;
        let posts = self.calculate_posts(perimeter, params.post_spacing)?;

        let mut wire = None;
        let mut mesh = None;

        match params.material_type {
            MaterialType::Wire => {
                let strands = params
                    .wire_strands
                    .unwrap_or(self.settings.default_wire_strands);
                wire = Some(self.calculate_wire(perimeter, strands)?);
            }
            MaterialType::Mesh => {
                let height = params
                    .mesh_height
                    .unwrap_or(self.settings.default_mesh_height);
                mesh = Some(self.calculate_mesh(perimeter, height)?);
            }
        }

        // Olimpo suma púa sobre el material elegido, sea cual sea.
        let barbed = if params.post_type == PostType::Olimpo {
            Some(self.calculate_olimpo_barbed(perimeter)?)
        } else {
            None
        };

        let accessories = self.calculate_accessories(&posts, perimeter, params.material_type);

        Ok(MaterialEstimate {
            perimeter,
            posts,
            post_type: params.post_type,
            material_type: params.material_type,
            wire,
            mesh,
            barbed,
            accessories,
        })
    }
}

// src/services/pricing_service.rs
//
// Catálogo y resolución de precios. El catálogo se carga una vez desde
// un JSON (antes venía de Google Sheets o de products-data); si un
// producto no aparece, cae a la tabla de precios de respaldo por
// categoría, y en última instancia a un precio genérico.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::catalog::{PriceQuote, Product};

#[derive(Clone)]
pub struct PriceManager {
    products: Vec<Product>,
}

impl PriceManager {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Carga el catálogo desde un archivo JSON. Si el archivo no existe
    /// o está roto, arranca con catálogo vacío y solo precios de
    /// respaldo: el sitio nunca se caía por falta de catálogo.
    pub fn from_json_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<Product>>(&raw) {
                Ok(products) => {
                    tracing::info!(
                        "✅ Catálogo cargado desde {}: {} productos",
                        path.display(),
                        products.len()
                    );
                    Self::new(products)
                }
                Err(e) => {
                    tracing::warn!("catálogo inválido en {}: {}", path.display(), e);
                    Self::new(Vec::new())
                }
            },
            Err(e) => {
                tracing::warn!(
                    "no se pudo leer el catálogo {} ({}), se usan precios de respaldo",
                    path.display(),
                    e
                );
                Self::new(Vec::new())
            }
        }
    }

    pub fn all_products(&self) -> &[Product] {
        &self.products
    }

    pub fn products_by_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Busca por id, después por nombre exacto, después por nombre que
    /// contenga el buscado. Si nada matchea, precio de respaldo.
    pub fn get_product_price(
        &self,
        product_id: Option<&str>,
        product_name: &str,
        category: &str,
    ) -> PriceQuote {
        let name_lower = product_name.to_lowercase();

        let found = self.products.iter().find(|p| {
            product_id.is_some_and(|id| p.id == id)
                || p.name.to_lowercase() == name_lower
                || p.name.to_lowercase().contains(&name_lower)
        });

        if let Some(product) = found {
            if product.price > Decimal::ZERO {
                return PriceQuote {
                    price: product.price,
                    unit: product.price_unit.clone(),
                };
            }
        }

        fallback_price(&name_lower, category)
    }
}

// Tabla de respaldo por categoría, con los valores históricos del sitio.
fn fallback_price(name_lower: &str, category: &str) -> PriceQuote {
    let table: &[(&str, Decimal)] = match category {
        "postes" => &[
            ("hormigon", dec!(3500)),
            ("quebracho", dec!(4200)),
            ("eucalipto", dec!(2100)),
            ("olimpo", dec!(4000)),
        ],
        "tejidos" => &[
            ("1.00", dec!(8500)),
            ("1.20", dec!(10200)),
            ("1.50", dec!(12800)),
            ("1.80", dec!(15400)),
            ("2.00", dec!(17000)),
        ],
        "alambres" => &[
            ("pua", dec!(12500)),
            ("galvanizado", dec!(190)),
            ("negro", dec!(150)),
        ],
        "accesorios" => &[
            ("grampa", dec!(850)),
            ("tensor", dec!(320)),
            ("varilla", dec!(450)),
            ("abrazadera", dec!(280)),
        ],
        _ => &[],
    };

    for (key, price) in table {
        if name_lower.contains(key) {
            let unit = if category == "alambres" { "kg" } else { "unidad" };
            return PriceQuote {
                price: *price,
                unit: unit.to_string(),
            };
        }
    }

    PriceQuote {
        price: dec!(1000),
        unit: "unidad".to_string(),
    }
}

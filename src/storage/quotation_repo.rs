// src/storage/quotation_repo.rs

use std::sync::Arc;

use crate::common::error::AppError;
use crate::models::quotation::Quotation;
use crate::storage::{get_json, set_json, KeyValueStore};

const KEY: &str = "quotations";

/// Todas las cotizaciones viven bajo una sola clave, como un array JSON,
/// igual que en el localStorage del sitio.
#[derive(Clone)]
pub struct QuotationRepository {
    store: Arc<dyn KeyValueStore>,
}

impl QuotationRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_all(&self) -> Result<Vec<Quotation>, AppError> {
        Ok(get_json(self.store.as_ref(), KEY).await?.unwrap_or_default())
    }

    pub async fn save_all(&self, quotations: &[Quotation]) -> Result<(), AppError> {
        set_json(self.store.as_ref(), KEY, &quotations).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Quotation>, AppError> {
        Ok(self.load_all().await?.into_iter().find(|q| q.id == id))
    }

    pub async fn push(&self, quotation: &Quotation) -> Result<(), AppError> {
        let mut all = self.load_all().await?;
        all.push(quotation.clone());
        self.save_all(&all).await
    }

    /// Borra por id; devuelve true si existía.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut all = self.load_all().await?;
        let before = all.len();
        all.retain(|q| q.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.save_all(&all).await?;
        Ok(true)
    }
}

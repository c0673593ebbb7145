// src/storage/order_repo.rs

use std::sync::Arc;

use crate::common::error::AppError;
use crate::models::order::Order;
use crate::storage::{get_json, set_json, KeyValueStore};

const KEY: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn KeyValueStore>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_all(&self) -> Result<Vec<Order>, AppError> {
        Ok(get_json(self.store.as_ref(), KEY).await?.unwrap_or_default())
    }

    pub async fn save_all(&self, orders: &[Order]) -> Result<(), AppError> {
        set_json(self.store.as_ref(), KEY, &orders).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Order>, AppError> {
        Ok(self.load_all().await?.into_iter().find(|o| o.id == id))
    }

    pub async fn push(&self, order: &Order) -> Result<(), AppError> {
        let mut all = self.load_all().await?;
        all.push(order.clone());
        self.save_all(&all).await
    }

    /// Reemplaza el pedido con el mismo id. Err si no existe.
    pub async fn update(&self, order: &Order) -> Result<(), AppError> {
        let mut all = self.load_all().await?;
        let slot = all
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| AppError::OrderNotFound(order.id.clone()))?;
        *slot = order.clone();
        self.save_all(&all).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut all = self.load_all().await?;
        let before = all.len();
        all.retain(|o| o.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.save_all(&all).await?;
        Ok(true)
    }
}

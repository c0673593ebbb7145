// src/services/order_service.rs
//
// Conversión de cotización en pedido y seguimiento de estados. El
// pedido copia por valor los ítems y totales: una vez creado, queda
// desacoplado de la cotización (solo conserva su id).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::common::notify::{Severity, SharedNotifier};
use crate::models::order::{Customer, Order, OrderStatus, StatusEntry};
use crate::models::quotation::Quotation;
use crate::storage::error_log::ErrorLogRepository;
use crate::storage::order_repo::OrderRepository;

// --- Datos del cliente (payload) ---
// name y phone obligatorios; el chequeo estructural corre con validator
// y el chequeo de presencia con MissingRequiredField, que nombra el
// primer campo faltante.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerData {
    pub name: Option<String>,
    pub phone: Option<String>,

    #[validate(email(message = "El e-mail no es válido."))]
    pub email: Option<String>,

    pub address: Option<String>,
    pub installation_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub prefix: String,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            prefix: "ORD".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    settings: OrderSettings,
    notifier: SharedNotifier,
    error_log: ErrorLogRepository,
}

impl OrderService {
    pub fn new(
        repo: OrderRepository,
        settings: OrderSettings,
        notifier: SharedNotifier,
        error_log: ErrorLogRepository,
    ) -> Self {
        Self {
            repo,
            settings,
            notifier,
            error_log,
        }
    }

    // ORD-{YYYYMMDD}-{4 dígitos}. Mismo formato que el sitio, con el
    // sufijo tomado de un UUID v4.
    fn generate_id(&self, now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().as_u128() % 10_000;
        format!(
            "{}-{}-{:04}",
            self.settings.prefix,
            now.format("%Y%m%d"),
            suffix
        )
    }

    fn validate_customer(data: CustomerData) -> Result<Customer, AppError> {
        let name = data
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingRequiredField("name"))?
            .to_string();

        let phone = data
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingRequiredField("phone"))?
            .to_string();

        Ok(Customer {
            name,
            phone,
            email: data.email,
            address: data.address,
            installation_date: data.installation_date,
            payment_method: data.payment_method,
        })
    }

    /// Crea un pedido a partir de una cotización. El historial nace con
    /// la entrada "pending". El guardado es degradable: si falla, se
    /// notifica y el pedido igual se devuelve.
    pub async fn create_order(
        &self,
        quotation: &Quotation,
        customer_data: CustomerData,
    ) -> Result<Order, AppError> {
        customer_data.validate()?;
        let customer = Self::validate_customer(customer_data)?;

        let now = Utc::now();
        let order = Order {
            id: self.generate_id(now),
            quotation_id: Some(quotation.id.clone()),
            date: now,
            customer,
            // Copia por valor: sin referencias compartidas con la cotización.
            items: quotation.items.clone(),
            installation: quotation.installation.clone(),
            subtotal: quotation.subtotal,
            total: quotation.total,
            status: OrderStatus::Pending,
            status_history: vec![StatusEntry {
                status: OrderStatus::Pending,
                date: now,
                note: Some("Pedido creado".to_string()),
            }],
        };

        if let Err(e) = self.repo.push(&order).await {
            tracing::warn!("no se pudo guardar el pedido {}: {}", order.id, e);
            self.error_log.append("order.save", &e.to_string()).await;
            self.notifier.notify(
                "No se pudo guardar el pedido. Verifica el espacio disponible.",
                Severity::Warning,
            );
        } else {
            self.notifier
                .notify("Pedido creado correctamente", Severity::Success);
        }

        Ok(order)
    }

    /// Agrega una entrada al historial y actualiza el estado. Cualquier
    /// transición está permitida: el enum es plano, sin FSM.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, AppError> {
        let mut order = self.get_order_by_id(order_id).await?;

        order.status = new_status;
        order.status_history.push(StatusEntry {
            status: new_status,
            date: Utc::now(),
            note: note
                .or_else(|| Some(format!("Estado actualizado a {}", new_status.label()))),
        });

        self.repo.update(&order).await?;
        Ok(order)
    }

    pub async fn get_order_by_id(&self, order_id: &str) -> Result<Order, AppError> {
        self.repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::OrderNotFound(order_id.to_string()))
    }

    pub async fn get_all_orders(&self) -> Result<Vec<Order>, AppError> {
        self.repo.load_all().await
    }

    pub async fn get_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, AppError> {
        Ok(self
            .repo
            .load_all()
            .await?
            .into_iter()
            .filter(|o| o.status == status)
            .collect())
    }

    pub async fn get_orders_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, AppError> {
        Ok(self
            .repo
            .load_all()
            .await?
            .into_iter()
            .filter(|o| o.date >= start && o.date <= end)
            .collect())
    }

    pub async fn get_orders_by_customer(&self, phone: &str) -> Result<Vec<Order>, AppError> {
        Ok(self
            .repo
            .load_all()
            .await?
            .into_iter()
            .filter(|o| o.customer.phone == phone)
            .collect())
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), AppError> {
        if !self.repo.delete(order_id).await? {
            return Err(AppError::OrderNotFound(order_id.to_string()));
        }
        Ok(())
    }

    /// Exporta los pedidos como CSV (id, fecha, cliente, teléfono,
    /// total, estado), para el panel de administración.
    pub async fn export_csv(&self) -> Result<String, AppError> {
        let orders = self.repo.load_all().await?;

        let mut csv = String::from("id,fecha,cliente,telefono,total,estado\n");
        for order in orders {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                order.id,
                order.date.format("%Y-%m-%d %H:%M"),
                escape_csv(&order.customer.name),
                escape_csv(&order.customer.phone),
                order.total,
                order.status.label(),
            ));
        }
        Ok(csv)
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::notify::test_support::RecordingNotifier;
    use crate::models::quotation::{Installation, QuotationItem, QuotationStatus};
    use crate::storage::memory::MemoryStore;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn service() -> OrderService {
        service_with_store(Arc::new(MemoryStore::new())).0
    }

    fn service_with_store(store: Arc<MemoryStore>) -> (OrderService, Arc<RecordingNotifier>) {
        let store: Arc<dyn crate::storage::KeyValueStore> = store;
        let notifier = Arc::new(RecordingNotifier::default());
        let service = OrderService::new(
            OrderRepository::new(store.clone()),
            OrderSettings::default(),
            notifier.clone(),
            ErrorLogRepository::new(store),
        );
        (service, notifier)
    }

    fn sample_quotation() -> Quotation {
        let now = Utc::now();
        Quotation {
            id: "COT-1700000000000-123".to_string(),
            date: now,
            valid_until: now + Duration::days(30),
            items: vec![QuotationItem {
                id: "poste-hormigon".to_string(),
                name: "Poste de hormigón".to_string(),
                category: "postes".to_string(),
                quantity: dec!(10),
                unit_price: dec!(3500),
                subtotal: dec!(35000),
            }],
            installation: Some(Installation {
                linear_meters: dec!(100),
                price_per_meter: dec!(500),
                subtotal: dec!(50000),
            }),
            subtotal: dec!(35000),
            total: dec!(85000),
            status: QuotationStatus::Draft,
        }
    }

    fn customer() -> CustomerData {
        CustomerData {
            name: Some("Juana Pérez".to_string()),
            phone: Some("+54 11 5555-1234".to_string()),
            email: None,
            address: None,
            installation_date: None,
            payment_method: None,
        }
    }

    #[tokio::test]
    async fn order_copies_quotation_by_value() {
        let svc = service();
        let quotation = sample_quotation();
        let order = svc.create_order(&quotation, customer()).await.unwrap();

        assert_eq!(order.total, quotation.total);
        assert_eq!(order.subtotal, quotation.subtotal);
        assert_eq!(order.items, quotation.items);
        assert_eq!(order.installation, quotation.installation);
        assert_eq!(order.quotation_id.as_deref(), Some(quotation.id.as_str()));

        // Historial sembrado con pending.
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.status_history.len(), 1);
        assert_eq!(order.status_history[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn order_id_format() {
        let svc = service();
        let order = svc
            .create_order(&sample_quotation(), customer())
            .await
            .unwrap();

        let parts: Vec<&str> = order.id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8); // YYYYMMDD
        assert_eq!(parts[2].len(), 4);
    }

    #[tokio::test]
    async fn missing_name_is_named_first() {
        let svc = service();
        let data = CustomerData {
            name: None,
            phone: Some("123".to_string()),
            email: None,
            address: None,
            installation_date: None,
            payment_method: None,
        };
        let err = svc.create_order(&sample_quotation(), data).await.unwrap_err();
        assert!(matches!(err, AppError::MissingRequiredField("name")));
    }

    #[tokio::test]
    async fn blank_phone_counts_as_missing() {
        let svc = service();
        let data = CustomerData {
            name: Some("Juana".to_string()),
            phone: Some("   ".to_string()),
            email: None,
            address: None,
            installation_date: None,
            payment_method: None,
        };
        let err = svc.create_order(&sample_quotation(), data).await.unwrap_err();
        assert!(matches!(err, AppError::MissingRequiredField("phone")));
    }

    #[tokio::test]
    async fn status_updates_append_history_any_transition() {
        let svc = service();
        let order = svc
            .create_order(&sample_quotation(), customer())
            .await
            .unwrap();

        let order = svc
            .update_order_status(&order.id, OrderStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);

        // Sin FSM: volver para atrás es válido.
        let order = svc
            .update_order_status(&order.id, OrderStatus::Pending, Some("reabierto".to_string()))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.status_history.len(), 3);
        assert_eq!(
            order.status_history.last().unwrap().note.as_deref(),
            Some("reabierto")
        );

        // Monotonía temporal del historial.
        assert!(order
            .status_history
            .windows(2)
            .all(|w| w[0].date <= w[1].date));
    }

    #[tokio::test]
    async fn unknown_order_id_errors() {
        let svc = service();
        assert!(matches!(
            svc.update_order_status("ORD-20240101-0000", OrderStatus::Confirmed, None)
                .await,
            Err(AppError::OrderNotFound(_))
        ));
        assert!(matches!(
            svc.get_order_by_id("ORD-20240101-0000").await,
            Err(AppError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn filters_by_status_and_phone() {
        let svc = service();
        let q = sample_quotation();
        let o1 = svc.create_order(&q, customer()).await.unwrap();
        let mut other = customer();
        other.phone = Some("11-0000-0000".to_string());
        let _o2 = svc.create_order(&q, other).await.unwrap();

        svc.update_order_status(&o1.id, OrderStatus::Confirmed, None)
            .await
            .unwrap();

        let confirmed = svc
            .get_orders_by_status(OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, o1.id);

        let by_phone = svc
            .get_orders_by_customer("+54 11 5555-1234")
            .await
            .unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].id, o1.id);
    }

    #[tokio::test]
    async fn csv_export_contains_orders() {
        let svc = service();
        let order = svc
            .create_order(&sample_quotation(), customer())
            .await
            .unwrap();

        let csv = svc.export_csv().await.unwrap();
        assert!(csv.starts_with("id,fecha,cliente,telefono,total,estado\n"));
        assert!(csv.contains(&order.id));
        assert!(csv.contains("Juana Pérez"));
    }

    #[tokio::test]
    async fn csv_quotes_fields_with_newlines_and_commas() {
        let svc = service();
        let mut data = customer();
        data.name = Some("Pérez,\nJuana \"La Negra\"".to_string());
        let order = svc
            .create_order(&sample_quotation(), data)
            .await
            .unwrap();

        let csv = svc.export_csv().await.unwrap();
        // El campo queda entre comillas, con las internas duplicadas.
        assert!(csv.contains("\"Pérez,\nJuana \"\"La Negra\"\"\""));
        assert!(csv.contains(&format!("{},", order.id)));

        // Un solo salto de línea extra: el embebido en el nombre. La fila
        // no se parte en dos registros.
        assert_eq!(csv.matches('\n').count(), 3); // header + fila + embebido
    }

    #[tokio::test]
    async fn storage_failure_still_returns_order() {
        let (svc, notifier) = service_with_store(Arc::new(MemoryStore::with_max_bytes(8)));
        let order = svc
            .create_order(&sample_quotation(), customer())
            .await
            .expect("el pedido debe volver aunque falle la persistencia");
        assert_eq!(order.total, dec!(85000));

        let messages = notifier.messages.lock().unwrap();
        assert!(messages
            .iter()
            .any(|(m, s)| *s == Severity::Warning && m.contains("No se pudo guardar")));
    }
}

//src/main.rs

use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaración de nuestros módulos
mod common;
mod config;
mod docs;
mod handlers;
mod models;
mod services;
mod storage;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa el logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien acá: si la configuración falla, la aplicación
    // no debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falla al inicializar el estado de la aplicación.");

    // Tarea recurrente de limpieza (cotizaciones vencidas, logs, cuota).
    tokio::spawn(app_state.cleanup.clone().run_forever());

    let calculator_routes =
        Router::new().route("/complete", post(handlers::calculator::calculate_complete));

    let quotation_routes = Router::new()
        .route(
            "/",
            post(handlers::quotations::create_quotation)
                .get(handlers::quotations::list_quotations),
        )
        .route("/cleanup", post(handlers::quotations::clean_expired))
        .route("/storage/info", get(handlers::quotations::storage_info))
        .route(
            "/{id}",
            get(handlers::quotations::get_quotation)
                .delete(handlers::quotations::delete_quotation),
        )
        .route("/{id}/pdf", get(handlers::quotations::download_quotation_pdf));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/export/csv", get(handlers::orders::export_orders_csv))
        .route(
            "/{id}",
            get(handlers::orders::get_order).delete(handlers::orders::delete_order),
        )
        .route("/{id}/status", patch(handlers::orders::update_order_status));

    let catalog_routes = Router::new()
        .route("/", get(handlers::catalog::list_products))
        .route("/price", get(handlers::catalog::get_product_price));

    // Combina todo en el router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/calculator", calculator_routes)
        .nest("/api/quotations", quotation_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/products", catalog_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia el servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falla al iniciar el listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Error en el servidor Axum");
}

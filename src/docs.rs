// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Calculator ---
        handlers::calculator::calculate_complete,

        // --- Quotations ---
        handlers::quotations::create_quotation,
        handlers::quotations::list_quotations,
        handlers::quotations::get_quotation,
        handlers::quotations::delete_quotation,
        handlers::quotations::download_quotation_pdf,
        handlers::quotations::clean_expired,
        handlers::quotations::storage_info,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,
        handlers::orders::export_orders_csv,

        // --- Catalog ---
        handlers::catalog::list_products,
        handlers::catalog::get_product_price,
    ),
    components(
        schemas(
            // --- Calculator ---
            models::calculator::PostType,
            models::calculator::MaterialType,
            models::calculator::DimensionInput,
            models::calculator::PostPlan,
            models::calculator::WirePlan,
            models::calculator::MeshPlan,
            models::calculator::Accessories,
            models::calculator::MaterialEstimate,

            // --- Quotations ---
            models::quotation::QuotationStatus,
            models::quotation::QuotationItem,
            models::quotation::Installation,
            models::quotation::Quotation,
            models::quotation::QuotationStorageInfo,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Customer,
            models::order::StatusEntry,
            models::order::Order,

            // --- Catalog ---
            models::catalog::Product,
            models::catalog::PriceQuote,

            // --- Payloads ---
            handlers::calculator::CalculatePayload,
            handlers::quotations::CreateQuotationPayload,
            handlers::orders::CreateOrderPayload,
            handlers::orders::UpdateStatusPayload,
            crate::services::quotation_service::LineItemRequest,
            crate::services::quotation_service::InstallationRequest,
            crate::services::order_service::CustomerData,
        )
    ),
    tags(
        (name = "Calculator", description = "Calculadora de materiales para alambrados"),
        (name = "Quotations", description = "Generación y gestión de cotizaciones"),
        (name = "Orders", description = "Pedidos y seguimiento de estados"),
        (name = "Catalog", description = "Catálogo de productos y precios")
    )
)]
pub struct ApiDoc;

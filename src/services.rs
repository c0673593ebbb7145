pub mod calculator_service;
pub mod cleanup_service;
pub mod document_service;
pub mod order_service;
pub mod pricing_service;
pub mod quotation_service;

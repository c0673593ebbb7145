pub mod calculator;
pub mod catalog;
pub mod order;
pub mod quotation;

pub mod calculator;
pub mod catalog;
pub mod orders;
pub mod quotations;

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod errors;
pub mod payment;
pub mod ports;
pub mod report;
pub mod sale;
pub mod session;

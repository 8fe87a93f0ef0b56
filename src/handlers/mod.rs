pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

use bigdecimal::BigDecimal;

use crate::domain::errors::DomainError;
use crate::domain::payment::parse_amount;

/// Parses a decimal money field sent as a string.
fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, DomainError> {
    parse_amount(raw).map_err(|_| DomainError::InvalidInput(format!("invalid {field} '{raw}'")))
}

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};

use super::errors::DomainError;

/// Quick-pick banknote amounts offered next to the keypad.
pub const PRESET_AMOUNTS: [u32; 6] = [5, 10, 20, 25, 30, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an amount typed on the register keypad.
///
/// Accepts either `.` or `,` as decimal separator. Blank input reads as zero.
pub fn parse_amount(input: &str) -> Result<BigDecimal, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(BigDecimal::zero());
    }
    let normalized = trimmed.replace(',', ".");
    let amount = BigDecimal::from_str(&normalized)
        .map_err(|e| DomainError::InvalidInput(format!("invalid amount '{input}': {e}")))?;
    if amount < BigDecimal::zero() {
        return Err(DomainError::InvalidInput(format!(
            "amount must not be negative, got '{input}'"
        )));
    }
    ensure_cents(&amount)?;
    Ok(amount)
}

/// Rejects sub-cent amounts; money is stored with two decimals.
pub fn ensure_cents(amount: &BigDecimal) -> Result<(), DomainError> {
    let (_, scale) = amount.normalized().as_bigint_and_exponent();
    if scale > 2 {
        return Err(DomainError::InvalidInput(format!(
            "amount {amount} has more than two decimals"
        )));
    }
    Ok(())
}

/// Two-decimal rendering used on receipts and reports, e.g. `"1.50"`.
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}

/// A cash tender checked against the amount due.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub total: BigDecimal,
    pub received: BigDecimal,
    pub change: BigDecimal,
    pub method: PaymentMethod,
}

impl Payment {
    /// Checks that `received` covers `total` and computes the change.
    pub fn cash(total: BigDecimal, received: BigDecimal) -> Result<Self, DomainError> {
        ensure_cents(&total)?;
        ensure_cents(&received)?;
        if received < total {
            return Err(DomainError::PaymentRejected(format!(
                "received {received} is less than the total {total}"
            )));
        }
        let change = &received - &total;
        Ok(Self {
            total,
            received,
            change,
            method: PaymentMethod::Cash,
        })
    }
}

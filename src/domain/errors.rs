use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Wrong passphrase")]
    Unauthorized,
    #[error("Payment rejected: {0}")]
    PaymentRejected(String),
    #[error("A checkout is already in progress")]
    CheckoutInProgress,
    /// The sale row was written but its items were not. Nothing is rolled
    /// back; the sale has to be cleaned up by hand.
    #[error("Sale {sale_id} was recorded without items: {reason}")]
    OrphanedSale { sale_id: Uuid, reason: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

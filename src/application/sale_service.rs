use bigdecimal::BigDecimal;
use serde_json::json;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::payment::Payment;
use crate::domain::ports::{EventBroadcaster, SaleRepository};
use crate::domain::sale::{NewSale, NewSaleItem, SaleReceipt};

pub const SALE_COMPLETED: &str = "sale-completed";

/// Turns a paid cart into a persisted sale.
pub struct SaleService<R, B> {
    repo: R,
    broadcaster: B,
}

impl<R: SaleRepository, B: EventBroadcaster> SaleService<R, B> {
    pub fn new(repo: R, broadcaster: B) -> Self {
        Self { repo, broadcaster }
    }

    /// Records the sale, then its items, announces it and empties `cart`.
    ///
    /// The two writes are not atomic. If the items fail after the sale was
    /// written, the result is [`DomainError::OrphanedSale`] and the cart is
    /// left as it was.
    pub fn complete_sale(
        &self,
        cart: &mut Cart,
        received: BigDecimal,
    ) -> Result<SaleReceipt, DomainError> {
        if cart.is_empty() {
            return Err(DomainError::PaymentRejected("cart is empty".to_string()));
        }
        let payment = Payment::cash(cart.total(), received)?;

        let sale_id = self.repo.insert_sale(&NewSale::from(&payment)).map_err(|e| {
            log::error!("failed to record sale: {e}");
            e
        })?;

        let items = NewSaleItem::from_cart(cart);
        if let Err(e) = self.repo.insert_sale_items(sale_id, &items) {
            log::error!("sale {sale_id} has no items, manual cleanup needed: {e}");
            return Err(DomainError::OrphanedSale {
                sale_id,
                reason: e.to_string(),
            });
        }

        if let Err(e) = self
            .broadcaster
            .broadcast(SALE_COMPLETED, json!({ "sale_id": sale_id }))
        {
            log::warn!("could not announce sale {sale_id}: {e}");
        }

        log::info!(
            "sale {sale_id} completed: {} item(s), total {}, change {}",
            items.len(),
            payment.total,
            payment.change
        );
        cart.clear();

        Ok(SaleReceipt {
            sale_id,
            total: payment.total,
            payment_received: payment.received,
            change_given: payment.change,
            item_count: items.len(),
        })
    }
}

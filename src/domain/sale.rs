use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::Cart;
use super::payment::{Payment, PaymentMethod};

/// The sale header written before its items.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub total: BigDecimal,
    pub payment_received: BigDecimal,
    pub change_given: BigDecimal,
    pub payment_method: PaymentMethod,
}

impl From<&Payment> for NewSale {
    fn from(payment: &Payment) -> Self {
        Self {
            total: payment.total.clone(),
            payment_received: payment.received.clone(),
            change_given: payment.change.clone(),
            payment_method: payment.method,
        }
    }
}

/// One cart line as persisted. Quantity is always one.
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub article_id: Uuid,
    pub price_at_sale: BigDecimal,
}

impl NewSaleItem {
    pub fn from_cart(cart: &Cart) -> Vec<NewSaleItem> {
        cart.items()
            .iter()
            .map(|item| NewSaleItem {
                article_id: item.article_id,
                price_at_sale: item.price.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleItemView {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub article_id: Option<Uuid>,
    pub article_name: Option<String>,
    pub category_name: Option<String>,
    pub quantity: i32,
    pub price_at_sale: BigDecimal,
}

impl SaleItemView {
    /// "Name (Category)", or just the name when uncategorized.
    pub fn label(&self) -> String {
        let name = self.article_name.as_deref().unwrap_or("");
        match &self.category_name {
            Some(category) => format!("{name} ({category})"),
            None => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleView {
    pub id: Uuid,
    pub total: BigDecimal,
    pub payment_received: BigDecimal,
    pub change_given: BigDecimal,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleItemView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    pub sale_id: Uuid,
    pub total: BigDecimal,
    pub payment_received: BigDecimal,
    pub change_given: BigDecimal,
    pub item_count: usize,
}

/// What happened to the parent sale when one of its items was removed.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemRemoval {
    /// The removed item was the last one, so the sale is gone too.
    SaleDeleted,
    /// The sale survives with a reduced total. Received and change keep
    /// their original values.
    TotalReduced { new_total: BigDecimal },
}

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::payment::ensure_cents;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantView {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleView {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    /// `None` means the price is typed in at the register.
    pub price: Option<BigDecimal>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub variants: Vec<VariantView>,
}

/// Query filters for the article list. Both are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
}

impl ArticleFilter {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.search_term().is_none()
    }

    /// The trimmed search term, or `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Validated input for creating or updating an article.
#[derive(Debug, Clone)]
pub struct ArticleInput {
    pub name: String,
    pub price: Option<BigDecimal>,
    pub category_id: Option<Uuid>,
}

impl ArticleInput {
    pub fn new(
        name: &str,
        price: Option<BigDecimal>,
        category_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        let name = required_name(name, "article")?;
        if let Some(price) = &price {
            if price < &BigDecimal::zero() {
                return Err(DomainError::InvalidInput(format!(
                    "price must not be negative, got {price}"
                )));
            }
            ensure_cents(price)?;
        }
        Ok(Self {
            name,
            price,
            category_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VariantInput {
    pub name: String,
    pub price: BigDecimal,
}

impl VariantInput {
    pub fn new(name: &str, price: BigDecimal) -> Result<Self, DomainError> {
        let name = required_name(name, "variant")?;
        if price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(format!(
                "variant price must not be negative, got {price}"
            )));
        }
        ensure_cents(&price)?;
        Ok(Self { name, price })
    }
}

/// Trims `raw` and rejects it when nothing is left.
pub fn required_name(raw: &str, what: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(format!("{what} name is required")));
    }
    Ok(trimmed.to_string())
}

/// Sort positions for a drag-and-drop reorder: the n-th id gets `n * 10`.
pub fn sort_positions(ids: &[Uuid]) -> Vec<(Uuid, i32)> {
    ids.iter()
        .zip((0..).step_by(10))
        .map(|(id, pos)| (*id, pos))
        .collect()
}

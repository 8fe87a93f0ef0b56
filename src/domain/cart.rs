use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use super::catalog::ArticleView;
use super::errors::DomainError;
use super::payment::ensure_cents;

/// How the price of a selected article is determined.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceSelection {
    /// Use the article's fixed price.
    Fixed,
    /// Use one of the article's named variants.
    Variant(Uuid),
    /// Price typed in at the register, for articles without a fixed price.
    Manual(BigDecimal),
}

/// An article with its price settled, ready to go into the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArticle {
    pub article_id: Uuid,
    pub name: String,
    pub category_name: Option<String>,
    pub price: BigDecimal,
}

/// Settles the price of `article` for `selection`.
///
/// Variants take precedence over a fixed price; articles without a price
/// need a strictly positive manual entry.
pub fn resolve_selection(
    article: &ArticleView,
    selection: PriceSelection,
) -> Result<ResolvedArticle, DomainError> {
    let resolved = |name: String, price: BigDecimal| ResolvedArticle {
        article_id: article.id,
        name,
        category_name: article.category_name.clone(),
        price,
    };

    if !article.variants.is_empty() {
        let PriceSelection::Variant(variant_id) = selection else {
            return Err(DomainError::InvalidInput(format!(
                "article '{}' requires a variant",
                article.name
            )));
        };
        let variant = article
            .variants
            .iter()
            .find(|v| v.id == variant_id)
            .ok_or(DomainError::NotFound)?;
        return Ok(resolved(
            format!("{} - {}", article.name, variant.name),
            variant.price.clone(),
        ));
    }

    match (&article.price, selection) {
        (None, PriceSelection::Manual(price)) => {
            if price <= BigDecimal::zero() {
                return Err(DomainError::InvalidInput(
                    "entered price must be greater than zero".to_string(),
                ));
            }
            ensure_cents(&price)?;
            Ok(resolved(article.name.clone(), price))
        }
        (None, _) => Err(DomainError::InvalidInput(format!(
            "article '{}' has no fixed price, enter one",
            article.name
        ))),
        (Some(price), PriceSelection::Fixed) => Ok(resolved(article.name.clone(), price.clone())),
        (Some(_), other) => Err(DomainError::InvalidInput(format!(
            "article '{}' has a fixed price, got {other:?}",
            article.name
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Line identity; the same article can sit in the cart several times.
    pub cart_id: Uuid,
    pub article_id: Uuid,
    pub name: String,
    pub category_name: Option<String>,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub enum CartAction {
    Add(ResolvedArticle),
    Remove(Uuid),
    Clear,
}

/// The register's in-memory cart. The total is always derived from the lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn total(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::zero(), |sum, item| sum + &item.price)
    }

    /// Returns the cart that results from applying `action` to `self`.
    pub fn reduce(&self, action: CartAction) -> Cart {
        let mut items = self.items.clone();
        match action {
            CartAction::Add(article) => items.push(CartItem {
                cart_id: Uuid::new_v4(),
                article_id: article.article_id,
                name: article.name,
                category_name: article.category_name,
                price: article.price,
            }),
            CartAction::Remove(cart_id) => items.retain(|item| item.cart_id != cart_id),
            CartAction::Clear => items.clear(),
        }
        Cart { items }
    }

    /// Appends a line and returns its cart-local id.
    pub fn add_item(&mut self, article: ResolvedArticle) -> Uuid {
        *self = self.reduce(CartAction::Add(article));
        self.items.last().map(|item| item.cart_id).unwrap_or_default()
    }

    pub fn remove_item(&mut self, cart_id: Uuid) {
        *self = self.reduce(CartAction::Remove(cart_id));
    }

    pub fn clear(&mut self) {
        *self = self.reduce(CartAction::Clear);
    }
}

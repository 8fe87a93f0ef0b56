use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::analytics::TimeRange;
use super::catalog::{ArticleFilter, ArticleInput, ArticleView, CategoryView, VariantInput, VariantView};
use super::errors::DomainError;
use super::sale::{ItemRemoval, NewSale, NewSaleItem, SaleView};

pub trait CatalogRepository: Send + Sync + 'static {
    /// Articles ordered by sort position, then creation time.
    fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleView>, DomainError>;
    fn find_article(&self, id: Uuid) -> Result<Option<ArticleView>, DomainError>;
    fn create_article(&self, input: ArticleInput) -> Result<Uuid, DomainError>;
    /// Returns `false` when no article has this id.
    fn update_article(&self, id: Uuid, input: ArticleInput) -> Result<bool, DomainError>;
    fn delete_article(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Applies all positions or none.
    fn update_sort_positions(&self, positions: &[(Uuid, i32)]) -> Result<(), DomainError>;

    fn list_categories(&self) -> Result<Vec<CategoryView>, DomainError>;
    fn create_category(&self, name: String) -> Result<CategoryView, DomainError>;

    fn add_variant(&self, article_id: Uuid, input: VariantInput) -> Result<VariantView, DomainError>;
    fn delete_variant(&self, id: Uuid) -> Result<bool, DomainError>;
}

/// Sale persistence. Sale and items are separate writes that callers
/// sequence; item removal is a single atomic operation.
pub trait SaleRepository: Send + Sync + 'static {
    fn insert_sale(&self, sale: &NewSale) -> Result<Uuid, DomainError>;
    fn insert_sale_items(&self, sale_id: Uuid, items: &[NewSaleItem]) -> Result<(), DomainError>;
    /// Sales created within `range`, newest first, with their items.
    fn find_in_range(&self, range: &TimeRange) -> Result<Vec<SaleView>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError>;
    /// Deletes one item of a sale and, in the same transaction, deletes the
    /// sale when no items remain or lowers its total by the item's price.
    fn remove_sale_item(&self, sale_id: Uuid, item_id: Uuid) -> Result<ItemRemoval, DomainError>;
}

/// Fire-and-forget notification to other listeners.
pub trait EventBroadcaster: Send + Sync + 'static {
    fn broadcast(&self, event: &str, payload: Value) -> Result<(), DomainError>;
}

impl<T: CatalogRepository + ?Sized> CatalogRepository for Arc<T> {
    fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleView>, DomainError> {
        (**self).list_articles(filter)
    }
    fn find_article(&self, id: Uuid) -> Result<Option<ArticleView>, DomainError> {
        (**self).find_article(id)
    }
    fn create_article(&self, input: ArticleInput) -> Result<Uuid, DomainError> {
        (**self).create_article(input)
    }
    fn update_article(&self, id: Uuid, input: ArticleInput) -> Result<bool, DomainError> {
        (**self).update_article(id, input)
    }
    fn delete_article(&self, id: Uuid) -> Result<bool, DomainError> {
        (**self).delete_article(id)
    }
    fn update_sort_positions(&self, positions: &[(Uuid, i32)]) -> Result<(), DomainError> {
        (**self).update_sort_positions(positions)
    }
    fn list_categories(&self) -> Result<Vec<CategoryView>, DomainError> {
        (**self).list_categories()
    }
    fn create_category(&self, name: String) -> Result<CategoryView, DomainError> {
        (**self).create_category(name)
    }
    fn add_variant(&self, article_id: Uuid, input: VariantInput) -> Result<VariantView, DomainError> {
        (**self).add_variant(article_id, input)
    }
    fn delete_variant(&self, id: Uuid) -> Result<bool, DomainError> {
        (**self).delete_variant(id)
    }
}

impl<T: SaleRepository + ?Sized> SaleRepository for Arc<T> {
    fn insert_sale(&self, sale: &NewSale) -> Result<Uuid, DomainError> {
        (**self).insert_sale(sale)
    }
    fn insert_sale_items(&self, sale_id: Uuid, items: &[NewSaleItem]) -> Result<(), DomainError> {
        (**self).insert_sale_items(sale_id, items)
    }
    fn find_in_range(&self, range: &TimeRange) -> Result<Vec<SaleView>, DomainError> {
        (**self).find_in_range(range)
    }
    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        (**self).find_by_id(id)
    }
    fn remove_sale_item(&self, sale_id: Uuid, item_id: Uuid) -> Result<ItemRemoval, DomainError> {
        (**self).remove_sale_item(sale_id, item_id)
    }
}

impl<T: EventBroadcaster + ?Sized> EventBroadcaster for Arc<T> {
    fn broadcast(&self, event: &str, payload: Value) -> Result<(), DomainError> {
        (**self).broadcast(event, payload)
    }
}

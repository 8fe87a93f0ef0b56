//! In-memory port implementations for service tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::analytics::TimeRange;
use crate::domain::catalog::{
    ArticleFilter, ArticleInput, ArticleView, CategoryView, VariantInput, VariantView,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogRepository, EventBroadcaster, SaleRepository};
use crate::domain::sale::{ItemRemoval, NewSale, NewSaleItem, SaleItemView, SaleView};
use crate::domain::session::Session;
use crate::realtime::ChangeFeed;
use crate::state::AppState;

pub const PASSPHRASE: &str = "4242";

/// Signed-in app state over in-memory ports. Keep the directory alive for
/// the session marker.
pub fn unlocked_state(
    catalog: Arc<MemoryCatalog>,
    sales: Arc<MemorySales>,
) -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::load(PASSPHRASE, dir.path().join("session"));
    session.login(PASSPHRASE).unwrap();
    let feed = ChangeFeed::new();
    let state = AppState::new(catalog, sales, Arc::new(feed.clone()), feed, session);
    (dir, state)
}

/// An article without variants, priced or open.
pub fn article(name: &str, price: Option<&str>) -> ArticleView {
    ArticleView {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category_id: None,
        category_name: None,
        price: price.map(|p| p.parse().unwrap()),
        sort_order: 0,
        created_at: Utc::now(),
        variants: vec![],
    }
}

#[derive(Default)]
pub struct MemoryCatalog {
    articles: Mutex<Vec<ArticleView>>,
    categories: Mutex<Vec<CategoryView>>,
    pub list_calls: Mutex<usize>,
}

impl MemoryCatalog {
    pub fn insert(&self, article: ArticleView) {
        self.articles.lock().unwrap().push(article);
    }
}

impl CatalogRepository for MemoryCatalog {
    fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleView>, DomainError> {
        *self.list_calls.lock().unwrap() += 1;
        let mut articles: Vec<ArticleView> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| filter.category_id.map_or(true, |c| a.category_id == Some(c)))
            .filter(|a| {
                filter.search_term().map_or(true, |q| {
                    a.name.to_lowercase().contains(&q.to_lowercase())
                })
            })
            .cloned()
            .collect();
        articles.sort_by_key(|a| (a.sort_order, a.created_at));
        Ok(articles)
    }

    fn find_article(&self, id: Uuid) -> Result<Option<ArticleView>, DomainError> {
        Ok(self.articles.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    fn create_article(&self, input: ArticleInput) -> Result<Uuid, DomainError> {
        let category_name = input.category_id.and_then(|cid| {
            self.categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == cid)
                .map(|c| c.name.clone())
        });
        let id = Uuid::new_v4();
        self.insert(ArticleView {
            id,
            name: input.name,
            category_id: input.category_id,
            category_name,
            price: input.price,
            sort_order: 0,
            created_at: Utc::now(),
            variants: vec![],
        });
        Ok(id)
    }

    fn update_article(&self, id: Uuid, input: ArticleInput) -> Result<bool, DomainError> {
        let mut articles = self.articles.lock().unwrap();
        let Some(article) = articles.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };
        article.name = input.name;
        article.price = input.price;
        article.category_id = input.category_id;
        Ok(true)
    }

    fn delete_article(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut articles = self.articles.lock().unwrap();
        let before = articles.len();
        articles.retain(|a| a.id != id);
        Ok(articles.len() != before)
    }

    fn update_sort_positions(&self, positions: &[(Uuid, i32)]) -> Result<(), DomainError> {
        let mut articles = self.articles.lock().unwrap();
        for (id, pos) in positions {
            if let Some(article) = articles.iter_mut().find(|a| a.id == *id) {
                article.sort_order = *pos;
            }
        }
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<CategoryView>, DomainError> {
        let mut categories = self.categories.lock().unwrap().clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn create_category(&self, name: String) -> Result<CategoryView, DomainError> {
        let category = CategoryView {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    fn add_variant(&self, article_id: Uuid, input: VariantInput) -> Result<VariantView, DomainError> {
        let mut articles = self.articles.lock().unwrap();
        let article = articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or(DomainError::NotFound)?;
        let variant = VariantView {
            id: Uuid::new_v4(),
            name: input.name,
            price: input.price,
        };
        article.variants.push(variant.clone());
        Ok(variant)
    }

    fn delete_variant(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut articles = self.articles.lock().unwrap();
        let mut removed = false;
        for article in articles.iter_mut() {
            let before = article.variants.len();
            article.variants.retain(|v| v.id != id);
            removed |= article.variants.len() != before;
        }
        Ok(removed)
    }
}

/// Sale store whose writes can be made to fail on demand.
#[derive(Default)]
pub struct MemorySales {
    sales: Mutex<Vec<SaleView>>,
    pub fail_sale_insert: AtomicBool,
    pub fail_item_insert: AtomicBool,
    /// Makes `insert_sale` take a noticeable while, as a remote write would.
    pub slow_sale_insert: AtomicBool,
}

impl MemorySales {
    pub fn all(&self) -> Vec<SaleView> {
        self.sales.lock().unwrap().clone()
    }

    /// Seeds a sale with one item per `(category, price)` pair.
    pub fn seed(
        &self,
        created_at: DateTime<Utc>,
        items: &[(Option<&str>, BigDecimal)],
        received: BigDecimal,
    ) -> SaleView {
        let id = Uuid::new_v4();
        let items: Vec<SaleItemView> = items
            .iter()
            .map(|(category, price)| SaleItemView {
                id: Uuid::new_v4(),
                sale_id: id,
                article_id: Some(Uuid::new_v4()),
                article_name: Some("Article".to_string()),
                category_name: category.map(str::to_string),
                quantity: 1,
                price_at_sale: price.clone(),
            })
            .collect();
        let total = items
            .iter()
            .fold(BigDecimal::from(0), |sum, i| sum + &i.price_at_sale);
        let sale = SaleView {
            id,
            change_given: &received - &total,
            total,
            payment_received: received,
            payment_method: "cash".to_string(),
            created_at,
            items,
        };
        self.sales.lock().unwrap().push(sale.clone());
        sale
    }
}

impl SaleRepository for MemorySales {
    fn insert_sale(&self, sale: &NewSale) -> Result<Uuid, DomainError> {
        if self.fail_sale_insert.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("sales unavailable".to_string()));
        }
        if self.slow_sale_insert.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(300));
        }
        let id = Uuid::new_v4();
        self.sales.lock().unwrap().push(SaleView {
            id,
            total: sale.total.clone(),
            payment_received: sale.payment_received.clone(),
            change_given: sale.change_given.clone(),
            payment_method: sale.payment_method.to_string(),
            created_at: Utc::now(),
            items: vec![],
        });
        Ok(id)
    }

    fn insert_sale_items(&self, sale_id: Uuid, items: &[NewSaleItem]) -> Result<(), DomainError> {
        if self.fail_item_insert.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("sale_items unavailable".to_string()));
        }
        let mut sales = self.sales.lock().unwrap();
        let sale = sales
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or(DomainError::NotFound)?;
        sale.items.extend(items.iter().map(|item| SaleItemView {
            id: Uuid::new_v4(),
            sale_id,
            article_id: Some(item.article_id),
            article_name: None,
            category_name: None,
            quantity: 1,
            price_at_sale: item.price_at_sale.clone(),
        }));
        Ok(())
    }

    fn find_in_range(&self, range: &TimeRange) -> Result<Vec<SaleView>, DomainError> {
        let mut sales: Vec<SaleView> = self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| range.contains(s.created_at))
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sales)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        Ok(self.sales.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    fn remove_sale_item(&self, sale_id: Uuid, item_id: Uuid) -> Result<ItemRemoval, DomainError> {
        let mut sales = self.sales.lock().unwrap();
        let index = sales
            .iter()
            .position(|s| s.id == sale_id)
            .ok_or(DomainError::NotFound)?;
        let sale = &mut sales[index];
        let item_index = sale
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or(DomainError::NotFound)?;
        let item = sale.items.remove(item_index);

        if sale.items.is_empty() {
            sales.remove(index);
            return Ok(ItemRemoval::SaleDeleted);
        }
        sale.total = &sale.total - &item.price_at_sale;
        Ok(ItemRemoval::TotalReduced {
            new_total: sale.total.clone(),
        })
    }
}

/// Broadcaster that always fails.
pub struct BrokenBroadcaster;

impl EventBroadcaster for BrokenBroadcaster {
    fn broadcast(&self, _event: &str, _payload: Value) -> Result<(), DomainError> {
        Err(DomainError::Internal("channel closed".to_string()))
    }
}

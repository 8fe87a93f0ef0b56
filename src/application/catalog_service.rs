use bigdecimal::BigDecimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::catalog::{
    required_name, sort_positions, ArticleFilter, ArticleInput, ArticleView, CategoryView,
    VariantInput, VariantView,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, ARTICLES};

/// Article, category and variant maintenance. Every article-side write is
/// announced on the change feed.
pub struct CatalogService<R> {
    repo: R,
    feed: ChangeFeed,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R, feed: ChangeFeed) -> Self {
        Self { repo, feed }
    }

    pub fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleView>, DomainError> {
        self.repo.list_articles(filter)
    }

    pub fn get_article(&self, id: Uuid) -> Result<ArticleView, DomainError> {
        self.repo.find_article(id)?.ok_or(DomainError::NotFound)
    }

    pub fn create_article(
        &self,
        name: &str,
        price: Option<BigDecimal>,
        category_id: Option<Uuid>,
    ) -> Result<Uuid, DomainError> {
        let input = ArticleInput::new(name, price, category_id)?;
        let id = self.repo.create_article(input)?;
        self.notify(ChangeKind::Insert, id);
        Ok(id)
    }

    pub fn update_article(
        &self,
        id: Uuid,
        name: &str,
        price: Option<BigDecimal>,
        category_id: Option<Uuid>,
    ) -> Result<(), DomainError> {
        let input = ArticleInput::new(name, price, category_id)?;
        if !self.repo.update_article(id, input)? {
            return Err(DomainError::NotFound);
        }
        self.notify(ChangeKind::Update, id);
        Ok(())
    }

    /// Callers must have checked the passphrase.
    pub fn delete_article(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_article(id)? {
            return Err(DomainError::NotFound);
        }
        log::info!("article {id} deleted");
        self.notify(ChangeKind::Delete, id);
        Ok(())
    }

    /// Stores the given order as the new display order.
    pub fn reorder_articles(&self, ids: &[Uuid]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Err(DomainError::InvalidInput("no articles to reorder".to_string()));
        }
        self.repo.update_sort_positions(&sort_positions(ids))?;
        self.feed.publish(ChangeEvent::new(
            ARTICLES,
            ChangeKind::Update,
            json!({ "reordered": ids.len() }),
        ));
        Ok(())
    }

    pub fn list_categories(&self) -> Result<Vec<CategoryView>, DomainError> {
        self.repo.list_categories()
    }

    pub fn create_category(&self, name: &str) -> Result<CategoryView, DomainError> {
        let name = required_name(name, "category")?;
        self.repo.create_category(name)
    }

    pub fn add_variant(
        &self,
        article_id: Uuid,
        name: &str,
        price: BigDecimal,
    ) -> Result<VariantView, DomainError> {
        let input = VariantInput::new(name, price)?;
        if self.repo.find_article(article_id)?.is_none() {
            return Err(DomainError::NotFound);
        }
        let variant = self.repo.add_variant(article_id, input)?;
        self.notify(ChangeKind::Update, article_id);
        Ok(variant)
    }

    pub fn delete_variant(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_variant(id)? {
            return Err(DomainError::NotFound);
        }
        self.feed.publish(ChangeEvent::new(
            ARTICLES,
            ChangeKind::Update,
            json!({ "variant_id": id }),
        ));
        Ok(())
    }

    fn notify(&self, kind: ChangeKind, article_id: Uuid) {
        self.feed
            .publish(ChangeEvent::new(ARTICLES, kind, json!({ "id": article_id })));
    }
}

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{
    ArticleFilter, ArticleInput, ArticleView, CategoryView, VariantInput, VariantView,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{articles, categories, product_variants};

use super::models::{
    ArticleChangeset, ArticleRow, CategoryRow, NewArticleRow, NewCategoryRow, NewVariantRow,
    VariantRow,
};

/// `ILIKE` pattern matching `term` anywhere, with its own `%`, `_` and `\\`
/// taken literally (backslash is the default escape character).
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<VariantRow> for VariantView {
    fn from(row: VariantRow) -> Self {
        VariantView {
            id: row.id,
            name: row.name,
            price: row.price,
        }
    }
}

impl From<CategoryRow> for CategoryView {
    fn from(row: CategoryRow) -> Self {
        CategoryView {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Loads the variants of `rows` in one query and assembles the views.
fn with_variants(
    conn: &mut PgConnection,
    rows: Vec<(ArticleRow, Option<String>)>,
) -> QueryResult<Vec<ArticleView>> {
    let (articles, category_names): (Vec<ArticleRow>, Vec<Option<String>>) =
        rows.into_iter().unzip();

    let variants = VariantRow::belonging_to(&articles)
        .select(VariantRow::as_select())
        .order(product_variants::created_at.asc())
        .load(conn)?
        .grouped_by(&articles);

    Ok(articles
        .into_iter()
        .zip(category_names)
        .zip(variants)
        .map(|((a, category_name), variants)| ArticleView {
            id: a.id,
            name: a.name,
            category_id: a.category_id,
            category_name,
            price: a.price,
            sort_order: a.sort_order,
            created_at: a.created_at,
            variants: variants.into_iter().map(VariantView::from).collect(),
        })
        .collect())
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = articles::table
            .left_join(categories::table)
            .select((ArticleRow::as_select(), categories::name.nullable()))
            .order((articles::sort_order.asc(), articles::created_at.asc()))
            .into_boxed();
        if let Some(category_id) = filter.category_id {
            query = query.filter(articles::category_id.eq(category_id));
        }
        if let Some(term) = filter.search_term() {
            query = query.filter(articles::name.ilike(contains_pattern(term)));
        }

        let rows = query.load::<(ArticleRow, Option<String>)>(&mut conn)?;
        Ok(with_variants(&mut conn, rows)?)
    }

    fn find_article(&self, id: Uuid) -> Result<Option<ArticleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = articles::table
            .left_join(categories::table)
            .filter(articles::id.eq(id))
            .select((ArticleRow::as_select(), categories::name.nullable()))
            .first::<(ArticleRow, Option<String>)>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(with_variants(&mut conn, vec![row])?.pop())
    }

    fn create_article(&self, input: ArticleInput) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;
        let id = Uuid::new_v4();
        diesel::insert_into(articles::table)
            .values(&NewArticleRow {
                id,
                name: input.name,
                category_id: input.category_id,
                price: input.price,
            })
            .execute(&mut conn)?;
        Ok(id)
    }

    fn update_article(&self, id: Uuid, input: ArticleInput) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(articles::table.find(id))
            .set(&ArticleChangeset {
                name: input.name,
                category_id: input.category_id,
                price: input.price,
            })
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn delete_article(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(articles::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn update_sort_positions(&self, positions: &[(Uuid, i32)]) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            for (id, position) in positions {
                let updated = diesel::update(articles::table.find(*id))
                    .set(articles::sort_order.eq(*position))
                    .execute(conn)?;
                if updated == 0 {
                    return Err(DomainError::NotFound);
                }
            }
            Ok(())
        })
    }

    fn list_categories(&self) -> Result<Vec<CategoryView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(CategoryView::from).collect())
    }

    fn create_category(&self, name: String) -> Result<CategoryView, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                id: Uuid::new_v4(),
                name,
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn add_variant(&self, article_id: Uuid, input: VariantInput) -> Result<VariantView, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(product_variants::table)
            .values(&NewVariantRow {
                id: Uuid::new_v4(),
                article_id,
                name: input.name,
                price: input.price,
            })
            .returning(VariantRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn delete_variant(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(product_variants::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::{contains_pattern, DieselCatalogRepository};
    use crate::domain::catalog::{ArticleFilter, ArticleInput, VariantInput};
    use crate::domain::ports::CatalogRepository;
    use crate::infrastructure::test_db::setup_db;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn input(name: &str, price: Option<&str>, category_id: Option<uuid::Uuid>) -> ArticleInput {
        ArticleInput::new(name, price.map(dec), category_id).expect("valid input")
    }

    #[tokio::test]
    async fn list_filters_by_category_and_name() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let mode = repo.create_category("Mode".to_string()).expect("category");

        repo.create_article(input("Silk Scarf", Some("12.00"), Some(mode.id)))
            .expect("create failed");
        repo.create_article(input("Wool Scarf", None, None))
            .expect("create failed");
        repo.create_article(input("Candle", Some("4.50"), None))
            .expect("create failed");

        let by_category = repo
            .list_articles(&ArticleFilter {
                category_id: Some(mode.id),
                search: None,
            })
            .expect("list failed");
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].category_name.as_deref(), Some("Mode"));

        let by_name = repo
            .list_articles(&ArticleFilter {
                category_id: None,
                search: Some("scarf".to_string()),
            })
            .expect("list failed");
        assert_eq!(by_name.len(), 2);
    }

    #[test]
    fn wildcards_in_search_are_escaped() {
        assert_eq!(contains_pattern("scarf"), "%scarf%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        repo.create_article(input("Tea 500 g", Some("6.00"), None))
            .expect("create failed");
        repo.create_article(input("Sale 50% off", Some("3.00"), None))
            .expect("create failed");
        repo.create_article(input("Gift_Box", Some("8.00"), None))
            .expect("create failed");
        repo.create_article(input("Gift Bag", Some("2.00"), None))
            .expect("create failed");

        let search = |term: &str| {
            repo.list_articles(&ArticleFilter {
                category_id: None,
                search: Some(term.to_string()),
            })
            .expect("list failed")
            .into_iter()
            .map(|a| a.name)
            .collect::<Vec<_>>()
        };
        assert_eq!(search("50%"), vec!["Sale 50% off"]);
        assert_eq!(search("gift_"), vec!["Gift_Box"]);
        assert!(search("%").iter().all(|name| name.contains('%')));
    }

    #[tokio::test]
    async fn sort_positions_drive_list_order() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let a = repo.create_article(input("A", None, None)).expect("create");
        let b = repo.create_article(input("B", None, None)).expect("create");

        repo.update_sort_positions(&[(b, 0), (a, 10)])
            .expect("reorder failed");

        let names: Vec<String> = repo
            .list_articles(&ArticleFilter::default())
            .expect("list failed")
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn reorder_with_unknown_id_changes_nothing() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let a = repo.create_article(input("A", None, None)).expect("create");

        let result = repo.update_sort_positions(&[(a, 50), (uuid::Uuid::new_v4(), 60)]);

        assert!(result.is_err());
        let article = repo.find_article(a).expect("find").expect("exists");
        assert_eq!(article.sort_order, 0);
    }

    #[tokio::test]
    async fn variants_load_with_their_article() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let id = repo.create_article(input("Shirt", Some("9.00"), None)).expect("create");
        repo.add_variant(id, VariantInput::new("S", dec("18.00")).expect("variant"))
            .expect("variant failed");
        let xl = repo
            .add_variant(id, VariantInput::new("XL", dec("22.00")).expect("variant"))
            .expect("variant failed");

        let article = repo.find_article(id).expect("find").expect("exists");
        assert_eq!(article.variants.len(), 2);

        assert!(repo.delete_variant(xl.id).expect("delete failed"));
        let article = repo.find_article(id).expect("find").expect("exists");
        assert_eq!(article.variants.len(), 1);
    }

    #[tokio::test]
    async fn update_can_clear_price_and_delete_reports_missing() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let id = repo.create_article(input("Card", Some("2.00"), None)).expect("create");

        assert!(repo.update_article(id, input("Card", None, None)).expect("update"));
        let article = repo.find_article(id).expect("find").expect("exists");
        assert_eq!(article.price, None);

        assert!(repo.delete_article(id).expect("delete"));
        assert!(!repo.delete_article(id).expect("delete"));
        assert!(repo.find_article(id).expect("find").is_none());
    }
}

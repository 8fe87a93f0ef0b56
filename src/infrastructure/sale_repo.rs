use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::analytics::TimeRange;
use crate::domain::errors::DomainError;
use crate::domain::ports::SaleRepository;
use crate::domain::sale::{ItemRemoval, NewSale, NewSaleItem, SaleItemView, SaleView};
use crate::schema::{articles, categories, sale_items, sales};

use super::models::{NewSaleItemRow, NewSaleRow, SaleItemRow, SaleRow};

pub struct DieselSaleRepository {
    pool: DbPool,
}

impl DieselSaleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Attaches items, with article and category names, to each sale row.
fn with_items(conn: &mut PgConnection, sales: Vec<SaleRow>) -> QueryResult<Vec<SaleView>> {
    let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();

    let rows = sale_items::table
        .left_join(articles::table.left_join(categories::table))
        .filter(sale_items::sale_id.eq_any(&ids))
        .order(sale_items::created_at.asc())
        .select((
            SaleItemRow::as_select(),
            articles::name.nullable(),
            categories::name.nullable(),
        ))
        .load::<(SaleItemRow, Option<String>, Option<String>)>(conn)?;

    let mut by_sale: HashMap<Uuid, Vec<SaleItemView>> = HashMap::new();
    for (item, article_name, category_name) in rows {
        by_sale.entry(item.sale_id).or_default().push(SaleItemView {
            id: item.id,
            sale_id: item.sale_id,
            article_id: item.article_id,
            article_name,
            category_name,
            quantity: item.quantity,
            price_at_sale: item.price_at_sale,
        });
    }

    Ok(sales
        .into_iter()
        .map(|s| SaleView {
            items: by_sale.remove(&s.id).unwrap_or_default(),
            id: s.id,
            total: s.total,
            payment_received: s.payment_received,
            change_given: s.change_given,
            payment_method: s.payment_method,
            created_at: s.created_at,
        })
        .collect())
}

impl SaleRepository for DieselSaleRepository {
    fn insert_sale(&self, sale: &NewSale) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;
        let sale_id = Uuid::new_v4();
        diesel::insert_into(sales::table)
            .values(&NewSaleRow {
                id: sale_id,
                total: sale.total.clone(),
                payment_received: sale.payment_received.clone(),
                change_given: sale.change_given.clone(),
                payment_method: sale.payment_method.to_string(),
            })
            .execute(&mut conn)?;
        Ok(sale_id)
    }

    fn insert_sale_items(&self, sale_id: Uuid, items: &[NewSaleItem]) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<NewSaleItemRow> = items
            .iter()
            .map(|item| NewSaleItemRow {
                id: Uuid::new_v4(),
                sale_id,
                article_id: Some(item.article_id),
                quantity: 1,
                price_at_sale: item.price_at_sale.clone(),
            })
            .collect();
        diesel::insert_into(sale_items::table)
            .values(&rows)
            .execute(&mut conn)?;
        Ok(())
    }

    fn find_in_range(&self, range: &TimeRange) -> Result<Vec<SaleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = sales::table
            .filter(sales::created_at.ge(range.start))
            .filter(sales::created_at.lt(range.end))
            .order(sales::created_at.desc())
            .select(SaleRow::as_select())
            .load(&mut conn)?;

        Ok(with_items(&mut conn, rows)?)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let sale = sales::table
            .filter(sales::id.eq(id))
            .select(SaleRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(sale) = sale else {
            return Ok(None);
        };
        Ok(with_items(&mut conn, vec![sale])?.pop())
    }

    fn remove_sale_item(&self, sale_id: Uuid, item_id: Uuid) -> Result<ItemRemoval, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Row lock serialises concurrent removals from the same sale.
            let total: BigDecimal = sales::table
                .find(sale_id)
                .select(sales::total)
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;

            let price: BigDecimal = diesel::delete(
                sale_items::table
                    .filter(sale_items::id.eq(item_id))
                    .filter(sale_items::sale_id.eq(sale_id)),
            )
            .returning(sale_items::price_at_sale)
            .get_result(conn)
            .optional()?
            .ok_or(DomainError::NotFound)?;

            let remaining: i64 = sale_items::table
                .filter(sale_items::sale_id.eq(sale_id))
                .count()
                .get_result(conn)?;

            if remaining == 0 {
                diesel::delete(sales::table.find(sale_id)).execute(conn)?;
                return Ok(ItemRemoval::SaleDeleted);
            }

            let new_total = total - price;
            diesel::update(sales::table.find(sale_id))
                .set(sales::total.eq(&new_total))
                .execute(conn)?;
            Ok(ItemRemoval::TotalReduced { new_total })
        })
    }
}

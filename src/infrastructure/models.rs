use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::schema::{articles, categories, pos_outbox, product_variants, sale_items, sales};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategoryRow {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub price: Option<BigDecimal>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticleRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub price: Option<BigDecimal>,
}

/// `None` fields are written as NULL, so clearing a price or category works.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = articles)]
#[diesel(treat_none_as_null = true)]
pub struct ArticleChangeset {
    pub name: String,
    pub category_id: Option<Uuid>,
    pub price: Option<BigDecimal>,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = product_variants)]
#[diesel(belongs_to(ArticleRow, foreign_key = article_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VariantRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_variants)]
pub struct NewVariantRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleRow {
    pub id: Uuid,
    pub total: BigDecimal,
    pub payment_received: BigDecimal,
    pub change_given: BigDecimal,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sales)]
pub struct NewSaleRow {
    pub id: Uuid,
    pub total: BigDecimal,
    pub payment_received: BigDecimal,
    pub change_given: BigDecimal,
    pub payment_method: String,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = sale_items)]
#[diesel(belongs_to(SaleRow, foreign_key = sale_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleItemRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub article_id: Option<Uuid>,
    pub quantity: i32,
    pub price_at_sale: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sale_items)]
pub struct NewSaleItemRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub article_id: Option<Uuid>,
    pub quantity: i32,
    pub price_at_sale: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = pos_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pos_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

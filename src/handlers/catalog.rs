use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::{ArticleFilter, ArticleView, CategoryView, VariantView};
use crate::domain::payment::format_amount;
use crate::errors::AppError;
use crate::state::AppState;

use super::parse_money;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleQuery {
    /// Only articles in this category.
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of the article name.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ArticleRequest {
    pub name: String,
    /// Decimal price as a string, e.g. "9.99". Omit for prices entered at sale time.
    pub price: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteArticleRequest {
    pub passphrase: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderRequest {
    /// Article ids in their new display order.
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VariantRequest {
    pub name: String,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantResponse {
    pub id: Uuid,
    pub name: String,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub price: Option<String>,
    pub sort_order: i32,
    pub created_at: String,
    pub variants: Vec<VariantResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<VariantView> for VariantResponse {
    fn from(v: VariantView) -> Self {
        Self {
            id: v.id,
            name: v.name,
            price: format_amount(&v.price),
        }
    }
}

impl From<ArticleView> for ArticleResponse {
    fn from(a: ArticleView) -> Self {
        Self {
            id: a.id,
            name: a.name,
            category_id: a.category_id,
            category_name: a.category_name,
            price: a.price.as_ref().map(format_amount),
            sort_order: a.sort_order,
            created_at: a.created_at.to_rfc3339(),
            variants: a.variants.into_iter().map(VariantResponse::from).collect(),
        }
    }
}

impl From<CategoryView> for CategoryResponse {
    fn from(c: CategoryView) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

fn service(state: &AppState) -> CatalogService<crate::state::DynCatalog> {
    CatalogService::new(state.catalog.clone(), state.feed.clone())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /articles
///
/// Lists articles by display order. Without filters the cached catalog view
/// is served; it refreshes after any article change.
#[utoipa::path(
    get,
    path = "/articles",
    params(ArticleQuery),
    responses(
        (status = 200, description = "Articles", body = [ArticleResponse]),
        (status = 401, description = "Register is locked"),
    ),
    tag = "catalog"
)]
pub async fn list_articles(
    state: web::Data<AppState>,
    query: web::Query<ArticleQuery>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let query = query.into_inner();
    let filter = ArticleFilter {
        category_id: query.category_id,
        search: query.search,
    };

    let articles = web::block(move || {
        if filter.is_empty() {
            state.catalog_view.articles()
        } else {
            service(&state).list_articles(&filter)
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<ArticleResponse> = articles.into_iter().map(ArticleResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /articles
#[utoipa::path(
    post,
    path = "/articles",
    request_body = ArticleRequest,
    responses(
        (status = 201, description = "Article created", body = CreatedResponse),
        (status = 400, description = "Missing name or invalid price"),
    ),
    tag = "catalog"
)]
pub async fn create_article(
    state: web::Data<AppState>,
    body: web::Json<ArticleRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let body = body.into_inner();
    let price = body
        .price
        .as_deref()
        .map(|raw| parse_money("price", raw))
        .transpose()?;

    let id = web::block(move || service(&state).create_article(&body.name, price, body.category_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}

/// PUT /articles/{id}
#[utoipa::path(
    put,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article UUID")),
    request_body = ArticleRequest,
    responses(
        (status = 204, description = "Article updated"),
        (status = 404, description = "Article not found"),
    ),
    tag = "catalog"
)]
pub async fn update_article(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ArticleRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let id = path.into_inner();
    let body = body.into_inner();
    let price = body
        .price
        .as_deref()
        .map(|raw| parse_money("price", raw))
        .transpose()?;

    web::block(move || service(&state).update_article(id, &body.name, price, body.category_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /articles/{id}
///
/// Destructive: the passphrase is required on every call.
#[utoipa::path(
    delete,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article UUID")),
    request_body = DeleteArticleRequest,
    responses(
        (status = 204, description = "Article deleted"),
        (status = 401, description = "Wrong passphrase"),
        (status = 404, description = "Article not found"),
    ),
    tag = "catalog"
)]
pub async fn delete_article(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<DeleteArticleRequest>,
) -> Result<HttpResponse, AppError> {
    {
        let session = state.register.session();
        session.require_authenticated()?;
        session.verify(&body.passphrase)?;
    }
    let id = path.into_inner();

    web::block(move || service(&state).delete_article(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /articles/order
#[utoipa::path(
    put,
    path = "/articles/order",
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order saved"),
        (status = 404, description = "An id does not exist; nothing was changed"),
    ),
    tag = "catalog"
)]
pub async fn reorder_articles(
    state: web::Data<AppState>,
    body: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let ids = body.into_inner().ids;

    web::block(move || service(&state).reorder_articles(&ids))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /articles/{id}/variants
#[utoipa::path(
    post,
    path = "/articles/{id}/variants",
    params(("id" = Uuid, Path, description = "Article UUID")),
    request_body = VariantRequest,
    responses(
        (status = 201, description = "Variant added", body = VariantResponse),
        (status = 404, description = "Article not found"),
    ),
    tag = "catalog"
)]
pub async fn add_variant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<VariantRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let article_id = path.into_inner();
    let body = body.into_inner();
    let price = parse_money("price", &body.price)?;

    let variant = web::block(move || service(&state).add_variant(article_id, &body.name, price))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(VariantResponse::from(variant)))
}

/// DELETE /variants/{id}
#[utoipa::path(
    delete,
    path = "/variants/{id}",
    params(("id" = Uuid, Path, description = "Variant UUID")),
    responses(
        (status = 204, description = "Variant deleted"),
        (status = 404, description = "Variant not found"),
    ),
    tag = "catalog"
)]
pub async fn delete_variant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let id = path.into_inner();

    web::block(move || service(&state).delete_variant(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /categories
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories by name", body = [CategoryResponse])),
    tag = "catalog"
)]
pub async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;

    let categories = web::block(move || service(&state).list_categories())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CategoryResponse> = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /categories
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Missing name"),
    ),
    tag = "catalog"
)]
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let name = body.into_inner().name;

    let category = web::block(move || service(&state).create_category(&name))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

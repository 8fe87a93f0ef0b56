use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::cart::{resolve_selection, Cart, CartItem, PriceSelection};
use crate::domain::payment::format_amount;
use crate::errors::AppError;
use crate::state::AppState;

use super::parse_money;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub article_id: Uuid,
    /// Required when the article has variants.
    pub variant_id: Option<Uuid>,
    /// Price typed in at the register, for articles without a fixed price.
    pub price: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub cart_id: Uuid,
    pub article_id: Uuid,
    pub name: String,
    pub category_name: Option<String>,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: String,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            cart_id: item.cart_id,
            article_id: item.article_id,
            name: item.name.clone(),
            category_name: item.category_name.clone(),
            price: format_amount(&item.price),
        }
    }
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemResponse::from).collect(),
            total: format_amount(&cart.total()),
        }
    }
}

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses((status = 200, description = "Current cart", body = CartResponse)),
    tag = "cart"
)]
pub async fn get_cart(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let body = CartResponse::from(&*state.register.cart());
    Ok(HttpResponse::Ok().json(body))
}

/// POST /cart/items
///
/// Settles the price of the article (variant, fixed or entered) and appends
/// one line to the cart.
#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Line added", body = CartResponse),
        (status = 400, description = "Missing variant or invalid price"),
        (status = 404, description = "Article or variant not found"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    state: web::Data<AppState>,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let body = body.into_inner();
    // A blank price field counts as no price entered.
    let entered = body
        .price
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());
    let selection = match (body.variant_id, entered) {
        (Some(variant_id), _) => PriceSelection::Variant(variant_id),
        (None, Some(raw)) => PriceSelection::Manual(parse_money("price", raw)?),
        (None, None) => PriceSelection::Fixed,
    };

    let catalog = state.catalog.clone();
    let feed = state.feed.clone();
    let article = web::block(move || CatalogService::new(catalog, feed).get_article(body.article_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    let resolved = resolve_selection(&article, selection)?;

    let mut cart = state.register.cart();
    let cart_id = cart.add_item(resolved);
    log::debug!("added {} to cart as {cart_id}", article.name);
    Ok(HttpResponse::Created().json(CartResponse::from(&*cart)))
}

/// DELETE /cart/items/{cart_id}
///
/// Removes exactly one line; other lines of the same article stay.
#[utoipa::path(
    delete,
    path = "/cart/items/{cart_id}",
    params(("cart_id" = Uuid, Path, description = "Cart line id")),
    responses((status = 200, description = "Updated cart", body = CartResponse)),
    tag = "cart"
)]
pub async fn remove_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let mut cart = state.register.cart();
    cart.remove_item(path.into_inner());
    Ok(HttpResponse::Ok().json(CartResponse::from(&*cart)))
}

/// DELETE /cart
#[utoipa::path(
    delete,
    path = "/cart",
    responses((status = 200, description = "Emptied cart", body = CartResponse)),
    tag = "cart"
)]
pub async fn clear_cart(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let mut cart = state.register.cart();
    cart.clear();
    Ok(HttpResponse::Ok().json(CartResponse::from(&*cart)))
}

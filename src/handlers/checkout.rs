use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::sale_service::SaleService;
use crate::domain::payment::{format_amount, parse_amount, PRESET_AMOUNTS};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Amount handed over by the customer, as typed ("20", "18,50").
    pub received: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptResponse {
    pub sale_id: Uuid,
    pub total: String,
    pub payment_received: String,
    pub change_given: String,
    pub item_count: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteQuery {
    pub received: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub total: String,
    pub received: String,
    /// Change due, or the shortfall as a negative amount.
    pub change: String,
    pub can_complete: bool,
    pub presets: Vec<u32>,
}

/// GET /checkout/quote
///
/// Live change computation for the payment dialog.
#[utoipa::path(
    get,
    path = "/checkout/quote",
    params(QuoteQuery),
    responses(
        (status = 200, description = "Change for the tendered amount", body = QuoteResponse),
        (status = 400, description = "Unreadable amount"),
    ),
    tag = "checkout"
)]
pub async fn quote(
    state: web::Data<AppState>,
    query: web::Query<QuoteQuery>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let received = parse_amount(query.received.as_deref().unwrap_or_default())?;
    let (total, item_count) = {
        let cart = state.register.cart();
        (cart.total(), cart.len())
    };
    let change: BigDecimal = &received - &total;

    Ok(HttpResponse::Ok().json(QuoteResponse {
        total: format_amount(&total),
        received: format_amount(&received),
        can_complete: item_count > 0 && received >= total,
        change: format_amount(&change),
        presets: PRESET_AMOUNTS.to_vec(),
    }))
}

/// POST /checkout
///
/// Records the cart as a cash sale and removes the sold lines from the cart.
/// Only one checkout may be in flight at a time.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Sale recorded", body = ReceiptResponse),
        (status = 400, description = "Empty cart or insufficient payment"),
        (status = 409, description = "Another checkout is in flight"),
        (status = 500, description = "Sale recorded without items"),
    ),
    tag = "checkout"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.require_authenticated()?;
    let received = parse_amount(&body.received)?;
    let _guard = state.register.begin_checkout()?;

    let mut snapshot = state.register.cart().clone();
    let sold: Vec<Uuid> = snapshot.items().iter().map(|item| item.cart_id).collect();
    let service = SaleService::new(state.sales.clone(), state.broadcaster.clone());
    let receipt = web::block(move || service.complete_sale(&mut snapshot, received))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    state.register.settle_checkout(&sold);

    Ok(HttpResponse::Created().json(ReceiptResponse {
        sale_id: receipt.sale_id,
        total: format_amount(&receipt.total),
        payment_received: format_amount(&receipt.payment_received),
        change_given: format_amount(&receipt.change_given),
        item_count: receipt.item_count,
    }))
}

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::analytics_service::AnalyticsService;
use crate::application::sale_editor::SaleEditor;
use crate::domain::analytics::{SalesStats, TimeWindow};
use crate::domain::payment::format_amount;
use crate::domain::sale::{ItemRemoval, SaleItemView, SaleView};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    /// One of `today` (default), `yesterday`, `week`, `month`.
    pub window: Option<String>,
}

impl WindowQuery {
    fn window(&self) -> Result<TimeWindow, AppError> {
        match self.window.as_deref() {
            None => Ok(TimeWindow::default()),
            Some(raw) => raw.parse::<TimeWindow>().map_err(AppError::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryStatResponse {
    pub name: String,
    pub count: usize,
    pub revenue: String,
    /// Percent of total revenue with one decimal, absent when there is no revenue.
    pub share_percent: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub window: String,
    pub total_sales: usize,
    pub total_revenue: String,
    pub average_transaction: String,
    pub category_stats: Vec<CategoryStatResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleItemResponse {
    pub id: Uuid,
    pub article_id: Option<Uuid>,
    pub label: String,
    pub quantity: i32,
    pub price_at_sale: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub total: String,
    pub payment_received: String,
    pub change_given: String,
    pub payment_method: String,
    pub created_at: String,
    pub items: Vec<SaleItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemRemovalResponse {
    pub sale_deleted: bool,
    /// Remaining total when the sale survives.
    pub new_total: Option<String>,
}

impl StatsResponse {
    fn new(window: TimeWindow, stats: SalesStats) -> Self {
        let category_stats = stats
            .category_stats
            .iter()
            .map(|c| CategoryStatResponse {
                name: c.name.clone(),
                count: c.count,
                revenue: format_amount(&c.revenue),
                share_percent: c
                    .share_of(&stats.total_revenue)
                    .map(|share| share.round(1).with_scale(1).to_string()),
            })
            .collect();
        Self {
            window: window.to_string(),
            total_sales: stats.total_sales,
            total_revenue: format_amount(&stats.total_revenue),
            average_transaction: format_amount(&stats.average_transaction),
            category_stats,
        }
    }
}

impl From<SaleItemView> for SaleItemResponse {
    fn from(item: SaleItemView) -> Self {
        Self {
            label: item.label(),
            id: item.id,
            article_id: item.article_id,
            quantity: item.quantity,
            price_at_sale: format_amount(&item.price_at_sale),
        }
    }
}

impl From<SaleView> for SaleResponse {
    fn from(sale: SaleView) -> Self {
        Self {
            id: sale.id,
            total: format_amount(&sale.total),
            payment_received: format_amount(&sale.payment_received),
            change_given: format_amount(&sale.change_given),
            payment_method: sale.payment_method,
            created_at: sale.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            items: sale.items.into_iter().map(SaleItemResponse::from).collect(),
        }
    }
}

impl From<ItemRemoval> for ItemRemovalResponse {
    fn from(removal: ItemRemoval) -> Self {
        match removal {
            ItemRemoval::SaleDeleted => Self {
                sale_deleted: true,
                new_total: None,
            },
            ItemRemoval::TotalReduced { new_total } => Self {
                sale_deleted: false,
                new_total: Some(format_amount(&new_total)),
            },
        }
    }
}

/// GET /analytics
#[utoipa::path(
    get,
    path = "/analytics",
    params(WindowQuery),
    responses(
        (status = 200, description = "Revenue and category breakdown", body = StatsResponse),
        (status = 401, description = "Analytics locked"),
    ),
    tag = "analytics"
)]
pub async fn stats(
    state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> Result<HttpResponse, AppError> {
    state.register.require_analytics()?;
    let window = query.window()?;

    let service = AnalyticsService::new(state.sales.clone());
    let stats = web::block(move || service.stats(window, &Local::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(StatsResponse::new(window, stats)))
}

/// GET /analytics/sales
#[utoipa::path(
    get,
    path = "/analytics/sales",
    params(WindowQuery),
    responses(
        (status = 200, description = "Sales with items, newest first", body = [SaleResponse]),
        (status = 401, description = "Analytics locked"),
    ),
    tag = "analytics"
)]
pub async fn list_sales(
    state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> Result<HttpResponse, AppError> {
    state.register.require_analytics()?;
    let window = query.window()?;

    let service = AnalyticsService::new(state.sales.clone());
    let (_, sales) = web::block(move || service.sales(window, &Local::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<SaleResponse> = sales.into_iter().map(SaleResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /analytics/export
///
/// One CSV row per sale, semicolon-separated, with a UTF-8 byte-order mark.
#[utoipa::path(
    get,
    path = "/analytics/export",
    params(WindowQuery),
    responses(
        (status = 200, description = "CSV report", body = String, content_type = "text/csv"),
        (status = 401, description = "Analytics locked"),
    ),
    tag = "analytics"
)]
pub async fn export(
    state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> Result<HttpResponse, AppError> {
    state.register.require_analytics()?;
    let window = query.window()?;

    let service = AnalyticsService::new(state.sales.clone());
    let report = web::block(move || service.export(window, &Local::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    log::info!("exported {} ({} bytes)", report.file_name, report.content.len());
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(report.file_name)],
        })
        .body(report.content))
}

/// DELETE /sales/{sale_id}/items/{item_id}
///
/// Removing the last item deletes the sale itself.
#[utoipa::path(
    delete,
    path = "/sales/{sale_id}/items/{item_id}",
    params(
        ("sale_id" = Uuid, Path, description = "Sale UUID"),
        ("item_id" = Uuid, Path, description = "Sale item UUID"),
    ),
    responses(
        (status = 200, description = "Item removed", body = ItemRemovalResponse),
        (status = 401, description = "Analytics locked"),
        (status = 404, description = "Sale or item not found"),
    ),
    tag = "analytics"
)]
pub async fn delete_sale_item(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    state.register.require_analytics()?;
    let (sale_id, item_id) = path.into_inner();

    let editor = SaleEditor::new(state.sales.clone());
    let removal = web::block(move || editor.delete_sale_item(sale_id, item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ItemRemovalResponse::from(removal)))
}

use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::session::get_session,
        handlers::session::login,
        handlers::session::logout,
        handlers::session::unlock_analytics,
        handlers::session::lock_analytics,
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::list_articles,
        handlers::catalog::create_article,
        handlers::catalog::update_article,
        handlers::catalog::delete_article,
        handlers::catalog::reorder_articles,
        handlers::catalog::add_variant,
        handlers::catalog::delete_variant,
        handlers::cart::get_cart,
        handlers::cart::add_item,
        handlers::cart::remove_item,
        handlers::cart::clear_cart,
        handlers::checkout::quote,
        handlers::checkout::checkout,
        handlers::analytics::stats,
        handlers::analytics::list_sales,
        handlers::analytics::export,
        handlers::analytics::delete_sale_item,
    ),
    components(
        schemas(
            handlers::session::PassphraseRequest,
            handlers::session::SessionResponse,
            handlers::catalog::ArticleRequest,
            handlers::catalog::ArticleResponse,
            handlers::catalog::CategoryRequest,
            handlers::catalog::CategoryResponse,
            handlers::catalog::CreatedResponse,
            handlers::catalog::DeleteArticleRequest,
            handlers::catalog::ReorderRequest,
            handlers::catalog::VariantRequest,
            handlers::catalog::VariantResponse,
            handlers::cart::AddToCartRequest,
            handlers::cart::CartItemResponse,
            handlers::cart::CartResponse,
            handlers::checkout::CheckoutRequest,
            handlers::checkout::QuoteResponse,
            handlers::checkout::ReceiptResponse,
            handlers::analytics::StatsResponse,
            handlers::analytics::CategoryStatResponse,
            handlers::analytics::SaleResponse,
            handlers::analytics::SaleItemResponse,
            handlers::analytics::ItemRemovalResponse,
        )
    ),
    tags(
        (name = "session", description = "Register unlock and analytics gate"),
        (name = "catalog", description = "Articles, categories and variants"),
        (name = "cart", description = "The register's current cart"),
        (name = "checkout", description = "Cash payment and sale recording"),
        (name = "analytics", description = "Sales history, reports and corrections")
    )
)]
pub struct ApiDoc;

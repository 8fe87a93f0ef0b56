pub mod api_docs;
pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod realtime;
pub mod register;
pub mod schema;
pub mod state;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("{} migration(s) applied", applied.len());
    Ok(())
}

/// Registers every route of the register API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{analytics, cart, catalog, checkout, session};

    cfg.service(
        web::scope("/session")
            .route("", web::get().to(session::get_session))
            .route("/login", web::post().to(session::login))
            .route("/logout", web::post().to(session::logout))
            .route("/analytics/unlock", web::post().to(session::unlock_analytics))
            .route("/analytics/lock", web::post().to(session::lock_analytics)),
    )
    .service(
        web::scope("/categories")
            .route("", web::get().to(catalog::list_categories))
            .route("", web::post().to(catalog::create_category)),
    )
    .service(
        web::scope("/articles")
            .route("", web::get().to(catalog::list_articles))
            .route("", web::post().to(catalog::create_article))
            // Before "/{id}" so "order" is not taken for an id.
            .route("/order", web::put().to(catalog::reorder_articles))
            .route("/{id}", web::put().to(catalog::update_article))
            .route("/{id}", web::delete().to(catalog::delete_article))
            .route("/{id}/variants", web::post().to(catalog::add_variant)),
    )
    .route("/variants/{id}", web::delete().to(catalog::delete_variant))
    .service(
        web::scope("/cart")
            .route("", web::get().to(cart::get_cart))
            .route("", web::delete().to(cart::clear_cart))
            .route("/items", web::post().to(cart::add_item))
            .route("/items/{cart_id}", web::delete().to(cart::remove_item)),
    )
    .service(
        web::scope("/checkout")
            .route("", web::post().to(checkout::checkout))
            .route("/quote", web::get().to(checkout::quote)),
    )
    .service(
        web::scope("/analytics")
            .route("", web::get().to(analytics::stats))
            .route("/sales", web::get().to(analytics::list_sales))
            .route("/export", web::get().to(analytics::export)),
    )
    .route(
        "/sales/{sale_id}/items/{item_id}",
        web::delete().to(analytics::delete_sale_item),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = api_docs::ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(configure)
    })
    .bind((host.to_string(), port))?
    .run())
}

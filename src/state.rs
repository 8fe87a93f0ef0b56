use std::sync::Arc;

use crate::application::catalog_view::CatalogView;
use crate::db::DbPool;
use crate::domain::ports::{CatalogRepository, EventBroadcaster, SaleRepository};
use crate::domain::session::Session;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::outbox::OutboxBroadcaster;
use crate::infrastructure::sale_repo::DieselSaleRepository;
use crate::realtime::ChangeFeed;
use crate::register::Register;

pub type DynCatalog = Arc<dyn CatalogRepository>;
pub type DynSales = Arc<dyn SaleRepository>;
pub type DynBroadcaster = Arc<dyn EventBroadcaster>;

/// Everything the handlers share, held once at the application root.
#[derive(Clone)]
pub struct AppState {
    pub catalog: DynCatalog,
    pub sales: DynSales,
    pub broadcaster: DynBroadcaster,
    pub feed: ChangeFeed,
    pub catalog_view: Arc<CatalogView<DynCatalog>>,
    pub register: Arc<Register>,
}

impl AppState {
    pub fn new(
        catalog: DynCatalog,
        sales: DynSales,
        broadcaster: DynBroadcaster,
        feed: ChangeFeed,
        session: Session,
    ) -> Self {
        let catalog_view = Arc::new(CatalogView::new(Arc::clone(&catalog), &feed));
        Self {
            catalog,
            sales,
            broadcaster,
            feed,
            catalog_view,
            register: Arc::new(Register::new(session)),
        }
    }

    /// Wires the Postgres-backed adapters.
    pub fn with_pool(pool: DbPool, session: Session) -> Self {
        let feed = ChangeFeed::new();
        Self::new(
            Arc::new(DieselCatalogRepository::new(pool.clone())),
            Arc::new(DieselSaleRepository::new(pool.clone())),
            Arc::new(OutboxBroadcaster::new(pool, feed.clone())),
            feed,
            session,
        )
    }
}

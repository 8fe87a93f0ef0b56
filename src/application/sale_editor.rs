use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::SaleRepository;
use crate::domain::sale::ItemRemoval;

/// Retroactive corrections to recorded sales.
pub struct SaleEditor<R> {
    repo: R,
}

impl<R: SaleRepository> SaleEditor<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Removes one item from a sale.
    ///
    /// Removing the last item deletes the sale. Otherwise only the total is
    /// reduced; `payment_received` and `change_given` stay as recorded.
    pub fn delete_sale_item(&self, sale_id: Uuid, item_id: Uuid) -> Result<ItemRemoval, DomainError> {
        let removal = self.repo.remove_sale_item(sale_id, item_id).map_err(|e| {
            if !matches!(e, DomainError::NotFound) {
                log::error!("failed to remove item {item_id} from sale {sale_id}: {e}");
            }
            e
        })?;
        match &removal {
            ItemRemoval::SaleDeleted => {
                log::info!("sale {sale_id} deleted with its last item {item_id}")
            }
            ItemRemoval::TotalReduced { new_total } => {
                log::info!("item {item_id} removed from sale {sale_id}, total now {new_total}")
            }
        }
        Ok(removal)
    }
}

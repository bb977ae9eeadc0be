use tableside_core::catalog::{CatalogUnavailable, MenuSnapshot};
use tracing::warn;

use crate::repositories::{DealRepository, MenuRepository, RepositoryError};

/// Reads categories, items and deals into one [`MenuSnapshot`].
///
/// Any repository failure is reported as [`CatalogUnavailable`] so callers
/// never mistake an outage for an empty menu.
pub async fn load_menu_snapshot(
    menu: &dyn MenuRepository,
    deals: &dyn DealRepository,
) -> Result<MenuSnapshot, CatalogUnavailable> {
    let categories = menu.list_categories().await.map_err(unavailable)?;
    let items = menu.list_items().await.map_err(unavailable)?;
    let deals = deals.list().await.map_err(unavailable)?;

    Ok(MenuSnapshot::new(categories, items, deals))
}

fn unavailable(error: RepositoryError) -> CatalogUnavailable {
    warn!(
        event_name = "catalog.snapshot.failed",
        error = %error,
        "menu snapshot could not be loaded"
    );
    CatalogUnavailable::new(error.to_string())
}

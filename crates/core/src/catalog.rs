//! Read-only catalog access used by the cart and the order extractor.
//!
//! The catalog and deal stores are owned elsewhere; the ordering core only
//! looks entries up by id. A lookup either answers (found / not found) or
//! fails with [`CatalogUnavailable`], which callers must surface rather than
//! treat as "not found".

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::deal::{Deal, DealId};
use crate::domain::menu::{Category, CategoryId, MenuItem, MenuItemId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("catalog unavailable: {reason}")]
pub struct CatalogUnavailable {
    pub reason: String,
}

impl CatalogUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

pub trait CatalogLookup {
    fn menu_item(&self, id: &MenuItemId) -> Result<Option<MenuItem>, CatalogUnavailable>;
}

pub trait DealLookup {
    fn deal(&self, id: &DealId) -> Result<Option<Deal>, CatalogUnavailable>;
    fn active_deals(&self) -> Result<Vec<Deal>, CatalogUnavailable>;
}

/// Categories with their orderable items, in display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSection {
    pub category: Category,
    pub items: Vec<MenuItem>,
}

/// Point-in-time copy of the catalog, loaded once per interaction.
#[derive(Clone, Debug, Default)]
pub struct MenuSnapshot {
    categories: Vec<Category>,
    items: Vec<MenuItem>,
    deals: Vec<Deal>,
}

impl MenuSnapshot {
    pub fn new(categories: Vec<Category>, items: Vec<MenuItem>, deals: Vec<Deal>) -> Self {
        Self { categories, items, deals }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn find_item(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn find_deal(&self, id: &DealId) -> Option<&Deal> {
        self.deals.iter().find(|deal| &deal.id == id)
    }

    pub fn items_in(&self, category: &CategoryId) -> Vec<&MenuItem> {
        self.items.iter().filter(|item| &item.category == category).collect()
    }

    /// Active categories ordered by position, each with its available items.
    /// Categories with nothing orderable are omitted.
    pub fn menu_by_category(&self) -> Vec<MenuSection> {
        let mut categories =
            self.categories.iter().filter(|category| category.active).collect::<Vec<_>>();
        categories.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));

        categories
            .into_iter()
            .filter_map(|category| {
                let items = self
                    .items_in(&category.id)
                    .into_iter()
                    .filter(|item| item.available)
                    .cloned()
                    .collect::<Vec<_>>();
                (!items.is_empty()).then(|| MenuSection { category: category.clone(), items })
            })
            .collect()
    }
}

impl CatalogLookup for MenuSnapshot {
    fn menu_item(&self, id: &MenuItemId) -> Result<Option<MenuItem>, CatalogUnavailable> {
        Ok(self.find_item(id).cloned())
    }
}

impl DealLookup for MenuSnapshot {
    fn deal(&self, id: &DealId) -> Result<Option<Deal>, CatalogUnavailable> {
        Ok(self.find_deal(id).cloned())
    }

    fn active_deals(&self) -> Result<Vec<Deal>, CatalogUnavailable> {
        let mut deals = self.deals.iter().filter(|deal| deal.active).cloned().collect::<Vec<_>>();
        deals.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        Ok(deals)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::snapshot;
    use super::{CatalogLookup, DealLookup};
    use crate::domain::deal::DealId;
    use crate::domain::menu::MenuItemId;

    #[test]
    fn menu_sections_follow_position_and_hide_unorderable_entries() {
        let sections = snapshot().menu_by_category();

        let names =
            sections.iter().map(|section| section.category.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Fast Food", "Pizza"]);

        let fast_food =
            sections[0].items.iter().map(|item| item.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(fast_food, vec!["101", "102"]);
    }

    #[test]
    fn lookups_distinguish_found_and_missing() {
        let menu = snapshot();

        assert!(menu.menu_item(&MenuItemId("101".to_string())).expect("lookup").is_some());
        assert!(menu.menu_item(&MenuItemId("999".to_string())).expect("lookup").is_none());
        assert!(menu.deal(&DealId("d02".to_string())).expect("lookup").is_some());

        let active = menu.active_deals().expect("active deals");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, DealId("d01".to_string()));
    }
}

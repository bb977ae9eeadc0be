use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use tableside_core::domain::deal::{Deal, DealId};
use tableside_core::domain::menu::{Category, CategoryId, MenuItem, MenuItemId};
use tableside_core::domain::order::{Order, OrderDraft, OrderId, OrderStatus, PaymentMethod};
use tableside_core::errors::DomainError;

use super::{
    new_order_id, DealRepository, MenuRepository, OrderRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryMenuRepository {
    categories: RwLock<HashMap<String, Category>>,
    items: RwLock<HashMap<String, MenuItem>>,
}

#[async_trait::async_trait]
impl MenuRepository for InMemoryMenuRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        let mut listed = categories.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(listed)
    }

    async fn save_category(&self, category: Category) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write().await;
        categories.insert(category.id.0.clone(), category);
        Ok(())
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        let items = self.items.read().await;
        let remaining = items.values().filter(|item| &item.category == id).count();
        if remaining > 0 {
            return Err(RepositoryError::Conflict(format!(
                "category `{}` still has {remaining} item(s)",
                id.0
            )));
        }

        let mut categories = self.categories.write().await;
        categories
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("category `{}`", id.0)))
    }

    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let items = self.items.read().await;
        let mut listed = items.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(listed)
    }

    async fn find_item(&self, id: &MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.get(&id.0).cloned())
    }

    async fn save_item(&self, item: MenuItem) -> Result<(), RepositoryError> {
        if !self.categories.read().await.contains_key(&item.category.0) {
            return Err(RepositoryError::NotFound(format!("category `{}`", item.category.0)));
        }

        let mut items = self.items.write().await;
        items.insert(item.id.0.clone(), item);
        Ok(())
    }

    async fn delete_item(&self, id: &MenuItemId) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        items
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("menu item `{}`", id.0)))
    }
}

#[derive(Default)]
pub struct InMemoryDealRepository {
    deals: RwLock<HashMap<String, Deal>>,
}

#[async_trait::async_trait]
impl DealRepository for InMemoryDealRepository {
    async fn find(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError> {
        let deals = self.deals.read().await;
        Ok(deals.get(&id.0).cloned())
    }

    async fn list(&self) -> Result<Vec<Deal>, RepositoryError> {
        let deals = self.deals.read().await;
        let mut listed = deals.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(listed)
    }

    async fn save(&self, deal: Deal) -> Result<(), RepositoryError> {
        let mut deals = self.deals.write().await;
        deals.insert(deal.id.0.clone(), deal);
        Ok(())
    }

    async fn delete(&self, id: &DealId) -> Result<(), RepositoryError> {
        let mut deals = self.deals.write().await;
        deals
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("deal `{}`", id.0)))
    }
}

/// Orders kept in insertion order; listing reverses it.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        if draft.items.is_empty() {
            return Err(DomainError::InvariantViolation(
                "order must contain at least one line".to_string(),
            )
            .into());
        }

        let order = Order::from_draft(new_order_id(), draft, Utc::now());
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|order| &order.id == id).cloned())
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .rev()
            .filter(|order| status.map_or(true, |status| order.status == status))
            .cloned()
            .collect())
    }

    async fn mark_paid(
        &self,
        id: &OrderId,
        method: PaymentMethod,
    ) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("order `{}`", id.0)))?;

        order.mark_paid(method, Utc::now())?;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use tableside_core::cart::Cart;
    use tableside_core::domain::deal::{Deal, DealId};
    use tableside_core::domain::menu::{Category, CategoryId, LocalizedText, MenuItem, MenuItemId};
    use tableside_core::domain::order::{OrderStatus, PaymentMethod, TableId};

    use crate::repositories::{
        DealRepository, InMemoryDealRepository, InMemoryMenuRepository, InMemoryOrderRepository,
        MenuRepository, OrderRepository, RepositoryError,
    };

    fn tea() -> Category {
        Category {
            id: CategoryId("tea".to_string()),
            name: "Tea".to_string(),
            active: true,
            position: 4,
        }
    }

    fn karak() -> MenuItem {
        MenuItem {
            id: MenuItemId("501".to_string()),
            category: CategoryId("tea".to_string()),
            name: LocalizedText::english("Karak Chai"),
            description: LocalizedText::english("Strong spiced tea"),
            price: Decimal::new(500, 2),
            available: true,
        }
    }

    #[tokio::test]
    async fn in_memory_menu_enforces_category_rules() {
        let repo = InMemoryMenuRepository::default();

        assert!(matches!(repo.save_item(karak()).await, Err(RepositoryError::NotFound(_))));

        repo.save_category(tea()).await.expect("category");
        repo.save_item(karak()).await.expect("item");
        assert_eq!(repo.find_item(&karak().id).await.expect("find"), Some(karak()));

        assert!(matches!(
            repo.delete_category(&tea().id).await,
            Err(RepositoryError::Conflict(_))
        ));
        repo.delete_item(&karak().id).await.expect("delete item");
        repo.delete_category(&tea().id).await.expect("delete category");
        assert!(repo.list_categories().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn in_memory_deal_repo_round_trip() {
        let repo = InMemoryDealRepository::default();
        let deal = Deal {
            id: DealId("d07".to_string()),
            name: LocalizedText::english("Chai Break"),
            description: LocalizedText::english("Two teas"),
            price: Decimal::new(900, 2),
            discount_percent: Decimal::ZERO,
            applicable_items: vec![MenuItemId("501".to_string()), MenuItemId("501".to_string())],
            active: true,
            position: 1,
        };

        repo.save(deal.clone()).await.expect("save deal");
        assert_eq!(repo.find(&deal.id).await.expect("find"), Some(deal.clone()));

        repo.delete(&deal.id).await.expect("delete");
        assert!(matches!(repo.delete(&deal.id).await, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn in_memory_orders_list_newest_first_and_pay_once() {
        let repo = InMemoryOrderRepository::default();
        let mut cart = Cart::new();
        cart.add("501", "Karak Chai", Decimal::new(500, 2), 2).expect("add");

        let first =
            repo.create(cart.to_order_draft(TableId(3)).expect("draft")).await.expect("first");
        let second =
            repo.create(cart.to_order_draft(TableId(4)).expect("draft")).await.expect("second");

        let listed = repo.list(None).await.expect("list");
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        repo.mark_paid(&first.id, PaymentMethod::DebitCard).await.expect("pay");
        assert!(matches!(
            repo.mark_paid(&first.id, PaymentMethod::Cash).await,
            Err(RepositoryError::Domain(_))
        ));

        let paid = repo.list(Some(OrderStatus::Paid)).await.expect("paid");
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].payment_method, Some(PaymentMethod::DebitCard));
    }
}

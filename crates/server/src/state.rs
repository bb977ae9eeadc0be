use std::collections::HashMap;
use std::sync::Arc;

use tableside_agent::{AgentRuntime, ChatSession};
use tableside_core::config::RestaurantConfig;
use tableside_core::{Cart, MenuSnapshot, TableId};
use tableside_db::load_menu_snapshot;
use tableside_db::repositories::{DealRepository, MenuRepository, OrderRepository};
use tokio::sync::Mutex;

use crate::error::ApiError;

/// Everything one table accumulates between customers.
#[derive(Debug)]
pub struct TableSession {
    pub cart: Cart,
    pub chat: ChatSession,
}

impl TableSession {
    fn new(table_id: TableId) -> Self {
        Self { cart: Cart::new(), chat: ChatSession::new(table_id) }
    }
}

/// Per-table sessions. Each table is locked independently, so a slow chat
/// call at one table never blocks another.
#[derive(Default)]
pub struct TableSessions {
    tables: Mutex<HashMap<TableId, Arc<Mutex<TableSession>>>>,
}

impl TableSessions {
    pub async fn get(&self, table_id: TableId) -> Arc<Mutex<TableSession>> {
        let mut tables = self.tables.lock().await;
        tables
            .entry(table_id)
            .or_insert_with(|| Arc::new(Mutex::new(TableSession::new(table_id))))
            .clone()
    }

    /// Drops the table's cart and chat history. Returns whether a session existed.
    pub async fn reset(&self, table_id: TableId) -> bool {
        self.tables.lock().await.remove(&table_id).is_some()
    }

    pub async fn active_tables(&self) -> usize {
        self.tables.lock().await.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub menu: Arc<dyn MenuRepository>,
    pub deals: Arc<dyn DealRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub sessions: Arc<TableSessions>,
    pub agent: AgentRuntime,
    pub restaurant: Arc<RestaurantConfig>,
}

impl AppState {
    pub async fn snapshot(&self) -> Result<MenuSnapshot, ApiError> {
        Ok(load_menu_snapshot(self.menu.as_ref(), self.deals.as_ref()).await?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tableside_core::TableId;

    use super::TableSessions;

    #[tokio::test]
    async fn tables_keep_independent_carts() {
        let sessions = TableSessions::default();

        {
            let table = sessions.get(TableId(1)).await;
            let mut session = table.lock().await;
            session.cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 1).expect("add");
        }

        let other = sessions.get(TableId(2)).await;
        assert!(other.lock().await.cart.is_empty());

        let same = sessions.get(TableId(1)).await;
        assert_eq!(same.lock().await.cart.len(), 1);
        assert_eq!(sessions.active_tables().await, 2);
    }

    #[tokio::test]
    async fn reset_starts_a_fresh_session() {
        let sessions = TableSessions::default();
        {
            let table = sessions.get(TableId(3)).await;
            let mut session = table.lock().await;
            session.cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 1).expect("add");
            session.chat.push_user("hello");
        }

        assert!(sessions.reset(TableId(3)).await);
        assert!(!sessions.reset(TableId(3)).await);

        let table = sessions.get(TableId(3)).await;
        let session = table.lock().await;
        assert!(session.cart.is_empty());
        assert!(session.chat.history().is_empty());
    }
}

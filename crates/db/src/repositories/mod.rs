use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use tableside_core::domain::deal::{Deal, DealId};
use tableside_core::domain::menu::{Category, CategoryId, MenuItem, MenuItemId};
use tableside_core::domain::order::{Order, OrderDraft, OrderId, OrderStatus, PaymentMethod};
use tableside_core::errors::{ApplicationError, DomainError};

pub mod deal;
pub mod memory;
pub mod menu;
pub mod order;

pub use deal::SqlDealRepository;
pub use memory::{InMemoryDealRepository, InMemoryMenuRepository, InMemoryOrderRepository};
pub use menu::SqlMenuRepository;
pub use order::SqlOrderRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(message) => Self::NotFound(message),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            RepositoryError::Domain(error) => Self::Domain(error),
            RepositoryError::Database(error) => Self::Persistence(error.to_string()),
            RepositoryError::Decode(message) => Self::Persistence(message),
        }
    }
}

/// Menu categories and items, the catalog the cart resolves against.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn save_category(&self, category: Category) -> Result<(), RepositoryError>;
    /// Fails with `Conflict` while items still belong to the category.
    async fn delete_category(&self, id: &CategoryId) -> Result<(), RepositoryError>;

    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError>;
    async fn find_item(&self, id: &MenuItemId) -> Result<Option<MenuItem>, RepositoryError>;
    /// Upserts; the item's category must already exist.
    async fn save_item(&self, item: MenuItem) -> Result<(), RepositoryError>;
    async fn delete_item(&self, id: &MenuItemId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait DealRepository: Send + Sync {
    async fn find(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Deal>, RepositoryError>;
    async fn save(&self, deal: Deal) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &DealId) -> Result<(), RepositoryError>;
}

/// Order store. Orders are created `Pending` and only ever move to `Paid`.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError>;
    async fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;
    /// Newest first.
    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError>;
    async fn mark_paid(
        &self,
        id: &OrderId,
        method: PaymentMethod,
    ) -> Result<Order, RepositoryError>;
}

/// `ORD-` followed by eight uppercase hex characters.
pub fn new_order_id() -> OrderId {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    OrderId(format!("ORD-{}", simple[..8].to_ascii_uppercase()))
}

pub(crate) fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("{column} `{raw}`: {error}")))
}

pub(crate) fn decode_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub mod cart;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use cart::{Cart, LineItem};
pub use catalog::{CatalogLookup, CatalogUnavailable, DealLookup, MenuSection, MenuSnapshot};
pub use domain::deal::{Deal, DealId, BUNDLE_PREFIX};
pub use domain::menu::{Category, CategoryId, Language, LocalizedText, MenuItem, MenuItemId};
pub use domain::order::{Order, OrderDraft, OrderId, OrderStatus, PaymentMethod, TableId};
pub use errors::{ApplicationError, DomainError, InterfaceError};

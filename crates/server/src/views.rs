//! JSON shapes returned by the API. Money is rendered with two decimals.

use rust_decimal::Decimal;
use serde::Serialize;
use tableside_agent::{ApplyOutcome, CustomerTurn};
use tableside_core::pricing::{list_price, round_money};
use tableside_core::{Cart, Deal, LineItem, LocalizedText, MenuSection, MenuSnapshot, Order};

pub fn money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

#[derive(Debug, Serialize)]
pub struct MenuItemView {
    pub id: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: String,
}

#[derive(Debug, Serialize)]
pub struct MenuSectionView {
    pub category_id: String,
    pub category: String,
    pub items: Vec<MenuItemView>,
}

impl From<MenuSection> for MenuSectionView {
    fn from(section: MenuSection) -> Self {
        Self {
            category_id: section.category.id.0,
            category: section.category.name,
            items: section
                .items
                .into_iter()
                .map(|item| MenuItemView {
                    id: item.id.0,
                    name: item.name,
                    description: item.description,
                    price: money(item.price),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenuView {
    pub restaurant: String,
    pub currency: String,
    pub sections: Vec<MenuSectionView>,
}

#[derive(Debug, Serialize)]
pub struct DealItemView {
    pub id: String,
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct DealView {
    pub id: String,
    pub line_id: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: String,
    pub list_price: String,
    pub discount_percent: String,
    pub items: Vec<DealItemView>,
}

impl DealView {
    /// Constituents missing from the snapshot are left out of the breakdown.
    pub fn new(deal: &Deal, snapshot: &MenuSnapshot) -> Self {
        let items = deal
            .constituent_counts()
            .into_iter()
            .filter_map(|(id, count)| {
                snapshot.find_item(&id).map(|item| DealItemView {
                    id: id.0.clone(),
                    name: item.display_name().to_string(),
                    count,
                })
            })
            .collect();

        Self {
            id: deal.id.0.clone(),
            line_id: deal.id.line_id(),
            name: deal.name.clone(),
            description: deal.description.clone(),
            price: money(deal.price),
            list_price: money(list_price(deal.price, deal.discount_percent)),
            discount_percent: deal.discount_percent.normalize().to_string(),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineView {
    pub id: String,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub bundle: bool,
}

impl From<&LineItem> for LineView {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.id.clone(),
            name: line.display_name.clone(),
            unit_price: money(line.unit_price),
            quantity: line.quantity,
            line_total: money(line.line_total()),
            bundle: line.is_bundle(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub table_id: u32,
    pub items: Vec<LineView>,
    pub total: String,
    pub version: u64,
}

impl CartView {
    pub fn new(table_id: u32, cart: &Cart) -> Self {
        Self {
            table_id,
            items: cart.items().iter().map(LineView::from).collect(),
            total: money(cart.total()),
            version: cart.version(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeView {
    Added { line_id: String, name: String, added: u32, quantity: u32 },
    Ignored { reason: &'static str },
}

impl From<&ApplyOutcome> for OutcomeView {
    fn from(outcome: &ApplyOutcome) -> Self {
        match outcome {
            ApplyOutcome::Added { line_id, name, added, quantity } => Self::Added {
                line_id: line_id.clone(),
                name: name.clone(),
                added: *added,
                quantity: *quantity,
            },
            ApplyOutcome::Ignored(reason) => Self::Ignored { reason: reason.as_str() },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatView {
    pub reply: String,
    pub source: &'static str,
    pub outcomes: Vec<OutcomeView>,
    pub confirmation: Option<String>,
    pub cart: CartView,
}

impl ChatView {
    pub fn new(turn: &CustomerTurn, cart: CartView) -> Self {
        Self {
            reply: turn.reply.clone(),
            source: turn.source.as_str(),
            outcomes: turn.outcomes.iter().map(OutcomeView::from).collect(),
            confirmation: turn.confirmation.clone(),
            cart,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: String,
    pub table_id: u32,
    pub items: Vec<LineView>,
    pub total: String,
    pub status: &'static str,
    pub payment_method: Option<&'static str>,
    pub created_at: String,
    pub paid_at: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.0.clone(),
            table_id: order.table_id.0,
            items: order.items.iter().map(LineView::from).collect(),
            total: money(order.total),
            status: order.status.as_str(),
            payment_method: order.payment_method.map(|method| method.label()),
            created_at: order.created_at.to_rfc3339(),
            paid_at: order.paid_at.map(|at| at.to_rfc3339()),
        }
    }
}

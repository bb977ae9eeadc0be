use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::menu::{LocalizedText, MenuItemId};

/// Cart line ids for bundles carry this prefix so they never collide with menu item ids.
pub const BUNDLE_PREFIX: &str = "deal_";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DealId(pub String);

impl DealId {
    pub fn line_id(&self) -> String {
        format!("{BUNDLE_PREFIX}{}", self.0)
    }

    /// Accepts either a bare deal id or a prefixed cart line id.
    pub fn from_reference(reference: &str) -> Self {
        let trimmed = reference.trim();
        Self(trimmed.strip_prefix(BUNDLE_PREFIX).unwrap_or(trimmed).to_string())
    }
}

pub fn is_bundle_line(line_id: &str) -> bool {
    line_id.starts_with(BUNDLE_PREFIX)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: Decimal,
    pub discount_percent: Decimal,
    pub applicable_items: Vec<MenuItemId>,
    pub active: bool,
    pub position: u32,
}

impl Deal {
    pub fn display_name(&self) -> &str {
        self.name.label_or("Deal")
    }

    /// Distinct constituents with their multiplicity, in first-appearance order.
    pub fn constituent_counts(&self) -> Vec<(MenuItemId, u32)> {
        let mut counts: Vec<(MenuItemId, u32)> = Vec::new();
        for item_id in &self.applicable_items {
            match counts.iter_mut().find(|(id, _)| id == item_id) {
                Some((_, count)) => *count += 1,
                None => counts.push((item_id.clone(), 1)),
            }
        }
        counts
    }
}

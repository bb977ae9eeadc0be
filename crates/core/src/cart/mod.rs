//! The order-in-progress for a single table session.
//!
//! A [`Cart`] keeps at most one [`LineItem`] per id, in insertion order, and
//! never holds a line with quantity zero. Prices are fixed-point decimals so
//! totals are exact to the cent regardless of how many add/remove cycles run.
//! Unit prices are capped at [`MAX_UNIT_PRICE`] and every mutation checks that the cart
//! total still fits in a `Decimal`, so totals never overflow.

pub mod receipt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogLookup, CatalogUnavailable, DealLookup};
use crate::domain::deal::is_bundle_line;
use crate::domain::order::{OrderDraft, TableId};
use crate::errors::DomainError;
use crate::pricing::{round_money, MAX_UNIT_PRICE};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub display_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    /// Saturates for lines built outside a [`Cart`]; cart lines always fit.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    pub fn is_bundle(&self) -> bool {
        is_bundle_line(&self.id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
    version: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bumped on every mutation so display layers can tell stale widgets apart.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Adds `quantity` of `id`, merging into an existing line when present, and returns the
    /// line's resulting quantity. The price is only taken when the line is first created.
    pub fn add(
        &mut self,
        id: &str,
        display_name: &str,
        unit_price: Decimal,
        quantity: u32,
    ) -> Result<u32, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(0));
        }
        if unit_price < Decimal::ZERO || unit_price > MAX_UNIT_PRICE {
            return Err(DomainError::InvalidPrice(unit_price.to_string()));
        }

        let existing = self.items.iter().position(|item| item.id == id);
        let (line_price, resulting) = match existing {
            Some(index) => {
                let line = &self.items[index];
                (line.unit_price, line.quantity.saturating_add(quantity))
            }
            None => (round_money(unit_price), quantity),
        };
        if self.total_with(existing, line_price, resulting).is_none() {
            return Err(DomainError::InvalidQuantity(i64::from(quantity)));
        }

        self.version += 1;
        match existing {
            Some(index) => self.items[index].quantity = resulting,
            None => self.items.push(LineItem {
                id: id.to_string(),
                display_name: display_name.to_string(),
                unit_price: line_price,
                quantity,
            }),
        }
        Ok(resulting)
    }

    /// Sets the quantity of an existing line. Zero removes the line; unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> Result<(), DomainError> {
        if quantity < 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        let quantity =
            u32::try_from(quantity).map_err(|_| DomainError::InvalidQuantity(quantity))?;

        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return Ok(());
        };

        if quantity == 0 {
            self.items.remove(index);
        } else {
            let unit_price = self.items[index].unit_price;
            if self.total_with(Some(index), unit_price, quantity).is_none() {
                return Err(DomainError::InvalidQuantity(i64::from(quantity)));
            }
            self.items[index].quantity = quantity;
        }
        self.version += 1;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() != before {
            self.version += 1;
        }
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Cart total with the line at `replaced` (or a new line) priced at `unit_price` ×
    /// `quantity`, or `None` when it would not fit in a `Decimal`.
    fn total_with(
        &self,
        replaced: Option<usize>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Option<Decimal> {
        let candidate = unit_price.checked_mul(Decimal::from(quantity))?;
        self.items
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != replaced)
            .try_fold(candidate, |total, (_, item)| {
                total.checked_add(item.unit_price.checked_mul(Decimal::from(item.quantity))?)
            })
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.version = 0;
    }

    pub fn render_receipt<C, D>(&self, catalog: &C, deals: &D) -> Result<String, CatalogUnavailable>
    where
        C: CatalogLookup + ?Sized,
        D: DealLookup + ?Sized,
    {
        receipt::render_receipt(self, catalog, deals)
    }

    /// Snapshot of the cart for hand-off to the order store.
    pub fn to_order_draft(&self, table_id: TableId) -> Result<OrderDraft, DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::InvariantViolation("cart is empty".to_string()));
        }

        Ok(OrderDraft { table_id, items: self.items.clone(), total: self.total() })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Cart, LineItem};
    use crate::domain::order::TableId;
    use crate::pricing::MAX_UNIT_PRICE;
    use crate::errors::DomainError;

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = Cart::new();
        let quantities = [1_u32, 3, 2, 5];

        let mut last = 0;
        for quantity in quantities {
            last = cart
                .add("101", "Classic Burger", Decimal::new(2_500, 2), quantity)
                .expect("valid add");
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(last, 11);
        assert_eq!(cart.get("101").map(|item| item.quantity), Some(11));
    }

    #[test]
    fn readding_keeps_the_original_price_and_name() {
        let mut cart = Cart::new();
        cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 1).expect("add");
        cart.add("101", "Renamed", Decimal::new(9_900, 2), 1).expect("re-add");

        let line = cart.get("101").expect("line");
        assert_eq!(line.display_name, "Classic Burger");
        assert_eq!(line.unit_price, Decimal::new(2_500, 2));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn unit_price_is_rounded_to_cents_on_insert() {
        let mut cart = Cart::new();
        cart.add("101", "Classic Burger", Decimal::new(12_345, 3), 1).expect("add");

        assert_eq!(cart.get("101").map(|item| item.unit_price), Some(Decimal::new(1_235, 2)));
    }

    #[test]
    fn zero_quantity_add_is_rejected_without_creating_a_line() {
        let mut cart = Cart::new();
        let error = cart.add("101", "Classic Burger", Decimal::ONE, 0).expect_err("zero quantity");

        assert_eq!(error, DomainError::InvalidQuantity(0));
        assert!(cart.is_empty());
        assert_eq!(cart.version(), 0);
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut cart = Cart::new();
        let error = cart.add("101", "Classic Burger", Decimal::new(-100, 2), 1).expect_err("price");

        assert!(matches!(error, DomainError::InvalidPrice(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn setting_quantity_to_zero_removes_the_line() {
        let mut cart = Cart::new();
        cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 1).expect("add");
        cart.set_quantity("101", 0).expect("set to zero");

        assert!(cart.get("101").is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn negative_quantity_is_rejected_and_unknown_ids_are_ignored() {
        let mut cart = Cart::new();
        cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 2).expect("add");

        assert_eq!(cart.set_quantity("101", -1), Err(DomainError::InvalidQuantity(-1)));
        assert_eq!(cart.get("101").map(|item| item.quantity), Some(2));

        let version = cart.version();
        cart.set_quantity("999", 4).expect("unknown id is a no-op");
        assert_eq!(cart.version(), version);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn set_quantity_replaces_rather_than_adds() {
        let mut cart = Cart::new();
        cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 2).expect("add");
        cart.set_quantity("101", 7).expect("set");

        assert_eq!(cart.get("101").map(|item| item.quantity), Some(7));
    }

    #[test]
    fn total_is_exact_decimal_sum() {
        let mut cart = Cart::new();
        cart.add("A", "Item A", Decimal::new(1_250, 2), 2).expect("add A");
        cart.add("B", "Item B", Decimal::new(500, 2), 3).expect("add B");

        assert_eq!(cart.total(), Decimal::new(4_000, 2));
    }

    #[test]
    fn oversized_price_is_rejected_and_total_stays_computable() {
        let mut cart = Cart::new();
        cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 1).expect("add");
        let gold = Decimal::from_i128_with_scale(10_i128.pow(20), 0);

        let error = cart.add("102", "Gold Burger", gold, 1_000_000_000).expect_err("price cap");

        assert!(matches!(error, DomainError::InvalidPrice(_)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.version(), 1);
        assert_eq!(cart.total(), Decimal::new(2_500, 2));
    }

    #[test]
    fn largest_price_and_quantity_still_total_exactly() {
        let mut cart = Cart::new();
        cart.add("101", "Banquet", MAX_UNIT_PRICE, 1).expect("add at the cap");
        cart.set_quantity("101", i64::from(u32::MAX)).expect("largest quantity");
        cart.add("101", "Banquet", MAX_UNIT_PRICE, 5).expect("saturating merge");
        cart.add("401", "Karak Chai", Decimal::new(500, 2), u32::MAX).expect("second line");

        let expected = MAX_UNIT_PRICE * Decimal::from(u32::MAX)
            + Decimal::new(500, 2) * Decimal::from(u32::MAX);
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.to_order_draft(TableId(1)).expect("draft").total, expected);
    }

    #[test]
    fn line_total_saturates_for_lines_built_by_hand() {
        let line = LineItem {
            id: "101".to_string(),
            display_name: "Classic Burger".to_string(),
            unit_price: Decimal::MAX,
            quantity: 3,
        };

        assert_eq!(line.line_total(), Decimal::MAX);
    }

    #[test]
    fn total_has_no_drift_across_add_remove_cycles() {
        let mut cart = Cart::new();
        cart.add("tea", "Karak Tea", Decimal::new(10, 2), 1).expect("anchor");
        for _ in 0..1_000 {
            cart.add("fries", "Loaded Fries", Decimal::new(20, 2), 1).expect("add");
            cart.remove("fries");
        }
        cart.add("tea", "Karak Tea", Decimal::new(10, 2), 2).expect("add more");

        assert_eq!(cart.total(), Decimal::new(30, 2));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut cart = Cart::new();
        for id in ["201", "101", "deal_d01", "301"] {
            cart.add(id, id, Decimal::ONE, 1).expect("add");
        }
        cart.add("101", "101", Decimal::ONE, 1).expect("merge");

        let ids = cart.items().iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["201", "101", "deal_d01", "301"]);
        assert!(cart.items()[2].is_bundle());
    }

    #[test]
    fn clear_empties_and_resets_version() {
        let mut cart = Cart::new();
        cart.add("101", "Classic Burger", Decimal::ONE, 1).expect("add");
        cart.remove("101");
        cart.remove("101");
        assert_eq!(cart.version(), 2);

        cart.add("101", "Classic Burger", Decimal::ONE, 1).expect("add");
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.version(), 0);
    }

    #[test]
    fn order_draft_requires_items() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.to_order_draft(TableId(3)),
            Err(DomainError::InvariantViolation(_))
        ));

        cart.add("101", "Classic Burger", Decimal::new(2_500, 2), 2).expect("add");
        let draft = cart.to_order_draft(TableId(3)).expect("draft");
        assert_eq!(draft.table_id, TableId(3));
        assert_eq!(draft.total, Decimal::new(5_000, 2));
        assert_eq!(draft.items, cart.items().to_vec());
    }
}

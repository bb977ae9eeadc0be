use rust_decimal::{Decimal, RoundingStrategy};

use crate::catalog::{CatalogLookup, CatalogUnavailable};
use crate::domain::deal::Deal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Highest unit price the cart and the staff editor accept. Keeps every line total and cart
/// total far inside `Decimal`'s range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Money values are held at two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Bundle price after applying `discount_percent` (clamped to 0..=100) to the constituents' total.
pub fn bundle_price(items_total: Decimal, discount_percent: Decimal) -> Decimal {
    let discount = discount_percent.clamp(Decimal::ZERO, HUNDRED);
    round_money(items_total * ((HUNDRED - discount) / HUNDRED))
}

/// Pre-discount price shown next to a bundle. A fully discounted bundle has no meaningful list
/// price, so its own price is returned.
pub fn list_price(price: Decimal, discount_percent: Decimal) -> Decimal {
    if discount_percent <= Decimal::ZERO || discount_percent >= HUNDRED {
        return price;
    }
    price
        .checked_mul(HUNDRED)
        .and_then(|scaled| scaled.checked_div(HUNDRED - discount_percent))
        .map(round_money)
        .unwrap_or(price)
}

/// Sum of the current catalog prices of every constituent, counting repeats.
/// Constituents missing from the catalog contribute nothing. Saturates at `Decimal::MAX`
/// rather than overflowing.
pub fn constituents_total<C>(deal: &Deal, catalog: &C) -> Result<Decimal, CatalogUnavailable>
where
    C: CatalogLookup + ?Sized,
{
    let mut total = Decimal::ZERO;
    for (item_id, count) in deal.constituent_counts() {
        if let Some(item) = catalog.menu_item(&item_id)? {
            total = total.saturating_add(item.price.saturating_mul(Decimal::from(count)));
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{bundle_price, constituents_total, list_price, round_money, MAX_UNIT_PRICE};
    use crate::catalog::fixtures::{item, snapshot};
    use crate::catalog::MenuSnapshot;
    use crate::domain::deal::{Deal, DealId};
    use crate::domain::menu::{LocalizedText, MenuItemId};

    #[test]
    fn bundle_price_applies_discount_and_rounds_to_cents() {
        assert_eq!(bundle_price(Decimal::new(9_500, 2), Decimal::from(10)), Decimal::new(8_550, 2));
        assert_eq!(bundle_price(Decimal::new(1_999, 2), Decimal::from(15)), Decimal::new(1_699, 2));
        assert_eq!(bundle_price(Decimal::new(1_000, 2), Decimal::from(150)), Decimal::ZERO);
    }

    #[test]
    fn list_price_reverses_discount() {
        assert_eq!(list_price(Decimal::new(9_000, 2), Decimal::from(10)), Decimal::new(10_000, 2));
        assert_eq!(list_price(Decimal::new(9_000, 2), Decimal::ZERO), Decimal::new(9_000, 2));
        assert_eq!(list_price(Decimal::new(9_000, 2), Decimal::from(100)), Decimal::new(9_000, 2));
    }

    #[test]
    fn constituents_total_counts_repeated_items() {
        let menu = snapshot();
        let deal = menu.find_deal(&DealId("d01".to_string())).expect("fixture deal");

        let total = constituents_total(deal, &menu).expect("lookup");
        assert_eq!(total, Decimal::new(9_500, 2));
    }

    #[test]
    fn constituents_total_saturates_instead_of_overflowing() {
        let mut burger = item("101", "fast-food", "Gold Burger", 0, true);
        burger.price = Decimal::MAX;
        let deal = Deal {
            id: DealId("gold".to_string()),
            name: LocalizedText::english("Gold Feast"),
            description: LocalizedText::default(),
            price: Decimal::ZERO,
            discount_percent: Decimal::from(10),
            applicable_items: vec![MenuItemId("101".to_string()); 3],
            active: true,
            position: 1,
        };
        let menu = MenuSnapshot::new(Vec::new(), vec![burger], vec![deal.clone()]);

        let total = constituents_total(&deal, &menu).expect("lookup");

        assert_eq!(total, Decimal::MAX);
        assert!(bundle_price(total, deal.discount_percent) > MAX_UNIT_PRICE);
    }

    #[test]
    fn list_price_falls_back_when_scaling_overflows() {
        assert_eq!(list_price(Decimal::MAX, Decimal::from(50)), Decimal::MAX);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12_345, 3)), Decimal::new(1_235, 2));
    }
}

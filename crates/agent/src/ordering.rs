//! Turns extracted instructions into cart mutations.
//!
//! Resolution never fails on bad assistant output: anything that does not
//! name an orderable item or an active deal comes back as
//! [`ApplyOutcome::Ignored`]. Only an unreachable catalog is an error.

use rust_decimal::Decimal;
use tableside_core::cart::Cart;
use tableside_core::catalog::{CatalogLookup, CatalogUnavailable, DealLookup};
use tableside_core::domain::deal::DealId;
use tableside_core::domain::menu::MenuItemId;
use tracing::{info, warn};

use crate::extractor::{extract, ExtractedInstruction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    ZeroQuantity,
    UnavailableItem,
    InactiveDeal,
    NotFound,
    /// The catalog entry itself was unusable, e.g. a negative price.
    InvalidEntry,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroQuantity => "zero_quantity",
            Self::UnavailableItem => "unavailable_item",
            Self::InactiveDeal => "inactive_deal",
            Self::NotFound => "not_found",
            Self::InvalidEntry => "invalid_entry",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Added {
        line_id: String,
        name: String,
        /// Quantity requested by this instruction.
        added: u32,
        /// Quantity on the cart line after the merge.
        quantity: u32,
    },
    Ignored(IgnoreReason),
}

impl ApplyOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

/// Result of applying one assistant response to a cart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderTurn {
    pub cleaned_text: String,
    pub outcomes: Vec<ApplyOutcome>,
    pub malformed_tags: usize,
}

impl OrderTurn {
    /// `"2x Classic Burger, 1x Family Feast"`, or `None` when nothing was added.
    pub fn added_summary(&self) -> Option<String> {
        let added = self
            .outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ApplyOutcome::Added { name, added, .. } => Some(format!("{added}x {name}")),
                ApplyOutcome::Ignored(_) => None,
            })
            .collect::<Vec<_>>();

        (!added.is_empty()).then(|| added.join(", "))
    }
}

/// Resolves `instruction` against the catalog first and the deal store second, and adds the
/// result to `cart`. The cart is untouched unless the outcome is `Added`.
pub fn resolve_and_apply<C, D>(
    instruction: &ExtractedInstruction,
    catalog: &C,
    deals: &D,
    cart: &mut Cart,
) -> Result<ApplyOutcome, CatalogUnavailable>
where
    C: CatalogLookup + ?Sized,
    D: DealLookup + ?Sized,
{
    if instruction.quantity == 0 {
        return Ok(ignored(instruction, IgnoreReason::ZeroQuantity));
    }

    let mut unavailable_item = false;
    if let Some(item) = catalog.menu_item(&MenuItemId(instruction.raw_id.clone()))? {
        if item.available {
            let name = item.display_name().to_string();
            return Ok(add_line(cart, instruction, &item.id.0, name, item.price));
        }
        unavailable_item = true;
    }

    match deals.deal(&DealId::from_reference(&instruction.raw_id))? {
        Some(deal) if deal.active => {
            let name = deal.display_name().to_string();
            Ok(add_line(cart, instruction, &deal.id.line_id(), name, deal.price))
        }
        _ if unavailable_item => Ok(ignored(instruction, IgnoreReason::UnavailableItem)),
        Some(_) => Ok(ignored(instruction, IgnoreReason::InactiveDeal)),
        None => Ok(ignored(instruction, IgnoreReason::NotFound)),
    }
}

/// Extracts every tag from `text` and applies them to `cart` in the order they appear.
pub fn apply_response<C, D>(
    text: &str,
    catalog: &C,
    deals: &D,
    cart: &mut Cart,
) -> Result<OrderTurn, CatalogUnavailable>
where
    C: CatalogLookup + ?Sized,
    D: DealLookup + ?Sized,
{
    let extraction = extract(text);
    let mut outcomes = Vec::with_capacity(extraction.instructions.len());
    for instruction in &extraction.instructions {
        outcomes.push(resolve_and_apply(instruction, catalog, deals, cart)?);
    }

    Ok(OrderTurn {
        cleaned_text: extraction.cleaned_text,
        outcomes,
        malformed_tags: extraction.malformed.len(),
    })
}

fn add_line(
    cart: &mut Cart,
    instruction: &ExtractedInstruction,
    line_id: &str,
    name: String,
    unit_price: Decimal,
) -> ApplyOutcome {
    match cart.add(line_id, &name, unit_price, instruction.quantity) {
        Ok(quantity) => {
            info!(
                event_name = "ordering.instruction.applied",
                line_id,
                added = instruction.quantity,
                quantity,
                "order instruction applied to cart"
            );
            ApplyOutcome::Added {
                line_id: line_id.to_string(),
                name,
                added: instruction.quantity,
                quantity,
            }
        }
        Err(error) => {
            warn!(
                event_name = "ordering.instruction.rejected",
                line_id,
                error = %error,
                "catalog entry rejected by cart"
            );
            ApplyOutcome::Ignored(IgnoreReason::InvalidEntry)
        }
    }
}

fn ignored(instruction: &ExtractedInstruction, reason: IgnoreReason) -> ApplyOutcome {
    info!(
        event_name = "ordering.instruction.ignored",
        raw_id = %instruction.raw_id,
        quantity = instruction.quantity,
        reason = reason.as_str(),
        "order instruction ignored"
    );
    ApplyOutcome::Ignored(reason)
}


#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tableside_core::cart::Cart;
    use tableside_core::catalog::{CatalogLookup, CatalogUnavailable, DealLookup};
    use tableside_core::domain::deal::{Deal, DealId};
    use tableside_core::domain::menu::{MenuItem, MenuItemId};

    use super::fixtures::menu;
    use super::{apply_response, resolve_and_apply, ApplyOutcome, IgnoreReason};
    use crate::extractor::ExtractedInstruction;

    fn instruction(raw_id: &str, quantity: u32) -> ExtractedInstruction {
        ExtractedInstruction { raw_id: raw_id.to_string(), quantity }
    }

    struct DownCatalog;

    impl CatalogLookup for DownCatalog {
        fn menu_item(&self, _id: &MenuItemId) -> Result<Option<MenuItem>, CatalogUnavailable> {
            Err(CatalogUnavailable::new("database is locked"))
        }
    }

    impl DealLookup for DownCatalog {
        fn deal(&self, _id: &DealId) -> Result<Option<Deal>, CatalogUnavailable> {
            Err(CatalogUnavailable::new("database is locked"))
        }

        fn active_deals(&self) -> Result<Vec<Deal>, CatalogUnavailable> {
            Err(CatalogUnavailable::new("database is locked"))
        }
    }

    #[test]
    fn available_item_is_added_with_catalog_name_and_price() {
        let menu = menu();
        let mut cart = Cart::new();

        let outcome =
            resolve_and_apply(&instruction("101", 2), &menu, &menu, &mut cart).expect("lookup");

        assert_eq!(
            outcome,
            ApplyOutcome::Added {
                line_id: "101".to_string(),
                name: "Classic Burger".to_string(),
                added: 2,
                quantity: 2,
            }
        );
        assert_eq!(cart.get("101").map(|line| line.unit_price), Some(Decimal::new(2_500, 2)));
    }

    #[test]
    fn unavailable_item_is_ignored_and_cart_unchanged() {
        let menu = menu();
        let mut cart = Cart::new();

        let outcome =
            resolve_and_apply(&instruction("103", 1), &menu, &menu, &mut cart).expect("lookup");

        assert_eq!(outcome, ApplyOutcome::Ignored(IgnoreReason::UnavailableItem));
        assert!(cart.is_empty());
        assert_eq!(cart.version(), 0);
    }

    #[test]
    fn deal_uses_its_own_price_not_the_constituent_sum() {
        let menu = menu();
        let mut cart = Cart::new();

        let outcome = resolve_and_apply(&instruction("deal_d01", 1), &menu, &menu, &mut cart)
            .expect("lookup");

        assert!(outcome.is_added());
        let line = cart.get("deal_d01").expect("bundle line");
        assert_eq!(line.unit_price, Decimal::new(6_000, 2));
        assert_eq!(line.display_name, "Family Feast");
    }

    #[test]
    fn bare_deal_id_resolves_to_the_prefixed_line() {
        let menu = menu();
        let mut cart = Cart::new();

        resolve_and_apply(&instruction("d01", 1), &menu, &menu, &mut cart).expect("lookup");
        resolve_and_apply(&instruction("deal_d01", 2), &menu, &menu, &mut cart).expect("lookup");

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("deal_d01").map(|line| line.quantity), Some(3));
    }

    #[test]
    fn inactive_deal_unknown_id_and_zero_quantity_are_ignored() {
        let menu = menu();
        let mut cart = Cart::new();

        let cases = [
            (instruction("deal_d02", 1), IgnoreReason::InactiveDeal),
            (instruction("999", 1), IgnoreReason::NotFound),
            (instruction("deal_missing", 1), IgnoreReason::NotFound),
            (instruction("101", 0), IgnoreReason::ZeroQuantity),
        ];
        for (instruction, reason) in cases {
            let outcome =
                resolve_and_apply(&instruction, &menu, &menu, &mut cart).expect("lookup");
            assert_eq!(outcome, ApplyOutcome::Ignored(reason), "{instruction:?}");
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn catalog_outage_propagates_instead_of_ignoring() {
        let mut cart = Cart::new();
        let result =
            resolve_and_apply(&instruction("101", 1), &DownCatalog, &DownCatalog, &mut cart);

        assert_eq!(result, Err(CatalogUnavailable::new("database is locked")));
        assert!(cart.is_empty());
    }

    #[test]
    fn response_tags_apply_in_order_and_text_is_cleaned() {
        let menu = menu();
        let mut cart = Cart::new();

        let turn = apply_response(
            "[ORDER: 102, 1] Done! [ORDER: 101, 2] [ORDER: 103, 1] [ORDER: oops]",
            &menu,
            &menu,
            &mut cart,
        )
        .expect("lookup");

        assert_eq!(turn.cleaned_text, "Done!");
        assert_eq!(turn.malformed_tags, 1);
        assert_eq!(turn.outcomes.len(), 3);
        assert_eq!(turn.added_summary().as_deref(), Some("1x Crispy Chicken, 2x Classic Burger"));

        let ids = cart.items().iter().map(|line| line.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["102", "101"]);
        assert_eq!(cart.total(), Decimal::new(7_200, 2));
    }

    #[test]
    fn response_without_resolvable_tags_has_no_summary() {
        let menu = menu();
        let mut cart = Cart::new();

        let turn =
            apply_response("Sorry, that is sold out [ORDER: 103, 1]", &menu, &menu, &mut cart)
                .expect("lookup");

        assert_eq!(turn.cleaned_text, "Sorry, that is sold out");
        assert_eq!(turn.added_summary(), None);
        assert!(cart.is_empty());
    }
}

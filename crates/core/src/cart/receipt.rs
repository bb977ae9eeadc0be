use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::cart::{Cart, LineItem};
use crate::catalog::{CatalogLookup, CatalogUnavailable, DealLookup};
use crate::domain::deal::DealId;
use crate::domain::order::Order;
use crate::pricing::round_money;

const NAME_WIDTH: usize = 18;
const QTY_WIDTH: usize = 4;
const PRICE_WIDTH: usize = 10;
// "name qty price" plus the single-space margins inside the frame.
const INNER_WIDTH: usize = NAME_WIDTH + QTY_WIDTH + PRICE_WIDTH + 4;
const BILL_RULE_WIDTH: usize = 30;

/// Renders the running bill for a cart as a fixed-width table.
///
/// Bundle lines are followed by one indented row per distinct constituent.
/// Names never wrap; they are cut at the column width. An empty cart renders
/// as an empty string.
pub fn render_receipt<C, D>(
    cart: &Cart,
    catalog: &C,
    deals: &D,
) -> Result<String, CatalogUnavailable>
where
    C: CatalogLookup + ?Sized,
    D: DealLookup + ?Sized,
{
    if cart.is_empty() {
        return Ok(String::new());
    }

    let mut out = String::new();
    frame_rule(&mut out, '╔', '═', '╗');
    centered_row(&mut out, "CURRENT BILL");
    frame_rule(&mut out, '╠', '═', '╣');
    row(&mut out, "Item", "Qty", "Price");
    frame_rule(&mut out, '╟', '─', '╢');

    for line in cart.items() {
        let name = truncate(&line.display_name, NAME_WIDTH);
        row(&mut out, &name, &line.quantity.to_string(), &money(line.line_total()));
        if line.is_bundle() {
            bundle_rows(&mut out, line, catalog, deals)?;
        }
    }

    frame_rule(&mut out, '╠', '═', '╣');
    row(&mut out, "TOTAL", "", &money(cart.total()));
    frame_rule(&mut out, '╚', '═', '╝');
    Ok(out)
}

/// Plain-text bill handed to the customer once an order is paid.
pub fn render_order_bill(order: &Order, restaurant_name: &str, currency: &str) -> String {
    let rule = "-".repeat(BILL_RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", restaurant_name.to_uppercase());
    let _ = writeln!(out, "Order #: {}", order.id.0);
    let _ = writeln!(out, "Table: {}", order.table_id);
    if let Some(method) = order.payment_method {
        let _ = writeln!(out, "Payment: {}", method.label());
    }
    let _ = writeln!(out, "{rule}");
    for line in &order.items {
        let _ = writeln!(
            out,
            "{:<width$} x{:>2} {:>8} {currency}",
            truncate(&line.display_name, NAME_WIDTH),
            line.quantity,
            money(line.line_total()),
            width = NAME_WIDTH,
        );
    }
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "TOTAL: {:>17} {currency}", money(order.total));
    out.push_str("Thank you for dining with us!");
    out
}

fn bundle_rows<C, D>(
    out: &mut String,
    line: &LineItem,
    catalog: &C,
    deals: &D,
) -> Result<(), CatalogUnavailable>
where
    C: CatalogLookup + ?Sized,
    D: DealLookup + ?Sized,
{
    // A deal deleted after it was added keeps its line but loses the breakdown.
    let Some(deal) = deals.deal(&DealId::from_reference(&line.id))? else {
        return Ok(());
    };

    for (item_id, count) in deal.constituent_counts() {
        if let Some(item) = catalog.menu_item(&item_id)? {
            let label = format!("  - {count}x {}", item.display_name());
            row(out, &truncate(&label, NAME_WIDTH), "", "");
        }
    }
    Ok(())
}

fn frame_rule(out: &mut String, left: char, fill: char, right: char) {
    out.push(left);
    out.extend(std::iter::repeat(fill).take(INNER_WIDTH));
    out.push(right);
    out.push('\n');
}

fn centered_row(out: &mut String, title: &str) {
    let _ = writeln!(out, "║{title:^width$}║", width = INNER_WIDTH);
}

fn row(out: &mut String, name: &str, qty: &str, price: &str) {
    let _ = writeln!(
        out,
        "║ {name:<nw$} {qty:>qw$} {price:>pw$} ║",
        nw = NAME_WIDTH,
        qw = QTY_WIDTH,
        pw = PRICE_WIDTH,
    );
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

//! System prompt and the canned replies used when the chat service is off or failing.

use std::fmt::Write as _;

use tableside_core::catalog::{CatalogUnavailable, DealLookup, MenuSnapshot};
use tableside_core::domain::order::TableId;
use tableside_core::pricing::round_money;

const MENU_KEYWORDS: [&str; 5] = ["menu", "food", "order", "eat", "hungry"];

pub const RATE_LIMITED_REPLY: &str = "I'm currently receiving too many requests. Please try \
     again in a moment, or use the Quick Menu to add items yourself.";

pub const UNAVAILABLE_REPLY: &str = "I apologize, but I'm having trouble processing your request \
     right now. Please use the Quick Menu to place your order.";

/// Instructions for the assistant, including the full orderable menu and the tag convention.
pub fn system_prompt(
    table_id: TableId,
    snapshot: &MenuSnapshot,
    currency: &str,
) -> Result<String, CatalogUnavailable> {
    let mut deals_text = String::new();
    for deal in snapshot.active_deals()? {
        let _ = writeln!(
            deals_text,
            "- {} (ID: {}) - {:.2} {currency}",
            deal.display_name(),
            deal.id.line_id(),
            round_money(deal.price)
        );
        let description = deal.description.en.trim();
        if !description.is_empty() {
            let _ = writeln!(deals_text, "  Description: {description}");
        }
    }

    let mut menu_text = String::new();
    for section in snapshot.menu_by_category() {
        let _ = writeln!(menu_text, "\n### {}:", section.category.name);
        for item in &section.items {
            let _ = write!(
                menu_text,
                "- {} (ID: {}) - {:.2} {currency}",
                item.display_name(),
                item.id.0,
                round_money(item.price)
            );
            let description = item.description.en.trim();
            if !description.is_empty() {
                let _ = write!(menu_text, " - {description}");
            }
            menu_text.push('\n');
        }
    }

    Ok(format!(
        "You are a warm, friendly restaurant assistant. The customer is at Table {table_id}.

LANGUAGE:
- The customer may write in English, Urdu (including Roman Urdu) or Arabic.
- Always answer in the language the customer used.

YOUR ROLE:
- Help the customer explore the menu and the deals, and suggest dishes.
- Take the order conversationally and confirm items before adding them.

ORDER TAGS:
- When the customer confirms they want an item or a deal, append a tag so the system can record it.
- Format: [ORDER: item_or_deal_id, quantity]
- Example for 2 Classic Burgers (ID: 101):
  \"Great! I've added 2 Burgers to your order. [ORDER: 101, 2]\"
- Example for 1 Family Feast deal (ID: deal_d01): \"Excellent choice! [ORDER: deal_d01, 1]\"
- Only use IDs listed below.
- Never mention the IDs in the visible text; the tag is hidden from the customer.

AVAILABLE DEALS:
{deals_text}
FULL MENU:
{menu_text}"
    ))
}

/// Reply used when no chat service is configured.
pub fn offline_reply(message: &str, table_id: TableId, snapshot: &MenuSnapshot) -> String {
    let lowered = message.to_lowercase();
    let asks_for_menu = MENU_KEYWORDS.iter().any(|keyword| lowered.contains(keyword));

    if asks_for_menu {
        let mut reply = String::from("**Our Menu Categories:**\n\n");
        for section in snapshot.menu_by_category() {
            let examples = section
                .items
                .iter()
                .take(3)
                .map(|item| item.display_name())
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(reply, "- **{}** - {examples}", section.category.name);
        }
        reply.push_str("\nPlease use the **Quick Menu** to browse items and place your order!");
        return reply;
    }

    format!(
        "Welcome! You are at **Table {table_id}**.\n\n\
         I'm currently in offline mode, but you can still order easily: use the **Quick Menu** \
         to browse and add items to your cart.\n\n\
         Our categories: {}",
        category_names(snapshot)
    )
}

/// First message shown when a table session opens.
pub fn welcome(table_id: TableId, snapshot: &MenuSnapshot) -> String {
    let mut reply = format!(
        "**Welcome!** So happy to have you here at **Table {table_id}**.\n\n\
         I'm your assistant and I'm here to help you pick something delicious.\n\n\
         **What are you in the mood for today?**\n\n"
    );
    for section in snapshot.menu_by_category() {
        let _ = writeln!(reply, "- **{}**", section.category.name);
    }
    reply.push_str("\nJust tell me what sounds good, or ask me anything!");
    reply
}

fn category_names(snapshot: &MenuSnapshot) -> String {
    snapshot
        .menu_by_category()
        .into_iter()
        .map(|section| section.category.name)
        .collect::<Vec<_>>()
        .join(", ")
}

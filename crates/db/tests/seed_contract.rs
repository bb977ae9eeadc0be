use std::collections::HashSet;

use rust_decimal::Decimal;
use tableside_core::cart::receipt::render_order_bill;
use tableside_core::cart::Cart;
use tableside_core::catalog::DealLookup;
use tableside_core::domain::deal::DealId;
use tableside_core::domain::menu::MenuItemId;
use tableside_core::domain::order::{OrderStatus, PaymentMethod, TableId};
use tableside_db::repositories::{
    OrderRepository, SqlDealRepository, SqlMenuRepository, SqlOrderRepository,
};
use tableside_db::{connect_with_settings, load_menu_snapshot, migrations, DemoMenu};

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
}

struct Store {
    menu: SqlMenuRepository,
    deals: SqlDealRepository,
    orders: SqlOrderRepository,
}

async fn seeded_store() -> SeedContractTestResult<Store> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;

    let store = Store {
        menu: SqlMenuRepository::new(pool.clone()),
        deals: SqlDealRepository::new(pool.clone()),
        orders: SqlOrderRepository::new(pool),
    };
    DemoMenu::seed(&store.menu, &store.deals).await.map_err(|error| format!("seed: {error}"))?;
    Ok(store)
}

#[tokio::test]
async fn seeded_menu_matches_demo_contract() -> SeedContractTestResult {
    let store = seeded_store().await?;
    let snapshot = load_menu_snapshot(&store.menu, &store.deals)
        .await
        .map_err(|error| format!("snapshot: {error}"))?;

    require_eq!(snapshot.categories().len(), 5);

    let mut seen = HashSet::new();
    for item in snapshot.items() {
        require!(seen.insert(item.id.clone()), "duplicate item id {}", item.id.0);
        require!(item.price > Decimal::ZERO, "item {} should have a positive price", item.id.0);
        require!(!item.name.en.is_empty(), "item {} should have an English name", item.id.0);
    }

    let sections = snapshot.menu_by_category();
    let listed = sections.iter().flat_map(|section| section.items.iter()).count();
    require_eq!(listed, snapshot.items().len() - 1);
    require!(
        sections.iter().all(|section| {
            section.items.iter().all(|item| item.id != MenuItemId("103".to_string()))
        }),
        "unavailable fries should not be listed"
    );

    let active = snapshot.active_deals().map_err(|error| error.to_string())?;
    require_eq!(active.len(), 2);
    for deal in &active {
        for id in &deal.applicable_items {
            require!(
                snapshot.find_item(id).is_some(),
                "deal {} references unknown item {}",
                deal.id.0,
                id.0
            );
        }
    }
    Ok(())
}

#[tokio::test]
async fn seeded_order_flows_from_cart_to_paid_bill() -> SeedContractTestResult {
    let store = seeded_store().await?;
    let snapshot = load_menu_snapshot(&store.menu, &store.deals)
        .await
        .map_err(|error| format!("snapshot: {error}"))?;

    let burger = snapshot
        .find_item(&MenuItemId("101".to_string()))
        .ok_or_else(|| "burger should be seeded".to_string())?;
    let feast = snapshot
        .find_deal(&DealId("d01".to_string()))
        .ok_or_else(|| "family feast should be seeded".to_string())?;

    let mut cart = Cart::new();
    cart.add(&burger.id.0, burger.display_name(), burger.price, 2)
        .map_err(|error| error.to_string())?;
    cart.add(&feast.id.line_id(), feast.display_name(), feast.price, 1)
        .map_err(|error| error.to_string())?;

    let draft = cart.to_order_draft(TableId(12)).map_err(|error| error.to_string())?;
    let order = store.orders.create(draft).await.map_err(|error| error.to_string())?;
    require_eq!(order.status, OrderStatus::Pending);
    require_eq!(order.total, Decimal::new(13_550, 2));

    let paid = store
        .orders
        .mark_paid(&order.id, PaymentMethod::CreditCard)
        .await
        .map_err(|error| error.to_string())?;
    require_eq!(paid.status, OrderStatus::Paid);

    let bill = render_order_bill(&paid, "Tableside", "SAR");
    require!(bill.contains(&order.id.0), "bill should name the order:\n{bill}");
    require!(bill.contains("Family Feast"), "bill should list the deal:\n{bill}");
    require!(bill.contains("135.50"), "bill should show the total:\n{bill}");
    Ok(())
}

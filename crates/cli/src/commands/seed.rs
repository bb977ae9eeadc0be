use crate::commands::{prepare, CommandResult};
use tableside_core::catalog::MenuSnapshot;
use tableside_db::repositories::{SqlDealRepository, SqlMenuRepository};
use tableside_db::{connect_with_settings, load_menu_snapshot, migrations, DemoMenu, SeedResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let menu = SqlMenuRepository::new(pool.clone());
        let deals = SqlDealRepository::new(pool.clone());
        let seeded = DemoMenu::seed(&menu, &deals)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let snapshot = load_menu_snapshot(&menu, &deals)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let checks = verification_checks(&snapshot);
        let run_result = if checks.iter().all(|(_, passed)| *passed) {
            Ok(seeded)
        } else {
            Err(("seed_verification", verification_message(&checks), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_checks(snapshot: &MenuSnapshot) -> Vec<(&'static str, bool)> {
    let items_present =
        DemoMenu::items().iter().all(|item| snapshot.find_item(&item.id).is_some());
    let deals_present =
        DemoMenu::deals().iter().all(|deal| snapshot.find_deal(&deal.id).is_some());
    let categories_present = DemoMenu::categories()
        .iter()
        .all(|category| snapshot.categories().iter().any(|stored| stored.id == category.id));

    vec![
        ("menu-categories", categories_present),
        ("menu-items", items_present),
        ("deals", deals_present),
    ]
}

fn verification_message(checks: &[(&str, bool)]) -> String {
    let failed_checks =
        checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

fn summary(seeded: &SeedResult) -> String {
    let deal_lines = DemoMenu::deals()
        .iter()
        .map(|deal| format!("  - {}: {} ({:.2})", deal.id.0, deal.display_name(), deal.price))
        .collect::<Vec<_>>();
    format!(
        "demo menu loaded: {} categories, {} items, {} deals\n{}",
        seeded.categories,
        seeded.items,
        seeded.deals,
        deal_lines.join("\n")
    )
}

use rust_decimal::Decimal;
use serde::Serialize;

use tableside_core::domain::deal::{Deal, DealId};
use tableside_core::domain::menu::{Category, CategoryId, LocalizedText, MenuItem, MenuItemId};
use tableside_core::pricing::bundle_price;

use crate::repositories::{DealRepository, MenuRepository, RepositoryError};

/// Deterministic demo catalog used by `tableside seed` and integration tests.
///
/// Ids are stable so chat transcripts in tests can reference them directly.
pub struct DemoMenu;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub categories: usize,
    pub items: usize,
    pub deals: usize,
}

struct DemoItem {
    id: &'static str,
    category: &'static str,
    name_en: &'static str,
    name_ur: &'static str,
    name_ar: &'static str,
    description: &'static str,
    price_cents: i64,
    available: bool,
}

struct DemoDeal {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    items: &'static [&'static str],
    discount_percent: i64,
    active: bool,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("fast-food", "Fast Food"),
    ("pizza", "Pizza"),
    ("bbq", "Meat & BBQ"),
    ("tea", "Tea"),
    ("ice-cream", "Ice Cream"),
];

const ITEMS: &[DemoItem] = &[
    DemoItem {
        id: "101",
        category: "fast-food",
        name_en: "Classic Burger",
        name_ur: "کلاسک برگر",
        name_ar: "برجر كلاسيك",
        description: "Beef patty, cheddar, house sauce",
        price_cents: 2_500,
        available: true,
    },
    DemoItem {
        id: "102",
        category: "fast-food",
        name_en: "Crispy Chicken",
        name_ur: "کرسپی چکن",
        name_ar: "دجاج مقرمش",
        description: "Fried chicken fillet with slaw",
        price_cents: 2_200,
        available: true,
    },
    DemoItem {
        id: "103",
        category: "fast-food",
        name_en: "Loaded Fries",
        name_ur: "",
        name_ar: "",
        description: "Fries with cheese and jalapenos",
        price_cents: 1_200,
        available: false,
    },
    DemoItem {
        id: "201",
        category: "pizza",
        name_en: "Pepperoni Pizza",
        name_ur: "پیپرونی پیزا",
        name_ar: "بيتزا بيبروني",
        description: "Large, stone baked",
        price_cents: 4_500,
        available: true,
    },
    DemoItem {
        id: "202",
        category: "pizza",
        name_en: "Margherita",
        name_ur: "",
        name_ar: "مارجريتا",
        description: "Tomato, mozzarella, basil",
        price_cents: 3_800,
        available: true,
    },
    DemoItem {
        id: "301",
        category: "bbq",
        name_en: "Chicken Tikka",
        name_ur: "چکن تکہ",
        name_ar: "دجاج تكا",
        description: "Charcoal grilled, served with naan",
        price_cents: 3_200,
        available: true,
    },
    DemoItem {
        id: "302",
        category: "bbq",
        name_en: "Seekh Kebab",
        name_ur: "سیخ کباب",
        name_ar: "كباب سيخ",
        description: "Minced lamb skewers",
        price_cents: 3_600,
        available: true,
    },
    DemoItem {
        id: "401",
        category: "tea",
        name_en: "Karak Chai",
        name_ur: "کڑک چائے",
        name_ar: "شاي كرك",
        description: "Strong spiced milk tea",
        price_cents: 500,
        available: true,
    },
    DemoItem {
        id: "501",
        category: "ice-cream",
        name_en: "Pistachio Kulfi",
        name_ur: "پستہ قلفی",
        name_ar: "",
        description: "Traditional frozen dessert",
        price_cents: 900,
        available: true,
    },
];

const DEALS: &[DemoDeal] = &[
    DemoDeal {
        id: "d01",
        name: "Family Feast",
        description: "Two burgers and a pepperoni pizza",
        items: &["101", "101", "201"],
        discount_percent: 10,
        active: true,
    },
    DemoDeal {
        id: "d02",
        name: "BBQ Platter",
        description: "Tikka, kebab and a karak to finish",
        items: &["301", "302", "401"],
        discount_percent: 15,
        active: true,
    },
];

impl DemoMenu {
    pub fn categories() -> Vec<Category> {
        CATEGORIES
            .iter()
            .zip(1u32..)
            .map(|((id, name), position)| Category {
                id: CategoryId((*id).to_string()),
                name: (*name).to_string(),
                active: true,
                position,
            })
            .collect()
    }

    pub fn items() -> Vec<MenuItem> {
        ITEMS
            .iter()
            .map(|item| MenuItem {
                id: MenuItemId(item.id.to_string()),
                category: CategoryId(item.category.to_string()),
                name: LocalizedText {
                    en: item.name_en.to_string(),
                    ur: item.name_ur.to_string(),
                    ar: item.name_ar.to_string(),
                },
                description: LocalizedText::english(item.description),
                price: Decimal::new(item.price_cents, 2),
                available: item.available,
            })
            .collect()
    }

    /// Deal prices follow the staff editor rule: constituent total less the discount.
    pub fn deals() -> Vec<Deal> {
        let items = Self::items();
        DEALS
            .iter()
            .zip(1u32..)
            .map(|(deal, position)| {
                let discount = Decimal::from(deal.discount_percent);
                let items_total = deal
                    .items
                    .iter()
                    .filter_map(|id| items.iter().find(|item| item.id.0 == *id))
                    .map(|item| item.price)
                    .sum::<Decimal>();

                Deal {
                    id: DealId(deal.id.to_string()),
                    name: LocalizedText::english(deal.name),
                    description: LocalizedText::english(deal.description),
                    price: bundle_price(items_total, discount),
                    discount_percent: discount,
                    applicable_items: deal
                        .items
                        .iter()
                        .map(|id| MenuItemId((*id).to_string()))
                        .collect(),
                    active: deal.active,
                    position,
                }
            })
            .collect()
    }

    /// Upserts the demo catalog. Running it twice leaves the same rows behind.
    pub async fn seed(
        menu: &dyn MenuRepository,
        deals: &dyn DealRepository,
    ) -> Result<SeedResult, RepositoryError> {
        let categories = Self::categories();
        let items = Self::items();
        let bundles = Self::deals();
        let result =
            SeedResult { categories: categories.len(), items: items.len(), deals: bundles.len() };

        for category in categories {
            menu.save_category(category).await?;
        }
        for item in items {
            menu.save_item(item).await?;
        }
        for deal in bundles {
            deals.save(deal).await?;
        }

        tracing::info!(
            event_name = "catalog.seed.completed",
            categories = result.categories,
            items = result.items,
            deals = result.deals,
            "demo menu seeded"
        );
        Ok(result)
    }
}

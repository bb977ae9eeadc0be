use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MenuItemId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Ur,
    Ar,
}

/// Display text for each supported language. Empty translations fall back to English.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    #[serde(default)]
    pub ur: String,
    #[serde(default)]
    pub ar: String,
}

impl LocalizedText {
    pub fn english(text: impl Into<String>) -> Self {
        Self { en: text.into(), ..Self::default() }
    }

    pub fn get(&self, language: Language) -> &str {
        let translated = match language {
            Language::En => &self.en,
            Language::Ur => &self.ur,
            Language::Ar => &self.ar,
        };
        if translated.trim().is_empty() {
            &self.en
        } else {
            translated
        }
    }

    /// English label, or `fallback` when the catalog entry has none.
    pub fn label_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.en.trim().is_empty() {
            fallback
        } else {
            &self.en
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub active: bool,
    pub position: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub category: CategoryId,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: Decimal,
    pub available: bool,
}

impl MenuItem {
    pub fn display_name(&self) -> &str {
        self.name.label_or("Unknown")
    }
}

//! Spending category labels and their display names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel label for rows that arrive without a category
pub const OTHER: &str = "Other";

/// The known spending categories of the card-transaction dataset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Entertainment,
    FoodDining,
    GasTransport,
    GroceryNet,
    GroceryPos,
    HealthFitness,
    Home,
    KidsPets,
    MiscNet,
    MiscPos,
    PersonalCare,
    ShoppingNet,
    ShoppingPos,
    Travel,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Entertainment,
        Category::FoodDining,
        Category::GasTransport,
        Category::GroceryNet,
        Category::GroceryPos,
        Category::HealthFitness,
        Category::Home,
        Category::KidsPets,
        Category::MiscNet,
        Category::MiscPos,
        Category::PersonalCare,
        Category::ShoppingNet,
        Category::ShoppingPos,
        Category::Travel,
    ];

    /// Label as it appears in the data and in model output
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "entertainment",
            Category::FoodDining => "food_dining",
            Category::GasTransport => "gas_transport",
            Category::GroceryNet => "grocery_net",
            Category::GroceryPos => "grocery_pos",
            Category::HealthFitness => "health_fitness",
            Category::Home => "home",
            Category::KidsPets => "kids_pets",
            Category::MiscNet => "misc_net",
            Category::MiscPos => "misc_pos",
            Category::PersonalCare => "personal_care",
            Category::ShoppingNet => "shopping_net",
            Category::ShoppingPos => "shopping_pos",
            Category::Travel => "travel",
        }
    }

    /// Human-friendly name for dashboards
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::FoodDining => "Food & Dining",
            Category::GasTransport => "Gas & Transport",
            Category::GroceryNet => "Groceries (Online)",
            Category::GroceryPos => "Groceries",
            Category::HealthFitness => "Health & Fitness",
            Category::Home => "Home",
            Category::KidsPets => "Kids & Pets",
            Category::MiscNet => "Misc (Online)",
            Category::MiscPos => "Misc",
            Category::PersonalCare => "Personal Care",
            Category::ShoppingNet => "Shopping (Online)",
            Category::ShoppingPos => "Shopping",
            Category::Travel => "Travel",
        }
    }

    /// Case-insensitive lookup of a known label. Free-form labels yield `None`.
    pub fn parse(label: &str) -> Option<Category> {
        let label = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display name for any label, known or free-form.
pub fn display_label(label: &str) -> String {
    match Category::parse(label) {
        Some(c) => c.display_name().to_string(),
        None => label.to_string(),
    }
}

//! Ordered substring rules that override the statistical model.
//!
//! The model only knows the vocabulary it was trained on and misses well
//! known brands, so a rule hit always wins. Rules are scanned in order and
//! the first match is taken.

use copilot_core::Category;

/// Builtin rules, lowercase. Order matters: "uber" precedes the food rules
/// so "uber eats" stays transport.
const BUILTIN_RULES: &[(&str, Category)] = &[
    // Transport
    ("uber", Category::GasTransport),
    ("lyft", Category::GasTransport),
    ("shell", Category::GasTransport),
    ("chevron", Category::GasTransport),
    ("exxon", Category::GasTransport),
    // Streaming / entertainment
    ("netflix", Category::Entertainment),
    ("spotify", Category::Entertainment),
    ("hulu", Category::Entertainment),
    ("disney plus", Category::Entertainment),
    ("ticketmaster", Category::Entertainment),
    // Groceries
    ("whole foods", Category::GroceryPos),
    ("trader joe", Category::GroceryPos),
    ("kroger", Category::GroceryPos),
    ("safeway", Category::GroceryPos),
    ("instacart", Category::GroceryNet),
    // Dining
    ("doordash", Category::FoodDining),
    ("grubhub", Category::FoodDining),
    ("starbucks", Category::FoodDining),
    ("mcdonald", Category::FoodDining),
    ("chipotle", Category::FoodDining),
    // Travel
    ("delta air", Category::Travel),
    ("united airlines", Category::Travel),
    ("american airlines", Category::Travel),
    ("airbnb", Category::Travel),
    ("marriott", Category::Travel),
    ("expedia", Category::Travel),
    // Health
    ("walgreens", Category::HealthFitness),
    ("cvs pharmacy", Category::HealthFitness),
    ("planet fitness", Category::HealthFitness),
    // Home / pets / care
    ("home depot", Category::Home),
    ("ikea", Category::Home),
    ("petco", Category::KidsPets),
    ("petsmart", Category::KidsPets),
    ("sephora", Category::PersonalCare),
    // Shopping
    ("amazon", Category::ShoppingNet),
    ("ebay", Category::ShoppingNet),
    ("best buy", Category::ShoppingPos),
    ("walmart", Category::ShoppingPos),
    // Transfers
    ("paypal", Category::MiscNet),
    ("venmo", Category::MiscNet),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Lowercase substring to look for
    pub pattern: String,
    pub label: String,
}

/// An explicitly ordered list of (substring, label) rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Build a table from pairs in priority order. Patterns are lowercased;
    /// blank patterns are dropped.
    pub fn new<P, L>(pairs: impl IntoIterator<Item = (P, L)>) -> Self
    where
        P: Into<String>,
        L: Into<String>,
    {
        let rules = pairs
            .into_iter()
            .map(|(p, l)| Rule {
                pattern: p.into().trim().to_lowercase(),
                label: l.into(),
            })
            .filter(|r| !r.pattern.is_empty())
            .collect();
        Self { rules }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_RULES.iter().map(|(p, c)| (*p, c.as_str())))
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule at the lowest priority.
    pub fn push(&mut self, pattern: impl Into<String>, label: impl Into<String>) {
        let pattern = pattern.into().trim().to_lowercase();
        if !pattern.is_empty() {
            self.rules.push(Rule {
                pattern,
                label: label.into(),
            });
        }
    }

    /// First rule whose pattern occurs in `text`, ignoring case.
    pub fn lookup(&self, text: &str) -> Option<&Rule> {
        let text = text.to_lowercase();
        self.rules.iter().find(|r| text.contains(&r.pattern))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uber_eats_is_transport() {
        let rules = RuleTable::builtin();
        let hit = rules.lookup("uber eats").unwrap();
        assert_eq!(hit.pattern, "uber");
        assert_eq!(hit.label, "gas_transport");
    }

    #[test]
    fn test_case_insensitive() {
        let rules = RuleTable::builtin();
        assert_eq!(rules.lookup("NETFLIX.COM").unwrap().label, "entertainment");
        assert_eq!(rules.lookup("Whole Foods Market").unwrap().label, "grocery_pos");
        assert_eq!(rules.lookup("Delta Air Lines 0062").unwrap().label, "travel");
    }

    #[test]
    fn test_no_match() {
        assert!(RuleTable::builtin().lookup("pizza palace downtown").is_none());
    }

    #[test]
    fn test_first_match_wins_in_insertion_order() {
        let rules = RuleTable::new([("eats", "food_dining"), ("uber", "gas_transport")]);
        assert_eq!(rules.lookup("uber eats").unwrap().label, "food_dining");

        let rules = RuleTable::new([("uber", "gas_transport"), ("eats", "food_dining")]);
        assert_eq!(rules.lookup("uber eats").unwrap().label, "gas_transport");
    }

    #[test]
    fn test_patterns_normalized() {
        let mut rules = RuleTable::new([("  Costco ", "grocery_pos"), ("   ", "misc_pos")]);
        assert_eq!(rules.len(), 1);
        rules.push("GYM", "health_fitness");
        assert_eq!(rules.lookup("city gym monthly").unwrap().label, "health_fitness");
        assert_eq!(rules.lookup("COSTCO WHSE").unwrap().label, "grocery_pos");
    }

    #[test]
    fn test_builtin_labels_are_known_categories() {
        for rule in RuleTable::builtin().iter() {
            assert!(Category::parse(&rule.label).is_some(), "{}", rule.label);
        }
    }
}

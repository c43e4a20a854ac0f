//! copilot-finance: category classification, spend analytics and the
//! transaction store facade used by the dashboards

pub mod analytics;
pub mod category_rules;
pub mod classifier;
pub mod engine;
pub mod scorer;
pub mod store;

pub use analytics::{Aggregate, Analytics, MonthCategory, PeriodSummary, RecurringQuery};
pub use category_rules::{Rule, RuleTable};
pub use classifier::{Classification, Classifier, Source};
pub use engine::Copilot;
pub use scorer::{LinearModel, LinearScorer, Scorer};
pub use store::TransactionStore;

//! Canonical transaction records and the spend sign convention

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::month::YearMonth;

/// A normalized card transaction (one row of the gold table)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// `None` when the source cell could not be parsed
    pub date: Option<NaiveDateTime>,
    /// Signed amount as it appeared in the source; see [`SignConvention`]
    pub amount: f64,
    /// Category label, `"Other"` when absent
    pub category: String,
    /// Canonical merchant text, `"Misc"` when absent
    pub merchant: String,
    /// Free text used for classification
    pub description: String,
    pub is_recurring: bool,
    /// Month bucket of `date`
    pub month: Option<YearMonth>,
}

impl Transaction {
    /// Build a record, deriving `month` from `date`.
    pub fn new(
        date: Option<NaiveDateTime>,
        amount: f64,
        category: impl Into<String>,
        merchant: impl Into<String>,
        description: impl Into<String>,
        is_recurring: bool,
    ) -> Self {
        Self {
            date,
            amount,
            category: category.into(),
            merchant: merchant.into(),
            description: description.into(),
            is_recurring,
            month: date.map(YearMonth::of_datetime),
        }
    }

    /// Calendar day of the transaction
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.map(|d| d.date())
    }

    /// Spend magnitude under `convention`, `None` for income/credit rows.
    pub fn spend(&self, convention: SignConvention) -> Option<f64> {
        convention.spend(self.amount)
    }

    pub fn is_spend(&self, convention: SignConvention) -> bool {
        self.spend(convention).is_some()
    }
}

/// Which amount sign counts as spending.
///
/// A session picks one convention and every aggregate applies it. Spend is
/// always reported as a non-negative magnitude.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Negative amounts are spend, positive amounts are income
    #[default]
    NegativeIsSpend,
    /// Positive amounts are spend, negative amounts are refunds
    PositiveIsSpend,
}

impl SignConvention {
    pub fn spend(&self, amount: f64) -> Option<f64> {
        match self {
            SignConvention::NegativeIsSpend if amount < 0.0 => Some(-amount),
            SignConvention::PositiveIsSpend if amount > 0.0 => Some(amount),
            _ => None,
        }
    }
}

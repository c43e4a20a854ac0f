//! Grouped spend summaries over a transaction table.
//!
//! Every query is a pure function of the rows it is given and the sign
//! convention: only spend rows count, and spend is reported as a positive
//! magnitude. Results are recomputed on every call.

use chrono::NaiveDate;
use copilot_core::{SignConvention, Transaction, YearMonth};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Categories whose spend lowers the efficiency score
pub const NON_ESSENTIAL: &[&str] = &["shopping", "shopping_net", "shopping_pos", "misc_net", "misc_pos"];

/// Categories that recurring charges usually fall under
pub const SUBSCRIPTION_LIKE: &[&str] = &["entertainment", "misc_net"];

/// Scale applied to a category's spend share in [`Analytics::category_efficiency`]
pub const CATEGORY_SHARE_MULTIPLIER: f64 = 5.0;

/// Default minimum occurrences for a recurring merchant
pub const DEFAULT_MIN_TRANSACTIONS: usize = 3;

/// One grouped row: key, summed spend and number of rows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Aggregate<K> {
    pub key: K,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCategory {
    pub month: YearMonth,
    pub category: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct PeriodSummary {
    /// All rows in the slice, spend or not
    pub transactions: usize,
    pub total_spend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringQuery {
    pub min_transactions: usize,
    pub top_k: Option<usize>,
    /// Only consider rows already flagged `is_recurring`
    pub flagged_only: bool,
}

impl Default for RecurringQuery {
    fn default() -> Self {
        Self {
            min_transactions: DEFAULT_MIN_TRANSACTIONS,
            top_k: None,
            flagged_only: false,
        }
    }
}

impl RecurringQuery {
    pub fn min(min_transactions: usize) -> Self {
        Self {
            min_transactions,
            ..Self::default()
        }
    }

    pub fn top(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn flagged(mut self) -> Self {
        self.flagged_only = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Analytics {
    convention: SignConvention,
}

impl Analytics {
    pub fn new(convention: SignConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> SignConvention {
        self.convention
    }

    pub fn total_spend(&self, txns: &[Transaction]) -> f64 {
        self.spend_rows(txns).map(|(_, s)| s).sum()
    }

    pub fn summary(&self, txns: &[Transaction]) -> PeriodSummary {
        PeriodSummary {
            transactions: txns.len(),
            total_spend: self.total_spend(txns),
        }
    }

    /// Spend per category, largest first.
    pub fn category_breakdown(&self, txns: &[Transaction]) -> Vec<Aggregate<String>> {
        let mut rows = rollup(self.spend_rows(txns).map(|(t, s)| (t.category.clone(), s)));
        sort_by_total_desc(&mut rows);
        rows
    }

    /// The first `n` rows of [`category_breakdown`](Self::category_breakdown).
    pub fn top_categories(&self, txns: &[Transaction], n: usize) -> Vec<Aggregate<String>> {
        let mut rows = self.category_breakdown(txns);
        rows.truncate(n);
        rows
    }

    /// Spend per (month, category), ascending by month then category.
    ///
    /// `last_months` keeps the last N month buckets present in the data,
    /// not a calendar window: sparse data keeps older months, and fewer than
    /// N buckets returns everything. Undated rows are skipped.
    pub fn monthly_by_category(
        &self,
        txns: &[Transaction],
        last_months: Option<usize>,
    ) -> Vec<Aggregate<MonthCategory>> {
        let mut rows = rollup(self.spend_rows(txns).filter_map(|(t, s)| {
            t.month.map(|month| {
                (
                    MonthCategory {
                        month,
                        category: t.category.clone(),
                    },
                    s,
                )
            })
        }));

        if let Some(n) = last_months {
            let months: Vec<YearMonth> = rows
                .iter()
                .map(|r| r.key.month)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            match months.get(months.len().saturating_sub(n)) {
                Some(first) if n > 0 => {
                    let first = *first;
                    rows.retain(|r| r.key.month >= first);
                }
                _ => rows.clear(),
            }
        }
        rows
    }

    /// Spend per month, ascending.
    pub fn monthly_spend(&self, txns: &[Transaction]) -> Vec<Aggregate<YearMonth>> {
        rollup(self.spend_rows(txns).filter_map(|(t, s)| t.month.map(|m| (m, s))))
    }

    /// Spend per calendar day, ascending.
    pub fn daily_spend(&self, txns: &[Transaction]) -> Vec<Aggregate<NaiveDate>> {
        rollup(self.spend_rows(txns).filter_map(|(t, s)| t.day().map(|d| (d, s))))
    }

    /// Spend per merchant, largest first, capped at `n`.
    pub fn top_merchants(&self, txns: &[Transaction], n: usize) -> Vec<Aggregate<String>> {
        let mut rows = rollup(self.spend_rows(txns).map(|(t, s)| (t.merchant.clone(), s)));
        sort_by_total_desc(&mut rows);
        rows.truncate(n);
        rows
    }

    /// Merchants with at least `query.min_transactions` spend rows, ordered
    /// by count then total, both descending.
    pub fn recurring_merchants(
        &self,
        txns: &[Transaction],
        query: &RecurringQuery,
    ) -> Vec<Aggregate<String>> {
        let mut rows: Vec<Aggregate<String>> = rollup(
            self.spend_rows(txns)
                .filter(|(t, _)| !query.flagged_only || t.is_recurring)
                .map(|(t, s)| (t.merchant.clone(), s)),
        )
        .into_iter()
        .filter(|r| r.count >= query.min_transactions)
        .collect();

        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.total.total_cmp(&a.total))
                .then_with(|| a.key.cmp(&b.key))
        });
        if let Some(k) = query.top_k {
            rows.truncate(k);
        }
        rows
    }

    /// Recurring merchants (3+ rows) whose spend falls in a
    /// subscription-like category, summed per merchant, largest first.
    pub fn suspected_subscriptions(&self, txns: &[Transaction]) -> Vec<Aggregate<String>> {
        let recurring: BTreeSet<String> = self
            .recurring_merchants(txns, &RecurringQuery::default())
            .into_iter()
            .map(|r| r.key)
            .collect();

        let mut rows = rollup(
            self.spend_rows(txns)
                .filter(|(t, _)| recurring.contains(&t.merchant) && in_set(&t.category, SUBSCRIPTION_LIKE))
                .map(|(t, s)| (t.merchant.clone(), s)),
        );
        sort_by_total_desc(&mut rows);
        rows
    }

    /// `100 × (1 − non-essential share of spend)`, in [0, 100], rounded to
    /// cents. No spend at all scores 100.
    pub fn efficiency_score(&self, txns: &[Transaction]) -> f64 {
        let total = self.total_spend(txns);
        if total == 0.0 {
            return 100.0;
        }
        let bad: f64 = self
            .spend_rows(txns)
            .filter(|(t, _)| in_set(&t.category, NON_ESSENTIAL))
            .map(|(_, s)| s)
            .sum();
        round2((100.0 * (1.0 - bad / total)).clamp(0.0, 100.0))
    }

    /// Score for one category: its spend share × 100 × 5, inverted for
    /// non-essential categories, clamped to [0, 100]. No spend scores 100.
    pub fn category_efficiency(&self, txns: &[Transaction], category: &str) -> f64 {
        let total = self.total_spend(txns);
        if total == 0.0 {
            return 100.0;
        }
        let category = category.trim();
        let spent: f64 = self
            .spend_rows(txns)
            .filter(|(t, _)| t.category.trim().eq_ignore_ascii_case(category))
            .map(|(_, s)| s)
            .sum();

        let scaled = spent / total * 100.0 * CATEGORY_SHARE_MULTIPLIER;
        let score = if in_set(category, NON_ESSENTIAL) {
            100.0 - scaled
        } else {
            scaled
        };
        round2(score.clamp(0.0, 100.0))
    }

    fn spend_rows<'a>(
        &self,
        txns: &'a [Transaction],
    ) -> impl Iterator<Item = (&'a Transaction, f64)> + 'a {
        let convention = self.convention;
        txns.iter()
            .filter_map(move |t| t.spend(convention).map(|s| (t, s)))
    }
}

fn rollup<K: Ord>(rows: impl Iterator<Item = (K, f64)>) -> Vec<Aggregate<K>> {
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for (key, amount) in rows {
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(key, (total, count))| Aggregate { key, total, count })
        .collect()
}

fn sort_by_total_desc<K: Ord>(rows: &mut [Aggregate<K>]) {
    rows.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
}

fn in_set(category: &str, set: &[&str]) -> bool {
    let category = category.trim();
    set.iter().any(|c| c.eq_ignore_ascii_case(category))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

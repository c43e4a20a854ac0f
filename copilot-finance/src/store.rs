//! The session's transaction table and its read-only projections.

use chrono::NaiveDate;
use copilot_core::{Error, Result, SignConvention, Transaction, YearMonth};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analytics::{Aggregate, Analytics, MonthCategory, PeriodSummary, RecurringQuery};

/// Owns the normalized table for one session.
///
/// The table is never mutated after construction and callers only ever get
/// owned copies, so aggregate results cannot be disturbed from outside.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    source: Option<PathBuf>,
    table: Vec<Transaction>,
    analytics: Analytics,
}

impl TransactionStore {
    /// Load and normalize the CSV at `path`.
    pub fn open(path: impl AsRef<Path>, convention: SignConvention) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let table = copilot_ingest::load_csv(path)?;
        info!("Loaded {} transactions from {}", table.len(), path.display());

        Ok(Self {
            source: Some(path.to_path_buf()),
            table,
            analytics: Analytics::new(convention),
        })
    }

    /// Wrap an already-normalized table.
    pub fn from_transactions(table: Vec<Transaction>, convention: SignConvention) -> Self {
        Self {
            source: None,
            table,
            analytics: Analytics::new(convention),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn analytics(&self) -> Analytics {
        self.analytics
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.table.clone()
    }

    /// Distinct months present, ascending.
    pub fn months(&self) -> Vec<YearMonth> {
        self.table
            .iter()
            .filter_map(|t| t.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows dated within `start..=end` (whole calendar days). Undated rows
    /// never match.
    pub fn filter_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
        self.select(|t| t.day().is_some_and(|d| d >= start && d <= end))
    }

    /// [`filter_by_date_range`](Self::filter_by_date_range) with `YYYY-MM-DD` strings.
    pub fn filter_by_date_range_str(&self, start: &str, end: &str) -> Result<Vec<Transaction>> {
        let start = parse_day(start)?;
        let end = parse_day(end)?;
        if start > end {
            return Err(Error::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(self.filter_by_date_range(start, end))
    }

    pub fn filter_by_month(&self, year: i32, month: u32) -> Result<Vec<Transaction>> {
        let ym = YearMonth::new(year, month)
            .ok_or_else(|| Error::Validation(format!("month must be 1-12, got {month}")))?;
        Ok(self.select(|t| t.month == Some(ym)))
    }

    /// Rows whose category is one of `categories` (exact match).
    pub fn filter_by_category<S: AsRef<str>>(&self, categories: &[S]) -> Vec<Transaction> {
        self.select(|t| categories.iter().any(|c| c.as_ref() == t.category))
    }

    pub fn summary(&self) -> PeriodSummary {
        self.analytics.summary(&self.table)
    }

    pub fn category_breakdown(&self) -> Vec<Aggregate<String>> {
        self.analytics.category_breakdown(&self.table)
    }

    pub fn top_categories(&self, n: usize) -> Vec<Aggregate<String>> {
        self.analytics.top_categories(&self.table, n)
    }

    pub fn monthly_by_category(&self, last_months: Option<usize>) -> Vec<Aggregate<MonthCategory>> {
        self.analytics.monthly_by_category(&self.table, last_months)
    }

    pub fn monthly_spend(&self) -> Vec<Aggregate<YearMonth>> {
        self.analytics.monthly_spend(&self.table)
    }

    pub fn daily_spend(&self) -> Vec<Aggregate<NaiveDate>> {
        self.analytics.daily_spend(&self.table)
    }

    pub fn top_merchants(&self, n: usize) -> Vec<Aggregate<String>> {
        self.analytics.top_merchants(&self.table, n)
    }

    pub fn recurring_merchants(&self, query: &RecurringQuery) -> Vec<Aggregate<String>> {
        self.analytics.recurring_merchants(&self.table, query)
    }

    pub fn suspected_subscriptions(&self) -> Vec<Aggregate<String>> {
        self.analytics.suspected_subscriptions(&self.table)
    }

    pub fn efficiency_score(&self) -> f64 {
        self.analytics.efficiency_score(&self.table)
    }

    pub fn category_efficiency(&self, category: &str) -> f64 {
        self.analytics.category_efficiency(&self.table, category)
    }

    fn select(&self, keep: impl Fn(&Transaction) -> bool) -> Vec<Transaction> {
        self.table.iter().filter(|t| keep(t)).cloned().collect()
    }
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_ingest::{RawTable, normalize};

    const CSV: &str = "Date,Amount,Category,Merchant\n\
        2024-03-01,-50,Food,Deli\n\
        2024-03-15,-120,Bills,City Power\n\
        2024-04-01,-300,Travel,Airline\n\
        2024-04-10,-25,Food,Deli\n\
        2024-05-01,-150,Bills,City Power\n\
        2024-05-31 18:30:00,2000,Income,Payroll\n\
        garbage,-5,Food,Deli\n";

    fn store() -> TransactionStore {
        let table = normalize(&RawTable::from_reader(CSV.as_bytes()).unwrap()).unwrap();
        TransactionStore::from_transactions(table, SignConvention::NegativeIsSpend)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_open_missing_file() {
        let err = TransactionStore::open("/no/such/gold.csv", SignConvention::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold.csv");
        std::fs::write(&path, CSV).unwrap();
        let store = TransactionStore::open(&path, SignConvention::default()).unwrap();
        assert_eq!(store.len(), 7);
        assert_eq!(store.source(), Some(path.as_path()));
    }

    #[test]
    fn test_copies_do_not_alias() {
        let store = store();
        let mut copy = store.transactions();
        copy[0].amount = -1_000_000.0;
        copy.clear();
        assert_eq!(store.len(), 7);
        assert_eq!(store.top_categories(1)[0].key, "Travel");
    }

    #[test]
    fn test_filter_by_month() {
        let store = store();
        let march = store.filter_by_month(2024, 3).unwrap();
        assert_eq!(march.len(), 2);
        assert!(march.iter().all(|t| t.month == YearMonth::new(2024, 3)));

        assert!(matches!(store.filter_by_month(2024, 13), Err(Error::Validation(_))));
        assert!(store.filter_by_month(2023, 3).unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_date_range_inclusive() {
        let store = store();
        let rows = store.filter_by_date_range(day("2024-03-15"), day("2024-05-01"));
        assert_eq!(rows.len(), 4);

        // end day includes rows later that day
        let rows = store.filter_by_date_range(day("2024-05-31"), day("2024-05-31"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Income");
    }

    #[test]
    fn test_filter_by_date_range_str() {
        let store = store();
        assert_eq!(store.filter_by_date_range_str("2024-03-01", "2024-03-31").unwrap().len(), 2);
        assert!(matches!(
            store.filter_by_date_range_str("03/01/2024", "2024-03-31"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.filter_by_date_range_str("2024-04-01", "2024-03-01"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_filter_by_category() {
        let store = store();
        assert_eq!(store.filter_by_category(&["Food"]).len(), 3);
        assert_eq!(store.filter_by_category(&["Food", "Travel"]).len(), 4);
        assert!(store.filter_by_category::<&str>(&[]).is_empty());
        assert!(store.filter_by_category(&["food"]).is_empty());
    }

    #[test]
    fn test_months() {
        let months: Vec<String> = store().months().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-03", "2024-04", "2024-05"]);
    }

    #[test]
    fn test_delegated_queries() {
        let store = store();
        let top: Vec<(String, f64)> = store
            .top_categories(5)
            .into_iter()
            .map(|r| (r.key, r.total))
            .collect();
        assert_eq!(
            top,
            vec![
                ("Travel".to_string(), 300.0),
                ("Bills".to_string(), 270.0),
                ("Food".to_string(), 80.0),
            ]
        );
        assert_eq!(store.efficiency_score(), 100.0);
        assert_eq!(store.summary().transactions, 7);
        assert_eq!(store.monthly_by_category(Some(1)).len(), 1);
        assert!(store.suspected_subscriptions().is_empty());

        let deli = store.recurring_merchants(&RecurringQuery::default());
        assert_eq!(deli.len(), 1);
        assert_eq!(deli[0].key, "DELI");
        assert_eq!(deli[0].count, 3);
    }
}

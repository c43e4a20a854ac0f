//! Turns a raw row set into the canonical transaction table.

use copilot_core::{Error, MISC_MERCHANT, OTHER, Result, Transaction};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::coerce::{MerchantCanonicalizer, parse_amount, parse_date, parse_flag};
use crate::types::RawTable;

const DATE_COLUMNS: &[&str] = &["date", "trans_date_trans_time"];
const AMOUNT_COLUMNS: &[&str] = &["amount", "amt"];
const CATEGORY_COLUMNS: &[&str] = &["category"];
const MERCHANT_COLUMNS: &[&str] = &["merchant"];
const DESCRIPTION_COLUMNS: &[&str] = &["description"];
const RECURRING_COLUMNS: &[&str] = &["is_recurring"];

/// Read a CSV file and normalize it.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let table = RawTable::from_path(path.as_ref())?;
    debug!("Read {} raw rows from {}", table.len(), path.as_ref().display());
    normalize(&table)
}

/// Normalize a raw table.
///
/// Fails only when the `date` or `amount` column is missing. Unparseable
/// cells are coerced, rows are sorted by date with undated rows last, and
/// rows sharing a (merchant, amount) pair are flagged recurring.
pub fn normalize(table: &RawTable) -> Result<Vec<Transaction>> {
    let date_col = table
        .column(DATE_COLUMNS)
        .ok_or_else(|| Error::Schema("date".to_string()))?;
    let amount_col = table
        .column(AMOUNT_COLUMNS)
        .ok_or_else(|| Error::Schema("amount".to_string()))?;
    let category_col = table.column(CATEGORY_COLUMNS);
    let merchant_col = table.column(MERCHANT_COLUMNS);
    let description_col = table.column(DESCRIPTION_COLUMNS);
    let recurring_col = table.column(RECURRING_COLUMNS);

    let canon = MerchantCanonicalizer::new()?;
    let mut bad_dates = 0usize;
    let mut bad_amounts = 0usize;
    let mut txns = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let date = table.cell(row, Some(date_col)).and_then(parse_date);
        if date.is_none() {
            bad_dates += 1;
        }

        let amount = match table.cell(row, Some(amount_col)).and_then(parse_amount) {
            Some(a) => a,
            None => {
                bad_amounts += 1;
                0.0
            }
        };

        let category = table.cell(row, category_col).unwrap_or(OTHER).to_string();

        let merchant = table
            .cell(row, merchant_col)
            .map(|m| canon.canonicalize(m))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| MISC_MERCHANT.to_string());

        let description = table
            .cell(row, description_col)
            .map(str::to_string)
            .unwrap_or_else(|| merchant.clone());

        let is_recurring = table.cell(row, recurring_col).is_some_and(parse_flag);

        txns.push(Transaction::new(
            date,
            amount,
            category,
            merchant,
            description,
            is_recurring,
        ));
    }

    if bad_dates > 0 || bad_amounts > 0 {
        debug!(
            "Coerced {} unparseable dates and {} unparseable amounts",
            bad_dates, bad_amounts
        );
    }

    txns.sort_by_key(|t| (t.date.is_none(), t.date));
    mark_recurring(&mut txns);

    debug!("Normalized {} transactions", txns.len());
    Ok(txns)
}

/// Flag every row whose (merchant, amount) pair occurs more than once.
/// Existing flags are kept.
pub fn mark_recurring(txns: &mut [Transaction]) {
    let mut seen: HashMap<(String, i64), usize> = HashMap::new();
    for t in txns.iter() {
        *seen.entry(recurrence_key(t)).or_insert(0) += 1;
    }

    for t in txns.iter_mut() {
        if seen.get(&recurrence_key(t)).copied().unwrap_or(0) > 1 {
            t.is_recurring = true;
        }
    }
}

fn recurrence_key(t: &Transaction) -> (String, i64) {
    (t.merchant.clone(), (t.amount * 100.0).round() as i64)
}

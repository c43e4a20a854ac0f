use copilot_core::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Raw CSV contents before normalization: header names plus string cells.
///
/// Rows may be shorter than the header; absent cells read as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<H, R>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<String>>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows.into_iter().collect(),
        }
    }

    /// Read a headered CSV. Ragged rows are accepted.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Index of the first header matching any of `names`, ignoring case and
    /// surrounding whitespace.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| {
            let h = h.trim();
            names.iter().any(|n| h.eq_ignore_ascii_case(n))
        })
    }

    /// Cell at (`row`, `col`), `None` when the column is absent or the cell
    /// is blank.
    pub fn cell(&self, row: usize, col: Option<usize>) -> Option<&str> {
        let col = col?;
        self.rows
            .get(row)?
            .get(col)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_ragged_csv() {
        let csv = "Date,Amount,Merchant\n2024-03-01,-50,Cafe\n2024-03-02,-10\n";
        let table = RawTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Date", "Amount", "Merchant"]);
        assert_eq!(table.len(), 2);

        let merchant = table.column(&["merchant"]);
        assert_eq!(table.cell(0, merchant), Some("Cafe"));
        assert_eq!(table.cell(1, merchant), None);
    }

    #[test]
    fn test_column_matching_ignores_case_and_aliases() {
        let table = RawTable::new([" AMT ", "trans_date_trans_time"], Vec::new());
        assert_eq!(table.column(&["amount", "amt"]), Some(0));
        assert_eq!(table.column(&["date", "trans_date_trans_time"]), Some(1));
        assert_eq!(table.column(&["category"]), None);
    }

    #[test]
    fn test_missing_file() {
        let err = RawTable::from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};
use crate::transaction::SignConvention;

/// Session configuration: where the gold table and classifier artifact live,
/// and how amounts are read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub sign_convention: SignConvention,
    pub recurring_min_transactions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/gold/transactions_gold.csv"),
            model_path: PathBuf::from("models/category_model.json"),
            sign_convention: SignConvention::default(),
            recurring_min_transactions: 3,
        }
    }
}

impl Settings {
    /// Read settings from a TOML file. Relative paths inside it resolve
    /// against the file's directory. A missing file yields the defaults,
    /// rooted the same way.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let settings = if path.exists() {
            let s = fs::read_to_string(path)?;
            Self::from_toml(&s)?
        } else {
            warn!("config {} not found, using defaults", path.display());
            Self::default()
        };

        Ok(settings.rooted_at(base))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Resolve relative paths against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if self.data_path.is_relative() {
            self.data_path = base.join(&self.data_path);
        }
        if self.model_path.is_relative() {
            self.model_path = base.join(&self.model_path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s = Settings::from_toml("sign_convention = \"positive_is_spend\"\n").unwrap();
        assert_eq!(s.sign_convention, SignConvention::PositiveIsSpend);
        assert_eq!(s.recurring_min_transactions, 3);
        assert_eq!(s.model_path, PathBuf::from("models/category_model.json"));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Settings::from_toml("recurring_min_transactions = \"three\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("copilot.toml");
        fs::write(
            &cfg,
            "data_path = \"gold.csv\"\nmodel_path = \"/opt/models/cat.json\"\n",
        )
        .unwrap();

        let s = Settings::load(&cfg).unwrap();
        assert_eq!(s.data_path, dir.path().join("gold.csv"));
        assert_eq!(s.model_path, PathBuf::from("/opt/models/cat.json"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(
            s.data_path,
            dir.path().join("data/gold/transactions_gold.csv")
        );
        assert_eq!(s.sign_convention, SignConvention::NegativeIsSpend);
    }

    #[test]
    fn test_toml_round_trip() {
        let s = Settings::default();
        let text = s.to_toml().unwrap();
        assert_eq!(Settings::from_toml(&text).unwrap(), s);
    }
}

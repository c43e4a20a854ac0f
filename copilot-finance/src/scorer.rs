//! Statistical label scorers.
//!
//! `Scorer` is the capability the classifier falls back on. `LinearScorer`
//! is the bundled implementation: tf-idf features over word n-grams fed to a
//! multinomial linear model, loaded from a JSON artifact.

use copilot_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Scores free text against a fixed label set.
pub trait Scorer {
    /// All labels, sorted by descending probability.
    fn predict_proba(&self, text: &str) -> Result<Vec<(String, f64)>>;

    /// Most likely label.
    fn predict(&self, text: &str) -> Result<String> {
        self.predict_proba(text)?
            .into_iter()
            .next()
            .map(|(label, _)| label)
            .ok_or_else(|| Error::Model("scorer produced no labels".to_string()))
    }
}

/// On-disk shape of a linear text model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    pub labels: Vec<String>,
    /// n-gram → feature index
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature
    pub idf: Vec<f64>,
    /// One weight row per label
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
}

fn default_ngram_max() -> usize {
    1
}

impl LinearModel {
    fn validate(&self) -> Result<()> {
        let features = self.idf.len();
        if self.labels.is_empty() {
            return Err(Error::Model("model has no labels".to_string()));
        }
        if self.coef.len() != self.labels.len() || self.intercept.len() != self.labels.len() {
            return Err(Error::Model(format!(
                "expected {} coef rows and intercepts, got {} and {}",
                self.labels.len(),
                self.coef.len(),
                self.intercept.len()
            )));
        }
        if let Some(row) = self.coef.iter().position(|r| r.len() != features) {
            return Err(Error::Model(format!(
                "coef row {} has {} weights, expected {}",
                row,
                self.coef[row].len(),
                features
            )));
        }
        if let Some((term, idx)) = self.vocabulary.iter().find(|(_, i)| **i >= features) {
            return Err(Error::Model(format!(
                "vocabulary term '{}' maps to feature {} of {}",
                term, idx, features
            )));
        }
        if self.ngram_max == 0 {
            return Err(Error::Model("ngram_max must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// A pretrained linear classifier over tf-idf word n-grams
#[derive(Debug, Clone)]
pub struct LinearScorer {
    model: LinearModel,
}

impl LinearScorer {
    pub fn new(model: LinearModel) -> Result<Self> {
        model.validate()?;
        Ok(Self { model })
    }

    /// Load an artifact. A missing file is fatal: there is no rule-only mode.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let s = std::fs::read_to_string(path)?;
        let model: LinearModel = serde_json::from_str(&s)?;
        let scorer = Self::new(model)?;
        info!(
            "Loaded category model from {} ({} labels, {} features)",
            path.display(),
            scorer.model.labels.len(),
            scorer.model.idf.len()
        );
        Ok(scorer)
    }

    pub fn labels(&self) -> &[String] {
        &self.model.labels
    }

    /// L2-normalized tf-idf vector as sparse (index, weight) pairs
    fn features(&self, text: &str) -> Vec<(usize, f64)> {
        let tokens = tokenize(text);
        let mut counts: HashMap<usize, f64> = HashMap::new();

        for n in 1..=self.model.ngram_max {
            for gram in tokens.windows(n) {
                if let Some(&idx) = self.model.vocabulary.get(&gram.join(" ")) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut weighted: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.model.idf[idx]))
            .collect();

        let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in weighted.iter_mut() {
                *w /= norm;
            }
        }
        weighted
    }
}

impl Scorer for LinearScorer {
    fn predict_proba(&self, text: &str) -> Result<Vec<(String, f64)>> {
        let x = self.features(text);

        let logits: Vec<f64> = self
            .model
            .coef
            .iter()
            .zip(&self.model.intercept)
            .map(|(row, b)| b + x.iter().map(|(i, w)| row[*i] * w).sum::<f64>())
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        let mut ranked: Vec<(String, f64)> = self
            .model
            .labels
            .iter()
            .cloned()
            .zip(exps.into_iter().map(|e| e / total))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked)
    }
}

/// Lowercase alphanumeric tokens of two or more characters
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_string())
        .collect()
}

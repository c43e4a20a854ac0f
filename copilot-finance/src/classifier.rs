//! Category classifier: rule table first, statistical scorer as fallback.

use copilot_core::{Error, OTHER, Result, Transaction};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::category_rules::RuleTable;
use crate::scorer::{LinearScorer, Scorer};

/// Where a label came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Rule,
    Model,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Classification {
    pub label: String,
    pub source: Source,
    /// 1.0 for rule hits, the top probability for model output
    pub confidence: f64,
    /// Top-K (label, probability) pairs when ranked output was requested
    pub alternatives: Vec<(String, f64)>,
}

/// Maps free-text descriptions to category labels.
///
/// Rule hits are never blended with model probabilities.
#[derive(Debug, Clone)]
pub struct Classifier<S = LinearScorer> {
    rules: RuleTable,
    scorer: S,
}

impl Classifier<LinearScorer> {
    /// Builtin rules plus the linear model at `model_path`.
    pub fn from_artifact(model_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_scorer(LinearScorer::load(model_path)?))
    }
}

impl<S: Scorer> Classifier<S> {
    pub fn new(rules: RuleTable, scorer: S) -> Self {
        Self { rules, scorer }
    }

    pub fn with_scorer(scorer: S) -> Self {
        Self::new(RuleTable::builtin(), scorer)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn classify(&self, description: &str) -> Result<Classification> {
        self.run(description, None)
    }

    /// Like [`classify`](Self::classify), also returning the `k` most
    /// probable labels.
    pub fn classify_ranked(&self, description: &str, k: usize) -> Result<Classification> {
        self.run(description, Some(k))
    }

    /// Label only, skipping probabilities when no rule matches.
    pub fn predict_label(&self, description: &str) -> Result<String> {
        let text = normalize_description(description)?;
        match self.rules.lookup(&text) {
            Some(rule) => Ok(rule.label.clone()),
            None => self.scorer.predict(&text),
        }
    }

    /// Copies of `txns` with the `"Other"` sentinel replaced by a predicted
    /// label. Rows that already carry a category are left alone.
    pub fn label_transactions(&self, txns: &[Transaction]) -> Result<Vec<Transaction>> {
        let mut labeled = Vec::with_capacity(txns.len());
        let mut filled = 0usize;
        for t in txns {
            let mut t = t.clone();
            if t.category == OTHER {
                t.category = self.predict_label(&t.description)?;
                filled += 1;
            }
            labeled.push(t);
        }
        debug!("Predicted categories for {} of {} rows", filled, txns.len());
        Ok(labeled)
    }

    fn run(&self, description: &str, top_k: Option<usize>) -> Result<Classification> {
        let text = normalize_description(description)?;

        if let Some(rule) = self.rules.lookup(&text) {
            debug!("Rule '{}' matched '{}'", rule.pattern, text);
            let alternatives = match top_k {
                Some(k) if k > 0 => vec![(rule.label.clone(), 1.0)],
                _ => Vec::new(),
            };
            return Ok(Classification {
                label: rule.label.clone(),
                source: Source::Rule,
                confidence: 1.0,
                alternatives,
            });
        }

        let ranked = self.scorer.predict_proba(&text)?;
        let (label, confidence) = ranked
            .first()
            .cloned()
            .ok_or_else(|| Error::Model("scorer produced no labels".to_string()))?;
        let alternatives = match top_k {
            Some(k) => ranked.into_iter().take(k).collect(),
            None => Vec::new(),
        };

        Ok(Classification {
            label,
            source: Source::Model,
            confidence,
            alternatives,
        })
    }
}

fn normalize_description(description: &str) -> Result<String> {
    let text = description.trim().to_lowercase();
    if text.is_empty() {
        return Err(Error::Validation(
            "description must be a non-empty string".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Always answers with fixed probabilities and counts calls.
    struct StubScorer {
        ranked: Vec<(String, f64)>,
        calls: Cell<usize>,
    }

    impl StubScorer {
        fn new(ranked: &[(&str, f64)]) -> Self {
            Self {
                ranked: ranked.iter().map(|(l, p)| (l.to_string(), *p)).collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl Scorer for StubScorer {
        fn predict_proba(&self, _text: &str) -> Result<Vec<(String, f64)>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.ranked.clone())
        }
    }

    fn classifier() -> Classifier<StubScorer> {
        Classifier::with_scorer(StubScorer::new(&[
            ("food_dining", 0.7),
            ("travel", 0.2),
            ("misc_pos", 0.1),
        ]))
    }

    #[test]
    fn test_uber_eats_matches_rule() {
        let c = classifier();
        let out = c.classify("uber eats").unwrap();
        assert_eq!(out.label, "gas_transport");
        assert_eq!(out.source, Source::Rule);
        assert_eq!(out.confidence, 1.0);
        assert_eq!(c.scorer().calls.get(), 0);
    }

    #[test]
    fn test_empty_description_is_validation_error() {
        let c = classifier();
        assert!(matches!(c.classify(""), Err(Error::Validation(_))));
        assert!(matches!(c.classify("   "), Err(Error::Validation(_))));
        assert!(matches!(c.predict_label("\t"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_model_fallback() {
        let c = classifier();
        let out = c.classify("Pizza Palace").unwrap();
        assert_eq!(out.label, "food_dining");
        assert_eq!(out.source, Source::Model);
        assert_eq!(out.confidence, 0.7);
        assert!(out.alternatives.is_empty());
        assert_eq!(c.scorer().calls.get(), 1);
    }

    #[test]
    fn test_ranked_output() {
        let c = classifier();
        let out = c.classify_ranked("pizza palace", 2).unwrap();
        assert_eq!(
            out.alternatives,
            vec![("food_dining".to_string(), 0.7), ("travel".to_string(), 0.2)]
        );

        let rule = c.classify_ranked("NETFLIX.COM", 3).unwrap();
        assert_eq!(rule.alternatives, vec![("entertainment".to_string(), 1.0)]);
    }

    #[test]
    fn test_rule_results_independent_of_call_order() {
        let c = classifier();
        let first = c.classify("Uber Trip 1234").unwrap();
        c.classify("something else").unwrap();
        c.classify("amazon mktplace").unwrap();
        let again = c.classify("Uber Trip 1234").unwrap();
        assert_eq!((first.label, first.source), (again.label, again.source));
    }

    #[test]
    fn test_custom_rules_take_precedence_over_model() {
        let rules = RuleTable::new([("pizza", "takeout")]);
        let c = Classifier::new(rules, StubScorer::new(&[("food_dining", 1.0)]));
        assert_eq!(c.classify("pizza palace").unwrap().label, "takeout");
    }

    #[test]
    fn test_label_transactions_fills_sentinel_only() {
        let c = classifier();
        let txns = vec![
            Transaction::new(None, -9.0, "Other", "KIOSK", "corner kiosk", false),
            Transaction::new(None, -15.0, "Other", "UBER", "UBER TRIP", false),
            Transaction::new(None, -20.0, "Bills", "CITY POWER", "CITY POWER", false),
        ];
        let labeled = c.label_transactions(&txns).unwrap();
        assert_eq!(labeled[0].category, "food_dining");
        assert_eq!(labeled[1].category, "gas_transport");
        assert_eq!(labeled[2].category, "Bills");
        // source untouched
        assert_eq!(txns[0].category, "Other");
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let err = Classifier::from_artifact("/no/such/model.json").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}

//! One session: the transaction store plus the classifier, both loaded from
//! [`Settings`].

use copilot_core::{Result, Settings};

use crate::analytics::{Aggregate, RecurringQuery};
use crate::classifier::{Classification, Classifier};
use crate::scorer::{LinearScorer, Scorer};
use crate::store::TransactionStore;

#[derive(Debug)]
pub struct Copilot<S = LinearScorer> {
    settings: Settings,
    store: TransactionStore,
    classifier: Classifier<S>,
}

impl Copilot<LinearScorer> {
    /// Load the gold table and the category model. Either file missing is
    /// fatal.
    pub fn open(settings: &Settings) -> Result<Self> {
        let store = TransactionStore::open(&settings.data_path, settings.sign_convention)?;
        let classifier = Classifier::from_artifact(&settings.model_path)?;
        Ok(Self::new(settings.clone(), store, classifier))
    }
}

impl<S: Scorer> Copilot<S> {
    pub fn new(settings: Settings, store: TransactionStore, classifier: Classifier<S>) -> Self {
        Self {
            settings,
            store,
            classifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn classifier(&self) -> &Classifier<S> {
        &self.classifier
    }

    pub fn classify(&self, description: &str) -> Result<Classification> {
        self.classifier.classify(description)
    }

    pub fn classify_ranked(&self, description: &str, k: usize) -> Result<Classification> {
        self.classifier.classify_ranked(description, k)
    }

    pub fn efficiency_score(&self) -> f64 {
        self.store.efficiency_score()
    }

    /// Recurring merchants at the configured threshold.
    pub fn recurring_merchants(&self, top_k: Option<usize>) -> Vec<Aggregate<String>> {
        let query = RecurringQuery {
            top_k,
            ..RecurringQuery::min(self.settings.recurring_min_transactions)
        };
        self.store.recurring_merchants(&query)
    }
}

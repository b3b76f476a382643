pub mod rules;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::{AlertItem, Transaction};
use rules::AlertRule;

/// Default shortfall share tolerated before a stream alert fires.
pub const DEFAULT_THRESHOLD: f64 = 0.08;

/// The alert engine runs every rule and concatenates their findings.
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule + Send + Sync>>,
}

impl AlertEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            rules: rules::default_rules(threshold),
        }
    }

    pub fn detect(&self, txs: &[Transaction], now: DateTime<Utc>) -> Vec<AlertItem> {
        let mut alerts = Vec::new();
        for rule in &self.rules {
            let found = rule.detect(txs, now);
            debug!(rule = rule.name(), count = found.len(), "Alert rule evaluated");
            alerts.extend(found);
        }
        alerts
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Detect under-remittance alerts, stamping stream alerts with the current time.
pub fn detect(txs: &[Transaction], threshold: f64) -> Vec<AlertItem> {
    detect_at(txs, threshold, Utc::now())
}

/// Like [`detect`] with an explicit detection time.
pub fn detect_at(txs: &[Transaction], threshold: f64, now: DateTime<Utc>) -> Vec<AlertItem> {
    AlertEngine::new(threshold).detect(txs, now)
}

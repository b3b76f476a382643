use chrono::{DateTime, Utc};

use crate::core::metrics::stream_totals;
use crate::core::{
    AlertItem, Category, RevenueStream, Severity, StreamTotals, Transaction, round2,
};

/// Remitted/declared ratio below which a stream alert escalates to high.
const HIGH_SEVERITY_RATIO: f64 = 0.8;

/// Single-transaction shortfall above which an alert fires.
pub const LARGE_VARIANCE_LIMIT: f64 = 200.0;

/// An alert rule scans a transaction set and reports anomalies.
pub trait AlertRule {
    fn name(&self) -> &str;
    fn detect(&self, txs: &[Transaction], now: DateTime<Utc>) -> Vec<AlertItem>;
}

/// Rules in the order their alerts are reported.
pub fn default_rules(threshold: f64) -> Vec<Box<dyn AlertRule + Send + Sync>> {
    vec![
        Box::new(StreamShortfallRule { threshold }),
        Box::new(LargeVarianceRule),
    ]
}

// --- Individual Rules ---

/// Flags every stream whose remitted share falls below `1 - threshold`.
pub struct StreamShortfallRule {
    pub threshold: f64,
}

impl AlertRule for StreamShortfallRule {
    fn name(&self) -> &str { "stream_shortfall" }
    fn detect(&self, txs: &[Transaction], now: DateTime<Utc>) -> Vec<AlertItem> {
        let totals = stream_totals(txs);
        let mut alerts = Vec::new();
        for &stream in RevenueStream::ALL {
            let StreamTotals { declared, remitted } = totals[stream];
            // Zero-declared streams are skipped.
            if declared <= 0.0 {
                continue;
            }
            let ratio = remitted / declared;
            if ratio < 1.0 - self.threshold {
                alerts.push(AlertItem {
                    id: format!("stream-{stream}"),
                    severity: if ratio < HIGH_SEVERITY_RATIO {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                    message: format!("Under-remittance detected for {}", stream.label()),
                    date: now,
                    variance: round2(declared - remitted),
                });
            }
        }
        alerts
    }
}

/// Flags individual transactions with a shortfall above [`LARGE_VARIANCE_LIMIT`].
pub struct LargeVarianceRule;

impl AlertRule for LargeVarianceRule {
    fn name(&self) -> &str { "large_variance" }
    fn detect(&self, txs: &[Transaction], _now: DateTime<Utc>) -> Vec<AlertItem> {
        txs.iter()
            .filter(|tx| tx.shortfall() > LARGE_VARIANCE_LIMIT)
            .map(|tx| AlertItem {
                id: format!("txn-{}", tx.id),
                severity: Severity::High,
                message: format!("Large variance on {} transaction", tx.stream),
                date: tx.date,
                variance: round2(tx.shortfall()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PaymentMethod;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn make_test_tx(id: &str, stream: RevenueStream, declared: f64, remitted: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 20, 8, 30, 0).unwrap(),
            stream,
            payment_method: PaymentMethod::Cash,
            amount_declared: declared,
            amount_remitted: remitted,
            room_nights: None,
            remarks: None,
        }
    }

    fn stream_rule() -> StreamShortfallRule {
        StreamShortfallRule { threshold: 0.08 }
    }

    #[test]
    fn stream_at_threshold_no_alert() {
        let txs = vec![make_test_tx("1", RevenueStream::Bar, 1000.0, 920.0)];
        assert!(stream_rule().detect(&txs, now()).is_empty());
    }

    #[test]
    fn stream_just_below_threshold_medium() {
        let txs = vec![make_test_tx("1", RevenueStream::Bar, 1000.0, 919.99)];
        let alerts = stream_rule().detect(&txs, now());
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.id, "stream-bar");
        assert_eq!(alert.severity, Severity::Medium);
        assert!((alert.variance - 80.01).abs() < 1e-9);
        assert_eq!(alert.date, now());
        assert_eq!(alert.message, "Under-remittance detected for bar");
    }

    #[test]
    fn stream_below_eighty_percent_high() {
        let txs = vec![make_test_tx("1", RevenueStream::EventHosting, 1000.0, 799.0)];
        let alerts = stream_rule().detect(&txs, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].message, "Under-remittance detected for event hosting");
    }

    #[test]
    fn stream_exactly_eighty_percent_medium() {
        let txs = vec![make_test_tx("1", RevenueStream::Misc, 1000.0, 800.0)];
        let alerts = stream_rule().detect(&txs, now());
        assert_eq!(alerts[0].severity, Severity::Medium);
    }

    #[test]
    fn stream_sums_across_transactions() {
        let txs = vec![
            make_test_tx("1", RevenueStream::Restaurant, 500.0, 500.0),
            make_test_tx("2", RevenueStream::Restaurant, 500.0, 400.0),
        ];
        let alerts = stream_rule().detect(&txs, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].variance, 100.0);
    }

    #[test]
    fn zero_declared_stream_skipped() {
        let txs = vec![make_test_tx("1", RevenueStream::Bar, 0.0, 0.0)];
        assert!(stream_rule().detect(&txs, now()).is_empty());
    }

    #[test]
    fn stream_alerts_in_canonical_order() {
        let txs = vec![
            make_test_tx("1", RevenueStream::Misc, 100.0, 50.0),
            make_test_tx("2", RevenueStream::RoomBooking, 100.0, 50.0),
        ];
        let ids: Vec<String> = stream_rule()
            .detect(&txs, now())
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["stream-room_booking", "stream-misc"]);
    }

    #[test]
    fn custom_threshold() {
        let txs = vec![make_test_tx("1", RevenueStream::Bar, 1000.0, 960.0)];
        assert!(stream_rule().detect(&txs, now()).is_empty());
        let strict = StreamShortfallRule { threshold: 0.02 };
        assert_eq!(strict.detect(&txs, now()).len(), 1);
    }

    #[test]
    fn large_variance_above_limit() {
        let txs = vec![make_test_tx("abc", RevenueStream::RoomBooking, 1000.0, 799.0)];
        let alerts = LargeVarianceRule.detect(&txs, now());
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.id, "txn-abc");
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.variance, 201.0);
        assert_eq!(alert.date, txs[0].date);
        assert_eq!(alert.message, "Large variance on room_booking transaction");
    }

    #[test]
    fn large_variance_at_limit_no_alert() {
        let txs = vec![make_test_tx("abc", RevenueStream::Bar, 1000.0, 800.0)];
        assert!(LargeVarianceRule.detect(&txs, now()).is_empty());
    }

    #[test]
    fn large_variance_ignores_over_remittance() {
        let txs = vec![make_test_tx("abc", RevenueStream::Bar, 100.0, 900.0)];
        assert!(LargeVarianceRule.detect(&txs, now()).is_empty());
    }

    #[test]
    fn default_rules_count() {
        assert_eq!(default_rules(0.08).len(), 2);
    }

    #[test]
    fn all_rules_names_unique() {
        let rules = default_rules(0.08);
        let mut names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
        let len = names.len();
        names.sort();
        names.dedup();
        assert_eq!(len, names.len());
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::metrics::stream_totals;
use crate::core::{AlertItem, PaymentMethod, RevenueStream, Severity, Transaction, round2};
use crate::signals::detect;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report type: {0}")]
    UnknownKind(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// Exportable report types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Revenue,
    Transactions,
    Remittance,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Revenue => "revenue",
            ReportKind::Transactions => "transactions",
            ReportKind::Remittance => "remittance",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}-report.csv", self.as_str())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(ReportKind::Revenue),
            "transactions" => Ok(ReportKind::Transactions),
            "remittance" => Ok(ReportKind::Remittance),
            other => Err(ReportError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRow {
    date: DateTime<Utc>,
    stream: RevenueStream,
    payment_method: PaymentMethod,
    amount_declared: f64,
    amount_remitted: f64,
    variance: f64,
}

#[derive(Serialize)]
struct RevenueRow {
    stream: RevenueStream,
    declared: f64,
    remitted: f64,
    variance: f64,
}

#[derive(Serialize)]
struct RemittanceRow<'a> {
    id: &'a str,
    severity: Severity,
    date: DateTime<Utc>,
    variance: f64,
    message: &'a str,
}

/// Render a CSV report over `txs`. `threshold` only affects remittance reports.
pub fn render_report(
    kind: ReportKind,
    txs: &[Transaction],
    threshold: f64,
) -> Result<String, ReportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    match kind {
        ReportKind::Transactions => {
            for tx in txs {
                wtr.serialize(TransactionRow {
                    date: tx.date,
                    stream: tx.stream,
                    payment_method: tx.payment_method,
                    amount_declared: tx.amount_declared,
                    amount_remitted: tx.amount_remitted,
                    variance: round2(tx.shortfall()),
                })?;
            }
        }
        ReportKind::Revenue => {
            for (stream, totals) in stream_totals(txs).iter() {
                wtr.serialize(RevenueRow {
                    stream,
                    declared: round2(totals.declared),
                    remitted: round2(totals.remitted),
                    variance: round2((totals.declared - totals.remitted).max(0.0)),
                })?;
            }
        }
        ReportKind::Remittance => {
            let alerts: Vec<AlertItem> = detect(txs, threshold);
            for alert in &alerts {
                wtr.serialize(RemittanceRow {
                    id: &alert.id,
                    severity: alert.severity,
                    date: alert.date,
                    variance: alert.variance,
                    message: &alert.message,
                })?;
            }
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ReportError::Buffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Buffer(e.to_string()))
}

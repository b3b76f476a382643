use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::error::ApiError;
use crate::config::GeneratorConfig;

/// Raw range parameters as they arrive on the query string.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub seed: Option<String>,
    /// Transaction search filter.
    pub q: Option<String>,
}

/// A range with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub seed: i64,
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl RangeParams {
    /// Apply defaults: `to = now`, `from = to - lookback_days`, configured seed.
    /// Ranges longer than `max_range_days` are rejected; reversed ones pass.
    pub fn resolve(&self, defaults: &GeneratorConfig, now: DateTime<Utc>) -> Result<ResolvedRange, ApiError> {
        let to = match non_empty(&self.to) {
            Some(raw) => parse_timestamp(raw).ok_or_else(|| invalid("to", raw))?,
            None => now,
        };
        let from = match non_empty(&self.from) {
            Some(raw) => parse_timestamp(raw).ok_or_else(|| invalid("from", raw))?,
            None => to
                .checked_sub_signed(defaults.lookback())
                .ok_or_else(|| invalid("to", &to.to_rfc3339()))?,
        };
        if from <= to {
            let days = to.signed_duration_since(from).num_days() + 1;
            if days > defaults.max_range_days {
                return Err(ApiError::RangeTooLong {
                    days,
                    max: defaults.max_range_days,
                });
            }
        }
        let seed = match non_empty(&self.seed) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| invalid("seed", raw))?,
            None => defaults.default_seed,
        };
        Ok(ResolvedRange { from, to, seed })
    }

    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn invalid(field: &'static str, raw: &str) -> ApiError {
    ApiError::InvalidParam {
        field,
        value: raw.to_string(),
    }
}

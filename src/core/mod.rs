pub mod generator;
pub mod metrics;
pub mod rng;

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Round to 2 fractional digits.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A closed set of variants that can key a [`Breakdown`].
pub trait Category: Copy + Ord + fmt::Debug + 'static {
    /// All variants in canonical order.
    const ALL: &'static [Self];

    fn index(self) -> usize;
}

/// Revenue category of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueStream {
    RoomBooking,
    ServiceCharge,
    Restaurant,
    Bar,
    EventHosting,
    Misc,
}

impl RevenueStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueStream::RoomBooking => "room_booking",
            RevenueStream::ServiceCharge => "service_charge",
            RevenueStream::Restaurant => "restaurant",
            RevenueStream::Bar => "bar",
            RevenueStream::EventHosting => "event_hosting",
            RevenueStream::Misc => "misc",
        }
    }

    /// Human-readable name ("room booking").
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl Category for RevenueStream {
    const ALL: &'static [Self] = &[
        RevenueStream::RoomBooking,
        RevenueStream::ServiceCharge,
        RevenueStream::Restaurant,
        RevenueStream::Bar,
        RevenueStream::EventHosting,
        RevenueStream::Misc,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RevenueStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl Category for PaymentMethod {
    const ALL: &'static [Self] = &[
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
        PaymentMethod::Wallet,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthetic financial event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    pub stream: RevenueStream,
    pub payment_method: PaymentMethod,
    pub amount_declared: f64,
    pub amount_remitted: f64,
    /// Only set for room bookings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Transaction {
    /// Declared minus remitted (not floored).
    pub fn shortfall(&self) -> f64 {
        self.amount_declared - self.amount_remitted
    }
}

/// Declared/remitted sums for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamTotals {
    pub declared: f64,
    pub remitted: f64,
}

/// A total map from every variant of `K` to a `V`.
///
/// Indexing by variant never fails and every key is serialized, so consumers
/// always see the full set of buckets.
#[derive(Clone, PartialEq)]
pub struct Breakdown<K: Category, V> {
    values: Vec<V>,
    _key: PhantomData<K>,
}

impl<K: Category, V: Default> Breakdown<K, V> {
    pub fn zeroed() -> Self {
        Self {
            values: K::ALL.iter().map(|_| V::default()).collect(),
            _key: PhantomData,
        }
    }
}

impl<K: Category, V: Default> Default for Breakdown<K, V> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<K: Category, V> Breakdown<K, V> {
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        K::ALL.iter().copied().zip(self.values.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }
}

impl<K: Category, V> Index<K> for Breakdown<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        &self.values[key.index()]
    }
}

impl<K: Category, V> IndexMut<K> for Breakdown<K, V> {
    fn index_mut(&mut self, key: K) -> &mut V {
        &mut self.values[key.index()]
    }
}

impl<K: Category, V: fmt::Debug> fmt::Debug for Breakdown<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Category + Serialize, V: Serialize> Serialize for Breakdown<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(&key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for Breakdown<K, V>
where
    K: Category + Deserialize<'de>,
    V: Default + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<K, V>::deserialize(deserializer)?;
        let mut out = Self::zeroed();
        for (key, value) in raw {
            out[key] = value;
        }
        Ok(out)
    }
}

/// Aggregate view over a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total_declared: f64,
    pub total_remitted: f64,
    pub remittance_variance: f64,
    pub occupancy_rate: f64, // 0..=1
    pub gop_margin: f64,     // 0 or 0.2..=0.65
    pub by_stream: Breakdown<RevenueStream, StreamTotals>,
    pub by_payment_method: Breakdown<PaymentMethod, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// A detected under-remittance anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertItem {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub date: DateTime<Utc>,
    /// Shortfall, rounded to cents.
    pub variance: f64,
}

/// One day of the declared/remitted timeseries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub declared: f64,
    pub remitted: f64,
    /// Whole percent of offered room-nights; not capped at 100.
    pub occupancy: u32,
}

/// Case-insensitive search over stream, payment method and remarks.
pub fn matches_query(tx: &Transaction, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    tx.stream.as_str().contains(&q)
        || tx.payment_method.as_str().contains(&q)
        || tx
            .remarks
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(&q)
}

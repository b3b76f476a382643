use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use crate::core::{
    Breakdown, DailyPoint, MetricsSummary, PaymentMethod, RevenueStream, StreamTotals, Transaction,
    round2,
};

/// Room-nights assumed on offer for every booking transaction.
pub const ROOM_NIGHTS_PER_BOOKING: u32 = 3;

const GOP_BASE: f64 = 0.4;
const GOP_COST_SHARE: f64 = 0.6;
const GOP_MIN: f64 = 0.2;
const GOP_MAX: f64 = 0.65;

/// Per-stream declared/remitted sums.
pub fn stream_totals(transactions: &[Transaction]) -> Breakdown<RevenueStream, StreamTotals> {
    let mut by_stream: Breakdown<RevenueStream, StreamTotals> = Breakdown::zeroed();
    for tx in transactions {
        let bucket = &mut by_stream[tx.stream];
        bucket.declared += tx.amount_declared;
        bucket.remitted += tx.amount_remitted;
    }
    by_stream
}

/// Occupancy accumulator: booked vs offered room-nights.
#[derive(Debug, Default, Clone, Copy)]
struct Occupancy {
    booked: u64,
    offered: u64,
}

impl Occupancy {
    fn record(&mut self, tx: &Transaction) {
        if tx.stream == RevenueStream::RoomBooking {
            self.booked += u64::from(tx.room_nights.unwrap_or(0));
            self.offered += u64::from(ROOM_NIGHTS_PER_BOOKING);
        }
    }

    fn ratio(&self) -> f64 {
        if self.offered == 0 {
            return 0.0;
        }
        self.booked as f64 / self.offered as f64
    }

    /// Booked share of capacity, capped at 1.
    fn rate(&self) -> f64 {
        self.ratio().min(1.0)
    }

    /// Uncapped whole percent, as plotted on the timeseries.
    fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }
}

/// Synthetic gross-operating-profit proxy.
pub fn gop_margin(total_declared: f64, total_remitted: f64) -> f64 {
    if total_declared == 0.0 {
        return 0.0;
    }
    (GOP_BASE + (total_remitted - total_declared * GOP_COST_SHARE) / total_declared)
        .clamp(GOP_MIN, GOP_MAX)
}

/// Reduce transactions into totals, breakdowns, occupancy and margin.
///
/// `from`/`to` are the first and last transaction dates in input order; an
/// empty input reports the current time for both.
pub fn aggregate(transactions: &[Transaction]) -> MetricsSummary {
    let (Some(first), Some(last)) = (transactions.first(), transactions.last()) else {
        let now = Utc::now();
        return MetricsSummary {
            from: now,
            to: now,
            total_declared: 0.0,
            total_remitted: 0.0,
            remittance_variance: 0.0,
            occupancy_rate: 0.0,
            gop_margin: 0.0,
            by_stream: Breakdown::zeroed(),
            by_payment_method: Breakdown::zeroed(),
        };
    };

    let mut by_payment_method: Breakdown<PaymentMethod, f64> = Breakdown::zeroed();
    let mut total_declared = 0.0;
    let mut total_remitted = 0.0;
    let mut occupancy = Occupancy::default();

    for tx in transactions {
        by_payment_method[tx.payment_method] += tx.amount_declared;
        total_declared += tx.amount_declared;
        total_remitted += tx.amount_remitted;
        occupancy.record(tx);
    }

    MetricsSummary {
        from: first.date,
        to: last.date,
        total_declared,
        total_remitted,
        remittance_variance: (total_declared - total_remitted).max(0.0),
        occupancy_rate: occupancy.rate(),
        gop_margin: gop_margin(total_declared, total_remitted),
        by_stream: stream_totals(transactions),
        by_payment_method,
    }
}

/// Declared/remitted/occupancy per UTC calendar day, oldest first.
pub fn daily_series(transactions: &[Transaction]) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, (StreamTotals, Occupancy)> = BTreeMap::new();
    for tx in transactions {
        let (totals, occupancy) = days.entry(tx.date.date_naive()).or_default();
        totals.declared += tx.amount_declared;
        totals.remitted += tx.amount_remitted;
        occupancy.record(tx);
    }

    days.into_iter()
        .map(|(date, (totals, occupancy))| DailyPoint {
            date,
            declared: round2(totals.declared),
            remitted: round2(totals.remitted),
            occupancy: occupancy.percent(),
        })
        .collect()
}

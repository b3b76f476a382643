use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::core::rng::{RandomSource, SeededRandom};
use crate::core::{Category, PaymentMethod, RevenueStream, Transaction, round2};

pub const DEFAULT_SEED: i64 = 42;
pub const DEFAULT_MAX_PER_DAY: u32 = 60;

/// Every day carries at least this many transactions.
const MIN_PER_DAY: u32 = 10;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const UNDER_REMITTANCE_PROBABILITY: f64 = 0.2;
const REMARK_PROBABILITY: f64 = 0.05;

/// Base amount range `(low, width)` for a stream, before jitter.
fn base_range(stream: RevenueStream) -> (f64, f64) {
    match stream {
        RevenueStream::RoomBooking => (15_000.0, 25_000.0),
        RevenueStream::EventHosting => (50_000.0, 150_000.0),
        _ => (2_000.0, 8_000.0),
    }
}

/// Generate synthetic transactions for every day in `[from, to]`.
///
/// Deterministic for a given `(from, to, seed, max_per_day)`. A reversed range
/// yields an empty vector.
pub fn generate(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    seed: i64,
    max_per_day: u32,
) -> Vec<Transaction> {
    generate_with(&mut SeededRandom::new(seed), from, to, max_per_day)
}

/// Same as [`generate`] but drawing from a caller-supplied source.
pub fn generate_with<R: RandomSource>(
    rng: &mut R,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    max_per_day: u32,
) -> Vec<Transaction> {
    let mut out = Vec::new();
    let mut day = from;
    while day <= to {
        let count = (rng.next_f64() * max_per_day as f64).floor() as u32 + MIN_PER_DAY;
        let day_ms = day.timestamp_millis();
        for i in 0..count {
            out.push(generate_one(rng, day, day_ms, i));
        }
        day += Duration::days(1);
    }
    debug!(count = out.len(), %from, %to, "Generated transactions");
    out
}

fn generate_one<R: RandomSource>(
    rng: &mut R,
    day: DateTime<Utc>,
    day_ms: i64,
    index: u32,
) -> Transaction {
    let stream = *rng.pick(RevenueStream::ALL);
    let payment_method = *rng.pick(PaymentMethod::ALL);

    let (low, width) = base_range(stream);
    let base = low + rng.next_f64() * width;
    let declared = round2(base * (0.9 + rng.next_f64() * 0.6));

    let under_factor = if rng.next_f64() < UNDER_REMITTANCE_PROBABILITY {
        0.85 + rng.next_f64() * 0.1
    } else {
        1.0
    };
    let remitted = round2(declared * under_factor);

    let offset_ms = (rng.next_f64() * DAY_MS as f64).floor() as i64;
    let date = day + Duration::milliseconds(offset_ms);

    let room_nights = match stream {
        RevenueStream::RoomBooking => Some((1.0 + rng.next_f64() * 3.0).floor() as u32),
        _ => None,
    };

    let remarks = if rng.next_f64() < REMARK_PROBABILITY {
        Some("Manual adjustment applied".to_string())
    } else if rng.next_f64() < REMARK_PROBABILITY {
        Some("Complimentary add-on".to_string())
    } else {
        None
    };

    Transaction {
        id: format!("{day_ms}-{index}"),
        date,
        stream,
        payment_method,
        amount_declared: declared,
        amount_remitted: remitted,
        room_nights,
        remarks,
    }
}

/// Modulus of the Park-Miller generator (2^31 - 1).
const MODULUS: i64 = 2_147_483_647;
const MULTIPLIER: i64 = 16_807;

/// A source of uniformly distributed floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Pick one element of a non-empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = (self.next_f64() * items.len() as f64) as usize;
        &items[idx.min(items.len() - 1)]
    }
}

/// Minimal-standard linear congruential generator.
///
/// Non-positive seeds are shifted up by `MODULUS - 1` after the remainder is
/// taken. Seeds congruent to `1 - MODULUS` land on state 0 and yield a stream
/// of zeros; the rule is kept as-is so existing seeds stay reproducible.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: i64,
}

impl SeededRandom {
    pub fn new(seed: i64) -> Self {
        let mut state = seed % MODULUS;
        if state <= 0 {
            state += MODULUS - 1;
        }
        Self { state }
    }

    pub fn state(&self) -> i64 {
        self.state
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER) % MODULUS;
        self.state as f64 / MODULUS as f64
    }
}

use crate::model::MAX_COUNT_LIMITATION;

/// Numeric entry for the top-N count.
///
/// Confirmed values are clamped to `[min, max]`. A blank or unparsable entry
/// reverts to the last confirmed value instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountInput {
    confirmed: usize,
    min: usize,
    max: usize,
}

impl CountInput {
    pub fn new(confirmed: usize) -> Self {
        Self::with_bounds(confirmed, 0, MAX_COUNT_LIMITATION)
    }

    pub fn with_bounds(confirmed: usize, min: usize, max: usize) -> Self {
        Self {
            confirmed: confirmed.clamp(min, max),
            min,
            max,
        }
    }

    pub fn value(&self) -> usize {
        self.confirmed
    }

    pub fn confirm(&mut self, raw: &str) -> usize {
        let raw = raw.trim();
        if raw.is_empty() {
            return self.confirmed;
        }
        let Ok(number) = raw.parse::<f64>() else {
            return self.confirmed;
        };
        if number.is_nan() {
            return self.confirmed;
        }
        // Float-to-int casts saturate, so infinities land on the bounds.
        let clamped = number.clamp(self.min as f64, self.max as f64);
        self.confirmed = clamped.trunc() as usize;
        self.confirmed
    }
}

use rust_decimal::{Decimal, RoundingStrategy};

pub const PERFORMANCE_PRECISION: u32 = 1;
pub const QUALITY_PRECISION: u32 = 1;
pub const AVERAGE_SCORE_PRECISION: u32 = 2;
/// Precision for per-period and overall averages.
pub const AGGREGATE_PRECISION: u32 = 2;

/// Rounds to `decimals` places, sending exact halves away from zero.
pub fn round_half_up(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Mean of `values` at aggregate precision, or `None` when there is nothing to average.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let sum: Decimal = values.iter().copied().sum();
    let mean = sum / Decimal::from(values.len());
    Some(round_half_up(mean, AGGREGATE_PRECISION))
}

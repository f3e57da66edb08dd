use rust_decimal::Decimal;

/// Default RSI lookback.
pub const RSI_PERIOD: usize = 14;

/// Wilder's relative strength index over `closes` (oldest first).
///
/// Seeds the averages with a simple mean of the first `period` changes, then
/// applies Wilder smoothing over the rest. Requires at least `period + 1`
/// closes; returns `None` otherwise. A series with no losses reads 100, a
/// completely flat series reads 50.
#[must_use]
pub fn rsi(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let period_dec = Decimal::from(period);
    let mut changes = closes.windows(2).map(|w| w[1] - w[0]);

    let mut avg_gain = Decimal::ZERO;
    let mut avg_loss = Decimal::ZERO;
    for change in changes.by_ref().take(period) {
        if change > Decimal::ZERO {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period_dec;
    avg_loss /= period_dec;

    let smoothing = period_dec - Decimal::ONE;
    for change in changes {
        let (gain, loss) = if change > Decimal::ZERO {
            (change, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -change)
        };
        avg_gain = (avg_gain * smoothing + gain) / period_dec;
        avg_loss = (avg_loss * smoothing + loss) / period_dec;
    }

    if avg_loss.is_zero() {
        return Some(if avg_gain.is_zero() {
            Decimal::from(50)
        } else {
            Decimal::ONE_HUNDRED
        });
    }

    let rs = avg_gain / avg_loss;
    Some(Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (Decimal::ONE + rs))
}

/// Percent change from `reference` to `current`; `None` when `reference` is zero.
#[must_use]
pub fn percent_change(current: Decimal, reference: Decimal) -> Option<Decimal> {
    if reference.is_zero() {
        return None;
    }
    Some((current - reference) / reference * Decimal::ONE_HUNDRED)
}

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary or percentage value to two decimal places, half-up.
///
/// Call this once, on the value that leaves the core. Sums and ratios are
/// carried at full precision until then.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_midpoints_up() {
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
        assert_eq!(round_money(dec!(0.005)), dec!(0.01));
        assert_eq!(round_money(dec!(1.234)), dec!(1.23));
    }

    #[test]
    fn rounding_once_differs_from_rounding_each_term() {
        let terms = [dec!(0.004), dec!(0.004), dec!(0.004)];
        let once = round_money(terms.iter().copied().sum());
        let compounded: Decimal = terms.iter().map(|t| round_money(*t)).sum();
        assert_eq!(once, dec!(0.01));
        assert_eq!(compounded, dec!(0));
    }

    #[test]
    fn safe_div_defaults_to_zero() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
    }
}

//! Rounding and clamping helpers shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, half away from zero (`0.005` → `0.01`).
///
/// Only the result assembler rounds; everything upstream keeps full
/// precision.
///
/// # Arguments
///
/// * `value` - The amount to round
///
/// # Returns
///
/// The amount rounded to two decimal places.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(3075.325)), dec!(3075.33));
/// assert_eq!(round_half_up(dec!(3075.324)), dec!(3075.32));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps negative amounts (including `-0`) to zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(-12.50)), dec!(0));
/// assert_eq!(non_negative(dec!(12.50)), dec!(12.50));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn round_half_up_rounds_midpoint_up() {
        assert_eq!(round_half_up(dec!(1629.005)), dec!(1629.01));
    }

    #[test]
    fn round_half_up_keeps_sub_midpoint_down() {
        assert_eq!(round_half_up(dec!(1629.0049999)), dec!(1629.00));
    }

    #[test]
    fn round_half_up_carries_into_units() {
        assert_eq!(round_half_up(dec!(9999.995)), dec!(10000.00));
    }

    #[test]
    fn non_negative_maps_zero_and_negative_zero_to_zero() {
        assert_eq!(non_negative(dec!(0)), Decimal::ZERO);
        assert!(!non_negative(dec!(-0.00)).is_sign_negative());
    }
}

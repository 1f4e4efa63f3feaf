//! Interest accumulation factors

use crate::math::{Ray, TryAdd, TryDiv, TryMul};
use solana_program::{clock::SECONDS_PER_DAY, program_error::ProgramError};

/// Seconds in a 365 day year
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

/// Simple interest factor `1 + rate * elapsed / year`
pub fn calculate_linear_interest(rate: Ray, elapsed: u64) -> Result<Ray, ProgramError> {
    rate.try_mul(elapsed)?
        .try_div(SECONDS_PER_YEAR)?
        .try_add(Ray::one())
}

/// Compounded interest factor, `(1 + rate / year) ^ elapsed` expanded by the binomial
/// series and truncated after the cubic term. The result never exceeds the exact value.
pub fn calculate_compounded_interest(rate: Ray, elapsed: u64) -> Result<Ray, ProgramError> {
    if elapsed == 0 {
        return Ok(Ray::one());
    }

    let exp_minus_one = elapsed - 1;
    let exp_minus_two = elapsed.saturating_sub(2);

    let rate_per_second = rate.try_div(SECONDS_PER_YEAR)?;
    let base_power_two = rate_per_second.try_mul(rate_per_second)?;
    let base_power_three = base_power_two.try_mul(rate_per_second)?;

    let second_term = base_power_two
        .try_mul(elapsed)?
        .try_mul(exp_minus_one)?
        .try_div(2)?;
    let third_term = base_power_three
        .try_mul(elapsed)?
        .try_mul(exp_minus_one)?
        .try_mul(exp_minus_two)?
        .try_div(6)?;

    Ray::one()
        .try_add(rate_per_second.try_mul(elapsed)?)?
        .try_add(second_term)?
        .try_add(third_term)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::TrySub;
    use proptest::prelude::*;

    fn exp_reference(rate: Ray, elapsed: u64) -> Ray {
        let x = rate.try_mul(elapsed).unwrap().try_div(SECONDS_PER_YEAR).unwrap();
        let mut term = Ray::one();
        let mut sum = Ray::one();
        for k in 1..=8u64 {
            term = term.try_mul(x).unwrap().try_div(k).unwrap();
            sum = sum.try_add(term).unwrap();
        }
        sum
    }

    #[test]
    fn test_zero_elapsed() {
        assert_eq!(calculate_compounded_interest(Ray::from_percent(50), 0).unwrap(), Ray::one());
        assert_eq!(calculate_linear_interest(Ray::from_percent(50), 0).unwrap(), Ray::one());
    }

    #[test]
    fn test_linear_full_year() {
        assert_eq!(
            calculate_linear_interest(Ray::from_percent(10), SECONDS_PER_YEAR).unwrap(),
            Ray::from_percent(110)
        );
    }

    #[test]
    fn test_compounded_one_day_close_to_exponential() {
        let rate = Ray::from_percent(5);
        let approx = calculate_compounded_interest(rate, SECONDS_PER_DAY).unwrap();
        let reference = exp_reference(rate, SECONDS_PER_DAY);

        assert!(approx <= reference);
        assert!(approx > calculate_linear_interest(rate, SECONDS_PER_DAY).unwrap());
        // relative error under 1e-9
        let diff = reference.try_sub(approx).unwrap();
        assert!(diff.try_mul(1_000_000_000u64).unwrap() < reference);
    }

    proptest! {
        #[test]
        fn compounded_grows_with_time(
            rate in 0..=100 * crate::math::RAY,
            elapsed in 0..=5 * SECONDS_PER_YEAR,
        ) {
            let rate = Ray::from_scaled_val(rate);
            let now = calculate_compounded_interest(rate, elapsed).unwrap();
            let later = calculate_compounded_interest(rate, elapsed + 1).unwrap();
            prop_assert!(now >= Ray::one());
            prop_assert!(later >= now);
        }

        #[test]
        fn linear_grows_with_time(
            rate in 0..=100 * crate::math::RAY,
            elapsed in 0..=5 * SECONDS_PER_YEAR,
        ) {
            let rate = Ray::from_scaled_val(rate);
            prop_assert!(
                calculate_linear_interest(rate, elapsed + 1).unwrap()
                    >= calculate_linear_interest(rate, elapsed).unwrap()
            );
        }
    }
}

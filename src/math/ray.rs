//! Ray fixed point, 27 digits of precision. Used for rates and indices.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use crate::{
    error::LendingError,
    math::common::*,
};
use solana_program::program_error::ProgramError;
use std::{convert::TryFrom, fmt};
use uint::construct_uint;

// U256 with 256 bits consisting of 4 x 64-bit words
construct_uint! {
    pub struct U256(4);
}

/// Large decimal values, precise to 27 digits
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Ray(pub U256);

impl Ray {
    /// One
    pub fn one() -> Self {
        Self(Self::ray())
    }

    /// Zero
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    // OPTIMIZE: use const slice when fixed in BPF toolchain
    fn ray() -> U256 {
        U256::from(RAY)
    }

    /// Create scaled ray from percent value
    pub fn from_percent(percent: u8) -> Self {
        Self(U256::from(percent as u128 * PERCENT_SCALER))
    }

    /// Create scaled ray from basis points
    pub fn from_bips(bips: u16) -> Self {
        Self(U256::from(bips as u128 * BIPS_SCALER))
    }

    /// Return raw scaled value if it fits within u128
    #[allow(clippy::wrong_self_convention)]
    pub fn to_scaled_val(&self) -> Result<u128, ProgramError> {
        Ok(u128::try_from(self.0).map_err(|_| LendingError::MathOverflow)?)
    }

    /// Create ray from scaled value
    pub fn from_scaled_val(scaled_val: u128) -> Self {
        Self(U256::from(scaled_val))
    }

    /// Ratio of two integers, truncated
    pub fn try_from_ratio(numerator: u128, denominator: u128) -> Result<Self, ProgramError> {
        Ok(Self(
            U256::from(numerator)
                .checked_mul(Self::ray())
                .ok_or(LendingError::MathOverflow)?
                .checked_div(U256::from(denominator))
                .ok_or(LendingError::MathOverflow)?,
        ))
    }

    /// Apply a basis point factor, truncated
    pub fn try_percent_mul(self, bips: u64) -> Result<Self, ProgramError> {
        self.try_mul(bips)?.try_div(PERCENTAGE_FACTOR)
    }

    /// Whether value is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= RAY_SCALE {
            scaled_val.insert_str(0, &vec!["0"; RAY_SCALE - scaled_val.len()].join(""));
            scaled_val.insert_str(0, "0.");
        } else {
            scaled_val.insert(scaled_val.len() - RAY_SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl TryAdd for Ray {
    fn try_add(self, rhs: Self) -> Result<Self, ProgramError> {
        Ok(Self(
            self.0
                .checked_add(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TrySub for Ray {
    fn try_sub(self, rhs: Self) -> Result<Self, ProgramError> {
        Ok(Self(
            self.0
                .checked_sub(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryDiv<u64> for Ray {
    fn try_div(self, rhs: u64) -> Result<Self, ProgramError> {
        Ok(Self(
            self.0
                .checked_div(U256::from(rhs))
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryDiv<Ray> for Ray {
    fn try_div(self, rhs: Self) -> Result<Self, ProgramError> {
        Ok(Self(
            self.0
                .checked_mul(Self::ray())
                .ok_or(LendingError::MathOverflow)?
                .checked_div(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryMul<u64> for Ray {
    fn try_mul(self, rhs: u64) -> Result<Self, ProgramError> {
        Ok(Self(
            self.0
                .checked_mul(U256::from(rhs))
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryMul<Ray> for Ray {
    fn try_mul(self, rhs: Self) -> Result<Self, ProgramError> {
        Ok(Self(
            self.0
                .checked_mul(rhs.0)
                .ok_or(LendingError::MathOverflow)?
                .checked_div(Self::ray())
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

/// Token amount divided by an index, truncated. Converts a real amount into scaled units.
pub fn amount_div_ray(amount: u128, index: Ray) -> Result<u128, ProgramError> {
    let scaled = U256::from(amount)
        .checked_mul(Ray::ray())
        .ok_or(LendingError::MathOverflow)?
        .checked_div(index.0)
        .ok_or(LendingError::MathOverflow)?;
    Ok(u128::try_from(scaled).map_err(|_| LendingError::MathOverflow)?)
}

/// Token amount multiplied by a ray factor, truncated
pub fn amount_mul_ray(amount: u128, factor: Ray) -> Result<u128, ProgramError> {
    let real = U256::from(amount)
        .checked_mul(factor.0)
        .ok_or(LendingError::MathOverflow)?
        .checked_div(Ray::ray())
        .ok_or(LendingError::MathOverflow)?;
    Ok(u128::try_from(real).map_err(|_| LendingError::MathOverflow)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scaler() {
        assert_eq!(U256::exp10(RAY_SCALE), Ray::ray());
        assert_eq!(Ray::from_percent(100), Ray::one());
        assert_eq!(Ray::from_bips(10_000), Ray::one());
        assert_eq!(Ray::from_bips(500), Ray::from_percent(5));
    }

    #[test]
    fn test_display() {
        assert_eq!(Ray::from_percent(5).to_string(), "0.050000000000000000000000000");
        assert_eq!(Ray::from_scaled_val(3 * RAY).to_string(), "3.000000000000000000000000000");
    }

    #[test]
    fn test_ratio_truncates() {
        let third = Ray::try_from_ratio(1, 3).unwrap();
        assert_eq!(third.to_scaled_val().unwrap(), 333_333_333_333_333_333_333_333_333);
        assert!(Ray::try_from_ratio(1, 0).is_err());
    }

    #[test]
    fn test_amount_scaling() {
        let index = Ray::from_scaled_val(RAY + RAY / 10);
        // 110 / 1.1 = 100
        assert_eq!(amount_div_ray(110, index).unwrap(), 100);
        // 100 / 1.1 = 90.90..
        assert_eq!(amount_div_ray(100, index).unwrap(), 90);
        assert_eq!(amount_mul_ray(90, index).unwrap(), 99);
        assert!(amount_div_ray(1, Ray::zero()).is_err());
    }

    #[test]
    fn test_packable_ceiling() {
        assert!(Ray::from_scaled_val(u128::MAX).try_add(Ray::from_scaled_val(1)).unwrap().to_scaled_val().is_err());
    }

    proptest! {
        #[test]
        fn scaled_amount_never_exceeds_real(
            amount in 0..=u64::MAX as u128,
            index in RAY..=10 * RAY,
        ) {
            let index = Ray::from_scaled_val(index);
            let scaled = amount_div_ray(amount, index).unwrap();
            prop_assert!(amount_mul_ray(scaled, index).unwrap() <= amount);
        }
    }
}

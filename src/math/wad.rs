//! Wad fixed point, 18 digits of precision. Used for token amounts.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use crate::{
    error::LendingError,
    math::{common::*, Ray, U256},
};
use solana_program::program_error::ProgramError;
use std::{convert::TryFrom, fmt};
use uint::construct_uint;

// U192 with 192 bits consisting of 3 x 64-bit words
construct_uint! {
    pub struct U192(3);
}

/// Token amount, precise to 18 digits
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Wad(pub U192);

impl Wad {
    /// Return raw scaled value if it fits within u128
    #[allow(clippy::wrong_self_convention)]
    pub fn to_scaled_val(&self) -> Result<u128, ProgramError> {
        Ok(u128::try_from(self.0).map_err(|_| LendingError::MathOverflow)?)
    }

    /// Create wad from scaled value
    pub fn from_scaled_val(scaled_val: u128) -> Self {
        Self(U192::from(scaled_val))
    }

    /// Widen to ray precision
    pub fn try_to_ray(&self) -> Result<Ray, ProgramError> {
        let scaled = self.to_scaled_val()?;
        Ok(Ray(U256::from(scaled)
            .checked_mul(U256::from(WAD_RAY_RATIO))
            .ok_or(LendingError::MathOverflow)?))
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            scaled_val.insert_str(0, &vec!["0"; SCALE - scaled_val.len()].join(""));
            scaled_val.insert_str(0, "0.");
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_ray() {
        assert_eq!(U192::exp10(SCALE), U192::from(WAD));
        assert_eq!(Wad::from_scaled_val(WAD as u128).try_to_ray().unwrap(), Ray::one());
        assert_eq!(
            Wad::from_scaled_val(5 * WAD as u128 / 100).try_to_ray().unwrap(),
            Ray::from_percent(5)
        );
        assert_eq!(
            Wad::from_scaled_val(7).try_to_ray().unwrap().to_scaled_val().unwrap(),
            7 * WAD_RAY_RATIO as u128
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Wad::from_scaled_val(WAD as u128 / 4).to_string(), "0.250000000000000000");
        assert_eq!(Wad::from_scaled_val(12 * WAD as u128 + 5).to_string(), "12.000000000000000005");
    }
}

use super::*;
use crate::math::{
    Ray, TryAdd, TryDiv, TryMul, TrySub, Wad, PERCENTAGE_FACTOR, RAY,
};
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::program_pack::{Pack, Sealed};

/// Double slope interest rate curve. Every field is a raw ray value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterestRateStrategy {
    /// Utilization at which both curves switch to their second slope
    pub optimal_utilization_rate: u128,
    /// Variable rate at zero utilization
    pub base_variable_borrow_rate: u128,
    /// Variable rate added from zero to optimal utilization
    pub variable_rate_slope1: u128,
    /// Variable rate added from optimal to full utilization
    pub variable_rate_slope2: u128,
    ///
    pub stable_rate_slope1: u128,
    ///
    pub stable_rate_slope2: u128,
}

impl Param for InterestRateStrategy {
    fn assert_valid(&self) -> ProgramResult {
        if self.optimal_utilization_rate > 0 && self.optimal_utilization_rate <= RAY {
            Ok(())
        } else {
            msg!("Optimal utilization must be in (0, 1]");
            Err(LendingError::InvalidRateStrategy.into())
        }
    }
}

/// Annualized rates derived from reserve utilization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterestRates {
    ///
    pub liquidity_rate: Ray,
    ///
    pub stable_borrow_rate: Ray,
    ///
    pub variable_borrow_rate: Ray,
}

/// Share of total liquidity that is lent out, zero without debt
pub fn calculate_utilization_rate(
    available_liquidity: u128,
    total_debt: u128,
) -> Result<Ray, ProgramError> {
    if total_debt == 0 {
        return Ok(Ray::zero());
    }

    let total_liquidity = available_liquidity
        .checked_add(total_debt)
        .ok_or(LendingError::MathOverflow)?;

    Ray::try_from_ratio(total_debt, total_liquidity)
}

/// Debt weighted mean of the variable rate and the average stable rate
pub fn calculate_overall_borrow_rate(
    total_stable_debt: u128,
    total_variable_debt: u128,
    variable_borrow_rate: Ray,
    average_stable_borrow_rate: Ray,
) -> Result<Ray, ProgramError> {
    let total_debt = total_stable_debt
        .checked_add(total_variable_debt)
        .ok_or(LendingError::MathOverflow)?;
    if total_debt == 0 {
        return Ok(Ray::zero());
    }

    let weighted_variable_rate = Wad::from_scaled_val(total_variable_debt)
        .try_to_ray()?
        .try_mul(variable_borrow_rate)?;
    let weighted_stable_rate = Wad::from_scaled_val(total_stable_debt)
        .try_to_ray()?
        .try_mul(average_stable_borrow_rate)?;

    weighted_variable_rate
        .try_add(weighted_stable_rate)?
        .try_div(Wad::from_scaled_val(total_debt).try_to_ray()?)
}

impl InterestRateStrategy {
    fn optimal_utilization(&self) -> Ray {
        Ray::from_scaled_val(self.optimal_utilization_rate)
    }

    /// Rate on the first segment, `base + slope1 * utilization / optimal`
    pub fn rate_below_optimal(
        &self,
        utilization: Ray,
        base: Ray,
        slope1: Ray,
    ) -> Result<Ray, ProgramError> {
        let ratio = utilization.try_div(self.optimal_utilization())?;
        base.try_add(slope1.try_mul(ratio)?)
    }

    /// Rate on the second segment, anchored at the optimal point
    pub fn rate_above_optimal(
        &self,
        utilization: Ray,
        base: Ray,
        slope1: Ray,
        slope2: Ray,
    ) -> Result<Ray, ProgramError> {
        let optimal = self.optimal_utilization();
        let excess = utilization
            .try_sub(optimal)?
            .try_div(Ray::one().try_sub(optimal)?)?;

        base.try_add(slope1)?.try_add(slope2.try_mul(excess)?)
    }

    fn rate_on_curve(
        &self,
        utilization: Ray,
        base: Ray,
        slope1: u128,
        slope2: u128,
    ) -> Result<Ray, ProgramError> {
        let slope1 = Ray::from_scaled_val(slope1);
        if utilization <= self.optimal_utilization() {
            self.rate_below_optimal(utilization, base, slope1)
        } else {
            self.rate_above_optimal(utilization, base, slope1, Ray::from_scaled_val(slope2))
        }
    }

    /// Derive liquidity, stable and variable rates from the reserve's post-operation state.
    /// `reserve_factor` is in basis points.
    pub fn calculate_interest_rates(
        &self,
        market_borrow_rate: Ray,
        available_liquidity: u128,
        total_stable_debt: u128,
        total_variable_debt: u128,
        average_stable_borrow_rate: Ray,
        reserve_factor: u16,
    ) -> Result<InterestRates, ProgramError> {
        let total_debt = total_stable_debt
            .checked_add(total_variable_debt)
            .ok_or(LendingError::MathOverflow)?;
        let utilization = calculate_utilization_rate(available_liquidity, total_debt)?;

        let stable_borrow_rate = self.rate_on_curve(
            utilization,
            market_borrow_rate,
            self.stable_rate_slope1,
            self.stable_rate_slope2,
        )?;
        let variable_borrow_rate = self.rate_on_curve(
            utilization,
            Ray::from_scaled_val(self.base_variable_borrow_rate),
            self.variable_rate_slope1,
            self.variable_rate_slope2,
        )?;

        let supplier_share = PERCENTAGE_FACTOR
            .checked_sub(reserve_factor as u64)
            .ok_or(LendingError::InvalidReserveConfig)?;
        let liquidity_rate = calculate_overall_borrow_rate(
            total_stable_debt,
            total_variable_debt,
            variable_borrow_rate,
            average_stable_borrow_rate,
        )?
        .try_mul(utilization)?
        .try_percent_mul(supplier_share)?;

        Ok(InterestRates {
            liquidity_rate,
            stable_borrow_rate,
            variable_borrow_rate,
        })
    }
}

impl Sealed for InterestRateStrategy {}
///
pub const INTEREST_RATE_STRATEGY_LEN: usize = 96;

impl Pack for InterestRateStrategy {
    const LEN: usize = INTEREST_RATE_STRATEGY_LEN;

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, INTEREST_RATE_STRATEGY_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            optimal_utilization_rate,
            base_variable_borrow_rate,
            variable_rate_slope1,
            variable_rate_slope2,
            stable_rate_slope1,
            stable_rate_slope2,
        ) = mut_array_refs![output, 16, 16, 16, 16, 16, 16];

        *optimal_utilization_rate = self.optimal_utilization_rate.to_le_bytes();
        *base_variable_borrow_rate = self.base_variable_borrow_rate.to_le_bytes();
        *variable_rate_slope1 = self.variable_rate_slope1.to_le_bytes();
        *variable_rate_slope2 = self.variable_rate_slope2.to_le_bytes();
        *stable_rate_slope1 = self.stable_rate_slope1.to_le_bytes();
        *stable_rate_slope2 = self.stable_rate_slope2.to_le_bytes();
    }

    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, INTEREST_RATE_STRATEGY_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            optimal_utilization_rate,
            base_variable_borrow_rate,
            variable_rate_slope1,
            variable_rate_slope2,
            stable_rate_slope1,
            stable_rate_slope2,
        ) = array_refs![input, 16, 16, 16, 16, 16, 16];

        Ok(Self {
            optimal_utilization_rate: u128::from_le_bytes(*optimal_utilization_rate),
            base_variable_borrow_rate: u128::from_le_bytes(*base_variable_borrow_rate),
            variable_rate_slope1: u128::from_le_bytes(*variable_rate_slope1),
            variable_rate_slope2: u128::from_le_bytes(*variable_rate_slope2),
            stable_rate_slope1: u128::from_le_bytes(*stable_rate_slope1),
            stable_rate_slope2: u128::from_le_bytes(*stable_rate_slope2),
        })
    }
}

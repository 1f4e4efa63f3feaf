use super::*;
use crate::math::{
    amount_mul_ray, calculate_compounded_interest, calculate_linear_interest, Ray, TryMul,
    PERCENTAGE_FACTOR,
};
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::PUBKEY_BYTES,
};

/// Governance configuration of a reserve
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReserveConfig {
    /// Share of borrow interest routed to the treasury, in basis points
    pub reserve_factor: u16,
}

impl Param for ReserveConfig {
    fn assert_valid(&self) -> ProgramResult {
        if self.reserve_factor as u64 <= PERCENTAGE_FACTOR {
            Ok(())
        } else {
            msg!("Reserve factor must be at most {} bips", PERCENTAGE_FACTOR);
            Err(LendingError::InvalidReserveConfig.into())
        }
    }
}

/// Accounts a reserve is bound to at initialization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReserveKeys {
    ///
    pub asset: Pubkey,
    ///
    pub supply_ledger: Pubkey,
    ///
    pub variable_debt_ledger: Pubkey,
    ///
    pub stable_debt_ledger: Pubkey,
    ///
    pub rate_oracle: Pubkey,
    /// Receiver of the reserve factor share
    pub treasury: Pubkey,
}

/// Indices before and after one accrual step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexUpdate {
    ///
    pub previous_timestamp: UnixTimestamp,
    ///
    pub previous_liquidity_index: Ray,
    ///
    pub previous_variable_borrow_index: Ray,
    ///
    pub liquidity_index: Ray,
    ///
    pub variable_borrow_index: Ray,
}

/// Pool wide stable debt figures a reserve needs for accrual and rate updates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StableSupplyData {
    ///
    pub principal_supply: u128,
    /// Principal compounded to the query time
    pub total_supply: u128,
    ///
    pub average_stable_rate: Ray,
    ///
    pub total_supply_timestamp: UnixTimestamp,
}

/// Per asset index and rate state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveData {
    ///
    pub version: u8,
    ///
    pub last_update: LastUpdate,
    ///
    pub keys: ReserveKeys,
    /// Cumulative supply growth, starts at one
    pub liquidity_index: Ray,
    /// Cumulative variable debt growth, starts at one
    pub variable_borrow_index: Ray,
    ///
    pub current_liquidity_rate: Ray,
    ///
    pub current_variable_borrow_rate: Ray,
    ///
    pub current_stable_borrow_rate: Ray,
    /// Underlying held by the reserve and not lent out
    pub available_liquidity: u128,
    ///
    pub config: ReserveConfig,
    ///
    pub rate_strategy: InterestRateStrategy,
}

impl ReserveData {
    ///
    pub fn new(
        keys: ReserveKeys,
        config: ReserveConfig,
        rate_strategy: InterestRateStrategy,
        now: UnixTimestamp,
    ) -> Result<Self, ProgramError> {
        config.assert_valid()?;
        rate_strategy.assert_valid()?;

        Ok(Self {
            version: PROGRAM_VERSION,
            last_update: LastUpdate::new(now),
            keys,
            liquidity_index: Ray::one(),
            variable_borrow_index: Ray::one(),
            current_liquidity_rate: Ray::zero(),
            current_variable_borrow_rate: Ray::zero(),
            current_stable_borrow_rate: Ray::zero(),
            available_liquidity: 0,
            config,
            rate_strategy,
        })
    }

    /// Liquidity index projected to `now` without mutation
    pub fn normalized_income(&self, now: UnixTimestamp) -> Result<Ray, ProgramError> {
        let elapsed = self.last_update.seconds_elapsed(now)?;
        if elapsed == 0 {
            return Ok(self.liquidity_index);
        }

        calculate_linear_interest(self.current_liquidity_rate, elapsed)?
            .try_mul(self.liquidity_index)
    }

    /// Variable borrow index projected to `now` without mutation
    pub fn normalized_variable_debt(&self, now: UnixTimestamp) -> Result<Ray, ProgramError> {
        let elapsed = self.last_update.seconds_elapsed(now)?;
        if elapsed == 0 {
            return Ok(self.variable_borrow_index);
        }

        calculate_compounded_interest(self.current_variable_borrow_rate, elapsed)?
            .try_mul(self.variable_borrow_index)
    }

    /// Accrue both indices to `now` using the rates recorded by the previous operation
    pub fn update_indices(
        &mut self,
        scaled_variable_debt: u128,
        now: UnixTimestamp,
    ) -> Result<IndexUpdate, ProgramError> {
        let previous_timestamp = self.last_update.timestamp;
        let previous_liquidity_index = self.liquidity_index;
        let previous_variable_borrow_index = self.variable_borrow_index;

        let liquidity_index = if self.current_liquidity_rate.is_zero() {
            previous_liquidity_index
        } else {
            self.normalized_income(now)?
        };
        let variable_borrow_index = if scaled_variable_debt == 0 {
            previous_variable_borrow_index
        } else {
            self.normalized_variable_debt(now)?
        };
        // indices are persisted as u128
        liquidity_index.to_scaled_val()?;
        variable_borrow_index.to_scaled_val()?;

        self.last_update.seconds_elapsed(now)?;
        self.liquidity_index = liquidity_index;
        self.variable_borrow_index = variable_borrow_index;
        self.last_update.update_timestamp(now);

        Ok(IndexUpdate {
            previous_timestamp,
            previous_liquidity_index,
            previous_variable_borrow_index,
            liquidity_index,
            variable_borrow_index,
        })
    }

    /// Reserve factor share of the debt interest accrued by `update`
    pub fn accrued_to_treasury(
        &self,
        update: &IndexUpdate,
        scaled_variable_debt: u128,
        stable: &StableSupplyData,
    ) -> Result<u128, ProgramError> {
        if self.config.reserve_factor == 0 {
            return Ok(0);
        }

        let previous_variable_debt =
            amount_mul_ray(scaled_variable_debt, update.previous_variable_borrow_index)?;
        let current_variable_debt =
            amount_mul_ray(scaled_variable_debt, update.variable_borrow_index)?;

        let previous_stable_debt = if stable.principal_supply == 0 {
            0
        } else {
            let stable_elapsed = update
                .previous_timestamp
                .saturating_sub(stable.total_supply_timestamp)
                .max(0) as u64;
            amount_mul_ray(
                stable.principal_supply,
                calculate_compounded_interest(stable.average_stable_rate, stable_elapsed)?,
            )?
        };

        let current_debt = current_variable_debt
            .checked_add(stable.total_supply)
            .ok_or(LendingError::MathOverflow)?;
        let previous_debt = previous_variable_debt
            .checked_add(previous_stable_debt)
            .ok_or(LendingError::MathOverflow)?;
        let accrued = current_debt.saturating_sub(previous_debt);

        amount_mul_ray(accrued, Ray::from_bips(self.config.reserve_factor))
    }

    /// Apply a liquidity movement and store the rates implied by the resulting utilization
    pub fn update_interest_rates<S: MarketRateSource>(
        &mut self,
        source: &S,
        stable: &StableSupplyData,
        scaled_variable_debt: u128,
        liquidity_added: u128,
        liquidity_taken: u128,
    ) -> Result<InterestRates, ProgramError> {
        let available_liquidity = self
            .available_liquidity
            .checked_add(liquidity_added)
            .ok_or(LendingError::MathOverflow)?
            .checked_sub(liquidity_taken)
            .ok_or(LendingError::InsufficientLiquidity)?;
        let total_variable_debt = amount_mul_ray(scaled_variable_debt, self.variable_borrow_index)?;

        let rates = self.rate_strategy.calculate_interest_rates(
            source.market_borrow_rate(&self.keys.asset)?,
            available_liquidity,
            stable.total_supply,
            total_variable_debt,
            stable.average_stable_rate,
            self.config.reserve_factor,
        )?;
        rates.liquidity_rate.to_scaled_val()?;
        rates.stable_borrow_rate.to_scaled_val()?;
        rates.variable_borrow_rate.to_scaled_val()?;

        self.available_liquidity = available_liquidity;
        self.current_liquidity_rate = rates.liquidity_rate;
        self.current_stable_borrow_rate = rates.stable_borrow_rate;
        self.current_variable_borrow_rate = rates.variable_borrow_rate;

        Ok(rates)
    }
}

impl Sealed for ReserveData {}
impl IsInitialized for ReserveData {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}

const RESERVE_PADDING_LEN: usize = 128;
const RESERVE_LEN: usize = 523;

impl Pack for ReserveData {
    const LEN: usize = RESERVE_LEN;

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, RESERVE_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            last_update,
            asset,
            supply_ledger,
            variable_debt_ledger,
            stable_debt_ledger,
            rate_oracle,
            treasury,
            liquidity_index,
            variable_borrow_index,
            current_liquidity_rate,
            current_variable_borrow_rate,
            current_stable_borrow_rate,
            available_liquidity,
            reserve_factor,
            rate_strategy,
            _padding,
        ) = mut_array_refs![
            output,
            1,
            LAST_UPDATE_LEN,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            16,
            16,
            16,
            16,
            16,
            16,
            2,
            INTEREST_RATE_STRATEGY_LEN,
            RESERVE_PADDING_LEN
        ];

        *version = self.version.to_le_bytes();
        self.last_update.pack_into_slice(&mut last_update[..]);
        asset.copy_from_slice(self.keys.asset.as_ref());
        supply_ledger.copy_from_slice(self.keys.supply_ledger.as_ref());
        variable_debt_ledger.copy_from_slice(self.keys.variable_debt_ledger.as_ref());
        stable_debt_ledger.copy_from_slice(self.keys.stable_debt_ledger.as_ref());
        rate_oracle.copy_from_slice(self.keys.rate_oracle.as_ref());
        treasury.copy_from_slice(self.keys.treasury.as_ref());
        pack_ray(self.liquidity_index, liquidity_index);
        pack_ray(self.variable_borrow_index, variable_borrow_index);
        pack_ray(self.current_liquidity_rate, current_liquidity_rate);
        pack_ray(self.current_variable_borrow_rate, current_variable_borrow_rate);
        pack_ray(self.current_stable_borrow_rate, current_stable_borrow_rate);
        *available_liquidity = self.available_liquidity.to_le_bytes();
        *reserve_factor = self.config.reserve_factor.to_le_bytes();
        self.rate_strategy.pack_into_slice(&mut rate_strategy[..]);
    }

    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, RESERVE_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            last_update,
            asset,
            supply_ledger,
            variable_debt_ledger,
            stable_debt_ledger,
            rate_oracle,
            treasury,
            liquidity_index,
            variable_borrow_index,
            current_liquidity_rate,
            current_variable_borrow_rate,
            current_stable_borrow_rate,
            available_liquidity,
            reserve_factor,
            rate_strategy,
            _padding,
        ) = array_refs![
            input,
            1,
            LAST_UPDATE_LEN,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            16,
            16,
            16,
            16,
            16,
            16,
            2,
            INTEREST_RATE_STRATEGY_LEN,
            RESERVE_PADDING_LEN
        ];

        Ok(Self {
            version: unpack_version(version, "Reserve")?,
            last_update: LastUpdate::unpack_from_slice(&last_update[..])?,
            keys: ReserveKeys {
                asset: Pubkey::new_from_array(*asset),
                supply_ledger: Pubkey::new_from_array(*supply_ledger),
                variable_debt_ledger: Pubkey::new_from_array(*variable_debt_ledger),
                stable_debt_ledger: Pubkey::new_from_array(*stable_debt_ledger),
                rate_oracle: Pubkey::new_from_array(*rate_oracle),
                treasury: Pubkey::new_from_array(*treasury),
            },
            liquidity_index: unpack_ray(liquidity_index),
            variable_borrow_index: unpack_ray(variable_borrow_index),
            current_liquidity_rate: unpack_ray(current_liquidity_rate),
            current_variable_borrow_rate: unpack_ray(current_variable_borrow_rate),
            current_stable_borrow_rate: unpack_ray(current_stable_borrow_rate),
            available_liquidity: u128::from_le_bytes(*available_liquidity),
            config: ReserveConfig {
                reserve_factor: u16::from_le_bytes(*reserve_factor),
            },
            rate_strategy: InterestRateStrategy::unpack_from_slice(&rate_strategy[..])?,
        })
    }
}

//! Orchestrator owning every reserve and the ledger authority

use crate::{
    error::LendingError,
    math::{amount_mul_ray, Ray, Wad},
    state::{
        assert_authority, IndexUpdate, InterestRateStrategy, InterestRates, LedgerKind, Permit,
        RateOracle, ReserveConfig, ReserveData, ReserveKeys, ScaledBalanceLedger, ScaledCheckpoint,
        SignatureVerifier, StableCheckpoint, StableDebtLedger, Supply, TransferReceipt,
        VariableDebt,
    },
};
use solana_program::{
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    msg,
    program_error::{PrintProgramError, ProgramError},
    pubkey::Pubkey,
};
use std::collections::BTreeMap;

/// Which debt ledger a borrow or repay targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterestRateMode {
    /// Fixed per borrower rate
    Stable,
    /// Rate shared through the variable borrow index
    Variable,
}

/// A reserve with the ledgers and rate source bound to it
#[derive(Clone, Debug, PartialEq)]
pub struct Reserve {
    ///
    pub data: ReserveData,
    ///
    pub supply: ScaledBalanceLedger<Supply>,
    ///
    pub variable_debt: ScaledBalanceLedger<VariableDebt>,
    ///
    pub stable_debt: StableDebtLedger,
    ///
    pub rate_oracle: RateOracle,
}

/// Reserve header and the ledger entries one operation may write. Permit nonces are left out,
/// `Permit::apply` writes nothing until every check has passed.
struct ReserveCheckpoint {
    data: ReserveData,
    rate_oracle: RateOracle,
    supply: ScaledCheckpoint,
    variable_debt: ScaledCheckpoint,
    stable_debt: StableCheckpoint,
}

impl Reserve {
    /// Capture the header with the treasury, `holders` and the allowance `pairs` on every ledger
    fn checkpoint(&self, holders: &[Pubkey], pairs: &[(Pubkey, Pubkey)]) -> ReserveCheckpoint {
        let mut owners = Vec::with_capacity(holders.len() + 1);
        owners.push(self.data.keys.treasury);
        owners.extend_from_slice(holders);

        ReserveCheckpoint {
            data: self.data.clone(),
            rate_oracle: self.rate_oracle.clone(),
            supply: self.supply.checkpoint(&owners, pairs),
            variable_debt: self.variable_debt.checkpoint(&owners, pairs),
            stable_debt: self.stable_debt.checkpoint(&owners, pairs),
        }
    }

    fn restore(&mut self, checkpoint: ReserveCheckpoint) {
        self.data = checkpoint.data;
        self.rate_oracle = checkpoint.rate_oracle;
        self.supply.restore(checkpoint.supply);
        self.variable_debt.restore(checkpoint.variable_debt);
        self.stable_debt.restore(checkpoint.stable_debt);
    }

    /// Accrue indices with the rates of the previous operation and mint the treasury share
    fn refresh(&mut self, authority: &Pubkey, now: UnixTimestamp) -> Result<IndexUpdate, ProgramError> {
        let scaled_variable_debt = self.variable_debt.scaled_total_supply();
        let stable = self.stable_debt.supply_data(now)?;

        let update = self.data.update_indices(scaled_variable_debt, now)?;
        let accrued = self
            .data
            .accrued_to_treasury(&update, scaled_variable_debt, &stable)?;
        if accrued > 0 {
            msg!("Treasury accrued {}", Wad::from_scaled_val(accrued));
        }
        self.supply.mint_to_treasury(
            authority,
            &self.data.keys.treasury,
            accrued,
            update.liquidity_index,
        )?;

        if update.previous_timestamp != now {
            msg!(
                "Reserve {} refreshed: liquidity index {}, variable borrow index {}",
                self.data.keys.asset,
                update.liquidity_index,
                update.variable_borrow_index
            );
        }

        Ok(update)
    }

    /// Recompute rates from utilization after the liquidity movement
    fn update_interest_rates(
        &mut self,
        liquidity_added: u128,
        liquidity_taken: u128,
        now: UnixTimestamp,
    ) -> Result<InterestRates, ProgramError> {
        let stable = self.stable_debt.supply_data(now)?;
        self.data.update_interest_rates(
            &self.rate_oracle,
            &stable,
            self.variable_debt.scaled_total_supply(),
            liquidity_added,
            liquidity_taken,
        )
    }

    fn debt_of(
        &self,
        owner: &Pubkey,
        mode: InterestRateMode,
        now: UnixTimestamp,
    ) -> Result<u128, ProgramError> {
        match mode {
            InterestRateMode::Stable => self.stable_debt.balance_of(owner, now),
            InterestRateMode::Variable => self.variable_debt.balance_of(owner, &self.data, now),
        }
    }
}

/// Single writer over all reserves. Ledgers only accept mutations signed with its authority.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LendingPool {
    authority: Pubkey,
    reserves: BTreeMap<Pubkey, Reserve>,
}

impl LendingPool {
    ///
    pub fn new(authority: Pubkey) -> Self {
        Self {
            authority,
            reserves: BTreeMap::new(),
        }
    }

    ///
    pub fn authority(&self) -> &Pubkey {
        &self.authority
    }

    ///
    pub fn reserve(&self, asset: &Pubkey) -> Option<&Reserve> {
        self.reserves.get(asset)
    }

    fn get_reserve(&self, asset: &Pubkey) -> Result<&Reserve, ProgramError> {
        self.reserves.get(asset).ok_or_else(|| {
            msg!("No reserve for asset {}", asset);
            LendingError::ReserveNotFound.into()
        })
    }

    /// Run `op` on the reserve. On failure every entry `op` may have written, those of
    /// `holders` and the allowance `pairs`, is rolled back.
    fn execute<T, F>(
        &mut self,
        asset: &Pubkey,
        holders: &[Pubkey],
        pairs: &[(Pubkey, Pubkey)],
        op: F,
    ) -> Result<T, ProgramError>
    where
        F: FnOnce(&Pubkey, &mut Reserve) -> Result<T, ProgramError>,
    {
        let authority = self.authority;
        let result = match self.reserves.get_mut(asset) {
            Some(reserve) => {
                let checkpoint = reserve.checkpoint(holders, pairs);
                let result = op(&authority, reserve);
                if result.is_err() {
                    reserve.restore(checkpoint);
                }
                result
            }
            None => {
                msg!("No reserve for asset {}", asset);
                Err(LendingError::ReserveNotFound.into())
            }
        };

        if let Err(error) = &result {
            error.print::<LendingError>();
        }
        result
    }

    /// List a new asset
    pub fn init_reserve(
        &mut self,
        caller: &Pubkey,
        keys: ReserveKeys,
        config: ReserveConfig,
        rate_strategy: InterestRateStrategy,
        rate_oracle: RateOracle,
        now: UnixTimestamp,
    ) -> ProgramResult {
        msg!("Instruction: Init Reserve");
        assert_authority(&self.authority, caller)?;
        if self.reserves.contains_key(&keys.asset) {
            return Err(LendingError::ReserveAlreadyInitialized.into());
        }
        if rate_oracle.asset != keys.asset {
            msg!("Rate oracle provided is not matched with reserve asset");
            return Err(LendingError::UnmatchedRateOracle.into());
        }

        let data = ReserveData::new(keys, config, rate_strategy, now)?;
        let reserve = Reserve {
            supply: ScaledBalanceLedger::new(keys.supply_ledger, keys.asset, self.authority),
            variable_debt: ScaledBalanceLedger::new(
                keys.variable_debt_ledger,
                keys.asset,
                self.authority,
            ),
            stable_debt: StableDebtLedger::new(keys.stable_debt_ledger, keys.asset, self.authority),
            rate_oracle,
            data,
        };
        self.reserves.insert(keys.asset, reserve);

        Ok(())
    }

    /// Feed the reserve's market borrow rate, signed by the oracle owner
    pub fn feed_market_rate(
        &mut self,
        owner: &Pubkey,
        asset: &Pubkey,
        market_borrow_rate: Ray,
        now: UnixTimestamp,
    ) -> ProgramResult {
        msg!("Instruction: Feed Market Rate: {}", market_borrow_rate);
        self.execute(asset, &[], &[], |_, reserve| {
            reserve
                .rate_oracle
                .feed_market_rate(owner, market_borrow_rate, now)
        })
    }

    /// Bring indices up to date and accrue the treasury share
    pub fn refresh_reserve(
        &mut self,
        asset: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<IndexUpdate, ProgramError> {
        msg!("Instruction: Refresh Reserve");
        self.execute(asset, &[], &[], |authority, reserve| {
            reserve.refresh(authority, now)
        })
    }

    /// Supply `amount` and credit `on_behalf_of`. Returns whether it is their first supply.
    pub fn deposit(
        &mut self,
        asset: &Pubkey,
        on_behalf_of: &Pubkey,
        amount: u128,
        now: UnixTimestamp,
    ) -> Result<bool, ProgramError> {
        msg!("Instruction: Deposit: {}", amount);
        self.execute(asset, &[*on_behalf_of], &[], |authority, reserve| {
            if amount == 0 {
                msg!("Liquidity amount provided cannot be zero");
                return Err(LendingError::InvalidAmount.into());
            }

            let update = reserve.refresh(authority, now)?;
            let first_supply =
                reserve
                    .supply
                    .mint(authority, on_behalf_of, amount, update.liquidity_index)?;
            reserve.update_interest_rates(amount, 0, now)?;

            Ok(first_supply)
        })
    }

    /// Redeem supply. `u128::MAX` withdraws the whole balance. Returns the amount withdrawn.
    pub fn withdraw(
        &mut self,
        asset: &Pubkey,
        owner: &Pubkey,
        amount: u128,
        now: UnixTimestamp,
    ) -> Result<u128, ProgramError> {
        msg!("Instruction: Withdraw: {}", amount);
        self.execute(asset, &[*owner], &[], |authority, reserve| {
            let update = reserve.refresh(authority, now)?;
            let balance = amount_mul_ray(
                reserve.supply.scaled_balance_of(owner),
                update.liquidity_index,
            )?;

            let amount = if amount == u128::MAX { balance } else { amount };
            if amount == 0 {
                msg!("Withdraw amount cannot be zero");
                return Err(LendingError::InvalidAmount.into());
            }
            if amount > balance {
                msg!(
                    "Withdraw amount {} exceeds balance {}",
                    Wad::from_scaled_val(amount),
                    Wad::from_scaled_val(balance)
                );
                return Err(LendingError::InsufficientBalance.into());
            }

            reserve
                .supply
                .burn(authority, owner, amount, update.liquidity_index)?;
            reserve.update_interest_rates(0, amount, now)?;

            Ok(amount)
        })
    }

    /// Borrow for `on_behalf_of`, sending funds to `user`. Debt taken on someone else's behalf
    /// spends their credit delegation.
    pub fn borrow(
        &mut self,
        asset: &Pubkey,
        user: &Pubkey,
        on_behalf_of: &Pubkey,
        amount: u128,
        mode: InterestRateMode,
        now: UnixTimestamp,
    ) -> ProgramResult {
        msg!("Instruction: Borrow: {}", amount);
        let delegation = [(*on_behalf_of, *user)];
        self.execute(asset, &[*on_behalf_of], &delegation, |authority, reserve| {
            if amount == 0 {
                msg!("Borrow amount cannot be zero");
                return Err(LendingError::InvalidAmount.into());
            }

            let update = reserve.refresh(authority, now)?;
            if amount > reserve.data.available_liquidity {
                msg!(
                    "Borrow amount {} exceeds available liquidity {}",
                    Wad::from_scaled_val(amount),
                    Wad::from_scaled_val(reserve.data.available_liquidity)
                );
                return Err(LendingError::InsufficientLiquidity.into());
            }

            match mode {
                InterestRateMode::Stable => {
                    let rate = reserve.data.current_stable_borrow_rate;
                    reserve
                        .stable_debt
                        .mint(authority, user, on_behalf_of, amount, rate, now)?;
                }
                InterestRateMode::Variable => {
                    reserve.variable_debt.mint_on_behalf(
                        authority,
                        user,
                        on_behalf_of,
                        amount,
                        update.variable_borrow_index,
                    )?;
                }
            }
            reserve.update_interest_rates(0, amount, now)?;

            Ok(())
        })
    }

    /// Repay debt of `on_behalf_of`, capped at the outstanding amount. `u128::MAX` repays all.
    /// Returns the amount repaid.
    pub fn repay(
        &mut self,
        asset: &Pubkey,
        on_behalf_of: &Pubkey,
        amount: u128,
        mode: InterestRateMode,
        now: UnixTimestamp,
    ) -> Result<u128, ProgramError> {
        msg!("Instruction: Repay: {}", amount);
        self.execute(asset, &[*on_behalf_of], &[], |authority, reserve| {
            if amount == 0 {
                msg!("Repay amount cannot be zero");
                return Err(LendingError::InvalidAmount.into());
            }

            let update = reserve.refresh(authority, now)?;
            let debt = reserve.debt_of(on_behalf_of, mode, now)?;
            if debt == 0 {
                return Err(LendingError::NoDebtOfSelectedType.into());
            }

            let payback = amount.min(debt);
            match mode {
                InterestRateMode::Stable => {
                    reserve.stable_debt.burn(authority, on_behalf_of, payback, now)?;
                }
                InterestRateMode::Variable => {
                    reserve.variable_debt.burn(
                        authority,
                        on_behalf_of,
                        payback,
                        update.variable_borrow_index,
                    )?;
                }
            }
            reserve.update_interest_rates(payback, 0, now)?;

            Ok(payback)
        })
    }

    /// Move supply between holders at the live liquidity index
    pub fn transfer(
        &mut self,
        asset: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
        now: UnixTimestamp,
    ) -> Result<TransferReceipt, ProgramError> {
        msg!("Instruction: Transfer: {}", amount);
        self.execute(asset, &[*from, *to], &[], |authority, reserve| {
            let index = Supply::live_index(&reserve.data, now)?;
            reserve.supply.transfer(authority, from, to, amount, index)
        })
    }

    /// Move supply on behalf of `from`, spending the allowance granted to `spender`
    pub fn transfer_from(
        &mut self,
        asset: &Pubkey,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
        now: UnixTimestamp,
    ) -> Result<TransferReceipt, ProgramError> {
        msg!("Instruction: Transfer From: {}", amount);
        let allowance = [(*from, *spender)];
        self.execute(asset, &[*from, *to], &allowance, |authority, reserve| {
            let index = Supply::live_index(&reserve.data, now)?;
            reserve
                .supply
                .transfer_from(authority, spender, from, to, amount, index)
        })
    }

    ///
    pub fn approve(
        &mut self,
        asset: &Pubkey,
        owner: &Pubkey,
        spender: &Pubkey,
        amount: u128,
    ) -> ProgramResult {
        msg!("Instruction: Approve: {}", amount);
        self.execute(asset, &[], &[(*owner, *spender)], |authority, reserve| {
            reserve.supply.approve(authority, owner, spender, amount)
        })
    }

    /// Approve a supply spender through a signed permit
    pub fn permit<V: SignatureVerifier>(
        &mut self,
        asset: &Pubkey,
        permit: &Permit,
        signature: &[u8; 64],
        verifier: &V,
        now: UnixTimestamp,
    ) -> ProgramResult {
        msg!("Instruction: Permit");
        let allowance = [(permit.owner, permit.spender)];
        self.execute(asset, &[], &allowance, |_, reserve| {
            reserve.supply.permit(permit, signature, verifier, now)
        })
    }

    /// Let `delegatee` borrow against `delegator`'s credit on the selected debt ledger
    pub fn approve_delegation(
        &mut self,
        asset: &Pubkey,
        mode: InterestRateMode,
        delegator: &Pubkey,
        delegatee: &Pubkey,
        amount: u128,
    ) -> ProgramResult {
        msg!("Instruction: Approve Delegation: {}", amount);
        let delegation = [(*delegator, *delegatee)];
        self.execute(asset, &[], &delegation, |authority, reserve| match mode {
            InterestRateMode::Stable => reserve
                .stable_debt
                .approve_delegation(authority, delegator, delegatee, amount),
            InterestRateMode::Variable => reserve
                .variable_debt
                .approve_delegation(authority, delegator, delegatee, amount),
        })
    }

    /// Live supply balance
    pub fn supply_balance(
        &self,
        asset: &Pubkey,
        owner: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<u128, ProgramError> {
        let reserve = self.get_reserve(asset)?;
        reserve.supply.balance_of(owner, &reserve.data, now)
    }

    /// Live debt balance on the selected ledger
    pub fn debt_balance(
        &self,
        asset: &Pubkey,
        owner: &Pubkey,
        mode: InterestRateMode,
        now: UnixTimestamp,
    ) -> Result<u128, ProgramError> {
        self.get_reserve(asset)?.debt_of(owner, mode, now)
    }

    ///
    pub fn reserve_normalized_income(
        &self,
        asset: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<Ray, ProgramError> {
        self.get_reserve(asset)?.data.normalized_income(now)
    }

    ///
    pub fn reserve_normalized_variable_debt(
        &self,
        asset: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<Ray, ProgramError> {
        self.get_reserve(asset)?.data.normalized_variable_debt(now)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{PERCENT_SCALER, WAD};
    use assert_matches::assert_matches;

    const START: UnixTimestamp = 1_650_000_000;
    const TOKEN: u128 = WAD as u128;

    fn setup() -> (LendingPool, Pubkey) {
        let authority = Pubkey::new_unique();
        let asset = Pubkey::new_unique();
        let mut pool = LendingPool::new(authority);
        let keys = ReserveKeys {
            asset,
            supply_ledger: Pubkey::new_unique(),
            variable_debt_ledger: Pubkey::new_unique(),
            stable_debt_ledger: Pubkey::new_unique(),
            rate_oracle: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
        };
        let oracle = RateOracle::new(Pubkey::new_unique(), asset, Ray::from_percent(2), START).unwrap();
        pool.init_reserve(
            &authority,
            keys,
            ReserveConfig { reserve_factor: 1_000 },
            InterestRateStrategy {
                optimal_utilization_rate: 80 * PERCENT_SCALER,
                base_variable_borrow_rate: PERCENT_SCALER,
                variable_rate_slope1: 4 * PERCENT_SCALER,
                variable_rate_slope2: 75 * PERCENT_SCALER,
                stable_rate_slope1: 2 * PERCENT_SCALER,
                stable_rate_slope2: 60 * PERCENT_SCALER,
            },
            oracle,
            START,
        )
        .unwrap();

        (pool, asset)
    }

    #[test]
    fn test_init_reserve_rejections() {
        let (mut pool, asset) = setup();
        let authority = *pool.authority();
        let keys = pool.reserve(&asset).unwrap().data.keys;
        let oracle = pool.reserve(&asset).unwrap().rate_oracle.clone();
        let strategy = pool.reserve(&asset).unwrap().data.rate_strategy;

        assert_matches!(
            pool.init_reserve(&authority, keys, ReserveConfig::default(), strategy, oracle.clone(), START),
            Err(ProgramError::Custom(code)) if code == LendingError::ReserveAlreadyInitialized as u32
        );
        let other = ReserveKeys { asset: Pubkey::new_unique(), ..keys };
        assert_matches!(
            pool.init_reserve(&Pubkey::new_unique(), other, ReserveConfig::default(), strategy, oracle.clone(), START),
            Err(ProgramError::Custom(code)) if code == LendingError::InvalidAuthority as u32
        );
        assert_matches!(
            pool.init_reserve(&authority, other, ReserveConfig::default(), strategy, oracle, START),
            Err(ProgramError::Custom(code)) if code == LendingError::UnmatchedRateOracle as u32
        );
        assert_matches!(
            pool.refresh_reserve(&other.asset, START),
            Err(ProgramError::Custom(code)) if code == LendingError::ReserveNotFound as u32
        );
    }

    #[test]
    fn test_deposit_and_borrow_set_rates() {
        let (mut pool, asset) = setup();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        assert!(pool.deposit(&asset, &alice, 1_000 * TOKEN, START).unwrap());
        let reserve = pool.reserve(&asset).unwrap();
        assert_eq!(reserve.data.available_liquidity, 1_000 * TOKEN);
        // no debt: variable at base, stable at market rate, nothing for suppliers
        assert_eq!(reserve.data.current_variable_borrow_rate, Ray::from_percent(1));
        assert_eq!(reserve.data.current_stable_borrow_rate, Ray::from_percent(2));
        assert_eq!(reserve.data.current_liquidity_rate, Ray::zero());

        pool.borrow(&asset, &bob, &bob, 200 * TOKEN, InterestRateMode::Variable, START)
            .unwrap();
        let reserve = pool.reserve(&asset).unwrap();
        assert_eq!(reserve.data.available_liquidity, 800 * TOKEN);
        // utilization 0.2: 1% + 0.25 * 4%
        assert_eq!(reserve.data.current_variable_borrow_rate, Ray::from_percent(2));
        assert!(reserve.data.current_liquidity_rate > Ray::zero());
    }

    #[test]
    fn test_failed_operation_leaves_pool_untouched() {
        let (mut pool, asset) = setup();
        let alice = Pubkey::new_unique();
        pool.deposit(&asset, &alice, 100 * TOKEN, START).unwrap();
        pool.borrow(&asset, &alice, &alice, 50 * TOKEN, InterestRateMode::Stable, START)
            .unwrap();

        let snapshot = pool.clone();
        let later = START + 86_400;
        assert_matches!(
            pool.withdraw(&asset, &alice, 60 * TOKEN, later),
            Err(ProgramError::Custom(code)) if code == LendingError::InsufficientLiquidity as u32
        );
        assert_matches!(
            pool.borrow(&asset, &alice, &alice, 51 * TOKEN, InterestRateMode::Variable, later),
            Err(ProgramError::Custom(code)) if code == LendingError::InsufficientLiquidity as u32
        );
        assert_matches!(
            pool.repay(&asset, &alice, TOKEN, InterestRateMode::Variable, later),
            Err(ProgramError::Custom(code)) if code == LendingError::NoDebtOfSelectedType as u32
        );
        assert_matches!(
            pool.deposit(&asset, &alice, 0, later),
            Err(ProgramError::Custom(code)) if code == LendingError::InvalidAmount as u32
        );
        assert_eq!(pool, snapshot);
    }

    #[test]
    fn test_full_repay_and_withdraw_close_positions() {
        let (mut pool, asset) = setup();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        pool.deposit(&asset, &alice, 1_000 * TOKEN, START).unwrap();
        pool.borrow(&asset, &bob, &bob, 300 * TOKEN, InterestRateMode::Variable, START)
            .unwrap();

        let later = START + 365 * 86_400;
        let debt = pool
            .debt_balance(&asset, &bob, InterestRateMode::Variable, later)
            .unwrap();
        assert_eq!(
            pool.repay(&asset, &bob, u128::MAX, InterestRateMode::Variable, later),
            Ok(debt)
        );
        assert_eq!(
            pool.reserve(&asset).unwrap().variable_debt.scaled_balance_of(&bob),
            0
        );
        assert_matches!(
            pool.repay(&asset, &bob, u128::MAX, InterestRateMode::Variable, later),
            Err(ProgramError::Custom(code)) if code == LendingError::NoDebtOfSelectedType as u32
        );

        pool.withdraw(&asset, &alice, u128::MAX, later).unwrap();
        assert_eq!(pool.reserve(&asset).unwrap().supply.scaled_balance_of(&alice), 0);
        assert_matches!(
            pool.withdraw(&asset, &alice, u128::MAX, later),
            Err(ProgramError::Custom(code)) if code == LendingError::InvalidAmount as u32
        );
    }

    #[test]
    fn test_failed_delegated_borrow_keeps_delegation() {
        let (mut pool, asset) = setup();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        pool.deposit(&asset, &alice, 100 * TOKEN, START).unwrap();
        pool.approve_delegation(&asset, InterestRateMode::Variable, &alice, &bob, 50 * TOKEN)
            .unwrap();

        let snapshot = pool.clone();
        assert_matches!(
            pool.borrow(&asset, &bob, &alice, 60 * TOKEN, InterestRateMode::Variable, START + 60),
            Err(ProgramError::Custom(code)) if code == LendingError::InsufficientBorrowAllowance as u32
        );
        assert_eq!(pool, snapshot);

        pool.borrow(&asset, &bob, &alice, 50 * TOKEN, InterestRateMode::Variable, START + 60)
            .unwrap();
        let reserve = pool.reserve(&asset).unwrap();
        assert_eq!(reserve.variable_debt.borrow_allowance(&alice, &bob), 0);
        assert!(reserve.variable_debt.scaled_balance_of(&alice) > 0);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let (mut pool, asset) = setup();
        let alice = Pubkey::new_unique();
        pool.deposit(&asset, &alice, 100 * TOKEN, START).unwrap();
        pool.borrow(&asset, &alice, &alice, 40 * TOKEN, InterestRateMode::Variable, START)
            .unwrap();

        let later = START + 86_400 * 7;
        let first = pool.refresh_reserve(&asset, later).unwrap();
        let snapshot = pool.clone();
        let second = pool.refresh_reserve(&asset, later).unwrap();
        assert_eq!(first.liquidity_index, second.liquidity_index);
        assert_eq!(first.variable_borrow_index, second.variable_borrow_index);
        assert_eq!(pool, snapshot);
    }

    #[test]
    fn test_feed_market_rate_moves_stable_rate() {
        let (mut pool, asset) = setup();
        let owner = pool.reserve(&asset).unwrap().rate_oracle.owner;
        pool.feed_market_rate(&owner, &asset, Ray::from_percent(5), START + 1)
            .unwrap();
        pool.deposit(&asset, &Pubkey::new_unique(), TOKEN, START + 1).unwrap();
        assert_eq!(
            pool.reserve(&asset).unwrap().data.current_stable_borrow_rate,
            Ray::from_percent(5)
        );

        assert_matches!(
            pool.feed_market_rate(&Pubkey::new_unique(), &asset, Ray::zero(), START + 2),
            Err(ProgramError::Custom(code)) if code == LendingError::InvalidAuthority as u32
        );
    }
}

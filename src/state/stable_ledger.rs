use super::*;
use crate::math::{
    amount_mul_ray, calculate_compounded_interest, Ray, TryAdd, TryDiv, TryMul, TrySub, Wad,
};
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::PUBKEY_BYTES,
};
use std::collections::BTreeMap;

/// Fixed rate debt of one borrower
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StablePosition {
    ///
    pub version: u8,
    ///
    pub owner: Pubkey,
    /// Grows only through mint and burn, never through an index
    pub principal_balance: u128,
    ///
    pub stable_rate: Ray,
    ///
    pub last_update: LastUpdate,
}

impl Sealed for StablePosition {}
impl IsInitialized for StablePosition {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}

const STABLE_POSITION_PADDING_LEN: usize = 32;
const STABLE_POSITION_LEN: usize = 105;

impl Pack for StablePosition {
    const LEN: usize = STABLE_POSITION_LEN;

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, STABLE_POSITION_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (version, owner, principal_balance, stable_rate, last_update, _padding) = mut_array_refs![
            output,
            1,
            PUBKEY_BYTES,
            16,
            16,
            LAST_UPDATE_LEN,
            STABLE_POSITION_PADDING_LEN
        ];

        *version = self.version.to_le_bytes();
        owner.copy_from_slice(self.owner.as_ref());
        *principal_balance = self.principal_balance.to_le_bytes();
        pack_ray(self.stable_rate, stable_rate);
        self.last_update.pack_into_slice(&mut last_update[..]);
    }

    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, STABLE_POSITION_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (version, owner, principal_balance, stable_rate, last_update, _padding) = array_refs![
            input,
            1,
            PUBKEY_BYTES,
            16,
            16,
            LAST_UPDATE_LEN,
            STABLE_POSITION_PADDING_LEN
        ];

        Ok(Self {
            version: unpack_version(version, "StablePosition")?,
            owner: Pubkey::new_from_array(*owner),
            principal_balance: u128::from_le_bytes(*principal_balance),
            stable_rate: unpack_ray(stable_rate),
            last_update: LastUpdate::unpack_from_slice(&last_update[..])?,
        })
    }
}

/// Result of a stable mint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StableMint {
    /// Whether the borrower had no stable debt before
    pub first_position: bool,
    /// Compounded balance before the mint
    pub current_balance: u128,
    /// Interest folded into principal
    pub balance_increase: u128,
    ///
    pub next_supply: u128,
    ///
    pub average_stable_rate: Ray,
}

/// Result of a stable burn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StableBurn {
    /// Compounded balance before the burn
    pub current_balance: u128,
    ///
    pub balance_increase: u128,
    ///
    pub next_supply: u128,
    ///
    pub average_stable_rate: Ray,
}

/// Ledger header with the positions and delegations a single operation may write
#[derive(Clone, Debug)]
pub struct StableCheckpoint {
    total_principal: u128,
    average_stable_rate: Ray,
    last_update: LastUpdate,
    positions: Vec<(Pubkey, Option<StablePosition>)>,
    delegations: Vec<(Pubkey, Pubkey, u128)>,
}

fn amount_to_ray(amount: u128) -> Result<Ray, ProgramError> {
    Wad::from_scaled_val(amount).try_to_ray()
}

/// Per borrower fixed rate debt with a pool wide principal weighted average rate
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StableDebtLedger {
    ///
    pub version: u8,
    ///
    pub key: Pubkey,
    ///
    pub asset: Pubkey,
    /// Only caller allowed to mutate balances
    pub authority: Pubkey,
    /// Pool principal as of `last_update`
    pub total_principal: u128,
    ///
    pub average_stable_rate: Ray,
    /// Timestamp of the pool principal
    pub last_update: LastUpdate,
    positions: BTreeMap<Pubkey, StablePosition>,
    delegations: Allowances,
}

impl StableDebtLedger {
    ///
    pub fn new(key: Pubkey, asset: Pubkey, authority: Pubkey) -> Self {
        Self {
            version: PROGRAM_VERSION,
            key,
            asset,
            authority,
            total_principal: 0,
            average_stable_rate: Ray::zero(),
            last_update: LastUpdate::default(),
            positions: BTreeMap::new(),
            delegations: Allowances::default(),
        }
    }

    ///
    pub fn position(&self, owner: &Pubkey) -> Option<&StablePosition> {
        self.positions.get(owner)
    }

    ///
    pub fn principal_balance_of(&self, owner: &Pubkey) -> u128 {
        self.positions
            .get(owner)
            .map(|position| position.principal_balance)
            .unwrap_or(0)
    }

    ///
    pub fn user_stable_rate(&self, owner: &Pubkey) -> Ray {
        self.positions
            .get(owner)
            .map(|position| position.stable_rate)
            .unwrap_or_default()
    }

    ///
    pub fn user_last_updated(&self, owner: &Pubkey) -> UnixTimestamp {
        self.positions
            .get(owner)
            .map(|position| position.last_update.timestamp)
            .unwrap_or(0)
    }

    ///
    pub fn average_rate(&self) -> Ray {
        self.average_stable_rate
    }

    /// Principal compounded at the borrower's own rate
    pub fn balance_of(&self, owner: &Pubkey, now: UnixTimestamp) -> Result<u128, ProgramError> {
        let (_, current_balance, _) = self.calculate_balance_increase(owner, now)?;
        Ok(current_balance)
    }

    /// Pool principal compounded at the average rate
    pub fn total_supply(&self, now: UnixTimestamp) -> Result<u128, ProgramError> {
        if self.total_principal == 0 {
            return Ok(0);
        }

        let elapsed = self.last_update.seconds_elapsed(now)?;
        amount_mul_ray(
            self.total_principal,
            calculate_compounded_interest(self.average_stable_rate, elapsed)?,
        )
    }

    ///
    pub fn total_supply_and_average_rate(&self, now: UnixTimestamp) -> Result<(u128, Ray), ProgramError> {
        Ok((self.total_supply(now)?, self.average_stable_rate))
    }

    ///
    pub fn total_supply_last_updated(&self) -> UnixTimestamp {
        self.last_update.timestamp
    }

    ///
    pub fn supply_data(&self, now: UnixTimestamp) -> Result<StableSupplyData, ProgramError> {
        Ok(StableSupplyData {
            principal_supply: self.total_principal,
            total_supply: self.total_supply(now)?,
            average_stable_rate: self.average_stable_rate,
            total_supply_timestamp: self.last_update.timestamp,
        })
    }

    ///
    pub fn approve_delegation(
        &mut self,
        caller: &Pubkey,
        delegator: &Pubkey,
        delegatee: &Pubkey,
        amount: u128,
    ) -> ProgramResult {
        assert_authority(&self.authority, caller)?;
        self.delegations.write(delegator, delegatee, amount);
        Ok(())
    }

    ///
    pub fn borrow_allowance(&self, delegator: &Pubkey, delegatee: &Pubkey) -> u128 {
        self.delegations.read(delegator, delegatee)
    }

    /// Capture what an operation touching `owners` and the delegation `pairs` can change
    pub fn checkpoint(&self, owners: &[Pubkey], pairs: &[(Pubkey, Pubkey)]) -> StableCheckpoint {
        StableCheckpoint {
            total_principal: self.total_principal,
            average_stable_rate: self.average_stable_rate,
            last_update: self.last_update,
            positions: snapshot_positions(&self.positions, owners),
            delegations: self.delegations.snapshot(pairs),
        }
    }

    ///
    pub fn restore(&mut self, checkpoint: StableCheckpoint) {
        self.total_principal = checkpoint.total_principal;
        self.average_stable_rate = checkpoint.average_stable_rate;
        self.last_update = checkpoint.last_update;
        restore_positions(&mut self.positions, checkpoint.positions);
        self.delegations.restore(checkpoint.delegations);
    }

    /// Returns principal, compounded balance and the interest accrued since last touch
    fn calculate_balance_increase(
        &self,
        owner: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<(u128, u128, u128), ProgramError> {
        let position = match self.positions.get(owner) {
            Some(position) if position.principal_balance > 0 => position,
            _ => return Ok((0, 0, 0)),
        };

        let elapsed = position.last_update.seconds_elapsed(now)?;
        let current_balance = amount_mul_ray(
            position.principal_balance,
            calculate_compounded_interest(position.stable_rate, elapsed)?,
        )?;

        Ok((
            position.principal_balance,
            current_balance,
            current_balance - position.principal_balance,
        ))
    }

    /// Borrow `amount` at `rate` for `on_behalf_of`. Accrued interest is folded into principal and
    /// both the borrower's rate and the pool average are re-weighted.
    pub fn mint(
        &mut self,
        caller: &Pubkey,
        user: &Pubkey,
        on_behalf_of: &Pubkey,
        amount: u128,
        rate: Ray,
        now: UnixTimestamp,
    ) -> Result<StableMint, ProgramError> {
        assert_authority(&self.authority, caller)?;
        if amount == 0 {
            msg!("Stable mint amount cannot be zero");
            return Err(LendingError::InvalidMintAmount.into());
        }
        if user != on_behalf_of && self.delegations.read(on_behalf_of, user) < amount {
            return Err(LendingError::InsufficientBorrowAllowance.into());
        }

        let (principal, current_balance, balance_increase) =
            self.calculate_balance_increase(on_behalf_of, now)?;
        let previous_supply = self.total_supply(now)?;
        let next_supply = previous_supply
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        let amount_in_ray = amount_to_ray(amount)?;

        let next_balance = current_balance
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        let stable_rate = self
            .user_stable_rate(on_behalf_of)
            .try_mul(amount_to_ray(current_balance)?)?
            .try_add(amount_in_ray.try_mul(rate)?)?
            .try_div(amount_to_ray(next_balance)?)?;
        if stable_rate.to_scaled_val().is_err() {
            msg!("Stable rate {} exceeds the storable range", stable_rate);
            return Err(LendingError::MathOverflow.into());
        }

        let average_stable_rate = self
            .average_stable_rate
            .try_mul(amount_to_ray(previous_supply)?)?
            .try_add(rate.try_mul(amount_in_ray)?)?
            .try_div(amount_to_ray(next_supply)?)?;
        average_stable_rate.to_scaled_val()?;

        let principal_balance = principal
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?
            .checked_add(balance_increase)
            .ok_or(LendingError::MathOverflow)?;

        if user != on_behalf_of {
            self.delegations.spend(
                on_behalf_of,
                user,
                amount,
                LendingError::InsufficientBorrowAllowance,
            )?;
        }
        self.positions.insert(
            *on_behalf_of,
            StablePosition {
                version: PROGRAM_VERSION,
                owner: *on_behalf_of,
                principal_balance,
                stable_rate,
                last_update: LastUpdate::new(now),
            },
        );
        self.total_principal = next_supply;
        self.average_stable_rate = average_stable_rate;
        self.last_update.update_timestamp(now);

        Ok(StableMint {
            first_position: current_balance == 0,
            current_balance,
            balance_increase,
            next_supply,
            average_stable_rate,
        })
    }

    /// Repay `amount` of `owner`'s compounded balance. When the repayment is smaller than the
    /// accrued interest the difference is added to principal instead.
    pub fn burn(
        &mut self,
        caller: &Pubkey,
        owner: &Pubkey,
        amount: u128,
        now: UnixTimestamp,
    ) -> Result<StableBurn, ProgramError> {
        assert_authority(&self.authority, caller)?;
        if amount == 0 {
            msg!("Stable burn amount cannot be zero");
            return Err(LendingError::InvalidBurnAmount.into());
        }

        let (principal, current_balance, balance_increase) =
            self.calculate_balance_increase(owner, now)?;
        if amount > current_balance {
            msg!("Stable burn of {} exceeds balance {}", amount, current_balance);
            return Err(LendingError::InsufficientBalance.into());
        }

        let previous_supply = self.total_supply(now)?;
        let user_stable_rate = self.user_stable_rate(owner);

        // rounding can leave the pool short of a single borrower's debt, reset instead of underflowing
        let (next_supply, average_stable_rate) = if previous_supply <= amount {
            (0, Ray::zero())
        } else {
            let next_supply = previous_supply - amount;
            let first_term = self
                .average_stable_rate
                .try_mul(amount_to_ray(previous_supply)?)?;
            let second_term = user_stable_rate.try_mul(amount_to_ray(amount)?)?;
            if second_term >= first_term {
                (0, Ray::zero())
            } else {
                (
                    next_supply,
                    first_term
                        .try_sub(second_term)?
                        .try_div(amount_to_ray(next_supply)?)?,
                )
            }
        };

        let principal_balance = if balance_increase > amount {
            principal
                .checked_add(balance_increase - amount)
                .ok_or(LendingError::MathOverflow)?
        } else {
            principal
                .checked_sub(amount - balance_increase)
                .ok_or(LendingError::InsufficientBalance)?
        };
        let (stable_rate, last_update) = if amount == current_balance {
            (Ray::zero(), LastUpdate::default())
        } else {
            (user_stable_rate, LastUpdate::new(now))
        };

        self.positions.insert(
            *owner,
            StablePosition {
                version: PROGRAM_VERSION,
                owner: *owner,
                principal_balance,
                stable_rate,
                last_update,
            },
        );
        self.total_principal = next_supply;
        self.average_stable_rate = average_stable_rate;
        self.last_update.update_timestamp(now);

        Ok(StableBurn {
            current_balance,
            balance_increase,
            next_supply,
            average_stable_rate,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{SECONDS_PER_YEAR, WAD};
    use assert_matches::assert_matches;

    const START: UnixTimestamp = 1_650_000_000;
    const TOKEN: u128 = WAD as u128;

    fn ledger(authority: &Pubkey) -> StableDebtLedger {
        StableDebtLedger::new(Pubkey::new_unique(), Pubkey::new_unique(), *authority)
    }

    #[test]
    fn test_weighted_average_same_borrower() {
        let authority = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut ledger = ledger(&authority);

        let first = ledger
            .mint(&authority, &user, &user, 100 * TOKEN, Ray::from_percent(10), START)
            .unwrap();
        assert!(first.first_position);
        let second = ledger
            .mint(&authority, &user, &user, 100 * TOKEN, Ray::from_percent(20), START)
            .unwrap();
        assert!(!second.first_position);

        assert_eq!(ledger.average_rate(), Ray::from_percent(15));
        assert_eq!(ledger.user_stable_rate(&user), Ray::from_percent(15));
        assert_eq!(ledger.principal_balance_of(&user), 200 * TOKEN);
        assert_eq!(ledger.total_supply(START).unwrap(), 200 * TOKEN);
    }

    #[test]
    fn test_weighted_average_two_borrowers() {
        let authority = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut ledger = ledger(&authority);

        ledger
            .mint(&authority, &alice, &alice, 100 * TOKEN, Ray::from_percent(10), START)
            .unwrap();
        ledger
            .mint(&authority, &bob, &bob, 100 * TOKEN, Ray::from_percent(20), START)
            .unwrap();
        assert_eq!(ledger.average_rate(), Ray::from_percent(15));
        assert_eq!(ledger.user_stable_rate(&alice), Ray::from_percent(10));
        assert_eq!(ledger.user_stable_rate(&bob), Ray::from_percent(20));

        // removing bob's weight leaves alice's rate
        ledger.burn(&authority, &bob, 100 * TOKEN, START).unwrap();
        assert_eq!(ledger.average_rate(), Ray::from_percent(10));
        assert_eq!(ledger.total_principal, 100 * TOKEN);
        assert_eq!(ledger.user_stable_rate(&bob), Ray::zero());
        assert_eq!(ledger.user_last_updated(&bob), 0);
    }

    #[test]
    fn test_balance_compounds_per_borrower() {
        let authority = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut ledger = ledger(&authority);
        ledger
            .mint(&authority, &user, &user, 1_000 * TOKEN, Ray::from_percent(10), START)
            .unwrap();

        let later = START + SECONDS_PER_YEAR as i64;
        let expected = amount_mul_ray(
            1_000 * TOKEN,
            calculate_compounded_interest(Ray::from_percent(10), SECONDS_PER_YEAR).unwrap(),
        )
        .unwrap();
        assert_eq!(ledger.balance_of(&user, later).unwrap(), expected);
        assert_eq!(ledger.total_supply(later).unwrap(), expected);
        assert_eq!(ledger.principal_balance_of(&user), 1_000 * TOKEN);

        let data = ledger.supply_data(later).unwrap();
        assert_eq!(data.principal_supply, 1_000 * TOKEN);
        assert_eq!(data.total_supply, expected);
        assert_eq!(data.total_supply_timestamp, START);
        assert_eq!(
            ledger.total_supply_and_average_rate(later).unwrap(),
            (expected, Ray::from_percent(10))
        );
        assert_eq!(ledger.total_supply_last_updated(), START);
    }

    #[test]
    fn test_mint_folds_interest_into_principal() {
        let authority = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut ledger = ledger(&authority);
        ledger
            .mint(&authority, &user, &user, 1_000 * TOKEN, Ray::from_percent(10), START)
            .unwrap();

        let later = START + 86_400 * 90;
        let balance = ledger.balance_of(&user, later).unwrap();
        let minted = ledger
            .mint(&authority, &user, &user, 10 * TOKEN, Ray::from_percent(10), later)
            .unwrap();
        assert_eq!(minted.current_balance, balance);
        assert_eq!(minted.balance_increase, balance - 1_000 * TOKEN);
        assert_eq!(ledger.principal_balance_of(&user), balance + 10 * TOKEN);
        assert_eq!(ledger.user_last_updated(&user), later);
    }

    #[test]
    fn test_repay_below_interest_grows_principal() {
        let authority = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut ledger = ledger(&authority);
        ledger
            .mint(&authority, &user, &user, 1_000 * TOKEN, Ray::from_percent(10), START)
            .unwrap();

        let later = START + SECONDS_PER_YEAR as i64;
        let burned = ledger.burn(&authority, &user, TOKEN, later).unwrap();
        assert!(burned.balance_increase > TOKEN);
        assert_eq!(
            ledger.principal_balance_of(&user),
            1_000 * TOKEN + burned.balance_increase - TOKEN
        );
        assert_eq!(ledger.balance_of(&user, later).unwrap(), burned.current_balance - TOKEN);
    }

    #[test]
    fn test_full_repay_resets() {
        let authority = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut ledger = ledger(&authority);
        ledger
            .mint(&authority, &user, &user, 500 * TOKEN, Ray::from_percent(7), START)
            .unwrap();

        let later = START + 86_400 * 30;
        let balance = ledger.balance_of(&user, later).unwrap();
        assert_matches!(
            ledger.burn(&authority, &user, balance + 1, later),
            Err(ProgramError::Custom(code)) if code == LendingError::InsufficientBalance as u32
        );

        ledger.burn(&authority, &user, balance, later).unwrap();
        assert_eq!(ledger.principal_balance_of(&user), 0);
        assert_eq!(ledger.balance_of(&user, later + 1_000).unwrap(), 0);
        assert_eq!(ledger.user_stable_rate(&user), Ray::zero());
        assert_eq!(ledger.total_principal, 0);
        assert_eq!(ledger.average_rate(), Ray::zero());
    }

    #[test]
    fn test_rounding_forces_average_reset() {
        let authority = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut ledger = ledger(&authority);
        ledger
            .mint(&authority, &user, &user, 100 * TOKEN, Ray::from_percent(10), START)
            .unwrap();
        // pool average drifted below the borrower's contribution
        ledger.average_stable_rate = Ray::from_percent(5);

        let burned = ledger.burn(&authority, &user, 50 * TOKEN, START).unwrap();
        assert_eq!(burned.next_supply, 0);
        assert_eq!(ledger.average_rate(), Ray::zero());
        assert_eq!(ledger.total_principal, 0);
        assert_eq!(ledger.principal_balance_of(&user), 50 * TOKEN);
    }

    #[test]
    fn test_mint_rejections() {
        let authority = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut ledger = ledger(&authority);

        assert_matches!(
            ledger.mint(&authority, &user, &user, 0, Ray::from_percent(10), START),
            Err(ProgramError::Custom(code)) if code == LendingError::InvalidMintAmount as u32
        );
        assert_matches!(
            ledger.mint(&user, &user, &user, TOKEN, Ray::from_percent(10), START),
            Err(ProgramError::Custom(code)) if code == LendingError::InvalidAuthority as u32
        );

        let too_high = Ray::from_scaled_val(u128::MAX)
            .try_add(Ray::from_scaled_val(1))
            .unwrap();
        assert_matches!(
            ledger.mint(&authority, &user, &user, TOKEN, too_high, START),
            Err(ProgramError::Custom(code)) if code == LendingError::MathOverflow as u32
        );
        assert_eq!(ledger, StableDebtLedger::new(ledger.key, ledger.asset, authority));
    }

    #[test]
    fn test_credit_delegation() {
        let authority = Pubkey::new_unique();
        let delegator = Pubkey::new_unique();
        let borrower = Pubkey::new_unique();
        let mut ledger = ledger(&authority);

        assert_matches!(
            ledger.mint(&authority, &borrower, &delegator, TOKEN, Ray::from_percent(5), START),
            Err(ProgramError::Custom(code)) if code == LendingError::InsufficientBorrowAllowance as u32
        );
        ledger
            .approve_delegation(&authority, &delegator, &borrower, 3 * TOKEN)
            .unwrap();
        ledger
            .mint(&authority, &borrower, &delegator, TOKEN, Ray::from_percent(5), START)
            .unwrap();
        assert_eq!(ledger.borrow_allowance(&delegator, &borrower), 2 * TOKEN);
        assert_eq!(ledger.principal_balance_of(&delegator), TOKEN);
        assert!(ledger.position(&borrower).is_none());
    }

    #[test]
    fn test_checkpoint_restores_touched_entries() {
        let authority = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut ledger = ledger(&authority);
        ledger
            .mint(&authority, &alice, &alice, 100 * TOKEN, Ray::from_percent(10), START)
            .unwrap();
        ledger.approve_delegation(&authority, &alice, &bob, 50 * TOKEN).unwrap();
        let before = ledger.clone();

        let checkpoint = ledger.checkpoint(&[alice, bob], &[(alice, bob)]);
        ledger
            .mint(&authority, &bob, &alice, 50 * TOKEN, Ray::from_percent(20), START + 60)
            .unwrap();
        ledger
            .mint(&authority, &bob, &bob, 10 * TOKEN, Ray::from_percent(20), START + 60)
            .unwrap();
        assert_ne!(ledger, before);

        ledger.restore(checkpoint);
        assert_eq!(ledger, before);
        assert!(ledger.position(&bob).is_none());
    }

    #[test]
    fn test_position_pack() {
        let position = StablePosition {
            version: PROGRAM_VERSION,
            owner: Pubkey::new_unique(),
            principal_balance: 77 * TOKEN,
            stable_rate: Ray::from_percent(9),
            last_update: LastUpdate::new(START),
        };
        let mut buf = [0u8; STABLE_POSITION_LEN];
        position.pack_into_slice(&mut buf);
        assert_eq!(StablePosition::unpack_from_slice(&buf).unwrap(), position);
    }
}

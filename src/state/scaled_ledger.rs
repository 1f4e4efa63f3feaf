use super::*;
use crate::math::{amount_div_ray, amount_mul_ray};
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::PUBKEY_BYTES,
};
use std::{collections::BTreeMap, fmt::Debug, marker::PhantomData};

/// Selects the reserve index a scaled ledger grows with
pub trait LedgerKind: Clone + Debug + Default + PartialEq {
    ///
    const NAME: &'static str;
    /// Index projected to `now`
    fn live_index(reserve: &ReserveData, now: UnixTimestamp) -> Result<Ray, ProgramError>;
}

/// Supply positions, grown by the liquidity index
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Supply;

impl LedgerKind for Supply {
    const NAME: &'static str = "Supply";

    fn live_index(reserve: &ReserveData, now: UnixTimestamp) -> Result<Ray, ProgramError> {
        reserve.normalized_income(now)
    }
}

/// Variable debt positions, grown by the variable borrow index
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VariableDebt;

impl LedgerKind for VariableDebt {
    const NAME: &'static str = "VariableDebt";

    fn live_index(reserve: &ReserveData, now: UnixTimestamp) -> Result<Ray, ProgramError> {
        reserve.normalized_variable_debt(now)
    }
}

/// Holder balance normalized by the index at last touch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScaledPosition {
    ///
    pub version: u8,
    ///
    pub owner: Pubkey,
    ///
    pub scaled_balance: u128,
}

impl Sealed for ScaledPosition {}
impl IsInitialized for ScaledPosition {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}

const SCALED_POSITION_PADDING_LEN: usize = 32;
const SCALED_POSITION_LEN: usize = 81;

impl Pack for ScaledPosition {
    const LEN: usize = SCALED_POSITION_LEN;

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, SCALED_POSITION_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (version, owner, scaled_balance, _padding) =
            mut_array_refs![output, 1, PUBKEY_BYTES, 16, SCALED_POSITION_PADDING_LEN];

        *version = self.version.to_le_bytes();
        owner.copy_from_slice(self.owner.as_ref());
        *scaled_balance = self.scaled_balance.to_le_bytes();
    }

    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, SCALED_POSITION_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (version, owner, scaled_balance, _padding) =
            array_refs![input, 1, PUBKEY_BYTES, 16, SCALED_POSITION_PADDING_LEN];

        Ok(Self {
            version: unpack_version(version, "ScaledPosition")?,
            owner: Pubkey::new_from_array(*owner),
            scaled_balance: u128::from_le_bytes(*scaled_balance),
        })
    }
}

/// Real balances around a supply transfer, for downstream validation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferReceipt {
    ///
    pub scaled_amount: u128,
    ///
    pub from_balance_before: u128,
    ///
    pub from_balance_after: u128,
    ///
    pub to_balance_before: u128,
    ///
    pub to_balance_after: u128,
}

/// Token like ledger whose balances are stored in scaled units
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaledBalanceLedger<K: LedgerKind> {
    ///
    pub version: u8,
    /// Address of this ledger, bound into permit messages
    pub key: Pubkey,
    ///
    pub asset: Pubkey,
    /// Only caller allowed to mutate balances
    pub authority: Pubkey,
    ///
    pub total_scaled_supply: u128,
    positions: BTreeMap<Pubkey, ScaledPosition>,
    allowances: Allowances,
    nonces: Nonces,
    _kind: PhantomData<K>,
}

/// Ledger header with the positions and allowances a single operation may write
#[derive(Clone, Debug)]
pub struct ScaledCheckpoint {
    total_scaled_supply: u128,
    positions: Vec<(Pubkey, Option<ScaledPosition>)>,
    allowances: Vec<(Pubkey, Pubkey, u128)>,
}

/// Scaled units after a mint, computed before anything is written
struct PendingMint {
    scaled_balance: u128,
    total_scaled_supply: u128,
    first_position: bool,
}

impl<K: LedgerKind> ScaledBalanceLedger<K> {
    ///
    pub fn new(key: Pubkey, asset: Pubkey, authority: Pubkey) -> Self {
        Self {
            version: PROGRAM_VERSION,
            key,
            asset,
            authority,
            total_scaled_supply: 0,
            positions: BTreeMap::new(),
            allowances: Allowances::default(),
            nonces: Nonces::default(),
            _kind: PhantomData,
        }
    }

    ///
    pub fn position(&self, owner: &Pubkey) -> Option<&ScaledPosition> {
        self.positions.get(owner)
    }

    ///
    pub fn scaled_balance_of(&self, owner: &Pubkey) -> u128 {
        self.positions
            .get(owner)
            .map(|position| position.scaled_balance)
            .unwrap_or(0)
    }

    ///
    pub fn scaled_total_supply(&self) -> u128 {
        self.total_scaled_supply
    }

    /// Scaled balance and scaled supply in one read
    pub fn scaled_user_balance_and_supply(&self, owner: &Pubkey) -> (u128, u128) {
        (self.scaled_balance_of(owner), self.total_scaled_supply)
    }

    /// Live balance, `scaled * index(now)`
    pub fn balance_of(
        &self,
        owner: &Pubkey,
        reserve: &ReserveData,
        now: UnixTimestamp,
    ) -> Result<u128, ProgramError> {
        amount_mul_ray(self.scaled_balance_of(owner), K::live_index(reserve, now)?)
    }

    /// Live total supply, `total_scaled * index(now)`
    pub fn total_supply(&self, reserve: &ReserveData, now: UnixTimestamp) -> Result<u128, ProgramError> {
        amount_mul_ray(self.total_scaled_supply, K::live_index(reserve, now)?)
    }

    fn prepare_mint(
        &self,
        caller: &Pubkey,
        owner: &Pubkey,
        amount: u128,
        index: Ray,
        reject_dust: bool,
    ) -> Result<PendingMint, ProgramError> {
        assert_authority(&self.authority, caller)?;

        let scaled_amount = amount_div_ray(amount, index)?;
        if scaled_amount == 0 && reject_dust {
            msg!("{} mint of {} scales to zero", K::NAME, amount);
            return Err(LendingError::InvalidMintAmount.into());
        }

        let previous = self.scaled_balance_of(owner);
        Ok(PendingMint {
            scaled_balance: previous
                .checked_add(scaled_amount)
                .ok_or(LendingError::MathOverflow)?,
            total_scaled_supply: self
                .total_scaled_supply
                .checked_add(scaled_amount)
                .ok_or(LendingError::MathOverflow)?,
            first_position: previous == 0,
        })
    }

    fn write_position(&mut self, owner: &Pubkey, scaled_balance: u128) {
        let position = self.positions.entry(*owner).or_insert_with(|| ScaledPosition {
            version: PROGRAM_VERSION,
            owner: *owner,
            scaled_balance: 0,
        });
        position.scaled_balance = scaled_balance;
    }

    fn commit_mint(&mut self, owner: &Pubkey, pending: PendingMint) -> bool {
        self.write_position(owner, pending.scaled_balance);
        self.total_scaled_supply = pending.total_scaled_supply;
        pending.first_position
    }

    /// Mint `amount / index` scaled units. Returns whether `owner` held nothing before.
    pub fn mint(
        &mut self,
        caller: &Pubkey,
        owner: &Pubkey,
        amount: u128,
        index: Ray,
    ) -> Result<bool, ProgramError> {
        let pending = self.prepare_mint(caller, owner, amount, index, true)?;
        Ok(self.commit_mint(owner, pending))
    }

    /// Scaled units `amount` takes out of `owner`'s position. The full live balance takes the
    /// whole position so no truncated remainder is left behind.
    fn scaled_amount_out(&self, owner: &Pubkey, amount: u128, index: Ray) -> Result<u128, ProgramError> {
        let scaled_balance = self.scaled_balance_of(owner);
        if scaled_balance > 0 && amount == amount_mul_ray(scaled_balance, index)? {
            Ok(scaled_balance)
        } else {
            amount_div_ray(amount, index)
        }
    }

    /// Burn `amount / index` scaled units, or the whole position when `amount` is its live balance
    pub fn burn(
        &mut self,
        caller: &Pubkey,
        owner: &Pubkey,
        amount: u128,
        index: Ray,
    ) -> ProgramResult {
        assert_authority(&self.authority, caller)?;

        let scaled_amount = self.scaled_amount_out(owner, amount, index)?;
        if scaled_amount == 0 {
            msg!("{} burn of {} scales to zero", K::NAME, amount);
            return Err(LendingError::InvalidBurnAmount.into());
        }

        let scaled_balance = self
            .scaled_balance_of(owner)
            .checked_sub(scaled_amount)
            .ok_or(LendingError::InsufficientBalance)?;
        let total_scaled_supply = self
            .total_scaled_supply
            .checked_sub(scaled_amount)
            .ok_or(LendingError::MathOverflow)?;

        self.write_position(owner, scaled_balance);
        self.total_scaled_supply = total_scaled_supply;
        Ok(())
    }

    /// Capture what an operation touching `owners` and the allowance `pairs` can change
    pub fn checkpoint(&self, owners: &[Pubkey], pairs: &[(Pubkey, Pubkey)]) -> ScaledCheckpoint {
        ScaledCheckpoint {
            total_scaled_supply: self.total_scaled_supply,
            positions: snapshot_positions(&self.positions, owners),
            allowances: self.allowances.snapshot(pairs),
        }
    }

    ///
    pub fn restore(&mut self, checkpoint: ScaledCheckpoint) {
        self.total_scaled_supply = checkpoint.total_scaled_supply;
        restore_positions(&mut self.positions, checkpoint.positions);
        self.allowances.restore(checkpoint.allowances);
    }
}

impl ScaledBalanceLedger<Supply> {
    /// Mint the reserve factor share. Dust that scales to zero is dropped silently.
    pub fn mint_to_treasury(
        &mut self,
        caller: &Pubkey,
        treasury: &Pubkey,
        amount: u128,
        index: Ray,
    ) -> ProgramResult {
        if amount == 0 {
            return Ok(());
        }

        let pending = self.prepare_mint(caller, treasury, amount, index, false)?;
        self.commit_mint(treasury, pending);
        Ok(())
    }

    /// Move `amount / index` scaled units between holders, the whole position when `amount` is
    /// `from`'s live balance
    pub fn transfer(
        &mut self,
        caller: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
        index: Ray,
    ) -> Result<TransferReceipt, ProgramError> {
        assert_authority(&self.authority, caller)?;

        let scaled_amount = self.scaled_amount_out(from, amount, index)?;
        let from_scaled_before = self.scaled_balance_of(from);
        let to_scaled_before = self.scaled_balance_of(to);
        if from_scaled_before < scaled_amount {
            msg!("{} transfer of {} exceeds balance of {}", Supply::NAME, amount, from);
            return Err(LendingError::InsufficientBalance.into());
        }

        let (from_scaled_after, to_scaled_after) = if from == to {
            (from_scaled_before, to_scaled_before)
        } else {
            (
                from_scaled_before - scaled_amount,
                to_scaled_before
                    .checked_add(scaled_amount)
                    .ok_or(LendingError::MathOverflow)?,
            )
        };

        let receipt = TransferReceipt {
            scaled_amount,
            from_balance_before: amount_mul_ray(from_scaled_before, index)?,
            from_balance_after: amount_mul_ray(from_scaled_after, index)?,
            to_balance_before: amount_mul_ray(to_scaled_before, index)?,
            to_balance_after: amount_mul_ray(to_scaled_after, index)?,
        };

        self.write_position(from, from_scaled_after);
        self.write_position(to, to_scaled_after);
        Ok(receipt)
    }

    /// Spend the allowance `from` granted `spender`, then transfer
    pub fn transfer_from(
        &mut self,
        caller: &Pubkey,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
        index: Ray,
    ) -> Result<TransferReceipt, ProgramError> {
        let allowance = self.allowances.read(from, spender);
        if allowance < amount {
            msg!("Allowance {} of {} for {} is below {}", allowance, from, spender, amount);
            return Err(LendingError::InsufficientAllowance.into());
        }

        let receipt = self.transfer(caller, from, to, amount, index)?;
        self.allowances.write(from, spender, allowance - amount);
        Ok(receipt)
    }

    ///
    pub fn approve(
        &mut self,
        caller: &Pubkey,
        owner: &Pubkey,
        spender: &Pubkey,
        amount: u128,
    ) -> ProgramResult {
        assert_authority(&self.authority, caller)?;
        self.allowances.write(owner, spender, amount);
        Ok(())
    }

    ///
    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.allowances.read(owner, spender)
    }

    /// Current permit nonce of `owner`
    pub fn nonce(&self, owner: &Pubkey) -> u64 {
        self.nonces.read(owner)
    }

    /// Approve through an owner signed permit
    pub fn permit<V: SignatureVerifier>(
        &mut self,
        permit: &Permit,
        signature: &[u8; 64],
        verifier: &V,
        now: UnixTimestamp,
    ) -> ProgramResult {
        permit.apply(
            &self.key,
            signature,
            verifier,
            &mut self.nonces,
            &mut self.allowances,
            now,
        )
    }
}

impl ScaledBalanceLedger<VariableDebt> {
    /// Let `delegatee` borrow up to `amount` against `delegator`'s credit
    pub fn approve_delegation(
        &mut self,
        caller: &Pubkey,
        delegator: &Pubkey,
        delegatee: &Pubkey,
        amount: u128,
    ) -> ProgramResult {
        assert_authority(&self.authority, caller)?;
        self.allowances.write(delegator, delegatee, amount);
        Ok(())
    }

    ///
    pub fn borrow_allowance(&self, delegator: &Pubkey, delegatee: &Pubkey) -> u128 {
        self.allowances.read(delegator, delegatee)
    }

    /// Mint debt to `on_behalf_of` for funds `user` receives, spending delegation when they differ
    pub fn mint_on_behalf(
        &mut self,
        caller: &Pubkey,
        user: &Pubkey,
        on_behalf_of: &Pubkey,
        amount: u128,
        index: Ray,
    ) -> Result<bool, ProgramError> {
        let pending = self.prepare_mint(caller, on_behalf_of, amount, index, true)?;
        if user != on_behalf_of {
            self.allowances.spend(
                on_behalf_of,
                user,
                amount,
                LendingError::InsufficientBorrowAllowance,
            )?;
        }

        Ok(self.commit_mint(on_behalf_of, pending))
    }
}

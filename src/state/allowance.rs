use super::*;
use std::collections::BTreeMap;

/// Amounts an owner lets a spender move on their behalf
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Allowances(BTreeMap<(Pubkey, Pubkey), u128>);

impl Allowances {
    ///
    pub fn read(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.0.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Overwrite the allowance, zero removes the entry
    pub fn write(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) {
        if amount == 0 {
            self.0.remove(&(*owner, *spender));
        } else {
            self.0.insert((*owner, *spender), amount);
        }
    }

    /// Deduct `amount`, failing with `error` when the allowance is short
    pub fn spend(
        &mut self,
        owner: &Pubkey,
        spender: &Pubkey,
        amount: u128,
        error: LendingError,
    ) -> ProgramResult {
        let allowance = self.read(owner, spender);
        if allowance < amount {
            msg!("Allowance {} of {} for {} is below {}", allowance, owner, spender, amount);
            return Err(error.into());
        }

        self.write(owner, spender, allowance - amount);
        Ok(())
    }

    /// Current amounts of `pairs`, absent ones as zero
    pub fn snapshot(&self, pairs: &[(Pubkey, Pubkey)]) -> Vec<(Pubkey, Pubkey, u128)> {
        pairs
            .iter()
            .map(|(owner, spender)| (*owner, *spender, self.read(owner, spender)))
            .collect()
    }

    /// Write back amounts taken by `snapshot`
    pub fn restore(&mut self, snapshot: Vec<(Pubkey, Pubkey, u128)>) {
        for (owner, spender, amount) in snapshot {
            self.write(&owner, &spender, amount);
        }
    }
}

use super::*;
use solana_program::{clock::UnixTimestamp, hash::{hashv, Hash}};
use std::collections::BTreeMap;

/// Per owner permit counters. A nonce is consumed by exactly one permit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nonces(BTreeMap<Pubkey, u64>);

impl Nonces {
    ///
    pub fn read(&self, owner: &Pubkey) -> u64 {
        self.0.get(owner).copied().unwrap_or(0)
    }

    /// Consume `nonce` if it is the owner's current one
    pub fn consume(&mut self, owner: &Pubkey, nonce: u64) -> ProgramResult {
        let current = self.read(owner);
        if current != nonce {
            msg!("Permit nonce {} does not match {}", nonce, current);
            return Err(LendingError::InvalidPermitNonce.into());
        }

        let next = current.checked_add(1).ok_or(LendingError::MathOverflow)?;
        self.0.insert(*owner, next);
        Ok(())
    }
}

/// Checks an ed25519 signature. Programs delegate this to the signature precompile.
pub trait SignatureVerifier {
    ///
    fn verify(&self, signer: &Pubkey, message: &[u8], signature: &[u8; 64]) -> bool;
}

/// Owner signed approval of `spender` for `value`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Permit {
    ///
    pub owner: Pubkey,
    ///
    pub spender: Pubkey,
    ///
    pub value: u128,
    ///
    pub nonce: u64,
    /// Last timestamp at which the permit may be used
    pub deadline: UnixTimestamp,
}

impl Permit {
    /// Digest the owner signs, bound to a single ledger
    pub fn message(&self, ledger: &Pubkey) -> Hash {
        hashv(&[
            b"permit",
            ledger.as_ref(),
            self.owner.as_ref(),
            self.spender.as_ref(),
            &self.value.to_le_bytes(),
            &self.nonce.to_le_bytes(),
            &self.deadline.to_le_bytes(),
        ])
    }

    /// Verify and consume the permit, then set the allowance
    pub fn apply<V: SignatureVerifier>(
        &self,
        ledger: &Pubkey,
        signature: &[u8; 64],
        verifier: &V,
        nonces: &mut Nonces,
        allowances: &mut Allowances,
        now: UnixTimestamp,
    ) -> ProgramResult {
        if now > self.deadline {
            msg!("Permit deadline {} has passed", self.deadline);
            return Err(LendingError::PermitExpired.into());
        }
        if nonces.read(&self.owner) != self.nonce {
            return Err(LendingError::InvalidPermitNonce.into());
        }
        if !verifier.verify(&self.owner, self.message(ledger).as_ref(), signature) {
            return Err(LendingError::InvalidPermitSignature.into());
        }

        nonces.consume(&self.owner, self.nonce)?;
        allowances.write(&self.owner, &self.spender, self.value);
        Ok(())
    }
}

//! State types
mod allowance;
mod last_update;
mod permit;
mod rate_oracle;
mod rate_strategy;
mod reserve;
mod scaled_ledger;
mod stable_ledger;

pub use allowance::*;
pub use last_update::*;
pub use permit::*;
pub use rate_oracle::*;
pub use rate_strategy::*;
pub use reserve::*;
pub use scaled_ledger::*;
pub use stable_ledger::*;

use crate::{error::LendingError, math::Ray};
use solana_program::{
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};
use std::collections::BTreeMap;

/// Current version of the program and all new accounts created
pub const PROGRAM_VERSION: u8 = 1;

/// Accounts are created with data zeroed out, so uninitialized state instances
/// will have the version set to 0.
pub const UNINITIALIZED_VERSION: u8 = 0;

/// Governance supplied parameters, validated before they are stored
pub trait Param: Sized {
    ///
    fn assert_valid(&self) -> ProgramResult;
}

/// Only the pool authority may mutate ledgers and reserves
pub fn assert_authority(expected: &Pubkey, caller: &Pubkey) -> ProgramResult {
    if expected != caller {
        msg!("Caller {} is not the pool authority {}", caller, expected);
        return Err(LendingError::InvalidAuthority.into());
    }

    Ok(())
}

// Helpers
fn snapshot_positions<P: Clone>(
    positions: &BTreeMap<Pubkey, P>,
    owners: &[Pubkey],
) -> Vec<(Pubkey, Option<P>)> {
    owners
        .iter()
        .map(|owner| (*owner, positions.get(owner).cloned()))
        .collect()
}

fn restore_positions<P>(positions: &mut BTreeMap<Pubkey, P>, snapshot: Vec<(Pubkey, Option<P>)>) {
    for (owner, position) in snapshot {
        match position {
            Some(position) => positions.insert(owner, position),
            None => positions.remove(&owner),
        };
    }
}

fn pack_ray(ray: Ray, dst: &mut [u8; 16]) {
    *dst = ray
        .to_scaled_val()
        .expect("Ray cannot be packed")
        .to_le_bytes();
}

fn unpack_ray(src: &[u8; 16]) -> Ray {
    Ray::from_scaled_val(u128::from_le_bytes(*src))
}

fn pack_bool(boolean: bool, dst: &mut [u8; 1]) {
    *dst = (boolean as u8).to_le_bytes()
}

fn unpack_bool(src: &[u8; 1]) -> Result<bool, ProgramError> {
    match u8::from_le_bytes(*src) {
        0 => Ok(false),
        1 => Ok(true),
        _ => {
            msg!("Boolean cannot be unpacked");
            Err(ProgramError::InvalidAccountData)
        }
    }
}

fn unpack_version(src: &[u8; 1], name: &str) -> Result<u8, ProgramError> {
    let version = u8::from_le_bytes(*src);
    if version > PROGRAM_VERSION {
        msg!("{} version does not match reserve program version", name);
        return Err(ProgramError::InvalidAccountData);
    }

    Ok(version)
}

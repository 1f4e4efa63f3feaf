//! Error types

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// Errors that may be returned by the reserve core.
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum LendingError {
    // 0
    /// Caller is not the authority allowed to mutate this state.
    #[error("Caller is not the designated pool authority")]
    InvalidAuthority,
    /// Math operation overflowed, underflowed or divided by zero.
    #[error("Math operation overflow")]
    MathOverflow,
    /// Mint amount scales to zero units at the given index.
    #[error("Mint amount scales to zero")]
    InvalidMintAmount,
    /// Burn amount scales to zero units at the given index.
    #[error("Burn amount scales to zero")]
    InvalidBurnAmount,
    /// Amount provided cannot be zero.
    #[error("Amount provided cannot be zero")]
    InvalidAmount,

    // 5
    /// Burn or transfer exceeds the live balance.
    #[error("Insufficient balance")]
    InsufficientBalance,
    /// Spender allowance is lower than the requested amount.
    #[error("Insufficient allowance")]
    InsufficientAllowance,
    /// Delegated borrow allowance is lower than the requested amount.
    #[error("Insufficient borrow allowance")]
    InsufficientBorrowAllowance,
    /// Reserve does not hold enough available liquidity.
    #[error("Insufficient liquidity available in reserve")]
    InsufficientLiquidity,
    /// Account has no debt of the selected interest rate mode.
    #[error("No debt of selected type")]
    NoDebtOfSelectedType,

    // 10
    /// Timestamp is older than the last recorded update.
    #[error("Timestamp precedes last update")]
    InvalidTimestamp,
    /// Interest rate strategy parameters are out of range.
    #[error("Invalid interest rate strategy")]
    InvalidRateStrategy,
    /// Reserve configuration is out of range.
    #[error("Invalid reserve config")]
    InvalidReserveConfig,
    /// No reserve is registered for the asset.
    #[error("Reserve not found")]
    ReserveNotFound,
    /// A reserve is already registered for the asset.
    #[error("Reserve already initialized")]
    ReserveAlreadyInitialized,

    // 15
    /// Rate oracle does not serve the requested asset.
    #[error("Rate oracle is not matched with reserve asset")]
    UnmatchedRateOracle,
    /// Permit deadline has passed.
    #[error("Permit expired")]
    PermitExpired,
    /// Permit nonce is not the owner's current nonce.
    #[error("Invalid permit nonce")]
    InvalidPermitNonce,
    /// Permit signature does not verify against the owner.
    #[error("Invalid permit signature")]
    InvalidPermitSignature,
    /// Rate oracle has been paused by its owner.
    #[error("Rate oracle is not available")]
    RateOracleNotAvailable,
}

impl From<LendingError> for ProgramError {
    fn from(e: LendingError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LendingError {
    fn type_of() -> &'static str {
        "Soda Reserve Error"
    }
}

impl PrintProgramError for LendingError {
    fn print<E>(&self)
    where
        E: 'static + std::error::Error + DecodeError<E> + PrintProgramError + FromPrimitive,
    {
        msg!(&self.to_string());
    }
}

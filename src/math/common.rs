//! Common module for Ray and Wad

use solana_program::program_error::ProgramError;

/// Scale of precision for token amounts
pub const SCALE: usize = 18;
/// Identity
pub const WAD: u64 = 1_000_000_000_000_000_000;
/// Scale of precision for rates and indices
pub const RAY_SCALE: usize = 27;
/// Ray identity
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;
/// Multiplier between wad and ray
pub const WAD_RAY_RATIO: u64 = 1_000_000_000;
/// Ray value of one percent
pub const PERCENT_SCALER: u128 = 10_000_000_000_000_000_000_000_000;
/// Ray value of one basis point
pub const BIPS_SCALER: u128 = 100_000_000_000_000_000_000_000;
/// Basis points in one hundred percent
pub const PERCENTAGE_FACTOR: u64 = 10_000;

/// Try to subtract, return an error on underflow
pub trait TrySub: Sized {
    /// Subtract
    fn try_sub(self, rhs: Self) -> Result<Self, ProgramError>;
}

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, ProgramError>;
}

/// Try to divide, return an error on overflow or divide by zero
pub trait TryDiv<RHS>: Sized {
    /// Divide
    fn try_div(self, rhs: RHS) -> Result<Self, ProgramError>;
}

/// Try to multiply, return an error on overflow
pub trait TryMul<RHS>: Sized {
    /// Multiply
    fn try_mul(self, rhs: RHS) -> Result<Self, ProgramError>;
}

#![deny(missing_docs)]

//! Interest accrual and scaled balance core for a pooled lending market.

pub mod error;
pub mod math;
pub mod pool;
pub mod state;

// Export current sdk types for downstream users building with a different sdk version
pub use solana_program;

//! Math for preserving precision of token amounts, rates and indices

mod common;
mod interest;
mod ray;
mod wad;

pub use common::*;
pub use interest::*;
pub use ray::*;
pub use wad::*;

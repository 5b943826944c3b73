//! TokenLedger Common Types
//!
//! This crate contains shared types used across TokenLedger, including
//! identifiers, arbitrary-precision amounts and the error taxonomy.

pub mod identifiers;
pub mod monetary;
pub mod error;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;

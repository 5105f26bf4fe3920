//! Wallet Ledger Common Types
//!
//! This crate contains shared types used across the wallet ledger,
//! including identifiers, monetary types, and the error taxonomy.

pub mod identifiers;
pub mod monetary;
pub mod error;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;

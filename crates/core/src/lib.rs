//! Core domain logic for the LETS token ledger.
//!
//! Pure types and rules with no database or async dependencies. The
//! persistence layer loads lots and wallets, asks this crate what to do, and
//! applies the answer inside one database transaction.
//!
//! # Modules
//!
//! - `ledger` - Lots, wallets, FIFO consumption, exchange and expiry rules
//! - `clock` - Injectable time source

pub mod clock;
pub mod ledger;

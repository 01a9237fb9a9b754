//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! The ledger stores take the connection or transaction to run on, so the
//! ledger service decides the unit of work.

pub mod token_lot;
pub mod transaction;
pub mod user;
pub mod wallet;

pub use token_lot::{NewLot, TokenLotStore};
pub use transaction::{NewTransaction, TransactionStore};
pub use user::{UserRepository, require_user};
pub use wallet::WalletStore;

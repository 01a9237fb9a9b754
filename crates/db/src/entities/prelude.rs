//! Entity re-exports.

pub use super::token_lots::Entity as TokenLots;
pub use super::transactions::Entity as Transactions;
pub use super::users::Entity as Users;
pub use super::wallets::Entity as Wallets;

//! Ledger domain models, persistence-friendly types, and recurrence math.

pub mod account;
pub mod account_item;
pub mod contractor;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod recurrence;
pub mod transaction;

pub use account::Account;
pub use account_item::AccountItem;
pub use contractor::{ContractorKind, ContractorRef, Customer, HoldsCurrencyAccounts, Office, User};
pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};
pub use transaction::{RepeatRule, RepeatUnit, Transaction, TransactionKind, TransactionStatus};

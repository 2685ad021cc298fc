use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{CurrencyCode, ExchangeRates};

use super::{
    account::Account,
    account_item::AccountItem,
    contractor::{ContractorRef, Customer, Office, User},
    transaction::Transaction,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The durable aggregate the engine operates on: accounts, categories,
/// contractor entities, the transaction log, and the exchange-rate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub account_items: Vec<AccountItem>,
    #[serde(default)]
    pub offices: Vec<Office>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub rates: ExchangeRates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>, base_currency: CurrencyCode) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            account_items: Vec::new(),
            offices: Vec::new(),
            customers: Vec::new(),
            users: Vec::new(),
            transactions: Vec::new(),
            rates: ExchangeRates::new(base_currency),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_account_item(&mut self, item: AccountItem) -> Uuid {
        let id = item.id;
        self.account_items.push(item);
        self.touch();
        id
    }

    pub fn add_office(&mut self, office: Office) -> Uuid {
        let id = office.id;
        self.offices.push(office);
        self.touch();
        id
    }

    pub fn add_customer(&mut self, customer: Customer) -> Uuid {
        let id = customer.id;
        self.customers.push(customer);
        self.touch();
        id
    }

    pub fn add_user(&mut self, user: User) -> Uuid {
        let id = user.id;
        self.users.push(user);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    /// Removes an account, returning it if it existed.
    pub fn remove_account(&mut self, id: Uuid) -> Option<Account> {
        let index = self.accounts.iter().position(|account| account.id == id)?;
        let removed = self.accounts.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn account_item(&self, id: Uuid) -> Option<&AccountItem> {
        self.account_items.iter().find(|item| item.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the referenced contractor entity exists in this ledger.
    pub fn contractor_exists(&self, reference: ContractorRef) -> bool {
        match reference {
            ContractorRef::Office(id) => self.offices.iter().any(|office| office.id == id),
            ContractorRef::Customer(id) => self.customers.iter().any(|customer| customer.id == id),
            ContractorRef::User(id) => self.users.iter().any(|user| user.id == id),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::contractor::Office;

    #[test]
    fn contractor_lookup_distinguishes_kinds() {
        let mut ledger = Ledger::new("Lookup", CurrencyCode::new("USD"));
        let office_id = ledger.add_office(Office::new("HQ"));
        assert!(ledger.contractor_exists(ContractorRef::Office(office_id)));
        assert!(!ledger.contractor_exists(ContractorRef::Customer(office_id)));
    }

    #[test]
    fn remove_account_returns_the_removed_row() {
        let mut ledger = Ledger::new("Accounts", CurrencyCode::new("USD"));
        let id = ledger.add_account(Account::new(CurrencyCode::new("USD")));
        let removed = ledger.remove_account(id).expect("account should exist");
        assert_eq!(removed.id, id);
        assert!(ledger.account(id).is_none());
        assert!(ledger.remove_account(id).is_none());
    }
}

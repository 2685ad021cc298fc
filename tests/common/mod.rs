#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use treasury_core::currency::CurrencyCode;
use treasury_core::ledger::{
    Account, AccountItem, ContractorKind, ContractorRef, Customer, Ledger, Office, RepeatRule,
    Transaction, TransactionKind, TransactionStatus,
};

/// A ledger prepared with the parties and accounts most tests need.
pub struct Fixture {
    pub ledger: Ledger,
    pub office_id: Uuid,
    pub branch_id: Uuid,
    pub customer_id: Uuid,
    /// Office-owned USD account seeded with 1000.
    pub usd_account: Uuid,
    /// Branch-owned EUR account seeded with 500.
    pub eur_account: Uuid,
    /// Category whose widget selects customers.
    pub client_item: Uuid,
    /// Untyped category for transfers.
    pub transfer_item: Uuid,
}

pub fn fixture() -> Fixture {
    let mut ledger = Ledger::new("Test", CurrencyCode::new("USD"));
    let office_id = ledger.add_office(Office::new("HQ"));
    let branch_id = ledger.add_office(Office::new("Branch"));
    let customer_id = ledger.add_customer(Customer::new("Acme"));

    let mut usd = Account::owned_by(CurrencyCode::new("USD"), ContractorRef::Office(office_id));
    usd.total = dec!(1000);
    let usd_account = ledger.add_account(usd);

    let mut eur = Account::owned_by(CurrencyCode::new("EUR"), ContractorRef::Office(branch_id));
    eur.total = dec!(500);
    let eur_account = ledger.add_account(eur);

    let client_item =
        ledger.add_account_item(AccountItem::new("Client services", Some(ContractorKind::Customer)));
    let transfer_item = ledger.add_account_item(AccountItem::new("Internal transfer", None));

    ledger
        .rates
        .set_rate(CurrencyCode::new("EUR"), dec!(0.92));

    Fixture {
        ledger,
        office_id,
        branch_id,
        customer_id,
        usd_account,
        eur_account,
        client_item,
        transfer_item,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A raw group row, for seeding rollover scenarios without the builder.
pub fn group_row(
    fixture: &Fixture,
    day: NaiveDate,
    code: Uuid,
    rule: RepeatRule,
    status: TransactionStatus,
    amount: Decimal,
) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: Uuid::new_v4(),
        kind: TransactionKind::Expense,
        account_item_id: fixture.client_item,
        project_id: None,
        description: None,
        account_from: fixture.usd_account,
        account_to: fixture.eur_account,
        contractor: ContractorRef::Customer(fixture.customer_id),
        amount,
        conversion_rate: Decimal::ONE,
        date: day,
        planned: true,
        status,
        repeat: Some(rule),
        repeated_code: Some(code),
        created_at: now,
        updated_at: now,
    }
}

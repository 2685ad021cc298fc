use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::CurrencyCode;

use super::contractor::ContractorRef;

/// A balance holder in a single currency.
///
/// Accounts are either created explicitly by an operator or provisioned on
/// demand when a contractor first needs a sub-account in a currency. The
/// `owner` is absent for free-standing system accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub currency: CurrencyCode,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ContractorRef>,
}

impl Account {
    /// Creates a free-standing account with a zero balance.
    pub fn new(currency: CurrencyCode) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency,
            total: Decimal::ZERO,
            owner: None,
        }
    }

    /// Creates a zero-balance account owned by the given contractor.
    pub fn owned_by(currency: CurrencyCode, owner: ContractorRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency,
            total: Decimal::ZERO,
            owner: Some(owner),
        }
    }
}

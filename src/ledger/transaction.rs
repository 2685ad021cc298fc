use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contractor::ContractorRef;

/// The three money-movement kinds the engine records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Expense,
    Income,
    Transfer,
}

/// Lifecycle of a transaction row. `Complete` and `Disabled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Complete,
    Disabled,
}

/// Calendar unit of a recurrence rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RepeatUnit {
    Week,
    Month,
    Year,
}

/// How often a recurring request repeats within its starting year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepeatRule {
    pub unit: RepeatUnit,
    pub every: u32,
}

impl RepeatRule {
    pub fn new(unit: RepeatUnit, every: u32) -> Self {
        Self { unit, every }
    }
}

/// The atomic money-movement record.
///
/// Rows belonging to one recurrence group share a `repeated_code`; rows
/// outside any group carry none. A `planned` row is a scheduled intent that
/// settles later through the status state machine; a non-planned row is
/// settled the moment it is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub account_item_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub account_from: Uuid,
    pub account_to: Uuid,
    pub contractor: ContractorRef,
    pub amount: Decimal,
    pub conversion_rate: Decimal,
    pub date: NaiveDate,
    pub planned: bool,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeated_code: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Clones this row into a future occurrence of its recurrence group.
    ///
    /// The copy gets a fresh identity and the given date; every generated
    /// occurrence is a pending planned row no matter how the base itself
    /// was stamped.
    pub fn series_instance(&self, date: NaiveDate) -> Transaction {
        let now = Utc::now();
        let mut instance = self.clone();
        instance.id = Uuid::new_v4();
        instance.date = date;
        instance.planned = true;
        instance.status = TransactionStatus::Pending;
        instance.created_at = now;
        instance.updated_at = now;
        instance
    }

    /// Whether this row belongs to the given recurrence group.
    ///
    /// A row without a group code only matches itself, so a stray planned
    /// item never drags unrelated rows into a cascade.
    pub fn in_group(&self, code: Option<Uuid>, fallback_id: Uuid) -> bool {
        match code {
            Some(code) => self.repeated_code == Some(code),
            None => self.id == fallback_id,
        }
    }
}

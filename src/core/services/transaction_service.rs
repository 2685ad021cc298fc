//! Construction of fully-resolved transaction rows from creation requests.

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::{
    recurrence, ContractorRef, Ledger, RepeatRule, Transaction, TransactionKind, TransactionStatus,
};

use super::{ContractorService, ServiceError, ServiceResult, WidgetCatalog};

static MAX_AMOUNT: Lazy<Decimal> = Lazy::new(|| Decimal::new(99_999_999, 2));
static MAX_RATE: Lazy<Decimal> = Lazy::new(|| Decimal::new(999_999, 2));

/// A pre-validated creation request for one transaction, possibly recurring.
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub kind: TransactionKind,
    /// The caller's acting account: source for expense/transfer, target for income.
    pub account_id: Uuid,
    /// Destination account, transfers only.
    pub transfer_account_id: Option<Uuid>,
    pub account_item_id: Uuid,
    /// Counter-party id, expense/income only; its kind comes from the category widget.
    pub contractor_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
    pub amount: Decimal,
    pub conversion_rate: Option<Decimal>,
    pub date: NaiveDate,
    pub planned: bool,
    pub repeat: Option<RepeatRule>,
    /// Drop the source account once the settlement has been applied.
    pub close_source: bool,
}

impl CreateTransaction {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_amount(self.amount)?;
        if let Some(rate) = self.conversion_rate {
            if rate <= Decimal::ZERO || rate > *MAX_RATE {
                return Err(ServiceError::Invalid(
                    "Conversion rate must be within (0, 9999.99]".into(),
                ));
            }
        }
        match self.kind {
            TransactionKind::Transfer => {
                if self.transfer_account_id.is_none() {
                    return Err(ServiceError::Invalid(
                        "Transfer requires a destination account".into(),
                    ));
                }
            }
            TransactionKind::Expense | TransactionKind::Income => {
                if self.contractor_id.is_none() {
                    return Err(ServiceError::Invalid(
                        "Expense and income require a contractor".into(),
                    ));
                }
            }
        }
        if let Some(rule) = &self.repeat {
            if rule.every == 0 {
                return Err(ServiceError::Invalid(
                    "Repeat interval must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_amount(amount: Decimal) -> ServiceResult<()> {
    if amount < Decimal::ZERO || amount > *MAX_AMOUNT {
        return Err(ServiceError::Invalid(
            "Amount must be within [0, 999999.99]".into(),
        ));
    }
    Ok(())
}

/// Identifiers of the rows one creation call produced.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub transaction_ids: Vec<Uuid>,
    pub repeated_code: Option<Uuid>,
}

/// Builds and persists transactions, applying settlement balance effects.
pub struct TransactionService;

impl TransactionService {
    /// Resolves the request into a base row plus its recurrence series and
    /// appends everything to the ledger in one bulk push.
    ///
    /// Balances move only when a row settles: immediately for non-planned
    /// requests, otherwise at the pending -> complete transition. Planned
    /// future rows never touch account totals.
    pub fn create(
        ledger: &mut Ledger,
        catalog: &mut WidgetCatalog,
        request: CreateTransaction,
    ) -> ServiceResult<CreateOutcome> {
        request.validate()?;

        let acting = ledger
            .account(request.account_id)
            .ok_or_else(|| LedgerError::NotFound(format!("account {}", request.account_id)))?;
        let acting_currency = acting.currency.clone();

        let (account_from, account_to, contractor, amount, rate) = match request.kind {
            TransactionKind::Expense => {
                let contractor = Self::resolve_counterparty(ledger, catalog, &request)?;
                let sub_account =
                    ContractorService::currency_account(ledger, contractor, &acting_currency)?;
                (
                    request.account_id,
                    sub_account,
                    contractor,
                    request.amount,
                    Decimal::ONE,
                )
            }
            TransactionKind::Income => {
                let contractor = Self::resolve_counterparty(ledger, catalog, &request)?;
                let sub_account =
                    ContractorService::currency_account(ledger, contractor, &acting_currency)?;
                (
                    sub_account,
                    request.account_id,
                    contractor,
                    request.amount,
                    Decimal::ONE,
                )
            }
            TransactionKind::Transfer => {
                let target_id = request.transfer_account_id.ok_or_else(|| {
                    ServiceError::Invalid("Transfer requires a destination account".into())
                })?;
                let target = ledger
                    .account(target_id)
                    .ok_or_else(|| LedgerError::NotFound(format!("account {target_id}")))?;
                let target_currency = target.currency.clone();
                let owner = target.owner.ok_or_else(|| {
                    LedgerError::NotFound(format!("owning contractor of account {target_id}"))
                })?;
                let contractor = ContractorService::resolve(ledger, owner.kind(), owner.id())?;
                let (amount, rate) = if target_currency != acting_currency {
                    let rate = match request.conversion_rate {
                        Some(rate) => rate,
                        None => ledger.rates.rate_for(&target_currency)?,
                    };
                    (request.amount * rate, rate)
                } else {
                    (request.amount, Decimal::ONE)
                };
                (request.account_id, target_id, contractor, amount, rate)
            }
        };

        let now = Utc::now();
        let status = if request.planned {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Complete
        };
        let mut base = Transaction {
            id: Uuid::new_v4(),
            kind: request.kind,
            account_item_id: request.account_item_id,
            project_id: request.project_id,
            description: request.description.clone(),
            account_from,
            account_to,
            contractor,
            amount,
            conversion_rate: rate,
            date: request.date,
            planned: request.planned,
            status,
            repeat: request.repeat.clone(),
            repeated_code: None,
            created_at: now,
            updated_at: now,
        };

        let mut series = Vec::new();
        if let Some(rule) = &request.repeat {
            base.repeated_code = Some(Uuid::new_v4());
            series = recurrence::series_dates(request.date, rule)
                .into_iter()
                .map(|occurrence| base.series_instance(occurrence))
                .collect();
        }
        let repeated_code = base.repeated_code;

        let mut transaction_ids = Vec::with_capacity(1 + series.len());
        let settle_now = !base.planned;
        let settled = base.clone();
        transaction_ids.push(ledger.add_transaction(base));
        for instance in series {
            transaction_ids.push(ledger.add_transaction(instance));
        }

        if settle_now {
            Self::settle(ledger, &settled)?;
            if request.close_source {
                ledger.remove_account(settled.account_from);
            }
        }

        tracing::info!(
            kind = ?request.kind,
            rows = transaction_ids.len(),
            settled = settle_now,
            "transaction created"
        );
        Ok(CreateOutcome {
            transaction_ids,
            repeated_code,
        })
    }

    fn resolve_counterparty(
        ledger: &Ledger,
        catalog: &mut WidgetCatalog,
        request: &CreateTransaction,
    ) -> ServiceResult<ContractorRef> {
        let kind = catalog
            .widget_for(ledger, request.account_item_id)?
            .ok_or_else(|| {
                ServiceError::Invalid("Category does not name a contractor kind".into())
            })?;
        let contractor_id = request.contractor_id.ok_or_else(|| {
            ServiceError::Invalid("Expense and income require a contractor".into())
        })?;
        ContractorService::resolve(ledger, kind, contractor_id)
    }

    /// Applies the balance effects of a settled row: the source loses the
    /// stored amount, the destination gains `amount / rate` with the stored
    /// conversion rate when the leg currencies differ.
    pub(crate) fn settle(ledger: &mut Ledger, transaction: &Transaction) -> ServiceResult<()> {
        let from_currency = ledger
            .account(transaction.account_from)
            .ok_or_else(|| {
                LedgerError::NotFound(format!("account {}", transaction.account_from))
            })?
            .currency
            .clone();
        let to_currency = ledger
            .account(transaction.account_to)
            .ok_or_else(|| LedgerError::NotFound(format!("account {}", transaction.account_to)))?
            .currency
            .clone();
        let divisor = if from_currency != to_currency {
            transaction.conversion_rate
        } else {
            Decimal::ONE
        };
        if divisor <= Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "Conversion rate must be positive".into(),
            ));
        }
        if let Some(from) = ledger.account_mut(transaction.account_from) {
            from.total -= transaction.amount;
        }
        if let Some(to) = ledger.account_mut(transaction.account_to) {
            to.total += transaction.amount / divisor;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_request() -> CreateTransaction {
        CreateTransaction {
            kind: TransactionKind::Transfer,
            account_id: Uuid::new_v4(),
            transfer_account_id: Some(Uuid::new_v4()),
            account_item_id: Uuid::new_v4(),
            contractor_id: None,
            project_id: None,
            description: None,
            amount: dec!(100),
            conversion_rate: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            planned: false,
            repeat: None,
            close_source: false,
        }
    }

    #[test]
    fn validation_rejects_out_of_range_amounts() {
        let mut request = base_request();
        request.amount = dec!(-0.01);
        assert!(request.validate().is_err());
        request.amount = dec!(1000000);
        assert!(request.validate().is_err());
        request.amount = dec!(999999.99);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_rates_and_missing_parties() {
        let mut request = base_request();
        request.conversion_rate = Some(dec!(0));
        assert!(request.validate().is_err());
        request.conversion_rate = Some(dec!(0.5));
        assert!(request.validate().is_ok());

        request.transfer_account_id = None;
        assert!(request.validate().is_err());

        let mut expense = base_request();
        expense.kind = TransactionKind::Expense;
        assert!(expense.validate().is_err());
        expense.contractor_id = Some(Uuid::new_v4());
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn validation_rejects_zero_repeat_interval() {
        let mut request = base_request();
        request.repeat = Some(RepeatRule::new(crate::ledger::RepeatUnit::Week, 0));
        assert!(request.validate().is_err());
    }
}

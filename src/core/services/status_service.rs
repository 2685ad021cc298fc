//! The pending -> complete / pending -> disabled state machine for planned rows.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::{Ledger, Transaction, TransactionStatus};

use super::transaction_service::{validate_amount, TransactionService};
use super::ServiceResult;

/// Caller-supplied replacements applied to the realized row on completion.
#[derive(Debug, Clone, Default)]
pub struct CompleteOverrides {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

/// What a transition did: at most one realized row, plus cascade counts.
#[derive(Debug, Clone)]
pub struct StatusOutcome {
    pub realized_id: Option<Uuid>,
    pub disabled: usize,
    pub removed: usize,
}

/// Executes status transitions on a single planned pending instance.
pub struct StatusService;

impl StatusService {
    /// Moves a planned pending row to `Complete` or `Disabled`.
    ///
    /// Every other request, including transitions on settled rows or on
    /// rows that already reached a terminal status, fails without writes.
    pub fn transition(
        ledger: &mut Ledger,
        transaction_id: Uuid,
        target: TransactionStatus,
        overrides: CompleteOverrides,
    ) -> ServiceResult<StatusOutcome> {
        let template = ledger
            .transaction(transaction_id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {transaction_id}")))?
            .clone();
        if !template.planned || template.status != TransactionStatus::Pending {
            return Err(Self::rejected(&template, target));
        }
        match target {
            TransactionStatus::Complete => Self::complete(ledger, template, overrides),
            TransactionStatus::Disabled => Self::disable(ledger, template),
            TransactionStatus::Pending => Err(Self::rejected(&template, target)),
        }
    }

    fn rejected(template: &Transaction, target: TransactionStatus) -> super::ServiceError {
        LedgerError::InvalidTransition(format!(
            "{:?} (planned: {}) -> {:?}",
            template.status, template.planned, target
        ))
        .into()
    }

    /// Materializes the template: inserts a realized non-planned twin and
    /// marks the template complete so it stays behind as the honored marker.
    fn complete(
        ledger: &mut Ledger,
        template: Transaction,
        overrides: CompleteOverrides,
    ) -> ServiceResult<StatusOutcome> {
        let now = Utc::now();
        let mut realized = template.clone();
        realized.id = Uuid::new_v4();
        realized.planned = false;
        realized.status = TransactionStatus::Complete;
        realized.repeat = None;
        realized.repeated_code = None;
        realized.created_at = now;
        realized.updated_at = now;
        if let Some(amount) = overrides.amount {
            validate_amount(amount)?;
            realized.amount = amount;
        }
        if let Some(description) = overrides.description {
            realized.description = Some(description);
        }

        TransactionService::settle(ledger, &realized)?;
        let realized_id = ledger.add_transaction(realized);
        let row = ledger
            .transaction_mut(template.id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", template.id)))?;
        row.status = TransactionStatus::Complete;
        row.updated_at = now;
        ledger.touch();

        tracing::info!(template = %template.id, realized = %realized_id, "planned transaction honored");
        Ok(StatusOutcome {
            realized_id: Some(realized_id),
            disabled: 0,
            removed: 0,
        })
    }

    /// Voids the whole recurrence group: honored occurrences flip to
    /// disabled, and pending occurrences from the trigger date onward are
    /// removed outright.
    fn disable(ledger: &mut Ledger, trigger: Transaction) -> ServiceResult<StatusOutcome> {
        let now = Utc::now();
        let code = trigger.repeated_code;

        let mut disabled = 0usize;
        for row in ledger
            .transactions
            .iter_mut()
            .filter(|row| row.in_group(code, trigger.id))
        {
            if row.status == TransactionStatus::Complete {
                row.status = TransactionStatus::Disabled;
                row.updated_at = now;
                disabled += 1;
            }
        }

        let mut removed = 0usize;
        ledger.transactions.retain(|row| {
            let cancelled = row.in_group(code, trigger.id)
                && row.status == TransactionStatus::Pending
                && row.date >= trigger.date;
            if cancelled {
                removed += 1;
            }
            !cancelled
        });
        ledger.touch();

        tracing::info!(
            trigger = %trigger.id,
            disabled,
            removed,
            "recurrence group disabled"
        );
        Ok(StatusOutcome {
            realized_id: None,
            disabled,
            removed,
        })
    }
}

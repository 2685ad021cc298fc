//! The yearly batch that extends exhausted recurrence groups into a new year.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::ledger::{recurrence, Ledger, Transaction, TransactionStatus};

use super::ServiceResult;

/// Batch summary: groups considered, rows created, groups skipped on error.
#[derive(Debug, Clone)]
pub struct RolloverReport {
    pub groups: usize,
    pub created: usize,
    pub skipped: usize,
}

/// Regenerates next-year series for recurring groups honored last year.
///
/// The job is not idempotent: re-running it over an already rolled year
/// duplicates the series. At-most-once scheduling is the caller's contract.
pub struct RolloverService;

impl RolloverService {
    /// Rolls every group of planned, completed rows dated in the year
    /// before `today` into `today`'s year.
    ///
    /// One representative per `repeated_code` (its latest occurrence)
    /// seeds the new series. A group whose rule cannot produce a first
    /// occurrence is logged and skipped; the rest of the batch proceeds.
    pub fn run(ledger: &mut Ledger, today: NaiveDate) -> ServiceResult<RolloverReport> {
        let prior_year = today.year() - 1;
        let target_year = today.year();

        let mut representatives: BTreeMap<Uuid, Transaction> = BTreeMap::new();
        for txn in &ledger.transactions {
            if !txn.planned
                || txn.status != TransactionStatus::Complete
                || txn.date.year() != prior_year
            {
                continue;
            }
            let Some(code) = txn.repeated_code else {
                continue;
            };
            match representatives.entry(code) {
                Entry::Occupied(mut entry) => {
                    if txn.date > entry.get().date {
                        entry.insert(txn.clone());
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(txn.clone());
                }
            }
        }

        let groups = representatives.len();
        let mut batch: Vec<Transaction> = Vec::new();
        let mut skipped = 0usize;
        for (code, representative) in representatives {
            let Some(rule) = representative.repeat.clone() else {
                tracing::warn!(group = %code, "recurrence group has no repeat rule, skipping");
                skipped += 1;
                continue;
            };
            let start = match recurrence::rollover_start(representative.date, &rule, target_year) {
                Ok(start) => start,
                Err(err) => {
                    tracing::warn!(group = %code, error = %err, "skipping recurrence group");
                    skipped += 1;
                    continue;
                }
            };
            let base = representative.series_instance(start);
            let series: Vec<Transaction> = recurrence::series_dates(start, &rule)
                .into_iter()
                .map(|occurrence| base.series_instance(occurrence))
                .collect();
            batch.push(base);
            batch.extend(series);
        }

        let created = batch.len();
        if created > 0 {
            ledger.transactions.extend(batch);
            ledger.touch();
        }
        tracing::info!(groups, created, skipped, year = target_year, "annual rollover finished");
        Ok(RolloverReport {
            groups,
            created,
            skipped,
        })
    }
}

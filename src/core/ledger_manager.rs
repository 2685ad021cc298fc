use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::{Ledger, TransactionStatus, CURRENT_SCHEMA_VERSION};

use super::services::{
    CompleteOverrides, CreateOutcome, CreateTransaction, RolloverReport, RolloverService,
    ServiceResult, StatusOutcome, StatusService, TransactionService, WidgetCatalog,
};

/// Trait that abstracts interaction with the persistence layer.
pub trait StorageBackend: Send + Sync {
    fn load_named(&self, name: &str) -> Result<LoadReport, LedgerError>;
    fn load_from_path(&self, path: &Path) -> Result<LoadReport, LedgerError>;
    fn save_named(&self, ledger: &mut Ledger, name: &str) -> Result<PathBuf, LedgerError>;
    fn save_to_path(&self, ledger: &mut Ledger, path: &Path) -> Result<(), LedgerError>;
    fn ledger_path(&self, name: &str) -> PathBuf;
}

/// Outcome of a load operation.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub ledger: Ledger,
    pub path: PathBuf,
    pub name: Option<String>,
    pub schema_version: u8,
}

/// Facade that coordinates ledger state, the engine services, and storage.
///
/// Every engine operation runs against a working copy of the current
/// ledger and only replaces (and persists) it on success, so a failing
/// call leaves no partial mutation in memory or on disk.
pub struct LedgerManager {
    pub current: Option<Ledger>,
    current_name: Option<String>,
    current_path: Option<PathBuf>,
    storage: Box<dyn StorageBackend>,
    catalog: WidgetCatalog,
}

impl LedgerManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_name: None,
            current_path: None,
            storage,
            catalog: WidgetCatalog::new(),
        }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    /// Creates a transaction (and, for recurring requests, its series).
    pub fn create_transaction(&mut self, request: CreateTransaction) -> ServiceResult<CreateOutcome> {
        self.with_transaction(|ledger, catalog| TransactionService::create(ledger, catalog, request))
    }

    /// Runs the pending -> complete / pending -> disabled state machine.
    pub fn transition_status(
        &mut self,
        transaction_id: Uuid,
        target: TransactionStatus,
        overrides: CompleteOverrides,
    ) -> ServiceResult<StatusOutcome> {
        self.with_transaction(|ledger, _| {
            StatusService::transition(ledger, transaction_id, target, overrides)
        })
    }

    /// Extends last year's honored recurrence groups into `today`'s year.
    pub fn run_annual_rollover(&mut self, today: NaiveDate) -> ServiceResult<RolloverReport> {
        self.with_transaction(|ledger, _| RolloverService::run(ledger, today))
    }

    /// Drops a cached category widget after an account-item edit.
    pub fn invalidate_account_item(&mut self, account_item_id: Uuid) {
        self.catalog.invalidate(account_item_id);
    }

    fn with_transaction<T, F>(&mut self, op: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut Ledger, &mut WidgetCatalog) -> ServiceResult<T>,
    {
        let mut working = self
            .current
            .clone()
            .ok_or_else(|| LedgerError::Persistence("no ledger loaded".into()))?;
        let result = match op(&mut working, &mut self.catalog) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(error = %err, "ledger operation failed, working copy discarded");
                return Err(err);
            }
        };
        let previous = self.current.replace(working);
        if self.current_name.is_some() || self.current_path.is_some() {
            if let Err(err) = self.save() {
                self.current = previous;
                tracing::error!(error = %err, "failed to persist ledger, operation rolled back");
                return Err(err.into());
            }
        }
        Ok(result)
    }

    pub fn load(&mut self, name: &str) -> Result<(), LedgerError> {
        let report = self.storage.load_named(name)?;
        self.ensure_schema_support(report.schema_version)?;
        self.apply_load(report);
        Ok(())
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<(), LedgerError> {
        let report = self.storage.load_from_path(path)?;
        self.ensure_schema_support(report.schema_version)?;
        self.apply_load(report);
        Ok(())
    }

    pub fn save(&mut self) -> Result<PathBuf, LedgerError> {
        let mut snapshot = self
            .current
            .clone()
            .ok_or_else(|| LedgerError::Persistence("no ledger loaded".into()))?;
        if let Some(name) = self.current_name.clone() {
            let path = self.storage.save_named(&mut snapshot, &name)?;
            self.current = Some(snapshot);
            self.current_path = Some(path.clone());
            Ok(path)
        } else if let Some(path) = self.current_path.clone() {
            self.storage.save_to_path(&mut snapshot, &path)?;
            self.current = Some(snapshot);
            Ok(path)
        } else {
            Err(LedgerError::Persistence(
                "unable to determine save target for current ledger".into(),
            ))
        }
    }

    pub fn save_as(&mut self, name: &str) -> Result<PathBuf, LedgerError> {
        let mut snapshot = self
            .current
            .clone()
            .ok_or_else(|| LedgerError::Persistence("no ledger loaded".into()))?;
        let path = self.storage.save_named(&mut snapshot, name)?;
        self.current = Some(snapshot);
        self.current_name = Some(name.to_string());
        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.storage.ledger_path(name)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn set_current(&mut self, ledger: Ledger, path: Option<PathBuf>, name: Option<String>) {
        self.current = Some(ledger);
        self.current_path = path;
        self.current_name = name;
        self.catalog.clear();
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_name = None;
        self.current_path = None;
        self.catalog.clear();
    }

    fn ensure_schema_support(&self, schema_version: u8) -> Result<(), LedgerError> {
        if schema_version > CURRENT_SCHEMA_VERSION {
            return Err(LedgerError::Persistence(format!(
                "ledger schema v{} is newer than supported v{}",
                schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(())
    }

    fn apply_load(&mut self, report: LoadReport) {
        let LoadReport {
            ledger,
            path,
            name,
            schema_version: _,
        } = report;
        self.current = Some(ledger);
        self.current_path = Some(path);
        self.current_name = name;
        self.catalog.clear();
    }
}

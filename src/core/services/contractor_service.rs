//! Resolution of transaction counter-parties and their currency accounts.

use std::collections::HashMap;

use uuid::Uuid;

use crate::currency::CurrencyCode;
use crate::errors::LedgerError;
use crate::ledger::{Account, ContractorKind, ContractorRef, Ledger};

use super::ServiceResult;

/// Read-through cache over account-item widget tags.
///
/// The widget of a category is stable between edits, so repeated creations
/// against the same category resolve from the cache. Callers that edit an
/// account item must invalidate its entry.
#[derive(Debug, Default)]
pub struct WidgetCatalog {
    cache: HashMap<Uuid, Option<ContractorKind>>,
}

impl WidgetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The contractor kind selected by the category's widget, or `None`
    /// for untyped categories.
    pub fn widget_for(
        &mut self,
        ledger: &Ledger,
        account_item_id: Uuid,
    ) -> ServiceResult<Option<ContractorKind>> {
        if let Some(cached) = self.cache.get(&account_item_id) {
            return Ok(*cached);
        }
        let widget = ledger
            .account_item(account_item_id)
            .map(|item| item.widget)
            .ok_or_else(|| LedgerError::NotFound(format!("account item {account_item_id}")))?;
        self.cache.insert(account_item_id, widget);
        Ok(widget)
    }

    pub fn invalidate(&mut self, account_item_id: Uuid) {
        self.cache.remove(&account_item_id);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Resolves contractor references and provisions their currency accounts.
pub struct ContractorService;

impl ContractorService {
    /// Confirms that a contractor of the given kind exists and returns the
    /// tagged reference used on transaction rows.
    pub fn resolve(
        ledger: &Ledger,
        kind: ContractorKind,
        contractor_id: Uuid,
    ) -> ServiceResult<ContractorRef> {
        let reference = ContractorRef::new(kind, contractor_id);
        if ledger.contractor_exists(reference) {
            Ok(reference)
        } else {
            Err(LedgerError::NotFound(format!("{kind:?} contractor {contractor_id}")).into())
        }
    }

    /// The contractor's account in the given currency, created with a zero
    /// balance on first use.
    pub fn currency_account(
        ledger: &mut Ledger,
        contractor: ContractorRef,
        currency: &CurrencyCode,
    ) -> ServiceResult<Uuid> {
        if let Some(account) = ledger
            .accounts
            .iter()
            .find(|account| account.owner == Some(contractor) && &account.currency == currency)
        {
            return Ok(account.id);
        }
        let account = Account::owned_by(currency.clone(), contractor);
        tracing::debug!(
            contractor = ?contractor,
            currency = currency.as_str(),
            account = %account.id,
            "provisioned contractor currency account"
        );
        Ok(ledger.add_account(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountItem, Customer, Office};

    fn ledger_with_office() -> (Ledger, Uuid) {
        let mut ledger = Ledger::new("Contractors", CurrencyCode::new("USD"));
        let office_id = ledger.add_office(Office::new("HQ"));
        (ledger, office_id)
    }

    #[test]
    fn resolve_rejects_missing_entities() {
        let (ledger, office_id) = ledger_with_office();
        assert!(ContractorService::resolve(&ledger, ContractorKind::Office, office_id).is_ok());
        let err = ContractorService::resolve(&ledger, ContractorKind::Customer, office_id)
            .expect_err("an office id is not a customer id");
        assert!(matches!(
            err,
            crate::core::services::ServiceError::Ledger(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn currency_account_is_provisioned_once() {
        let (mut ledger, office_id) = ledger_with_office();
        let contractor = ContractorRef::Office(office_id);
        let usd = CurrencyCode::new("USD");
        let first = ContractorService::currency_account(&mut ledger, contractor, &usd).unwrap();
        let second = ContractorService::currency_account(&mut ledger, contractor, &usd).unwrap();
        assert_eq!(first, second);
        assert_eq!(ledger.accounts.len(), 1);

        let eur = CurrencyCode::new("EUR");
        let third = ContractorService::currency_account(&mut ledger, contractor, &eur).unwrap();
        assert_ne!(first, third);
        assert_eq!(ledger.accounts.len(), 2);
    }

    #[test]
    fn widget_catalog_reads_through_and_invalidates() {
        let mut ledger = Ledger::new("Catalog", CurrencyCode::new("USD"));
        let item_id = ledger.add_account_item(AccountItem::new(
            "Client work",
            Some(ContractorKind::Customer),
        ));
        ledger.add_customer(Customer::new("Acme"));

        let mut catalog = WidgetCatalog::new();
        assert_eq!(
            catalog.widget_for(&ledger, item_id).unwrap(),
            Some(ContractorKind::Customer)
        );

        // A stale cache survives an edit until invalidated.
        ledger
            .account_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .unwrap()
            .widget = Some(ContractorKind::Office);
        assert_eq!(
            catalog.widget_for(&ledger, item_id).unwrap(),
            Some(ContractorKind::Customer)
        );
        catalog.invalidate(item_id);
        assert_eq!(
            catalog.widget_for(&ledger, item_id).unwrap(),
            Some(ContractorKind::Office)
        );
    }

    #[test]
    fn widget_catalog_propagates_missing_items() {
        let ledger = Ledger::new("Catalog", CurrencyCode::new("USD"));
        let mut catalog = WidgetCatalog::new();
        assert!(catalog.widget_for(&ledger, Uuid::new_v4()).is_err());
    }
}

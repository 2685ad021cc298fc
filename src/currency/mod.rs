use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

/// Exchange rates keyed by currency, expressed relative to a base currency.
///
/// The table is a read-only lookup for the ledger builder: it answers
/// "what rate applies to this destination currency" when the caller did
/// not supply one. Rates are maintained by an operator, not by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub base: CurrencyCode,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

impl ExchangeRates {
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            rates: HashMap::new(),
        }
    }

    pub fn set_rate(&mut self, code: CurrencyCode, rate: Decimal) {
        self.rates.insert(code.0, rate);
    }

    pub fn remove_rate(&mut self, code: &CurrencyCode) {
        self.rates.remove(code.as_str());
    }

    /// Returns the rate for `code`, or 1 for the base currency itself.
    pub fn rate_for(&self, code: &CurrencyCode) -> Result<Decimal, LedgerError> {
        if code == &self.base {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(code.as_str())
            .copied()
            .ok_or_else(|| LedgerError::CurrencyMismatch(code.as_str().to_string()))
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

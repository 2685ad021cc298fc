use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::ledger_manager::{LoadReport, StorageBackend};
use crate::errors::LedgerError;
use crate::ledger::{Ledger, CURRENT_SCHEMA_VERSION};

const TMP_SUFFIX: &str = "tmp";

/// Durable backend persisting one pretty-printed JSON document per ledger.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledgers_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self, LedgerError> {
        let root = root.unwrap_or_else(default_root);
        let ledgers_dir = root.join("ledgers");
        fs::create_dir_all(&ledgers_dir)?;
        Ok(Self { root, ledgers_dir })
    }

    pub fn new_default() -> Result<Self, LedgerError> {
        Self::new(None)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StorageBackend for JsonStorage {
    fn load_named(&self, name: &str) -> Result<LoadReport, LedgerError> {
        let path = self.ledger_path(name);
        let mut report = self.load_from_path(&path)?;
        report.name = Some(canonical_name(name));
        Ok(report)
    }

    fn load_from_path(&self, path: &Path) -> Result<LoadReport, LedgerError> {
        if !path.exists() {
            return Err(LedgerError::NotFound(format!(
                "ledger file {}",
                path.display()
            )));
        }
        let data = fs::read_to_string(path)?;
        let ledger: Ledger = serde_json::from_str(&data)?;
        let schema_version = ledger.schema_version;
        Ok(LoadReport {
            ledger,
            path: path.to_path_buf(),
            name: None,
            schema_version,
        })
    }

    fn save_named(&self, ledger: &mut Ledger, name: &str) -> Result<PathBuf, LedgerError> {
        let path = self.ledger_path(name);
        self.save_to_path(ledger, &path)?;
        Ok(path)
    }

    fn save_to_path(&self, ledger: &mut Ledger, path: &Path) -> Result<(), LedgerError> {
        ledger.schema_version = CURRENT_SCHEMA_VERSION;
        let json = serde_json::to_string_pretty(ledger)?;
        write_atomic(path, &json)
    }

    fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.json", canonical_name(name)))
    }
}

fn default_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("treasury_core"))
        .unwrap_or_else(|| PathBuf::from(".treasury_core"))
}

fn canonical_name(name: &str) -> String {
    let mut canonical: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if canonical.is_empty() {
        canonical.push_str("ledger");
    }
    canonical
}

/// Stages to a sibling tmp file and renames over the target.
fn write_atomic(path: &Path, contents: &str) -> Result<(), LedgerError> {
    let tmp = path.with_extension(TMP_SUFFIX);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use tempfile::tempdir;

    #[test]
    fn canonical_names_are_filesystem_safe() {
        assert_eq!(canonical_name("Main Office 2024!"), "main_office_2024_");
        assert_eq!(canonical_name("  "), "ledger");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
        let mut ledger = Ledger::new("Demo", CurrencyCode::new("USD"));
        let id = ledger.id;

        let path = storage.save_named(&mut ledger, "demo").unwrap();
        assert!(path.exists());

        let report = storage.load_named("demo").unwrap();
        assert_eq!(report.ledger.id, id);
        assert_eq!(report.name.as_deref(), Some("demo"));
        assert_eq!(report.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn missing_ledger_is_not_found() {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
        let err = storage.load_named("nothing").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contractor::ContractorKind;

/// A transaction category.
///
/// The `widget` tag selects which contractor entity kind transactions of
/// this category must reference; untyped categories (pure transfers) carry
/// no tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<ContractorKind>,
}

impl AccountItem {
    pub fn new(name: impl Into<String>, widget: Option<ContractorKind>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            widget,
        }
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminates the three contractor entity kinds a category widget can select.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContractorKind {
    Office,
    Customer,
    User,
}

/// Polymorphic reference to the counter-party of a transaction.
///
/// The tag carries the entity kind so resolution switches on it directly
/// instead of inspecting the referenced entity at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContractorRef {
    Office(Uuid),
    Customer(Uuid),
    User(Uuid),
}

impl ContractorRef {
    pub fn new(kind: ContractorKind, id: Uuid) -> Self {
        match kind {
            ContractorKind::Office => ContractorRef::Office(id),
            ContractorKind::Customer => ContractorRef::Customer(id),
            ContractorKind::User => ContractorRef::User(id),
        }
    }

    pub fn kind(&self) -> ContractorKind {
        match self {
            ContractorRef::Office(_) => ContractorKind::Office,
            ContractorRef::Customer(_) => ContractorKind::Customer,
            ContractorRef::User(_) => ContractorKind::User,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ContractorRef::Office(id) | ContractorRef::Customer(id) | ContractorRef::User(id) => {
                *id
            }
        }
    }
}

/// Capability of entities that can own per-currency sub-accounts.
pub trait HoldsCurrencyAccounts {
    fn contractor_ref(&self) -> ContractorRef;
    fn display_name(&self) -> String;
}

/// A company office acting as a transaction party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Office {
    pub id: Uuid,
    pub name: String,
}

impl Office {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl HoldsCurrencyAccounts for Office {
    fn contractor_ref(&self) -> ContractorRef {
        ContractorRef::Office(self.id)
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

/// An external customer acting as a transaction party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl HoldsCurrencyAccounts for Customer {
    fn contractor_ref(&self) -> ContractorRef {
        ContractorRef::Customer(self.id)
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

/// An internal user acting as a transaction party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl HoldsCurrencyAccounts for User {
    fn contractor_ref(&self) -> ContractorRef {
        ContractorRef::User(self.id)
    }

    fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

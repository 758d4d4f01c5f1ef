use serde::{Deserialize, Serialize};

/// The tenant boundary. Every ledger row and most queries are scoped by
/// organization id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// A bank or card account owned by one organization. Ids come from the
/// relational store and are treated as opaque strings here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub organization_id: String,
    pub name: String,
}

impl Account {
    pub fn new(id: &str, organization_id: &str, name: &str) -> Self {
        Account {
            id: id.to_string(),
            organization_id: organization_id.to_string(),
            name: name.to_string(),
        }
    }
}

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// A public Fuse pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    /// Index of the pool in the pool directory.
    pub id: u64,
    /// The pool comptroller, used to query its assets and users.
    pub comptroller: Address,
    /// The pool name, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The pool creator, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Address>,
}

impl Pool {
    /// Creates a [`Pool`] without extension fields.
    pub fn new(id: u64, comptroller: Address) -> Self {
        Self { id, comptroller, name: None, creator: None }
    }

    /// Returns the pool id as a metric label value.
    pub fn label(&self) -> String {
        self.id.to_string()
    }
}

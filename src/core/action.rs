//! Actions carried by a transaction. Their payload is opaque to the transaction core.

use serde::{Deserialize, Serialize};

use crate::core::name::Name;

/// An `actor@permission` pair authorizing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Contract account that handles the action
    pub account: Name,
    pub name: Name,
    pub authorization: Vec<PermissionLevel>,
    /// Contract-specific payload
    pub data: Vec<u8>,
}

impl Action {
    pub fn new(account: Name, name: Name, authorization: Vec<PermissionLevel>, data: Vec<u8>) -> Self {
        Self {
            account,
            name,
            authorization,
            data,
        }
    }
}

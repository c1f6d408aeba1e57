use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Transaction;

/// A significant whale transaction surfaced by the alert filter.
///
/// Emitted with `read = false`; read-state is persisted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhaleAlert {
    pub id: Uuid,
    /// The tracked wallet this transaction was matched back to.
    pub whale_address: String,
    pub transaction: Transaction,
    pub read: bool,
}

impl WhaleAlert {
    pub fn new(whale_address: impl Into<String>, transaction: Transaction) -> Self {
        Self {
            id: Uuid::new_v4(),
            whale_address: whale_address.into(),
            transaction,
            read: false,
        }
    }
}

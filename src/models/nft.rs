use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Blockchain;

/// A non-fungible holding. Already unique by its composite id, so no
/// merge/dedup logic applies downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nft {
    /// Contract/mint + token id composite, e.g. `0xabc...:42`.
    pub id: String,
    pub name: String,
    pub collection: String,
    /// Always an HTTP(S) URL: `ipfs://` URIs are rewritten to a gateway and
    /// missing images resolve to a fixed placeholder, never an empty string.
    pub image_url: String,
    /// Not all providers supply a floor price.
    #[serde(default)]
    pub floor_price: Option<Decimal>,
    pub chain: Blockchain,
    pub marketplace_url: String,
}

pub mod bitcoin_client;
pub mod evm_client;
pub mod price_client;
pub mod solana_client;

pub use bitcoin_client::{BitcoinClient, BitcoinClientError};
pub use evm_client::{EvmClient, EvmClientError};
pub use price_client::{PriceClient, PriceClientError, SimplePrice};
pub use solana_client::{SolanaClient, SolanaClientError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use super::{scale_base_units, ChainAdapter, ChainFetch};
use crate::models::{
    Blockchain, ChainFamily, TokenBalance, TransactionKind, Transfer, Wallet,
};
use crate::providers::bitcoin_client::BtcTransaction;
use crate::providers::BitcoinClient;

/// Adapter for Bitcoin. BTC only — no tokens beyond the native asset, no
/// NFTs, no DeFi. Transaction direction and net amount come from UTXO
/// accounting over the wallet's own inputs and outputs.
#[derive(Debug, Clone)]
pub struct BitcoinAdapter {
    client: BitcoinClient,
}

impl BitcoinAdapter {
    pub fn new(client: BitcoinClient) -> Self {
        Self { client }
    }

    async fn fetch_wallet(&self, wallet: &Wallet) -> anyhow::Result<ChainFetch> {
        let address = wallet.address.as_str();

        let (stats, transactions) = tokio::join!(
            self.client.address_stats(address),
            self.client.transactions(address),
        );
        let stats = stats?;
        let transactions = transactions?;

        let mut out = ChainFetch::default();

        let sats = stats.chain_stats.balance_sats();
        if let Some(amount) =
            scale_base_units(sats as i128, Blockchain::Bitcoin.native_decimals())
        {
            if !amount.is_zero() {
                out.tokens.push(TokenBalance {
                    symbol: "BTC".into(),
                    name: "Bitcoin".into(),
                    chain: Blockchain::Bitcoin,
                    amount,
                });
            }
        }

        for tx in &transactions {
            if let Some(transfer) = normalize_utxo_tx(address, tx) {
                out.transfers.push(transfer);
            }
        }

        Ok(out)
    }
}

#[async_trait]
impl ChainAdapter for BitcoinAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Bitcoin
    }

    async fn fetch(&self, wallets: &[Wallet]) -> anyhow::Result<ChainFetch> {
        let btc_wallets: Vec<&Wallet> = wallets
            .iter()
            .filter(|w| w.blockchain == Blockchain::Bitcoin)
            .collect();

        let results = join_all(btc_wallets.iter().map(|w| self.fetch_wallet(w))).await;

        let mut out = ChainFetch::default();
        for (wallet, result) in btc_wallets.iter().zip(results) {
            match result {
                Ok(fetch) => out.extend(fetch),
                Err(e) => {
                    metrics::counter!("provider_failures_total").increment(1);
                    tracing::warn!(
                        error = %e,
                        address = %wallet.address,
                        "Bitcoin fetch failed for wallet, skipping"
                    );
                }
            }
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// UTXO accounting
// ---------------------------------------------------------------------------

/// Derive direction and net amount from the wallet's own inputs vs outputs.
///
/// A transaction where the wallet appears on both sides with no net change
/// is a self-transfer and is discarded. Unconfirmed transactions carry no
/// block time and are skipped.
fn normalize_utxo_tx(wallet: &str, tx: &BtcTransaction) -> Option<Transfer> {
    let block_time = tx.status.block_time?;
    let timestamp = DateTime::<Utc>::from_timestamp(block_time, 0)?;

    let spent: i128 = tx
        .vin
        .iter()
        .filter_map(|input| input.prevout.as_ref())
        .filter(|prev| prev.scriptpubkey_address.as_deref() == Some(wallet))
        .map(|prev| prev.value as i128)
        .sum();

    let received: i128 = tx
        .vout
        .iter()
        .filter(|out| out.scriptpubkey_address.as_deref() == Some(wallet))
        .map(|out| out.value as i128)
        .sum();

    let net = received - spent;
    if net == 0 {
        return None;
    }

    let (kind, counterparty) = if net > 0 {
        (TransactionKind::Receive, first_foreign_input(wallet, tx))
    } else {
        (TransactionKind::Send, first_foreign_output(wallet, tx))
    };

    let amount = scale_base_units(net.abs(), Blockchain::Bitcoin.native_decimals())?;
    let counterparty = counterparty.unwrap_or_else(|| wallet.to_string());

    let (from, to) = match kind {
        TransactionKind::Receive => (counterparty, wallet.to_string()),
        _ => (wallet.to_string(), counterparty),
    };

    Some(Transfer {
        hash: tx.txid.clone(),
        kind,
        timestamp,
        symbol: "BTC".into(),
        chain: Blockchain::Bitcoin,
        amount,
        value_usd: None,
        from,
        to,
    })
}

fn first_foreign_input(wallet: &str, tx: &BtcTransaction) -> Option<String> {
    tx.vin
        .iter()
        .filter_map(|input| input.prevout.as_ref())
        .filter_map(|prev| prev.scriptpubkey_address.clone())
        .find(|addr| addr != wallet)
}

fn first_foreign_output(wallet: &str, tx: &BtcTransaction) -> Option<String> {
    tx.vout
        .iter()
        .filter_map(|out| out.scriptpubkey_address.clone())
        .find(|addr| addr != wallet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::bitcoin_client::{TxInput, TxOutput, TxStatus};
    use rust_decimal::Decimal;

    fn output(address: &str, value: u64) -> TxOutput {
        TxOutput {
            scriptpubkey_address: Some(address.into()),
            value,
        }
    }

    fn input(address: &str, value: u64) -> TxInput {
        TxInput {
            prevout: Some(output(address, value)),
        }
    }

    fn confirmed(block_time: i64) -> TxStatus {
        TxStatus {
            confirmed: true,
            block_time: Some(block_time),
        }
    }

    #[test]
    fn test_receive_direction_and_amount() {
        let tx = BtcTransaction {
            txid: "tx1".into(),
            status: confirmed(1_700_000_000),
            vin: vec![input("bc1sender", 60_000_000)],
            vout: vec![output("bc1me", 50_000_000), output("bc1sender", 9_000_000)],
        };

        let transfer = normalize_utxo_tx("bc1me", &tx).unwrap();
        assert_eq!(transfer.kind, TransactionKind::Receive);
        assert_eq!(transfer.amount, Decimal::new(5, 1)); // 0.5 BTC
        assert_eq!(transfer.from, "bc1sender");
        assert_eq!(transfer.to, "bc1me");
    }

    #[test]
    fn test_send_nets_out_change_output() {
        // 1.0 BTC in, 0.3 to recipient, 0.69 back as change, 0.01 fee.
        let tx = BtcTransaction {
            txid: "tx2".into(),
            status: confirmed(1_700_000_000),
            vin: vec![input("bc1me", 100_000_000)],
            vout: vec![output("bc1them", 30_000_000), output("bc1me", 69_000_000)],
        };

        let transfer = normalize_utxo_tx("bc1me", &tx).unwrap();
        assert_eq!(transfer.kind, TransactionKind::Send);
        assert_eq!(transfer.amount, Decimal::new(31, 2)); // 0.31 net incl. fee
        assert_eq!(transfer.to, "bc1them");
    }

    #[test]
    fn test_self_transfer_is_discarded() {
        let tx = BtcTransaction {
            txid: "tx3".into(),
            status: confirmed(1_700_000_000),
            vin: vec![input("bc1me", 40_000_000)],
            vout: vec![output("bc1me", 40_000_000)],
        };
        assert!(normalize_utxo_tx("bc1me", &tx).is_none());
    }

    #[test]
    fn test_unconfirmed_tx_is_skipped() {
        let tx = BtcTransaction {
            txid: "tx4".into(),
            status: TxStatus {
                confirmed: false,
                block_time: None,
            },
            vin: vec![input("bc1other", 10_000_000)],
            vout: vec![output("bc1me", 10_000_000)],
        };
        assert!(normalize_utxo_tx("bc1me", &tx).is_none());
    }

    #[test]
    fn test_unrelated_tx_nets_to_zero() {
        let tx = BtcTransaction {
            txid: "tx5".into(),
            status: confirmed(1_700_000_000),
            vin: vec![input("bc1a", 10_000_000)],
            vout: vec![output("bc1b", 10_000_000)],
        };
        assert!(normalize_utxo_tx("bc1me", &tx).is_none());
    }
}

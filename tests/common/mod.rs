use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use chainfolio::adapters::{ChainAdapter, ChainFetch};
use chainfolio::aggregator::Aggregator;
use chainfolio::models::{Blockchain, ChainFamily, TokenBalance, TransactionKind, Transfer};
use chainfolio::pricing::{PriceQuote, PriceSource};

/// In-memory chain adapter returning a canned fetch, failing, or hanging.
pub struct MockAdapter {
    family: ChainFamily,
    fetch: ChainFetch,
    fail: bool,
    delay: Option<Duration>,
}

impl MockAdapter {
    pub fn returning(family: ChainFamily, fetch: ChainFetch) -> Self {
        Self {
            family,
            fetch,
            fail: false,
            delay: None,
        }
    }

    pub fn failing(family: ChainFamily) -> Self {
        Self {
            family,
            fetch: ChainFetch::default(),
            fail: true,
            delay: None,
        }
    }

    #[allow(dead_code)]
    pub fn hanging(family: ChainFamily, delay: Duration, fetch: ChainFetch) -> Self {
        Self {
            family,
            fetch,
            fail: false,
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl ChainAdapter for MockAdapter {
    fn family(&self) -> ChainFamily {
        self.family
    }

    async fn fetch(&self, _wallets: &[chainfolio::models::Wallet]) -> anyhow::Result<ChainFetch> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            anyhow::bail!("provider unavailable");
        }
        Ok(self.fetch.clone())
    }
}

/// Price source backed by a fixed map; only requested ids are answered.
pub struct MockOracle {
    quotes: HashMap<String, PriceQuote>,
}

impl MockOracle {
    pub fn new(quotes: HashMap<String, PriceQuote>) -> Self {
        Self { quotes }
    }

    pub fn empty() -> Self {
        Self {
            quotes: HashMap::new(),
        }
    }
}

#[async_trait]
impl PriceSource for MockOracle {
    async fn quotes(&self, ids: &[String]) -> HashMap<String, PriceQuote> {
        ids.iter()
            .filter_map(|id| self.quotes.get(id).map(|q| (id.clone(), *q)))
            .collect()
    }
}

#[allow(dead_code)]
pub fn aggregator_with(
    adapters: Vec<Arc<dyn ChainAdapter>>,
    oracle: MockOracle,
) -> Aggregator {
    Aggregator::new(adapters, Arc::new(oracle), Duration::from_secs(5))
}

#[allow(dead_code)]
pub fn quote(usd: i64, change_24h: i64) -> PriceQuote {
    PriceQuote {
        usd: Decimal::from(usd),
        change_24h: Decimal::from(change_24h),
    }
}

#[allow(dead_code)]
pub fn token_balance(symbol: &str, chain: Blockchain, amount: i64) -> TokenBalance {
    TokenBalance {
        symbol: symbol.into(),
        name: symbol.into(),
        chain,
        amount: Decimal::from(amount),
    }
}

#[allow(dead_code)]
pub fn ts(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap()
}

#[allow(dead_code)]
pub fn transfer(
    hash: &str,
    symbol: &str,
    chain: Blockchain,
    amount: i64,
    timestamp: DateTime<Utc>,
    from: &str,
    to: &str,
) -> Transfer {
    Transfer {
        hash: hash.into(),
        kind: TransactionKind::Send,
        timestamp,
        symbol: symbol.into(),
        chain,
        amount: Decimal::from(amount),
        value_usd: None,
        from: from.into(),
        to: to.into(),
    }
}

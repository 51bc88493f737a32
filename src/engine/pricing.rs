//! Per-pair pricing engine.
//!
//! The engine owns one pair's tracker and spread configuration behind a single
//! lock and drives the full pipeline against the collaborator traits:
//!
//! ```text
//! price source -> tracker update -> volatility gate -> spread -> quote
//!              -> liquidity check -> fee sink (best effort)
//! ```
//!
//! Mutating quotes and administrative changes take the write lock, so they
//! are applied one at a time and a configuration change is never observed
//! half applied. Previews take the read lock and never advance the tracker.
//! Collaborators are always awaited outside the lock, and the fee sink is not
//! awaited at all: its notification runs on the current tokio runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::execution::connector::{FeeSink, NoopFeeSink, ReferencePriceSource, ReserveView};
use crate::market_state::snapshot::VolatilityReading;
use crate::market_state::volatility::{TrackerConfig, VarianceTracker};
use crate::risk::volatility_gate::{VolatilityGate, check_liquidity};
use crate::strategy::config::SpreadConfig;
use crate::strategy::quote::{Quote, QuoteRequest};
use crate::strategy::spread::SpreadEngine;
use crate::types::error::{MMError, MMResult};
use crate::types::fixed_point::Wad;
use crate::types::primitives::{Amount, PairId, Price, TradingPair};

static NEXT_AUTHORITY_ID: AtomicU64 = AtomicU64::new(1);

/// Capability token for administrative operations on one engine.
///
/// Issued exactly once by [`PricingEngine::new`]. It cannot be cloned or
/// constructed elsewhere, so holding it is what makes a caller the
/// configuration authority.
#[derive(Debug)]
pub struct ConfigAuthority {
    id: u64,
}

impl ConfigAuthority {
    fn issue() -> Self {
        Self {
            id: NEXT_AUTHORITY_ID.fetch_add(1, Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
struct PairState {
    tracker: VarianceTracker,
    spread: SpreadEngine,
}

/// Reserves read for one request.
#[derive(Debug, Clone, Copy)]
struct ReserveSnapshot {
    reserve_in: Amount,
    reserve_out: Amount,
    base: Amount,
    quote: Amount,
}

/// Pricing engine for a single traded pair.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use oracle_spread_rs::engine::PricingEngine;
/// use oracle_spread_rs::execution::{MockPriceSource, MockReserves};
/// use oracle_spread_rs::market_state::volatility::TrackerConfig;
/// use oracle_spread_rs::strategy::config::SpreadConfig;
/// use oracle_spread_rs::strategy::quote::QuoteRequest;
/// use oracle_spread_rs::types::fixed_point::Wad;
/// use oracle_spread_rs::types::primitives::TradingPair;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let oracle = Arc::new(MockPriceSource::new(Wad::from_integer(2000)));
/// let reserves = Arc::new(
///     MockReserves::new()
///         .with_balance("ETH", Wad::from_integer(50))
///         .with_balance("USDC", Wad::from_integer(100_000)),
/// );
///
/// let (engine, authority) = PricingEngine::new(
///     TradingPair::new("ETH", "USDC"),
///     SpreadConfig::default(),
///     TrackerConfig::default(),
///     oracle,
///     reserves,
/// )
/// .unwrap();
///
/// engine.initialize_from_source(&authority).await.unwrap();
///
/// let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
/// let quote = engine.quote(request).await.unwrap();
/// assert!(quote.amount_out < Wad::from_decimal(oracle_spread_rs::dec!(0.5)).unwrap());
/// # }
/// ```
pub struct PricingEngine {
    pair_id: PairId,
    pair: TradingPair,
    authority_id: u64,
    state: RwLock<PairState>,
    price_source: Arc<dyn ReferencePriceSource>,
    reserves: Arc<dyn ReserveView>,
    fee_sink: Arc<dyn FeeSink>,
}

impl PricingEngine {
    /// Creates an engine with an unseeded tracker and issues its authority token.
    ///
    /// # Arguments
    ///
    /// * `pair` - Base and quote asset symbols
    /// * `config` - Initial spread configuration
    /// * `tracker` - Default decays for the variance tracker
    /// * `price_source` - Reference price collaborator
    /// * `reserves` - Reserve collaborator
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if `config` or `tracker` is out of range.
    pub fn new(
        pair: TradingPair,
        config: SpreadConfig,
        tracker: TrackerConfig,
        price_source: Arc<dyn ReferencePriceSource>,
        reserves: Arc<dyn ReserveView>,
    ) -> MMResult<(Self, ConfigAuthority)> {
        config.validate()?;
        let tracker = TrackerConfig::new(tracker.fast_decay, tracker.slow_decay)?;
        let authority = ConfigAuthority::issue();

        let engine = Self {
            pair_id: pair.id(),
            pair,
            authority_id: authority.id,
            state: RwLock::new(PairState {
                tracker: VarianceTracker::new(tracker),
                spread: SpreadEngine::new(config),
            }),
            price_source,
            reserves,
            fee_sink: Arc::new(NoopFeeSink),
        };

        Ok((engine, authority))
    }

    /// Overrides the pair identifier (defaults to `"BASE-QUOTE"`).
    #[must_use]
    pub fn with_pair_id(mut self, pair_id: PairId) -> Self {
        self.pair_id = pair_id;
        self
    }

    /// Injects a fee sink (defaults to [`NoopFeeSink`]).
    #[must_use]
    pub fn with_fee_sink(mut self, fee_sink: Arc<dyn FeeSink>) -> Self {
        self.fee_sink = fee_sink;
        self
    }

    /// Returns the pair identifier.
    #[must_use]
    pub fn pair_id(&self) -> &PairId {
        &self.pair_id
    }

    /// Returns the traded pair.
    #[must_use]
    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    /// Prices and commits a quote: fill-or-kill.
    ///
    /// Advances the tracker with the current reference price, refuses the
    /// quote if the fresh deviation trips the gate or the output exceeds the
    /// available reserve. A filled quote is returned without waiting for the
    /// fee sink, which is notified from a spawned task.
    ///
    /// # Errors
    ///
    /// - `MMError::PriceUnavailable` if the price source fails or returns zero
    /// - `MMError::NotInitialized` before the tracker is seeded
    /// - `MMError::VolatilityTooHigh` if the gate trips
    /// - `MMError::InsufficientLiquidity` if the output reserve is too small
    pub async fn quote(&self, request: QuoteRequest) -> MMResult<Quote> {
        let price = self.fetch_price().await?;
        let reserves = self.read_reserves(&request).await?;

        let quote = {
            let mut state = self.write_state()?;
            let PairState { tracker, spread } = &mut *state;
            let gate = VolatilityGate::new(spread.config().volatility_threshold_bps);
            let reading = gate.observe(tracker, price)?;
            spread.price(&request, price, reserves.reserve_in, &reading)?
        };

        check_liquidity(quote.amount_out, reserves.reserve_out)?;

        debug!(
            pair = %self.pair_id,
            side = ?quote.side,
            amount_in = %quote.amount_in,
            amount_out = %quote.amount_out,
            total_spread = %quote.total_spread,
            deviation_bps = quote.deviation_bps,
            "quote filled"
        );

        self.notify_fee(&quote, price, &reserves);
        Ok(quote)
    }

    /// Prices a quote against stored state without advancing the tracker.
    ///
    /// Repeated previews are idempotent and may run concurrently.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PricingEngine::quote`], evaluated against the
    /// stored volatility reading.
    pub async fn preview(&self, request: QuoteRequest) -> MMResult<Quote> {
        let price = self.fetch_price().await?;
        let reserves = self.read_reserves(&request).await?;

        let quote = {
            let state = self.read_state()?;
            let gate = VolatilityGate::new(state.spread.config().volatility_threshold_bps);
            let reading = gate.inspect(&state.tracker)?;
            state
                .spread
                .price(&request, price, reserves.reserve_in, &reading)?
        };

        check_liquidity(quote.amount_out, reserves.reserve_out)?;
        Ok(quote)
    }

    /// Returns the stored volatility reading.
    ///
    /// # Errors
    ///
    /// Returns `MMError::NotInitialized` before the tracker is seeded.
    pub fn reading(&self) -> MMResult<VolatilityReading> {
        self.read_state()?.tracker.peek()
    }

    /// Returns true if the stored deviation is above the configured threshold.
    ///
    /// # Errors
    ///
    /// - `MMError::NotInitialized` before the tracker is seeded
    /// - `MMError::InvalidMarketState` if the state lock is poisoned
    pub fn is_volatile(&self) -> MMResult<bool> {
        let state = self.read_state()?;
        state
            .tracker
            .is_volatile(state.spread.config().volatility_threshold_bps)
    }

    /// Number of observations since the tracker was last seeded.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidMarketState` if the state lock is poisoned.
    pub fn observations(&self) -> MMResult<u64> {
        Ok(self.read_state()?.tracker.observations())
    }

    /// Returns a copy of the active spread configuration.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidMarketState` if the state lock is poisoned.
    pub fn config(&self) -> MMResult<SpreadConfig> {
        Ok(self.read_state()?.spread.config().clone())
    }

    /// Replaces the spread configuration for subsequent quotes.
    ///
    /// # Errors
    ///
    /// - `MMError::Unauthorized` for a foreign authority token
    /// - `MMError::InvalidConfiguration` if `config` is out of range; the
    ///   previous configuration stays in force
    pub fn set_config(&self, authority: &ConfigAuthority, config: SpreadConfig) -> MMResult<()> {
        self.authorize(authority)?;
        config.validate()?;

        let mut state = self.write_state()?;
        state.spread = SpreadEngine::new(config);
        info!(pair = %self.pair_id, config = ?state.spread.config(), "spread configuration updated");
        Ok(())
    }

    /// Seeds the tracker with an explicit price.
    ///
    /// # Errors
    ///
    /// - `MMError::Unauthorized` for a foreign authority token
    /// - `MMError::AlreadyInitialized` if the tracker already holds history
    /// - `MMError::InvalidConfiguration` for a bad decay or zero seed
    pub fn initialize(
        &self,
        authority: &ConfigAuthority,
        seed_price: Price,
        fast_decay: Option<Wad>,
        slow_decay: Option<Wad>,
    ) -> MMResult<VolatilityReading> {
        self.authorize(authority)?;
        self.write_state()?
            .tracker
            .initialize(seed_price, fast_decay, slow_decay)
    }

    /// Seeds the tracker with the current reference price, default decays.
    ///
    /// # Errors
    ///
    /// Same as [`PricingEngine::initialize`], plus `MMError::PriceUnavailable`.
    pub async fn initialize_from_source(
        &self,
        authority: &ConfigAuthority,
    ) -> MMResult<VolatilityReading> {
        self.authorize(authority)?;
        let price = self.fetch_price().await?;
        self.initialize(authority, price, None, None)
    }

    /// Re-seeds the tracker, discarding all accumulated history.
    ///
    /// # Errors
    ///
    /// - `MMError::Unauthorized` for a foreign authority token
    /// - `MMError::InvalidConfiguration` for a bad decay or zero seed
    pub fn reinitialize(
        &self,
        authority: &ConfigAuthority,
        seed_price: Price,
        fast_decay: Option<Wad>,
        slow_decay: Option<Wad>,
    ) -> MMResult<VolatilityReading> {
        self.authorize(authority)?;
        self.write_state()?
            .tracker
            .reinitialize(seed_price, fast_decay, slow_decay)
    }

    fn authorize(&self, authority: &ConfigAuthority) -> MMResult<()> {
        if authority.id != self.authority_id {
            warn!(pair = %self.pair_id, "rejected administrative call from foreign authority");
            return Err(MMError::Unauthorized);
        }
        Ok(())
    }

    async fn fetch_price(&self) -> MMResult<Price> {
        let price = self.price_source.current_price(&self.pair_id).await?;
        if price.is_zero() {
            return Err(MMError::PriceUnavailable(format!(
                "zero reference price for {}",
                self.pair_id
            )));
        }
        Ok(price)
    }

    async fn read_reserves(&self, request: &QuoteRequest) -> MMResult<ReserveSnapshot> {
        let base = self.reserves.balance_of(&self.pair.base).await?;
        let quote = self.reserves.balance_of(&self.pair.quote).await?;
        let (reserve_in, reserve_out) = if request.side.is_buy() {
            (quote, base)
        } else {
            (base, quote)
        };
        Ok(ReserveSnapshot {
            reserve_in,
            reserve_out,
            base,
            quote,
        })
    }

    /// Hands the fee notification to a detached task; the quote never waits on it.
    fn notify_fee(&self, quote: &Quote, price: Price, reserves: &ReserveSnapshot) {
        let liquidity_value = match reserves
            .base
            .mul_wad(price)
            .map(|base_value| base_value.saturating_add(reserves.quote))
        {
            Ok(value) => value,
            Err(err) => {
                warn!(pair = %self.pair_id, error = %err, "skipping fee notification");
                return;
            }
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!(pair = %self.pair_id, "no async runtime, fee notification dropped");
            return;
        };

        let sink = Arc::clone(&self.fee_sink);
        let pair_id = self.pair_id.clone();
        let spread_fee = quote.spread_fee;
        runtime.spawn(async move {
            if let Err(err) = sink.notify(spread_fee, liquidity_value).await {
                warn!(pair = %pair_id, error = %err, "fee sink notification failed");
            }
        });
    }

    fn read_state(&self) -> MMResult<RwLockReadGuard<'_, PairState>> {
        self.state
            .read()
            .map_err(|_| MMError::InvalidMarketState("pricing state lock poisoned".to_string()))
    }

    fn write_state(&self) -> MMResult<RwLockWriteGuard<'_, PairState>> {
        self.state
            .write()
            .map_err(|_| MMError::InvalidMarketState("pricing state lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for PricingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingEngine")
            .field("pair_id", &self.pair_id)
            .field("pair", &self.pair)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dec;
    use crate::execution::mock::{MockPriceSource, MockReserves, RecordingFeeSink};

    struct Harness {
        engine: PricingEngine,
        authority: ConfigAuthority,
        oracle: Arc<MockPriceSource>,
        reserves: Arc<MockReserves>,
        sink: Arc<RecordingFeeSink>,
    }

    fn wad(value: crate::Decimal) -> Wad {
        Wad::from_decimal(value).unwrap()
    }

    fn harness(config: SpreadConfig) -> Harness {
        let oracle = Arc::new(MockPriceSource::new(Wad::from_integer(2000)));
        let reserves = Arc::new(
            MockReserves::new()
                .with_balance("ETH", Wad::from_integer(50))
                .with_balance("USDC", Wad::from_integer(100_000)),
        );
        let sink = Arc::new(RecordingFeeSink::new());

        let (engine, authority) = PricingEngine::new(
            TradingPair::new("ETH", "USDC"),
            config,
            TrackerConfig::default(),
            oracle.clone(),
            reserves.clone(),
        )
        .unwrap();
        let engine = engine.with_fee_sink(sink.clone());

        Harness {
            engine,
            authority,
            oracle,
            reserves,
            sink,
        }
    }

    async fn seeded(config: SpreadConfig) -> Harness {
        let h = harness(config);
        h.engine.initialize_from_source(&h.authority).await.unwrap();
        h
    }

    #[tokio::test]
    async fn test_quote_before_initialize() {
        let h = harness(SpreadConfig::default());
        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();

        assert_eq!(h.engine.quote(request).await, Err(MMError::NotInitialized));
        assert_eq!(h.engine.preview(request).await, Err(MMError::NotInitialized));
        assert_eq!(h.engine.reading(), Err(MMError::NotInitialized));
        assert_eq!(h.engine.is_volatile(), Err(MMError::NotInitialized));
    }

    #[tokio::test]
    async fn test_buy_quote_with_flat_price() {
        let h = seeded(SpreadConfig::default()).await;
        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        let quote = h.engine.quote(request).await.unwrap();

        // no variance: only impact 1000 * 0.01 / 100_000 = 0.0001
        assert_eq!(quote.volatility_spread, Wad::ZERO);
        assert_eq!(quote.total_spread, wad(dec!(0.0001)));
        assert_eq!(quote.effective_price, wad(dec!(2000.2)));
        assert_eq!(
            quote.amount_out,
            Wad::from_integer(1000).div_wad(wad(dec!(2000.2))).unwrap()
        );
        assert_eq!(h.engine.observations().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sell_quote_uses_base_reserve_for_impact() {
        let h = seeded(SpreadConfig::default()).await;
        let request = QuoteRequest::sell(Wad::from_integer(1)).unwrap();
        let quote = h.engine.quote(request).await.unwrap();

        // impact = 1 * 0.01 / 50 = 0.0002
        assert_eq!(quote.impact_spread, wad(dec!(0.0002)));
        assert_eq!(quote.effective_price, wad(dec!(1999.6)));
        assert_eq!(quote.amount_out, wad(dec!(1999.6)));
        assert_eq!(quote.spread_fee, wad(dec!(0.4)));
    }

    #[tokio::test]
    async fn test_preview_never_advances_tracker() {
        let h = seeded(SpreadConfig::default()).await;
        h.oracle.set_price(Wad::from_integer(2010));
        h.engine
            .quote(QuoteRequest::buy(Wad::from_integer(10)).unwrap())
            .await
            .unwrap();
        let reading = h.engine.reading().unwrap();

        h.oracle.set_price(Wad::from_integer(2500));
        let request = QuoteRequest::buy(Wad::from_integer(100)).unwrap();
        let first = h.engine.preview(request).await.unwrap();
        for _ in 0..10 {
            assert_eq!(h.engine.preview(request).await.unwrap(), first);
        }

        assert_eq!(h.engine.reading().unwrap(), reading);
        assert_eq!(h.engine.observations().unwrap(), 1);
        assert_eq!(h.sink.wait_for(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_gate_trips_and_keeps_observation() {
        let config = SpreadConfig::default().with_volatility_threshold_bps(100);
        let h = seeded(config).await;
        h.oracle.set_price(Wad::from_integer(3000));

        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        let result = h.engine.quote(request).await;
        assert!(matches!(result, Err(MMError::VolatilityTooHigh { .. })));
        assert!(result.unwrap_err().is_retryable());

        assert_eq!(h.engine.observations().unwrap(), 1);
        assert!(h.engine.is_volatile().unwrap());
        assert!(matches!(
            h.engine.preview(request).await,
            Err(MMError::VolatilityTooHigh { .. })
        ));
        assert!(h.sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_liquidity() {
        let h = seeded(SpreadConfig::default()).await;
        h.reserves.set_balance("ETH", wad(dec!(0.1)));

        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        let result = h.engine.quote(request).await;
        assert!(matches!(
            result,
            Err(MMError::InsufficientLiquidity { available, .. }) if available == wad(dec!(0.1))
        ));
        assert!(h.sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_fee_sink_failure_does_not_fail_quote() {
        let h = seeded(SpreadConfig::default()).await;
        h.sink.set_failing(true);

        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        let quote = h.engine.quote(request).await.unwrap();

        let notes = h.sink.wait_for(1).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].spread_fee, quote.spread_fee);
        // 50 ETH * 2000 + 100_000 USDC
        assert_eq!(notes[0].total_liquidity_value, Wad::from_integer(200_000));
    }

    #[tokio::test]
    async fn test_price_outage_does_not_touch_tracker() {
        let h = seeded(SpreadConfig::default()).await;
        h.oracle.set_unavailable(true);

        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        assert!(matches!(
            h.engine.quote(request).await,
            Err(MMError::PriceUnavailable(_))
        ));
        assert_eq!(h.engine.observations().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_price_is_unavailable() {
        let h = seeded(SpreadConfig::default()).await;
        h.oracle.set_price(Wad::ZERO);

        let request = QuoteRequest::sell(Wad::ONE).unwrap();
        assert!(matches!(
            h.engine.quote(request).await,
            Err(MMError::PriceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_authority_rejected() {
        let h = harness(SpreadConfig::default());
        let other = harness(SpreadConfig::default());

        assert_eq!(
            h.engine.set_config(&other.authority, SpreadConfig::default()),
            Err(MMError::Unauthorized)
        );
        assert_eq!(
            h.engine
                .initialize(&other.authority, Wad::from_integer(1), None, None)
                .unwrap_err(),
            MMError::Unauthorized
        );
        assert_eq!(
            h.engine.initialize_from_source(&other.authority).await,
            Err(MMError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_config_change_applies_to_next_quote() {
        let h = seeded(SpreadConfig::default()).await;
        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        let before = h.engine.quote(request).await.unwrap();

        let doubled = SpreadConfig::default()
            .with_impact_multiplier(wad(dec!(0.02)))
            .unwrap();
        h.engine.set_config(&h.authority, doubled.clone()).unwrap();
        assert_eq!(h.engine.config().unwrap(), doubled);

        let after = h.engine.quote(request).await.unwrap();
        assert_eq!(before.impact_spread, wad(dec!(0.0001)));
        assert_eq!(after.impact_spread, wad(dec!(0.0002)));
    }

    #[tokio::test]
    async fn test_invalid_config_keeps_previous() {
        let h = seeded(SpreadConfig::default()).await;
        let mut bad = SpreadConfig::default();
        bad.max_spread = Wad::from_integer(2);

        assert!(matches!(
            h.engine.set_config(&h.authority, bad),
            Err(MMError::InvalidConfiguration(_))
        ));
        assert_eq!(h.engine.config().unwrap(), SpreadConfig::default());
    }

    #[tokio::test]
    async fn test_initialize_then_reinitialize() {
        let h = harness(SpreadConfig::default());
        h.engine
            .initialize(&h.authority, Wad::from_integer(2000), None, None)
            .unwrap();
        assert_eq!(
            h.engine
                .initialize(&h.authority, Wad::from_integer(2000), None, None)
                .unwrap_err(),
            MMError::AlreadyInitialized
        );

        h.oracle.set_price(Wad::from_integer(2400));
        h.engine
            .quote(QuoteRequest::buy(Wad::from_integer(1)).unwrap())
            .await
            .unwrap();
        assert!(h.engine.reading().unwrap().max_variance() > Wad::ZERO);

        let reading = h
            .engine
            .reinitialize(&h.authority, Wad::from_integer(2400), None, None)
            .unwrap();
        assert_eq!(reading.max_variance(), Wad::ZERO);
        assert_eq!(h.engine.observations().unwrap(), 0);
    }

    struct StalledFeeSink;

    #[async_trait::async_trait]
    impl FeeSink for StalledFeeSink {
        async fn notify(&self, _spread_fee: Amount, _total_liquidity_value: Amount) -> MMResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_stalled_fee_sink_does_not_hold_quote() {
        let h = seeded(SpreadConfig::default()).await;
        let engine = h.engine.with_fee_sink(Arc::new(StalledFeeSink));

        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        let quote = tokio::time::timeout(Duration::from_millis(500), engine.quote(request))
            .await
            .expect("quote waited on the fee sink")
            .unwrap();

        assert!(quote.spread_fee > Wad::ZERO);
        assert_eq!(engine.observations().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_quotes_match_sequential_replay() {
        const TASKS: u64 = 16;
        const QUOTES_PER_TASK: u64 = 4;

        let h = seeded(SpreadConfig::default()).await;
        // identical observations commute, so every serialization of the
        // concurrent updates must land on the same state as a plain replay
        h.oracle.set_price(Wad::from_integer(2010));
        let engine = Arc::new(h.engine);

        let mut handles = Vec::new();
        for _ in 0..TASKS {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..QUOTES_PER_TASK {
                    engine
                        .quote(QuoteRequest::buy(Wad::from_integer(10)).unwrap())
                        .await?;
                }
                Ok::<_, MMError>(())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut replay = VarianceTracker::default();
        replay.initialize(Wad::from_integer(2000), None, None).unwrap();
        for _ in 0..TASKS * QUOTES_PER_TASK {
            replay.update(Wad::from_integer(2010)).unwrap();
        }

        assert_eq!(engine.reading().unwrap(), replay.peek().unwrap());
        assert_eq!(engine.observations().unwrap(), TASKS * QUOTES_PER_TASK);
        let expected = (TASKS * QUOTES_PER_TASK) as usize;
        assert_eq!(h.sink.wait_for(expected).await.len(), expected);
    }
}

//! Volatility Gate Example
//!
//! This example demonstrates the deviation-based circuit breaker:
//! - Fast and slow averages diverging after a price jump
//! - The gate refusing quotes while the deviation is above threshold
//! - The gate staying tripped while the slow average lags behind
//! - Manual price overrides during an oracle outage
//!
//! Run with: `cargo run --example volatility_gate`

use std::sync::Arc;

use oracle_spread_rs::execution::{MockPriceSource, MockReserves, OverridablePriceSource};
use oracle_spread_rs::prelude::*;

#[tokio::main]
async fn main() -> MMResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("=== Volatility Gate Example ===\n");

    // Standalone tracker and gate
    println!("--- Tracker and Gate ---\n");
    let mut tracker = VarianceTracker::default();
    tracker.initialize(Wad::from_integer(2000), None, None)?;
    let gate = VolatilityGate::new(100);

    println!("Threshold: {} bps\n", gate.threshold_bps());
    println!(
        "{:>8} {:>14} {:>14} {:>10} {:>8}",
        "Price", "Fast", "Slow", "Dev bps", "Gate"
    );

    let path = [2000u128, 2000, 2300, 2300, 2300, 2300, 2300, 2300, 2300, 2300];
    for price in path {
        let outcome = gate.observe(&mut tracker, Wad::from_integer(price));
        let reading = tracker.peek()?;
        let status = match outcome {
            Ok(_) => "open",
            Err(MMError::VolatilityTooHigh { .. }) => "TRIPPED",
            Err(err) => return Err(err),
        };
        println!(
            "{:>8} {:>14} {:>14} {:>10} {:>8}",
            price,
            reading.fast_average.to_string(),
            reading.slow_average.to_string(),
            reading.deviation_bps,
            status
        );
    }
    println!();

    // Engine with a manual override
    println!("--- Manual Override During Outage ---\n");
    let oracle = Arc::new(MockPriceSource::new(Wad::from_integer(2000)));
    let source = Arc::new(OverridablePriceSource::new(oracle.clone()));
    let reserves = Arc::new(
        MockReserves::new()
            .with_balance("ETH", Wad::from_integer(50))
            .with_balance("USDC", Wad::from_integer(100_000)),
    );

    let (engine, authority) = PricingEngine::new(
        TradingPair::new("ETH", "USDC"),
        SpreadConfig::default(),
        TrackerConfig::default(),
        source.clone(),
        reserves,
    )?;
    engine.initialize_from_source(&authority).await?;

    oracle.set_unavailable(true);
    let request = QuoteRequest::sell(Wad::ONE)?;
    match engine.quote(request).await {
        Ok(_) => println!("  Unexpected fill during outage"),
        Err(err) => println!("  Oracle down: {err}"),
    }

    source.set_override(Wad::from_integer(1995))?;
    let quote = engine.quote(request).await?;
    println!(
        "  Override 1995: sold 1 ETH for {} USDC (spread {})",
        quote.amount_out, quote.total_spread
    );

    source.clear_override()?;
    oracle.set_unavailable(false);
    let quote = engine.quote(request).await?;
    println!(
        "  Oracle back:   sold 1 ETH for {} USDC (spread {})\n",
        quote.amount_out, quote.total_spread
    );

    println!("=== Example Complete ===");
    Ok(())
}

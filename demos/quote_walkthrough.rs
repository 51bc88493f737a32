//! Quote Walkthrough Example
//!
//! This example walks one pair through the full pricing pipeline:
//! - Seeding the variance tracker from the reference price
//! - Buy and sell quotes with their spread components
//! - Preview versus mutating quotes
//! - Fee notifications and a liquidity refusal
//!
//! Run with: `cargo run --example quote_walkthrough`

use std::sync::Arc;

use oracle_spread_rs::execution::{MockPriceSource, MockReserves, RecordingFeeSink};
use oracle_spread_rs::prelude::*;

fn print_quote(label: &str, quote: &Quote) {
    println!("{label}:");
    println!("  Side:              {:?}", quote.side);
    println!("  Amount In:         {}", quote.amount_in);
    println!("  Reference Price:   {}", quote.reference_price);
    println!("  Volatility Spread: {}", quote.volatility_spread);
    println!("  Impact Spread:     {}", quote.impact_spread);
    println!("  Total Spread:      {}", quote.total_spread);
    println!("  Effective Price:   {}", quote.effective_price);
    println!("  Amount Out:        {}", quote.amount_out);
    println!("  Spread Fee:        {}", quote.spread_fee);
    println!("  Deviation:         {} bps\n", quote.deviation_bps);
}

#[tokio::main]
async fn main() -> MMResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Quote Walkthrough Example ===\n");

    let oracle = Arc::new(MockPriceSource::new(Wad::from_integer(2000)));
    let reserves = Arc::new(
        MockReserves::new()
            .with_balance("ETH", Wad::from_integer(50))
            .with_balance("USDC", Wad::from_integer(100_000)),
    );
    let sink = Arc::new(RecordingFeeSink::new());

    let config = SpreadConfig::default();
    println!("Spread Configuration:");
    println!("  Volatility Multiplier: {}", config.volatility_multiplier);
    println!("  Impact Multiplier:     {}", config.impact_multiplier);
    println!("  Gate Threshold:        {} bps", config.volatility_threshold_bps);
    println!("  Max Spread:            {}\n", config.max_spread);

    let (engine, authority) = PricingEngine::new(
        TradingPair::new("ETH", "USDC"),
        config,
        TrackerConfig::default(),
        oracle.clone(),
        reserves.clone(),
    )?;
    let engine = engine.with_fee_sink(sink.clone());

    let seed = engine.initialize_from_source(&authority).await?;
    println!("--- Tracker Seeded ---");
    println!("  Fast Average: {}", seed.fast_average);
    println!("  Slow Average: {}\n", seed.slow_average);

    println!("--- Quotes Under a Drifting Price ---\n");
    for price in [2010u128, 2025, 2018, 2040] {
        oracle.set_price(Wad::from_integer(price));
        let quote = engine.quote(QuoteRequest::buy(Wad::from_integer(1000))?).await?;
        print_quote(&format!("Buy 1000 USDC @ oracle {price}"), &quote);
    }

    let sell = engine.quote(QuoteRequest::sell(Wad::from_integer(2))?).await?;
    print_quote("Sell 2 ETH", &sell);

    println!("--- Preview Does Not Advance the Tracker ---\n");
    let before = engine.observations()?;
    let preview = engine.preview(QuoteRequest::buy(Wad::from_integer(5000))?).await?;
    print_quote("Preview buy 5000 USDC", &preview);
    println!("  Observations before: {before}, after: {}\n", engine.observations()?);

    println!("--- Fee Notifications ---\n");
    for (i, note) in sink.wait_for(5).await.iter().enumerate() {
        println!(
            "  #{}: fee {} against liquidity value {}",
            i + 1,
            note.spread_fee,
            note.total_liquidity_value
        );
    }
    println!();

    println!("--- Liquidity Refusal ---\n");
    reserves.set_balance("ETH", Wad::from_decimal(dec!(0.1))?);
    match engine.quote(QuoteRequest::buy(Wad::from_integer(1000))?).await {
        Ok(quote) => print_quote("Unexpected fill", &quote),
        Err(err) => println!("  Refused: {err}\n"),
    }

    println!("=== Example Complete ===");
    Ok(())
}

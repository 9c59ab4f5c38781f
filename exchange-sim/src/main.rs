//! Exchange simulator entry point

use std::sync::Arc;

use clap::Parser;
use common::decimal::dec;
use common::model::currency::{Currency, CurrencyPair};
use common::model::order::Side;
use dotenv::dotenv;
use ledger_service::LedgerService;
use matching_engine::MatchingEngine;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Run a crossing counter-order against the demo order
    #[clap(short, long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing with debug level if DEBUG=1 in .env
    let env_debug = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env_debug == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse("matching_engine=debug,ledger_service=debug")
        .unwrap();

    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!("Tracing initialized");
    }

    info!("Starting exchange simulator...");

    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    // A client funds an account and posts a buy order that rests
    let alice = Uuid::new_v4();
    ledger.deposit(alice, Currency::RUB, dec!(1000.62));
    let order = ledger.open_order(alice, CurrencyPair::UsdRub, Side::Buy, dec!(10), dec!(61.50))?;
    engine.submit(order).await?;

    if args.demo {
        // A second client sells into the resting bid; price improvement
        // executes the deal at the resting order's 61.50
        let bob = Uuid::new_v4();
        ledger.deposit(bob, Currency::USD, dec!(10));
        let counter =
            ledger.open_order(bob, CurrencyPair::UsdRub, Side::Sell, dec!(10), dec!(60))?;
        engine.submit(counter).await?;

        println!(
            "alice balances: {}",
            serde_json::to_string_pretty(&ledger.snapshot(alice))?
        );
        println!(
            "bob balances: {}",
            serde_json::to_string_pretty(&ledger.snapshot(bob))?
        );
    }

    println!("{}", serde_json::to_string_pretty(&engine.all_orders())?);

    Ok(())
}

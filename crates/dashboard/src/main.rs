//! dashboard: compute the market and investor-flow pages from flat files.
//!
//! Usage:
//!   dashboard market --from 2024-01-01 --to 2024-03-31 --output market.json
//!   dashboard market --chart top-tickers --chart industry-strength
//!   dashboard overview
//!   dashboard detail --class foreign --execution negotiated

mod cli;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard=info,data_loader=info".into()),
        )
        .init();

    cli::run()
}

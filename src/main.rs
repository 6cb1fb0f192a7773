//! tickerwatch: periodic cashtag mention counter.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! and runs the sweep scheduler until Ctrl+C.

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

use tickerwatch::browser::webdriver::WebDriverProvider;
use tickerwatch::config;
use tickerwatch::engine::fetcher::{AccountFetcher, FetcherSettings};
use tickerwatch::engine::scheduler::Scheduler;

const BANNER: &str = r#"
 _   _      _                           _       _
| |_(_) ___| | _____ _ ____      ____ _| |_ ___| |__
| __| |/ __| |/ / _ \ '__\ \ /\ / / _` | __/ __| '_ \
| |_| | (__|   <  __/ |   \ V  V / (_| | || (__| | | |
 \__|_|\___|_|\_\___|_|    \_/\_/ \__,_|\__\___|_| |_|

  cashtag mention counter v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("TICKERWATCH_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    let webdriver_url = cfg.webdriver_url();
    info!(
        name = %cfg.watcher.name,
        accounts = cfg.watcher.accounts.len(),
        interval_secs = cfg.watcher.sweep_interval_secs,
        webdriver = %webdriver_url,
        "tickerwatch starting up"
    );

    // -- Initialise components -------------------------------------------

    let provider = WebDriverProvider::new(webdriver_url, cfg.browser.headless);
    let fetcher = AccountFetcher::new(provider, FetcherSettings::from_config(&cfg));
    let mut scheduler = Scheduler::new(fetcher, cfg.targets(), cfg.sweep_interval());

    // -- Shutdown wiring -------------------------------------------------

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, finishing current account");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!(error = %e, "Could not listen for Ctrl+C"),
        }
    });

    // -- Main loop -------------------------------------------------------

    info!("Entering sweep loop. Press Ctrl+C to stop.");
    scheduler.run(shutdown_rx).await;

    let state = scheduler.state();
    info!(
        sweeps = state.sweeps_completed,
        symbols = state.totals.len(),
        mentions = state.totals.total_mentions(),
        failed_fetches = state.targets_failed_total,
        "tickerwatch shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tickerwatch=info"));

    let json_logging = std::env::var("TICKERWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}

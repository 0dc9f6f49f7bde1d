// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ReCycle Market console
//!
//! Signs sellers in, lists and edits their products, and gives super-admins
//! the cross-seller moderation view.

use clap::Parser;
use recycle_market::{cli::Cli, config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url.as_deref() {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    tracing::debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "Configuration loaded");

    let state = AppState::new(config);

    if let Err(e) = recycle_market::cli::run(cli.command, &state).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recycle_market=info,warn"));

    tracing_subscriber::registry().with(filter).with(format).init();
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use ticketflow::config::EngineConfig;

#[tokio::main]
async fn main() {
    let config = EngineConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = ticketflow::run(config).await {
        tracing::error!(%err, "ticketflow exited with error");
        std::process::exit(1);
    }
}

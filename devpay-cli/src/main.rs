//! devpay-cli: issue a single DevPayments API call from the shell.
//!
//! ```text
//! DEVPAY_API_KEY=sk_test_123 devpay-cli execute_charge \
//!     amount=2000 currency=usd card.number=4242424242424242 card.exp_month=10
//! ```
//!
//! `--config` and `--api-url` fall back to `DEVPAY_CONFIG` and `DEVPAY_API_URL`.
//!
//! The reply is printed as pretty JSON on stdout. Logs and errors go to
//! stderr. Exit codes: `0` success, `1` transport or server failure, `2`
//! invalid request or configuration, `3` card error.

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

mod args;
mod observability;

use std::process::ExitCode;

use clap::Parser;
use devpay::{Client, ClientConfig, DevPayError};
use tracing::{debug, error};

use crate::{
    args::{Cli, build_params},
    observability::{LogFormat, init_observability},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_observability(LogFormat::from_env());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "request failed");
            eprintln!("error: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> devpay::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if cli.no_raise {
        config.raise_errors = false;
    }

    let params = build_params(&cli.params).map_err(DevPayError::InvalidInput)?;
    let client = Client::from_config(&config)?;
    debug!(operation = %cli.operation, url = %client.api_url(), "dispatching");

    let response = client.call(cli.operation, params).await?;
    let rendered = serde_json::to_string_pretty(response.as_map())
        .map_err(|e| DevPayError::InvalidInput(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn exit_code(err: &DevPayError) -> u8 {
    if err.is_card_error() {
        3
    } else if err.is_invalid_request()
        || matches!(err, DevPayError::Config(_) | DevPayError::InvalidInput(_))
    {
        2
    } else {
        1
    }
}

//! Error handling example showing how to tell the DevPayments error types apart.
//!
//! # Running this example
//!
//! ```bash
//! export DEVPAY_API_KEY=sk_test_...
//! cargo run --example error_handling
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::str_to_string,
    clippy::uninlined_format_args,
    clippy::use_debug,
    reason = "examples are allowed to use println and simple formatting"
)]

use devpay::{Client, ClientConfig, DevPayError, Params};
use serde_json::json;

fn describe(err: &DevPayError) {
    match err {
        DevPayError::MissingParameter(key) => {
            println!("  caught before sending: parameter '{key}' is required");
        }
        DevPayError::Card { message, code } => {
            println!("  card declined: {message} (code: {:?})", code);
        }
        DevPayError::InvalidRequest { message, param } => {
            println!("  invalid request: {message} (param: {:?})", param);
        }
        err if err.is_retryable() => println!("  transient failure, safe to retry: {err}"),
        err => println!("  other failure: {err}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("DevPay: Error Handling Example\n");

    let config = ClientConfig::default();
    let client = match Client::from_config(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Set {} before running this example: {err}", config.api_key_env);
            return Ok(());
        }
    };

    println!("1. Refund without an id:");
    if let Err(err) = client.refund(Params::new()).await {
        describe(&err);
    }

    println!("\n2. Charge a card the test environment declines:");
    let declined = Params::new()
        .set("amount", 2000)
        .set("currency", "usd")
        .set("card", json!({"number": "4000000000000002", "exp_month": 10, "exp_year": 2031}));
    match client.execute(declined.clone()).await {
        Ok(response) => println!("  unexpectedly succeeded: {:?}", response.id()),
        Err(err) => describe(&err),
    }

    println!("\n3. Same charge with errors kept in the response:");
    let lenient = Client::builder(config.api_key_from_env()?)
        .api_url(config.api_url.clone())
        .raise_errors(false)
        .build()?;
    let response = lenient.execute(declined).await?;
    match response.error() {
        Some(remote) => println!("  error body: {} ({})", remote.message, remote.kind),
        None => println!("  no error reported: {:?}", response.id()),
    }

    Ok(())
}

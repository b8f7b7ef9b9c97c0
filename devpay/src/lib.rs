//! DevPay: an asynchronous client for the DevPayments API.
//!
//! The API exposes charges (execute, retrieve, refund) and stored customers
//! for recurring billing (create, update, bill, retrieve, delete). Every
//! operation is a single form-encoded `POST` to one endpoint; the operation
//! name travels in the `method` field and the JSON reply either describes the
//! object or carries an `error` object.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │  Your application │
//! └─────────┬─────────┘
//!           │ Params (nested maps allowed)
//! ┌─────────▼──────────────────────────────────────┐
//! │                 devpay::Client                 │
//! │  required-param check → merge method/key/client│
//! │  → flatten to card[number]=… → form-encode     │
//! └─────────┬──────────────────────────────────────┘
//!           │ HTTPS POST (application/x-www-form-urlencoded)
//! ┌─────────▼─────────┐
//! │  DevPayments API  │  JSON body, `error` object on failure
//! └───────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Execute a Charge
//!
//! ```rust,no_run
//! use devpay::{Client, params::Params};
//! use serde_json::json;
//!
//! # async fn example() -> devpay::Result<()> {
//! let client = Client::new("sk_test_123")?;
//!
//! let params = Params::new()
//!     .set("amount", 2000)
//!     .set("currency", "usd")
//!     .set("card", json!({"number": "4242424242424242", "exp_month": 10, "exp_year": 2031}));
//!
//! let charge = client.execute(params).await?;
//! println!("Charge: {:?}", charge.id());
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Recurring Billing
//!
//! ```rust,no_run
//! use devpay::{Client, params::Params, response::Customer};
//! use serde_json::json;
//!
//! # async fn example() -> devpay::Result<()> {
//! let client = Client::new("sk_test_123")?;
//!
//! let created = client
//!     .create_customer(Params::new().set("card", json!({"number": "4242424242424242"})))
//!     .await?;
//! let customer: Customer = created.deserialize()?;
//!
//! client
//!     .bill_customer(Params::new().set("id", customer.id.as_str()).set("amount", 500))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Completion Callbacks
//!
//! ```rust,no_run
//! use devpay::{Client, Operation, params::Params};
//!
//! # async fn example() -> devpay::Result<()> {
//! let client = Client::new("sk_test_123")?;
//!
//! let handle = client.spawn_call(
//!     Operation::RefundCharge,
//!     Params::new().set("id", "ch_1"),
//!     |outcome| match outcome {
//!         Ok(response) => println!("refunded {:?}", response.id()),
//!         Err(err) => eprintln!("refund failed: {err}"),
//!     },
//! );
//! handle.await.ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`client`]: [`Client`], its builder and the shared dispatcher
//! - [`params`]: request parameters and the nested-to-flat form transform
//! - [`response`]: [`Response`] accessors and declared models
//! - [`operation`]: the API operations and their required parameters
//! - [`error`]: [`DevPayError`] and server error dispatch
//! - [`config`]: TOML client configuration
//! - [`transport`]: sealed HTTP transport
//!
//! # Error Handling
//!
//! Every operation returns [`Result<Response, DevPayError>`](error::Result).
//! Missing required parameters fail before anything is sent. Server-reported
//! errors become typed variants, or stay inside the [`Response`] when the
//! client is built with `raise_errors(false)`:
//!
//! ```rust,no_run
//! use devpay::{Client, DevPayError, params::Params};
//!
//! # async fn example() {
//! let client = Client::new("sk_test_123").unwrap();
//!
//! match client.refund(Params::new().set("id", "ch_1")).await {
//!     Ok(response) => println!("Refunded: {:?}", response.id()),
//!     Err(DevPayError::Card { message, .. }) => eprintln!("Card problem: {message}"),
//!     Err(err) if err.is_invalid_request() => eprintln!("Fix the request: {err}"),
//!     Err(err) if err.is_retryable() => eprintln!("Try again later: {err}"),
//!     Err(err) => eprintln!("Other error: {err}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod params;
pub mod response;
pub mod transport;

pub use client::{ApiKey, Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{DevPayError, Result};
pub use operation::Operation;
pub use params::Params;
pub use response::Response;

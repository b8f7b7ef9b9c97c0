//! Transport abstraction layer.
//!
//! This module provides a sealed [`Transport`] trait for sending one
//! form-encoded API request and returning the raw response. The client owns
//! request building and response interpretation; transports only move bytes.
//!
//! # Examples
//!
//! ```rust,no_run
//! use devpay::{
//!     Operation,
//!     transport::{HttpTransport, RequestContext, Transport},
//! };
//! use url::Url;
//!
//! # async fn example() -> devpay::error::Result<()> {
//! let transport = HttpTransport::new()?;
//! let url = Url::parse("https://api.devpayments.com/v1").unwrap();
//! let form = vec![("method".to_owned(), "retrieve_charge".to_owned())];
//!
//! let ctx = RequestContext { url: &url, operation: Operation::RetrieveCharge, form: &form };
//! let response = transport.post_form(ctx).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::fmt;

use url::Url;

use crate::{error::Result, operation::Operation};

pub mod config;
pub mod http;
#[cfg(test)]
pub(crate) mod recording;
mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Request context for transport operations.
///
/// `Debug` output omits the form values, which include the API key.
#[derive(Clone)]
pub struct RequestContext<'a> {
    /// API endpoint.
    pub url: &'a Url,
    /// Operation being performed, for logging.
    pub operation: Operation,
    /// Flattened form fields.
    pub form: &'a [(String, String)],
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("url", &self.url.as_str())
            .field("operation", &self.operation)
            .field("form_fields", &self.form.len())
            .finish()
    }
}

/// Response from transport operations.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

impl TransportResponse {
    /// Returns the first header named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Transport abstraction.
///
/// This trait is sealed; only implementations within this crate are allowed.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Sends one `POST` with an `application/x-www-form-urlencoded` body.
    ///
    /// Non-success HTTP statuses are returned as responses, not errors; the
    /// API reports failures in the body.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is rejected or the exchange fails.
    fn post_form<'a>(
        &'a self,
        ctx: RequestContext<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}

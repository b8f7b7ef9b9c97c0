//! The DevPay API client.
//!
//! Every operation funnels through [`Client::call`]:
//!
//! 1. required parameters are checked (no request is sent if one is missing)
//! 2. caller parameters are merged with the fixed `method`, `key` and `client`
//!    fields, flattened and form-encoded
//! 3. one `POST` goes to the configured endpoint
//! 4. the JSON body is decoded and either returned as a [`Response`] or, when
//!    it carries an `error` object and the client raises errors, mapped onto a
//!    [`DevPayError`]

use std::{fmt, sync::Arc};

use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;
use zeroize::Zeroize;

use crate::{
    config::{ClientConfig, DEFAULT_API_URL},
    error::{DevPayError, Result},
    operation::Operation,
    params::{Params, to_form_pairs},
    response::{Response, error_body},
    transport::{
        HttpConfig, HttpTransport, RequestContext, Transport, TransportResponse,
        http::validate_url,
    },
};

/// Language reported in the `client[language]` field.
pub const BINDING_LANGUAGE: &str = "rust";

/// Version reported in the `client[version]` field.
pub const BINDING_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level parameters owned by the client.
const RESERVED_PARAMS: [&str; 3] = ["method", "key", "client"];

/// Secret API key.
///
/// `Debug` never prints the key and its memory is zeroized on drop.
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key itself.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

struct ClientInner<T> {
    key: ApiKey,
    raise_errors: bool,
    api_url: Url,
    transport: T,
}

/// Asynchronous client for the DevPay API.
///
/// Cloning is cheap; clones share configuration and transport.
///
/// # Examples
///
/// ```rust,no_run
/// use devpay::{Client, params::Params};
/// use serde_json::json;
///
/// # async fn example() -> devpay::Result<()> {
/// let client = Client::new("sk_test_123")?;
///
/// let charge = client
///     .execute(
///         Params::new()
///             .set("amount", 2000)
///             .set("currency", "usd")
///             .set("card", json!({"number": "4242424242424242", "exp_month": 10, "exp_year": 2031}))
///             .set("mnemonic", "customer@example.com"),
///     )
///     .await?;
///
/// println!("charged: {:?}", charge.id());
/// # Ok(())
/// # }
/// ```
pub struct Client<T: Transport = HttpTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Transport> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.inner.api_url.as_str())
            .field("raise_errors", &self.inner.raise_errors)
            .field("key", &self.inner.key)
            .field("protocol", &self.inner.transport.protocol_name())
            .finish()
    }
}

impl Client<HttpTransport> {
    /// Creates a client for the default endpoint that raises remote errors.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP transport cannot be created.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        Self::builder(key).build()
    }

    /// Starts building a client.
    #[must_use]
    pub fn builder(key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(key)
    }

    /// Creates a client from configuration, reading the key from the
    /// configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the key is unset.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let key = config.api_key_from_env()?;
        Self::from_config_with_key(config, key)
    }

    /// Creates a client from configuration with an explicit key.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn from_config_with_key(config: &ClientConfig, key: impl Into<String>) -> Result<Self> {
        config.validate()?;
        ClientBuilder::new(key)
            .api_url(config.api_url.clone())
            .raise_errors(config.raise_errors)
            .http_config(config.http.clone())
            .build()
    }
}

impl<T: Transport> Client<T> {
    /// Whether server-reported errors are returned as `Err`.
    #[must_use]
    pub fn raise_errors(&self) -> bool {
        self.inner.raise_errors
    }

    /// The endpoint every operation is posted to.
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.inner.api_url
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Fetches a charge. Requires `id`.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn retrieve(&self, params: Params) -> Result<Response> {
        self.call(Operation::RetrieveCharge, params).await
    }

    /// Executes a charge. Requires `amount` and `currency`, plus either a
    /// `card` map or a `customer` id.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn execute(&self, params: Params) -> Result<Response> {
        self.call(Operation::ExecuteCharge, params).await
    }

    /// Refunds an executed charge. Requires `id`.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn refund(&self, params: Params) -> Result<Response> {
        self.call(Operation::RefundCharge, params).await
    }

    /// Creates a customer, optionally with an active `card`.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn create_customer(&self, params: Params) -> Result<Response> {
        self.call(Operation::CreateCustomer, params).await
    }

    /// Sets the active card of a customer. Requires `id`.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn update_customer(&self, params: Params) -> Result<Response> {
        self.call(Operation::UpdateCustomer, params).await
    }

    /// Adds a once-off amount to a customer's account. Requires `id` and `amount`.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn bill_customer(&self, params: Params) -> Result<Response> {
        self.call(Operation::BillCustomer, params).await
    }

    /// Fetches billing info for a customer. Requires `id`.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn retrieve_customer(&self, params: Params) -> Result<Response> {
        self.call(Operation::RetrieveCustomer, params).await
    }

    /// Deletes a customer. Requires `id`.
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn delete_customer(&self, params: Params) -> Result<Response> {
        self.call(Operation::DeleteCustomer, params).await
    }

    /// Performs `operation` with `params`.
    ///
    /// Exactly one request is sent per call.
    ///
    /// # Errors
    ///
    /// - [`DevPayError::MissingParameter`] before any I/O if a required key is absent
    /// - [`DevPayError::Connection`] or [`DevPayError::Http`] if the exchange fails
    /// - [`DevPayError::MalformedResponse`] if the body is not a JSON object
    /// - a remote variant ([`DevPayError::Card`], ...) if the API reports an
    ///   error and the client raises errors
    #[instrument(skip(self, operation, params), fields(operation = %operation))]
    pub async fn call(&self, operation: Operation, params: Params) -> Result<Response> {
        params.require(operation.required_params())?;

        let mut form = self.build_form(operation, params);
        let ctx = RequestContext { url: &self.inner.api_url, operation, form: &form };
        let sent = self.inner.transport.post_form(ctx).await;

        for (name, value) in &mut form {
            if name == "key" {
                value.zeroize();
            }
        }

        parse_response(operation, self.inner.raise_errors, sent?)
    }

    /// Spawns [`Client::call`] on the current tokio runtime and hands the
    /// outcome to `completion`, exactly once.
    ///
    /// Failures are delivered to `completion` like successes; nothing panics
    /// inside the spawned task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_call<F>(&self, operation: Operation, params: Params, completion: F) -> JoinHandle<()>
    where
        T: 'static,
        F: FnOnce(Result<Response>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let outcome = client.call(operation, params).await;
            completion(outcome);
        })
    }

    fn build_form(&self, operation: Operation, params: Params) -> Vec<(String, String)> {
        let mut merged = params.into_map();
        merged.retain(|name, _| {
            let root = name.split('[').next().unwrap_or_default();
            let reserved = RESERVED_PARAMS.contains(&root);
            if reserved {
                warn!(param = %name, "ignoring caller value for reserved parameter");
            }
            !reserved
        });

        merged.insert("method".to_owned(), Value::from(operation.as_str()));
        merged.insert(
            "client".to_owned(),
            json!({"type": "binding", "language": BINDING_LANGUAGE, "version": BINDING_VERSION}),
        );

        let mut form = to_form_pairs(&merged);
        form.push(("key".to_owned(), self.inner.key.expose().to_owned()));

        debug!(fields = form.len(), "built request form");
        form
    }
}

/// Interprets a raw API response.
///
/// The body is decoded whatever the HTTP status, because the API reports
/// failures inside it.
pub(crate) fn parse_response(
    operation: Operation,
    raise_errors: bool,
    raw: TransportResponse,
) -> Result<Response> {
    let status = raw.status;
    let value: Value = serde_json::from_slice(&raw.body).map_err(|e| {
        DevPayError::MalformedResponse { status, reason: format!("invalid JSON: {e}") }
    })?;

    let Value::Object(body) = value else {
        return Err(DevPayError::MalformedResponse {
            status,
            reason: "expected a JSON object".to_owned(),
        });
    };

    match error_body(&body) {
        Some(remote) => {
            warn!(status, kind = %remote.kind, "API reported an error");
            if raise_errors {
                return Err(DevPayError::from_remote(remote));
            }
        }
        None => info!(status, "call completed"),
    }

    Ok(Response::new(operation, body))
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    key: ApiKey,
    raise_errors: bool,
    api_url: String,
    http: HttpConfig,
}

impl ClientBuilder {
    /// Starts a builder with defaults: raise errors, default endpoint, default HTTP settings.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: ApiKey::new(key),
            raise_errors: true,
            api_url: DEFAULT_API_URL.to_owned(),
            http: HttpConfig::default(),
        }
    }

    /// Whether server-reported errors are returned as `Err` (default: true).
    #[must_use]
    pub fn raise_errors(mut self, raise: bool) -> Self {
        self.raise_errors = raise;
        self
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Overrides the HTTP transport settings.
    #[must_use]
    pub fn http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Builds a client over an HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint or HTTP settings are invalid.
    pub fn build(self) -> Result<Client<HttpTransport>> {
        let transport = if self.http == HttpConfig::default() {
            HttpTransport::new()?
        } else {
            HttpTransport::with_config(&self.http)?
        };
        self.build_with(transport)
    }

    /// Builds a client over the given transport. HTTP settings are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is invalid.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let api_url = Url::parse(&self.api_url).map_err(|e| {
            DevPayError::Config(format!("invalid api_url '{}': {e}", self.api_url))
        })?;
        validate_url(&api_url)?;

        if self.key.expose().trim().is_empty() {
            return Err(DevPayError::Config("API key cannot be empty".to_owned()));
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                key: self.key,
                raise_errors: self.raise_errors,
                api_url,
                transport,
            }),
        })
    }
}

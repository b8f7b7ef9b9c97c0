//! HTTP transport implementation using reqwest.

use std::{sync::LazyLock, time::Duration};

use reqwest::{Client, header};
use tracing::{debug, instrument};
use url::{Host, Url};

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{DevPayError, Result},
    transport::{RequestContext, Transport, TransportResponse, sealed},
};

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("devpay-rust/", env!("CARGO_PKG_VERSION"));

fn client_builder() -> reqwest::ClientBuilder {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    Client::builder().user_agent(USER_AGENT).default_headers(headers)
}

/// Default HTTP client shared by every default transport.
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    client_builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create default HTTP client")
});

/// Validates an API endpoint URL.
///
/// HTTPS is required. Plain HTTP is accepted only for loopback hosts so tests
/// can run against a local server.
///
/// # Errors
///
/// Returns [`DevPayError::Config`] for other schemes, plain HTTP to a remote
/// host, or a URL without a host.
pub fn validate_url(url: &Url) -> Result<()> {
    let host = url
        .host()
        .ok_or_else(|| DevPayError::Config(format!("URL missing host: {url}")))?;

    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback(&host) => Ok(()),
        "http" => Err(DevPayError::Config(format!(
            "plain HTTP is only allowed for loopback hosts, got: {host}"
        ))),
        other => Err(DevPayError::Config(format!("unsupported URL scheme: {other}"))),
    }
}

fn is_loopback(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(addr) => addr.is_loopback(),
        Host::Ipv6(addr) => addr.is_loopback(),
    }
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// # Examples
///
/// ```
/// use devpay::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { timeout_secs: 60, http_version: HttpVersion::Http1, ..Default::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport over the shared default client.
    ///
    /// Default configuration:
    /// - Timeout: 30 seconds
    /// - Connect timeout: 10 seconds
    /// - HTTP version: Auto
    ///
    /// # Errors
    ///
    /// This method is infallible but returns `Result` for API consistency.
    pub fn new() -> Result<Self> {
        Ok(Self { client: DEFAULT_HTTP_CLIENT.clone(), http_version: HttpVersion::Auto })
    }

    /// Creates a transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is out of bounds or the HTTP client
    /// cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder =
            client_builder().timeout(config.timeout()).connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(DevPayError::Http)?;

        Ok(Self { client, http_version: config.http_version })
    }

    #[instrument(
        skip(self, ctx),
        fields(url = %ctx.url, operation = %ctx.operation, status)
    )]
    async fn execute_request(&self, ctx: RequestContext<'_>) -> Result<TransportResponse> {
        validate_url(ctx.url)?;

        debug!(fields = ctx.form.len(), "sending form request");

        let response = self.client.post(ctx.url.clone()).form(ctx.form).send().await?;

        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        let body = response.bytes().await?.to_vec();

        debug!(bytes = body.len(), "received response");

        Ok(TransportResponse { status, body, headers })
    }
}

impl Transport for HttpTransport {
    async fn post_form<'a>(&'a self, ctx: RequestContext<'a>) -> Result<TransportResponse> {
        self.execute_request(ctx).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}

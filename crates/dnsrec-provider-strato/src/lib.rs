// # STRATO Provider Client
//
// This crate provides a `ProviderClient` for domains hosted at STRATO,
// driving the customer service web interface.
//
// ## Behaviour
//
// - ✅ Logs in lazily on first use, once per client
// - ✅ Resolves the package (`cID`) from the configured order number
// - ✅ Reads the "TXT and CNAME records" settings form of one domain
// - ✅ Replaces the whole form (both policies and every record) in one POST
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - ❌ NO retry logic (a failure ends the invocation)
// - ❌ NO caching of configurations between calls
// - ❌ NO two-factor login (reported as an authentication error)
//
// ## Security Requirements
//
// - Password and session id NEVER appear in logs or Debug output
// - Client construction fails fast if any credential is empty
//
// ## Endpoints
//
// All requests go to `/apps/CustomerService`:
// - Login: POST `identifier`, `passwd`, `action_customer_login.x`
// - Packages: GET `?sessionID=..&cID=0&node=kds_CustomerEntryPage`
// - Settings: GET `?sessionID=..&cID=..&node=ManageDomains&action_show_txt_records&vhost=..`
// - Update: POST settings form with `action_change_txt_records`

mod form;

use async_trait::async_trait;
use dnsrec_core::{Configuration, Credentials, Error, ProviderClient, Result};
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tokio::sync::OnceCell;

use form::{LoginPage, MANAGE_DOMAINS_NODE};

/// STRATO customer service endpoint
const STRATO_API_BASE: &str = "https://www.strato.de/apps/CustomerService";

/// Default HTTP timeout for requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "strato";

/// Authenticated session state
struct Session {
    session_id: String,
    package_id: String,
}

/// STRATO provider client
///
/// One client manages one domain in one package. The session is created on
/// the first fetch or replace and reused for the rest of the invocation.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password or
/// the session id.
pub struct StratoClient {
    /// ⚠️ password NEVER logged
    credentials: Credentials,

    /// Customer service URL
    base_url: Url,

    /// HTTP client with cookie store
    client: reqwest::Client,

    session: OnceCell<Session>,
}

// Custom Debug implementation that hides the password and session
impl std::fmt::Debug for StratoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StratoClient")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url.as_str())
            .field("logged_in", &self.session.initialized())
            .finish()
    }
}

impl StratoClient {
    /// Create a new STRATO client
    ///
    /// No request is made until the first fetch or replace.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if any credential is empty
    /// - `Error::Http` if the HTTP client cannot be built
    pub fn new(credentials: Credentials) -> Result<Self> {
        credentials.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(STRATO_API_BASE)
            .map_err(|e| Error::config(format!("Invalid base URL: {}", e)))?;

        Ok(Self {
            credentials,
            base_url,
            client,
            session: OnceCell::new(),
        })
    }

    /// Use a different customer service URL (other STRATO country sites)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        Ok(self)
    }

    async fn session(&self) -> Result<&Session> {
        self.session.get_or_try_init(|| self.login()).await
    }

    /// Log in and resolve the package of the configured order
    async fn login(&self) -> Result<Session> {
        tracing::debug!(
            "Logging in to STRATO as {} ({})",
            self.credentials.identifier,
            self.base_url
        );

        let response = self
            .client
            .post(self.base_url.clone())
            .form(&[
                ("identifier", self.credentials.identifier.as_str()),
                ("passwd", self.credentials.password.as_str()),
                ("action_customer_login.x", "Login"),
            ])
            .send()
            .await
            .map_err(|e| Error::http(format!("Login request failed: {}", e)))?;

        let final_url = response.url().clone();
        let html = read_body(response, "Login").await?;

        let session_id = match form::query_param(&final_url, "sessionID") {
            Some(session_id) => session_id,
            None => match form::parse_login_page(&html)? {
                LoginPage::Session(session_id) => session_id,
                LoginPage::SecondFactor => {
                    return Err(Error::auth(
                        "account requires two-factor authentication, which is not supported",
                    ));
                }
                LoginPage::Rejected => {
                    return Err(Error::auth("login rejected; check identifier and password"));
                }
            },
        };

        tracing::debug!("Logged in, resolving package for order {}", self.credentials.order);

        let html = self
            .get_page(&[
                ("sessionID", session_id.as_str()),
                ("cID", "0"),
                ("node", "kds_CustomerEntryPage"),
            ])
            .await?;
        let package_id = form::parse_package_id(&html, &self.base_url, &self.credentials.order)?;

        tracing::debug!("Using package {}", package_id);
        Ok(Session {
            session_id,
            package_id,
        })
    }

    /// GET a customer service page and return its body
    async fn get_page(&self, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        read_body(response, "Page request").await
    }
}

/// Read a response body, mapping non-success statuses to errors
async fn read_body(response: reqwest::Response, action: &str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("{}: failed to read response: {}", action, e)))?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(status_error(status, action))
    }
}

/// Map an unsuccessful HTTP status to an error
fn status_error(status: StatusCode, action: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!("{} refused. Status: {}", action, status)),
        404 => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: page not found. Status: {}", action, status),
        ),
        429 => Error::provider(
            PROVIDER_NAME,
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("STRATO server error (transient): {}", status),
        ),
        _ => Error::provider(PROVIDER_NAME, format!("{} failed: {}", action, status)),
    }
}

#[async_trait]
impl ProviderClient for StratoClient {
    async fn fetch_configuration(&self) -> Result<Configuration> {
        let session = self.session().await?;

        tracing::debug!("Fetching DNS settings for {}", self.credentials.domain);

        let html = self
            .get_page(&[
                ("sessionID", session.session_id.as_str()),
                ("cID", session.package_id.as_str()),
                ("node", MANAGE_DOMAINS_NODE),
                ("action_show_txt_records", ""),
                ("vhost", self.credentials.domain.as_str()),
            ])
            .await?;

        let config = form::parse_configuration(&html)?;
        tracing::debug!(
            "Parsed {} record(s) for {}",
            config.records.len(),
            self.credentials.domain
        );
        Ok(config)
    }

    async fn replace_configuration(&self, config: &Configuration) -> Result<()> {
        let session = self.session().await?;

        tracing::info!(
            "Submitting {} record(s) for {}",
            config.records.len(),
            self.credentials.domain
        );

        let body = form::replace_form(
            &session.session_id,
            &session.package_id,
            &self.credentials.domain,
            config,
        );

        let response = self
            .client
            .post(self.base_url.clone())
            .form(&body)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        read_body(response, "Update").await.map(|_| ())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

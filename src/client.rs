use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::load_config;
use crate::error::{Error, Result};
use crate::limiter::RequestPacer;
use crate::models::{
    Collection, DataCategory, DataPoint, DataType, Dataset, Location, LocationCategory, Station,
};
use crate::params::{
    DataCategoriesQuery, DataQuery, DataTypesQuery, DatasetsQuery, LocationCategoriesQuery,
    LocationsQuery, MAX_LIMIT, Params, StationsQuery,
};
use crate::util::urljoin;

/// Base URL of the public CDO Web API v2.
pub const ENDPOINT: &str = "https://www.ncei.noaa.gov/cdo-web/api/v2";

/// Header the service reads the bearer token from.
const TOKEN_HEADER: &str = "token";

const DEFAULT_MAX_CONNECTIONS: usize = 10;
const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(60);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const REQUESTS_PER_SECOND: usize = 5;
const REQUESTS_PER_DAY: usize = 10_000;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URL, typically [`ENDPOINT`].
    pub url: String,
    /// API token, if one was found. Tokens may also be bound to an injected
    /// session or passed per call.
    pub token: Option<String>,
}

/// Where the token for a request comes from. Derived from current
/// session/attribute state on every request; never cached, because the
/// session can be replaced between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    Nowhere,
    InAttribute,
    InSessionHeaders,
    InBoth,
}

#[derive(Debug, Clone)]
struct Session {
    http: HttpClient,
    /// Whether the session's default headers carry the `token` credential.
    token_in_headers: bool,
    /// Injected sessions are used as-is and never closed by [`Client::close`].
    provided: bool,
}

fn token_location(token: Option<&str>, session: Option<&Session>) -> TokenLocation {
    match session {
        None => {
            if token.is_some() {
                TokenLocation::InAttribute
            } else {
                TokenLocation::Nowhere
            }
        }
        Some(s) => match (s.token_in_headers, token.is_some()) {
            (true, true) => TokenLocation::InBoth,
            (true, false) => TokenLocation::InSessionHeaders,
            (false, true) => TokenLocation::InAttribute,
            (false, false) => TokenLocation::Nowhere,
        },
    }
}

/// Asynchronous client for the NOAA NCEI Climate Data Online (CDO) Web API v2.
///
/// The client lazily creates a pooled HTTP session on first use, enforces
/// the service's request quotas (5/second and 10,000/day by default), and
/// exposes one async method per endpoint. All methods take `&self`, so one
/// client instance can serve many concurrent calls; the session and the
/// rate limiters are shared across them.
///
/// A per-call token passed to an endpoint method always wins over a
/// session-bound token, which wins over the client's own token. If none of
/// the three exists, dispatch fails with [`Error::MissingToken`] before any
/// network I/O.
///
/// Call [`Client::close`] when done; a closed client recreates its session
/// on the next request.
#[derive(Debug)]
pub struct Client {
    url: String,
    token: Option<String>,

    max_connections: usize,
    keepalive: Duration,
    timeout: Duration,

    session: Mutex<Option<Session>>,
    pacer: RequestPacer,
}

impl Client {
    /// Creates a client for the public endpoint with the given token.
    pub fn new(token: Option<String>) -> Self {
        Self {
            url: ENDPOINT.to_string(),
            token,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            keepalive: DEFAULT_KEEPALIVE,
            timeout: DEFAULT_TIMEOUT,
            session: Mutex::new(None),
            pacer: RequestPacer::new(REQUESTS_PER_SECOND, REQUESTS_PER_DAY),
        }
    }

    /// Creates a client using (in order of precedence) the `CDO_API_URL` /
    /// `CDO_API_TOKEN` environment variables and a `.cdorc` file (from
    /// `CDO_API_RC`, the current directory, or the home directory).
    pub fn from_env() -> Result<Self> {
        let cfg = load_config(None, None)?;
        Ok(Self::new(cfg.token).with_url(cfg.url))
    }

    /// Overrides the base API URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Bounds the connection pool (default 10).
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Keep-alive timeout for pooled connections (default 60s).
    pub fn with_keepalive_timeout(mut self, keepalive: Duration) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// Per-request timeout on the owned session (default 60s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the request quotas, e.g. for a keyless mirror.
    pub fn with_rate_limits(mut self, per_second: usize, per_day: usize) -> Self {
        self.pacer = RequestPacer::new(per_second, per_day);
        self
    }

    /// Uses an externally-owned session instead of building one.
    ///
    /// The session is used as-is: the client applies no pool or timeout
    /// settings to it and [`Client::close`] leaves it alone. Pass
    /// `token_in_headers = true` if its default headers already carry the
    /// `token` credential, so token resolution can account for it.
    pub fn with_session(self, http: HttpClient, token_in_headers: bool) -> Self {
        *self.session.lock().expect("session lock poisoned") = Some(Session {
            http,
            token_in_headers,
            provided: true,
        });
        self
    }

    /// Drops the owned session, closing its pooled connections. Idempotent,
    /// callable from non-async contexts, and a no-op for injected sessions.
    pub fn close(&self) {
        let mut guard = self.session.lock().expect("session lock poisoned");
        let owned = guard.as_ref().is_some_and(|s| !s.provided);
        if owned {
            *guard = None;
        }
    }

    /// Makes sure a live session exists and reports where the token
    /// currently lives. Builds the pooled session on first use (or after
    /// [`Client::close`]); the client's own token, when set, is installed
    /// as a default header at that point.
    fn ensure(&self) -> Result<(HttpClient, TokenLocation)> {
        let mut guard = self.session.lock().expect("session lock poisoned");

        if guard.is_none() {
            let mut headers = HeaderMap::new();
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(&format!("cdoapi-rs/{}", env!("CARGO_PKG_VERSION")))
                    .unwrap_or(HeaderValue::from_static("cdoapi-rs")),
            );

            let mut token_in_headers = false;
            if let Some(token) = &self.token {
                let value = HeaderValue::from_str(token.trim()).map_err(|_| {
                    Error::Config("token contains characters not allowed in a header".to_string())
                })?;
                headers.insert(TOKEN_HEADER, value);
                token_in_headers = true;
            }

            let http = HttpClient::builder()
                .default_headers(headers)
                .pool_max_idle_per_host(self.max_connections)
                .pool_idle_timeout(self.keepalive)
                .timeout(self.timeout)
                .build()?;

            *guard = Some(Session {
                http,
                token_in_headers,
                provided: false,
            });
        }

        let session = guard.as_ref().expect("session was just ensured");
        let location = token_location(self.token.as_deref(), Some(session));
        Ok((session.http.clone(), location))
    }

    /// The sole path by which a request leaves the client: validates
    /// parameters, resolves the token, passes both rate limiters, issues
    /// the GET, and decodes the body. Never retries.
    async fn request(
        &self,
        path: &str,
        params: Option<Params>,
        token: Option<&str>,
    ) -> Result<Value> {
        if let Some(limit) = params.as_ref().and_then(Params::limit) {
            if limit > MAX_LIMIT {
                return Err(Error::limit_too_large(limit));
            }
        }

        let (http, location) = self.ensure()?;

        if location == TokenLocation::Nowhere && token.is_none() {
            return Err(Error::MissingToken);
        }

        self.pacer.acquire().await;

        let url = urljoin(&self.url, path);
        log::debug!("GET {}", url);

        let mut req = http.get(&url);
        if let Some(params) = &params {
            if !params.is_empty() {
                req = req.query(&params.to_query());
            }
        }

        // A per-call token overrides the session default header; the client
        // token is sent explicitly only when the session does not already
        // carry one.
        if let Some(token) = token {
            req = req.header(TOKEN_HEADER, token);
        } else if location == TokenLocation::InAttribute {
            if let Some(token) = self.token.as_deref() {
                req = req.header(TOKEN_HEADER, token);
            }
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            log::warn!("HTTP {} for {}", status.as_u16(), url);
            return Err(Error::from_response(status.as_u16(), &url, text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<Params>,
        token: Option<&str>,
    ) -> Result<T> {
        let value = self.request(path, params, token).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Queries the available datasets.
    pub async fn datasets(
        &self,
        query: DatasetsQuery,
        token: Option<&str>,
    ) -> Result<Collection<Dataset>> {
        self.get_json("/datasets", Some(query.into_params()), token)
            .await
    }

    /// Queries a single dataset, e.g. `GHCND`.
    pub async fn dataset_by_id(&self, id: &str, token: Option<&str>) -> Result<Dataset> {
        self.get_json(&format!("/datasets/{}", id), None, token)
            .await
    }

    /// Queries the data categories datasets are grouped into.
    pub async fn data_categories(
        &self,
        query: DataCategoriesQuery,
        token: Option<&str>,
    ) -> Result<Collection<DataCategory>> {
        self.get_json("/datacategories", Some(query.into_params()), token)
            .await
    }

    pub async fn data_category_by_id(&self, id: &str, token: Option<&str>) -> Result<DataCategory> {
        self.get_json(&format!("/datacategories/{}", id), None, token)
            .await
    }

    /// Queries the available data types, e.g. `TMAX`.
    pub async fn datatypes(
        &self,
        query: DataTypesQuery,
        token: Option<&str>,
    ) -> Result<Collection<DataType>> {
        self.get_json("/datatypes", Some(query.into_params()), token)
            .await
    }

    pub async fn datatype_by_id(&self, id: &str, token: Option<&str>) -> Result<DataType> {
        self.get_json(&format!("/datatypes/{}", id), None, token)
            .await
    }

    /// Queries location categories, e.g. city or climate region.
    pub async fn location_categories(
        &self,
        query: LocationCategoriesQuery,
        token: Option<&str>,
    ) -> Result<Collection<LocationCategory>> {
        self.get_json("/locationcategories", Some(query.into_params()), token)
            .await
    }

    pub async fn location_category_by_id(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<LocationCategory> {
        self.get_json(&format!("/locationcategories/{}", id), None, token)
            .await
    }

    /// Queries locations, e.g. `FIPS:37` (North Carolina).
    pub async fn locations(
        &self,
        query: LocationsQuery,
        token: Option<&str>,
    ) -> Result<Collection<Location>> {
        self.get_json("/locations", Some(query.into_params()), token)
            .await
    }

    pub async fn location_by_id(&self, id: &str, token: Option<&str>) -> Result<Location> {
        self.get_json(&format!("/locations/{}", id), None, token)
            .await
    }

    /// Queries weather stations.
    pub async fn stations(
        &self,
        query: StationsQuery,
        token: Option<&str>,
    ) -> Result<Collection<Station>> {
        self.get_json("/stations", Some(query.into_params()), token)
            .await
    }

    pub async fn station_by_id(&self, id: &str, token: Option<&str>) -> Result<Station> {
        self.get_json(&format!("/stations/{}", id), None, token)
            .await
    }

    /// Queries actual observations. The service has no `/data/{id}` form;
    /// use the query filters.
    pub async fn data(
        &self,
        query: DataQuery,
        token: Option<&str>,
    ) -> Result<Collection<DataPoint>> {
        self.get_json("/data", Some(query.into_params()), token)
            .await
    }
}

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, error, instrument, warn};

use crate::error::{Error, Result, format_http_error};
use crate::query::{Query, Validation};
use crate::table::ResultTable;
use crate::util::redact_key;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking client for the Census data API.
///
/// One call is one GET; nothing is retried or cached.
#[derive(Debug, Clone)]
pub struct Client {
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    /// Client with a 60 second request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("censusapi-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("censusapi-rs")),
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(Error::ClientBuild)?;

        Ok(Self { timeout, http })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GETs `url` and normalizes the body, keeping every header column.
    pub fn fetch_and_normalize(&self, url: &str) -> Result<ResultTable> {
        self.fetch(url, None)
    }

    /// Builds the query's URL and fetches it.
    ///
    /// When required facets are missing, [`Validation::Strict`] fails here
    /// without touching the network; [`Validation::Lenient`] logs the
    /// configuration error and sends the broken URL anyway.
    pub fn execute(&self, query: &Query) -> Result<ResultTable> {
        let url = request_url(query)?;
        self.fetch(&url, None)
    }

    /// Like [`Client::execute`], but keeps only `NAME` and the requested
    /// variables, dropping the geography columns the API appends.
    pub fn execute_declared(&self, query: &Query) -> Result<ResultTable> {
        let url = request_url(query)?;
        self.fetch(&url, Some(query.declared_width()))
    }

    #[instrument(level = "debug", skip(self, url), fields(url = %redact_key(url)))]
    fn fetch(&self, url: &str, declared_width: Option<usize>) -> Result<ResultTable> {
        let transport = |source: reqwest::Error| Error::Transport {
            url: redact_key(url),
            source: source.without_url(),
        };

        debug!("sending request");
        let resp = self.http.get(url).send().map_err(transport)?;
        let status = resp.status();
        let body = resp.text().map_err(transport)?;

        if status != StatusCode::OK {
            let err = format_http_error(status, url, &body);
            error!(status = status.as_u16(), "{}", err);
            return Err(err);
        }

        let table = ResultTable::from_json(&body, declared_width)?;
        debug!(
            rows = table.len(),
            columns = table.columns().len(),
            "normalized response"
        );
        Ok(table)
    }
}

fn request_url(query: &Query) -> Result<String> {
    match query.build_url() {
        Err(Error::Configuration { missing, url }) if query.validation() == Validation::Lenient => {
            warn!(?missing, url = %redact_key(&url), "query is missing required facets; sending anyway");
            Ok(url)
        }
        other => other,
    }
}

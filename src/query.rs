use std::fmt;

use tracing::{debug, warn};

use crate::config::CredentialResolver;
use crate::dataset::Dataset;
use crate::error::{CredentialWarning, Error, Facet, Result};
use crate::geography::Geography;
use crate::util::{append_query, encode_spaces, redact_key, urljoin};

pub const DEFAULT_BASE_ENDPOINT: &str = "https://api.census.gov";

/// Column the API prepends to every `get=` list.
pub const NAME_COLUMN: &str = "NAME";

/// Whether a query missing required facets is still sent.
///
/// [`Query::build_url`] reports missing facets as [`Error::Configuration`]
/// either way; this only decides what [`Client::execute`](crate::Client::execute)
/// does with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Log the error and send the broken URL carried in it.
    #[default]
    Lenient,
    /// Fail without touching the network.
    Strict,
}

/// The facets of one Census API query.
///
/// Every setter touches exactly one facet; the URL is rendered from the
/// current facets each time it is requested, so it can never lag behind them.
///
/// ```
/// use censusapi::{Dataset, GeoLevel, Query};
///
/// let mut query = Query::new();
/// query
///     .set_year(2005)
///     .set_dataset(Dataset::Acs1)
///     .set_variables(["B01001_001E"])
///     .set_geography(GeoLevel::Us.code(1));
/// assert_eq!(
///     query.build_url().unwrap(),
///     "https://api.census.gov/data/2005/acs/acs1?get=NAME,B01001_001E&for=us:1"
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Query {
    base_endpoint: String,
    year: Option<String>,
    dataset: Option<Dataset>,
    variables: Vec<String>,
    geography: Option<Geography>,
    parent_geography: Option<Geography>,
    access_key: Option<String>,
    validation: Validation,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            base_endpoint: DEFAULT_BASE_ENDPOINT.to_string(),
            year: None,
            dataset: None,
            variables: Vec::new(),
            geography: None,
            parent_geography: None,
            access_key: None,
            validation: Validation::default(),
        }
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("base_endpoint", &self.base_endpoint)
            .field("year", &self.year)
            .field("dataset", &self.dataset)
            .field("variables", &self.variables)
            .field("geography", &self.geography)
            .field("parent_geography", &self.parent_geography)
            .field("access_key", &self.access_key.as_ref().map(|_| "***"))
            .field("validation", &self.validation)
            .finish()
    }
}

impl Query {
    /// Empty query against [`DEFAULT_BASE_ENDPOINT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for `dataset` in `year`, other facets unset.
    pub fn for_dataset(year: impl fmt::Display, dataset: impl Into<Dataset>) -> Self {
        let mut q = Self::new();
        q.set_year(year).set_dataset(dataset);
        q
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn set_base_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        self.base_endpoint = endpoint.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn set_year(&mut self, year: impl fmt::Display) -> &mut Self {
        let year = year.to_string().trim().to_string();
        self.year = (!year.is_empty()).then_some(year);
        self.check_vintage();
        self
    }

    pub fn set_dataset(&mut self, dataset: impl Into<Dataset>) -> &mut Self {
        let dataset = dataset.into();
        self.dataset = (!dataset.path().is_empty()).then_some(dataset);
        self.check_vintage();
        self
    }

    /// Replaces the variable list. `NAME` is implicit and need not be passed.
    pub fn set_variables<I, S>(&mut self, variables: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_variable(&mut self, variable: impl Into<String>) -> &mut Self {
        self.variables.push(variable.into());
        self
    }

    /// Sets the `for=` clause. A blank clause leaves it unset.
    pub fn set_geography(&mut self, geography: impl Into<Geography>) -> &mut Self {
        self.geography = non_blank(geography.into());
        self
    }

    /// Sets the `in=` clause. A blank clause leaves it unset.
    pub fn set_parent_geography(&mut self, parent: impl Into<Geography>) -> &mut Self {
        self.parent_geography = non_blank(parent.into());
        self
    }

    /// Sets the API key. An empty key clears it and logs a warning.
    pub fn set_credentials(&mut self, key: impl Into<String>) -> &mut Self {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            warn!("{}; query will be sent without a key", CredentialWarning::EmptyKey);
            self.access_key = None;
        } else {
            self.access_key = Some(key);
        }
        self
    }

    /// Resolves and stores the key via `resolver`.
    ///
    /// On failure the key facet is cleared and the warning returned; the query
    /// stays usable without a key.
    pub fn load_credentials(
        &mut self,
        resolver: &CredentialResolver,
        explicit_key: Option<&str>,
        use_test_key: bool,
    ) -> Option<CredentialWarning> {
        match resolver.resolve(explicit_key, use_test_key) {
            Ok(key) => {
                self.access_key = Some(key);
                None
            }
            Err(warning) => {
                self.access_key = None;
                Some(warning)
            }
        }
    }

    pub fn clear_variables(&mut self) -> &mut Self {
        self.variables.clear();
        self
    }

    pub fn clear_geography(&mut self) -> &mut Self {
        self.geography = None;
        self
    }

    pub fn clear_parent_geography(&mut self) -> &mut Self {
        self.parent_geography = None;
        self
    }

    pub fn clear_credentials(&mut self) -> &mut Self {
        self.access_key = None;
        self
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn geography(&self) -> Option<&Geography> {
        self.geography.as_ref()
    }

    pub fn parent_geography(&self) -> Option<&Geography> {
        self.parent_geography.as_ref()
    }

    pub fn has_credentials(&self) -> bool {
        self.access_key.is_some()
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// Required facets that are currently unset.
    pub fn missing_facets(&self) -> Vec<Facet> {
        let mut missing = Vec::new();
        if self.base_endpoint.is_empty() {
            missing.push(Facet::BaseEndpoint);
        }
        if self.year.is_none() {
            missing.push(Facet::Year);
        }
        if self.dataset.is_none() {
            missing.push(Facet::Dataset);
        }
        missing
    }

    /// Columns in the `get=` list: `NAME` followed by the variables, with any
    /// caller-supplied `NAME` dropped.
    pub fn requested_columns(&self) -> Vec<&str> {
        std::iter::once(NAME_COLUMN)
            .chain(
                self.variables
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty() && *v != NAME_COLUMN),
            )
            .collect()
    }

    /// Number of columns the query asks for; geography columns the API
    /// appends after them fall outside this width.
    pub fn declared_width(&self) -> usize {
        self.requested_columns().len()
    }

    /// Renders the URL from the current facets, ignoring validation.
    ///
    /// `{base}/data/{year}/{dataset}?get=NAME,...&for=...[&in=...][&key=...]`
    pub fn render(&self) -> String {
        let path = format!(
            "data/{}/{}",
            self.year.as_deref().unwrap_or(""),
            self.dataset.as_ref().map(Dataset::path).unwrap_or("")
        );
        let base = urljoin(&self.base_endpoint, &path);

        let get = self.requested_columns().join(",");
        let geography = self.geography.as_ref().map(|g| encode_spaces(g.as_str()));
        let parent = self
            .parent_geography
            .as_ref()
            .map(|g| encode_spaces(g.as_str()));

        let mut params: Vec<(&str, &str)> = vec![("get", get.as_str())];
        if let Some(g) = &geography {
            params.push(("for", g.as_str()));
        }
        if let Some(p) = &parent {
            params.push(("in", p.as_str()));
        }
        if let Some(k) = &self.access_key {
            params.push(("key", k.as_str()));
        }

        append_query(&base, &params)
    }

    /// Renders the request URL.
    ///
    /// Missing required facets yield [`Error::Configuration`], which still
    /// carries the broken URL for inspection.
    pub fn build_url(&self) -> Result<String> {
        let url = self.render();
        let missing = self.missing_facets();
        if !missing.is_empty() {
            return Err(Error::Configuration { missing, url });
        }
        if self.access_key.is_none() {
            debug!(url = %redact_key(&url), "building keyless query");
        }
        Ok(url)
    }

    fn check_vintage(&self) {
        if let (Some(year), Some(dataset)) = (&self.year, &self.dataset) {
            if !dataset.publishes(year) {
                warn!(%year, dataset = %dataset, "dataset is not known to be published for this year");
            }
        }
    }
}

fn non_blank(geography: Geography) -> Option<Geography> {
    (!geography.as_str().trim().is_empty()).then_some(geography)
}

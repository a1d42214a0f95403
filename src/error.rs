use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::util::redact_key;

/// A required query facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    BaseEndpoint,
    Year,
    Dataset,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Facet::BaseEndpoint => "base endpoint",
            Facet::Year => "year",
            Facet::Dataset => "dataset",
        };
        f.write_str(s)
    }
}

/// Errors returned by query construction and execution.
#[derive(Error, Debug)]
pub enum Error {
    /// Required facets were unset when the URL was rendered.
    ///
    /// `url` holds the (broken) URL rendered from the remaining facets, exactly
    /// as it would be sent. The key is redacted only in the message.
    #[error(
        "query is missing required facet(s): {} (rendered url: {})",
        join_facets(.missing),
        redact_key(.url)
    )]
    Configuration { missing: Vec<Facet>, url: String },

    /// The API answered with a status other than 200.
    #[error("API request failed: HTTP {status} for url ({url})\n{message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    /// The body was not a JSON array of arrays headed by a column row.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    /// HTTP status code for [`Error::Http`], `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal outcome of credential resolution: the query proceeds keyless.
#[derive(Error, Debug)]
pub enum CredentialWarning {
    #[error("no environment file found (searched: {})", join_paths(.searched))]
    NoEnvFile { searched: Vec<PathBuf> },

    #[error("{name} is not set in {}", .path.display())]
    MissingEntry { name: &'static str, path: PathBuf },

    #[error("failed to read environment file {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("empty API key supplied")]
    EmptyKey,
}

fn join_facets(facets: &[Facet]) -> String {
    facets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no candidates)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns a non-200 reply into an [`Error::Http`] with an actionable message.
///
/// The Census API answers errors with short plain-text bodies such as
/// `error: unknown variable 'B01001_001X'`; HTML pages show up for bad paths.
pub(crate) fn format_http_error(status: StatusCode, url: &str, body: &str) -> Error {
    let url = redact_key(url);
    let text = body.trim();
    let looks_like_html = text.starts_with('<');
    let detail = text
        .strip_prefix("error:")
        .map(str::trim)
        .unwrap_or(text);
    let detail = if looks_like_html {
        "(HTML error page)".to_string()
    } else {
        detail.chars().take(300).collect()
    };
    let lower = text.to_lowercase();

    let message = if lower.contains("invalid key") {
        format!(
            "The API key was rejected.\n- Check CENSUS_KEY (or TEST_KEY) in your .env file\n- Keys are activated from the confirmation e-mail after signing up\n\nServer message: {}",
            detail
        )
    } else if lower.contains("unknown variable") {
        format!(
            "The dataset does not define one of the requested variables.\n- Variable codes differ between vintages; check the dataset's variables list\n\nServer message: {}",
            detail
        )
    } else if lower.contains("geography") {
        format!(
            "The geography clause is not supported for this dataset.\n- Check the for= and in= clauses against the dataset's geography list\n\nServer message: {}",
            detail
        )
    } else if status == StatusCode::NOT_FOUND {
        format!(
            "Dataset endpoint not found (HTTP 404).\n- The year/dataset combination may not exist\n- Recommended base endpoint: https://api.census.gov\n\nServer message: {}",
            detail
        )
    } else if status == StatusCode::NO_CONTENT {
        "The query matched no data (HTTP 204).".to_string()
    } else {
        detail
    };

    Error::Http {
        status: status.as_u16(),
        url,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variable_is_explained() {
        let err = format_http_error(
            StatusCode::BAD_REQUEST,
            "https://api.census.gov/data/2005/acs/acs1?get=NAME,X&for=us:1&key=abc",
            "error: unknown variable 'X'",
        );
        assert_eq!(err.status_code(), Some(400));
        let text = err.to_string();
        assert!(text.contains("unknown variable 'X'"));
        assert!(text.contains("key=***"));
        assert!(!text.contains("key=abc"));
    }

    #[test]
    fn html_bodies_are_not_echoed() {
        let err = format_http_error(
            StatusCode::NOT_FOUND,
            "https://api.census.gov/data/1900/acs/acs1",
            "<html><body>404</body></html>",
        );
        let text = err.to_string();
        assert!(text.contains("HTTP 404"));
        assert!(text.contains("(HTML error page)"));
        assert!(!text.contains("<body>"));
    }

    #[test]
    fn configuration_error_lists_facets() {
        let err = Error::Configuration {
            missing: vec![Facet::Year, Facet::Dataset],
            url: "https://api.census.gov/data//".to_string(),
        };
        assert!(err.to_string().contains("year, dataset"));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn configuration_message_redacts_key_but_field_keeps_it() {
        let err = Error::Configuration {
            missing: vec![Facet::Year],
            url: "https://api.census.gov/data//acs/acs1?get=NAME&key=secret".to_string(),
        };
        assert!(err.to_string().contains("key=***"));
        assert!(!err.to_string().contains("secret"));
        match err {
            Error::Configuration { url, .. } => assert!(url.ends_with("key=secret")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn client_build_failure_has_its_own_message() {
        let source = reqwest::blocking::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = Error::ClientBuild(source);
        assert_eq!(err.to_string(), "failed to build HTTP client");
        assert!(std::error::Error::source(&err).is_some());
    }
}

//! A small Rust client for the U.S. Census Bureau data API.
//!
//! The flow: set the facets of a [`Query`] (year, dataset, variables,
//! geography, key), render its URL, GET it, and normalize the header-first
//! JSON array into a [`ResultTable`].
//!
//! ## Quick start
//! - Put your key in a `.env` file as `CENSUS_KEY=...` (`TEST_KEY=...` for a
//!   test key), in the current directory or your home directory, or point
//!   `CENSUS_ENV_FILE` at the file.
//! - Build a [`Query`] and pass it to [`Client::execute`].
//!
//! ```no_run
//! use censusapi::{Client, CredentialResolver, Dataset, GeoLevel, Query, acs};
//!
//! fn main() -> Result<(), censusapi::Error> {
//!     let mut query = Query::for_dataset(2005, Dataset::Acs1);
//!     query
//!         .set_variables([acs::POPULATION])
//!         .set_geography(GeoLevel::Us.code(1));
//!     // Keyless queries still work, at a lower rate limit.
//!     let _ = query.load_credentials(&CredentialResolver::new(), None, false);
//!
//!     let table = Client::new()?.execute(&query)?;
//!     assert_eq!(table.value(0, "NAME"), Some("United States"));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod client;
mod config;
mod dataset;
mod error;
mod geography;
mod query;
mod table;
mod util;

pub use client::Client;
pub use config::{
    CredentialResolver, ENV_FILE_VAR, PRODUCTION_KEY_VAR, TEST_KEY_VAR, resolve,
};
pub use dataset::{Dataset, Variable, acs};
pub use error::{CredentialWarning, Error, Facet, Result};
pub use geography::{GeoLevel, Geography};
pub use query::{DEFAULT_BASE_ENDPOINT, NAME_COLUMN, Query, Validation};
pub use table::{ResultTable, Row};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CredentialWarning;

/// Environment-file entry holding the production key.
pub const PRODUCTION_KEY_VAR: &str = "CENSUS_KEY";
/// Environment-file entry holding the test key.
pub const TEST_KEY_VAR: &str = "TEST_KEY";
/// Overrides the environment-file search with one explicit path.
pub const ENV_FILE_VAR: &str = "CENSUS_ENV_FILE";

/// Looks up the Census API key.
///
/// Precedence:
/// - an explicit, non-empty key
/// - `CENSUS_KEY` / `TEST_KEY` from the first environment file found
/// - the same names in the process environment (can be disabled)
///
/// The environment file is read into memory; the process environment is never
/// modified.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    candidates: Vec<PathBuf>,
    process_env: bool,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self {
            candidates: env_file_candidates(),
            process_env: true,
        }
    }
}

impl CredentialResolver {
    /// Resolver searching `CENSUS_ENV_FILE`, `./.env` and `~/.env`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver reading a single environment file.
    pub fn with_env_file(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
            process_env: true,
        }
    }

    /// Whether to consult the process environment when the file lookup fails.
    pub fn with_process_env(mut self, enabled: bool) -> Self {
        self.process_env = enabled;
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Resolves the key, returning a [`CredentialWarning`] when none is found.
    ///
    /// The warning is also logged; callers are expected to continue without a
    /// key rather than abort.
    pub fn resolve(
        &self,
        explicit_key: Option<&str>,
        use_test_key: bool,
    ) -> Result<String, CredentialWarning> {
        if let Some(key) = explicit_key.filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }

        let name = if use_test_key {
            TEST_KEY_VAR
        } else {
            PRODUCTION_KEY_VAR
        };

        let outcome = self.lookup_file(name);
        let outcome = match outcome {
            Ok(key) => Ok(key),
            Err(warning) => match self.lookup_process_env(name) {
                Some(key) => Ok(key),
                None => Err(warning),
            },
        };

        if let Err(warning) = &outcome {
            warn!(entry = name, "no Census API key resolved: {}", warning);
        }
        outcome
    }

    fn lookup_file(&self, name: &'static str) -> Result<String, CredentialWarning> {
        let Some(path) = self.candidates.iter().find(|p| p.is_file()) else {
            return Err(CredentialWarning::NoEnvFile {
                searched: self.candidates.clone(),
            });
        };

        debug!(path = %path.display(), "reading environment file");
        let entries = read_env_file(path)?;
        match entries.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(v) => Ok(v.to_string()),
            None => Err(CredentialWarning::MissingEntry {
                name,
                path: path.clone(),
            }),
        }
    }

    fn lookup_process_env(&self, name: &str) -> Option<String> {
        if !self.process_env {
            return None;
        }
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Shorthand for `CredentialResolver::new().resolve(explicit_key, use_test_key)`.
pub fn resolve(explicit_key: Option<&str>, use_test_key: bool) -> Result<String, CredentialWarning> {
    CredentialResolver::new().resolve(explicit_key, use_test_key)
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, CredentialWarning> {
    let unreadable = |source| CredentialWarning::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut entries = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(unreadable)? {
        let (k, v) = item.map_err(unreadable)?;
        entries.insert(k, v);
    }
    Ok(entries)
}

fn env_file_candidates() -> Vec<PathBuf> {
    if let Ok(p) = std::env::var(ENV_FILE_VAR) {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".env"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".env"));
    }
    v
}

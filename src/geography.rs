use std::fmt;

/// Summary levels accepted in `for=` / `in=` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoLevel {
    Us,
    State,
    County,
    Tract,
    BlockGroup,
    Block,
    Msa,
    PrincipalCity,
    Csa,
}

impl GeoLevel {
    /// Level name as the API spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            GeoLevel::Us => "us",
            GeoLevel::State => "state",
            GeoLevel::County => "county",
            GeoLevel::Tract => "tract",
            GeoLevel::BlockGroup => "block group",
            GeoLevel::Block => "block",
            GeoLevel::Msa => "metropolitan statistical area/micropolitan statistical area",
            GeoLevel::PrincipalCity => "principal city (or part)",
            GeoLevel::Csa => "combined statistical area",
        }
    }

    /// `level:*`, every instance of the level.
    pub fn all(self) -> Geography {
        Geography(format!("{}:*", self.as_str()))
    }

    /// `level:code`, e.g. `state:17`.
    pub fn code(self, code: impl fmt::Display) -> Geography {
        Geography(format!("{}:{}", self.as_str(), code))
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geography clause such as `county:*` or `state:17 county:031`.
///
/// Stored unencoded; spaces are escaped when the URL is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geography(String);

impl Geography {
    pub fn new(clause: impl Into<String>) -> Self {
        Self(clause.into())
    }

    /// Joins several clauses with a space, the form `in=` expects for nested
    /// parents (`state:17 county:031`).
    pub fn within(parts: &[Geography]) -> Self {
        Self(
            parts
                .iter()
                .map(|p| p.0.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Geography {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Geography {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<GeoLevel> for Geography {
    fn from(level: GeoLevel) -> Self {
        Self(level.as_str().to_string())
    }
}

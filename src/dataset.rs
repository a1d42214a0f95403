use std::fmt;
use std::ops::RangeInclusive;

/// A Census data product, identified by its slash-delimited path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// American Community Survey 1-year estimates.
    Acs1,
    /// American Community Survey 5-year estimates.
    Acs5,
    /// 2000/2010 decennial census, Summary File 1.
    DecennialSf1,
    Custom(String),
}

impl Dataset {
    pub fn path(&self) -> &str {
        match self {
            Dataset::Acs1 => "acs/acs1",
            Dataset::Acs5 => "acs/acs5",
            Dataset::DecennialSf1 => "dec/sf1",
            Dataset::Custom(p) => p.as_str(),
        }
    }

    /// Vintages the API is known to publish, where that is tracked.
    pub fn known_years(&self) -> Option<RangeInclusive<u16>> {
        match self {
            Dataset::Acs1 => Some(2005..=2021),
            Dataset::Acs5 => Some(2009..=2021),
            _ => None,
        }
    }

    /// `false` only when the year parses and lies outside [`Dataset::known_years`].
    pub fn publishes(&self, year: &str) -> bool {
        match (self.known_years(), year.trim().parse::<u16>()) {
            (Some(range), Ok(y)) => range.contains(&y),
            _ => true,
        }
    }

    /// Maps a path back to a preset, falling back to [`Dataset::Custom`].
    pub fn from_path(path: &str) -> Self {
        match path.trim_matches('/') {
            "acs/acs1" => Dataset::Acs1,
            "acs/acs5" => Dataset::Acs5,
            "dec/sf1" => Dataset::DecennialSf1,
            other => Dataset::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl From<&str> for Dataset {
    fn from(s: &str) -> Self {
        Dataset::from_path(s)
    }
}

impl From<String> for Dataset {
    fn from(s: String) -> Self {
        Dataset::from_path(&s)
    }
}

/// A variable code with a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub code: &'static str,
    pub label: &'static str,
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl From<Variable> for String {
    fn from(v: Variable) -> Self {
        v.code.to_string()
    }
}

/// Frequently used ACS detailed-table totals.
pub mod acs {
    use super::Variable;

    pub const POPULATION: Variable = Variable {
        code: "B01001_001E",
        label: "Population",
    };
    pub const EMPLOYMENT: Variable = Variable {
        code: "B23001_001E",
        label: "Employment",
    };
    pub const EARNINGS: Variable = Variable {
        code: "B19051_001E",
        label: "Earnings",
    };
    pub const MEDIAN_EARNINGS: Variable = Variable {
        code: "B20004_001E",
        label: "Median Earnings",
    };
    pub const HOUSEHOLD_INCOME: Variable = Variable {
        code: "B19001_001E",
        label: "Household Income",
    };
    pub const WAGE_OR_SALARY: Variable = Variable {
        code: "B19052_001E",
        label: "Wage/Salary",
    };
    // Sum of B17002_002E..004E
    pub const POVERTY_RATIO: Variable = Variable {
        code: "B17002_001E",
        label: "Poverty Ratio",
    };

    pub const ALL: [Variable; 7] = [
        POPULATION,
        EMPLOYMENT,
        EARNINGS,
        MEDIAN_EARNINGS,
        HOUSEHOLD_INCOME,
        WAGE_OR_SALARY,
        POVERTY_RATIO,
    ];

    /// Label for a known code.
    pub fn label(code: &str) -> Option<&'static str> {
        ALL.iter().find(|v| v.code == code).map(|v| v.label)
    }
}

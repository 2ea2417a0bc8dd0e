use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The user-facing chart selector. Each variant names one dataset and
/// the category field its records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChartType {
    Customer,
    Team,
    #[serde(rename = "Account Industry")]
    AccountIndustry,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Customer, ChartType::Team, ChartType::AccountIndustry];

    /// The label shown in the chart-type dropdown and as the table header.
    pub fn display_name(&self) -> &'static str {
        match self {
            ChartType::Customer => "Customer",
            ChartType::Team => "Team",
            ChartType::AccountIndustry => "Account Industry",
        }
    }

    /// The path segment used by the per-dataset API routes.
    pub fn slug(&self) -> &'static str {
        match self {
            ChartType::Customer => "customer",
            ChartType::Team => "team",
            ChartType::AccountIndustry => "account_industry",
        }
    }

    /// The JSON field in the fixture that discriminates categories.
    pub fn category_field(&self) -> &'static str {
        match self {
            ChartType::Customer => "Cust_Type",
            ChartType::Team => "Team",
            ChartType::AccountIndustry => "Acct_Industry",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ChartType {
    type Err = CoreError;

    /// Accepts display names ("Account Industry") and slugs ("account_industry",
    /// "account-industry"), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "customer" => Ok(ChartType::Customer),
            "team" => Ok(ChartType::Team),
            "account_industry" => Ok(ChartType::AccountIndustry),
            _ => Err(CoreError::UnknownChartType(s.to_string())),
        }
    }
}

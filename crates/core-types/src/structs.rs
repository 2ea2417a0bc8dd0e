use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// One closed opportunity as it appears in the JSON fixtures.
///
/// Every field is optional because the fixtures are hand-exported
/// spreadsheets. Key validation happens at aggregation time, where the
/// position of the offending record is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Fiscal-quarter label such as `"2024-Q1"`.
    #[serde(default)]
    pub closed_fiscal_quarter: Option<String>,

    /// Annual contract value. Missing, `null` and non-numeric values all
    /// read as `None`, which the aggregator counts as zero. A number too
    /// large for `Decimal` fails deserialization.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub acv: Option<Decimal>,

    #[serde(default, rename = "Cust_Type")]
    pub cust_type: Option<String>,

    #[serde(default, rename = "Team")]
    pub team: Option<String>,

    #[serde(default, rename = "Acct_Industry")]
    pub acct_industry: Option<String>,
}

impl SalesRecord {
    /// The amount this record contributes to its cell.
    pub fn amount(&self) -> Decimal {
        self.acv.unwrap_or(Decimal::ZERO)
    }
}

/// Accepts JSON numbers and numeric strings; anything else becomes `None`.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => return Ok(None),
    };
    if let Some(amount) = parse_decimal(&text) {
        return Ok(Some(amount));
    }
    match text.parse::<f64>() {
        // Below Decimal's 28-digit scale.
        Ok(n) if n.is_finite() && n.abs() < 1.0 => Ok(Some(Decimal::ZERO)),
        Ok(n) if n.is_finite() => Err(D::Error::custom(format!(
            "acv `{text}` is outside the decimal range"
        ))),
        _ => Ok(None),
    }
}

/// Parses plain (`"1234.5"`) and scientific (`"1e21"`) notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

use crate::error::AnalyticsError;
use core_types::{ChartType, SalesRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixture field every record is bucketed by.
pub const BUCKET_FIELD: &str = "closed_fiscal_quarter";

/// The `Cust_Type` value that counts as an existing customer.
pub const EXISTING_CUSTOMER: &str = "Existing Customer";
pub const EXISTING_LABEL: &str = "Existing";
pub const NEW_LABEL: &str = "New";

/// The key `GroupedTotals` serializes its quarter under. No category may use it.
pub const QUARTER_KEY: &str = "quarter";

/// Reads the category value out of a record.
pub type CategorySelector = fn(&SalesRecord) -> Option<&str>;

/// Per-category ACV totals for one fiscal quarter.
///
/// A category that is absent from `totals` has a total of zero; use
/// [`GroupedTotals::get`] rather than indexing the map directly.
///
/// Serializes flat, e.g. `{"quarter": "2024-Q1", "Existing": 10.5, "New": 3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedTotals {
    pub quarter: String,
    #[serde(flatten)]
    pub totals: BTreeMap<String, Decimal>,
}

impl GroupedTotals {
    pub fn new(quarter: impl Into<String>) -> Self {
        Self {
            quarter: quarter.into(),
            totals: BTreeMap::new(),
        }
    }

    /// Adds `amount` to the `category` cell, creating it at zero if needed.
    pub fn add(&mut self, category: &str, amount: Decimal) -> Result<(), AnalyticsError> {
        let cell = self.totals.entry(category.to_string()).or_insert(Decimal::ZERO);
        *cell = cell
            .checked_add(amount)
            .ok_or_else(|| AnalyticsError::Overflow(format!("`{category}` in {}", self.quarter)))?;
        Ok(())
    }

    /// The total for `category`, zero when the category was never observed.
    pub fn get(&self, category: &str) -> Decimal {
        self.totals.get(category).copied().unwrap_or(Decimal::ZERO)
    }

    /// The sum over all categories in this quarter.
    pub fn total(&self) -> Result<Decimal, AnalyticsError> {
        checked_sum(self.totals.values().copied(), || format!("total of {}", self.quarter))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.totals.keys().map(String::as_str)
    }
}

/// How a record's raw category value maps to an output label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryPolicy {
    /// Lossy two-way split: `sentinel` goes to `matched`, every other value
    /// to `unmatched`. Both labels appear in every quarter, zero or not.
    Binary {
        sentinel: String,
        matched: String,
        unmatched: String,
    },
    /// Values pass through verbatim; the label set is whatever was observed.
    Open,
}

impl CategoryPolicy {
    /// The customer-type split: "Existing Customer" vs. everything else.
    pub fn customer_type() -> Self {
        CategoryPolicy::Binary {
            sentinel: EXISTING_CUSTOMER.to_string(),
            matched: EXISTING_LABEL.to_string(),
            unmatched: NEW_LABEL.to_string(),
        }
    }

    fn label<'a>(&'a self, value: &'a str) -> &'a str {
        match self {
            CategoryPolicy::Binary { sentinel, matched, unmatched } => {
                if value == sentinel.as_str() { matched.as_str() } else { unmatched.as_str() }
            }
            CategoryPolicy::Open => value,
        }
    }

    fn seed(&self, group: &mut GroupedTotals) {
        if let CategoryPolicy::Binary { matched, unmatched, .. } = self {
            group.totals.entry(matched.clone()).or_insert(Decimal::ZERO);
            group.totals.entry(unmatched.clone()).or_insert(Decimal::ZERO);
        }
    }
}

/// Groups records by fiscal quarter and sums their ACV per category.
///
/// Stateless: every call to [`Aggregator::aggregate`] builds its output from
/// scratch, and the result does not depend on input order.
#[derive(Debug, Clone)]
pub struct Aggregator {
    field: &'static str,
    selector: CategorySelector,
    policy: CategoryPolicy,
}

impl Aggregator {
    /// `field` names the category field in error messages; `selector` reads it.
    pub fn new(field: &'static str, selector: CategorySelector, policy: CategoryPolicy) -> Self {
        Self { field, selector, policy }
    }

    /// The aggregator behind each option of the chart-type selector.
    pub fn for_chart(chart: ChartType) -> Self {
        match chart {
            ChartType::Customer => Self::new(
                chart.category_field(),
                |r| r.cust_type.as_deref(),
                CategoryPolicy::customer_type(),
            ),
            ChartType::Team => Self::new(
                chart.category_field(),
                |r| r.team.as_deref(),
                CategoryPolicy::Open,
            ),
            ChartType::AccountIndustry => Self::new(
                chart.category_field(),
                |r| r.acct_industry.as_deref(),
                CategoryPolicy::Open,
            ),
        }
    }

    /// Buckets `records` by quarter.
    ///
    /// Missing amounts count as zero. A record with a missing or blank
    /// quarter or category value is rejected with
    /// [`AnalyticsError::MalformedRecord`], one whose label is
    /// [`QUARTER_KEY`] with [`AnalyticsError::ReservedCategory`]. A cell
    /// that leaves `Decimal`'s range is an [`AnalyticsError::Overflow`].
    pub fn aggregate(
        &self,
        records: &[SalesRecord],
    ) -> Result<BTreeMap<String, GroupedTotals>, AnalyticsError> {
        let mut buckets: BTreeMap<String, GroupedTotals> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let quarter = non_blank(record.closed_fiscal_quarter.as_deref())
                .ok_or_else(|| malformed(index, BUCKET_FIELD))?;
            let value = non_blank((self.selector)(record)).ok_or_else(|| malformed(index, self.field))?;

            let group = buckets.entry(quarter.to_string()).or_insert_with(|| {
                let mut group = GroupedTotals::new(quarter);
                self.policy.seed(&mut group);
                group
            });
            let label = self.policy.label(value);
            if label == QUARTER_KEY {
                return Err(AnalyticsError::ReservedCategory {
                    index,
                    category: label.to_string(),
                });
            }
            group.add(label, record.amount())?;
        }

        tracing::debug!(
            field = self.field,
            records = records.len(),
            quarters = buckets.len(),
            "Aggregated records by fiscal quarter."
        );
        Ok(buckets)
    }
}

/// Shorthand for `Aggregator::for_chart(chart).aggregate(records)`.
pub fn aggregate_chart(
    chart: ChartType,
    records: &[SalesRecord],
) -> Result<BTreeMap<String, GroupedTotals>, AnalyticsError> {
    Aggregator::for_chart(chart).aggregate(records)
}

/// Sums `values`, reporting `context` when the sum leaves `Decimal`'s range.
pub(crate) fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    context: impl FnOnce() -> String,
) -> Result<Decimal, AnalyticsError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| AnalyticsError::Overflow(context()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn malformed(index: usize, field: &str) -> AnalyticsError {
    AnalyticsError::MalformedRecord {
        index,
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn customer(quarter: &str, acv: Option<Decimal>, cust_type: &str) -> SalesRecord {
        SalesRecord {
            closed_fiscal_quarter: Some(quarter.to_string()),
            acv,
            cust_type: Some(cust_type.to_string()),
            ..Default::default()
        }
    }

    fn team(quarter: &str, acv: Decimal, team: &str) -> SalesRecord {
        SalesRecord {
            closed_fiscal_quarter: Some(quarter.to_string()),
            acv: Some(acv),
            team: Some(team.to_string()),
            ..Default::default()
        }
    }

    fn sample_teams() -> Vec<SalesRecord> {
        vec![
            team("2023-Q3", dec!(1000.50), "Asia Pac"),
            team("2023-Q4", dec!(250), "Europe"),
            team("2023-Q3", dec!(400), "Europe"),
            team("2024-Q1", dec!(75.25), "North America"),
            team("2023-Q3", dec!(99.50), "Asia Pac"),
            team("2023-Q4", dec!(10), "North America"),
        ]
    }

    #[test]
    fn empty_input_yields_empty_map() {
        for chart in ChartType::ALL {
            assert!(aggregate_chart(chart, &[]).unwrap().is_empty());
        }
    }

    #[test]
    fn open_policy_passes_categories_through() {
        let out = aggregate_chart(ChartType::Team, &sample_teams()).unwrap();
        assert_eq!(out.len(), 3);

        let q3 = &out["2023-Q3"];
        assert_eq!(q3.get("Asia Pac"), dec!(1100.00));
        assert_eq!(q3.get("Europe"), dec!(400));
        assert_eq!(q3.categories().collect::<Vec<_>>(), vec!["Asia Pac", "Europe"]);
        // Zero-fill for a team that never closed in Q3.
        assert_eq!(q3.get("North America"), Decimal::ZERO);
    }

    #[test]
    fn totals_are_conserved_per_quarter_and_overall() {
        let records = sample_teams();
        let out = aggregate_chart(ChartType::Team, &records).unwrap();

        for (quarter, group) in &out {
            let expected: Decimal = records
                .iter()
                .filter(|r| r.closed_fiscal_quarter.as_deref() == Some(quarter.as_str()))
                .map(SalesRecord::amount)
                .sum();
            assert_eq!(group.total().unwrap(), expected, "quarter {quarter}");
        }

        let grand: Decimal = out.values().map(|g| g.total().unwrap()).sum();
        let input: Decimal = records.iter().map(SalesRecord::amount).sum();
        assert_eq!(grand, input);
    }

    #[test]
    fn output_does_not_depend_on_input_order() {
        let records = sample_teams();
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        let baseline = aggregate_chart(ChartType::Team, &records).unwrap();
        assert_eq!(aggregate_chart(ChartType::Team, &reversed).unwrap(), baseline);
        assert_eq!(aggregate_chart(ChartType::Team, &rotated).unwrap(), baseline);
    }

    #[test]
    fn binary_policy_collapses_to_existing_and_new() {
        let records = vec![
            customer("2023-Q3", Some(dec!(100)), "Existing Customer"),
            customer("2023-Q3", Some(dec!(40)), "New Customer"),
            customer("2023-Q3", Some(dec!(2)), "Partner"),
            customer("2023-Q3", Some(dec!(1)), "existing customer"),
            customer("2023-Q4", Some(dec!(7)), "Existing Customer"),
        ];
        let out = aggregate_chart(ChartType::Customer, &records).unwrap();

        let q3 = &out["2023-Q3"];
        assert_eq!(q3.get(EXISTING_LABEL), dec!(100));
        assert_eq!(q3.get(NEW_LABEL), dec!(43));
        assert_eq!(q3.totals.len(), 2);

        // Both labels are present even when one of them saw no records.
        let q4 = &out["2023-Q4"];
        assert_eq!(q4.totals.get(NEW_LABEL), Some(&Decimal::ZERO));
        assert_eq!(q4.get(EXISTING_LABEL), dec!(7));
    }

    #[test]
    fn missing_amount_contributes_zero() {
        let records = vec![
            customer("2023-Q3", None, "Existing Customer"),
            customer("2023-Q3", Some(dec!(5)), "Existing Customer"),
        ];
        let out = aggregate_chart(ChartType::Customer, &records).unwrap();
        assert_eq!(out["2023-Q3"].get(EXISTING_LABEL), dec!(5));
    }

    #[test]
    fn missing_quarter_is_rejected_with_index() {
        let mut records = sample_teams();
        records[2].closed_fiscal_quarter = None;
        let err = aggregate_chart(ChartType::Team, &records).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::MalformedRecord {
                index: 2,
                field: BUCKET_FIELD.to_string()
            }
        );
    }

    #[test]
    fn missing_or_blank_category_is_rejected() {
        let mut records = sample_teams();
        records[4].team = Some("   ".to_string());
        let err = aggregate_chart(ChartType::Team, &records).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::MalformedRecord {
                index: 4,
                field: "Team".to_string()
            }
        );

        let mut records = vec![customer("2023-Q3", Some(dec!(1)), "Existing Customer")];
        records[0].cust_type = None;
        assert!(matches!(
            aggregate_chart(ChartType::Customer, &records),
            Err(AnalyticsError::MalformedRecord { index: 0, ref field }) if field == "Cust_Type"
        ));
    }

    #[test]
    fn custom_selector_and_policy() {
        let records = vec![team("2024-Q2", dec!(3), "Europe"), team("2024-Q2", dec!(4), "LATAM")];
        let aggregator = Aggregator::new(
            "Team",
            |r| r.team.as_deref(),
            CategoryPolicy::Binary {
                sentinel: "Europe".to_string(),
                matched: "EMEA".to_string(),
                unmatched: "Rest of World".to_string(),
            },
        );
        let out = aggregator.aggregate(&records).unwrap();
        assert_eq!(out["2024-Q2"].get("EMEA"), dec!(3));
        assert_eq!(out["2024-Q2"].get("Rest of World"), dec!(4));
    }

    #[test]
    fn grouped_totals_serialize_flat() {
        let mut group = GroupedTotals::new("2024-Q1");
        group.add("Existing", dec!(10.5)).unwrap();
        group.add("New", dec!(3)).unwrap();
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json, serde_json::json!({"quarter": "2024-Q1", "Existing": 10.5, "New": 3.0}));
    }

    #[test]
    fn sums_beyond_decimal_range_are_errors() {
        let big = Decimal::from_scientific("5e28").unwrap();
        let records = vec![team("2024-Q1", big, "Europe"), team("2024-Q1", big, "Europe")];
        let err = aggregate_chart(ChartType::Team, &records).unwrap_err();
        assert!(matches!(err, AnalyticsError::Overflow(ref what) if what.contains("Europe")), "{err}");

        // Separate cells fit; only their quarter total does not.
        let records = vec![team("2024-Q1", big, "Europe"), team("2024-Q1", big, "Asia Pac")];
        let out = aggregate_chart(ChartType::Team, &records).unwrap();
        assert!(matches!(out["2024-Q1"].total(), Err(AnalyticsError::Overflow(_))));
    }

    #[test]
    fn category_named_like_the_quarter_key_is_rejected() {
        let mut records = sample_teams();
        records[3].team = Some(QUARTER_KEY.to_string());
        let err = aggregate_chart(ChartType::Team, &records).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::ReservedCategory {
                index: 3,
                category: QUARTER_KEY.to_string()
            }
        );
    }
}

use crate::aggregate::GroupedTotals;
use crate::error::AnalyticsError;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Orders fiscal-quarter labels such as `"2023-Q4"` and `"2024-Q1"`.
///
/// The label is split at the first `-`; the year part is compared first and
/// the quarter part second, both as plain strings. A label without a `-` is
/// treated as a bare year.
pub fn compare_quarter_labels(a: &str, b: &str) -> Ordering {
    let (a_year, a_quarter) = a.split_once('-').unwrap_or((a, ""));
    let (b_year, b_quarter) = b.split_once('-').unwrap_or((b, ""));
    a_year.cmp(b_year).then_with(|| a_quarter.cmp(b_quarter))
}

/// Turns the aggregator's map into a chronologically ordered sequence.
pub fn order_quarters(groups: BTreeMap<String, GroupedTotals>) -> Vec<GroupedTotals> {
    let mut ordered: Vec<GroupedTotals> = groups.into_values().collect();
    ordered.sort_by(|a, b| compare_quarter_labels(&a.quarter, &b.quarter));
    ordered
}

/// Every category seen in any quarter with its all-quarter total, largest
/// first. Ties are broken by name so the order is stable.
pub fn ranked_categories(quarters: &[GroupedTotals]) -> Result<Vec<(String, Decimal)>, AnalyticsError> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for group in quarters {
        for (category, amount) in &group.totals {
            let total = totals.entry(category.as_str()).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(*amount)
                .ok_or_else(|| AnalyticsError::Overflow(format!("all-quarter total of `{category}`")))?;
        }
    }

    let mut ranked: Vec<(String, Decimal)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_string(), total))
        .collect();
    ranked.sort_by(|(a_name, a_total), (b_name, b_total)| {
        b_total.cmp(a_total).then_with(|| a_name.cmp(b_name))
    });
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn group(quarter: &str, cells: &[(&str, Decimal)]) -> GroupedTotals {
        let mut g = GroupedTotals::new(quarter);
        for (category, amount) in cells {
            g.add(category, *amount).unwrap();
        }
        g
    }

    #[test]
    fn quarters_sort_by_year_then_quarter() {
        let mut labels = vec!["2024-Q2", "2023-Q4", "2024-Q1", "2023-Q3"];
        labels.sort_by(|a, b| compare_quarter_labels(a, b));
        assert_eq!(labels, vec!["2023-Q3", "2023-Q4", "2024-Q1", "2024-Q2"]);
    }

    #[test]
    fn label_without_separator_sorts_before_its_quarters() {
        assert_eq!(compare_quarter_labels("2024", "2024-Q1"), Ordering::Less);
        assert_eq!(compare_quarter_labels("2023-Q4", "2024"), Ordering::Less);
    }

    #[test]
    fn order_quarters_returns_chronological_sequence() {
        let mut map = BTreeMap::new();
        for q in ["2024-Q1", "2023-Q3", "2023-Q4"] {
            map.insert(q.to_string(), group(q, &[("New", dec!(1))]));
        }
        let ordered: Vec<String> = order_quarters(map).into_iter().map(|g| g.quarter).collect();
        assert_eq!(ordered, vec!["2023-Q3", "2023-Q4", "2024-Q1"]);
    }

    #[test]
    fn categories_rank_by_total_then_name() {
        let quarters = vec![
            group("2023-Q3", &[("Retail", dec!(5)), ("Education", dec!(10))]),
            group("2023-Q4", &[("Retail", dec!(5)), ("Manufacturing", dec!(30))]),
        ];
        let ranked = ranked_categories(&quarters).unwrap();
        assert_eq!(
            ranked,
            vec![
                ("Manufacturing".to_string(), dec!(30)),
                ("Education".to_string(), dec!(10)),
                ("Retail".to_string(), dec!(10)),
            ]
        );
    }

    #[test]
    fn category_totals_beyond_decimal_range_are_errors() {
        let big = Decimal::from_scientific("5e28").unwrap();
        let quarters = vec![group("2023-Q3", &[("Retail", big)]), group("2023-Q4", &[("Retail", big)])];
        assert!(matches!(ranked_categories(&quarters), Err(AnalyticsError::Overflow(_))));
    }
}

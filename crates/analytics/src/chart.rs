use crate::aggregate::{GroupedTotals, aggregate_chart, checked_sum};
use crate::error::AnalyticsError;
use crate::format::format_number;
use crate::quarters::{order_quarters, ranked_categories};
use crate::table::{SummaryTable, percent_of, whole_percent};
use core_types::{ChartType, SalesRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Everything the dashboard page needs to draw one chart type: the stacked
/// bars, the donut and the summary table, with labels already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub chart_type: ChartType,
    pub quarters: Vec<GroupedTotals>,
    pub bars: Vec<StackedBar>,
    pub donut: Donut,
    pub table: SummaryTable,
}

/// One quarter's column in the stacked bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBar {
    pub quarter: String,
    pub total: Decimal,
    pub total_label: String,
    pub segments: Vec<BarSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub category: String,
    pub value: Decimal,
    pub label: String,
    /// Whole-percent share of the quarter total.
    pub share_pct: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Donut {
    pub total: Decimal,
    pub center_label: String,
    pub slices: Vec<DonutSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutSlice {
    pub category: String,
    pub value: Decimal,
    /// Share of the all-quarter total, one decimal place.
    pub share_pct: String,
    /// e.g. `$1.250M (62.5%)`
    pub label: String,
}

impl ChartView {
    /// Builds the view from quarters already in display order. Segments and
    /// slices follow the table's category ranking so colours line up.
    pub fn build(chart_type: ChartType, quarters: Vec<GroupedTotals>) -> Result<Self, AnalyticsError> {
        let ranked = ranked_categories(&quarters)?;

        let mut bars = Vec::with_capacity(quarters.len());
        for group in &quarters {
            let total = group.total()?;
            let mut segments = Vec::with_capacity(ranked.len());
            for (category, _) in &ranked {
                let value = group.get(category);
                segments.push(BarSegment {
                    category: category.clone(),
                    value,
                    label: dollars(value),
                    share_pct: whole_percent(value, total)?,
                });
            }
            bars.push(StackedBar {
                quarter: group.quarter.clone(),
                total,
                total_label: dollars(total),
                segments,
            });
        }

        let donut_total = checked_sum(ranked.iter().map(|(_, value)| *value), || "donut total".to_string())?;
        let mut slices = Vec::with_capacity(ranked.len());
        for (category, value) in &ranked {
            let share = share_pct(*value, donut_total)?;
            slices.push(DonutSlice {
                category: category.clone(),
                value: *value,
                label: format!("{} ({}%)", dollars(*value), share),
                share_pct: share,
            });
        }

        Ok(Self {
            chart_type,
            table: SummaryTable::build(chart_type, &quarters)?,
            bars,
            donut: Donut {
                total: donut_total,
                center_label: format!("Total: {}", dollars(donut_total)),
                slices,
            },
            quarters,
        })
    }
}

/// Aggregates `records` for `chart` and builds its view in quarter order.
pub fn build_chart(chart: ChartType, records: &[SalesRecord]) -> Result<ChartView, AnalyticsError> {
    let grouped = aggregate_chart(chart, records)?;
    ChartView::build(chart, order_quarters(grouped))
}

fn dollars(value: Decimal) -> String {
    format!("${}", format_number(value))
}

/// `value / total * 100` to one decimal place; `"0.0"` for a zero total.
fn share_pct(value: Decimal, total: Decimal) -> Result<String, AnalyticsError> {
    if total.is_zero() {
        return Ok("0.0".to_string());
    }
    let mut pct = percent_of(value, total)?.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    pct.rescale(1);
    Ok(pct.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{EXISTING_LABEL, NEW_LABEL};
    use rust_decimal_macros::dec;

    fn record(quarter: &str, acv: Decimal, cust_type: &str) -> SalesRecord {
        SalesRecord {
            closed_fiscal_quarter: Some(quarter.to_string()),
            acv: Some(acv),
            cust_type: Some(cust_type.to_string()),
            ..Default::default()
        }
    }

    fn customer_records() -> Vec<SalesRecord> {
        vec![
            record("2024-Q1", dec!(750000), "Existing Customer"),
            record("2023-Q4", dec!(1500), "New Customer"),
            record("2023-Q4", dec!(4500), "Existing Customer"),
            record("2024-Q1", dec!(250000), "New Customer"),
        ]
    }

    #[test]
    fn bars_follow_quarter_order() {
        let view = build_chart(ChartType::Customer, &customer_records()).unwrap();
        let quarters: Vec<&str> = view.bars.iter().map(|b| b.quarter.as_str()).collect();
        assert_eq!(quarters, vec!["2023-Q4", "2024-Q1"]);
        assert_eq!(view.quarters[0].quarter, "2023-Q4");
    }

    #[test]
    fn bar_segments_carry_labels_and_shares() {
        let view = build_chart(ChartType::Customer, &customer_records()).unwrap();
        let q4 = &view.bars[0];
        assert_eq!(q4.total, dec!(6000));
        assert_eq!(q4.total_label, "$6.000K");

        let existing = q4.segments.iter().find(|s| s.category == EXISTING_LABEL).unwrap();
        assert_eq!(existing.label, "$4.500K");
        assert_eq!(existing.share_pct, 75);

        let new = q4.segments.iter().find(|s| s.category == NEW_LABEL).unwrap();
        assert_eq!(new.share_pct, 25);
    }

    #[test]
    fn donut_sums_every_quarter() {
        let view = build_chart(ChartType::Customer, &customer_records()).unwrap();
        assert_eq!(view.donut.total, dec!(1006000));
        assert_eq!(view.donut.center_label, "Total: $1.006M");

        let existing = &view.donut.slices[0];
        assert_eq!(existing.category, EXISTING_LABEL);
        assert_eq!(existing.value, dec!(754500));
        assert_eq!(existing.share_pct, "75.0");
        assert_eq!(existing.label, "$754.5K (75.0%)");
    }

    #[test]
    fn zero_total_quarters_have_zero_shares() {
        let records = vec![record("2024-Q2", Decimal::ZERO, "Existing Customer")];
        let view = build_chart(ChartType::Customer, &records).unwrap();
        assert!(view.bars[0].segments.iter().all(|s| s.share_pct == 0));
        assert_eq!(view.donut.center_label, "Total: $0");
    }

    #[test]
    fn empty_records_build_an_empty_view() {
        let view = build_chart(ChartType::Team, &[]).unwrap();
        assert!(view.bars.is_empty());
        assert!(view.donut.slices.is_empty());
        assert!(view.table.rows.is_empty());
    }

    #[test]
    fn malformed_records_propagate() {
        let mut records = customer_records();
        records[1].closed_fiscal_quarter = Some(String::new());
        assert!(matches!(
            build_chart(ChartType::Customer, &records),
            Err(AnalyticsError::MalformedRecord { index: 1, .. })
        ));
    }

    #[test]
    fn share_pct_rounds_to_one_decimal() {
        assert_eq!(share_pct(dec!(1), dec!(3)).unwrap(), "33.3");
        assert_eq!(share_pct(dec!(2), dec!(3)).unwrap(), "66.7");
        assert_eq!(share_pct(dec!(1), dec!(1)).unwrap(), "100.0");
    }

    #[test]
    fn bar_shares_are_whole_percents() {
        let records = vec![
            record("2024-Q1", dec!(1), "Existing Customer"),
            record("2024-Q1", dec!(2), "New Customer"),
        ];
        let view = build_chart(ChartType::Customer, &records).unwrap();
        let shares: Vec<i64> = view.bars[0].segments.iter().map(|s| s.share_pct).collect();
        assert_eq!(shares, vec![67, 33]);
        assert_eq!(view.donut.slices[0].share_pct, "66.7");
    }

    #[test]
    fn overflowing_totals_propagate() {
        let big = Decimal::from_scientific("5e28").unwrap();
        let records = vec![
            record("2023-Q4", big, "Existing Customer"),
            record("2024-Q1", big, "Existing Customer"),
        ];
        assert!(matches!(
            build_chart(ChartType::Customer, &records),
            Err(AnalyticsError::Overflow(_))
        ));
    }
}

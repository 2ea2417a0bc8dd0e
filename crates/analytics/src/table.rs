use crate::aggregate::{GroupedTotals, checked_sum};
use crate::error::AnalyticsError;
use crate::format::format_number;
use crate::quarters::ranked_categories;
use core_types::ChartType;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// The quarter-by-category summary shown under each chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    /// First header column, the chart type's display name.
    pub header: String,
    pub quarters: Vec<String>,
    /// One row per category, largest overall total first.
    pub rows: Vec<TableRow>,
    pub totals: TotalsRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub category: String,
    /// One cell per entry of `SummaryTable::quarters`.
    pub cells: Vec<TableCell>,
    pub total: TableCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsRow {
    pub cells: Vec<TableCell>,
    pub total: TableCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub value: Decimal,
    pub label: String,
    /// Whole-percent share of the column total.
    pub pct: i64,
}

impl SummaryTable {
    /// Builds the table from quarters that are already in display order.
    pub fn build(chart: ChartType, quarters: &[GroupedTotals]) -> Result<Self, AnalyticsError> {
        let ranked = ranked_categories(quarters)?;
        let quarter_totals = quarters
            .iter()
            .map(GroupedTotals::total)
            .collect::<Result<Vec<Decimal>, AnalyticsError>>()?;
        let grand_total = checked_sum(ranked.iter().map(|(_, total)| *total), || "grand total".to_string())?;

        let mut rows = Vec::with_capacity(ranked.len());
        for (category, category_total) in ranked {
            let mut cells = Vec::with_capacity(quarters.len());
            for (group, quarter_total) in quarters.iter().zip(&quarter_totals) {
                let value = group.get(&category);
                cells.push(TableCell {
                    value,
                    label: quarter_cell_label(value),
                    pct: whole_percent(value, *quarter_total)?,
                });
            }
            rows.push(TableRow {
                total: TableCell {
                    value: category_total,
                    label: format_number(category_total),
                    pct: whole_percent(category_total, grand_total)?,
                },
                category,
                cells,
            });
        }

        let totals = TotalsRow {
            cells: quarter_totals.iter().map(|total| full_cell(*total)).collect(),
            total: full_cell(grand_total),
        };

        Ok(Self {
            header: chart.display_name().to_string(),
            quarters: quarters.iter().map(|g| g.quarter.clone()).collect(),
            rows,
            totals,
        })
    }
}

/// Empty quarter cells read `$0`; everything else goes through the formatter.
fn quarter_cell_label(value: Decimal) -> String {
    if value.is_zero() {
        "$0".to_string()
    } else {
        format_number(value)
    }
}

fn full_cell(value: Decimal) -> TableCell {
    TableCell {
        value,
        label: format_number(value),
        pct: 100,
    }
}

/// `round(value / total * 100)`, or 0 when the total is zero.
pub(crate) fn whole_percent(value: Decimal, total: Decimal) -> Result<i64, AnalyticsError> {
    if total.is_zero() {
        return Ok(0);
    }
    Ok(percent_of(value, total)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0))
}

/// `value / total * 100` for a non-zero `total`.
pub(crate) fn percent_of(value: Decimal, total: Decimal) -> Result<Decimal, AnalyticsError> {
    value
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| AnalyticsError::Overflow(format!("share of {value} in {total}")))
}

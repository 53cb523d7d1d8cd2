//! Simulation Reports
//!
//! Everything a chart or console renderer needs about a finished run.

use std::fmt::Write as _;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Metrics, SimulationTable};

/// Currency suffix used in artifact names
pub const REPORT_CURRENCY: &str = "USD";

/// Result of one complete simulation run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub instrument: String,
    pub entry_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_amount: Decimal,

    /// Entry dates tried before the provider returned data
    pub attempts: u32,

    pub table: SimulationTable,
    pub metrics: Metrics,
}

/// A dated point on one of the chart lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// The two lines plotted for a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    pub cumulative_invested: Vec<ChartPoint>,
    pub portfolio_value: Vec<ChartPoint>,
}

impl SimulationReport {
    /// File-safe artifact name: `{instrument}--{entry}--{end}--USD`
    pub fn artifact_stem(&self) -> String {
        format!(
            "{}--{}--{}--{}",
            self.instrument.replace('.', "-"),
            self.entry_date,
            self.end_date,
            REPORT_CURRENCY
        )
    }

    /// Cumulative invested and portfolio value over time
    pub fn chart_series(&self) -> ChartSeries {
        let rows = self.table.rows();
        ChartSeries {
            cumulative_invested: rows
                .iter()
                .map(|r| ChartPoint { date: r.date, value: r.cumulative_invested })
                .collect(),
            portfolio_value: rows
                .iter()
                .map(|r| ChartPoint { date: r.date, value: r.portfolio_value })
                .collect(),
        }
    }

    /// Console summary
    pub fn summary(&self) -> String {
        let m = &self.metrics;
        let mut s = String::new();
        s.push_str(&format!("DCA {}: ${:.2} per month\n", self.instrument, self.monthly_amount));
        s.push_str(&format!("Entry date: {}\n", self.entry_date));
        s.push_str(&format!("End date: {}\n", self.end_date));
        s.push_str(&format!("Total invested: ${:.2}\n", m.total_cost));
        s.push_str(&format!("Market value: ${:.2}\n", m.final_value));
        s.push_str(&format!("Total return: {:.2}%\n", m.total_return_pct));
        s.push_str(&format!("Annualized return: {:.2}%\n", m.annualized_return_pct));
        s
    }
}

/// Turns a report into a presentable artifact
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &SimulationReport) -> Result<String>;

    /// Suggested file extension for the artifact
    fn extension(&self) -> &str;
}

/// Summary followed by the per-period table
#[derive(Clone, Copy, Debug, Default)]
pub struct TextReportRenderer {
    /// Include every period, not just the summary
    pub include_table: bool,
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, report: &SimulationReport) -> Result<String> {
        let mut out = report.summary();
        if !self.include_table {
            return Ok(out);
        }

        out.push('\n');
        let _ = writeln!(
            out,
            "{:>6}  {:<10}  {:>12}  {:>14}  {:>16}  {:>14}  {:>14}",
            "Period", "Date", "Price", "Shares Bought", "Total Shares", "Invested", "Value"
        );
        for row in report.table.rows() {
            let _ = writeln!(
                out,
                "{:>6}  {:<10}  {:>12.2}  {:>14.6}  {:>16.6}  {:>14.2}  {:>14.2}",
                row.period_index,
                row.date,
                row.price,
                row.shares_bought,
                row.cumulative_shares,
                row.cumulative_invested,
                row.portfolio_value
            );
        }
        Ok(out)
    }

    fn extension(&self) -> &str {
        "txt"
    }
}

/// Pretty-printed JSON
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonReportRenderer;

impl ReportRenderer for JsonReportRenderer {
    fn render(&self, report: &SimulationReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute;
    use crate::model::{PriceObservation, PriceSeries};
    use crate::schedule::resample_monthly;
    use crate::strategy::simulate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_report(instrument: &str) -> SimulationReport {
        let series = PriceSeries::new(vec![
            PriceObservation::new(date(2020, 1, 2), dec!(100)),
            PriceObservation::new(date(2020, 2, 3), dec!(200)),
        ]);
        let table = simulate(&resample_monthly(&series).unwrap(), dec!(500)).unwrap();
        let metrics = compute(&table, date(2020, 1, 2), date(2020, 3, 1)).unwrap();
        SimulationReport {
            run_id: Uuid::new_v4(),
            instrument: instrument.into(),
            entry_date: date(2020, 1, 2),
            end_date: date(2020, 3, 1),
            monthly_amount: dec!(500),
            attempts: 1,
            table,
            metrics,
        }
    }

    #[test]
    fn test_artifact_stem_sanitizes_dots() {
        let report = sample_report("BRK.B");
        assert_eq!(report.artifact_stem(), "BRK-B--2020-01-02--2020-03-01--USD");
    }

    #[test]
    fn test_chart_series() {
        let chart = sample_report("QQQ").chart_series();
        assert_eq!(chart.cumulative_invested.len(), 2);
        assert_eq!(chart.cumulative_invested[1].value, dec!(1000));
        assert_eq!(chart.portfolio_value[1].value, dec!(1500));
        assert_eq!(chart.portfolio_value[0].date, date(2020, 1, 2));
    }

    #[test]
    fn test_summary_lines() {
        let summary = sample_report("QQQ").summary();
        assert!(summary.contains("Entry date: 2020-01-02"));
        assert!(summary.contains("Total invested: $1000.00"));
        assert!(summary.contains("Market value: $1500.00"));
        assert!(summary.contains("Total return: 50.00%"));
    }

    #[test]
    fn test_text_renderer_table() {
        let report = sample_report("QQQ");
        let text = TextReportRenderer { include_table: true }.render(&report).unwrap();
        assert!(text.contains("Period"));
        assert_eq!(text.lines().filter(|l| l.contains("2020-02-03")).count(), 1);
    }

    #[test]
    fn test_json_renderer_roundtrip() {
        let report = sample_report("QQQ");
        let json = JsonReportRenderer.render(&report).unwrap();
        let parsed: SimulationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.table, report.table);
    }
}

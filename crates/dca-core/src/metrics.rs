//! Return Metrics
//!
//! Total and annualized return from the last row of a simulation table.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use crate::error::{Result, SimulationError};
use crate::model::{Metrics, SimulationTable};

/// Day-count denominator for annualization. Kept at 365 (not 365.25)
/// so figures match the historical reports.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Compute summary metrics for `table` held from `entry_date` to `end_date`
pub fn compute(table: &SimulationTable, entry_date: NaiveDate, end_date: NaiveDate) -> Result<Metrics> {
    let last = table.last().ok_or(SimulationError::EmptyTable)?;

    let total_cost = last.cumulative_invested;
    let final_value = last.portfolio_value;
    if total_cost == Decimal::ZERO {
        return Err(SimulationError::ZeroCost);
    }

    let overflow = |detail: &str| SimulationError::ArithmeticOverflow {
        stage: "metrics",
        detail: detail.into(),
    };
    let total_return_pct = final_value
        .checked_sub(total_cost)
        .and_then(|gain| gain.checked_div(total_cost))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| overflow("total return"))?;

    let elapsed_days = (end_date - entry_date).num_days();
    if elapsed_days == 0 {
        return Err(SimulationError::ZeroHorizon);
    }
    if elapsed_days < 0 {
        return Err(SimulationError::UndefinedAnnualization(format!(
            "end date {end_date} is before entry date {entry_date}"
        )));
    }
    let elapsed_years = elapsed_days as f64 / DAYS_PER_YEAR;

    let growth = final_value
        .checked_div(total_cost)
        .ok_or_else(|| overflow("value/cost ratio"))?
        .to_f64()
        .ok_or_else(|| {
            SimulationError::UndefinedAnnualization("value/cost ratio is not representable".into())
        })?;
    if growth < 0.0 {
        return Err(SimulationError::UndefinedAnnualization(format!(
            "negative value/cost ratio {growth}"
        )));
    }

    let annualized_return_pct = (growth.powf(1.0 / elapsed_years) - 1.0) * 100.0;
    if !annualized_return_pct.is_finite() {
        return Err(SimulationError::UndefinedAnnualization(format!(
            "growth {growth} over {elapsed_years:.4} years overflows"
        )));
    }

    tracing::debug!(
        %final_value,
        %total_cost,
        %total_return_pct,
        elapsed_days,
        annualized_return_pct,
        "computed metrics"
    );

    Ok(Metrics {
        final_value,
        total_cost,
        total_return_pct,
        elapsed_days,
        elapsed_years,
        annualized_return_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PriceObservation, PriceSeries, SimulationRow};
    use crate::schedule::resample_monthly;
    use crate::strategy::simulate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_month_table() -> SimulationTable {
        let series = PriceSeries::new(vec![
            PriceObservation::new(date(2020, 1, 1), dec!(100)),
            PriceObservation::new(date(2020, 2, 1), dec!(200)),
        ]);
        simulate(&resample_monthly(&series).unwrap(), dec!(500)).unwrap()
    }

    #[test]
    fn test_two_month_metrics() {
        let metrics = compute(&two_month_table(), date(2020, 1, 1), date(2020, 3, 1)).unwrap();

        assert_eq!(metrics.total_cost, dec!(1000));
        assert_eq!(metrics.final_value, dec!(1500));
        assert_eq!(metrics.total_return_pct, dec!(50));
        // 2020 is a leap year: 31 + 29 days
        assert_eq!(metrics.elapsed_days, 60);
        assert!((metrics.elapsed_years - 60.0 / 365.0).abs() < 1e-12);

        let expected = (1.5_f64.powf(365.0 / 60.0) - 1.0) * 100.0;
        assert!((metrics.annualized_return_pct - expected).abs() < 1e-9);
        assert!(metrics.annualized_return_pct > 1000.0);
    }

    #[test]
    fn test_flat_prices_annualize_to_zero() {
        let series = PriceSeries::new(vec![
            PriceObservation::new(date(2020, 1, 2), dec!(50)),
            PriceObservation::new(date(2020, 2, 3), dec!(50)),
            PriceObservation::new(date(2020, 3, 2), dec!(50)),
        ]);
        let table = simulate(&resample_monthly(&series).unwrap(), dec!(500)).unwrap();
        let metrics = compute(&table, date(2020, 1, 2), date(2021, 1, 1)).unwrap();
        assert_eq!(metrics.total_return_pct, Decimal::ZERO);
        assert!(metrics.annualized_return_pct.abs() < 1e-12);
    }

    #[test]
    fn test_single_row_table() {
        let series = PriceSeries::new(vec![PriceObservation::new(date(2020, 1, 2), dec!(80))]);
        let table = simulate(&resample_monthly(&series).unwrap(), dec!(500)).unwrap();
        let metrics = compute(&table, date(2020, 1, 2), date(2020, 7, 1)).unwrap();
        assert_eq!(metrics.total_return_pct, Decimal::ZERO);
    }

    #[test]
    fn test_empty_table() {
        let result = compute(&SimulationTable::default(), date(2020, 1, 1), date(2021, 1, 1));
        assert!(matches!(result, Err(SimulationError::EmptyTable)));
    }

    #[test]
    fn test_zero_horizon() {
        let result = compute(&two_month_table(), date(2020, 3, 1), date(2020, 3, 1));
        assert!(matches!(result, Err(SimulationError::ZeroHorizon)));
    }

    #[test]
    fn test_negative_horizon() {
        let result = compute(&two_month_table(), date(2020, 3, 2), date(2020, 3, 1));
        assert!(matches!(result, Err(SimulationError::UndefinedAnnualization(_))));
    }

    fn one_row_table(invested: Decimal, value: Decimal) -> SimulationTable {
        SimulationTable::from_rows(vec![SimulationRow {
            period_index: 1,
            date: date(2020, 1, 1),
            price: value,
            shares_bought: Decimal::ONE,
            cumulative_shares: Decimal::ONE,
            cumulative_invested: invested,
            portfolio_value: value,
        }])
    }

    #[test]
    fn test_one_day_tenfold_growth_is_undefined() {
        // 10^365 is beyond f64
        let table = one_row_table(dec!(100), dec!(1000));
        let result = compute(&table, date(2020, 1, 1), date(2020, 1, 2));
        match result {
            Err(SimulationError::UndefinedAnnualization(reason)) => assert!(reason.contains("overflows")),
            other => panic!("expected UndefinedAnnualization, got {other:?}"),
        }
    }

    #[test]
    fn test_total_return_overflow() {
        let table = one_row_table(dec!(0.0000000000000000000000000001), Decimal::MAX);
        let result = compute(&table, date(2020, 1, 1), date(2021, 1, 1));
        assert!(matches!(
            result,
            Err(SimulationError::ArithmeticOverflow { stage: "metrics", .. })
        ));
    }

    #[test]
    fn test_zero_cost() {
        let table = SimulationTable::from_rows(vec![SimulationRow {
            period_index: 1,
            date: date(2020, 1, 1),
            price: dec!(10),
            shares_bought: Decimal::ZERO,
            cumulative_shares: Decimal::ZERO,
            cumulative_invested: Decimal::ZERO,
            portfolio_value: Decimal::ZERO,
        }]);
        let result = compute(&table, date(2020, 1, 1), date(2021, 1, 1));
        assert!(matches!(result, Err(SimulationError::ZeroCost)));
    }
}

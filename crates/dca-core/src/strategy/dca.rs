//! Dollar-Cost Averaging Simulator
//!
//! Buys a fixed amount at every scheduled price and tracks the position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::{MonthlySchedule, SimulationRow, SimulationTable};

/// Fixed contribution per period
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DCASimulator {
    /// Amount invested every period
    pub contribution: Decimal,
}

impl DCASimulator {
    pub fn new(contribution: Decimal) -> Result<Self> {
        if contribution <= Decimal::ZERO {
            return Err(SimulationError::InvalidContribution(contribution));
        }
        Ok(Self { contribution })
    }

    /// Run the plan over `schedule`
    ///
    /// Single forward pass; each row depends only on the previous
    /// cumulative share count and the current price.
    pub fn simulate(&self, schedule: &MonthlySchedule) -> Result<SimulationTable> {
        if self.contribution <= Decimal::ZERO {
            return Err(SimulationError::InvalidContribution(self.contribution));
        }
        if schedule.is_empty() {
            return Err(SimulationError::EmptySchedule);
        }

        let mut rows = Vec::with_capacity(schedule.len());
        let mut cumulative_shares = Decimal::ZERO;

        for (period_index, entry) in (1u32..).zip(schedule.entries()) {
            if entry.price <= Decimal::ZERO {
                return Err(SimulationError::ZeroPrice {
                    date: entry.date,
                    price: entry.price,
                });
            }

            let overflow = |detail: &str| SimulationError::ArithmeticOverflow {
                stage: "simulator",
                detail: format!("{detail} for period {period_index} ({})", entry.date),
            };

            let shares_bought = self
                .contribution
                .checked_div(entry.price)
                .ok_or_else(|| overflow("shares bought"))?;
            cumulative_shares = cumulative_shares
                .checked_add(shares_bought)
                .ok_or_else(|| overflow("cumulative shares"))?;
            let cumulative_invested = self
                .contribution
                .checked_mul(Decimal::from(period_index))
                .ok_or_else(|| overflow("cumulative invested"))?;
            let portfolio_value = cumulative_shares
                .checked_mul(entry.price)
                .ok_or_else(|| overflow("portfolio value"))?;

            rows.push(SimulationRow {
                period_index,
                date: entry.date,
                price: entry.price,
                shares_bought,
                cumulative_shares,
                cumulative_invested,
                portfolio_value,
            });
        }

        tracing::debug!(periods = rows.len(), contribution = %self.contribution, "simulated DCA plan");
        Ok(SimulationTable::from_rows(rows))
    }
}

/// Simulate `contribution` per period over `schedule`
pub fn simulate(schedule: &MonthlySchedule, contribution: Decimal) -> Result<SimulationTable> {
    DCASimulator::new(contribution)?.simulate(schedule)
}

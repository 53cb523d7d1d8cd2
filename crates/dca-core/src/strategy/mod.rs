//! Investment Strategies
//!
//! Fixed-amount periodic buying over a monthly schedule.

mod dca;

pub use dca::{DCASimulator, simulate};

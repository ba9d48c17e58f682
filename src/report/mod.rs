//! Reporting utilities: fleet rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::TcoBreakdown;

/// Cheapest/priciest rankings by levelized EUR/km (top-N each side).
#[derive(Debug, Clone)]
pub struct Rankings {
    pub cheapest: Vec<TcoBreakdown>,
    pub priciest: Vec<TcoBreakdown>,
}

/// Rank fleet results by unit cost.
pub fn rank_by_unit_cost(breakdowns: &[TcoBreakdown], top_n: usize) -> Rankings {
    let mut sorted = breakdowns.to_vec();
    sorted.sort_by(|a, b| {
        a.eur_per_km
            .partial_cmp(&b.eur_per_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cheapest = sorted.iter().take(top_n).cloned().collect();
    let priciest = sorted.iter().rev().take(top_n).cloned().collect();

    Rankings { cheapest, priciest }
}

//! Summary rollup DTOs

use domain_debt::SummaryTotals;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub billed: String,
    pub pending: String,
    pub collected: String,
    pub defaulted: String,
}

impl From<SummaryTotals> for SummaryResponse {
    fn from(totals: SummaryTotals) -> Self {
        Self {
            billed: totals.billed.to_string(),
            pending: totals.pending.to_string(),
            collected: totals.collected.to_string(),
            defaulted: totals.defaulted.to_string(),
        }
    }
}

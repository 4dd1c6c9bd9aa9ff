//! Inflow/outflow aggregation over a normalized transaction list.

use shared::{AggregateStats, Transaction, TransactionKind};

/// Derives summary totals from the current transaction list. Stateless; the
/// totals are a pure function of the list and are recomputed on every sync
/// rather than maintained incrementally.
#[derive(Clone)]
pub struct StatsService;

impl StatsService {
    pub fn new() -> Self {
        Self
    }

    /// Sum received amounts into `total_in` and sent amounts into
    /// `total_out`. An empty list yields zero totals.
    pub fn compute(&self, transactions: &[Transaction]) -> AggregateStats {
        let mut stats = AggregateStats {
            total_in: 0.0,
            total_out: 0.0,
        };
        for tx in transactions {
            match tx.kind {
                TransactionKind::Received => stats.total_in += tx.amount,
                TransactionKind::Sent => stats.total_out += tx.amount,
            }
        }
        stats
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new()
    }
}

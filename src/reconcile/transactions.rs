use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::model::Transaction;
use crate::types::{Currency, Direction, TransactionStatus};

/// fold deposits and withdrawals into one display list, newest first.
///
/// records without a timestamp sort after everything dated; relative order
/// within each input is otherwise kept stable.
pub fn merge_transactions(
    deposits: Vec<Transaction>,
    withdrawals: Vec<Transaction>,
) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = deposits.into_iter().chain(withdrawals).collect();
    merged.sort_by(|a, b| match (b.created_at, a.created_at) {
        (Some(b_at), Some(a_at)) => b_at.cmp(&a_at),
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (None, None) => std::cmp::Ordering::Equal,
    });
    merged
}

/// history view filter; every `None` field means "no restriction"
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub direction: Option<Direction>,
    pub currency: Option<Currency>,
    pub status: Option<TransactionStatus>,
    /// only entries newer than this many days
    pub window_days: Option<u32>,
    /// case-insensitive match against hash, wallets and amount
    pub query: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction, now: DateTime<Utc>) -> bool {
        if self.direction.is_some_and(|d| tx.direction != d) {
            return false;
        }
        if self.currency.is_some_and(|c| tx.currency != c) {
            return false;
        }
        if self.status.is_some_and(|s| tx.status != s) {
            return false;
        }
        if let Some(days) = self.window_days {
            let cutoff = now - Duration::days(days as i64);
            // undated entries fail a dated window
            if !tx.created_at.is_some_and(|at| at >= cutoff) {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let needle = query.trim().to_lowercase();
            if !needle.is_empty() {
                let hit = [
                    tx.tx_hash.as_deref(),
                    tx.from_wallet.as_deref(),
                    tx.to_wallet.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
                    || tx.amount.to_string().contains(&needle);
                if !hit {
                    return false;
                }
            }
        }
        true
    }

    pub fn apply(&self, transactions: &[Transaction], now: DateTime<Utc>) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| self.matches(tx, now))
            .cloned()
            .collect()
    }
}

/// headline figures for the history view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_credited_sol: Money,
    pub total_credited_usdc: Money,
    pub total_debited_sol: Money,
    pub total_debited_usdc: Money,
    pub settling_count: usize,
    pub failed_count: usize,
}

impl TransactionSummary {
    /// totals only count settled entries; pending and failed ones are
    /// counted, not summed
    pub fn compute(transactions: &[Transaction]) -> Self {
        let mut summary = Self::default();
        for tx in transactions {
            match tx.status {
                TransactionStatus::Confirmed => {
                    let bucket = match (tx.direction, tx.currency) {
                        (Direction::Credit, Currency::Sol) => &mut summary.total_credited_sol,
                        (Direction::Credit, Currency::Usdc) => &mut summary.total_credited_usdc,
                        (Direction::Debit, Currency::Sol) => &mut summary.total_debited_sol,
                        (Direction::Debit, Currency::Usdc) => &mut summary.total_debited_usdc,
                    };
                    *bucket += tx.amount;
                }
                TransactionStatus::Pending | TransactionStatus::Processing => {
                    summary.settling_count += 1;
                }
                TransactionStatus::Failed | TransactionStatus::Rejected => {
                    summary.failed_count += 1;
                }
                TransactionStatus::Unknown => {}
            }
        }
        summary
    }
}

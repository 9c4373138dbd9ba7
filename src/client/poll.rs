use serde_json::Value;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::diagnostics::DiagnosticLog;
use crate::model::{Transaction, WalletBalance};
use crate::types::{RecordId, ResourceKind};

use super::{decode_records, endpoints, ApiClient, Transport};

/// cancellation handle owned by the consuming view; the poll stops on
/// `cancel()` and also when the handle is dropped at teardown
pub struct PollHandle {
    stop: watch::Sender<bool>,
}

impl PollHandle {
    pub fn cancel(&self) {
        let _ = self.stop.send(true);
    }
}

pub type CancelToken = watch::Receiver<bool>;

/// create a linked cancellation handle/token pair
pub fn cancellation_pair() -> (PollHandle, CancelToken) {
    let (stop, token) = watch::channel(false);
    (PollHandle { stop }, token)
}

/// one refresh pass over the deposit being watched
#[derive(Debug)]
pub struct DepositRefresh {
    /// the watched deposit, when it could be fetched and decoded
    pub deposit: Option<Transaction>,
    pub balance: WalletBalance,
    pub recent_deposits: Vec<Transaction>,
}

impl<T: Transport> ApiClient<T> {
    /// re-fetch the watched deposit together with the balance and recent
    /// deposit list. idempotent: it only re-fetches and re-normalizes, so
    /// overlapping runs cannot double-count anything. individual failures
    /// degrade and the next tick retries.
    pub async fn refresh_pending_deposit(&self, deposit_id: &RecordId) -> DepositRefresh {
        let detail_path = endpoints::deposit_detail(deposit_id);
        let (detail_r, balance_r, recent_r) = tokio::join!(
            self.get_with_deadline(&detail_path),
            self.get_with_deadline(endpoints::BALANCE),
            self.get_with_deadline(endpoints::DEPOSITS),
        );

        let deposit = detail_r
            .ok()
            .as_ref()
            .and_then(Transaction::from_deposit);
        let balance = balance_r
            .map(|value| WalletBalance::from_value(&value))
            .unwrap_or_default();

        let mut diagnostics = DiagnosticLog::new();
        let recent_values: Vec<Value> =
            self.degrade(recent_r, ResourceKind::Deposits, &mut diagnostics);
        let recent_deposits = decode_records(
            &recent_values,
            ResourceKind::Deposits,
            Transaction::from_deposit,
            &mut diagnostics,
        );

        DepositRefresh {
            deposit,
            balance,
            recent_deposits,
        }
    }

    /// watch a pending deposit until it settles or the token cancels.
    ///
    /// runs a fixed-interval re-check (first pass immediately, then every
    /// `EngineConfig::poll_interval`); resolves with the final refresh once
    /// the deposit leaves its settling states, or `None` on cancellation.
    pub async fn watch_pending_deposit(
        &self,
        deposit_id: &RecordId,
        mut cancel: CancelToken,
    ) -> Option<DepositRefresh> {
        if *cancel.borrow() {
            return None;
        }

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let refresh = self.refresh_pending_deposit(deposit_id).await;
                    let settled = refresh
                        .deposit
                        .as_ref()
                        .is_some_and(|tx| !tx.status.is_settling());
                    if settled {
                        debug!(%deposit_id, "watched deposit settled");
                        return Some(refresh);
                    }
                }
                changed = cancel.changed() => {
                    // a send of `true` or a dropped handle both stop the poll
                    if changed.is_err() || *cancel.borrow() {
                        debug!(%deposit_id, "deposit watch cancelled");
                        return None;
                    }
                }
            }
        }
    }
}

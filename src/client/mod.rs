pub mod endpoints;
pub mod poll;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::errors::{EngineError, Result, TransportError};
use crate::model::{
    LoanApplication, LoanProduct, PaymentOutcome, RepaymentRecord, Transaction, WalletBalance,
};
use crate::normalize::{normalize, normalize_or_empty};
use crate::reconcile::{merge_transactions, reconcile, EnrichedRepayment};
use crate::types::{RecordId, ResourceKind};
use crate::view::{build_loan_views, CanonicalLoanView};

pub use endpoints::RepaymentScope;
pub use poll::{cancellation_pair, CancelToken, DepositRefresh, PollHandle};

/// transport boundary. the engine never talks http itself; the embedding
/// application supplies something that can resolve a relative path into
/// json (attaching its own base url and bearer token), and tests supply an
/// in-memory fake.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get_json(&self, path: &str) -> std::result::Result<Value, TransportError>;

    async fn post_json(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> std::result::Result<Value, TransportError>;
}

/// everything a borrower view needs, derived in one pass over one batch of
/// fetches; discarded and rebuilt when inputs change
#[derive(Debug)]
pub struct BorrowerSnapshot {
    pub loans: Vec<CanonicalLoanView>,
    pub repayments: Vec<EnrichedRepayment>,
    pub transactions: Vec<Transaction>,
    pub balance: WalletBalance,
    pub fetched_at: DateTime<Utc>,
    /// degradations encountered while assembling the snapshot
    pub diagnostics: Vec<Diagnostic>,
}

/// api client over an injected transport
pub struct ApiClient<T> {
    transport: T,
    config: EngineConfig,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: EngineConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// get with the configured deadline; a slow upstream becomes a timeout
    /// error instead of an indefinitely hanging batch
    async fn get_with_deadline(&self, path: &str) -> std::result::Result<Value, TransportError> {
        match tokio::time::timeout(self.config.request_timeout, self.transport.get_json(path)).await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                seconds: self.config.request_timeout.as_secs(),
            }),
        }
    }

    /// fetch and normalize one collection, failing hard; the degrading
    /// variant used by the snapshot lives in `degrade`
    async fn collection(&self, resource: ResourceKind, path: &str) -> Result<Vec<Value>> {
        let value = self
            .get_with_deadline(path)
            .await
            .map_err(|source| EngineError::Transport { resource, source })?;
        normalize(value, resource)
    }

    /// degrade a fetch result to records-or-empty; transport and shape
    /// failures are logged and flagged, never raised
    fn degrade(
        &self,
        result: std::result::Result<Value, TransportError>,
        resource: ResourceKind,
        diagnostics: &mut DiagnosticLog,
    ) -> Vec<Value> {
        match result {
            Ok(value) => normalize_or_empty(value, resource, diagnostics),
            Err(source) => {
                warn!(%resource, error = %source, "fetch failed, degrading to empty");
                diagnostics.emit(Diagnostic::TransportDegraded {
                    resource,
                    message: source.to_string(),
                });
                Vec::new()
            }
        }
    }

    pub async fn loan_products(&self) -> Result<Vec<LoanProduct>> {
        let values = self
            .collection(ResourceKind::Products, endpoints::LOAN_PRODUCTS)
            .await?;
        let mut diagnostics = DiagnosticLog::new();
        Ok(decode_records(
            &values,
            ResourceKind::Products,
            LoanProduct::from_value,
            &mut diagnostics,
        ))
    }

    pub async fn loan_applications(&self) -> Result<Vec<LoanApplication>> {
        let values = self
            .collection(ResourceKind::Applications, endpoints::LOAN_APPLICATIONS)
            .await?;
        let mut diagnostics = DiagnosticLog::new();
        Ok(decode_records(
            &values,
            ResourceKind::Applications,
            LoanApplication::from_value,
            &mut diagnostics,
        ))
    }

    pub async fn repayments(&self, scope: RepaymentScope) -> Result<Vec<RepaymentRecord>> {
        let values = self
            .collection(ResourceKind::Repayments, scope.path())
            .await?;
        let mut diagnostics = DiagnosticLog::new();
        Ok(decode_records(
            &values,
            ResourceKind::Repayments,
            RepaymentRecord::from_value,
            &mut diagnostics,
        ))
    }

    pub async fn deposits(&self) -> Result<Vec<Transaction>> {
        let values = self
            .collection(ResourceKind::Deposits, endpoints::DEPOSITS)
            .await?;
        let mut diagnostics = DiagnosticLog::new();
        Ok(decode_records(
            &values,
            ResourceKind::Deposits,
            Transaction::from_deposit,
            &mut diagnostics,
        ))
    }

    pub async fn withdrawals(&self) -> Result<Vec<Transaction>> {
        let values = self
            .collection(ResourceKind::Withdrawals, endpoints::WITHDRAWALS)
            .await?;
        let mut diagnostics = DiagnosticLog::new();
        Ok(decode_records(
            &values,
            ResourceKind::Withdrawals,
            Transaction::from_withdrawal,
            &mut diagnostics,
        ))
    }

    pub async fn balance(&self) -> Result<WalletBalance> {
        let value = self
            .get_with_deadline(endpoints::BALANCE)
            .await
            .map_err(|source| EngineError::Transport {
                resource: ResourceKind::Balance,
                source,
            })?;
        Ok(WalletBalance::from_value(&value))
    }

    /// presentation passthroughs; these share the transport and deadline
    /// handling but the engine attaches no meaning to their payloads
    pub async fn wallet(&self) -> Result<Value> {
        self.get_with_deadline(endpoints::WALLET)
            .await
            .map_err(|source| EngineError::Transport {
                resource: ResourceKind::Wallet,
                source,
            })
    }

    pub async fn credit_score(&self) -> Result<Value> {
        self.get_with_deadline(endpoints::CREDIT_SCORE)
            .await
            .map_err(|source| EngineError::Transport {
                resource: ResourceKind::CreditScore,
                source,
            })
    }

    pub async fn credit_score_factors(&self) -> Result<Vec<Value>> {
        self.collection(
            ResourceKind::CreditScoreFactors,
            endpoints::CREDIT_SCORE_FACTORS,
        )
        .await
    }

    pub async fn recalculate_credit_score(&self) -> Result<Value> {
        match tokio::time::timeout(
            self.config.request_timeout,
            self.transport
                .post_json(endpoints::CREDIT_SCORE_RECALCULATE, None),
        )
        .await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(EngineError::Transport {
                resource: ResourceKind::CreditScore,
                source,
            }),
            Err(_) => Err(EngineError::Transport {
                resource: ResourceKind::CreditScore,
                source: TransportError::Timeout {
                    seconds: self.config.request_timeout.as_secs(),
                },
            }),
        }
    }

    /// pay a repayment. `amount` requests a partial payment; `None` asks
    /// the backend to settle the full remaining amount, which is also how
    /// full-payment-only flows behave.
    pub async fn pay_repayment(
        &self,
        id: &RecordId,
        amount: Option<Money>,
    ) -> Result<PaymentOutcome> {
        let body = amount.map(|a| json!({ "amount": a.as_decimal() }));
        let path = endpoints::repayment_pay(id);

        let result = match tokio::time::timeout(
            self.config.request_timeout,
            self.transport.post_json(&path, body),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                seconds: self.config.request_timeout.as_secs(),
            }),
        };

        match result {
            Ok(value) => Ok(PaymentOutcome::from_value(&value)),
            Err(TransportError::Status { code }) if (400..500).contains(&code) => {
                Err(EngineError::PaymentRejected {
                    message: format!("payment endpoint returned status {code}"),
                })
            }
            Err(source) => Err(EngineError::Transport {
                resource: ResourceKind::Repayments,
                source,
            }),
        }
    }

    /// the full pipeline: one concurrent fetch batch, settle-all, then
    /// normalize -> decode -> classify -> quote -> reconcile -> estimate.
    ///
    /// a failure in any single fetch degrades that one resource to empty
    /// and never blocks the others from being used.
    pub async fn fetch_borrower_snapshot(&self, time: &SafeTimeProvider) -> BorrowerSnapshot {
        let mut diagnostics = DiagnosticLog::new();

        let (products_r, applications_r, repayments_r, deposits_r, withdrawals_r, balance_r) = tokio::join!(
            self.get_with_deadline(endpoints::LOAN_PRODUCTS),
            self.get_with_deadline(endpoints::LOAN_APPLICATIONS),
            self.get_with_deadline(endpoints::REPAYMENTS),
            self.get_with_deadline(endpoints::DEPOSITS),
            self.get_with_deadline(endpoints::WITHDRAWALS),
            self.get_with_deadline(endpoints::BALANCE),
        );

        let products_values = self.degrade(products_r, ResourceKind::Products, &mut diagnostics);
        let applications_values =
            self.degrade(applications_r, ResourceKind::Applications, &mut diagnostics);
        let repayments_values =
            self.degrade(repayments_r, ResourceKind::Repayments, &mut diagnostics);
        let deposits_values = self.degrade(deposits_r, ResourceKind::Deposits, &mut diagnostics);
        let withdrawals_values =
            self.degrade(withdrawals_r, ResourceKind::Withdrawals, &mut diagnostics);

        let products = decode_records(
            &products_values,
            ResourceKind::Products,
            LoanProduct::from_value,
            &mut diagnostics,
        );
        let applications = decode_records(
            &applications_values,
            ResourceKind::Applications,
            LoanApplication::from_value,
            &mut diagnostics,
        );
        let repayment_records = decode_records(
            &repayments_values,
            ResourceKind::Repayments,
            RepaymentRecord::from_value,
            &mut diagnostics,
        );
        let deposits = decode_records(
            &deposits_values,
            ResourceKind::Deposits,
            Transaction::from_deposit,
            &mut diagnostics,
        );
        let withdrawals = decode_records(
            &withdrawals_values,
            ResourceKind::Withdrawals,
            Transaction::from_withdrawal,
            &mut diagnostics,
        );

        let balance = match balance_r {
            Ok(value) => WalletBalance::from_value(&value),
            Err(source) => {
                warn!(error = %source, "balance fetch failed, degrading to empty");
                diagnostics.emit(Diagnostic::TransportDegraded {
                    resource: ResourceKind::Balance,
                    message: source.to_string(),
                });
                WalletBalance::default()
            }
        };

        let now = time.now();
        let repayments = reconcile(repayment_records, &applications, &mut diagnostics);
        let loans = build_loan_views(applications, &products, &self.config, now);
        let transactions = merge_transactions(deposits, withdrawals);

        debug!(
            loans = loans.len(),
            repayments = repayments.len(),
            transactions = transactions.len(),
            degraded = diagnostics.entries().len(),
            "borrower snapshot assembled"
        );

        BorrowerSnapshot {
            loans,
            repayments,
            transactions,
            balance,
            fetched_at: now,
            diagnostics: diagnostics.take_entries(),
        }
    }
}

/// decode each record, skipping (and flagging) the ones missing required
/// fields rather than failing the whole collection
fn decode_records<R>(
    values: &[Value],
    resource: ResourceKind,
    decode: impl Fn(&Value) -> Option<R>,
    diagnostics: &mut DiagnosticLog,
) -> Vec<R> {
    values
        .iter()
        .filter_map(|value| {
            let decoded = decode(value);
            if decoded.is_none() {
                warn!(%resource, "record missing required fields, skipped");
                diagnostics.emit(Diagnostic::RecordSkipped {
                    resource,
                    message: "missing required fields".to_string(),
                });
            }
            decoded
        })
        .collect()
}

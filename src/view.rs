use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{quote, resolve_rate, LoanQuote};
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::model::{LoanApplication, LoanProduct};
use crate::schedule;
use crate::types::CanonicalStatus;

/// a loan application enriched with everything the borrower-facing views
/// need. derived fresh on every reconciliation pass and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLoanView {
    pub application: LoanApplication,
    /// resolved product reference data, when the weak reference resolved
    pub product: Option<LoanProduct>,
    /// installment breakdown; `None` when the inputs cannot produce one
    pub quote: Option<LoanQuote>,
    pub is_disbursed: bool,
    /// days left in the term; absent until the repayment clock runs
    pub remaining_days: Option<u32>,
    /// elapsed share of the term in percent; absent until the clock runs
    pub progress_percent: Option<Decimal>,
}

/// assemble the canonical view for each application.
///
/// remaining days and progress are computed only for counting statuses;
/// for an approved-but-undisbursed loan they are absent, not zero, because
/// the repayment clock has not started.
pub fn build_loan_views(
    applications: Vec<LoanApplication>,
    products: &[LoanProduct],
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Vec<CanonicalLoanView> {
    applications
        .into_iter()
        .map(|application| {
            let product = application.product_ref.as_ref().and_then(|wanted| {
                products.iter().find(|p| p.id.matches(wanted)).cloned()
            });

            let (rate, rate_source) = resolve_rate(product.as_ref(), config);
            let loan_quote = quote(
                application.amount,
                application.duration_days,
                rate,
                rate_source,
            );

            let counting = application.status.is_counting();
            let start = application.clock_start();
            let remaining_days = counting
                .then(|| schedule::remaining_days(start, application.duration_days, now));
            let progress_percent = counting
                .then(|| schedule::elapsed_progress(start, application.duration_days, now));

            CanonicalLoanView {
                is_disbursed: application.status == CanonicalStatus::Disbursed,
                product,
                quote: loan_quote,
                remaining_days,
                progress_percent,
                application,
            }
        })
        .collect()
}

/// dashboard headline figures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_loans: usize,
    /// disbursed and currently running
    pub active_loans: usize,
    /// applications still moving through review
    pub pending_loans: usize,
    pub total_borrowed: Money,
}

impl PortfolioSummary {
    pub fn compute(views: &[CanonicalLoanView]) -> Self {
        Self {
            total_loans: views.len(),
            active_loans: views.iter().filter(|v| v.is_disbursed).count(),
            pending_loans: views
                .iter()
                .filter(|v| v.application.status.is_pre_disbursal())
                .count(),
            total_borrowed: views
                .iter()
                .fold(Money::ZERO, |sum, v| sum + v.application.amount),
        }
    }
}

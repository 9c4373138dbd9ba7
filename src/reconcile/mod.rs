pub mod transactions;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::model::{LoanApplication, RepaymentRecord};
use crate::schedule;
use crate::types::{CanonicalStatus, RecordId};

pub use transactions::{merge_transactions, TransactionFilter, TransactionSummary};

/// a repayment joined to its owning loan application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRepayment {
    pub repayment: RepaymentRecord,
    /// id of the matched application, when one was found
    pub matched_loan: Option<RecordId>,
    /// status of the matched application; `Unknown` on a failed join
    pub loan_status: CanonicalStatus,
    pub is_disbursed: bool,
}

impl EnrichedRepayment {
    /// status used for display and tab filtering
    pub fn status(&self) -> CanonicalStatus {
        self.repayment.effective_status()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status() == CanonicalStatus::Overdue
            || schedule::is_overdue(self.repayment.due_date, self.repayment.paid_at, now)
    }
}

/// join repayments to loan applications.
///
/// the foreign key arrives in several shapes (collected per record in
/// decode priority order); each candidate is resolved against an id index
/// of the applications and the first hit wins. a repayment that matches
/// nothing is kept, with `Unknown` status and `is_disbursed = false`;
/// reconciliation failures degrade, they never drop data.
///
/// exactly one output per input repayment, order preserved.
pub fn reconcile(
    repayments: Vec<RepaymentRecord>,
    loans: &[LoanApplication],
    diagnostics: &mut DiagnosticLog,
) -> Vec<EnrichedRepayment> {
    let index: HashMap<String, &LoanApplication> = loans
        .iter()
        .map(|loan| (loan.id.canonical(), loan))
        .collect();

    repayments
        .into_iter()
        .map(|repayment| {
            if repayment.amount.is_positive() && repayment.amount_paid > repayment.amount {
                diagnostics.emit(Diagnostic::PaymentClamped {
                    repayment_id: repayment.id.clone(),
                    amount: repayment.amount,
                    amount_paid: repayment.amount_paid,
                });
            }

            let matched = repayment
                .loan_refs
                .iter()
                .find_map(|candidate| index.get(&candidate.canonical()).copied());

            match matched {
                Some(loan) => EnrichedRepayment {
                    matched_loan: Some(loan.id.clone()),
                    loan_status: loan.status,
                    is_disbursed: loan.status == CanonicalStatus::Disbursed,
                    repayment,
                },
                None => {
                    debug!(repayment_id = %repayment.id, "repayment matched no loan application");
                    diagnostics.emit(Diagnostic::ReferenceFailure {
                        repayment_id: repayment.id.clone(),
                    });
                    EnrichedRepayment {
                        matched_loan: None,
                        loan_status: CanonicalStatus::Unknown,
                        is_disbursed: false,
                        repayment,
                    }
                }
            }
        })
        .collect()
}

/// repayment list tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaymentTab {
    Upcoming,
    Overdue,
    All,
}

impl RepaymentTab {
    /// tab membership: upcoming is pending-and-not-yet-late, overdue is
    /// anything past due and unpaid, all is everything
    pub fn matches(&self, enriched: &EnrichedRepayment, now: DateTime<Utc>) -> bool {
        match self {
            RepaymentTab::Upcoming => {
                matches!(
                    enriched.status(),
                    CanonicalStatus::Pending | CanonicalStatus::Partial
                ) && !enriched.is_overdue(now)
            }
            RepaymentTab::Overdue => enriched.is_overdue(now),
            RepaymentTab::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use serde_json::json;

    fn loan(id: i64, status: &str) -> LoanApplication {
        LoanApplication::from_value(&json!({
            "id": id,
            "amount": "1000.00",
            "duration_days": 90,
            "status": status
        }))
        .unwrap()
    }

    fn repayment(id: i64, loan_ref: serde_json::Value) -> RepaymentRecord {
        RepaymentRecord::from_value(&json!({
            "id": id,
            "amount": "250.00",
            "loan": loan_ref
        }))
        .unwrap()
    }

    #[test]
    fn test_joins_by_nested_application_id() {
        let loans = vec![loan(21, "disbursed"), loan(22, "approved")];
        let repayments = vec![
            repayment(1, json!({"application": {"id": 21}})),
            repayment(2, json!({"application": {"id": 22}})),
        ];
        let mut diagnostics = DiagnosticLog::new();

        let enriched = reconcile(repayments, &loans, &mut diagnostics);

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].matched_loan, Some(RecordId::Num(21)));
        assert_eq!(enriched[0].loan_status, CanonicalStatus::Disbursed);
        assert!(enriched[0].is_disbursed);
        assert_eq!(enriched[1].loan_status, CanonicalStatus::Approved);
        assert!(!enriched[1].is_disbursed);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_deep_nesting_and_direct_id() {
        let loans = vec![loan(33, "disbursed")];
        let deep = repayment(1, json!({"loan": {"application": {"id": 33}}}));
        let direct = repayment(2, json!(33));
        let mut diagnostics = DiagnosticLog::new();

        let enriched = reconcile(vec![deep, direct], &loans, &mut diagnostics);
        assert!(enriched.iter().all(|e| e.is_disbursed));
    }

    #[test]
    fn test_string_and_numeric_ids_join() {
        let loans = vec![loan(5, "disbursed")];
        let r = RepaymentRecord::from_value(&json!({
            "id": 1, "amount": "10.00", "loan": "5"
        }))
        .unwrap();
        let mut diagnostics = DiagnosticLog::new();

        let enriched = reconcile(vec![r], &loans, &mut diagnostics);
        assert_eq!(enriched[0].matched_loan, Some(RecordId::Num(5)));
    }

    #[test]
    fn test_unmatched_degrades_to_unknown_and_is_kept() {
        let loans = vec![loan(21, "disbursed")];
        let repayments = vec![
            repayment(1, json!({"application": {"id": 99}})),
            RepaymentRecord::from_value(&json!({"id": 2, "amount": "10.00"})).unwrap(),
        ];
        let mut diagnostics = DiagnosticLog::new();

        let enriched = reconcile(repayments, &loans, &mut diagnostics);

        assert_eq!(enriched.len(), 2);
        for e in &enriched {
            assert_eq!(e.loan_status, CanonicalStatus::Unknown);
            assert!(!e.is_disbursed);
            assert!(e.matched_loan.is_none());
        }
        assert_eq!(diagnostics.entries().len(), 2);
    }

    #[test]
    fn test_completeness_with_no_loans() {
        let repayments = vec![
            repayment(1, json!({"application": {"id": 1}})),
            repayment(2, json!({"application": {"id": 2}})),
            repayment(3, json!({"application": {"id": 3}})),
        ];
        let mut diagnostics = DiagnosticLog::new();

        let enriched = reconcile(repayments, &[], &mut diagnostics);
        assert_eq!(enriched.len(), 3);
        assert!(enriched
            .iter()
            .all(|e| e.loan_status == CanonicalStatus::Unknown));
    }

    #[test]
    fn test_overpaid_record_is_flagged_not_dropped() {
        let loans = vec![loan(1, "disbursed")];
        let overpaid = RepaymentRecord::from_value(&json!({
            "id": 9, "amount": "100.00", "amount_paid": "120.00",
            "loan": {"application": {"id": 1}}
        }))
        .unwrap();
        let mut diagnostics = DiagnosticLog::new();

        let enriched = reconcile(vec![overpaid], &loans, &mut diagnostics);

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].status(), CanonicalStatus::Paid);
        assert!(matches!(
            diagnostics.entries()[0],
            Diagnostic::PaymentClamped { .. }
        ));
    }

    #[test]
    fn test_order_preserved() {
        let loans = vec![loan(1, "disbursed"), loan(2, "approved")];
        let repayments = vec![
            repayment(10, json!({"application": {"id": 2}})),
            repayment(11, json!({"application": {"id": 1}})),
            repayment(12, json!({"application": {"id": 404}})),
        ];
        let mut diagnostics = DiagnosticLog::new();

        let enriched = reconcile(repayments, &loans, &mut diagnostics);
        let ids: Vec<_> = enriched.iter().map(|e| e.repayment.id.clone()).collect();
        assert_eq!(
            ids,
            vec![RecordId::Num(10), RecordId::Num(11), RecordId::Num(12)]
        );
    }

    #[test]
    fn test_tab_filters() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap(),
        ));
        let now = time.now();
        let loans = vec![loan(1, "disbursed")];

        let upcoming = RepaymentRecord::from_value(&json!({
            "id": 1, "amount": "100.00", "due_date": "2026-03-20T00:00:00Z",
            "loan": {"application": {"id": 1}}
        }))
        .unwrap();
        let late = RepaymentRecord::from_value(&json!({
            "id": 2, "amount": "100.00", "due_date": "2026-03-10T00:00:00Z",
            "loan": {"application": {"id": 1}}
        }))
        .unwrap();
        let settled = RepaymentRecord::from_value(&json!({
            "id": 3, "amount": "100.00", "due_date": "2026-03-10T00:00:00Z",
            "paid_at": "2026-03-09T00:00:00Z",
            "loan": {"application": {"id": 1}}
        }))
        .unwrap();

        let mut diagnostics = DiagnosticLog::new();
        let enriched = reconcile(vec![upcoming, late, settled], &loans, &mut diagnostics);

        assert!(RepaymentTab::Upcoming.matches(&enriched[0], now));
        assert!(!RepaymentTab::Upcoming.matches(&enriched[1], now));
        assert!(!RepaymentTab::Upcoming.matches(&enriched[2], now));

        assert!(RepaymentTab::Overdue.matches(&enriched[1], now));
        assert!(!RepaymentTab::Overdue.matches(&enriched[0], now));
        assert!(!RepaymentTab::Overdue.matches(&enriched[2], now));

        assert!(enriched.iter().all(|e| RepaymentTab::All.matches(e, now)));
    }
}

//! status classification.
//!
//! every status comparison in the engine goes through the tables below so
//! the case-folding rules live in exactly one place. the loan lifecycle
//! progresses draft/submitted -> under_review -> approved -> disbursed ->
//! {paid | overdue | defaulted}, with rejected and cancelled reachable from
//! any pre-disbursal state; this module only classifies snapshots and does
//! not validate that an observed transition was legal.

use crate::types::{CanonicalStatus, TransactionStatus};

/// map an upstream status string onto the canonical enum.
///
/// matching is case-insensitive and accepts snake_case, Title Case and
/// hyphenated variants. anything unrecognized maps to `Unknown` rather
/// than a misleadingly safe default.
pub fn classify(raw: &str) -> CanonicalStatus {
    let folded = raw.trim().to_lowercase().replace([' ', '-'], "_");
    match folded.as_str() {
        "draft" => CanonicalStatus::Draft,
        "submitted" => CanonicalStatus::Submitted,
        "under_review" => CanonicalStatus::UnderReview,
        "approved" => CanonicalStatus::Approved,
        // the settled loan resource reports `active` for a running loan
        "disbursed" | "active" => CanonicalStatus::Disbursed,
        "paid" | "repaid" | "completed" => CanonicalStatus::Paid,
        "overdue" => CanonicalStatus::Overdue,
        "partial" | "partially_paid" => CanonicalStatus::Partial,
        "rejected" => CanonicalStatus::Rejected,
        "cancelled" | "canceled" => CanonicalStatus::Cancelled,
        "defaulted" | "liquidated" => CanonicalStatus::Defaulted,
        "pending" => CanonicalStatus::Pending,
        _ => CanonicalStatus::Unknown,
    }
}

/// classify an optional raw status; absent means `Unknown`
pub fn classify_opt(raw: Option<&str>) -> CanonicalStatus {
    raw.map(classify).unwrap_or(CanonicalStatus::Unknown)
}

/// map an upstream deposit/withdrawal status string; `confirmed` and
/// `completed` are the same settled state upstream
pub fn classify_transaction(raw: &str) -> TransactionStatus {
    let folded = raw.trim().to_lowercase().replace([' ', '-'], "_");
    match folded.as_str() {
        "pending" => TransactionStatus::Pending,
        "processing" => TransactionStatus::Processing,
        "confirmed" | "completed" => TransactionStatus::Confirmed,
        "failed" => TransactionStatus::Failed,
        "rejected" => TransactionStatus::Rejected,
        _ => TransactionStatus::Unknown,
    }
}

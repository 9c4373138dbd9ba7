use serde::{Deserialize, Serialize};
use std::fmt;

/// upstream record identifier; the api is inconsistent about whether ids
/// arrive as json numbers or strings, so both forms are kept and matched
/// by canonical value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(i64),
    Text(String),
}

impl RecordId {
    /// canonical form used for cross-resource matching
    pub fn canonical(&self) -> String {
        match self {
            RecordId::Num(n) => n.to_string(),
            RecordId::Text(s) => s.trim().to_string(),
        }
    }

    /// id equality across representations: 5 matches "5"
    pub fn matches(&self, other: &RecordId) -> bool {
        self.canonical() == other.canonical()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Num(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

/// canonical lifecycle status, normalized from the upstream string soup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Disbursed,
    Paid,
    Overdue,
    Partial,
    Rejected,
    Cancelled,
    Defaulted,
    /// a repayment installment that is not yet due
    Pending,
    Unknown,
}

impl CanonicalStatus {
    /// whether the repayment clock is running: time-based fields
    /// (remaining days, progress) are only meaningful once funds have
    /// been disbursed
    pub fn is_counting(&self) -> bool {
        matches!(
            self,
            CanonicalStatus::Disbursed
                | CanonicalStatus::Paid
                | CanonicalStatus::Overdue
                | CanonicalStatus::Partial
        )
    }

    /// terminal states; no further transitions are expected
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CanonicalStatus::Paid
                | CanonicalStatus::Rejected
                | CanonicalStatus::Cancelled
                | CanonicalStatus::Defaulted
        )
    }

    /// application states before any disbursement
    pub fn is_pre_disbursal(&self) -> bool {
        matches!(
            self,
            CanonicalStatus::Draft
                | CanonicalStatus::Submitted
                | CanonicalStatus::UnderReview
                | CanonicalStatus::Approved
                | CanonicalStatus::Pending
        )
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CanonicalStatus::Draft => "draft",
            CanonicalStatus::Submitted => "submitted",
            CanonicalStatus::UnderReview => "under_review",
            CanonicalStatus::Approved => "approved",
            CanonicalStatus::Disbursed => "disbursed",
            CanonicalStatus::Paid => "paid",
            CanonicalStatus::Overdue => "overdue",
            CanonicalStatus::Partial => "partial",
            CanonicalStatus::Rejected => "rejected",
            CanonicalStatus::Cancelled => "cancelled",
            CanonicalStatus::Defaulted => "defaulted",
            CanonicalStatus::Pending => "pending",
            CanonicalStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// fund flow direction for the merged transaction view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// deposit into the platform wallet
    Credit,
    /// withdrawal out of the platform wallet
    Debit,
}

/// settlement currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Sol,
    Usdc,
}

impl Currency {
    /// minor-unit scale: lamports for SOL, micro-units for USDC
    pub fn minor_scale(&self) -> u32 {
        match self {
            Currency::Sol => 9,
            Currency::Usdc => 6,
        }
    }

    /// display precision used by the transaction views
    pub fn display_dp(&self) -> u32 {
        match self {
            Currency::Sol => 4,
            Currency::Usdc => 2,
        }
    }

    /// tolerant parse; upstream casing varies
    pub fn parse(raw: &str) -> Option<Currency> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SOL" => Some(Currency::Sol),
            "USDC" => Some(Currency::Usdc),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Sol => write!(f, "SOL"),
            Currency::Usdc => write!(f, "USDC"),
        }
    }
}

/// canonical deposit/withdrawal settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Confirmed,
    Failed,
    Rejected,
    Unknown,
}

impl TransactionStatus {
    /// still waiting on chain settlement
    pub fn is_settling(&self) -> bool {
        matches!(self, TransactionStatus::Pending | TransactionStatus::Processing)
    }
}

/// resources consumed from the api. the first five are collections and
/// carry the resource-named envelope keys each has been observed to use;
/// the rest are singular reads shared with the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Products,
    Applications,
    Repayments,
    Deposits,
    Withdrawals,
    Balance,
    Wallet,
    CreditScore,
    CreditScoreFactors,
}

impl ResourceKind {
    /// envelope keys checked by normalization rule 3
    pub fn collection_keys(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Products => &["products", "loan_products"],
            ResourceKind::Applications => &["loans", "applications"],
            ResourceKind::Repayments => &["repayments"],
            ResourceKind::Deposits => &["deposits"],
            ResourceKind::Withdrawals => &["withdrawals"],
            ResourceKind::CreditScoreFactors => &["factors"],
            _ => &[],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Products => "loan products",
            ResourceKind::Applications => "loan applications",
            ResourceKind::Repayments => "repayments",
            ResourceKind::Deposits => "deposits",
            ResourceKind::Withdrawals => "withdrawals",
            ResourceKind::Balance => "balance",
            ResourceKind::Wallet => "wallet",
            ResourceKind::CreditScore => "credit score",
            ResourceKind::CreditScoreFactors => "credit score factors",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_matching() {
        assert!(RecordId::Num(5).matches(&RecordId::Text("5".into())));
        assert!(RecordId::Text(" 5 ".into()).matches(&RecordId::Num(5)));
        assert!(!RecordId::Num(5).matches(&RecordId::Num(6)));
        assert!(RecordId::Text("abc".into()).matches(&RecordId::Text("abc".into())));
    }

    #[test]
    fn test_counting_statuses() {
        assert!(CanonicalStatus::Disbursed.is_counting());
        assert!(CanonicalStatus::Overdue.is_counting());
        assert!(CanonicalStatus::Partial.is_counting());
        assert!(CanonicalStatus::Paid.is_counting());
        assert!(!CanonicalStatus::Approved.is_counting());
        assert!(!CanonicalStatus::Unknown.is_counting());
    }

    #[test]
    fn test_terminal_vs_pre_disbursal() {
        assert!(CanonicalStatus::Rejected.is_terminal());
        assert!(CanonicalStatus::Cancelled.is_terminal());
        assert!(!CanonicalStatus::Disbursed.is_terminal());
        assert!(CanonicalStatus::Approved.is_pre_disbursal());
        assert!(!CanonicalStatus::Disbursed.is_pre_disbursal());
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("sol"), Some(Currency::Sol));
        assert_eq!(Currency::parse(" USDC "), Some(Currency::Usdc));
        assert_eq!(Currency::parse("eth"), None);
        assert_eq!(Currency::Sol.minor_scale(), 9);
        assert_eq!(Currency::Usdc.minor_scale(), 6);
    }
}

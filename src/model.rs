use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::lifecycle::{classify_opt, classify_transaction};
use crate::types::{CanonicalStatus, Currency, Direction, RecordId, TransactionStatus};

/// first present, non-null field among the given keys
fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find(|v| !v.is_null())
}

/// amounts arrive as json numbers or as strings like "216.00"
fn read_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn read_money(value: &Value) -> Option<Money> {
    read_decimal(value).map(Money::from_decimal)
}

fn read_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_string(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.to_string())
}

fn read_datetime(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn read_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n.as_i64().map(RecordId::Num),
        Value::String(s) if !s.trim().is_empty() => Some(RecordId::Text(s.trim().to_string())),
        _ => None,
    }
}

/// loan product reference data, read-only here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: RecordId,
    pub name: String,
    pub loan_type: String,
    pub min_amount: Money,
    pub max_amount: Money,
    pub min_duration_days: u32,
    pub max_duration_days: u32,
    pub interest_rate: Option<Rate>,
    pub collateral_required: bool,
    pub ltv_ratio: Option<Rate>,
    pub min_credit_score: Option<u32>,
}

impl LoanProduct {
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = field(value, &["id"]).and_then(read_id)?;
        Some(Self {
            id,
            name: field(value, &["name"]).and_then(read_string).unwrap_or_default(),
            loan_type: field(value, &["loan_type"])
                .and_then(read_string)
                .unwrap_or_default(),
            min_amount: field(value, &["min_amount"])
                .and_then(read_money)
                .unwrap_or(Money::ZERO),
            max_amount: field(value, &["max_amount"])
                .and_then(read_money)
                .unwrap_or(Money::ZERO),
            min_duration_days: field(value, &["min_duration"]).and_then(read_u32).unwrap_or(0),
            max_duration_days: field(value, &["max_duration"]).and_then(read_u32).unwrap_or(0),
            interest_rate: field(value, &["interest_rate"])
                .and_then(read_decimal)
                .map(Rate::from_percent),
            collateral_required: field(value, &["collateral_required"])
                .and_then(Value::as_bool)
                .unwrap_or(false),
            ltv_ratio: field(value, &["ltv_ratio"])
                .and_then(read_decimal)
                .map(Rate::from_percent),
            min_credit_score: field(value, &["min_credit_score"]).and_then(read_u32),
        })
    }
}

/// a borrower's loan application as reported by the api
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: RecordId,
    pub amount: Money,
    pub duration_days: u32,
    pub purpose: String,
    /// weak reference to the loan product, stored as an id
    pub product_ref: Option<RecordId>,
    pub status: CanonicalStatus,
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub disbursed_at: Option<DateTime<Utc>>,
}

impl LoanApplication {
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = field(value, &["id"]).and_then(read_id)?;
        // the product reference is a scalar id in list payloads and an
        // embedded object in detail payloads
        let product_ref = field(value, &["loan_product", "loan_product_id", "product"])
            .and_then(|v| read_id(v).or_else(|| v.get("id").and_then(read_id)));
        Some(Self {
            id,
            amount: field(value, &["amount"]).and_then(read_money).unwrap_or(Money::ZERO),
            duration_days: field(value, &["duration_days", "duration"])
                .and_then(read_u32)
                .unwrap_or(0),
            purpose: field(value, &["purpose"]).and_then(read_string).unwrap_or_default(),
            product_ref,
            status: classify_opt(field(value, &["status"]).and_then(Value::as_str)),
            rejection_reason: field(value, &["rejection_reason"]).and_then(read_string),
            created_at: field(value, &["created_at"]).and_then(read_datetime),
            disbursed_at: field(value, &["disbursed_at"]).and_then(read_datetime),
        })
    }

    /// start of the repayment clock: disbursement timestamp, falling back
    /// to the application timestamp when the api omits it
    pub fn clock_start(&self) -> Option<DateTime<Utc>> {
        self.disbursed_at.or(self.created_at)
    }
}

/// a scheduled repayment installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentRecord {
    pub id: RecordId,
    /// total due for this installment
    pub amount: Money,
    /// grows monotonically toward `amount`
    pub amount_paid: Money,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub tx_hash: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// status as reported upstream, when it reported one at all
    pub reported_status: Option<CanonicalStatus>,
    /// candidate owning-loan references in resolution priority order
    pub loan_refs: Vec<RecordId>,
}

impl RepaymentRecord {
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = field(value, &["id"]).and_then(read_id)?;
        Some(Self {
            id,
            amount: field(value, &["amount"]).and_then(read_money).unwrap_or(Money::ZERO),
            amount_paid: field(value, &["amount_paid"])
                .and_then(read_money)
                .unwrap_or(Money::ZERO),
            due_date: field(value, &["due_date"]).and_then(read_datetime),
            paid_at: field(value, &["paid_at"]).and_then(read_datetime),
            tx_hash: field(value, &["tx_hash", "transaction_hash"]).and_then(read_string),
            created_at: field(value, &["created_at"]).and_then(read_datetime),
            reported_status: field(value, &["status"])
                .and_then(Value::as_str)
                .map(crate::lifecycle::classify),
            loan_refs: Self::extract_loan_refs(value),
        })
    }

    /// the owning-loan reference has been observed in several nestings;
    /// collect every present shape, most direct first
    fn extract_loan_refs(value: &Value) -> Vec<RecordId> {
        let candidates = [
            field(value, &["loan"]).and_then(read_id),
            field(value, &["loan_id"]).and_then(read_id),
            value
                .pointer("/loan/application/id")
                .and_then(read_id),
            value.pointer("/loan/application").and_then(read_id),
            value
                .pointer("/loan/loan/application/id")
                .and_then(read_id),
        ];
        candidates.into_iter().flatten().collect()
    }

    fn is_fully_paid(&self) -> bool {
        self.paid_at.is_some() || (self.amount.is_positive() && self.amount_paid >= self.amount)
    }

    /// status to display and filter by, reconciling the reported string
    /// with what the payment amounts actually say
    pub fn effective_status(&self) -> CanonicalStatus {
        match self.reported_status {
            Some(status) if status != CanonicalStatus::Unknown => {
                if matches!(status, CanonicalStatus::Pending | CanonicalStatus::Partial)
                    && self.is_fully_paid()
                {
                    CanonicalStatus::Paid
                } else if status == CanonicalStatus::Pending && self.amount_paid.is_positive() {
                    CanonicalStatus::Partial
                } else {
                    status
                }
            }
            _ => {
                if self.is_fully_paid() {
                    CanonicalStatus::Paid
                } else if self.amount_paid.is_positive() {
                    CanonicalStatus::Partial
                } else {
                    CanonicalStatus::Pending
                }
            }
        }
    }
}

/// a deposit or withdrawal folded into one direction-tagged entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RecordId,
    pub direction: Direction,
    pub amount: Money,
    pub currency: Currency,
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    pub tx_hash: Option<String>,
    pub status: TransactionStatus,
    pub created_at: Option<DateTime<Utc>>,
    /// confirmed_at for deposits, processed_at for withdrawals
    pub settled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn from_deposit(value: &Value) -> Option<Self> {
        Self::from_value(
            value,
            Direction::Credit,
            &["from_external_wallet", "from_wallet", "external_wallet"],
            &["to_internal_wallet", "to_wallet", "internal_wallet"],
            &["confirmed_at"],
        )
    }

    pub fn from_withdrawal(value: &Value) -> Option<Self> {
        Self::from_value(
            value,
            Direction::Debit,
            &["from_internal_wallet", "from_wallet", "internal_wallet"],
            &["to_external_wallet", "to_wallet", "external_wallet"],
            &["processed_at"],
        )
    }

    fn from_value(
        value: &Value,
        direction: Direction,
        from_keys: &[&str],
        to_keys: &[&str],
        settled_keys: &[&str],
    ) -> Option<Self> {
        let amount = field(value, &["amount"]).and_then(read_money)?;
        // some records arrive without an id; synthesize one so list keys
        // and receipts stay stable for this pass
        let id = field(value, &["id"])
            .and_then(read_id)
            .unwrap_or_else(|| RecordId::Text(Uuid::new_v4().to_string()));
        let currency = field(value, &["currency"])
            .and_then(Value::as_str)
            .and_then(Currency::parse)
            .unwrap_or(Currency::Usdc);
        let status = field(value, &["status"])
            .and_then(Value::as_str)
            .map(classify_transaction)
            .unwrap_or(TransactionStatus::Unknown);
        Some(Self {
            id,
            direction,
            amount,
            currency,
            from_wallet: field(value, from_keys).and_then(read_string),
            to_wallet: field(value, to_keys).and_then(read_string),
            tx_hash: field(value, &["tx_hash", "transaction_hash"]).and_then(read_string),
            status,
            created_at: field(value, &["created_at", "timestamp"]).and_then(read_datetime),
            settled_at: field(value, settled_keys).and_then(read_datetime),
        })
    }
}

/// platform wallet balance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WalletBalance {
    pub sol: Option<Money>,
    pub usdc: Option<Money>,
}

impl WalletBalance {
    pub fn from_value(value: &Value) -> Self {
        Self {
            sol: field(value, &["sol_balance", "sol"]).and_then(read_money),
            usdc: field(value, &["usdc_balance", "usdc"]).and_then(read_money),
        }
    }
}

/// decoded response of a repayment pay call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub status: CanonicalStatus,
    pub amount_paid: Option<Money>,
    pub remaining_amount: Option<Money>,
    pub tx_hash: Option<String>,
    pub credit_score_updated: Option<Decimal>,
}

impl PaymentOutcome {
    pub fn from_value(value: &Value) -> Self {
        Self {
            status: classify_opt(field(value, &["status"]).and_then(Value::as_str)),
            amount_paid: field(value, &["amount_paid"]).and_then(read_money),
            remaining_amount: field(value, &["remaining_amount"]).and_then(read_money),
            tx_hash: field(value, &["tx_hash", "transaction_hash"]).and_then(read_string),
            credit_score_updated: field(value, &["credit_score_updated"]).and_then(read_decimal),
        }
    }
}

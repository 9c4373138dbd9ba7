pub mod calculator;
pub mod client;
pub mod config;
pub mod decimal;
pub mod diagnostics;
pub mod errors;
pub mod lifecycle;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod schedule;
pub mod types;
pub mod view;

// re-export key types
pub use calculator::{quote, resolve_rate, LoanQuote, RateSource};
pub use client::{
    cancellation_pair, ApiClient, BorrowerSnapshot, CancelToken, DepositRefresh, PollHandle,
    RepaymentScope, Transport,
};
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use diagnostics::{Diagnostic, DiagnosticLog};
pub use errors::{EngineError, Result, TransportError};
pub use lifecycle::{classify, classify_opt, classify_transaction};
pub use model::{
    LoanApplication, LoanProduct, PaymentOutcome, RepaymentRecord, Transaction, WalletBalance,
};
pub use normalize::{normalize, normalize_or_empty};
pub use reconcile::{
    merge_transactions, reconcile, EnrichedRepayment, RepaymentTab, TransactionFilter,
    TransactionSummary,
};
pub use schedule::{
    days_until_due, elapsed_progress, is_overdue, payment_progress, remaining_days,
    PaymentProgress,
};
pub use types::{
    CanonicalStatus, Currency, Direction, RecordId, ResourceKind, TransactionStatus,
};
pub use view::{build_loan_views, CanonicalLoanView, PortfolioSummary};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

//! api paths, relative to the deployment's base url. trailing slashes are
//! load-bearing: the backend redirects without them and a redirect drops
//! the authorization header on some http stacks.

use crate::types::RecordId;

pub const LOAN_PRODUCTS: &str = "/loans/products/";
pub const LOAN_APPLICATIONS: &str = "/loans/applications/";
pub const REPAYMENTS: &str = "/loans/repayments/";
pub const REPAYMENTS_UPCOMING: &str = "/loans/repayments/upcoming/";
pub const REPAYMENTS_OVERDUE: &str = "/loans/repayments/overdue/";
pub const DEPOSITS: &str = "/users/deposits/";
pub const WITHDRAWALS: &str = "/users/withdrawals/";
pub const BALANCE: &str = "/users/balance/";
pub const WALLET: &str = "/users/wallet/";
pub const CREDIT_SCORE: &str = "/users/credit-score/";
pub const CREDIT_SCORE_FACTORS: &str = "/users/credit-score/factors/";
pub const CREDIT_SCORE_RECALCULATE: &str = "/users/credit-score/recalculate/";

pub fn repayment_pay(id: &RecordId) -> String {
    format!("{REPAYMENTS}{id}/pay/")
}

pub fn deposit_detail(id: &RecordId) -> String {
    format!("{DEPOSITS}{id}/")
}

/// which slice of the repayment schedule to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepaymentScope {
    #[default]
    All,
    Upcoming,
    Overdue,
}

impl RepaymentScope {
    pub fn path(&self) -> &'static str {
        match self {
            RepaymentScope::All => REPAYMENTS,
            RepaymentScope::Upcoming => REPAYMENTS_UPCOMING,
            RepaymentScope::Overdue => REPAYMENTS_OVERDUE,
        }
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::model::LoanProduct;

/// where the rate in a quote came from; the 6% fallback must stay visibly
/// distinguishable from a real product rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Product,
    Fallback,
}

/// pro-rata simple interest breakdown for a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub interest: Money,
    pub total: Money,
    pub daily: Money,
    pub weekly: Money,
    pub monthly: Money,
    pub rate: Rate,
    pub rate_source: RateSource,
}

/// rate resolution: always the resolved product's rate; a missing or
/// rate-less product falls back to the configured default
pub fn resolve_rate(product: Option<&LoanProduct>, config: &EngineConfig) -> (Rate, RateSource) {
    match product.and_then(|p| p.interest_rate) {
        Some(rate) => (rate, RateSource::Product),
        None => (config.fallback_rate, RateSource::Fallback),
    }
}

/// compute the installment breakdown, or `None` when the inputs cannot
/// produce a meaningful figure (the caller shows an empty state, never a
/// garbage number).
///
/// interest = principal * rate * duration/365, simple and non-compounding;
/// nothing here rounds to 2 decimal places, that happens only at display.
pub fn quote(
    principal: Money,
    duration_days: u32,
    annual_rate: Rate,
    rate_source: RateSource,
) -> Option<LoanQuote> {
    if !principal.is_positive() || duration_days == 0 || annual_rate.is_negative() {
        return None;
    }

    let days = Decimal::from(duration_days);
    let interest = principal * annual_rate.as_decimal() * (days / Decimal::from(365));
    let total = principal + interest;

    Some(LoanQuote {
        interest,
        total,
        daily: total / days,
        weekly: total / (days / Decimal::from(7)),
        monthly: total / (days / Decimal::from(30)),
        rate: annual_rate,
        rate_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_reference_quote() {
        // 1000 for 180 days at 8%
        let q = quote(
            Money::from_major(1000),
            180,
            Rate::from_percentage(8),
            RateSource::Product,
        )
        .unwrap();

        assert_eq!(q.interest.to_display(), dec!(39.45));
        assert_eq!(q.total.to_display(), dec!(1039.45));
        assert_eq!(q.daily.round_dp(4).as_decimal(), dec!(5.7747));
        assert_eq!(q.weekly.to_display(), dec!(40.42));
        assert_eq!(q.monthly.to_display(), dec!(173.24));
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let a = quote(
            Money::from_major(1000),
            180,
            Rate::from_percentage(8),
            RateSource::Product,
        )
        .unwrap();
        let b = quote(
            Money::from_major(1000),
            180,
            Rate::from_percentage(8),
            RateSource::Product,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_not_computable_edges() {
        let rate = Rate::from_percentage(8);
        assert!(quote(Money::ZERO, 180, rate, RateSource::Product).is_none());
        assert!(quote(Money::from_major(-5), 180, rate, RateSource::Product).is_none());
        assert!(quote(Money::from_major(1000), 0, rate, RateSource::Product).is_none());
        assert!(quote(
            Money::from_major(1000),
            180,
            Rate::from_decimal(dec!(-0.08)),
            RateSource::Product
        )
        .is_none());
    }

    #[test]
    fn test_zero_rate_is_computable() {
        let q = quote(Money::from_major(500), 30, Rate::ZERO, RateSource::Product).unwrap();
        assert_eq!(q.interest, Money::ZERO);
        assert_eq!(q.total, Money::from_major(500));
    }

    #[test]
    fn test_rate_resolution_fallback_is_marked() {
        let config = EngineConfig::default();

        let (rate, source) = resolve_rate(None, &config);
        assert_eq!(rate, Rate::from_percentage(6));
        assert_eq!(source, RateSource::Fallback);

        let product = LoanProduct::from_value(&json!({
            "id": 4, "name": "category B", "interest_rate": "8.00"
        }))
        .unwrap();
        let (rate, source) = resolve_rate(Some(&product), &config);
        assert_eq!(rate, Rate::from_percentage(8));
        assert_eq!(source, RateSource::Product);

        // a product that exists but carries no rate still falls back
        let rateless = LoanProduct::from_value(&json!({"id": 5, "name": "x"})).unwrap();
        let (_, source) = resolve_rate(Some(&rateless), &config);
        assert_eq!(source, RateSource::Fallback);
    }
}

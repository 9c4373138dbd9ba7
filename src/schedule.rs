use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// millisecond difference to whole days, rounding toward positive infinity
/// the way the due-date labels expect (a partial day still counts)
fn ceil_days(ms: i64) -> i64 {
    if ms > 0 {
        (ms + MS_PER_DAY - 1) / MS_PER_DAY
    } else {
        -(-ms / MS_PER_DAY)
    }
}

/// whole days left until the term ends, rounded up and clamped at zero.
///
/// `start` absent means the clock never started being reported; the full
/// term is returned as a conservative fallback rather than an error.
pub fn remaining_days(start: Option<DateTime<Utc>>, duration_days: u32, now: DateTime<Utc>) -> u32 {
    let Some(start) = start else {
        return duration_days;
    };
    let due = start + Duration::days(duration_days as i64);
    let remaining = ceil_days((due - now).num_milliseconds());
    remaining.max(0) as u32
}

/// elapsed share of the term as a percent clamped to [0, 100].
///
/// only meaningful while the loan's status is counting; callers gate on
/// that before invoking. a zero duration with an elapsed start reads as a
/// fully elapsed term.
pub fn elapsed_progress(
    start: Option<DateTime<Utc>>,
    duration_days: u32,
    now: DateTime<Utc>,
) -> Decimal {
    let Some(start) = start else {
        return Decimal::ZERO;
    };
    let elapsed_ms = (now - start).num_milliseconds();
    let total_ms = duration_days as i64 * MS_PER_DAY;
    if total_ms == 0 {
        return if elapsed_ms > 0 {
            Decimal::from(100)
        } else {
            Decimal::ZERO
        };
    }
    let percent = Decimal::from(elapsed_ms) * Decimal::from(100) / Decimal::from(total_ms);
    percent.clamp(Decimal::ZERO, Decimal::from(100))
}

/// a repayment is overdue iff its due date has passed and it has not been
/// paid; no due date means never overdue
pub fn is_overdue(
    due_date: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match (due_date, paid_at) {
        (Some(due), None) => due < now,
        _ => false,
    }
}

/// signed whole days until the due date, rounded up; negative once the
/// date has passed ("3 days overdue"). `None` without a due date.
pub fn days_until_due(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    due_date.map(|due| ceil_days((due - now).num_milliseconds()))
}

/// how far a partially paid installment has come
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProgress {
    pub remaining: Money,
    pub percent: Decimal,
}

/// remaining amount and percent paid, clamped against upstream
/// inconsistencies (amount_paid above amount, negative paid). undefined
/// for a zero total; the caller handles `None`.
pub fn payment_progress(amount: Money, amount_paid: Money) -> Option<PaymentProgress> {
    if amount.is_zero() {
        return None;
    }
    let paid = amount_paid.max(Money::ZERO).min(amount);
    let remaining = (amount - paid).max(Money::ZERO);
    let percent = (paid.as_decimal() * Decimal::from(100) / amount.as_decimal())
        .clamp(Decimal::ZERO, Decimal::from(100));
    Some(PaymentProgress { remaining, percent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    fn frozen(y: i32, mo: u32, d: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_remaining_days() {
        let time = frozen(2026, 3, 1);
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        // 28 of 90 days elapsed
        assert_eq!(remaining_days(Some(start), 90, time.now()), 62);
        // past the due date clamps at zero
        assert_eq!(remaining_days(Some(start), 10, time.now()), 0);
        // a partial day still counts as a full remaining day
        let now = start + Duration::days(5) + Duration::hours(1);
        assert_eq!(remaining_days(Some(start), 10, now), 5);
        // absent start degrades to the full term
        assert_eq!(remaining_days(None, 90, time.now()), 90);
    }

    #[test]
    fn test_elapsed_progress_clamps() {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let halfway = start + Duration::days(45);
        assert_eq!(elapsed_progress(Some(start), 90, halfway), dec!(50));

        let long_after = start + Duration::days(400);
        assert_eq!(elapsed_progress(Some(start), 90, long_after), dec!(100));

        let before = start - Duration::days(1);
        assert_eq!(elapsed_progress(Some(start), 90, before), Decimal::ZERO);

        assert_eq!(elapsed_progress(None, 90, halfway), Decimal::ZERO);
    }

    #[test]
    fn test_overdue_boundary() {
        let time = frozen(2026, 3, 15);
        let control = time.test_control().unwrap();
        let now = time.now();

        // one millisecond past due is overdue, one before is not
        assert!(is_overdue(
            Some(now - Duration::milliseconds(1)),
            None,
            time.now()
        ));
        assert!(!is_overdue(
            Some(now + Duration::milliseconds(1)),
            None,
            time.now()
        ));

        // a paid installment is never overdue, however old
        assert!(!is_overdue(
            Some(now - Duration::days(30)),
            Some(now),
            time.now()
        ));

        // no due date, never overdue
        assert!(!is_overdue(None, None, time.now()));

        // the pending one crosses the boundary as time advances
        let due = now + Duration::milliseconds(1);
        control.advance(Duration::seconds(1));
        assert!(is_overdue(Some(due), None, time.now()));
    }

    #[test]
    fn test_days_until_due_signed() {
        let time = frozen(2026, 3, 15);
        let now = time.now();

        assert_eq!(days_until_due(Some(now + Duration::days(3)), now), Some(3));
        assert_eq!(days_until_due(Some(now - Duration::days(3)), now), Some(-3));
        assert_eq!(days_until_due(None, now), None);
    }

    #[test]
    fn test_payment_progress_scenarios() {
        let progress =
            payment_progress(Money::from_major(1000), Money::from_major(400)).unwrap();
        assert_eq!(progress.remaining, Money::from_major(600));
        assert_eq!(progress.percent, dec!(40));

        let settled =
            payment_progress(Money::from_major(1000), Money::from_major(1000)).unwrap();
        assert_eq!(settled.remaining, Money::ZERO);
        assert_eq!(settled.percent, dec!(100));

        // overpayment clamps instead of going negative
        let clamped =
            payment_progress(Money::from_major(1000), Money::from_major(1200)).unwrap();
        assert_eq!(clamped.remaining, Money::ZERO);
        assert_eq!(clamped.percent, dec!(100));

        // negative paid amount clamps to zero progress
        let negative =
            payment_progress(Money::from_major(1000), Money::from_major(-50)).unwrap();
        assert_eq!(negative.remaining, Money::from_major(1000));
        assert_eq!(negative.percent, Decimal::ZERO);

        // zero total is undefined, not zero
        assert!(payment_progress(Money::ZERO, Money::from_major(10)).is_none());
    }
}

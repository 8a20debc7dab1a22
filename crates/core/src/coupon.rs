//! Coupon eligibility and discount calculation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::types::{CouponKind, round_cents};

/// Why a coupon cannot be applied to a subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("coupon is not active")]
    Inactive,
    #[error("coupon has expired")]
    Expired,
    #[error("coupon has reached its usage limit")]
    Exhausted,
    #[error("order subtotal must be at least {minimum}")]
    BelowMinimum { minimum: Decimal },
    #[error("coupon value is invalid")]
    InvalidValue,
}

/// The rules a stored coupon carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRules {
    pub kind: CouponKind,
    /// Percentage (0–100) for [`CouponKind::Percent`], amount for [`CouponKind::Fixed`].
    pub value: Decimal,
    pub min_subtotal: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A subtotal with a coupon applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl AppliedDiscount {
    /// A subtotal with nothing taken off.
    #[must_use]
    pub fn none(subtotal: Decimal) -> Self {
        let subtotal = round_cents(subtotal);
        Self {
            subtotal,
            discount: Decimal::ZERO,
            total: subtotal,
        }
    }
}

impl CouponRules {
    /// Check eligibility at `now` and compute the discount for `subtotal`.
    ///
    /// The discount is rounded to cents and never exceeds the subtotal, so
    /// `total = subtotal - discount` is always non-negative.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponRejection`] that applies.
    pub fn apply(
        &self,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<AppliedDiscount, CouponRejection> {
        if !self.active {
            return Err(CouponRejection::Inactive);
        }
        if self.expires_at.is_some_and(|at| at <= now) {
            return Err(CouponRejection::Expired);
        }
        if self.max_uses.is_some_and(|max| self.uses >= max) {
            return Err(CouponRejection::Exhausted);
        }
        if let Some(minimum) = self.min_subtotal
            && subtotal < minimum
        {
            return Err(CouponRejection::BelowMinimum { minimum });
        }

        let subtotal = round_cents(subtotal);
        let raw = match self.kind {
            CouponKind::Percent => {
                if self.value <= Decimal::ZERO || self.value > Decimal::ONE_HUNDRED {
                    return Err(CouponRejection::InvalidValue);
                }
                subtotal * self.value / Decimal::ONE_HUNDRED
            }
            CouponKind::Fixed => {
                if self.value <= Decimal::ZERO {
                    return Err(CouponRejection::InvalidValue);
                }
                self.value
            }
        };
        let discount = round_cents(raw).min(subtotal);

        Ok(AppliedDiscount {
            subtotal,
            discount,
            total: subtotal - discount,
        })
    }
}

/// Normalise a coupon code for storage and lookup.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use chrono::Duration;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn percent(value: &str) -> CouponRules {
        CouponRules {
            kind: CouponKind::Percent,
            value: dec(value),
            min_subtotal: None,
            max_uses: None,
            uses: 0,
            active: true,
            expires_at: None,
        }
    }

    #[test]
    fn test_percent_discount_reduces_total_exactly() {
        let applied = percent("15").apply(dec("39.99"), Utc::now()).unwrap();
        assert_eq!(applied.discount, dec("6.00"));
        assert_eq!(applied.total, applied.subtotal - applied.discount);
        assert_eq!(applied.total, dec("33.99"));
    }

    #[test]
    fn test_fixed_discount_is_capped_at_subtotal() {
        let rules = CouponRules {
            kind: CouponKind::Fixed,
            value: dec("25"),
            ..percent("1")
        };
        let applied = rules.apply(dec("10.00"), Utc::now()).unwrap();
        assert_eq!(applied.discount, dec("10.00"));
        assert_eq!(applied.total, Decimal::ZERO);
    }

    #[test]
    fn test_rejections() {
        let now = Utc::now();

        let inactive = CouponRules {
            active: false,
            ..percent("10")
        };
        assert_eq!(inactive.apply(dec("10"), now), Err(CouponRejection::Inactive));

        let expired = CouponRules {
            expires_at: Some(now - Duration::minutes(1)),
            ..percent("10")
        };
        assert_eq!(expired.apply(dec("10"), now), Err(CouponRejection::Expired));

        let exhausted = CouponRules {
            max_uses: Some(3),
            uses: 3,
            ..percent("10")
        };
        assert_eq!(exhausted.apply(dec("10"), now), Err(CouponRejection::Exhausted));

        let minimum = CouponRules {
            min_subtotal: Some(dec("50")),
            ..percent("10")
        };
        assert_eq!(
            minimum.apply(dec("49.99"), now),
            Err(CouponRejection::BelowMinimum { minimum: dec("50") })
        );
        assert!(minimum.apply(dec("50"), now).is_ok());

        assert_eq!(
            percent("150").apply(dec("10"), now),
            Err(CouponRejection::InvalidValue)
        );
    }

    #[test]
    fn test_unexpired_coupon_applies() {
        let now = Utc::now();
        let rules = CouponRules {
            expires_at: Some(now + Duration::days(1)),
            max_uses: Some(10),
            uses: 9,
            ..percent("50")
        };
        let applied = rules.apply(dec("20"), now).unwrap();
        assert_eq!(applied.total, dec("10.00"));
    }

    #[test]
    fn test_no_discount_keeps_total() {
        let applied = AppliedDiscount::none(dec("12.5"));
        assert_eq!(applied.total, dec("12.50"));
        assert_eq!(applied.discount, Decimal::ZERO);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  summer10 "), "SUMMER10");
    }
}

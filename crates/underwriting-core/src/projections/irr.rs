//! Bounded IRR root-finder: Newton-Raphson with a bisection fallback over
//! [-99%, +1000%]. Iteration-capped, and returns `None` instead of a result
//! when the cash flows admit no real root in range; never a fault, never a
//! silent zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Money;

const MAX_NEWTON_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 100;
/// Convergence tolerance on NPV.
const CONVERGENCE_TOLERANCE: Decimal = dec!(0.0000001);
const MIN_RATE: Decimal = dec!(-0.99);
const MAX_RATE: Decimal = dec!(10.0);
/// Bisection scan grid step across the rate range.
const SCAN_STEP: Decimal = dec!(0.05);

/// Solve for the rate where NPV of the period cash flows is zero.
/// `cash_flows[0]` is the time-zero flow (typically negative equity).
pub fn irr(cash_flows: &[Money]) -> Option<Decimal> {
    if cash_flows.len() < 2 {
        return None;
    }

    // A real root needs flows of both signs
    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !has_positive || !has_negative {
        return None;
    }

    if let Some(rate) = newton_raphson(cash_flows) {
        return Some(rate);
    }

    bisection(cash_flows)
}

fn newton_raphson(cash_flows: &[Money]) -> Option<Decimal> {
    let mut rate = dec!(0.10);

    for _ in 0..MAX_NEWTON_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(cash_flows, rate)?;

        if npv_val.abs() < CONVERGENCE_TOLERANCE {
            return Some(rate);
        }

        if dnpv.is_zero() {
            return None;
        }

        rate -= npv_val / dnpv;

        // Guard against divergence outside the admissible range
        if rate < MIN_RATE {
            rate = MIN_RATE;
        } else if rate > MAX_RATE {
            rate = MAX_RATE;
        }
    }

    None
}

/// Bracket a sign change on a coarse grid across the rate range, then
/// bisect. Grid points where the NPV overflows Decimal range are skipped.
fn bisection(cash_flows: &[Money]) -> Option<Decimal> {
    let mut lo = MIN_RATE;
    let mut hi = lo + SCAN_STEP;
    let mut lo_npv = npv(cash_flows, lo);

    let mut bracket: Option<(Decimal, Decimal, Decimal)> = None;
    while hi <= MAX_RATE {
        let hi_npv = npv(cash_flows, hi);
        if let (Some(a), Some(b)) = (lo_npv, hi_npv) {
            if (a <= Decimal::ZERO) != (b <= Decimal::ZERO) {
                bracket = Some((lo, hi, a));
                break;
            }
        }
        lo = hi;
        lo_npv = hi_npv;
        hi += SCAN_STEP;
    }

    let (mut lo, mut hi, lo_npv) = bracket?;
    let lo_sign_negative = lo_npv <= Decimal::ZERO;

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let mid_npv = npv(cash_flows, mid)?;

        if mid_npv.abs() < CONVERGENCE_TOLERANCE {
            return Some(mid);
        }

        if (mid_npv <= Decimal::ZERO) == lo_sign_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    // Bracket is tight enough to report the midpoint
    Some((lo + hi) / dec!(2))
}

/// NPV(r) with checked arithmetic; `None` when a discount factor leaves the
/// representable Decimal range (deep-negative rates over long horizons).
fn npv(cash_flows: &[Money], rate: Decimal) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut total = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_div(one_plus_r)?;
        }
        total = total.checked_add(cf.checked_mul(discount)?)?;
    }

    Some(total)
}

fn npv_and_derivative(cash_flows: &[Money], rate: Decimal) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        npv_val = npv_val.checked_add(cf.checked_mul(discount)?)?;
        if t > 0 {
            // d/dr of CF_t / (1+r)^t = -t * CF_t / (1+r)^(t+1)
            let term = Decimal::from(t as i64)
                .checked_mul(*cf)?
                .checked_mul(discount)?
                .checked_div(one_plus_r)?;
            dnpv = dnpv.checked_sub(term)?;
        }
        discount = discount.checked_div(one_plus_r)?;
    }

    Some((npv_val, dnpv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_irr_single_period() {
        // Invest 100, receive 110 in 1 year => 10%
        let rate = irr(&[dec!(-100), dec!(110)]).unwrap();
        assert!((rate - dec!(0.10)).abs() < dec!(0.001), "got {rate}");
    }

    #[test]
    fn test_irr_level_annuity() {
        // Invest 1000, receive 300/year for 5 years => ~15.24%
        let rate = irr(&[
            dec!(-1000),
            dec!(300),
            dec!(300),
            dec!(300),
            dec!(300),
            dec!(300),
        ])
        .unwrap();
        assert!(rate > dec!(0.14) && rate < dec!(0.17), "got {rate}");
    }

    #[test]
    fn test_irr_negative_return() {
        // Invest 1000, receive 900 => -10%
        let rate = irr(&[dec!(-1000), dec!(900)]).unwrap();
        assert!((rate - dec!(-0.10)).abs() < dec!(0.001), "got {rate}");
    }

    #[test]
    fn test_irr_all_negative_flows_undetermined() {
        assert_eq!(irr(&[dec!(-1000), dec!(-50), dec!(-50)]), None);
    }

    #[test]
    fn test_irr_all_positive_flows_undetermined() {
        assert_eq!(irr(&[dec!(1000), dec!(50)]), None);
    }

    #[test]
    fn test_irr_too_few_flows() {
        assert_eq!(irr(&[dec!(-1000)]), None);
        assert_eq!(irr(&[]), None);
    }

    #[test]
    fn test_irr_typical_levered_deal() {
        // Equity out, five annual cash flows, sale proceeds in year 5
        let rate = irr(&[
            dec!(-3_700_000),
            dec!(230_000),
            dec!(245_000),
            dec!(260_000),
            dec!(276_000),
            dec!(6_100_000),
        ])
        .unwrap();
        assert!(rate > dec!(0.13) && rate < dec!(0.18), "got {rate}");
    }

    #[test]
    fn test_irr_is_deterministic() {
        let cfs = [dec!(-1000), dec!(400), dec!(400), dec!(400)];
        assert_eq!(irr(&cfs), irr(&cfs));
    }
}

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{round_currency, round_ratio, CalculationInputs, Money, Pct, Years};

/// Annual replacement reserve allowance per unit.
pub const RESERVES_PER_UNIT: Decimal = dec!(250);

/// Debt sizing and return metrics for a deal at its year-1 NOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtMetrics {
    pub loan_amount: Money,
    pub annual_debt_service: Money,
    pub annual_reserves: Money,
    pub equity_required: Money,
    pub dscr: Decimal,
    pub going_in_cap_rate_pct: Pct,
    pub cash_on_cash_pct: Pct,
}

/// Sized loan: purchase price × LTV.
pub fn loan_amount(purchase_price: Money, ltv_pct: Pct) -> Money {
    round_currency(purchase_price * ltv_pct / dec!(100))
}

/// Annual debt service. Interest-only loans pay the note rate on the full
/// balance; amortizing loans pay 12 × the standard monthly annuity. A zero
/// amortization term on an amortizing loan is a data-entry placeholder and
/// yields zero debt service rather than a fault.
pub fn annual_debt_service(
    loan: Money,
    rate_pct: Pct,
    amortization_years: Years,
    interest_only: bool,
) -> Money {
    if loan.is_zero() {
        return Decimal::ZERO;
    }
    if interest_only {
        return round_currency(loan * rate_pct / dec!(100));
    }
    if amortization_years == 0 {
        return Decimal::ZERO;
    }
    round_currency(monthly_payment(loan, rate_pct, amortization_years) * dec!(12))
}

/// Standard fixed-rate annuity payment: P * r(1+r)^n / ((1+r)^n - 1),
/// monthly rate r = annual/100/12, n = years * 12.
fn monthly_payment(principal: Money, rate_pct: Pct, amortization_years: Years) -> Money {
    let total_months = u64::from(amortization_years) * 12;
    let monthly_rate = rate_pct / dec!(100) / dec!(12);

    if monthly_rate.is_zero() {
        return principal / Decimal::from(total_months);
    }

    // (1 + r)^n by iterative multiplication keeps the figure exact in Decimal
    let mut compound = Decimal::ONE;
    for _ in 0..total_months {
        compound *= Decimal::ONE + monthly_rate;
    }

    principal * monthly_rate * compound / (compound - Decimal::ONE)
}

/// Outstanding balance after `payments_made` monthly payments. Interest-only
/// loans carry the original balance to maturity.
pub fn loan_balance_after(
    loan: Money,
    rate_pct: Pct,
    amortization_years: Years,
    interest_only: bool,
    payments_made: u32,
) -> Money {
    if interest_only || loan.is_zero() || amortization_years == 0 {
        return loan;
    }

    let total_months = u64::from(amortization_years) * 12;
    let monthly_rate = rate_pct / dec!(100) / dec!(12);

    if monthly_rate.is_zero() {
        let paid = loan * Decimal::from(u64::from(payments_made).min(total_months))
            / Decimal::from(total_months);
        return round_currency(loan - paid);
    }

    let payment = monthly_payment(loan, rate_pct, amortization_years);
    let mut balance = loan;
    for _ in 0..u64::from(payments_made).min(total_months) {
        let interest = balance * monthly_rate;
        balance -= payment - interest;
        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
            break;
        }
    }

    round_currency(balance)
}

/// NOI / annual debt service, zero when there is no debt service.
pub fn dscr(noi: Money, annual_ds: Money) -> Decimal {
    if annual_ds.is_zero() {
        Decimal::ZERO
    } else {
        round_ratio(noi / annual_ds)
    }
}

pub fn annual_reserves(unit_count: u32) -> Money {
    RESERVES_PER_UNIT * Decimal::from(unit_count)
}

pub fn equity_required(purchase_price: Money, acquisition_costs: Money, loan: Money) -> Money {
    round_currency(purchase_price + acquisition_costs - loan)
}

/// (NOI − debt service − reserves) / equity, as a percentage. Zero equity is
/// a placeholder state and yields zero.
pub fn cash_on_cash(noi: Money, annual_ds: Money, reserves: Money, equity: Money) -> Pct {
    if equity.is_zero() {
        Decimal::ZERO
    } else {
        round_ratio((noi - annual_ds - reserves) / equity * dec!(100))
    }
}

/// NOI / purchase price, as a percentage. Zero price yields zero.
pub fn going_in_cap_rate(noi: Money, purchase_price: Money) -> Pct {
    if purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        round_ratio(noi / purchase_price * dec!(100))
    }
}

/// Full debt block for a deal given its year-1 NOI.
pub fn debt_metrics(inputs: &CalculationInputs, noi: Money) -> DebtMetrics {
    let loan = loan_amount(inputs.purchase_price, inputs.ltv_pct);
    let annual_ds = annual_debt_service(
        loan,
        inputs.interest_rate_pct,
        inputs.amortization_years,
        inputs.interest_only,
    );
    let reserves = annual_reserves(inputs.unit_count);
    let equity = equity_required(inputs.purchase_price, inputs.acquisition_costs, loan);

    DebtMetrics {
        loan_amount: loan,
        annual_debt_service: annual_ds,
        annual_reserves: reserves,
        equity_required: equity,
        dscr: dscr(noi, annual_ds),
        going_in_cap_rate_pct: going_in_cap_rate(noi, inputs.purchase_price),
        cash_on_cash_pct: cash_on_cash(noi, annual_ds, reserves, equity),
    }
}

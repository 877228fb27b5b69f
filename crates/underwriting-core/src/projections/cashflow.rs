use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::irr;
use crate::ratios::{loan_balance_after, DebtMetrics};
use crate::types::{round_currency, round_ratio, CalculationInputs, CashFlowYear, Money, Pct};

/// Disposition costs as a share of gross exit value.
pub const SALE_COST_PCT: Decimal = dec!(2);

/// Hold-period projection: per-year cash flows, exit economics, equity
/// multiple, and IRR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub cash_flows: Vec<CashFlowYear>,
    pub exit_value: Money,
    pub sale_costs: Money,
    pub loan_balance_at_exit: Money,
    pub net_sale_proceeds: Money,
    pub equity_multiple: Decimal,
    /// None when the solver found no root in range
    pub irr_pct: Option<Pct>,
}

/// Project the hold period from the year-1 NOI. Growth rates are read from
/// `noi_growth_pct` starting at year 2; the last entry carries forward when
/// the hold period is longer than the sequence.
pub fn project(
    inputs: &CalculationInputs,
    year1_noi: Money,
    debt: &DebtMetrics,
    warnings: &mut Vec<String>,
) -> ProjectionOutput {
    let hold = inputs.hold_period_years.max(1);

    let mut cash_flows = Vec::with_capacity(hold as usize);
    let mut noi = year1_noi;

    for year in 1..=hold {
        if year > 1 {
            let growth = growth_for_year(&inputs.noi_growth_pct, year);
            noi = round_currency(noi * (Decimal::ONE + growth / dec!(100)));
        }
        let cash_flow = noi - debt.annual_debt_service - debt.annual_reserves;
        cash_flows.push(CashFlowYear {
            year,
            noi,
            debt_service: debt.annual_debt_service,
            reserves: debt.annual_reserves,
            cash_flow,
        });
    }

    // Terminal value off the final-year NOI
    let terminal_noi = cash_flows.last().map(|cf| cf.noi).unwrap_or(year1_noi);
    let exit_value = if inputs.exit_cap_rate_pct.is_zero() {
        Decimal::ZERO
    } else {
        round_currency(terminal_noi / (inputs.exit_cap_rate_pct / dec!(100)))
    };
    let sale_costs = round_currency(exit_value * SALE_COST_PCT / dec!(100));
    let loan_balance_at_exit = loan_balance_after(
        debt.loan_amount,
        inputs.interest_rate_pct,
        inputs.amortization_years,
        inputs.interest_only,
        hold.saturating_mul(12),
    );
    let net_sale_proceeds = exit_value - sale_costs - loan_balance_at_exit;

    let total_cash_flow: Money = cash_flows.iter().map(|cf| cf.cash_flow).sum();
    let equity_multiple = if debt.equity_required.is_zero() {
        Decimal::ZERO
    } else {
        round_ratio((total_cash_flow + net_sale_proceeds) / debt.equity_required)
    };

    let irr_pct = solve_irr(&cash_flows, debt.equity_required, net_sale_proceeds, warnings);

    ProjectionOutput {
        cash_flows,
        exit_value,
        sale_costs,
        loan_balance_at_exit,
        net_sale_proceeds,
        equity_multiple,
        irr_pct,
    }
}

fn growth_for_year(growth_pct: &[Pct], year: u32) -> Pct {
    // Year 2 reads index 0
    let idx = (year - 2) as usize;
    growth_pct
        .get(idx)
        .or_else(|| growth_pct.last())
        .copied()
        .unwrap_or(Decimal::ZERO)
}

fn solve_irr(
    cash_flows: &[CashFlowYear],
    equity: Money,
    net_sale_proceeds: Money,
    warnings: &mut Vec<String>,
) -> Option<Pct> {
    if equity.is_zero() {
        return None;
    }

    let mut flows = Vec::with_capacity(cash_flows.len() + 1);
    flows.push(-equity);
    for (i, cf) in cash_flows.iter().enumerate() {
        if i == cash_flows.len() - 1 {
            flows.push(cf.cash_flow + net_sale_proceeds);
        } else {
            flows.push(cf.cash_flow);
        }
    }

    match irr::irr(&flows) {
        Some(rate) => Some(round_ratio(rate * dec!(100))),
        None => {
            warnings.push(
                "IRR solver found no root in [-99%, +1000%]; IRR reported as undetermined".into(),
            );
            None
        }
    }
}

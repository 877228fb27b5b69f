//! Full evaluation pipeline: revenue waterfall, debt sizing, hold-period
//! projection, and stress scenarios, assembled into one deal snapshot.

use rust_decimal::Decimal;
use std::time::Instant;

use crate::error::UnderwritingError;
use crate::projections::project;
use crate::ratios::{debt_metrics, revenue_waterfall};
use crate::sensitivity::run_scenarios;
use crate::types::{
    with_metadata, CalculationInputs, CalculationResult, ComputationOutput,
    MAX_AMORTIZATION_YEARS, MAX_HOLD_PERIOD_YEARS,
};
use crate::UnderwritingResult;

/// Evaluate a deal end to end. The result is a pure function of the inputs:
/// re-running the same request reproduces every figure exactly.
pub fn evaluate(
    inputs: &CalculationInputs,
) -> UnderwritingResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_inputs(inputs)?;

    let waterfall = revenue_waterfall(inputs);
    let debt = debt_metrics(inputs, waterfall.net_operating_income);
    let projection = project(
        inputs,
        waterfall.net_operating_income,
        &debt,
        &mut warnings,
    );
    let sensitivity = run_scenarios(inputs);

    if waterfall.net_operating_income < Decimal::ZERO {
        warnings.push("NOI is negative: expenses exceed effective gross income".into());
    }

    let result = CalculationResult {
        gross_potential_rent: waterfall.gross_potential_rent,
        vacancy_loss: waterfall.vacancy_loss,
        net_rental_income: waterfall.net_rental_income,
        other_income: waterfall.other_income,
        effective_gross_income: waterfall.effective_gross_income,
        operating_expenses: waterfall.operating_expenses,
        net_operating_income: waterfall.net_operating_income,
        noi_margin_pct: waterfall.noi_margin_pct,

        loan_amount: debt.loan_amount,
        annual_debt_service: debt.annual_debt_service,
        annual_reserves: debt.annual_reserves,
        equity_required: debt.equity_required,
        dscr: debt.dscr,
        going_in_cap_rate_pct: debt.going_in_cap_rate_pct,
        cash_on_cash_pct: debt.cash_on_cash_pct,

        exit_value: projection.exit_value,
        sale_costs: projection.sale_costs,
        loan_balance_at_exit: projection.loan_balance_at_exit,
        net_sale_proceeds: projection.net_sale_proceeds,
        equity_multiple: projection.equity_multiple,
        irr_pct: projection.irr_pct,

        cash_flows: projection.cash_flows,
        sensitivity,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Agency Multifamily Underwriting Pipeline",
        inputs,
        warnings,
        elapsed,
        result,
    ))
}

fn validate_inputs(inputs: &CalculationInputs) -> UnderwritingResult<()> {
    if inputs.rent_per_unit < Decimal::ZERO {
        return Err(UnderwritingError::InvalidInput {
            field: "rent_per_unit".into(),
            reason: "Rent per unit cannot be negative".into(),
        });
    }
    if inputs.occupancy_pct < Decimal::ZERO || inputs.occupancy_pct > Decimal::ONE_HUNDRED {
        return Err(UnderwritingError::InvalidInput {
            field: "occupancy_pct".into(),
            reason: "Occupancy must be between 0 and 100".into(),
        });
    }
    if inputs.ltv_pct < Decimal::ZERO {
        return Err(UnderwritingError::InvalidInput {
            field: "ltv_pct".into(),
            reason: "LTV cannot be negative".into(),
        });
    }
    if inputs.hold_period_years == 0 {
        return Err(UnderwritingError::InvalidInput {
            field: "hold_period_years".into(),
            reason: "Hold period must be at least 1 year".into(),
        });
    }
    if inputs.hold_period_years > MAX_HOLD_PERIOD_YEARS {
        return Err(UnderwritingError::InvalidInput {
            field: "hold_period_years".into(),
            reason: format!("Hold period cannot exceed {MAX_HOLD_PERIOD_YEARS} years"),
        });
    }
    if inputs.amortization_years > MAX_AMORTIZATION_YEARS {
        return Err(UnderwritingError::InvalidInput {
            field: "amortization_years".into(),
            reason: format!("Amortization term cannot exceed {MAX_AMORTIZATION_YEARS} years"),
        });
    }
    Ok(())
}

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{round_currency, round_margin, CalculationInputs, Money, Pct};

/// Other income estimated as a share of net rental income when no actual
/// figure has been entered yet.
pub const DEFAULT_OTHER_INCOME_RATIO_PCT: Decimal = dec!(13.5);

/// Expense ratio applied to EGI when actual operating expenses are absent.
pub const DEFAULT_EXPENSE_RATIO_PCT: Decimal = dec!(54.35);

/// Year-1 revenue waterfall: GPR → vacancy → EGI → OpEx → NOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueWaterfall {
    pub gross_potential_rent: Money,
    pub vacancy_loss: Money,
    pub net_rental_income: Money,
    pub other_income: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub net_operating_income: Money,
    pub noi_margin_pct: Pct,
}

/// Run the revenue waterfall for a deal. Actual other-income and expense
/// figures take precedence over the ratio estimates; every published line is
/// rounded half away from zero to cents so a recomputation reproduces the
/// stored snapshot.
pub fn revenue_waterfall(inputs: &CalculationInputs) -> RevenueWaterfall {
    let gross_potential_rent = round_currency(
        inputs.rent_per_unit * Decimal::from(inputs.unit_count) * dec!(12),
    );

    let vacancy_fraction = (dec!(100) - inputs.occupancy_pct) / dec!(100);
    let vacancy_loss = round_currency(gross_potential_rent * vacancy_fraction);
    let net_rental_income = gross_potential_rent - vacancy_loss;

    let other_income = match inputs.other_income {
        Some(actual) => round_currency(actual),
        None => {
            let ratio = inputs
                .other_income_ratio_pct
                .unwrap_or(DEFAULT_OTHER_INCOME_RATIO_PCT);
            round_currency(net_rental_income * ratio / dec!(100))
        }
    };

    let effective_gross_income = net_rental_income + other_income;

    let operating_expenses = match inputs.operating_expenses {
        Some(actual) => round_currency(actual),
        None => {
            let ratio = inputs.expense_ratio_pct.unwrap_or(DEFAULT_EXPENSE_RATIO_PCT);
            round_currency(effective_gross_income * ratio / dec!(100))
        }
    };

    let net_operating_income = effective_gross_income - operating_expenses;

    let noi_margin_pct = if effective_gross_income.is_zero() {
        Decimal::ZERO
    } else {
        round_margin(net_operating_income / effective_gross_income * dec!(100))
    };

    RevenueWaterfall {
        gross_potential_rent,
        vacancy_loss,
        net_rental_income,
        other_income,
        effective_gross_income,
        operating_expenses,
        net_operating_income,
        noi_margin_pct,
    }
}

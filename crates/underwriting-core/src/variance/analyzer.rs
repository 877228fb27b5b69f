use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{
    round_currency, round_ratio, with_metadata, CalculationResult, ComputationOutput, Money, Pct,
};

// Absolute percentage variance bucket edges
const ON_TRACK_BELOW_PCT: Decimal = dec!(5);
const WARNING_BELOW_PCT: Decimal = dec!(15);

/// One month of reported operating actuals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyActual {
    pub period: NaiveDate,
    pub revenue: Money,
    pub operating_expenses: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceInput {
    pub projection: CalculationResult,
    pub actuals: Vec<MonthlyActual>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarianceStatus {
    OnTrack,
    Warning,
    Critical,
}

impl std::fmt::Display for VarianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VarianceStatus::OnTrack => "On Track",
            VarianceStatus::Warning => "Warning",
            VarianceStatus::Critical => "Critical",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceLine {
    pub metric: String,
    pub projected: Decimal,
    pub actual_annualized: Decimal,
    pub variance_pct: Pct,
    pub status: VarianceStatus,
}

/// Projection-versus-actuals comparison. `line_items` is empty when no
/// actual periods were reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceReport {
    pub months_reported: u32,
    pub line_items: Vec<VarianceLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_status: Option<VarianceStatus>,
}

pub fn variance_status(abs_variance_pct: Pct) -> VarianceStatus {
    if abs_variance_pct < ON_TRACK_BELOW_PCT {
        VarianceStatus::OnTrack
    } else if abs_variance_pct < WARNING_BELOW_PCT {
        VarianceStatus::Warning
    } else {
        VarianceStatus::Critical
    }
}

/// Annualize partial-year actuals and bucket each line item's absolute
/// percentage variance against the stored projection. Zero reported periods
/// yields a neutral empty report, not a fault.
pub fn calculate_variance(input: &VarianceInput) -> ComputationOutput<VarianceReport> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let months = input.actuals.len() as u32;
    let report = if months == 0 {
        warnings.push("No actual periods reported; variance is neutral".to_string());
        VarianceReport {
            months_reported: 0,
            line_items: Vec::new(),
            overall_status: None,
        }
    } else {
        build_report(&input.projection, &input.actuals, months)
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "months_reported": months,
        "annualization": "x12_over_months",
    });

    with_metadata(
        "Projection Variance Analysis",
        &assumptions,
        warnings,
        elapsed,
        report,
    )
}

fn build_report(
    projection: &CalculationResult,
    actuals: &[MonthlyActual],
    months: u32,
) -> VarianceReport {
    let total_revenue: Money = actuals.iter().map(|a| a.revenue).sum();
    let total_opex: Money = actuals.iter().map(|a| a.operating_expenses).sum();

    let factor = dec!(12) / Decimal::from(months);
    let annual_revenue = round_currency(total_revenue * factor);
    let annual_opex = round_currency(total_opex * factor);
    let annual_noi = annual_revenue - annual_opex;

    let actual_cash_flow =
        annual_noi - projection.annual_debt_service - projection.annual_reserves;
    let actual_coc = if projection.equity_required.is_zero() {
        Decimal::ZERO
    } else {
        round_ratio(actual_cash_flow / projection.equity_required * dec!(100))
    };

    let line_items = vec![
        line("Revenue", projection.effective_gross_income, annual_revenue),
        line(
            "Operating Expenses",
            projection.operating_expenses,
            annual_opex,
        ),
        line("NOI", projection.net_operating_income, annual_noi),
        line("Cash-on-Cash", projection.cash_on_cash_pct, actual_coc),
    ];

    let overall_status = line_items.iter().map(|l| l.status).max();

    VarianceReport {
        months_reported: months,
        line_items,
        overall_status,
    }
}

fn line(metric: &str, projected: Decimal, actual: Decimal) -> VarianceLine {
    // A zero projection is a data-entry placeholder; report zero variance
    // rather than faulting
    let variance_pct = if projected.is_zero() {
        Decimal::ZERO
    } else {
        round_ratio(((actual - projected) / projected * dec!(100)).abs())
    };
    VarianceLine {
        metric: metric.to_string(),
        projected,
        actual_annualized: actual,
        variance_pct,
        status: variance_status(variance_pct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::evaluate;
    use crate::types::CalculationInputs;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn projection() -> CalculationResult {
        let inputs = CalculationInputs {
            rent_per_unit: dec!(1200),
            unit_count: 100,
            occupancy_pct: dec!(95),
            other_income: None,
            other_income_ratio_pct: None,
            operating_expenses: None,
            expense_ratio_pct: None,
            purchase_price: dec!(10_000_000),
            acquisition_costs: dec!(0),
            ltv_pct: dec!(65),
            interest_rate_pct: dec!(5.5),
            interest_only: false,
            amortization_years: 30,
            hold_period_years: 5,
            exit_cap_rate_pct: dec!(5.25),
            noi_growth_pct: vec![dec!(3)],
            agency: None,
            product: None,
        };
        evaluate(&inputs).unwrap().result
    }

    fn month(n: u32, revenue: Decimal, opex: Decimal) -> MonthlyActual {
        MonthlyActual {
            period: NaiveDate::from_ymd_opt(2026, n, 1).unwrap(),
            revenue,
            operating_expenses: opex,
        }
    }

    #[test]
    fn test_zero_periods_is_neutral_not_a_fault() {
        let input = VarianceInput {
            projection: projection(),
            actuals: vec![],
        };
        let out = calculate_variance(&input);
        let r = &out.result;

        assert_eq!(r.months_reported, 0);
        assert!(r.line_items.is_empty());
        assert_eq!(r.overall_status, None);
        assert!(out.warnings.iter().any(|w| w.contains("neutral")));
    }

    #[test]
    fn test_on_track_when_actuals_match_projection() {
        let p = projection();
        // Six months tracking the projection exactly
        let monthly_rev = p.effective_gross_income / dec!(12);
        let monthly_opex = p.operating_expenses / dec!(12);
        let actuals: Vec<MonthlyActual> =
            (1..=6).map(|n| month(n, monthly_rev, monthly_opex)).collect();

        let out = calculate_variance(&VarianceInput { projection: p, actuals });
        let r = &out.result;

        assert_eq!(r.months_reported, 6);
        assert_eq!(r.line_items.len(), 4);
        for item in &r.line_items {
            assert!(item.variance_pct < dec!(0.1), "{} drifted", item.metric);
            assert_eq!(item.status, VarianceStatus::OnTrack);
        }
        assert_eq!(r.overall_status, Some(VarianceStatus::OnTrack));
    }

    #[test]
    fn test_annualization_scales_partial_year() {
        let p = projection();
        // Three months at $120,000 revenue annualize to $1,440,000
        let actuals: Vec<MonthlyActual> =
            (1..=3).map(|n| month(n, dec!(120_000), dec!(70_000))).collect();

        let out = calculate_variance(&VarianceInput { projection: p, actuals });
        let revenue = &out.result.line_items[0];

        assert_eq!(revenue.metric, "Revenue");
        assert_eq!(revenue.actual_annualized, dec!(1_440_000));
    }

    #[test]
    fn test_warning_and_critical_buckets() {
        let p = projection();
        // Revenue ~8% light, expenses ~25% heavy
        let monthly_rev = round_currency(p.effective_gross_income * dec!(0.92) / dec!(12));
        let monthly_opex = round_currency(p.operating_expenses * dec!(1.25) / dec!(12));
        let actuals: Vec<MonthlyActual> =
            (1..=4).map(|n| month(n, monthly_rev, monthly_opex)).collect();

        let out = calculate_variance(&VarianceInput { projection: p, actuals });
        let r = &out.result;

        let revenue = r.line_items.iter().find(|l| l.metric == "Revenue").unwrap();
        assert_eq!(revenue.status, VarianceStatus::Warning);

        let opex = r
            .line_items
            .iter()
            .find(|l| l.metric == "Operating Expenses")
            .unwrap();
        assert_eq!(opex.status, VarianceStatus::Critical);

        assert_eq!(r.overall_status, Some(VarianceStatus::Critical));
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(variance_status(dec!(0)), VarianceStatus::OnTrack);
        assert_eq!(variance_status(dec!(4.99)), VarianceStatus::OnTrack);
        assert_eq!(variance_status(dec!(5)), VarianceStatus::Warning);
        assert_eq!(variance_status(dec!(14.99)), VarianceStatus::Warning);
        assert_eq!(variance_status(dec!(15)), VarianceStatus::Critical);
        assert_eq!(variance_status(dec!(40)), VarianceStatus::Critical);
    }

    #[test]
    fn test_zero_projection_line_reports_zero_variance() {
        let mut p = projection();
        p.equity_required = Decimal::ZERO;
        p.cash_on_cash_pct = Decimal::ZERO;
        let actuals = vec![month(1, dec!(100_000), dec!(60_000))];

        let out = calculate_variance(&VarianceInput { projection: p, actuals });
        let coc = out
            .result
            .line_items
            .iter()
            .find(|l| l.metric == "Cash-on-Cash")
            .unwrap();
        assert_eq!(coc.variance_pct, dec!(0));
        assert_eq!(coc.status, VarianceStatus::OnTrack);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let p = projection();
        let actuals = vec![month(1, dec!(125_000), dec!(68_000))];
        let out = calculate_variance(&VarianceInput { projection: p, actuals });

        let json = serde_json::to_string(&out.result).unwrap();
        let back: VarianceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, out.result);
    }
}

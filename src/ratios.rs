//! Ratio formulas. Every function is pure and takes already-resolved scalars.
//!
//! Division goes through [`safe_division`], so a zero denominator yields NaN
//! instead of infinity or a panic.

use crate::resolver::ResolvedInputs;
use crate::schema::{RatioName, RatioValues};

pub fn safe_division(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return f64::NAN;
    }
    numerator / denominator
}

/// Add-back EBITDA: every component is taken in absolute value before summing.
pub fn ebitda(
    profit_after_tax: f64,
    taxation: f64,
    interest_expense: f64,
    depreciation: f64,
    administration_expense: f64,
) -> f64 {
    profit_after_tax.abs()
        + taxation.abs()
        + interest_expense.abs()
        + depreciation.abs()
        + administration_expense.abs()
}

pub fn leverage_ratio(total_liabilities: f64, total_equity: f64) -> f64 {
    safe_division(total_liabilities, total_equity)
}

pub fn gear_ratio(term_loan: f64, total_equity: f64) -> f64 {
    safe_division(term_loan, total_equity.abs())
}

// Shared numerator of ICR and DSCR. Components are absolute-valued; the
// denominators below deliberately keep the sign of interest_expense.
fn operating_cover(
    operating_profit: f64,
    interest_expense: f64,
    amortization: f64,
    depreciation: f64,
) -> f64 {
    operating_profit.abs() - (interest_expense.abs() + amortization.abs() + depreciation.abs())
}

pub fn interest_coverage_ratio(
    operating_profit: f64,
    interest_expense: f64,
    depreciation: f64,
    amortization: f64,
) -> f64 {
    safe_division(
        operating_cover(operating_profit, interest_expense, amortization, depreciation),
        interest_expense,
    )
}

pub fn debt_service_coverage_ratio(
    operating_profit: f64,
    interest_expense: f64,
    depreciation: f64,
    amortization: f64,
    principal_repayment: f64,
) -> f64 {
    safe_division(
        operating_cover(operating_profit, interest_expense, amortization, depreciation),
        interest_expense + principal_repayment,
    )
}

pub fn current_ratio(current_assets: f64, current_liabilities: f64) -> f64 {
    safe_division(current_assets, current_liabilities)
}

pub fn quick_ratio(current_assets: f64, current_liabilities: f64, inventory: f64) -> f64 {
    let inventory = if inventory.is_nan() { 0.0 } else { inventory };
    safe_division(current_assets - inventory, current_liabilities)
}

/// Computes all seven ratios for one period.
pub fn compute_ratios(inputs: &ResolvedInputs, principal_repayment: f64) -> RatioValues {
    let mut values = RatioValues::new();

    values.insert(
        RatioName::Ebitda,
        ebitda(
            inputs.profit_after_tax,
            inputs.taxation,
            inputs.interest_expense,
            inputs.depreciation,
            inputs.administration_expense,
        ),
    );
    values.insert(
        RatioName::LeverageRatio,
        leverage_ratio(inputs.total_liabilities, inputs.total_equity),
    );
    values.insert(
        RatioName::GearRatio,
        gear_ratio(inputs.term_loan, inputs.total_equity),
    );
    values.insert(
        RatioName::Icr,
        interest_coverage_ratio(
            inputs.operating_profit,
            inputs.interest_expense,
            inputs.depreciation,
            inputs.amortization,
        ),
    );
    values.insert(
        RatioName::Dscr,
        debt_service_coverage_ratio(
            inputs.operating_profit,
            inputs.interest_expense,
            inputs.depreciation,
            inputs.amortization,
            principal_repayment,
        ),
    );
    values.insert(
        RatioName::Cr,
        current_ratio(inputs.current_assets, inputs.current_liabilities),
    );
    values.insert(
        RatioName::Qr,
        quick_ratio(
            inputs.current_assets,
            inputs.current_liabilities,
            inputs.inventory,
        ),
    );

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_division() {
        assert!(safe_division(1.0, 0.0).is_nan());
        assert!(safe_division(0.0, 0.0).is_nan());
        assert!(safe_division(-5.0, -0.0).is_nan());
        assert_eq!(safe_division(3.0, 4.0), 0.75);
        assert_eq!(safe_division(-3.0, 2.0), -1.5);
    }

    #[test]
    fn test_ebitda_absolute_add_back() {
        assert_eq!(ebitda(-100.0, 20.0, -10.0, 5.0, -15.0), 150.0);
        assert_eq!(ebitda(0.0, 0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_leverage_and_gear() {
        assert_eq!(leverage_ratio(150.0, 50.0), 3.0);
        assert_eq!(leverage_ratio(150.0, -50.0), -3.0);
        assert!(leverage_ratio(150.0, 0.0).is_nan());

        assert_eq!(gear_ratio(25.0, -50.0), 0.5);
        assert!(gear_ratio(25.0, 0.0).is_nan());
    }

    #[test]
    fn test_icr_signed_denominator() {
        // numerator: 40 - (10 + 2 + 5) = 23
        assert_eq!(interest_coverage_ratio(40.0, 10.0, 5.0, 2.0), 2.3);
        // same numerator, negative interest flips the sign
        assert_eq!(interest_coverage_ratio(-40.0, -10.0, -5.0, -2.0), -2.3);
        assert!(interest_coverage_ratio(40.0, 0.0, 5.0, 2.0).is_nan());
    }

    #[test]
    fn test_dscr_adds_principal_repayment() {
        assert_eq!(debt_service_coverage_ratio(40.0, 10.0, 5.0, 2.0, 0.0), 2.3);
        assert_eq!(debt_service_coverage_ratio(40.0, 10.0, 5.0, 2.0, 13.0), 1.0);
        // interest -10 offset by a repayment of 10 gives a zero denominator
        assert!(debt_service_coverage_ratio(40.0, -10.0, 5.0, 2.0, 10.0).is_nan());
    }

    #[test]
    fn test_liquidity_ratios() {
        assert_eq!(current_ratio(200.0, 100.0), 2.0);
        assert_eq!(quick_ratio(200.0, 100.0, 20.0), 1.8);
        assert_eq!(quick_ratio(200.0, 100.0, f64::NAN), 2.0);
        assert!(quick_ratio(200.0, 0.0, 20.0).is_nan());
    }

    #[test]
    fn test_compute_ratios_has_every_ratio() {
        let values = compute_ratios(&ResolvedInputs::default(), 0.0);
        assert_eq!(values.len(), RatioName::ALL.len());
        assert_eq!(values[&RatioName::Ebitda], 0.0);
        assert!(values[&RatioName::LeverageRatio].is_nan());
    }
}

use crate::config::AnalysisContext;
use crate::engine::RatioEngine;
use crate::resolver::{matching_key, FieldResolver};
use crate::schema::{PeriodData, RatioName, RatioValues, StatusColor};
use crate::standards::StandardsTable;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field label → percentage change (e.g. `-10.0` for a 10% fall).
pub type Shocks = BTreeMap<String, f64>;

/// A named set of shocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct StressScenario {
    #[schemars(description = "Human readable scenario name (e.g. 'Mild Recession')")]
    pub name: String,

    #[schemars(
        description = "Map from statement field label to percentage change. Negative values decrease the field. Labels are matched case-insensitively against the period's fields."
    )]
    pub shocks: Shocks,
}

impl StressScenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shocks: Shocks::new(),
        }
    }

    pub fn with_shock(mut self, field: impl Into<String>, percent: f64) -> Self {
        self.shocks.insert(field.into(), percent);
        self
    }

    fn core(name: &str, assets: f64, liabilities: f64, interest: f64, profit: f64) -> Self {
        Self::new(name)
            .with_shock("Total Current Assets", assets)
            .with_shock("Total Current Liabilities", liabilities)
            .with_shock("Interest Expense", interest)
            .with_shock("Net Operating Profit", profit)
    }

    pub fn mild_recession() -> Self {
        Self::core("Mild Recession", -10.0, 5.0, 10.0, -15.0)
    }

    pub fn severe_recession() -> Self {
        Self::core("Severe Recession", -25.0, 15.0, 25.0, -35.0)
    }

    pub fn optimistic() -> Self {
        Self::core("Optimistic Scenario", 10.0, -5.0, -10.0, 20.0)
    }

    pub fn presets() -> Vec<Self> {
        vec![
            Self::mild_recession(),
            Self::severe_recession(),
            Self::optimistic(),
        ]
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(StressScenario);
        serde_json::to_string_pretty(&schema)
    }
}

/// Unclassified ratio values before and after the shocks.
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub original: RatioValues,
    pub stressed: RatioValues,
    pub shocks: Shocks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    Improved,
    Deteriorated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressConclusion {
    /// Ratios classified green after the shocks.
    pub green_after_stress: usize,
    pub total: usize,
    /// At least half of the ratios remain green.
    pub resilient: bool,
    pub changes: Vec<(RatioName, StatusChange)>,
}

impl StressReport {
    /// Percentage movement of a ratio; NaN when the original is zero or either side is NaN.
    pub fn change_pct(&self, ratio: RatioName) -> f64 {
        let original = self.original.get(&ratio).copied().unwrap_or(f64::NAN);
        let stressed = self.stressed.get(&ratio).copied().unwrap_or(f64::NAN);

        if original == 0.0 || original.is_nan() || stressed.is_nan() {
            return f64::NAN;
        }
        (stressed / original - 1.0) * 100.0
    }

    pub fn conclusion(&self, standards: &StandardsTable) -> StressConclusion {
        let mut green_after_stress = 0;
        let mut changes = Vec::new();

        for (ratio, original) in &self.original {
            let stressed = self.stressed.get(ratio).copied().unwrap_or(f64::NAN);
            let before = standards.classify(*ratio, *original).color;
            let after = standards.classify(*ratio, stressed).color;

            if after == StatusColor::Green {
                green_after_stress += 1;
            }

            if before != after {
                let change = if after == StatusColor::Green {
                    StatusChange::Improved
                } else {
                    StatusChange::Deteriorated
                };
                changes.push((*ratio, change));
            }
        }

        let total = self.original.len();
        StressConclusion {
            green_after_stress,
            total,
            resilient: green_after_stress * 2 >= total,
            changes,
        }
    }
}

/// Returns a copy of `data` with every shock applied.
///
/// Each shocked field's current value is resolved through the alias list of the
/// concept it belongs to, scaled by `1 + pct/100`, and written back under the
/// period's own key for that field. Fields the period does not contain are skipped.
pub fn apply_shocks(data: &PeriodData, shocks: &Shocks, resolver: &FieldResolver) -> PeriodData {
    let mut stressed = data.clone();

    for (field, percent) in shocks {
        let Some(key) = matching_key(data, field) else {
            warn!("Shock on '{}' skipped: field not present in period", field);
            continue;
        };

        let current = resolver.resolve_field(data, field);
        let shocked = current * (1.0 + percent / 100.0);
        debug!("Shock {}%: {} {} -> {}", percent, key, current, shocked);

        stressed.insert(key.to_string(), shocked);
    }

    stressed
}

pub struct StressEngine<'a> {
    engine: RatioEngine<'a>,
}

impl<'a> StressEngine<'a> {
    pub fn new(engine: RatioEngine<'a>) -> Self {
        Self { engine }
    }

    pub fn from_context(ctx: &'a AnalysisContext) -> Self {
        Self::new(RatioEngine::from_context(ctx))
    }

    pub fn stress(&self, data: &PeriodData, shocks: &Shocks) -> StressReport {
        self.stress_with_repayment(data, shocks, 0.0)
    }

    pub fn stress_with_repayment(
        &self,
        data: &PeriodData,
        shocks: &Shocks,
        principal_repayment: f64,
    ) -> StressReport {
        let resolver = FieldResolver::new(self.engine.mappings());
        let stressed_data = apply_shocks(data, shocks, &resolver);

        StressReport {
            original: self.engine.compute(data, principal_repayment),
            stressed: self.engine.compute(&stressed_data, principal_repayment),
            shocks: shocks.clone(),
        }
    }

    pub fn run_scenario(
        &self,
        data: &PeriodData,
        scenario: &StressScenario,
        principal_repayment: f64,
    ) -> StressReport {
        debug!("Running stress scenario '{}'", scenario.name);
        self.stress_with_repayment(data, &scenario.shocks, principal_repayment)
    }
}

pub fn stress(data: &PeriodData, shocks: &Shocks, ctx: &AnalysisContext) -> StressReport {
    StressEngine::from_context(ctx).stress(data, shocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::FieldMappings;

    fn period() -> PeriodData {
        [
            ("Total Current Assets", 200.0),
            ("Total Current Liabilities", 100.0),
            ("Total Equity", 50.0),
            ("Total Liabilities", 150.0),
            ("Interest Expense", 10.0),
            ("Net Operating Profit", 40.0),
            ("Depreciation", 5.0),
            ("Amortization", 2.0),
            ("Inventory", 20.0),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
    }

    fn assert_same(a: &RatioValues, b: &RatioValues) {
        assert_eq!(a.len(), b.len());
        for (ratio, value) in a {
            assert_eq!(value.to_bits(), b[ratio].to_bits(), "{} differs", ratio);
        }
    }

    #[test]
    fn test_no_shocks_is_identity() {
        let ctx = AnalysisContext::default();
        let report = stress(&period(), &Shocks::new(), &ctx);
        assert_same(&report.original, &report.stressed);
    }

    #[test]
    fn test_zero_percent_shock_is_identity() {
        let ctx = AnalysisContext::default();
        let shocks = Shocks::from([("Total Equity".to_string(), 0.0)]);
        let report = stress(&period(), &shocks, &ctx);
        assert_same(&report.original, &report.stressed);
    }

    #[test]
    fn test_shock_only_touches_named_field() {
        let mappings = FieldMappings::builtin();
        let resolver = FieldResolver::new(&mappings);
        let data = period();
        let shocks = Shocks::from([("total current assets".to_string(), -10.0)]);

        let stressed = apply_shocks(&data, &shocks, &resolver);

        assert_eq!(stressed["Total Current Assets"], 180.0);
        assert_eq!(data["Total Current Assets"], 200.0);
        for (key, value) in &data {
            if key != "Total Current Assets" {
                assert_eq!(stressed[key], *value);
            }
        }
        assert_eq!(stressed.len(), data.len());
    }

    #[test]
    fn test_absent_field_is_skipped() {
        let mappings = FieldMappings::builtin();
        let resolver = FieldResolver::new(&mappings);
        let shocks = Shocks::from([("Term Loan".to_string(), 50.0)]);

        let stressed = apply_shocks(&period(), &shocks, &resolver);
        assert_eq!(stressed, period());
    }

    #[test]
    fn test_stress_changes_liquidity() {
        let ctx = AnalysisContext::default();
        let shocks = Shocks::from([
            ("Total Current Assets".to_string(), -25.0),
            ("Total Current Liabilities".to_string(), 50.0),
        ]);
        let report = stress(&period(), &shocks, &ctx);

        assert_eq!(report.original[&RatioName::Cr], 2.0);
        assert_eq!(report.stressed[&RatioName::Cr], 1.0);
        assert_eq!(report.change_pct(RatioName::Cr), -50.0);
        assert_eq!(report.shocks, shocks);

        let conclusion = report.conclusion(&ctx.standards);
        assert!(conclusion
            .changes
            .contains(&(RatioName::Cr, StatusChange::Deteriorated)));
    }

    #[test]
    fn test_change_pct_on_zero_original() {
        let ctx = AnalysisContext::default();
        let report = stress(&PeriodData::new(), &Shocks::new(), &ctx);
        assert!(report.change_pct(RatioName::Ebitda).is_nan());
        assert!(report.change_pct(RatioName::Cr).is_nan());
    }

    #[test]
    fn test_presets() {
        let presets = StressScenario::presets();
        assert_eq!(presets.len(), 3);
        let severe = StressScenario::severe_recession();
        assert_eq!(severe.shocks["Net Operating Profit"], -35.0);
        assert_eq!(severe.shocks["Total Current Liabilities"], 15.0);

        let ctx = AnalysisContext::default();
        let report = StressEngine::from_context(&ctx).run_scenario(&period(), &severe, 0.0);
        assert!(report.stressed[&RatioName::Cr] < report.original[&RatioName::Cr]);
        assert!(report.stressed[&RatioName::Icr] < report.original[&RatioName::Icr]);
    }

    #[test]
    fn test_resilience_conclusion() {
        let ctx = AnalysisContext::default();
        let report = stress(&period(), &Shocks::new(), &ctx);
        let conclusion = report.conclusion(&ctx.standards);

        // all seven ratios are green for this period
        assert_eq!(conclusion.green_after_stress, 7);
        assert_eq!(conclusion.total, 7);
        assert!(conclusion.resilient);
        assert!(conclusion.changes.is_empty());
    }
}

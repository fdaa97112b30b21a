//! # Credit Ratio Engine
//!
//! A library for turning multi-year financial statements into credit-risk ratios,
//! tiered classifications, and a preliminary loan decision.
//!
//! ## Core Concepts
//!
//! - **Period Data**: One reporting period's line items, keyed by whatever label the
//!   source document used ("Finance Cost", "Interest Expense", ...)
//! - **Field Mappings**: Canonical concept → ordered aliases, used to resolve labels
//! - **Ratios**: EBITDA, Leverage, Gearing, ICR, DSCR, Current and Quick ratios
//! - **Standards**: Ordered half-open tiers per ratio, each with a message and color
//! - **Decision**: The number of green ratios in an anchor period (latest audited,
//!   earliest projected) mapped to APPROVE / CONSIDER / REJECT
//! - **Stress Testing**: Percentage shocks on line items, compared before and after
//!
//! Numeric edge cases never produce errors: missing fields resolve to 0, zero
//! denominators produce NaN, and NaN classifies as "Invalid".
//!
//! ## Example
//!
//! ```rust,ignore
//! use credit_ratio_engine::*;
//!
//! let statements = FinancialStatements::from_json_str(r#"{
//!     "audited-2080": {
//!         "Total Current Assets": 200, "Total Current Liabilities": 100,
//!         "Total Equity": 50, "Total Liabilities": 150,
//!         "Interest Expense": 10, "Net Operating Profit": 40
//!     }
//! }"#).unwrap();
//!
//! let ctx = AnalysisContext::default();
//! let assessment = assess(&statements, &ctx, &RepaymentSchedule::default()).unwrap();
//! println!("{:?}", assessment.decision_for("audited-2080"));
//! ```

pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod mappings;
pub mod periods;
pub mod ratios;
pub mod resolver;
pub mod schema;
pub mod standards;
pub mod stress;
pub mod trends;

pub use config::{AnalysisContext, CreditPolicy};
pub use decision::{decide, decide_from_count, LoanDecision, TierCounts};
pub use engine::{aggregate, RatioEngine};
pub use error::{CreditAnalysisError, Result};
pub use ingestion::FinancialStatements;
pub use mappings::{Concept, FieldMappings};
pub use periods::{extract_year, is_audited, is_projected, PeriodIndex, PeriodKind, RepaymentSchedule};
pub use ratios::safe_division;
pub use resolver::{find, resolve, FieldResolver, ResolvedInputs};
pub use schema::*;
pub use standards::{StandardsTable, Tier};
pub use stress::{stress, Shocks, StressConclusion, StressEngine, StressReport, StressScenario};
pub use trends::{
    assess_trend, period_over_period, PeriodComparison, RatioChange, TrendAssessment,
    TrendDirection,
};

use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct PeriodAssessment {
    pub label: String,
    pub kind: PeriodKind,
    pub year: i32,
    pub principal_repayment: f64,
    pub ratios: RatioSet,
    pub counts: TierCounts,
    /// Only set for anchor periods with at least one classified ratio.
    pub decision: Option<LoanDecision>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditAssessment {
    /// Periods in chronological order (audited, projected, other).
    pub periods: Vec<PeriodAssessment>,
    pub index: PeriodIndex,
}

impl CreditAssessment {
    pub fn period(&self, label: &str) -> Option<&PeriodAssessment> {
        self.periods.iter().find(|p| p.label == label)
    }

    pub fn ratios_for(&self, label: &str) -> Option<&RatioSet> {
        self.period(label).map(|p| &p.ratios)
    }

    pub fn decision_for(&self, label: &str) -> Option<LoanDecision> {
        self.period(label).and_then(|p| p.decision)
    }

    pub fn anchors(&self) -> Vec<&PeriodAssessment> {
        self.index
            .anchor_periods()
            .into_iter()
            .filter_map(|label| self.period(label))
            .collect()
    }

    pub fn ratios_by_period(&self) -> BTreeMap<String, RatioSet> {
        self.periods
            .iter()
            .map(|p| (p.label.clone(), p.ratios.clone()))
            .collect()
    }

    /// First-to-last trend of `ratio` across the periods of one kind.
    pub fn trend(&self, ratio: RatioName, kind: PeriodKind) -> Option<TrendAssessment> {
        let labels: Vec<&str> = match kind {
            PeriodKind::Audited => self.index.audited.iter().map(String::as_str).collect(),
            PeriodKind::Projected => self.index.projected.iter().map(String::as_str).collect(),
            PeriodKind::Other => self.index.other.iter().map(String::as_str).collect(),
        };
        assess_trend(ratio, &labels, &self.ratios_by_period())
    }

    /// Every ratio of the latest audited period against the earliest projected one.
    /// `None` unless both periods exist.
    pub fn audited_to_projected(&self) -> Option<PeriodComparison> {
        let audited = self.index.latest_audited()?;
        let projected = self.index.earliest_projected()?;

        Some(PeriodComparison::between(
            audited,
            self.ratios_for(audited)?,
            projected,
            self.ratios_for(projected)?,
        ))
    }
}

pub struct CreditAnalysisProcessor;

impl CreditAnalysisProcessor {
    pub fn process(
        statements: &FinancialStatements,
        ctx: &AnalysisContext,
        repayments: &RepaymentSchedule,
    ) -> Result<CreditAssessment> {
        validate_context(ctx)?;

        info!(
            "Assessing {} reporting period(s)",
            statements.periods.len()
        );

        let engine = RatioEngine::from_context(ctx);
        let index = PeriodIndex::from_labels(statements.labels());
        let anchors = index.anchor_periods();

        let mut periods = Vec::with_capacity(index.len());

        for label in index.chronological() {
            let Some(data) = statements.period(label) else {
                continue;
            };

            let principal_repayment = repayments.for_period(label);
            let ratios = engine.aggregate(data, principal_repayment);
            let counts = TierCounts::from_ratios(&ratios);

            let decision = if anchors.contains(&label) {
                decide(&ratios, &ctx.policy)
            } else {
                None
            };

            debug!(
                "Period {}: {} green, {} yellow, {} red, decision {:?}",
                label, counts.green, counts.yellow, counts.red, decision
            );

            periods.push(PeriodAssessment {
                label: label.to_string(),
                kind: PeriodKind::of(label),
                year: extract_year(label),
                principal_repayment,
                ratios,
                counts,
                decision,
            });
        }

        for anchor in &anchors {
            if let Some(p) = periods.iter().find(|p| p.label == *anchor) {
                match p.decision {
                    Some(decision) => info!("Anchor period {}: {}", anchor, decision.label()),
                    None => info!("Anchor period {}: no ratios could be classified", anchor),
                }
            }
        }

        Ok(CreditAssessment { periods, index })
    }
}

pub fn assess(
    statements: &FinancialStatements,
    ctx: &AnalysisContext,
    repayments: &RepaymentSchedule,
) -> Result<CreditAssessment> {
    CreditAnalysisProcessor::process(statements, ctx, repayments)
}

fn validate_context(ctx: &AnalysisContext) -> Result<()> {
    CreditPolicy::new(ctx.policy.accept_threshold, ctx.policy.reject_threshold)?;
    ctx.standards.validate()?;
    Ok(())
}

use crate::config::AnalysisContext;
use crate::mappings::FieldMappings;
use crate::ratios::compute_ratios;
use crate::resolver::FieldResolver;
use crate::schema::{PeriodData, RatioName, RatioRecord, RatioSet, RatioValues, Status};
use crate::standards::StandardsTable;
use log::debug;

/// Per-period ratio aggregation: resolve → calculate → classify.
///
/// Holds only borrowed, read-only configuration, so one engine can be reused
/// for any number of periods.
pub struct RatioEngine<'a> {
    mappings: &'a FieldMappings,
    standards: &'a StandardsTable,
}

impl<'a> RatioEngine<'a> {
    pub fn new(mappings: &'a FieldMappings, standards: &'a StandardsTable) -> Self {
        Self {
            mappings,
            standards,
        }
    }

    pub fn from_context(ctx: &'a AnalysisContext) -> Self {
        Self::new(&ctx.mappings, &ctx.standards)
    }

    pub fn mappings(&self) -> &'a FieldMappings {
        self.mappings
    }

    pub fn standards(&self) -> &'a StandardsTable {
        self.standards
    }

    /// Raw ratio values without classification.
    pub fn compute(&self, data: &PeriodData, principal_repayment: f64) -> RatioValues {
        let inputs = FieldResolver::new(self.mappings).resolve_inputs(data);
        debug!("Resolved inputs: {:?}", inputs);

        compute_ratios(&inputs, principal_repayment)
    }

    pub fn classify(&self, ratio: RatioName, value: f64) -> Status {
        self.standards.classify(ratio, value)
    }

    pub fn aggregate(&self, data: &PeriodData, principal_repayment: f64) -> RatioSet {
        let ratios: RatioSet = self
            .compute(data, principal_repayment)
            .into_iter()
            .map(|(ratio, value)| {
                (
                    ratio,
                    RatioRecord::from_status(value, self.classify(ratio, value)),
                )
            })
            .collect();

        debug!("Ratios: {:?}", ratios);
        ratios
    }
}

pub fn aggregate(data: &PeriodData, principal_repayment: f64, ctx: &AnalysisContext) -> RatioSet {
    RatioEngine::from_context(ctx).aggregate(data, principal_repayment)
}

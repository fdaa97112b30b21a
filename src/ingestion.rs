use crate::error::{CreditAnalysisError, Result};
use crate::schema::PeriodData;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Multi-period statements keyed by period label (e.g. `audited-2080`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FinancialStatements {
    #[schemars(
        description = "Map from period label (e.g. 'audited-2080', 'projected-2081') to that period's line items. Each line item maps the label used in the source document to a numeric value."
    )]
    pub periods: BTreeMap<String, PeriodData>,
}

impl FinancialStatements {
    pub fn new(periods: BTreeMap<String, PeriodData>) -> Self {
        Self { periods }
    }

    /// Parses `{ "<period>": { "<field>": <number>, ... }, ... }`.
    ///
    /// Non-numeric line items are rejected here so that the ratio engine only ever
    /// sees well-typed numbers.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;

        let Value::Object(periods_obj) = root else {
            return Err(CreditAnalysisError::InvalidStatementFormat(
                "top level must be an object keyed by period label".to_string(),
            ));
        };

        let mut periods = BTreeMap::new();

        for (label, fields) in periods_obj {
            let Value::Object(fields_obj) = fields else {
                return Err(CreditAnalysisError::InvalidStatementFormat(format!(
                    "period '{}' must be an object of field values",
                    label
                )));
            };

            let mut data = PeriodData::new();
            for (field, value) in fields_obj {
                let number = value.as_f64().ok_or_else(|| CreditAnalysisError::NonNumericField {
                    period: label.clone(),
                    field: field.clone(),
                    value: value.to_string(),
                })?;
                data.insert(field, number);
            }

            debug!("Ingested period '{}' with {} fields", label, data.len());
            periods.insert(label, data);
        }

        Ok(Self { periods })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Statements reported in thousands, expanded to units.
    pub fn expand_thousands(&self) -> Self {
        self.scale(1000.0)
    }

    pub fn scale(&self, factor: f64) -> Self {
        let periods = self
            .periods
            .iter()
            .map(|(label, data)| {
                let scaled = data.iter().map(|(k, v)| (k.clone(), v * factor)).collect();
                (label.clone(), scaled)
            })
            .collect();
        Self { periods }
    }

    pub fn period(&self, label: &str) -> Option<&PeriodData> {
        self.periods.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.periods.keys().map(String::as_str)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(FinancialStatements);
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "audited-2080": {"Total Current Assets": 200, "Total Current Liabilities": 100.5},
        "projected-2081": {"Total Current Assets": -12.25}
    }"#;

    #[test]
    fn test_parses_periods() {
        let statements = FinancialStatements::from_json_str(SAMPLE).unwrap();
        assert_eq!(statements.periods.len(), 2);

        let audited = statements.period("audited-2080").unwrap();
        assert_eq!(audited["Total Current Assets"], 200.0);
        assert_eq!(audited["Total Current Liabilities"], 100.5);
        assert_eq!(
            statements.labels().collect::<Vec<_>>(),
            ["audited-2080", "projected-2081"]
        );
    }

    #[test]
    fn test_non_numeric_fails_fast() {
        let json = r#"{"audited-2080": {"Total Equity": "1,200"}}"#;
        let err = FinancialStatements::from_json_str(json).unwrap_err();
        match err {
            CreditAnalysisError::NonNumericField {
                period,
                field,
                value,
            } => {
                assert_eq!(period, "audited-2080");
                assert_eq!(field, "Total Equity");
                assert_eq!(value, "\"1,200\"");
            }
            other => panic!("unexpected error: {other}"),
        }

        let json = r#"{"audited-2080": {"Total Equity": null}}"#;
        assert!(FinancialStatements::from_json_str(json).is_err());
    }

    #[test]
    fn test_malformed_structure() {
        assert!(matches!(
            FinancialStatements::from_json_str("[1, 2]"),
            Err(CreditAnalysisError::InvalidStatementFormat(_))
        ));
        assert!(matches!(
            FinancialStatements::from_json_str(r#"{"audited-2080": 5}"#),
            Err(CreditAnalysisError::InvalidStatementFormat(_))
        ));
        assert!(matches!(
            FinancialStatements::from_json_str("{not json"),
            Err(CreditAnalysisError::SerializationError(_))
        ));
    }

    #[test]
    fn test_expand_thousands_to_units() {
        let statements = FinancialStatements::from_json_str(SAMPLE).unwrap();
        let scaled = statements.expand_thousands();

        assert_eq!(scaled.period("audited-2080").unwrap()["Total Current Assets"], 200_000.0);
        assert_eq!(scaled.period("projected-2081").unwrap()["Total Current Assets"], -12_250.0);
        assert_eq!(statements.period("audited-2080").unwrap()["Total Current Assets"], 200.0);
    }

    #[test]
    fn test_serde_transparent_round_trip() {
        let statements = FinancialStatements::from_json_str(SAMPLE).unwrap();
        let json = serde_json::to_string(&statements).unwrap();
        assert!(json.starts_with("{\"audited-2080\""));
        let back: FinancialStatements = serde_json::from_str(&json).unwrap();
        assert_eq!(back, statements);
    }
}

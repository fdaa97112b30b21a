//! Field resolution: maps free-text statement labels onto canonical concepts.
//!
//! Resolution is tolerant of casing and surrounding whitespace, and prefers the
//! first alias (in mapping order) that carries a non-zero value. When every match
//! is zero, or nothing matches at all, the concept resolves to 0. "Absent" and
//! "explicitly zero" are therefore indistinguishable through [`resolve`]; use
//! [`find`] when presence matters.

use crate::mappings::{Concept, FieldMappings};
use crate::schema::PeriodData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Scans `aliases` in order and returns the first non-zero match, the last zero
/// match if only zeros were found, or `None` when no alias is present.
pub fn find<S: AsRef<str>>(data: &PeriodData, aliases: &[S]) -> Option<f64> {
    let normalized: BTreeMap<String, f64> =
        data.iter().map(|(k, v)| (normalize(k), *v)).collect();

    let mut fallback = None;

    for alias in aliases {
        let alias = alias.as_ref();

        if let Some(&value) = data.get(alias) {
            if value != 0.0 {
                return Some(value);
            }
            fallback = Some(value);
        }

        if let Some(&value) = normalized.get(&normalize(alias)) {
            if value != 0.0 {
                return Some(value);
            }
            fallback = Some(value);
        }
    }

    fallback
}

/// Like [`find`], but missing fields silently resolve to 0.
pub fn resolve<S: AsRef<str>>(data: &PeriodData, aliases: &[S]) -> f64 {
    find(data, aliases).unwrap_or(0.0)
}

/// Locates the key in `data` that matches `field` after trimming and lower-casing.
pub fn matching_key<'d>(data: &'d PeriodData, field: &str) -> Option<&'d str> {
    if let Some((key, _)) = data.get_key_value(field) {
        return Some(key.as_str());
    }
    let needle = normalize(field);
    data.keys().find(|k| normalize(k) == needle).map(String::as_str)
}

/// Every scalar the ratio calculator needs, resolved for one period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedInputs {
    pub operating_profit: f64,
    pub interest_expense: f64,
    pub depreciation: f64,
    pub amortization: f64,
    pub taxation: f64,
    pub administration_expense: f64,
    pub profit_after_tax: f64,
    pub total_liabilities: f64,
    pub current_liabilities: f64,
    pub total_equity: f64,
    pub current_assets: f64,
    pub term_loan: f64,
    pub inventory: f64,
}

pub struct FieldResolver<'a> {
    mappings: &'a FieldMappings,
}

impl<'a> FieldResolver<'a> {
    pub fn new(mappings: &'a FieldMappings) -> Self {
        Self { mappings }
    }

    pub fn resolve(&self, data: &PeriodData, concept: Concept) -> f64 {
        resolve(data, self.mappings.aliases(concept))
    }

    pub fn find(&self, data: &PeriodData, concept: Concept) -> Option<f64> {
        find(data, self.mappings.aliases(concept))
    }

    /// Resolves a field named in a shock or override. The field's concept aliases
    /// are used when the field is a known alias; otherwise the field itself is
    /// the only alias.
    pub fn resolve_field(&self, data: &PeriodData, field: &str) -> f64 {
        match self.mappings.concept_for_field(field) {
            Some((_, aliases)) => resolve(data, aliases),
            None => resolve(data, &[field]),
        }
    }

    pub fn resolve_inputs(&self, data: &PeriodData) -> ResolvedInputs {
        ResolvedInputs {
            operating_profit: self.resolve(data, Concept::NetOperatingProfit),
            interest_expense: self.resolve(data, Concept::InterestExpense),
            depreciation: self.resolve(data, Concept::Depreciation),
            amortization: self.resolve(data, Concept::Amortization),
            taxation: self.resolve(data, Concept::Taxation),
            administration_expense: self.resolve(data, Concept::AdministrationExpenses),
            profit_after_tax: self.resolve(data, Concept::ProfitAfterTax),
            total_liabilities: self.resolve(data, Concept::TotalLiabilities),
            current_liabilities: self.resolve(data, Concept::TotalCurrentLiabilities),
            total_equity: self.resolve(data, Concept::TotalEquity),
            current_assets: self.resolve(data, Concept::TotalCurrentAssets),
            term_loan: self.resolve(data, Concept::TermLoan),
            inventory: self.resolve(data, Concept::Inventory),
        }
    }
}

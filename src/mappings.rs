use crate::error::{CreditAnalysisError, Result};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Canonical financial concepts the ratio calculator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Concept {
    NetOperatingProfit,
    InterestExpense,
    Depreciation,
    Amortization,
    Taxation,
    AdministrationExpenses,
    ProfitAfterTax,
    TotalLiabilities,
    TotalCurrentLiabilities,
    TotalEquity,
    TotalCurrentAssets,
    TermLoan,
    Inventory,
}

impl Concept {
    pub const ALL: [Concept; 13] = [
        Concept::NetOperatingProfit,
        Concept::InterestExpense,
        Concept::Depreciation,
        Concept::Amortization,
        Concept::Taxation,
        Concept::AdministrationExpenses,
        Concept::ProfitAfterTax,
        Concept::TotalLiabilities,
        Concept::TotalCurrentLiabilities,
        Concept::TotalEquity,
        Concept::TotalCurrentAssets,
        Concept::TermLoan,
        Concept::Inventory,
    ];

    /// The key used for this concept in the mapping file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Concept::NetOperatingProfit => "Net Operating Profit",
            Concept::InterestExpense => "Interest Expense",
            Concept::Depreciation => "Depreciation",
            Concept::Amortization => "Amortization",
            Concept::Taxation => "Taxation",
            Concept::AdministrationExpenses => "Administration Expenses",
            Concept::ProfitAfterTax => "Profit After Tax",
            Concept::TotalLiabilities => "Total Liabilities",
            Concept::TotalCurrentLiabilities => "Total Current Liabilities",
            Concept::TotalEquity => "Total Equity",
            Concept::TotalCurrentAssets => "Total Current Assets",
            Concept::TermLoan => "Term Loan",
            Concept::Inventory => "Inventory",
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BUILTIN_ALIASES: [(Concept, &[&str]); 13] = [
    (
        Concept::NetOperatingProfit,
        &[
            "Net Operating Profit",
            "Operating Profit",
            "Profit from Operations",
            "Operating Income",
            "Profit Before Interest and Tax",
            "EBIT",
        ],
    ),
    (
        Concept::InterestExpense,
        &[
            "Interest Expense",
            "Interest Expenses",
            "Finance Cost",
            "Finance Costs",
            "Interest Paid",
        ],
    ),
    (
        Concept::Depreciation,
        &["Depreciation", "Depreciation Expense", "Depreciation and Impairment"],
    ),
    (
        Concept::Amortization,
        &["Amortization", "Amortisation", "Amortization Expense"],
    ),
    (
        Concept::Taxation,
        &["Taxation", "Income Tax", "Income Tax Expense", "Tax Expense", "Provision for Tax"],
    ),
    (
        Concept::AdministrationExpenses,
        &[
            "Administration Expenses",
            "Administrative Expenses",
            "General and Administrative Expenses",
            "Office and Administration Expenses",
        ],
    ),
    (
        Concept::ProfitAfterTax,
        &["Profit After Tax", "Net Profit", "Net Income", "Profit for the Year", "PAT"],
    ),
    (
        Concept::TotalLiabilities,
        &["Total Liabilities", "Total Liability", "Liabilities"],
    ),
    (
        Concept::TotalCurrentLiabilities,
        &[
            "Total Current Liabilities",
            "Current Liabilities",
            "Current Liabilities and Provisions",
        ],
    ),
    (
        Concept::TotalEquity,
        &[
            "Total Equity",
            "Shareholders Equity",
            "Shareholders' Equity",
            "Net Worth",
            "Capital and Reserves",
        ],
    ),
    (
        Concept::TotalCurrentAssets,
        &["Total Current Assets", "Current Assets"],
    ),
    (
        Concept::TermLoan,
        &[
            "Term Loan",
            "Term Loans",
            "Term Loan and Finance",
            "Long Term Loan",
            "Long Term Borrowings",
            "Long Term Debt",
        ],
    ),
    (
        Concept::Inventory,
        &["Inventory", "Inventories", "Stock", "Closing Stock"],
    ),
];

/// Canonical concept → ordered alias table, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldMappings {
    #[schemars(
        description = "Map from canonical concept name (e.g. 'Total Equity') to the ordered list of field labels accepted for it. Earlier aliases take priority when several are present with non-zero values."
    )]
    pub field_mappings: BTreeMap<String, Vec<String>>,
}

impl FieldMappings {
    pub fn new(field_mappings: BTreeMap<String, Vec<String>>) -> Self {
        Self { field_mappings }
    }

    /// The alias table shipped with the crate, identical to `config/financial_mappings.json`.
    pub fn builtin() -> Self {
        let field_mappings = BUILTIN_ALIASES
            .iter()
            .map(|(concept, aliases)| {
                (
                    concept.as_str().to_string(),
                    aliases.iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect();
        Self { field_mappings }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let mappings: FieldMappings = serde_json::from_str(json)?;

        if mappings.field_mappings.is_empty() {
            return Err(CreditAnalysisError::InvalidMappingConfig(
                "field_mappings is empty".to_string(),
            ));
        }

        for (concept, aliases) in &mappings.field_mappings {
            if aliases.is_empty() {
                return Err(CreditAnalysisError::InvalidMappingConfig(format!(
                    "Concept '{}' has no aliases",
                    concept
                )));
            }
        }

        for concept in mappings.missing_concepts() {
            warn!(
                "Field mapping has no entry for '{}'; it will always resolve to 0",
                concept
            );
        }

        debug!(
            "Loaded field mappings for {} concepts",
            mappings.field_mappings.len()
        );

        Ok(mappings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CreditAnalysisError::MappingConfigNotFound(
                path.to_path_buf(),
            ));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Aliases for a canonical concept; empty when the concept is not mapped.
    pub fn aliases(&self, concept: Concept) -> &[String] {
        self.field_mappings
            .get(concept.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn missing_concepts(&self) -> Vec<Concept> {
        Concept::ALL
            .iter()
            .copied()
            .filter(|c| !self.field_mappings.contains_key(c.as_str()))
            .collect()
    }

    /// Finds the concept whose alias list contains `field` (case-insensitive).
    /// Returns the concept name together with its aliases.
    pub fn concept_for_field(&self, field: &str) -> Option<(&str, &[String])> {
        let needle = field.trim().to_lowercase();
        self.field_mappings
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a.trim().to_lowercase() == needle))
            .map(|(name, aliases)| (name.as_str(), aliases.as_slice()))
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(FieldMappings);
        serde_json::to_string_pretty(&schema)
    }
}

impl Default for FieldMappings {
    fn default() -> Self {
        Self::builtin()
    }
}

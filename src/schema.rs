use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One reporting period's line items, keyed by the free-text label found in the
/// source document.
pub type PeriodData = BTreeMap<String, f64>;

/// Raw ratio values (no classification) keyed by ratio.
pub type RatioValues = BTreeMap<RatioName, f64>;

/// Classified ratios for a single period.
pub type RatioSet = BTreeMap<RatioName, RatioRecord>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum RatioName {
    #[serde(rename = "EBITDA")]
    #[schemars(description = "Earnings before interest, taxes, depreciation and amortization (add-back of absolute components). Informational only.")]
    Ebitda,

    #[serde(rename = "Leverage Ratio")]
    #[schemars(description = "Total liabilities divided by total equity")]
    LeverageRatio,

    #[serde(rename = "Gear Ratio")]
    #[schemars(description = "Term loan divided by the absolute total equity")]
    GearRatio,

    #[serde(rename = "ICR")]
    #[schemars(description = "Interest coverage ratio")]
    Icr,

    #[serde(rename = "DSCR")]
    #[schemars(description = "Debt service coverage ratio, including principal repayment")]
    Dscr,

    #[serde(rename = "CR")]
    #[schemars(description = "Current ratio: current assets over current liabilities")]
    Cr,

    #[serde(rename = "QR")]
    #[schemars(description = "Quick ratio: current assets less inventory, over current liabilities")]
    Qr,
}

impl RatioName {
    pub const ALL: [RatioName; 7] = [
        RatioName::Ebitda,
        RatioName::LeverageRatio,
        RatioName::GearRatio,
        RatioName::Icr,
        RatioName::Dscr,
        RatioName::Cr,
        RatioName::Qr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RatioName::Ebitda => "EBITDA",
            RatioName::LeverageRatio => "Leverage Ratio",
            RatioName::GearRatio => "Gear Ratio",
            RatioName::Icr => "ICR",
            RatioName::Dscr => "DSCR",
            RatioName::Cr => "CR",
            RatioName::Qr => "QR",
        }
    }

    /// EBITDA is reported but never counted toward the loan decision.
    pub fn counts_toward_decision(&self) -> bool {
        !matches!(self, RatioName::Ebitda)
    }

    /// For leverage a falling value is an improvement.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, RatioName::LeverageRatio)
    }
}

impl fmt::Display for RatioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatioName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatioName::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown ratio name: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl StatusColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusColor::Green => "green",
            StatusColor::Yellow => "yellow",
            StatusColor::Red => "red",
            StatusColor::Gray => "gray",
        }
    }
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one ratio value against its tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub tier: String,
    pub message: String,
    pub color: StatusColor,
}

impl Status {
    pub fn new(tier: impl Into<String>, message: impl Into<String>, color: StatusColor) -> Self {
        Self {
            tier: tier.into(),
            message: message.into(),
            color,
        }
    }

    pub fn invalid() -> Self {
        Self::new("Invalid", "Unable to calculate ratio", StatusColor::Red)
    }

    pub fn unknown() -> Self {
        Self::new("Unknown", "Unable to determine status", StatusColor::Gray)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RatioRecord {
    /// NaN when the underlying division had a zero denominator. Serialized as `null`.
    #[serde(with = "nan_as_null")]
    #[schemars(with = "Option<f64>")]
    pub value: f64,
    pub status: String,
    pub message: String,
    pub color: StatusColor,
}

impl RatioRecord {
    pub fn from_status(value: f64, status: Status) -> Self {
        Self {
            value,
            status: status.tier,
            message: status.message,
            color: status.color,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.value.is_nan()
    }
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_name_round_trips_through_display_names() {
        for ratio in RatioName::ALL {
            assert_eq!(ratio.as_str().parse::<RatioName>().unwrap(), ratio);
        }
        assert_eq!("leverage ratio".parse::<RatioName>().unwrap(), RatioName::LeverageRatio);
        assert!("Solvency".parse::<RatioName>().is_err());
    }

    #[test]
    fn test_ebitda_excluded_from_decision() {
        let counted: Vec<_> = RatioName::ALL
            .iter()
            .filter(|r| r.counts_toward_decision())
            .collect();
        assert_eq!(counted.len(), 6);
        assert!(!RatioName::Ebitda.counts_toward_decision());
    }

    #[test]
    fn test_nan_record_serializes_as_null() {
        let record = RatioRecord::from_status(f64::NAN, Status::invalid());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"value\":null"));
        assert!(json.contains("\"color\":\"red\""));

        let back: RatioRecord = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_nan());
        assert_eq!(back.status, "Invalid");
    }

    #[test]
    fn test_ratio_set_keys_use_display_names() {
        let mut set = RatioSet::new();
        set.insert(
            RatioName::LeverageRatio,
            RatioRecord::from_status(3.0, Status::new("strong", "ok", StatusColor::Green)),
        );
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"Leverage Ratio\""));
    }
}

use crate::error::{CreditAnalysisError, Result};
use crate::schema::{RatioName, Status, StatusColor};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named classification bucket covering the half-open interval `[min, max)`.
///
/// In JSON an unbounded side is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    #[serde(with = "lower_bound")]
    pub min: f64,
    #[serde(with = "upper_bound")]
    pub max: f64,
    pub message: String,
    pub color: StatusColor,
}

impl Tier {
    pub fn new(
        name: impl Into<String>,
        min: f64,
        max: f64,
        message: impl Into<String>,
        color: StatusColor,
    ) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            message: message.into(),
            color,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value < self.max
    }

    pub fn status(&self) -> Status {
        Status::new(self.name.clone(), self.message.clone(), self.color)
    }
}

/// Ratio → ordered tiers. Tiers are scanned in order and the first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardsTable {
    pub standards: BTreeMap<RatioName, Vec<Tier>>,
}

impl StandardsTable {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: StandardsTable = serde_json::from_str(json)?;
        table.validate()?;

        for ratio in RatioName::ALL {
            let gaps = table.coverage_gaps(ratio);
            if !gaps.is_empty() {
                warn!(
                    "Standards for {} leave {} uncovered interval(s): {:?}",
                    ratio,
                    gaps.len(),
                    gaps
                );
            }
        }

        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        for (ratio, tiers) in &self.standards {
            for tier in tiers {
                if tier.min.is_nan() || tier.max.is_nan() || tier.min >= tier.max {
                    return Err(CreditAnalysisError::InvalidStandards {
                        ratio: ratio.to_string(),
                        details: format!(
                            "Tier '{}' has an empty range [{}, {})",
                            tier.name, tier.min, tier.max
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn tiers(&self, ratio: RatioName) -> &[Tier] {
        self.standards
            .get(&ratio)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn with_tiers(mut self, ratio: RatioName, tiers: Vec<Tier>) -> Self {
        self.standards.insert(ratio, tiers);
        self
    }

    pub fn classify(&self, ratio: RatioName, value: f64) -> Status {
        if value.is_nan() {
            return Status::invalid();
        }

        match self.tiers(ratio).iter().find(|tier| tier.contains(value)) {
            Some(tier) => tier.status(),
            None => {
                warn!("No {} tier covers value {}", ratio, value);
                Status::unknown()
            }
        }
    }

    /// Intervals of the real line that no tier of `ratio` covers.
    pub fn coverage_gaps(&self, ratio: RatioName) -> Vec<(f64, f64)> {
        let mut intervals: Vec<(f64, f64)> = self
            .tiers(ratio)
            .iter()
            .map(|tier| (tier.min, tier.max))
            .collect();
        intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut gaps = Vec::new();
        let mut covered_to = f64::NEG_INFINITY;

        for (min, max) in intervals {
            if min > covered_to {
                gaps.push((covered_to, min));
            }
            covered_to = covered_to.max(max);
        }

        if covered_to < f64::INFINITY {
            gaps.push((covered_to, f64::INFINITY));
        }

        gaps
    }
}

fn coverage_tiers(action: &str) -> Vec<Tier> {
    vec![
        Tier::new(
            "strong",
            1.0,
            1.5,
            format!("Sufficient ability to {} (> 1)", action),
            StatusColor::Yellow,
        ),
        Tier::new(
            "high",
            1.5,
            f64::INFINITY,
            format!("High ability to {} (> 1.5)", action),
            StatusColor::Green,
        ),
        Tier::new(
            "weak",
            f64::NEG_INFINITY,
            1.0,
            format!("Insufficient ability to {} (< 1)", action),
            StatusColor::Red,
        ),
    ]
}

fn liquidity_tiers(kind: &str, strong_message: &str) -> Vec<Tier> {
    vec![
        Tier::new("strong", 1.0, 1.5, strong_message, StatusColor::Yellow),
        Tier::new(
            "high",
            1.5,
            f64::INFINITY,
            format!("High {} liquidity (> 1.5)", kind),
            StatusColor::Green,
        ),
        Tier::new(
            "weak",
            f64::NEG_INFINITY,
            1.0,
            format!("Weak {} liquidity (< 1)", kind),
            StatusColor::Red,
        ),
    ]
}

impl Default for StandardsTable {
    fn default() -> Self {
        let mut standards = BTreeMap::new();

        standards.insert(
            RatioName::Ebitda,
            vec![
                Tier::new(
                    "positive",
                    0.0,
                    f64::INFINITY,
                    "Positive EBITDA indicates the company is operationally profitable",
                    StatusColor::Green,
                ),
                Tier::new(
                    "negative",
                    f64::NEG_INFINITY,
                    0.0,
                    "Negative EBITDA indicates operational losses",
                    StatusColor::Red,
                ),
            ],
        );

        standards.insert(
            RatioName::LeverageRatio,
            vec![
                Tier::new("strong", 0.0, 4.0, "Good leverage level (≤ 4)", StatusColor::Green),
                Tier::new(
                    "high",
                    4.0,
                    f64::INFINITY,
                    "High leverage level (> 4)",
                    StatusColor::Red,
                ),
                Tier::new(
                    "weak",
                    f64::NEG_INFINITY,
                    0.0,
                    "Negative leverage level",
                    StatusColor::Red,
                ),
            ],
        );

        standards.insert(
            RatioName::GearRatio,
            vec![
                Tier::new(
                    "strong",
                    0.0,
                    0.5,
                    "Low gearing (≤ 0.5) – Strong financial structure",
                    StatusColor::Green,
                ),
                Tier::new(
                    "moderate",
                    0.5,
                    1.0,
                    "Moderate gearing (0.5 – 1.0) – Acceptable leverage",
                    StatusColor::Yellow,
                ),
                Tier::new(
                    "high",
                    1.0,
                    f64::INFINITY,
                    "High gearing (> 1.0) – Risk of over-leverage",
                    StatusColor::Red,
                ),
                Tier::new(
                    "invalid",
                    f64::NEG_INFINITY,
                    0.0,
                    "Negative gearing ratio – Check input values",
                    StatusColor::Red,
                ),
            ],
        );

        standards.insert(RatioName::Icr, coverage_tiers("cover interest expenses"));
        standards.insert(RatioName::Dscr, coverage_tiers("service debt"));
        standards.insert(
            RatioName::Cr,
            liquidity_tiers("short-term", "Good short-term liquidity (1-1.5)"),
        );
        standards.insert(
            RatioName::Qr,
            liquidity_tiers("quick", "Good quick liquidity (> 1)"),
        );

        Self { standards }
    }
}

mod lower_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

mod upper_bound {
    use serde::{Deserialize, Deserializer};

    pub use super::lower_bound::serialize;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

//! Period label conventions.
//!
//! Labels look like `audited-2079` or `Projected 2082`. Audited periods start with
//! "audit" or "current", projected ones with "project" or "previous" (case-insensitive),
//! and the first 4-digit run is the fiscal year used for ordering.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").unwrap());

pub fn is_audited(label: &str) -> bool {
    let label = label.to_lowercase();
    label.starts_with("audit") || label.starts_with("current")
}

pub fn is_projected(label: &str) -> bool {
    let label = label.to_lowercase();
    label.starts_with("project") || label.starts_with("previous")
}

/// Year embedded in a period label, or 0 when there is none.
pub fn extract_year(label: &str) -> i32 {
    YEAR_PATTERN
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Audited,
    Projected,
    Other,
}

impl PeriodKind {
    pub fn of(label: &str) -> Self {
        if is_audited(label) {
            PeriodKind::Audited
        } else if is_projected(label) {
            PeriodKind::Projected
        } else {
            PeriodKind::Other
        }
    }
}

/// Period labels grouped by kind; audited and projected groups are sorted by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodIndex {
    pub audited: Vec<String>,
    pub projected: Vec<String>,
    pub other: Vec<String>,
}

impl PeriodIndex {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();

        for label in labels {
            let label = label.as_ref().to_string();
            match PeriodKind::of(&label) {
                PeriodKind::Audited => index.audited.push(label),
                PeriodKind::Projected => index.projected.push(label),
                PeriodKind::Other => index.other.push(label),
            }
        }

        // stable: labels sharing a year keep their input order
        index.audited.sort_by_key(|l| extract_year(l));
        index.projected.sort_by_key(|l| extract_year(l));

        index
    }

    pub fn latest_audited(&self) -> Option<&str> {
        self.audited.last().map(String::as_str)
    }

    pub fn earliest_projected(&self) -> Option<&str> {
        self.projected.first().map(String::as_str)
    }

    /// The periods a loan decision is made for: latest audited, then earliest projected.
    pub fn anchor_periods(&self) -> Vec<&str> {
        let mut anchors = Vec::new();
        for label in [self.latest_audited(), self.earliest_projected()]
            .into_iter()
            .flatten()
        {
            if !anchors.contains(&label) {
                anchors.push(label);
            }
        }
        anchors
    }

    pub fn is_anchor(&self, label: &str) -> bool {
        self.anchor_periods().contains(&label)
    }

    /// Audited, then projected, then unclassified labels.
    pub fn chronological(&self) -> Vec<&str> {
        self.audited
            .iter()
            .chain(self.projected.iter())
            .chain(self.other.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.audited.len() + self.projected.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Principal repayment per period, feeding the DSCR denominator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    /// Applied to every period without an explicit entry.
    #[serde(default)]
    pub default: f64,
    #[serde(default)]
    pub per_period: BTreeMap<String, f64>,
}

impl RepaymentSchedule {
    pub fn uniform(amount: f64) -> Self {
        Self {
            default: amount,
            per_period: BTreeMap::new(),
        }
    }

    pub fn with_period(mut self, label: impl Into<String>, amount: f64) -> Self {
        self.per_period.insert(label.into(), amount);
        self
    }

    pub fn for_period(&self, label: &str) -> f64 {
        self.per_period.get(label).copied().unwrap_or(self.default)
    }
}

use crate::ratios::safe_division;
use crate::schema::{RatioName, RatioSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative change from `first` to `last`, in percent of `|first|`.
///
/// `None` when either value is NaN or `first` is zero.
pub fn series_change_pct(first: f64, last: f64) -> Option<f64> {
    if first.is_nan() || last.is_nan() || first == 0.0 {
        return None;
    }
    Some((last - first) / first.abs() * 100.0)
}

/// Whether a ratio moved in its favourable direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Higher value, or lower for leverage.
    Up,
    Down,
    /// Unchanged, or not comparable because a value is NaN.
    Flat,
}

impl TrendDirection {
    pub fn between(ratio: RatioName, previous: f64, current: f64) -> Self {
        if previous.is_nan() || current.is_nan() || previous == current {
            return TrendDirection::Flat;
        }
        let improved = if ratio.lower_is_better() {
            current < previous
        } else {
            current > previous
        };
        if improved {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Flat => "→",
        }
    }
}

/// Change of one ratio between the first and last of a run of periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAssessment {
    pub ratio: RatioName,
    pub from_period: String,
    pub to_period: String,
    pub change_pct: f64,
    pub direction: TrendDirection,
}

impl TrendAssessment {
    pub fn is_favourable(&self) -> bool {
        self.direction == TrendDirection::Up
    }

    pub fn summary(&self) -> String {
        if self.direction == TrendDirection::Flat {
            return format!(
                "{} unchanged from {} to {}",
                self.ratio, self.from_period, self.to_period
            );
        }
        format!(
            "{} {} by {:.2}% from {} to {}, which is {}",
            self.ratio,
            if self.change_pct > 0.0 { "increased" } else { "decreased" },
            self.change_pct.abs(),
            self.from_period,
            self.to_period,
            if self.is_favourable() {
                "positive"
            } else {
                "a concern"
            }
        )
    }
}

/// Assesses `ratio` between the first and last of `periods` (already in
/// chronological order). `None` for fewer than two periods or an undefined change.
pub fn assess_trend(
    ratio: RatioName,
    periods: &[&str],
    ratios_by_period: &BTreeMap<String, RatioSet>,
) -> Option<TrendAssessment> {
    if periods.len() < 2 {
        return None;
    }
    let first = *periods.first()?;
    let last = *periods.last()?;

    let value_at = |label: &str| {
        ratios_by_period
            .get(label)
            .and_then(|set| set.get(&ratio))
            .map(|record| record.value)
    };

    let (first_value, last_value) = (value_at(first)?, value_at(last)?);
    let change_pct = series_change_pct(first_value, last_value)?;

    Some(TrendAssessment {
        ratio,
        from_period: first.to_string(),
        to_period: last.to_string(),
        change_pct,
        direction: TrendDirection::between(ratio, first_value, last_value),
    })
}

/// Indicator between each pair of consecutive periods.
pub fn period_over_period(ratio: RatioName, values: &[f64]) -> Vec<TrendDirection> {
    values
        .windows(2)
        .map(|pair| TrendDirection::between(ratio, pair[0], pair[1]))
        .collect()
}

/// One ratio's movement between two periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioChange {
    pub ratio: RatioName,
    pub from: f64,
    pub to: f64,
    pub change: f64,
    /// `change / |from| * 100`; NaN when `from` is zero.
    pub change_pct: f64,
}

/// Ratio-by-ratio comparison of two periods, typically the latest audited
/// against the earliest projected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub from_period: String,
    pub to_period: String,
    /// Ratios invalid in either period are left out.
    pub changes: Vec<RatioChange>,
}

impl PeriodComparison {
    pub fn between(
        from_period: &str,
        from: &RatioSet,
        to_period: &str,
        to: &RatioSet,
    ) -> Self {
        let changes = from
            .iter()
            .filter_map(|(ratio, before)| {
                let after = to.get(ratio)?;
                if !before.is_valid() || !after.is_valid() {
                    return None;
                }
                let change = after.value - before.value;
                Some(RatioChange {
                    ratio: *ratio,
                    from: before.value,
                    to: after.value,
                    change,
                    change_pct: safe_division(change, before.value.abs()) * 100.0,
                })
            })
            .collect();

        Self {
            from_period: from_period.to_string(),
            to_period: to_period.to_string(),
            changes,
        }
    }

    pub fn change(&self, ratio: RatioName) -> Option<&RatioChange> {
        self.changes.iter().find(|c| c.ratio == ratio)
    }

    /// Ratios whose value rose.
    pub fn improvements(&self) -> Vec<RatioName> {
        self.changes
            .iter()
            .filter(|c| c.change > 0.0)
            .map(|c| c.ratio)
            .collect()
    }

    /// Ratios whose value fell.
    pub fn declines(&self) -> Vec<RatioName> {
        self.changes
            .iter()
            .filter(|c| c.change < 0.0)
            .map(|c| c.ratio)
            .collect()
    }

    /// Largest percentage change; the earliest ratio wins ties.
    pub fn best_metric(&self) -> Option<RatioName> {
        self.defined_pct()
            .reduce(|best, c| if c.change_pct > best.change_pct { c } else { best })
            .map(|c| c.ratio)
    }

    /// Smallest percentage change; the earliest ratio wins ties.
    pub fn worst_metric(&self) -> Option<RatioName> {
        self.defined_pct()
            .reduce(|worst, c| if c.change_pct < worst.change_pct { c } else { worst })
            .map(|c| c.ratio)
    }

    fn defined_pct(&self) -> impl Iterator<Item = &RatioChange> {
        self.changes.iter().filter(|c| !c.change_pct.is_nan())
    }
}

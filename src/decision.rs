use crate::config::CreditPolicy;
use crate::schema::{RatioSet, StatusColor};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanDecision {
    /// GREEN: in-principle approval.
    Approve,
    /// AMBER: approval subject to bringing red ratios to an acceptable level.
    Consider,
    /// RED: rejected.
    Reject,
    /// The green count sits strictly between the reject and accept thresholds,
    /// where none of the decision rules applies.
    Indeterminate,
}

impl LoanDecision {
    pub fn label(&self) -> &'static str {
        match self {
            LoanDecision::Approve => "GREEN",
            LoanDecision::Consider => "AMBER",
            LoanDecision::Reject => "RED",
            LoanDecision::Indeterminate => "INDETERMINATE",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoanDecision::Approve => {
                "In principle approval subject to approval from the concerned authority"
            }
            LoanDecision::Consider => {
                "In principle approval subject to aligning ratios (highlighted in red) to acceptable level"
            }
            LoanDecision::Reject => "Rejected",
            LoanDecision::Indeterminate => {
                "Green ratio count falls between the reject and accept thresholds; refer for manual review"
            }
        }
    }
}

impl fmt::Display for LoanDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message())
    }
}

/// Colour counts over the ratios that count toward a decision (EBITDA excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierCounts {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
}

impl TierCounts {
    pub fn from_ratios(ratios: &RatioSet) -> Self {
        let mut counts = Self::default();
        for (_, record) in ratios.iter().filter(|(r, _)| r.counts_toward_decision()) {
            match record.color {
                StatusColor::Green => counts.green += 1,
                StatusColor::Yellow => counts.yellow += 1,
                StatusColor::Red => counts.red += 1,
                StatusColor::Gray => {}
            }
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.green == 0 && self.yellow == 0 && self.red == 0
    }
}

/// Maps a green count to a decision. The rules are checked in order:
/// `>= accept` approves, `== reject` considers, `< reject` rejects.
pub fn decide_from_count(green: usize, policy: &CreditPolicy) -> LoanDecision {
    if green >= policy.accept_threshold {
        LoanDecision::Approve
    } else if green == policy.reject_threshold {
        LoanDecision::Consider
    } else if green < policy.reject_threshold {
        LoanDecision::Reject
    } else {
        LoanDecision::Indeterminate
    }
}

/// Returns `None` when no counted ratio carries a green, yellow or red status.
pub fn decide(ratios: &RatioSet, policy: &CreditPolicy) -> Option<LoanDecision> {
    let counts = TierCounts::from_ratios(ratios);
    if counts.is_empty() {
        return None;
    }
    Some(decide_from_count(counts.green, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RatioName, RatioRecord, Status};

    fn ratios_with_greens(greens: usize) -> RatioSet {
        RatioName::ALL
            .iter()
            .filter(|r| r.counts_toward_decision())
            .enumerate()
            .map(|(i, ratio)| {
                let color = if i < greens {
                    StatusColor::Green
                } else {
                    StatusColor::Red
                };
                (*ratio, RatioRecord::from_status(1.0, Status::new("t", "m", color)))
            })
            .chain(std::iter::once((
                RatioName::Ebitda,
                RatioRecord::from_status(10.0, Status::new("positive", "m", StatusColor::Green)),
            )))
            .collect()
    }

    #[test]
    fn test_decision_rules() {
        let policy = CreditPolicy::new(6, 3).unwrap();

        assert_eq!(decide(&ratios_with_greens(6), &policy), Some(LoanDecision::Approve));
        assert_eq!(decide(&ratios_with_greens(3), &policy), Some(LoanDecision::Consider));
        assert_eq!(decide(&ratios_with_greens(2), &policy), Some(LoanDecision::Reject));
        assert_eq!(decide(&ratios_with_greens(0), &policy), Some(LoanDecision::Reject));
    }

    #[test]
    fn test_gap_between_thresholds_is_indeterminate() {
        let policy = CreditPolicy::new(6, 3).unwrap();
        assert_eq!(decide(&ratios_with_greens(4), &policy), Some(LoanDecision::Indeterminate));
        assert_eq!(decide(&ratios_with_greens(5), &policy), Some(LoanDecision::Indeterminate));
    }

    #[test]
    fn test_ebitda_not_counted() {
        let counts = TierCounts::from_ratios(&ratios_with_greens(2));
        assert_eq!(counts.green, 2);
        assert_eq!(counts.red, 4);
    }

    #[test]
    fn test_equal_thresholds_approve_first() {
        let policy = CreditPolicy::new(3, 3).unwrap();
        assert_eq!(decide_from_count(3, &policy), LoanDecision::Approve);
        assert_eq!(decide_from_count(2, &policy), LoanDecision::Reject);
    }

    #[test]
    fn test_no_qualifying_ratios_yields_no_decision() {
        let gray: RatioSet = RatioName::ALL
            .iter()
            .map(|r| (*r, RatioRecord::from_status(1.0, Status::unknown())))
            .collect();
        assert_eq!(decide(&gray, &CreditPolicy::default()), None);
        assert_eq!(decide(&RatioSet::new(), &CreditPolicy::default()), None);
    }

    #[test]
    fn test_small_policy() {
        let policy = CreditPolicy::from_accept_threshold(2);
        assert_eq!(decide_from_count(2, &policy), LoanDecision::Approve);
        assert_eq!(decide_from_count(1, &policy), LoanDecision::Consider);
        assert_eq!(decide_from_count(0, &policy), LoanDecision::Reject);
    }
}

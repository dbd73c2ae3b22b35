//! Incentive policy and the credit it produces

use crate::{ContributorAward, IprType, Money, Points};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base reward for one IPR type. Read-only configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentivePolicy {
    pub ipr_type: IprType,
    /// Whole points shared among eligible staff and faculty
    pub base_points: u64,
    /// Amount shared among all eligible internal contributors
    pub base_incentive: Money,
}

impl IncentivePolicy {
    pub fn new(ipr_type: IprType, base_points: u64, base_incentive: Money) -> Self {
        Self {
            ipr_type,
            base_points,
            base_incentive,
        }
    }

    pub fn base_points(&self) -> Points {
        Points::whole(self.base_points)
    }
}

/// The reward computed once, when a disclosure is published
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveCredit {
    /// Sum of every contributor's incentive
    pub total_incentive: Money,
    /// Sum of every contributor's points
    pub total_points: Points,
    pub awards: Vec<ContributorAward>,
    pub credited_at: DateTime<Utc>,
    /// Whether built-in defaults stood in for a missing policy record
    #[serde(default)]
    pub used_default_policy: bool,
}

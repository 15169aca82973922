use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Contribution intensity bucket assigned by the upstream feed.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::FromRepr,
    strum_macros::EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ContributionLevel {
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Max = 4,
}

impl ContributionLevel {
    /// Position of this level in a five-colour palette.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for ContributionLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_repr(value).ok_or_else(|| format!("contribution level out of range: {value}"))
    }
}

impl From<ContributionLevel> for u8 {
    fn from(level: ContributionLevel) -> Self {
        level as u8
    }
}

/// Contributions made on a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    pub level: ContributionLevel,
}

/// Ordered per-day contributions.
pub type ContributionSeries = Vec<ContributionDay>;

/// Payload returned by the contributions API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResponse {
    /// Yearly totals keyed by year (or `lastYear`).
    #[serde(default)]
    pub total: BTreeMap<String, u32>,
    pub contributions: ContributionSeries,
}

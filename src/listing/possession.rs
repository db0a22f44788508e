use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Six months, approximated as 6 x 30 days
pub const NEW_LAUNCH_WINDOW_DAYS: i64 = 180;
pub const ONE_YEAR_DAYS: i64 = 365;

/// Display label derived from a listing date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PossessionStatus {
    #[serde(rename = "Ready to Move")]
    ReadyToMove,
    #[serde(rename = "New Launch")]
    NewLaunch,
    #[serde(rename = "Under Construction")]
    UnderConstruction,
    #[serde(rename = "After 1 Yr Possession")]
    AfterOneYear,
}

impl PossessionStatus {
    pub const ALL: [PossessionStatus; 4] = [
        Self::ReadyToMove,
        Self::NewLaunch,
        Self::UnderConstruction,
        Self::AfterOneYear,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ReadyToMove => "Ready to Move",
            Self::NewLaunch => "New Launch",
            Self::UnderConstruction => "Under Construction",
            Self::AfterOneYear => "After 1 Yr Possession",
        }
    }

    /// Parse a label, ignoring case
    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for PossessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label shown on a listing card. Never returns [`PossessionStatus::AfterOneYear`].
pub fn possession_status(listed_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> PossessionStatus {
    let Some(listed) = listed_date else {
        return PossessionStatus::ReadyToMove;
    };

    if listed <= now {
        PossessionStatus::ReadyToMove
    } else if listed <= now + Duration::days(NEW_LAUNCH_WINDOW_DAYS) {
        PossessionStatus::NewLaunch
    } else {
        PossessionStatus::UnderConstruction
    }
}

/// Bucket used by the status filter, which splits far-future dates off at one year
pub fn possession_bucket(listed_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> PossessionStatus {
    match possession_status(listed_date, now) {
        PossessionStatus::UnderConstruction
            if listed_date.is_some_and(|listed| listed > now + Duration::days(ONE_YEAR_DAYS)) =>
        {
            PossessionStatus::AfterOneYear
        }
        status => status,
    }
}

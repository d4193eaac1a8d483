use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::utils::ViewerError;

/// Time window of the historical series shown in the chart panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "year")]
    Year,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Today,
        Period::SevenDays,
        Period::ThirtyDays,
        Period::SixMonths,
        Period::Year,
    ];

    /// Name used on the wire and in commands
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::SevenDays => "7days",
            Period::ThirtyDays => "30days",
            Period::SixMonths => "6months",
            Period::Year => "year",
        }
    }

    /// Human readable option label
    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::SevenDays => "Last 7 Days",
            Period::ThirtyDays => "Last 30 Days",
            Period::SixMonths => "Last 6 Months",
            Period::Year => "This Year",
        }
    }

    /// Span covered by the period, `None` for the intraday session
    pub fn span(&self) -> Option<Duration> {
        match self {
            Period::Today => None,
            Period::SevenDays => Some(Duration::days(7)),
            Period::ThirtyDays => Some(Duration::days(30)),
            Period::SixMonths => Some(Duration::days(182)),
            Period::Year => Some(Duration::days(365)),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "1d" => Ok(Period::Today),
            "7days" | "7d" | "1w" => Ok(Period::SevenDays),
            "30days" | "30d" | "1m" => Ok(Period::ThirtyDays),
            "6months" | "6m" => Ok(Period::SixMonths),
            "year" | "1y" => Ok(Period::Year),
            _ => Err(ViewerError::InvalidPeriod(s.to_string())),
        }
    }
}

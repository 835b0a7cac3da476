// Data models for complaint tracking
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format used for every persisted representation of a submission date
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Characters of the details shown in the one-line list view
const PREVIEW_CHARS: usize = 30;

/// Highest tracking ID that can be issued or loaded.
/// `u32::MAX` is kept back so the counter after any valid ID still fits.
pub const MAX_TRACKING_ID: u32 = u32::MAX - 1;

/// Tracking IDs start at 1 and stay below `u32::MAX`
pub fn is_valid_tracking_id(tracking_id: u32) -> bool {
    (1..=MAX_TRACKING_ID).contains(&tracking_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCategory {
    TrashCollection,
    StreetLighting,
    WaterOutage,
    ExcessiveNoise,
    OtherMunicipal,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 5] = [
        IssueCategory::TrashCollection,
        IssueCategory::StreetLighting,
        IssueCategory::WaterOutage,
        IssueCategory::ExcessiveNoise,
        IssueCategory::OtherMunicipal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::TrashCollection => "TRASH_COLLECTION",
            IssueCategory::StreetLighting => "STREET_LIGHTING",
            IssueCategory::WaterOutage => "WATER_OUTAGE",
            IssueCategory::ExcessiveNoise => "EXCESSIVE_NOISE",
            IssueCategory::OtherMunicipal => "OTHER_MUNICIPAL",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for IssueCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("category", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Submitted,
    InReview,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Submitted,
        ComplaintStatus::InReview,
        ComplaintStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "SUBMITTED",
            ComplaintStatus::InReview => "IN_REVIEW",
            ComplaintStatus::Closed => "CLOSED",
        }
    }

    /// Submitted and in-review complaints count towards the trend report
    pub fn is_open(&self) -> bool {
        !matches!(self, ComplaintStatus::Closed)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("status", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// A single reported community issue.
///
/// `tracking_id` and `submission_date` are fixed at construction; only the
/// status can change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    tracking_id: u32,
    zone_number: i32,
    details: String,
    category: IssueCategory,
    status: ComplaintStatus,
    #[serde(with = "submission_date_format")]
    submission_date: NaiveDateTime,
}

impl Complaint {
    /// Create a freshly submitted complaint stamped with the current local time
    pub fn new(
        tracking_id: u32,
        zone_number: i32,
        details: String,
        category: IssueCategory,
    ) -> Self {
        Self {
            tracking_id,
            zone_number,
            details,
            category,
            status: ComplaintStatus::Submitted,
            submission_date: Local::now().naive_local().trunc_subsecs(0),
        }
    }

    /// Rebuild a complaint read back from storage
    pub fn from_parts(
        tracking_id: u32,
        zone_number: i32,
        details: String,
        category: IssueCategory,
        status: ComplaintStatus,
        submission_date: NaiveDateTime,
    ) -> Self {
        Self {
            tracking_id,
            zone_number,
            details,
            category,
            status,
            submission_date: submission_date.trunc_subsecs(0),
        }
    }

    pub fn tracking_id(&self) -> u32 {
        self.tracking_id
    }

    pub fn zone_number(&self) -> i32 {
        self.zone_number
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn category(&self) -> IssueCategory {
        self.category
    }

    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    pub fn submission_date(&self) -> NaiveDateTime {
        self.submission_date
    }

    pub fn formatted_date(&self) -> String {
        format_date(&self.submission_date)
    }

    pub(crate) fn set_status(&mut self, status: ComplaintStatus) {
        self.status = status;
    }
}

impl fmt::Display for Complaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.details.chars().take(PREVIEW_CHARS).collect();
        write!(
            f,
            "| ID: {:<5} | Zone: {:<4} | Category: {:<18} | Status: {:<12} | \
             Date: {} | Details: {}...",
            self.tracking_id,
            self.zone_number,
            self.category,
            self.status,
            self.formatted_date(),
            preview,
        )
    }
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
}

mod submission_date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(serde::de::Error::custom)
    }
}

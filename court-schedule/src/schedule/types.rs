use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::minutes_to_time_string;

/// Minutes since midnight, `0..1440`
pub type Minutes = u16;
pub type SlotId = u64;
pub type CourtId = u64;

pub const MINUTES_PER_DAY: Minutes = 24 * 60;

/// Half-open wall-clock range `[start, end)`.
///
/// `end <= start` is representable; validation always rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: Minutes,
    #[serde(with = "hhmm")]
    pub end: Minutes,
}

impl TimeRange {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }

    pub fn is_ordered(&self) -> bool {
        self.end > self.start
    }

    pub fn duration(&self) -> Minutes {
        self.end.saturating_sub(self.start)
    }

    /// True if `other` lies entirely inside this range
    pub fn encloses(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_minute(&self, minute: Minutes) -> bool {
        self.start <= minute && minute < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            minutes_to_time_string(self.start),
            minutes_to_time_string(self.end)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which per-court collection a slot belongs to. Slots only ever conflict
/// with slots of the same collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    OpeningHours,
    Tariffs,
}

/// Domain payload of a slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotKind {
    OpeningHours,
    Tariff { rate: f64 },
}

impl SlotKind {
    pub fn collection(&self) -> Collection {
        match self {
            SlotKind::OpeningHours => Collection::OpeningHours,
            SlotKind::Tariff { .. } => Collection::Tariffs,
        }
    }

    pub fn rate(&self) -> Option<f64> {
        match self {
            SlotKind::Tariff { rate } => Some(*rate),
            SlotKind::OpeningHours => None,
        }
    }
}

/// One schedulable interval of a court: an opening-hours entry or a tariff.
/// `day_of_week = None` applies to every day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SlotId>,
    pub court_id: CourtId,
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    pub range: TimeRange,
    pub kind: SlotKind,
}

impl DaySlot {
    pub fn scope(&self) -> SlotScope {
        SlotScope {
            court_id: self.court_id,
            collection: self.kind.collection(),
            day_of_week: self.day_of_week,
        }
    }
}

/// Partition key for overlap checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotScope {
    pub court_id: CourtId,
    pub collection: Collection,
    pub day_of_week: Option<DayOfWeek>,
}

mod hhmm {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Minutes;
    use crate::schedule::time::{minutes_to_time_string, parse_time_to_minutes};

    pub fn serialize<S: Serializer>(minutes: &Minutes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&minutes_to_time_string(*minutes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Minutes, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_time_to_minutes(&text).map_err(serde::de::Error::custom)
    }
}

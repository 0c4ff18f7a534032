use csv::Reader;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ScheduleError;
use crate::form::submission::parse_rate;
use crate::schedule::{parse_time_to_minutes, minutes_to_time_string};
use crate::schedule::{Collection, CourtId, DayOfWeek, DaySlot, SlotId, SlotKind, TimeRange};

/// One CSV row of a slot snapshot:
/// `id,court_id,kind,day_of_week,start,end,rate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SlotRecord {
    pub id: Option<SlotId>,
    pub court_id: CourtId,
    pub kind: Collection,
    pub day_of_week: Option<DayOfWeek>,
    pub start: String,
    pub end: String,
    pub rate: Option<f64>,
}

impl From<&DaySlot> for SlotRecord {
    fn from(slot: &DaySlot) -> Self {
        Self {
            id: slot.id,
            court_id: slot.court_id,
            kind: slot.kind.collection(),
            day_of_week: slot.day_of_week,
            start: minutes_to_time_string(slot.range.start),
            end: minutes_to_time_string(slot.range.end),
            rate: slot.kind.rate(),
        }
    }
}

impl SlotRecord {
    fn into_slot(self) -> Result<DaySlot, ScheduleError> {
        let range = TimeRange::new(parse_time_to_minutes(&self.start)?, parse_time_to_minutes(&self.end)?);
        if !range.is_ordered() {
            return Err(ScheduleError::InvalidRange(range.to_string()));
        }
        let kind = match self.kind {
            Collection::OpeningHours => SlotKind::OpeningHours,
            Collection::Tariffs => {
                let rate = self.rate.map(|rate| rate.to_string()).unwrap_or_default();
                SlotKind::Tariff {
                    rate: parse_rate(&rate).map_err(|_| ScheduleError::InvalidRate(rate.clone()))?,
                }
            }
        };
        Ok(DaySlot {
            id: self.id,
            court_id: self.court_id,
            day_of_week: self.day_of_week,
            range,
            kind,
        })
    }
}

/// Loads a slot snapshot from a CSV file.
///
/// Any malformed row fails the whole import; rows are numbered from 1
/// after the header.
pub fn load_slots<P: AsRef<Path>>(csv_path: P) -> Result<Vec<DaySlot>, ScheduleError> {
    let mut reader = Reader::from_path(csv_path)?;
    let mut slots = Vec::new();

    for (index, result) in reader.deserialize::<SlotRecord>().enumerate() {
        let row = index + 1;
        let record = result.map_err(|err| ScheduleError::InvalidRow {
            row,
            reason: err.to_string(),
        })?;
        let slot = record.into_slot().map_err(|err| ScheduleError::InvalidRow {
            row,
            reason: err.to_string(),
        })?;
        slots.push(slot);
    }

    Ok(slots)
}

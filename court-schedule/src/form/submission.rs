use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::schedule::time::{minutes_to_time_string, parse_time_to_minutes};
use crate::schedule::types::{
    Collection, CourtId, DayOfWeek, DaySlot, SlotId, SlotKind, SlotScope, TimeRange,
};

/// Raw form input for an opening-hours or tariff entry, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDraft {
    /// Taken from the request path by the web layer
    #[serde(default)]
    pub court_id: CourtId,
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    pub kind: SlotKindDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotKindDraft {
    OpeningHours,
    Tariff {
        #[serde(default)]
        rate: String,
    },
}

impl SlotDraft {
    pub fn opening_hours(court_id: CourtId, day: Option<DayOfWeek>, start: &str, end: &str) -> Self {
        Self {
            court_id,
            day_of_week: day,
            start: start.to_string(),
            end: end.to_string(),
            kind: SlotKindDraft::OpeningHours,
        }
    }

    pub fn tariff(court_id: CourtId, day: Option<DayOfWeek>, start: &str, end: &str, rate: &str) -> Self {
        Self {
            court_id,
            day_of_week: day,
            start: start.to_string(),
            end: end.to_string(),
            kind: SlotKindDraft::Tariff {
                rate: rate.to_string(),
            },
        }
    }

    /// Prefills an edit form from a stored slot
    pub fn from_slot(slot: &DaySlot) -> Self {
        let kind = match slot.kind {
            SlotKind::OpeningHours => SlotKindDraft::OpeningHours,
            SlotKind::Tariff { rate } => SlotKindDraft::Tariff {
                rate: rate.to_string(),
            },
        };
        Self {
            court_id: slot.court_id,
            day_of_week: slot.day_of_week,
            start: minutes_to_time_string(slot.range.start),
            end: minutes_to_time_string(slot.range.end),
            kind,
        }
    }

    pub fn collection(&self) -> Collection {
        match self.kind {
            SlotKindDraft::OpeningHours => Collection::OpeningHours,
            SlotKindDraft::Tariff { .. } => Collection::Tariffs,
        }
    }

    pub fn scope(&self) -> SlotScope {
        SlotScope {
            court_id: self.court_id,
            collection: self.collection(),
            day_of_week: self.day_of_week,
        }
    }

    /// Converts a draft that validated clean into a storable slot.
    ///
    /// Fails hard on input validation would have rejected.
    pub fn into_slot(self, id: Option<SlotId>) -> Result<DaySlot, ScheduleError> {
        let range = TimeRange::new(
            parse_time_to_minutes(&self.start)?,
            parse_time_to_minutes(&self.end)?,
        );
        if !range.is_ordered() {
            return Err(ScheduleError::InvalidRange(range.to_string()));
        }
        let kind = match self.kind {
            SlotKindDraft::OpeningHours => SlotKind::OpeningHours,
            SlotKindDraft::Tariff { rate } => SlotKind::Tariff {
                rate: parse_rate(&rate).map_err(|_| ScheduleError::InvalidRate(rate.clone()))?,
            },
        };
        Ok(DaySlot {
            id,
            court_id: self.court_id,
            day_of_week: self.day_of_week,
            range,
            kind,
        })
    }
}

/// Parses a tariff rate, which must be a positive finite number
pub fn parse_rate(text: &str) -> Result<f64, &'static str> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Rate is required");
    }
    match text.parse::<f64>() {
        Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        Ok(_) => Err("Rate must be a positive number"),
        Err(_) => Err("Rate must be a number"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_clean_tariff_draft() {
        let draft = SlotDraft::tariff(4, None, "18:00", "22:00", "35.5");
        let slot = draft.into_slot(Some(11)).unwrap();

        assert_eq!(slot.id, Some(11));
        assert_eq!(slot.court_id, 4);
        assert_eq!(slot.range, TimeRange::new(18 * 60, 22 * 60));
        assert_eq!(slot.kind, SlotKind::Tariff { rate: 35.5 });
    }

    #[test]
    fn conversion_fails_hard_on_malformed_time() {
        let draft = SlotDraft::opening_hours(1, Some(DayOfWeek::Friday), "8", "10:00");
        assert!(matches!(draft.into_slot(None), Err(ScheduleError::MalformedTime(_))));
    }

    #[test]
    fn conversion_rejects_reversed_range_and_bad_rate() {
        let reversed = SlotDraft::opening_hours(1, Some(DayOfWeek::Friday), "10:00", "08:00");
        assert!(matches!(reversed.into_slot(None), Err(ScheduleError::InvalidRange(_))));

        let free = SlotDraft::tariff(1, None, "08:00", "10:00", "0");
        assert!(matches!(free.into_slot(None), Err(ScheduleError::InvalidRate(_))));
    }

    #[test]
    fn rate_parsing() {
        assert_eq!(parse_rate(" 12.50 "), Ok(12.5));
        assert_eq!(parse_rate(""), Err("Rate is required"));
        assert_eq!(parse_rate("-3"), Err("Rate must be a positive number"));
        assert_eq!(parse_rate("NaN"), Err("Rate must be a positive number"));
        assert_eq!(parse_rate("ten"), Err("Rate must be a number"));
    }

    #[test]
    fn draft_from_slot_round_trips() {
        let slot = SlotDraft::opening_hours(2, Some(DayOfWeek::Sunday), "07:30", "21:00")
            .into_slot(Some(3))
            .unwrap();
        let draft = SlotDraft::from_slot(&slot);
        assert_eq!(draft.start, "07:30");
        assert_eq!(draft.end, "21:00");
        assert_eq!(draft.collection(), Collection::OpeningHours);
    }

    #[test]
    fn deserializes_form_body() {
        let draft: SlotDraft = serde_json::from_str(
            r#"{"day_of_week":"monday","start":"08:00","end":"10:00","kind":{"type":"tariff","rate":"20"}}"#,
        )
        .unwrap();
        assert_eq!(draft.court_id, 0);
        assert_eq!(draft.kind, SlotKindDraft::Tariff { rate: "20".into() });
    }
}

use crate::error::ScheduleError;
use crate::form::submission::{parse_rate, SlotDraft, SlotKindDraft};
use crate::report::{Field, ValidationReport};
use crate::store::SlotSource;

use super::overlap::first_conflict;
use super::scope::scope;
use super::time::parse_time_to_minutes;
use super::types::{Collection, DaySlot, Minutes, SlotId, TimeRange};

/// Per-collection validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub day_of_week_required: bool,
}

impl ValidationPolicy {
    /// Opening hours always belong to a concrete day
    pub const OPENING_HOURS: Self = Self {
        day_of_week_required: true,
    };
    /// Tariffs without a day act as the every-day default
    pub const TARIFFS: Self = Self {
        day_of_week_required: false,
    };

    pub fn for_collection(collection: Collection) -> Self {
        match collection {
            Collection::OpeningHours => Self::OPENING_HOURS,
            Collection::Tariffs => Self::TARIFFS,
        }
    }
}

/// Validates a draft against the existing slots of its court.
///
/// Every independent field is checked so one pass reports all problems.
/// Range checks stop at the first failure: unparsed times are not compared,
/// and a reversed range is not checked for overlap.
pub fn validate(
    draft: &SlotDraft,
    existing: &[DaySlot],
    editing: Option<SlotId>,
    policy: ValidationPolicy,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let day_missing = policy.day_of_week_required && draft.day_of_week.is_none();
    if day_missing {
        report.insert(Field::DayOfWeek, "Day of week is required");
    }

    let start = parse_field(&draft.start, Field::Start, "Start time", &mut report);
    let end = parse_field(&draft.end, Field::End, "End time", &mut report);

    if let (Some(start), Some(end)) = (start, end) {
        let range = TimeRange::new(start, end);
        if !range.is_ordered() {
            report.insert(Field::End, "End time must be after start time");
        } else if !day_missing {
            let scoped = scope(&draft.scope(), existing, editing);
            if let Some(conflict) = first_conflict(&range, scoped) {
                let message = format!("Overlaps with another entry ({})", conflict.range);
                report.insert(Field::Start, message.clone());
                report.insert(Field::End, message);
            }
        }
    }

    if let SlotKindDraft::Tariff { rate } = &draft.kind {
        if let Err(message) = parse_rate(rate) {
            report.insert(Field::Rate, message);
        }
    }

    report
}

/// Fetches the court's current slots from `source` and validates against
/// them. A failed fetch is an error, never an empty snapshot.
pub fn validate_with_source<S>(
    source: &S,
    draft: &SlotDraft,
    editing: Option<SlotId>,
    policy: ValidationPolicy,
) -> Result<ValidationReport, ScheduleError>
where
    S: SlotSource + ?Sized,
{
    let existing = source
        .fetch_slots(draft.court_id)
        .map_err(ScheduleError::ScheduleUnavailable)?;
    let report = validate(draft, &existing, editing, policy);
    if !report.is_valid() {
        tracing::debug!(
            court_id = draft.court_id,
            errors = report.len(),
            "slot draft rejected"
        );
    }
    Ok(report)
}

fn parse_field(text: &str, field: Field, label: &str, report: &mut ValidationReport) -> Option<Minutes> {
    if text.trim().is_empty() {
        report.insert(field, format!("{} is required", label));
        return None;
    }
    match parse_time_to_minutes(text) {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            report.insert(field, format!("{} must be in HH:MM format", label));
            None
        }
    }
}

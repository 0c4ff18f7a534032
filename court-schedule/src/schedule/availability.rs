use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::report::{Field, ValidationReport};

use super::time::parse_time_to_minutes;
use super::types::{CourtId, DayOfWeek, DaySlot, Minutes, SlotKind, TimeRange, MINUTES_PER_DAY};

/// A booked time range on a court for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub court_id: CourtId,
    pub date: NaiveDate,
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
}

/// Customer booking form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub start: String,
    pub end: String,
}

/// A free window a customer can book, with its price if a tariff covers it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookableSlot {
    pub range: TimeRange,
    pub price: Option<f64>,
}

/// Opening-hours ranges of a day, earliest first
pub fn opening_ranges(slots: &[DaySlot], day: DayOfWeek) -> Vec<TimeRange> {
    let mut ranges: Vec<TimeRange> = slots
        .iter()
        .filter(|slot| slot.kind == SlotKind::OpeningHours && slot.day_of_week == Some(day))
        .map(|slot| slot.range)
        .collect();
    ranges.sort_by_key(|range| range.start);
    ranges
}

/// Hourly rate at `minute` on `day`. A tariff for the day wins over an
/// every-day default.
pub fn rate_at(slots: &[DaySlot], day: DayOfWeek, minute: Minutes) -> Option<f64> {
    let covering = |wanted: Option<DayOfWeek>| {
        slots
            .iter()
            .filter(|slot| slot.day_of_week == wanted && slot.range.contains_minute(minute))
            .find_map(|slot| slot.kind.rate())
    };
    covering(Some(day)).or_else(|| covering(None))
}

/// Splits the opening hours of `date` into consecutive windows of `length`
/// minutes and keeps those no reservation overlaps
pub fn bookable_slots(
    slots: &[DaySlot],
    reservations: &[Reservation],
    date: NaiveDate,
    length: Minutes,
) -> Vec<BookableSlot> {
    if length == 0 || length > MINUTES_PER_DAY {
        return Vec::new();
    }

    let day = DayOfWeek::from(date.weekday());
    let taken: Vec<TimeRange> = reservations
        .iter()
        .filter(|reservation| reservation.date == date)
        .map(|reservation| reservation.range)
        .collect();

    let mut bookable = Vec::new();
    for opening in opening_ranges(slots, day) {
        let mut start = opening.start;
        while start + length <= opening.end {
            let window = TimeRange::new(start, start + length);
            if !taken.iter().any(|booked| booked.overlaps(&window)) {
                let price = rate_at(slots, day, start).map(|rate| rate * f64::from(length) / 60.0);
                bookable.push(BookableSlot { range: window, price });
            }
            start += length;
        }
    }
    bookable
}

/// Checks a booking against opening hours and existing reservations.
/// Returns the requested range when it can be booked.
pub fn check_booking(
    slots: &[DaySlot],
    reservations: &[Reservation],
    request: &BookingRequest,
    today: NaiveDate,
) -> Result<TimeRange, ValidationReport> {
    let mut report = ValidationReport::new();

    if request.date < today {
        report.insert(Field::Date, "Date is in the past");
    }
    let start = match parse_time_to_minutes(&request.start) {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            report.insert(Field::Start, "Start time must be in HH:MM format");
            None
        }
    };
    let end = match parse_time_to_minutes(&request.end) {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            report.insert(Field::End, "End time must be in HH:MM format");
            None
        }
    };

    if let (Some(start), Some(end)) = (start, end) {
        let range = TimeRange::new(start, end);
        let day = DayOfWeek::from(request.date.weekday());
        if !range.is_ordered() {
            report.insert(Field::End, "End time must be after start time");
        } else if !opening_ranges(slots, day).iter().any(|open| open.encloses(&range)) {
            report.insert(Field::Start, "Court is closed at the requested time");
        } else if let Some(booked) = reservations
            .iter()
            .find(|reservation| reservation.date == request.date && reservation.range.overlaps(&range))
        {
            let message = format!("Already booked ({})", booked.range);
            report.insert(Field::Start, message.clone());
            report.insert(Field::End, message);
        }

        if report.is_valid() {
            return Ok(range);
        }
    }
    Err(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-06-03 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn slot(day: Option<DayOfWeek>, start: u16, end: u16, kind: SlotKind) -> DaySlot {
        DaySlot {
            id: None,
            court_id: 1,
            day_of_week: day,
            range: TimeRange::new(start * 60, end * 60),
            kind,
        }
    }

    fn court() -> Vec<DaySlot> {
        vec![
            slot(Some(DayOfWeek::Monday), 14, 16, SlotKind::OpeningHours),
            slot(Some(DayOfWeek::Monday), 8, 11, SlotKind::OpeningHours),
            slot(None, 0, 18, SlotKind::Tariff { rate: 10.0 }),
            slot(Some(DayOfWeek::Monday), 15, 22, SlotKind::Tariff { rate: 20.0 }),
        ]
    }

    fn reserved(start: u16, end: u16) -> Reservation {
        Reservation {
            id: Some(1),
            court_id: 1,
            date: monday(),
            range: TimeRange::new(start * 60, end * 60),
            customer: None,
        }
    }

    #[test]
    fn day_tariff_overrides_default() {
        assert_eq!(rate_at(&court(), DayOfWeek::Monday, 9 * 60), Some(10.0));
        assert_eq!(rate_at(&court(), DayOfWeek::Monday, 15 * 60), Some(20.0));
        assert_eq!(rate_at(&court(), DayOfWeek::Tuesday, 15 * 60), Some(10.0));
        assert_eq!(rate_at(&court(), DayOfWeek::Tuesday, 19 * 60), None);
    }

    #[test]
    fn bookable_windows_skip_reservations() {
        let free = bookable_slots(&court(), &[reserved(9, 10)], monday(), 60);
        let starts: Vec<_> = free.iter().map(|slot| slot.range.start / 60).collect();
        assert_eq!(starts, vec![8, 10, 14, 15]);
        assert_eq!(free[0].price, Some(10.0));
        assert_eq!(free[3].price, Some(20.0));
    }

    #[test]
    fn reservations_on_other_dates_are_ignored() {
        let mut other_day = reserved(8, 11);
        other_day.date = monday().succ_opt().unwrap();
        assert_eq!(bookable_slots(&court(), &[other_day], monday(), 90).len(), 3);
    }

    #[test]
    fn zero_length_yields_nothing() {
        assert!(bookable_slots(&court(), &[], monday(), 0).is_empty());
    }

    #[test]
    fn booking_inside_opening_hours_is_accepted() {
        let request = BookingRequest {
            date: monday(),
            start: "10:00".into(),
            end: "11:00".into(),
        };
        let range = check_booking(&court(), &[reserved(9, 10)], &request, monday()).unwrap();
        assert_eq!(range, TimeRange::new(600, 660));
    }

    #[test]
    fn booking_across_closed_gap_is_rejected() {
        let request = BookingRequest {
            date: monday(),
            start: "10:00".into(),
            end: "15:00".into(),
        };
        let report = check_booking(&court(), &[], &request, monday()).unwrap_err();
        assert_eq!(report.get(Field::Start), Some("Court is closed at the requested time"));
    }

    #[test]
    fn double_booking_is_rejected() {
        let request = BookingRequest {
            date: monday(),
            start: "09:30".into(),
            end: "10:30".into(),
        };
        let report = check_booking(&court(), &[reserved(9, 10)], &request, monday()).unwrap_err();
        assert_eq!(report.get(Field::End), Some("Already booked (09:00-10:00)"));
    }

    #[test]
    fn past_date_is_rejected() {
        let request = BookingRequest {
            date: monday(),
            start: "08:00".into(),
            end: "09:00".into(),
        };
        let tomorrow = monday().succ_opt().unwrap();
        let report = check_booking(&court(), &[], &request, tomorrow).unwrap_err();
        assert!(report.contains(Field::Date));
    }
}

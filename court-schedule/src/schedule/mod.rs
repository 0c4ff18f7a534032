pub mod types;
pub mod time;
pub mod scope;
pub mod overlap;
pub mod validation;
pub mod availability;

pub use types::{Collection, CourtId, DayOfWeek, DaySlot, Minutes, SlotId, SlotKind, SlotScope, TimeRange};
pub use time::{minutes_to_time_string, parse_time_to_minutes};
pub use scope::scope;
pub use overlap::{find_conflicts, first_conflict, Conflict};
pub use validation::{validate, validate_with_source, ValidationPolicy};
pub use availability::{bookable_slots, check_booking, opening_ranges, rate_at, BookableSlot, BookingRequest, Reservation};

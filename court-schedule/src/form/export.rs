use csv::WriterBuilder;
use std::path::Path;

use crate::error::ScheduleError;
use crate::parser::SlotRecord;
use crate::schedule::DaySlot;

/// Writes slots to a CSV snapshot readable by [`crate::parser::load_slots`]
pub fn export_slots_to_csv(slots: &[DaySlot], csv_path: &Path) -> Result<(), ScheduleError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_path(csv_path)?;
    for slot in slots {
        wtr.serialize(SlotRecord::from(slot))?;
    }
    wtr.flush()?;
    Ok(())
}

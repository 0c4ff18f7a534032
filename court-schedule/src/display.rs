use std::fmt::Write;

use crate::schedule::{Collection, Conflict, CourtId, DayOfWeek, DaySlot, SlotKind};

/// Formats a slot as `HH:MM-HH:MM`, with the rate for tariffs
pub fn format_slot(slot: &DaySlot) -> String {
    match slot.kind {
        SlotKind::OpeningHours => slot.range.to_string(),
        SlotKind::Tariff { rate } => format!("{} @ {:.2}/h", slot.range, rate),
    }
}

fn day_label(day: Option<DayOfWeek>) -> &'static str {
    day.map(|day| day.name()).unwrap_or("Every day")
}

/// Renders a court's week: opening hours and tariffs per day, defaults last
pub fn render_week(court_id: CourtId, slots: &[DaySlot]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Court {} ===", court_id);

    let days = DayOfWeek::ALL.iter().map(|day| Some(*day)).chain(std::iter::once(None));
    for day in days {
        let mut on_day: Vec<&DaySlot> = slots
            .iter()
            .filter(|slot| slot.court_id == court_id && slot.day_of_week == day)
            .collect();
        if on_day.is_empty() {
            continue;
        }
        on_day.sort_by_key(|slot| slot.range.start);

        let _ = writeln!(out, "{}:", day_label(day));
        for (collection, label) in [(Collection::OpeningHours, "open"), (Collection::Tariffs, "tariff")] {
            let entries: Vec<String> = on_day
                .iter()
                .filter(|slot| slot.kind.collection() == collection)
                .map(|slot| format_slot(slot))
                .collect();
            if !entries.is_empty() {
                let _ = writeln!(out, "  {:<7}{}", label, entries.join(", "));
            }
        }
    }
    out
}

pub fn render_conflicts(conflicts: &[Conflict<'_>]) -> String {
    let mut out = String::new();
    for conflict in conflicts {
        let _ = writeln!(
            out,
            "  court {} {}: {} overlaps {}",
            conflict.first.court_id,
            day_label(conflict.first.day_of_week),
            format_slot(conflict.first),
            format_slot(conflict.second),
        );
    }
    out
}

/// Prints a court's week in a readable format
pub fn print_court_week(court_id: CourtId, slots: &[DaySlot]) {
    print!("{}", render_week(court_id, slots));
}

use super::types::{DaySlot, SlotId, SlotScope};

/// Filters `all` down to the slots a candidate must not overlap: same court,
/// same collection and exactly the same day of week (two "every day" slots
/// share a scope). The slot being edited is excluded. Relative order of `all`
/// is preserved.
pub fn scope<'a>(candidate: &SlotScope, all: &'a [DaySlot], editing: Option<SlotId>) -> Vec<&'a DaySlot> {
    all.iter()
        .filter(|slot| slot.scope() == *candidate)
        .filter(|slot| match editing {
            Some(id) => slot.id != Some(id),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{Collection, DayOfWeek, SlotKind, TimeRange};

    fn slot(id: SlotId, court_id: u64, day: Option<DayOfWeek>, kind: SlotKind) -> DaySlot {
        DaySlot {
            id: Some(id),
            court_id,
            day_of_week: day,
            range: TimeRange::new(8 * 60, 10 * 60),
            kind,
        }
    }

    fn monday_hours() -> SlotScope {
        SlotScope {
            court_id: 1,
            collection: Collection::OpeningHours,
            day_of_week: Some(DayOfWeek::Monday),
        }
    }

    #[test]
    fn keeps_same_court_collection_and_day_in_order() {
        let all = vec![
            slot(1, 1, Some(DayOfWeek::Monday), SlotKind::OpeningHours),
            slot(2, 1, Some(DayOfWeek::Tuesday), SlotKind::OpeningHours),
            slot(3, 2, Some(DayOfWeek::Monday), SlotKind::OpeningHours),
            slot(4, 1, Some(DayOfWeek::Monday), SlotKind::Tariff { rate: 12.0 }),
            slot(5, 1, Some(DayOfWeek::Monday), SlotKind::OpeningHours),
        ];

        let ids: Vec<_> = scope(&monday_hours(), &all, None).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Some(1), Some(5)]);
    }

    #[test]
    fn excludes_the_slot_being_edited() {
        let all = vec![
            slot(1, 1, Some(DayOfWeek::Monday), SlotKind::OpeningHours),
            slot(5, 1, Some(DayOfWeek::Monday), SlotKind::OpeningHours),
        ];

        let ids: Vec<_> = scope(&monday_hours(), &all, Some(1)).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Some(5)]);
    }

    #[test]
    fn unsaved_slots_stay_in_scope_while_editing() {
        let mut unsaved = slot(0, 1, Some(DayOfWeek::Monday), SlotKind::OpeningHours);
        unsaved.id = None;

        assert_eq!(scope(&monday_hours(), &[unsaved], Some(9)).len(), 1);
    }

    #[test]
    fn every_day_slots_match_each_other_only() {
        let all = vec![
            slot(1, 1, None, SlotKind::Tariff { rate: 10.0 }),
            slot(2, 1, Some(DayOfWeek::Monday), SlotKind::Tariff { rate: 15.0 }),
        ];
        let every_day = SlotScope {
            court_id: 1,
            collection: Collection::Tariffs,
            day_of_week: None,
        };

        let ids: Vec<_> = scope(&every_day, &all, None).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Some(1)]);
    }
}

use super::types::{DaySlot, TimeRange};

impl TimeRange {
    /// Half-open overlap test: ranges that only touch at an endpoint do not
    /// overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Returns the first slot in `scoped` whose range overlaps `candidate`
pub fn first_conflict<'a, I>(candidate: &TimeRange, scoped: I) -> Option<&'a DaySlot>
where
    I: IntoIterator<Item = &'a DaySlot>,
{
    scoped.into_iter().find(|slot| slot.range.overlaps(candidate))
}

/// A pair of stored slots that share a scope and overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conflict<'a> {
    pub first: &'a DaySlot,
    pub second: &'a DaySlot,
}

/// Audits a stored collection for pairs that break the non-overlap invariant.
/// Pairs are reported in input order.
pub fn find_conflicts(all: &[DaySlot]) -> Vec<Conflict<'_>> {
    let mut conflicts = Vec::new();
    for (i, first) in all.iter().enumerate() {
        for second in &all[i + 1..] {
            if first.scope() == second.scope() && first.range.overlaps(&second.range) {
                conflicts.push(Conflict { first, second });
            }
        }
    }
    conflicts
}

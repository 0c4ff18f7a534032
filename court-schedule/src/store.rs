use chrono::NaiveDate;
use std::sync::{Mutex, MutexGuard};

use crate::error::{BookingError, StoreError};
use crate::schedule::{check_booking, BookingRequest, CourtId, DaySlot, Reservation, SlotId};

/// Read access to the slots of a court. Validation always works on a fresh
/// snapshot fetched through this trait.
pub trait SlotSource {
    fn fetch_slots(&self, court_id: CourtId) -> Result<Vec<DaySlot>, StoreError>;
}

#[derive(Debug, Default)]
struct StoreState {
    slots: Vec<DaySlot>,
    reservations: Vec<Reservation>,
    next_slot_id: SlotId,
    next_reservation_id: u64,
}

/// In-memory slot and reservation storage shared by the web workers
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with imported slots. Slots without an id get one.
    pub fn with_slots(slots: Vec<DaySlot>) -> Self {
        let mut next_slot_id = slots.iter().filter_map(|slot| slot.id).max().unwrap_or(0) + 1;
        let slots = slots
            .into_iter()
            .map(|mut slot| {
                if slot.id.is_none() {
                    slot.id = Some(next_slot_id);
                    next_slot_id += 1;
                }
                slot
            })
            .collect();

        Self {
            state: Mutex::new(StoreState {
                slots,
                reservations: Vec::new(),
                next_slot_id,
                next_reservation_id: 1,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    pub fn all_slots(&self) -> Result<Vec<DaySlot>, StoreError> {
        Ok(self.lock()?.slots.clone())
    }

    pub fn get_slot(&self, court_id: CourtId, id: SlotId) -> Result<DaySlot, StoreError> {
        self.lock()?
            .slots
            .iter()
            .find(|slot| slot.court_id == court_id && slot.id == Some(id))
            .cloned()
            .ok_or(StoreError::SlotNotFound(id))
    }

    /// Stores a new slot under a fresh id
    pub fn create_slot(&self, mut slot: DaySlot) -> Result<DaySlot, StoreError> {
        let mut state = self.lock()?;
        state.next_slot_id = state.next_slot_id.max(1);
        slot.id = Some(state.next_slot_id);
        state.next_slot_id += 1;
        state.slots.push(slot.clone());
        tracing::info!(court_id = slot.court_id, slot_id = ?slot.id, "slot created");
        Ok(slot)
    }

    /// Replaces a stored slot entirely, keeping its id
    pub fn replace_slot(&self, id: SlotId, mut slot: DaySlot) -> Result<DaySlot, StoreError> {
        let mut state = self.lock()?;
        let existing = state
            .slots
            .iter_mut()
            .find(|existing| existing.court_id == slot.court_id && existing.id == Some(id))
            .ok_or(StoreError::SlotNotFound(id))?;
        slot.id = Some(id);
        *existing = slot.clone();
        tracing::info!(court_id = slot.court_id, slot_id = id, "slot replaced");
        Ok(slot)
    }

    pub fn delete_slot(&self, court_id: CourtId, id: SlotId) -> Result<DaySlot, StoreError> {
        let mut state = self.lock()?;
        let index = state
            .slots
            .iter()
            .position(|slot| slot.court_id == court_id && slot.id == Some(id))
            .ok_or(StoreError::SlotNotFound(id))?;
        tracing::info!(court_id, slot_id = id, "slot deleted");
        Ok(state.slots.remove(index))
    }

    pub fn reservations(&self, court_id: CourtId, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .lock()?
            .reservations
            .iter()
            .filter(|reservation| reservation.court_id == court_id && reservation.date == date)
            .cloned()
            .collect())
    }

    /// Checks a booking against the court's current slots and reservations
    /// and stores it while holding the lock, so overlapping requests cannot
    /// both be accepted.
    pub fn book(
        &self,
        court_id: CourtId,
        request: &BookingRequest,
        today: NaiveDate,
        customer: Option<String>,
    ) -> Result<Reservation, BookingError> {
        let mut state = self.lock()?;
        let slots: Vec<DaySlot> = state
            .slots
            .iter()
            .filter(|slot| slot.court_id == court_id)
            .cloned()
            .collect();
        let booked: Vec<Reservation> = state
            .reservations
            .iter()
            .filter(|reservation| reservation.court_id == court_id && reservation.date == request.date)
            .cloned()
            .collect();
        let range = check_booking(&slots, &booked, request, today).map_err(BookingError::Rejected)?;

        state.next_reservation_id = state.next_reservation_id.max(1);
        let reservation = Reservation {
            id: Some(state.next_reservation_id),
            court_id,
            date: request.date,
            range,
            customer,
        };
        state.next_reservation_id += 1;
        state.reservations.push(reservation.clone());
        tracing::info!(
            court_id,
            date = %reservation.date,
            range = %reservation.range,
            "reservation created"
        );
        Ok(reservation)
    }
}

impl SlotSource for MemoryStore {
    fn fetch_slots(&self, court_id: CourtId) -> Result<Vec<DaySlot>, StoreError> {
        Ok(self
            .lock()?
            .slots
            .iter()
            .filter(|slot| slot.court_id == court_id)
            .cloned()
            .collect())
    }
}

pub mod submission;
pub mod export;

pub use submission::{parse_rate, SlotDraft, SlotKindDraft};
pub use export::export_slots_to_csv;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Form fields that can carry a validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    DayOfWeek,
    Date,
    Start,
    End,
    Rate,
    CardHolder,
    CardNumber,
    Expiry,
    Cvv,
}

/// Field-keyed error messages from one validation pass. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: BTreeMap<Field, String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records a message for `field`. The first message for a field wins.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_is_kept() {
        let mut report = ValidationReport::new();
        report.insert(Field::End, "End time must be after start time");
        report.insert(Field::End, "Overlaps with another entry");

        assert_eq!(report.len(), 1);
        assert_eq!(report.get(Field::End), Some("End time must be after start time"));
    }

    #[test]
    fn serializes_as_flat_field_map() {
        let mut report = ValidationReport::new();
        report.insert(Field::DayOfWeek, "Day of week is required");
        report.insert(Field::Start, "Start time is required");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "day_of_week": "Day of week is required",
                "start": "Start time is required",
            })
        );
    }
}
